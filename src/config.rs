use crate::cli::{Cli, OutputFormat};
use crate::error::{ConfigError, ConfigResult as Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub resources: ResourceConfig,
    pub expansion: ExpansionConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
    pub files: FileConfig,
}

/// Locations of the specification files and included documents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourceConfig {
    /// Base path that include directives and relative specification paths resolve against
    pub base_path: PathBuf,
    /// Specification file describing allowed and required tags
    pub specifications: PathBuf,
    /// List of tags whose repeated siblings must never be merged
    pub multiple_allowed: PathBuf,
}

/// Include expansion limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Expansions allowed per document before an include cycle is reported
    pub max_expansions: usize,
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of files processed in parallel
    pub threads: Option<usize>,
    /// Stop at the first file that fails to load
    pub fail_fast: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// File extensions to process when scanning directories
    pub extensions: Vec<String>,
    /// Include patterns (glob syntax)
    pub include_patterns: Vec<String>,
    /// Exclude patterns (glob syntax)
    pub exclude_patterns: Vec<String>,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Descend into symlinked directories while scanning
    pub follow_symlinks: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("resources"),
            specifications: PathBuf::from("specifications/specifications.xml"),
            multiple_allowed: PathBuf::from("specifications/multiple_allowed.xml"),
        }
    }
}

impl ResourceConfig {
    /// Resources rooted at `base_path` with the conventional specification file names
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Resolve a path against the base path; absolute paths are returned unchanged
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn specifications_path(&self) -> PathBuf {
        self.resolve(&self.specifications)
    }

    pub fn multiple_allowed_path(&self) -> PathBuf {
        self.resolve(&self.multiple_allowed)
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_expansions: 256,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            include_patterns: vec![],
            exclude_patterns: vec![],
            max_depth: None,
            follow_symlinks: false,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider, cli)
    }

    /// Load configuration reading the environment through `env`
    pub fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> Result<Config> {
        // Start with default configuration
        let mut config = Config::default();

        // Load from configuration file if specified
        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path)?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file()? {
            config = Self::merge_configs(config, found_config);
        }

        // Apply environment variable overrides
        config = Self::apply_environment_overrides_with(env, config)?;

        // Apply CLI argument overrides (highest precedence)
        config = Self::merge_with_cli(config, cli);

        // Validate the final configuration
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "robot-xml.toml",
            "robot-xml.json",
            ".robot-xml.toml",
            ".robot-xml.json",
        ];

        // Check current directory first
        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path)?));
            }
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("robot-xml");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path)?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        // Resource settings
        if let Some(base_path) = env.get("ROBOT_XML_BASE_PATH") {
            config.resources.base_path = PathBuf::from(base_path);
        }

        if let Some(specifications) = env.get("ROBOT_XML_SPECIFICATIONS") {
            config.resources.specifications = PathBuf::from(specifications);
        }

        if let Some(multiple_allowed) = env.get("ROBOT_XML_MULTIPLE_ALLOWED") {
            config.resources.multiple_allowed = PathBuf::from(multiple_allowed);
        }

        // Expansion settings
        if let Some(max_expansions) = env.get("ROBOT_XML_MAX_EXPANSIONS") {
            config.expansion.max_expansions = parse_env("ROBOT_XML_MAX_EXPANSIONS", &max_expansions)?;
        }

        // Processing settings
        if let Some(threads) = env.get("ROBOT_XML_THREADS") {
            config.processing.threads = Some(parse_env("ROBOT_XML_THREADS", &threads)?);
        }

        if let Some(fail_fast) = env.get("ROBOT_XML_FAIL_FAST") {
            config.processing.fail_fast = parse_env("ROBOT_XML_FAIL_FAST", &fail_fast)?;
        }

        // Output settings
        if let Some(verbose) = env.get("ROBOT_XML_VERBOSE") {
            config.output.verbose = parse_env("ROBOT_XML_VERBOSE", &verbose)?;
        }

        if let Some(quiet) = env.get("ROBOT_XML_QUIET") {
            config.output.quiet = parse_env("ROBOT_XML_QUIET", &quiet)?;
        }

        if let Some(format) = env.get("ROBOT_XML_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid ROBOT_XML_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        // File settings
        if let Some(extensions) = env.get("ROBOT_XML_EXTENSIONS") {
            config.files.extensions = extensions
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence where given)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        // Resource settings
        if let Some(base_path) = &cli.base_path {
            config.resources.base_path = base_path.clone();
        }
        if let Some(specifications) = &cli.specifications {
            config.resources.specifications = specifications.clone();
        }
        if let Some(multiple_allowed) = &cli.multiple_allowed {
            config.resources.multiple_allowed = multiple_allowed.clone();
        }

        // Expansion settings
        if let Some(max_expansions) = cli.max_expansions {
            config.expansion.max_expansions = max_expansions;
        }

        // Processing settings
        if cli.threads.is_some() {
            config.processing.threads = cli.threads;
        }
        if cli.fail_fast {
            config.processing.fail_fast = true;
        }

        // Output settings
        if let Some(format) = cli.output_format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        // File settings
        if let Some(extensions) = cli.get_extensions() {
            config.files.extensions = extensions;
        }
        if !cli.include_patterns.is_empty() {
            config.files.include_patterns = cli.include_patterns.clone();
        }
        if !cli.exclude_patterns.is_empty() {
            config.files.exclude_patterns = cli.exclude_patterns.clone();
        }
        if cli.max_depth.is_some() {
            config.files.max_depth = cli.max_depth;
        }

        config
    }

    /// Merge two configurations (second takes precedence for non-None values)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        // Resource settings
        base.resources = override_config.resources;

        // Expansion settings
        base.expansion.max_expansions = override_config.expansion.max_expansions;

        // Processing settings
        if override_config.processing.threads.is_some() {
            base.processing.threads = override_config.processing.threads;
        }
        base.processing.fail_fast = override_config.processing.fail_fast;

        // Output settings
        base.output.format = override_config.output.format;
        base.output.verbose = override_config.output.verbose;
        base.output.quiet = override_config.output.quiet;

        // File settings
        if !override_config.files.extensions.is_empty() {
            base.files.extensions = override_config.files.extensions;
        }
        if !override_config.files.include_patterns.is_empty() {
            base.files.include_patterns = override_config.files.include_patterns;
        }
        if !override_config.files.exclude_patterns.is_empty() {
            base.files.exclude_patterns = override_config.files.exclude_patterns;
        }
        if override_config.files.max_depth.is_some() {
            base.files.max_depth = override_config.files.max_depth;
        }
        base.files.follow_symlinks |= override_config.files.follow_symlinks;

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        // Validate threads
        if let Some(threads) = config.processing.threads {
            if threads == 0 {
                return Err(ConfigError::Validation(
                    "Number of threads must be greater than 0".to_string(),
                ));
            }
            if threads > 1000 {
                return Err(ConfigError::Validation(
                    "Number of threads cannot exceed 1000".to_string(),
                ));
            }
        }

        // Validate expansion settings
        if config.expansion.max_expansions == 0 {
            return Err(ConfigError::Validation(
                "Maximum expansions must be greater than 0".to_string(),
            ));
        }

        // Validate resource settings
        if config.resources.specifications.as_os_str().is_empty()
            || config.resources.multiple_allowed.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "Specification file paths must not be empty".to_string(),
            ));
        }

        // Validate output settings
        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        // Validate file settings
        if config.files.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "At least one file extension must be specified".to_string(),
            ));
        }

        // Validate that extensions don't contain invalid characters
        for ext in &config.files.extensions {
            if ext.contains('/') || ext.contains('\\') || ext.contains('.') {
                return Err(ConfigError::Validation(format!(
                    "Invalid file extension: {}",
                    ext
                )));
            }
        }

        Ok(())
    }

    /// Get the effective thread count
    pub fn get_thread_count(config: &Config) -> usize {
        config.processing.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
}
