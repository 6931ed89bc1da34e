use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Show all available debugging information
    Debug,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default tracing filter for this verbosity, used when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "robot_xml_loader=info,warn",
            VerbosityLevel::Debug => "robot_xml_loader=debug,info",
        }
    }
}

/// How batch results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per file plus a summary
    Human,
    /// Machine-readable results including the built messages
    Json,
    /// Summary counts only
    Summary,
}

/// Schema-driven robot description loader
#[derive(Parser, Debug, Clone)]
#[command(name = "robot-xml")]
#[command(about = "Load robot description XML files into typed configuration messages")]
#[command(version)]
pub struct Cli {
    /// Robot description files or directories containing them
    #[arg(required = true, help = "Robot description files or directories")]
    pub paths: Vec<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base resource path used to resolve includes and specification files
    #[arg(long = "base-path")]
    pub base_path: Option<PathBuf>,

    /// Specification file, relative to the base path unless absolute
    #[arg(long = "specifications")]
    pub specifications: Option<PathBuf>,

    /// Non-mergable tag list, relative to the base path unless absolute
    #[arg(long = "multiple-allowed")]
    pub multiple_allowed: Option<PathBuf>,

    /// Upper bound on include expansions per document
    #[arg(long = "max-expansions")]
    pub max_expansions: Option<usize>,

    /// Number of files processed in parallel
    #[arg(
        short = 't',
        long = "threads",
        help = "Number of files processed in parallel"
    )]
    pub threads: Option<usize>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format
    #[arg(long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Stop at the first file that fails to load
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// File extensions to process when scanning directories (comma-separated)
    #[arg(
        short = 'e',
        long = "extensions",
        help = "File extensions to process (e.g., 'xml,robot')"
    )]
    pub extensions: Option<String>,

    /// Include file patterns (glob syntax)
    #[arg(long = "include", action = clap::ArgAction::Append)]
    pub include_patterns: Vec<String>,

    /// Exclude file patterns (glob syntax)
    #[arg(long = "exclude", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Maximum directory depth when scanning
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn get_extensions(&self) -> Option<Vec<String>> {
        self.extensions.as_ref().map(|extensions| {
            extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        VerbosityLevel::from_flags(self.verbose, self.quiet)
    }

    pub fn validate(&self) -> Result<(), String> {
        for path in &self.paths {
            if !path.exists() {
                return Err(format!("Path does not exist: {}", path.display()));
            }
        }
        if let Some(threads) = self.threads
            && threads == 0
        {
            return Err("Number of threads must be greater than 0".to_string());
        }
        if let Some(0) = self.max_expansions {
            return Err("Maximum expansions must be greater than 0".to_string());
        }
        Ok(())
    }
}
