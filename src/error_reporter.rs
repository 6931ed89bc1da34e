use crate::cli::VerbosityLevel;
use crate::error::{ConfigError, LoaderError};

/// Error reporter with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    /// Report a loader error with appropriate verbosity
    pub fn report_loader_error(&self, error: &LoaderError) {
        if self.verbosity == VerbosityLevel::Quiet && !error.is_fatal() {
            return;
        }
        eprintln!("{}", self.format_loader_error(error));
    }

    /// Report a configuration error
    pub fn report_config_error(&self, error: &ConfigError) {
        eprintln!("{}", self.format_config_error(error));
    }

    pub fn format_loader_error(&self, error: &LoaderError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("ERROR: {}", error),
            VerbosityLevel::Normal => format!("Error: {}", error),
            VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => {
                let mut output = self.format_error_verbose(error);
                output.push_str(&format!("\nDebug Info: {:?}", error));
                output.push_str(&error_chain(error));
                output
            }
        }
    }

    pub fn format_config_error(&self, error: &ConfigError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("Config error: {}", error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                format!("Configuration Error: {}\n{}", error, config_help(error))
            }
            VerbosityLevel::Debug => {
                format!(
                    "Configuration Error: {}\nDebug: {:?}\n{}",
                    error,
                    error,
                    config_help(error)
                )
            }
        }
    }

    fn format_error_verbose(&self, error: &LoaderError) -> String {
        let mut output = format!("Error: {}", error);
        if let Some(hint) = loader_hint(error) {
            output.push_str("\nSuggestion: ");
            output.push_str(hint);
        }
        output
    }
}

/// Helpful next step for a loader error, if there is an obvious one
fn loader_hint(error: &LoaderError) -> Option<&'static str> {
    match error {
        LoaderError::ConfigLoad { .. } => Some(
            "Check --base-path and that specifications/specifications.xml and specifications/multiple_allowed.xml exist beneath it",
        ),
        LoaderError::FileNotFound { .. } => {
            Some("Include paths are resolved against the base path, not the including file")
        }
        LoaderError::XmlParse { .. } => Some("Check the XML syntax near the reported line"),
        LoaderError::UnexpectedTag { .. } => {
            Some("Declare the tag under its parent in the specification file or remove it")
        }
        LoaderError::MissingRequiredTag { .. } => {
            Some("Add the tag, or include a file that provides it")
        }
        LoaderError::CycleDetected { .. } => Some(
            "Look for a file that includes itself, directly or through other files, or raise --max-expansions",
        ),
        LoaderError::InvalidValue { .. } => Some("Numeric fields must hold decimal numbers"),
        LoaderError::Io(_) | LoaderError::Config(_) | LoaderError::Json(_) => None,
    }
}

fn config_help(error: &ConfigError) -> &'static str {
    match error {
        ConfigError::Io(_) => "Check that the configuration file exists and is readable",
        ConfigError::TomlParsing(_) | ConfigError::JsonParsing(_) => {
            "Check the configuration file syntax (TOML/JSON format expected)"
        }
        ConfigError::Validation(_) => "Fix the reported value in the file, environment or flags",
        ConfigError::Environment(_) => "Fix or unset the ROBOT_XML_* environment variable",
        ConfigError::UnsupportedFormat(_) => "Use a .toml or .json configuration file",
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut output = String::from("\nError Chain:");
    let mut current = error;
    let mut level = 0;
    while let Some(source) = current.source() {
        output.push_str(&format!("\n  {}: {}", level + 1, source));
        current = source;
        level += 1;
    }
    output
}
