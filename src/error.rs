use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::node::SourceLocation;

/// Renders an optional location as a ` (at file:line)` suffix
pub(crate) struct AtLocation<'a>(pub &'a Option<SourceLocation>);

impl fmt::Display for AtLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, " (at {})", location),
            None => Ok(()),
        }
    }
}

/// Main pipeline error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Specification load error: {path} - {details}")]
    ConfigLoad { path: PathBuf, details: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("XML parsing error: {path} - {details}")]
    XmlParse { path: PathBuf, details: String },

    #[error("Unexpected tag <{tag}> under <{parent}>{}", AtLocation(.location))]
    UnexpectedTag {
        tag: String,
        parent: String,
        location: Option<SourceLocation>,
    },

    #[error("Missing required tag <{tag}> under <{parent}>{}", AtLocation(.location))]
    MissingRequiredTag {
        tag: String,
        parent: String,
        location: Option<SourceLocation>,
    },

    #[error("Include cycle suspected in {path}: still expanding after {expansions} inclusions")]
    CycleDetected { path: PathBuf, expansions: usize },

    #[error("Invalid value for <{tag}>: '{value}' - {reason}")]
    InvalidValue {
        tag: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoaderError {
    /// Structural errors mean the document was read but does not match the specification
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            LoaderError::UnexpectedTag { .. } | LoaderError::MissingRequiredTag { .. }
        )
    }

    /// Errors that make every subsequent parse pointless
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoaderError::ConfigLoad { .. } | LoaderError::Config(_))
    }
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for LoaderError {
    fn from(err: ConfigError) -> Self {
        LoaderError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
