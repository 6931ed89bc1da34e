//! # robot-xml-loader Library
//!
//! Loads robot description XML files (geometry, sensors, kinematics) into typed
//! [`RobotMessage`]s. Every file is expanded for `<include>` directives, has
//! its same-field siblings merged, and is validated against a separately
//! loaded specification before being projected into a message.

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod error_reporter;
pub mod expander;
pub mod file_discovery;
pub mod loader;
pub mod merger;
pub mod message;
pub mod node;
pub mod output;
pub mod schema;
pub mod specification;
pub mod validator;
pub mod xml;

pub use builder::MessageBuilder;
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigManager, EnvProvider, ResourceConfig, SystemEnvProvider};
pub use error::{ConfigError, LoaderError, Result};
pub use error_reporter::ErrorReporter;
pub use expander::FilenameExpander;
pub use file_discovery::FileDiscovery;
pub use loader::{FileLoadResult, LoadResults, LoadStatus, RobotLoader};
pub use merger::NodeMerger;
pub use message::{
    Footprint, KinematicModel, Point2D, Pose2D, Range, RobotMessage, SensorMessage,
};
pub use node::{GenericNode, SourceLocation};
pub use output::Output;
pub use schema::{Schema, TagRules};
pub use specification::{Specification, SpecificationLoader};
pub use validator::Validator;
pub use xml::{DocumentParser, QuickXmlParser};
