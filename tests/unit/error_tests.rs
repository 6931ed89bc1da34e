//! Error type tests

use std::path::PathBuf;

use robot_xml_loader::{ConfigError, LoaderError, SourceLocation};

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let loader_error: LoaderError = io_error.into();

    assert!(matches!(loader_error, LoaderError::Io(_)));
    assert!(!loader_error.is_structural());
}

#[test]
fn test_structural_errors_carry_tag_and_parent() {
    let error = LoaderError::UnexpectedTag {
        tag: "wheel".to_string(),
        parent: "robot".to_string(),
        location: Some(SourceLocation {
            file: PathBuf::from("pandora.xml"),
            line: 12,
        }),
    };

    assert!(error.is_structural());
    assert_eq!(
        error.to_string(),
        "Unexpected tag <wheel> under <robot> (at pandora.xml:12)"
    );
}

#[test]
fn test_config_errors_are_fatal() {
    let error: LoaderError = ConfigError::Environment("bad".to_string()).into();
    assert!(error.is_fatal());

    let parse = LoaderError::XmlParse {
        path: PathBuf::from("robot.xml"),
        details: "line 1: boom".to_string(),
    };
    assert!(!parse.is_fatal());
}

#[test]
fn test_invalid_value_message() {
    let error = LoaderError::InvalidValue {
        tag: "radius".to_string(),
        value: "wide".to_string(),
        reason: "expected a number".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Invalid value for <radius>: 'wide' - expected a number"
    );
}
