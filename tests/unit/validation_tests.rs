//! Structural validation against the bundled specification

use robot_xml_loader::{LoaderError, ResourceConfig, Specification, Validator};

use crate::common::mocks::node;
use crate::common::test_helpers::bundled_resources;

fn bundled() -> std::sync::Arc<Specification> {
    Specification::load(&ResourceConfig::with_base_path(bundled_resources())).unwrap()
}

#[test]
fn test_bundled_specification_loads() {
    let spec = bundled();
    assert!(spec.schema().is_allowed(None, "robot"));
    assert!(!spec.is_mergable("laser"));
    assert!(spec.is_mergable("footprint"));
}

#[test]
fn test_flat_robot_is_valid() {
    let spec = bundled();
    let tree = node(
        r#"<robot>
             <footprint><radius>0.2</radius></footprint>
             <laser><frequency>10</frequency><max_range>4</max_range></laser>
             <parameter name="speed">1</parameter>
           </robot>"#,
        "robot.xml",
    );

    assert!(Validator::new(spec.schema()).validate(&tree).is_ok());
}

#[test]
fn test_wrapped_robot_requires_footprint() {
    let spec = bundled();
    let tree = node(
        "<robot><robot_specifications><laser/></robot_specifications></robot>",
        "robot.xml",
    );

    match Validator::new(spec.schema()).validate(&tree).unwrap_err() {
        LoaderError::MissingRequiredTag { tag, parent, .. } => {
            assert_eq!(tag, "footprint");
            assert_eq!(parent, "robot_specifications");
        }
        other => panic!("Expected MissingRequiredTag, got {:?}", other),
    }
}

#[test]
fn test_unknown_sensor_field_is_rejected() {
    let spec = bundled();
    let tree = node(
        "<robot><footprint/><sonar><wavelength>3</wavelength></sonar></robot>",
        "robot.xml",
    );

    match Validator::new(spec.schema()).validate(&tree).unwrap_err() {
        LoaderError::UnexpectedTag { tag, parent, .. } => {
            assert_eq!(tag, "wavelength");
            assert_eq!(parent, "sonar");
        }
        other => panic!("Expected UnexpectedTag, got {:?}", other),
    }
}
