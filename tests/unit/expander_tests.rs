//! Include expansion through the parser seam

use std::path::{Path, PathBuf};
use std::sync::Arc;

use robot_xml_loader::expander::is_inclusion;
use robot_xml_loader::{FilenameExpander, LoaderError};

use crate::common::mocks::{InMemoryParser, MockParser, node};

#[test]
fn test_expand_resolves_against_base_path() {
    let mut parser = MockParser::new();
    parser
        .expect_parse_file()
        .withf(|path: &Path| path == Path::new("/robots/lasers/hokuyo.xml"))
        .times(1)
        .returning(|path| {
            Ok(node(
                "<lasers><laser><frequency>10</frequency></laser></lasers>",
                &path.to_string_lossy(),
            ))
        });

    let expander = FilenameExpander::new(Arc::new(parser), "/robots", 8);
    let mut tree = node(
        r#"<robot><footprint/><include file="lasers/hokuyo.xml"/></robot>"#,
        "robot.xml",
    );

    assert!(expander.expand(&mut tree).unwrap());
    assert_eq!(tree.children[1].tag, "laser");
}

#[test]
fn test_absolute_include_path_is_used_as_is() {
    let mut parser = MockParser::new();
    parser
        .expect_parse_file()
        .withf(|path: &Path| path == Path::new("/shared/sonar.xml"))
        .times(1)
        .returning(|_| Ok(node("<sonars><sonar/></sonars>", "/shared/sonar.xml")));

    let expander = FilenameExpander::new(Arc::new(parser), "/robots", 8);
    let mut tree = node(
        "<robot><filename>/shared/sonar.xml</filename></robot>",
        "robot.xml",
    );

    assert_eq!(expander.expand_all(&mut tree).unwrap(), 1);
    assert_eq!(tree.children[0].tag, "sonar");
}

#[test]
fn test_parse_failure_propagates() {
    let mut parser = MockParser::new();
    parser.expect_parse_file().returning(|path| {
        Err(LoaderError::XmlParse {
            path: path.to_path_buf(),
            details: "line 3: unexpected end".to_string(),
        })
    });

    let expander = FilenameExpander::new(Arc::new(parser), "/robots", 8);
    let mut tree = node(r#"<robot><include file="bad.xml"/></robot>"#, "robot.xml");

    let err = expander.expand(&mut tree).unwrap_err();
    assert!(matches!(err, LoaderError::XmlParse { .. }));
}

#[test]
fn test_inclusions_are_expanded_in_pre_order() {
    let parser = Arc::new(
        InMemoryParser::new()
            .with_document("/r/a.xml", "<a><sensor><include file=\"c.xml\"/></sensor></a>")
            .with_document("/r/b.xml", "<b><sensor/></b>")
            .with_document("/r/c.xml", "<c><pose/></c>"),
    );
    let expander = FilenameExpander::new(parser.clone(), "/r", 8);
    let mut tree = node(
        r#"<robot><include file="a.xml"/><include file="b.xml"/></robot>"#,
        "robot.xml",
    );

    assert_eq!(expander.expand_all(&mut tree).unwrap(), 3);
    assert_eq!(
        parser.requests(),
        vec![
            PathBuf::from("/r/a.xml"),
            PathBuf::from("/r/c.xml"),
            PathBuf::from("/r/b.xml"),
        ]
    );
    assert!(!tree.iter().any(is_inclusion));
}

#[test]
fn test_mutual_inclusion_reports_cycle() {
    let parser = Arc::new(
        InMemoryParser::new()
            .with_document("/r/a.xml", "<a><sensor><include file=\"b.xml\"/></sensor></a>")
            .with_document("/r/b.xml", "<b><pose><include file=\"a.xml\"/></pose></b>"),
    );
    let expander = FilenameExpander::new(parser, "/r", 5);
    let mut tree = node(r#"<robot><include file="a.xml"/></robot>"#, "robot.xml");

    match expander.expand_all(&mut tree).unwrap_err() {
        LoaderError::CycleDetected { expansions, .. } => assert_eq!(expansions, 5),
        other => panic!("Expected CycleDetected, got {:?}", other),
    }
}
