//! Merge properties of the node merger

use std::collections::BTreeSet;

use robot_xml_loader::{GenericNode, NodeMerger, Schema, Specification};

use crate::common::mocks::node;

fn specification(non_mergable: &[&str]) -> Specification {
    Specification::new(
        Schema::from_tree(&GenericNode::new("specifications")),
        non_mergable.iter().map(|tag| tag.to_string()).collect::<BTreeSet<_>>(),
    )
}

#[test]
fn test_merge_once_on_merged_tree_changes_nothing() {
    let spec = specification(&["sensor"]);
    let merger = NodeMerger::new(&spec);
    let mut tree = node(
        "<robot><footprint><radius>1</radius></footprint><footprint><points/></footprint></robot>",
        "robot.xml",
    );

    merger.merge_all(&mut tree);
    let merged = tree.clone();

    assert!(!merger.merge_once(&mut tree));
    assert_eq!(tree, merged);
}

#[test]
fn test_merge_keeps_first_position() {
    let spec = specification(&[]);
    let merger = NodeMerger::new(&spec);
    let mut tree = node(
        "<robot><kinematic><a/></kinematic><footprint/><kinematic><b/></kinematic></robot>",
        "robot.xml",
    );

    merger.merge_all(&mut tree);

    let tags: Vec<&str> = tree.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, vec!["kinematic", "footprint"]);
    let kinematic: Vec<&str> = tree.children[0]
        .children
        .iter()
        .map(|c| c.tag.as_str())
        .collect();
    assert_eq!(kinematic, vec!["a", "b"]);
}

#[test]
fn test_non_mergable_tags_survive_repeated_passes() {
    let spec = specification(&["sensor"]);
    let merger = NodeMerger::new(&spec);
    let mut tree = node(
        r#"<robot>
             <sensor><frequency>10</frequency></sensor>
             <sensor><frequency>20</frequency></sensor>
           </robot>"#,
        "robot.xml",
    );

    for _ in 0..5 {
        merger.normalize(&mut tree);
    }

    let frequencies: Vec<&str> = tree
        .children_named("sensor")
        .filter_map(|sensor| sensor.scalar("frequency"))
        .collect();
    assert_eq!(frequencies, vec!["10", "20"]);
}

#[test]
fn test_siblings_with_different_attributes_merge_first_wins() {
    let spec = specification(&[]);
    let merger = NodeMerger::new(&spec);
    let mut tree = node(
        r#"<robot>
             <A name="a" frame="base"><x/></A>
             <A name="b" colour="red"><y/></A>
           </robot>"#,
        "robot.xml",
    );

    assert!(merger.merge_once(&mut tree));

    assert_eq!(tree.children.len(), 1);
    let merged = &tree.children[0];
    assert_eq!(merged.attribute("name"), Some("a"));
    assert_eq!(merged.attribute("frame"), Some("base"));
    assert_eq!(merged.attribute("colour"), Some("red"));
    let children: Vec<&str> = merged.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(children, vec!["x", "y"]);
}

#[test]
fn test_merged_children_are_merged_again() {
    let spec = specification(&[]);
    let merger = NodeMerger::new(&spec);
    let mut tree = node(
        r#"<robot>
             <footprint><points><point><x>1</x></point></points></footprint>
             <footprint><points><point><y>2</y></point></points></footprint>
           </robot>"#,
        "robot.xml",
    );

    merger.normalize(&mut tree);

    let footprint = &tree.children[0];
    assert_eq!(tree.children.len(), 1);
    assert_eq!(footprint.children.len(), 1);
    let points = &footprint.children[0];
    assert_eq!(points.children.len(), 1);
    let point = &points.children[0];
    assert_eq!(point.scalar("x"), Some("1"));
    assert_eq!(point.scalar("y"), Some("2"));
}
