//! Inclusion directive expansion.
//!
//! `<include file="..."/>` (or the older `<filename>...</filename>`) nodes are
//! replaced by the children of the root element of the file they name; the
//! root itself is a wrapper and is dropped. [`FilenameExpander::expand`]
//! performs exactly one replacement; [`FilenameExpander::expand_all`] drives it
//! to a fixpoint under a fixed bound so include cycles fail instead of hanging.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::ResourceConfig;
use crate::error::{LoaderError, Result};
use crate::node::GenericNode;
use crate::xml::DocumentParser;

/// Tags that name another file to splice in
pub const INCLUSION_TAGS: [&str; 2] = ["include", "filename"];

pub fn is_inclusion(node: &GenericNode) -> bool {
    INCLUSION_TAGS.contains(&node.tag.as_str())
}

pub struct FilenameExpander {
    parser: Arc<dyn DocumentParser>,
    resources: ResourceConfig,
    max_expansions: usize,
}

impl FilenameExpander {
    pub fn new(
        parser: Arc<dyn DocumentParser>,
        base_path: impl Into<PathBuf>,
        max_expansions: usize,
    ) -> Self {
        Self {
            parser,
            resources: ResourceConfig::with_base_path(base_path),
            max_expansions,
        }
    }

    /// Replace the first inclusion node in pre-order with the referenced content.
    ///
    /// Returns `Ok(false)` when the tree holds no inclusion node.
    pub fn expand(&self, tree: &mut GenericNode) -> Result<bool> {
        if is_inclusion(tree) {
            let included = self.load_inclusion(tree)?;
            *tree = included;
            return Ok(true);
        }
        self.expand_children(tree)
    }

    /// Expand until no inclusion node remains, returning the number of expansions
    pub fn expand_all(&self, tree: &mut GenericNode) -> Result<usize> {
        let document = tree
            .location
            .as_ref()
            .map(|location| location.file.clone())
            .unwrap_or_default();

        let mut expansions = 0;
        while expansions < self.max_expansions {
            if !self.expand(tree)? {
                return Ok(expansions);
            }
            expansions += 1;
        }

        if tree.iter().any(is_inclusion) {
            return Err(LoaderError::CycleDetected {
                path: document,
                expansions,
            });
        }
        Ok(expansions)
    }

    fn expand_children(&self, parent: &mut GenericNode) -> Result<bool> {
        for index in 0..parent.children.len() {
            if is_inclusion(&parent.children[index]) {
                // The included root is only a wrapper; its children take the directive's place
                let included = self.load_inclusion(&parent.children[index])?;
                parent.children.splice(index..=index, included.children);
                return Ok(true);
            }
            if self.expand_children(&mut parent.children[index])? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn load_inclusion(&self, node: &GenericNode) -> Result<GenericNode> {
        let target = inclusion_target(node).ok_or_else(|| LoaderError::XmlParse {
            path: node
                .location
                .as_ref()
                .map(|location| location.file.clone())
                .unwrap_or_default(),
            details: match &node.location {
                Some(location) => format!(
                    "line {}: <{}> does not name a file",
                    location.line, node.tag
                ),
                None => format!("<{}> does not name a file", node.tag),
            },
        })?;

        let path = self.resources.resolve(Path::new(target));
        debug!(tag = %node.tag, path = %path.display(), "expanding inclusion");
        self.parser.parse_file(&path)
    }

}

/// File named by an inclusion node: `file` attribute, then `path`, then its text
fn inclusion_target(node: &GenericNode) -> Option<&str> {
    node.attribute("file")
        .or_else(|| node.attribute("path"))
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .or_else(|| node.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::QuickXmlParser;
    use std::fs;
    use tempfile::TempDir;

    fn expander(dir: &TempDir) -> FilenameExpander {
        FilenameExpander::new(Arc::new(QuickXmlParser::new()), dir.path(), 16)
    }

    fn parse(xml: &str) -> GenericNode {
        QuickXmlParser::new()
            .parse_str(xml, Path::new("robot.xml"))
            .unwrap()
    }

    #[test]
    fn test_no_inclusion_leaves_tree_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut tree = parse("<robot><footprint/><sensor/></robot>");
        let before = tree.clone();

        assert!(!expander(&dir).expand(&mut tree).unwrap());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_include_splices_at_position() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("extra.xml"),
            r#"<extra><sensor type="sonar"/></extra>"#,
        )
        .unwrap();

        let mut tree =
            parse(r#"<robot><footprint/><include file="extra.xml"/><parameter/></robot>"#);
        assert!(expander(&dir).expand(&mut tree).unwrap());

        let tags: Vec<&str> = tree.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["footprint", "sensor", "parameter"]);
        assert_eq!(tree.children[1].attribute("type"), Some("sonar"));
    }

    #[test]
    fn test_wrapper_with_several_children_splices_all_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("sensors.xml"),
            r#"<sensors><sensor type="laser"/><sensor type="sonar"/></sensors>"#,
        )
        .unwrap();

        let mut tree =
            parse(r#"<robot><footprint/><include file="sensors.xml"/><parameter/></robot>"#);
        assert_eq!(expander(&dir).expand_all(&mut tree).unwrap(), 1);

        let tags: Vec<&str> = tree.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["footprint", "sensor", "sensor", "parameter"]);
        assert_eq!(tree.children[1].attribute("type"), Some("laser"));
        assert_eq!(tree.children[2].attribute("type"), Some("sonar"));
    }

    #[test]
    fn test_empty_wrapper_removes_directive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.xml"), "<extra/>").unwrap();

        let mut tree = parse(r#"<robot><footprint/><include file="empty.xml"/></robot>"#);
        assert!(expander(&dir).expand(&mut tree).unwrap());
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn test_filename_inside_field_splices_children() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hokuyo.xml"),
            "<laser><range>4.0</range><frequency>10</frequency></laser>",
        )
        .unwrap();

        let mut tree = parse("<robot><laser><filename>hokuyo.xml</filename></laser></robot>");
        expander(&dir).expand_all(&mut tree).unwrap();

        let laser = &tree.children[0];
        let tags: Vec<&str> = laser.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["range", "frequency"]);
    }

    #[test]
    fn test_root_inclusion_is_replaced() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("robot.xml"), "<robot><footprint/></robot>").unwrap();

        let mut tree = parse(r#"<include path="robot.xml"/>"#);
        assert_eq!(expander(&dir).expand_all(&mut tree).unwrap(), 1);
        assert_eq!(tree.tag, "robot");
    }

    #[test]
    fn test_nested_chain_terminates() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.xml"),
            r#"<extra><sensor><include file="b.xml"/></sensor></extra>"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.xml"), "<extra><pose><x>1</x></pose></extra>").unwrap();

        let mut tree = parse(r#"<robot><include file="a.xml"/></robot>"#);
        let expansions = expander(&dir).expand_all(&mut tree).unwrap();

        assert_eq!(expansions, 2);
        assert!(!tree.iter().any(is_inclusion));
        assert_eq!(tree.children[0].children[0].tag, "pose");
    }

    #[test]
    fn test_cycle_is_detected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("loop.xml"),
            r#"<extra><sensor><include file="loop.xml"/></sensor></extra>"#,
        )
        .unwrap();

        let mut tree = parse(r#"<robot><include file="loop.xml"/></robot>"#);
        let err = expander(&dir).expand_all(&mut tree).unwrap_err();

        match err {
            LoaderError::CycleDetected { path, expansions } => {
                assert_eq!(path, Path::new("robot.xml"));
                assert_eq!(expansions, 16);
            }
            other => panic!("Expected CycleDetected, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_target_is_file_not_found() {
        let dir = TempDir::new().unwrap();
        let mut tree = parse(r#"<robot><include file="absent.xml"/></robot>"#);

        let err = expander(&dir).expand(&mut tree).unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound { .. }));
    }

    #[test]
    fn test_inclusion_without_target_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut tree = parse("<robot>\n<include/>\n</robot>");

        let err = expander(&dir).expand(&mut tree).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
