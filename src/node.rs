//! Generic element tree shared by every pipeline stage.
//!
//! A [`GenericNode`] mirrors one XML element: its tag, its attributes, an
//! optional text value and its ordered children. Children are owned by their
//! parent; traversals that need parent context carry it themselves.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a node came from, used to point diagnostics at the offending element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// One element of a robot description or specification document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenericNode {
    pub tag: String,
    /// Attributes in document order; keys are unique
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GenericNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

// Locations are diagnostics only; two trees with the same content are equal
// regardless of which file they were read from.
impl PartialEq for GenericNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.attributes == other.attributes
            && self.value == other.value
            && self.children == other.children
    }
}

impl GenericNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn with_child(mut self, child: GenericNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// A node without element children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Non-empty, trimmed text value
    pub fn text(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&GenericNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a GenericNode> {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Scalar field lookup: a child leaf's value first, then an attribute of the same name
    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.child(name)
            .and_then(GenericNode::text)
            .or_else(|| self.attribute(name))
    }

    /// Pre-order, depth-first iterator over this node and all of its descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes in the subtree rooted here
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.tag, indent = depth * 2)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, value)?;
        }
        if let Some(value) = &self.value {
            write!(f, " = {:?}", value)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for GenericNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a GenericNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a GenericNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
