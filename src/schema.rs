//! Typed view of the specification document.
//!
//! The specification is written as plain nested XML: beneath any element, its
//! child elements name the tags allowed under that tag, and `required="true"`
//! marks the ones that must be present. [`Schema::from_tree`] compiles that
//! tree once into a `tag -> rules` lookup table so validation never walks raw
//! XML.

use std::collections::{BTreeMap, BTreeSet};

use crate::node::GenericNode;

const REQUIRED_ATTRIBUTE: &str = "required";
const DEFAULT_ATTRIBUTE: &str = "default";

/// What may and must appear beneath one tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRules {
    pub allowed: BTreeSet<String>,
    pub required: BTreeSet<String>,
    pub default: Option<String>,
}

impl TagRules {
    pub fn allows(&self, tag: &str) -> bool {
        self.allowed.contains(tag)
    }

    fn add_child(&mut self, child: &GenericNode) {
        self.allowed.insert(child.tag.clone());
        if is_marked_required(child) {
            self.required.insert(child.tag.clone());
        }
    }
}

/// Allowed/required lookup table compiled from a specification tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    root_tag: String,
    root_rules: TagRules,
    rules: BTreeMap<String, TagRules>,
}

impl Schema {
    /// Compile a raw specification tree.
    ///
    /// The document root stands for "the top of a robot file": its children
    /// are the tags a robot document may start with. Rules for a tag that is
    /// described in several places are the union of all descriptions.
    pub fn from_tree(tree: &GenericNode) -> Self {
        let mut root_rules = TagRules::default();
        let mut rules: BTreeMap<String, TagRules> = BTreeMap::new();

        for child in &tree.children {
            root_rules.add_child(child);
            collect_rules(child, &mut rules);
        }

        Self {
            root_tag: tree.tag.clone(),
            root_rules,
            rules,
        }
    }

    /// Tag of the specification document's root element
    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    /// Rules for the top of a document
    pub fn root_rules(&self) -> &TagRules {
        &self.root_rules
    }

    pub fn rules(&self, tag: &str) -> Option<&TagRules> {
        self.rules.get(tag)
    }

    /// Whether `tag` may appear under `parent`; `None` means the document root
    pub fn is_allowed(&self, parent: Option<&str>, tag: &str) -> bool {
        match parent {
            None => self.root_rules.allows(tag),
            Some(parent) => self.rules(parent).is_some_and(|rules| rules.allows(tag)),
        }
    }

    /// Tags that must be present beneath `tag`, in name order
    pub fn required_under(&self, tag: &str) -> impl Iterator<Item = &str> {
        self.rules(tag)
            .into_iter()
            .flat_map(|rules| rules.required.iter().map(String::as_str))
    }

    pub fn default_value(&self, tag: &str) -> Option<&str> {
        self.rules(tag).and_then(|rules| rules.default.as_deref())
    }

    /// Number of distinct tags described below the root
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_rules.allowed.is_empty()
    }
}

fn collect_rules(node: &GenericNode, rules: &mut BTreeMap<String, TagRules>) {
    let entry = rules.entry(node.tag.clone()).or_default();
    if entry.default.is_none() {
        entry.default = node
            .attribute(DEFAULT_ATTRIBUTE)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
    }
    for child in &node.children {
        entry.add_child(child);
    }

    for child in &node.children {
        collect_rules(child, rules);
    }
}

fn is_marked_required(node: &GenericNode) -> bool {
    node.attribute(REQUIRED_ATTRIBUTE)
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "1"
            )
        })
        .unwrap_or(false)
}
