//! Collapsing of sibling nodes that describe the same field.
//!
//! Two siblings describe the same field when they share a tag. Tags listed as
//! non-mergable never combine.

use tracing::debug;

use crate::node::GenericNode;
use crate::specification::Specification;

pub struct NodeMerger<'a> {
    spec: &'a Specification,
}

impl<'a> NodeMerger<'a> {
    pub fn new(spec: &'a Specification) -> Self {
        Self { spec }
    }

    /// Perform one structural merge, deepest child lists first.
    ///
    /// Only pairs where at least one sibling has element children are
    /// considered here; leaf pairs are left to [`NodeMerger::merge_values`].
    pub fn merge_once(&self, node: &mut GenericNode) -> bool {
        for child in &mut node.children {
            if self.merge_once(child) {
                return true;
            }
        }

        match self.first_structural_pair(&node.children) {
            Some((first, second)) => {
                let second = node.children.remove(second);
                absorb(&mut node.children[first], second);
                true
            }
            None => false,
        }
    }

    /// Run [`NodeMerger::merge_once`] until nothing changes; returns the merge count
    pub fn merge_all(&self, tree: &mut GenericNode) -> usize {
        // Every merge removes a node, so this terminates
        let mut merges = 0;
        while self.merge_once(tree) {
            merges += 1;
        }
        if merges > 0 {
            debug!(merges, "merged sibling nodes");
        }
        merges
    }

    /// Collapse same-field leaf siblings into the first one; the first non-empty value wins
    pub fn merge_values(&self, node: &mut GenericNode) {
        let mut index = 0;
        while index < node.children.len() {
            let mut other = index + 1;
            while other < node.children.len() {
                if self.leaf_pair(&node.children[index], &node.children[other]) {
                    let duplicate = node.children.remove(other);
                    absorb(&mut node.children[index], duplicate);
                } else {
                    other += 1;
                }
            }
            index += 1;
        }

        for child in &mut node.children {
            self.merge_values(child);
        }
    }

    /// Structural fixpoint followed by the value pass
    pub fn normalize(&self, tree: &mut GenericNode) -> usize {
        let merges = self.merge_all(tree);
        self.merge_values(tree);
        merges
    }

    fn first_structural_pair(&self, children: &[GenericNode]) -> Option<(usize, usize)> {
        for (i, first) in children.iter().enumerate() {
            for (offset, second) in children[i + 1..].iter().enumerate() {
                if self.same_field(first, second) && !(first.is_leaf() && second.is_leaf()) {
                    return Some((i, i + 1 + offset));
                }
            }
        }
        None
    }

    fn leaf_pair(&self, first: &GenericNode, second: &GenericNode) -> bool {
        first.is_leaf() && second.is_leaf() && self.same_field(first, second)
    }

    fn same_field(&self, first: &GenericNode, second: &GenericNode) -> bool {
        first.tag == second.tag && self.spec.is_mergable(&first.tag)
    }
}

/// Fold `other` into `target`: children appended, attributes and value first-wins
fn absorb(target: &mut GenericNode, other: GenericNode) {
    if target.text().is_none() && other.text().is_some() {
        target.value = other.value;
    }
    for (key, value) in other.attributes {
        if target.attribute(&key).is_none() {
            target.attributes.push((key, value));
        }
    }
    if target.location.is_none() {
        target.location = other.location;
    }
    target.children.extend(other.children);
}
