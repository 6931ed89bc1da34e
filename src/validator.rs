//! Structural validation of a canonical tree against the compiled schema.
//!
//! Two passes run in order: every tag must be allowed beneath its parent, then
//! every tag must contain the children the schema marks as required beneath
//! it. Both passes walk in pre-order and stop at the first violation.

use tracing::debug;

use crate::error::{LoaderError, Result};
use crate::node::GenericNode;
use crate::schema::Schema;

pub struct Validator<'a> {
    schema: &'a Schema,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Allowed pass followed by the required pass
    pub fn validate(&self, tree: &GenericNode) -> Result<()> {
        self.check_allowed(tree)?;
        self.check_required(tree)?;
        debug!(root = %tree.tag, nodes = tree.size(), "tree matches specification");
        Ok(())
    }

    /// Every node's tag must be allowed under its parent; the document root is
    /// checked against the top of the specification.
    pub fn check_allowed(&self, tree: &GenericNode) -> Result<()> {
        if !self.schema.is_allowed(None, &tree.tag) {
            return Err(unexpected(tree, self.schema.root_tag()));
        }
        self.check_allowed_children(tree)
    }

    /// Every node must have at least one child for each tag required beneath it
    pub fn check_required(&self, node: &GenericNode) -> Result<()> {
        if let Some(missing) = self
            .schema
            .required_under(&node.tag)
            .find(|required| node.child(required).is_none())
        {
            return Err(LoaderError::MissingRequiredTag {
                tag: missing.to_string(),
                parent: node.tag.clone(),
                location: node.location.clone(),
            });
        }

        node.children
            .iter()
            .try_for_each(|child| self.check_required(child))
    }

    fn check_allowed_children(&self, parent: &GenericNode) -> Result<()> {
        for child in &parent.children {
            if !self.schema.is_allowed(Some(&parent.tag), &child.tag) {
                return Err(unexpected(child, &parent.tag));
            }
            self.check_allowed_children(child)?;
        }
        Ok(())
    }
}

fn unexpected(node: &GenericNode, parent: &str) -> LoaderError {
    LoaderError::UnexpectedTag {
        tag: node.tag.clone(),
        parent: parent.to_string(),
        location: node.location.clone(),
    }
}
