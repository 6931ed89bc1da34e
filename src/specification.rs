//! Loading of the shared specification handle.
//!
//! A [`Specification`] bundles the compiled [`Schema`] with the set of tags
//! whose repeated siblings must stay distinct. It is loaded once, before any
//! robot file is parsed, and handed to every parse as an `Arc`.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ResourceConfig;
use crate::error::{LoaderError, Result};
use crate::node::GenericNode;
use crate::schema::Schema;
use crate::xml::{DocumentParser, QuickXmlParser};

/// Immutable schema and non-mergable tag set shared by all parses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    schema: Schema,
    non_mergable: BTreeSet<String>,
}

impl Specification {
    pub fn new(schema: Schema, non_mergable: BTreeSet<String>) -> Self {
        Self {
            schema,
            non_mergable,
        }
    }

    /// Load both specification files with the default XML parser
    pub fn load(resources: &ResourceConfig) -> Result<Arc<Self>> {
        SpecificationLoader::default().load(resources)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn non_mergable(&self) -> &BTreeSet<String> {
        &self.non_mergable
    }

    /// Whether same-tag siblings named `tag` may be combined
    pub fn is_mergable(&self, tag: &str) -> bool {
        !self.non_mergable.contains(tag)
    }
}

/// Reads the specification and non-mergable files through a [`DocumentParser`]
pub struct SpecificationLoader {
    parser: Arc<dyn DocumentParser>,
}

impl Default for SpecificationLoader {
    fn default() -> Self {
        Self::new(Arc::new(QuickXmlParser::new()))
    }
}

impl SpecificationLoader {
    pub fn new(parser: Arc<dyn DocumentParser>) -> Self {
        Self { parser }
    }

    /// Load the files named by `resources`, resolved against its base path
    pub fn load(&self, resources: &ResourceConfig) -> Result<Arc<Specification>> {
        self.load_from_paths(
            &resources.specifications_path(),
            &resources.multiple_allowed_path(),
        )
    }

    pub fn load_from_paths(
        &self,
        specifications: &Path,
        multiple_allowed: &Path,
    ) -> Result<Arc<Specification>> {
        let tree = self.parse(specifications)?;
        let schema = Schema::from_tree(&tree);
        if schema.is_empty() {
            return Err(LoaderError::ConfigLoad {
                path: specifications.to_path_buf(),
                details: format!("specification root <{}> describes no tags", tree.tag),
            });
        }
        debug!(
            path = %specifications.display(),
            tags = schema.len(),
            "compiled specification"
        );

        let list = self.parse(multiple_allowed)?;
        let non_mergable = non_mergable_tags(&list);
        debug!(
            path = %multiple_allowed.display(),
            tags = non_mergable.len(),
            "loaded non-mergable tags"
        );

        info!(
            tags = schema.len(),
            non_mergable = non_mergable.len(),
            "specification loaded"
        );
        Ok(Arc::new(Specification::new(schema, non_mergable)))
    }

    fn parse(&self, path: &Path) -> Result<GenericNode> {
        self.parser
            .parse_file(path)
            .map_err(|err| LoaderError::ConfigLoad {
                path: path.to_path_buf(),
                details: err.to_string(),
            })
    }
}

/// Every non-empty leaf value of the list document names one tag
fn non_mergable_tags(list: &GenericNode) -> BTreeSet<String> {
    list.iter()
        .filter(|node| node.is_leaf())
        .filter_map(GenericNode::text)
        .map(str::to_string)
        .collect()
}
