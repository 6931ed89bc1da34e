use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mockall::mock;
use robot_xml_loader::{DocumentParser, GenericNode, LoaderError, QuickXmlParser};

// Parser whose documents are scripted per test
mock! {
    pub Parser {}

    impl DocumentParser for Parser {
        fn parse_file(&self, path: &Path) -> robot_xml_loader::Result<GenericNode>;
    }
}

/// Parse an inline document the way the production parser would
pub fn node(xml: &str, origin: &str) -> GenericNode {
    QuickXmlParser::new()
        .parse_str(xml, Path::new(origin))
        .unwrap()
}

/// Parser serving documents from memory and recording every path it is asked for
#[derive(Default)]
pub struct InMemoryParser {
    documents: HashMap<PathBuf, String>,
    requests: Mutex<Vec<PathBuf>>,
}

impl InMemoryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, xml: &str) -> Self {
        self.documents.insert(path.into(), xml.to_string());
        self
    }

    pub fn requests(&self) -> Vec<PathBuf> {
        self.requests.lock().unwrap().clone()
    }
}

impl DocumentParser for InMemoryParser {
    fn parse_file(&self, path: &Path) -> robot_xml_loader::Result<GenericNode> {
        self.requests.lock().unwrap().push(path.to_path_buf());
        match self.documents.get(path) {
            Some(xml) => QuickXmlParser::new().parse_str(xml, path),
            None => Err(LoaderError::FileNotFound {
                path: path.to_path_buf(),
            }),
        }
    }
}
