//! The robot loading pipeline.
//!
//! [`RobotLoader::create_robot_message`] runs one file through every stage:
//!
//! 1. parse the file into a [`GenericNode`] tree
//! 2. expand inclusion directives until none remain
//! 3. merge same-field siblings, then merge leaf values
//! 4. validate allowed tags, then required tags
//! 5. project the canonical tree into a [`RobotMessage`]
//!
//! The loaded [`Specification`] is shared read-only, so independent files can
//! be processed in parallel by [`RobotLoader::process_files`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::MessageBuilder;
use crate::config::{Config, ConfigManager};
use crate::error::{LoaderError, Result};
use crate::expander::FilenameExpander;
use crate::merger::NodeMerger;
use crate::message::RobotMessage;
use crate::node::GenericNode;
use crate::specification::{Specification, SpecificationLoader};
use crate::validator::Validator;
use crate::xml::{DocumentParser, QuickXmlParser};

/// Outcome of loading a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadStatus {
    /// File produced a robot message
    Loaded,
    /// File was read but does not match the specification
    Invalid { message: String },
    /// File could not be read, parsed or expanded
    Error { message: String },
    /// File was not attempted (an earlier failure stopped the batch)
    Skipped { reason: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, LoadStatus::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadStatus::Error { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, LoadStatus::Skipped { .. })
    }
}

impl From<&LoaderError> for LoadStatus {
    fn from(error: &LoaderError) -> Self {
        if error.is_structural() {
            LoadStatus::Invalid {
                message: error.to_string(),
            }
        } else {
            LoadStatus::Error {
                message: error.to_string(),
            }
        }
    }
}

/// Result of loading a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<RobotMessage>,
}

impl FileLoadResult {
    pub fn loaded(path: PathBuf, message: RobotMessage, duration: Duration) -> Self {
        Self {
            path,
            status: LoadStatus::Loaded,
            duration,
            message: Some(message),
        }
    }

    pub fn failed(path: PathBuf, error: &LoaderError, duration: Duration) -> Self {
        Self {
            path,
            status: error.into(),
            duration,
            message: None,
        }
    }

    pub fn skipped(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            status: LoadStatus::Skipped {
                reason: reason.into(),
            },
            duration: Duration::ZERO,
            message: None,
        }
    }
}

/// Aggregated results of loading several files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResults {
    pub total: usize,
    pub loaded: usize,
    /// Invalid and errored files
    pub failed: usize,
    pub skipped: usize,
    /// Wall-clock duration of the whole batch
    pub duration: Duration,
    pub file_results: Vec<FileLoadResult>,
}

impl LoadResults {
    pub fn aggregate(file_results: Vec<FileLoadResult>, duration: Duration) -> Self {
        let mut loaded = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for result in &file_results {
            match result.status {
                LoadStatus::Loaded => loaded += 1,
                LoadStatus::Invalid { .. } | LoadStatus::Error { .. } => failed += 1,
                LoadStatus::Skipped { .. } => skipped += 1,
            }
        }

        Self {
            total: file_results.len(),
            loaded,
            failed,
            skipped,
            duration,
            file_results,
        }
    }

    /// Every file produced a message
    pub fn all_loaded(&self) -> bool {
        self.total > 0 && self.loaded == self.total
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.loaded as f64 / self.total as f64) * 100.0
        }
    }
}

/// Turns robot description files into [`RobotMessage`]s
pub struct RobotLoader {
    spec: Arc<Specification>,
    parser: Arc<dyn DocumentParser>,
    expander: FilenameExpander,
    threads: usize,
    fail_fast: bool,
}

impl RobotLoader {
    /// Load the specification named by `config` and build a loader around it
    pub fn from_config(config: &Config) -> Result<Self> {
        let parser: Arc<dyn DocumentParser> = Arc::new(QuickXmlParser::new());
        let spec = SpecificationLoader::new(Arc::clone(&parser)).load(&config.resources)?;
        Ok(Self::new(config, spec, parser))
    }

    pub fn new(
        config: &Config,
        spec: Arc<Specification>,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        let expander = FilenameExpander::new(
            Arc::clone(&parser),
            config.resources.base_path.clone(),
            config.expansion.max_expansions,
        );

        Self {
            spec,
            parser,
            expander,
            threads: ConfigManager::get_thread_count(config),
            fail_fast: config.processing.fail_fast,
        }
    }

    pub fn specification(&self) -> &Arc<Specification> {
        &self.spec
    }

    /// Parse, expand, merge and validate a file, returning its canonical tree
    pub fn load_tree(&self, path: &Path) -> Result<GenericNode> {
        let mut tree = self.parser.parse_file(path)?;

        let expansions = self.expander.expand_all(&mut tree)?;
        let merges = NodeMerger::new(&self.spec).normalize(&mut tree);
        debug!(
            path = %path.display(),
            expansions,
            merges,
            nodes = tree.size(),
            "normalized robot tree"
        );

        Validator::new(self.spec.schema()).validate(&tree)?;
        Ok(tree)
    }

    /// Run the whole pipeline for one robot file
    pub fn create_robot_message(&self, path: &Path) -> Result<RobotMessage> {
        let tree = self.load_tree(path)?;
        let message = MessageBuilder::new(self.spec.schema()).build(&tree)?;
        info!(
            path = %path.display(),
            sensors = message.sensors.len(),
            "robot message created"
        );
        Ok(message)
    }

    fn load_file(&self, path: &Path) -> FileLoadResult {
        let start = Instant::now();
        match self.create_robot_message(path) {
            Ok(message) => FileLoadResult::loaded(path.to_path_buf(), message, start.elapsed()),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "failed to load robot");
                FileLoadResult::failed(path.to_path_buf(), &error, start.elapsed())
            }
        }
    }

    /// Load every file in parallel, keeping the input order in the results
    pub fn process_files(&self, files: &[PathBuf]) -> Result<LoadResults> {
        let start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| LoaderError::Config(format!("Failed to start worker pool: {}", e)))?;

        let stop = AtomicBool::new(false);
        let file_results: Vec<FileLoadResult> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    if stop.load(Ordering::Relaxed) {
                        return FileLoadResult::skipped(
                            path.clone(),
                            "stopped after an earlier failure",
                        );
                    }
                    let result = self.load_file(path);
                    if self.fail_fast && !result.status.is_loaded() {
                        stop.store(true, Ordering::Relaxed);
                    }
                    result
                })
                .collect()
        });

        let results = LoadResults::aggregate(file_results, start.elapsed());
        info!(
            total = results.total,
            loaded = results.loaded,
            failed = results.failed,
            skipped = results.skipped,
            "batch complete"
        );
        Ok(results)
    }
}
