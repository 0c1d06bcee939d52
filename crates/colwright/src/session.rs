//! A working session: one dataset, its operation history and an engine.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::error::{ColwrightError, Result};
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::schema::Dataset;
use crate::transform::{OperationLog, OperationResult, TransformEngine, TransformOperation};

/// Owns the current dataset and the log of operations applied to it.
///
/// Successful operations replace the dataset and are recorded; failed ones
/// leave both untouched.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    log: OperationLog,
    engine: TransformEngine,
    source: Option<SourceMetadata>,
}

impl Session {
    /// Start a session on an in-memory dataset with a default engine.
    pub fn new(dataset: Dataset) -> Self {
        Self::with_engine(dataset, TransformEngine::new())
    }

    /// Start a session with a configured engine.
    pub fn with_engine(dataset: Dataset, engine: TransformEngine) -> Self {
        Self {
            dataset,
            log: OperationLog::new(),
            engine,
            source: None,
        }
    }

    /// Load a CSV/TSV file and start a session on it.
    pub fn open(path: impl AsRef<Path>, parser: ParserConfig, engine: TransformEngine) -> Result<Self> {
        let (dataset, source) = Parser::with_config(parser).parse_file(path)?;
        info!(
            file = %source.file,
            rows = source.row_count,
            columns = source.column_count,
            "opened dataset"
        );
        Ok(Self {
            source: Some(source),
            ..Self::with_engine(dataset, engine)
        })
    }

    /// The current dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The engine used for every operation.
    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    /// Metadata of the file the session was opened from.
    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    /// Apply an operation, committing the new dataset on success.
    pub fn apply(&mut self, operation: &TransformOperation) -> OperationResult {
        let (dataset, result) = self.engine.apply(&self.dataset, operation, &mut self.log);
        if result.success {
            self.dataset = dataset;
        }
        result
    }

    /// Apply operations in order, stopping at the first failure.
    ///
    /// Returns the results of every attempted operation; the last one is the
    /// failure, if any.
    pub fn apply_all(&mut self, operations: &[TransformOperation]) -> Vec<OperationResult> {
        let mut results = Vec::with_capacity(operations.len());
        for operation in operations {
            let result = self.apply(operation);
            let failed = !result.success;
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    /// Run an operation on the first `rows` rows without committing anything.
    pub fn preview(&self, operation: &TransformOperation, rows: usize) -> (Dataset, OperationResult) {
        let mut scratch = OperationLog::new();
        self.engine.apply(&self.dataset.head(rows), operation, &mut scratch)
    }

    /// Results of every committed operation, oldest first.
    pub fn history(&self) -> &[OperationResult] {
        self.log.entries()
    }

    /// The operation log.
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// Forget the operation history. The dataset is kept as is.
    pub fn clear_history(&mut self) {
        self.log.clear();
    }

    /// Consume the session and return the current dataset.
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

/// Load an operation pipeline: a JSON array of tagged operations.
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<Vec<TransformOperation>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ColwrightError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ColwrightError::Config(format!("Invalid pipeline '{}': {}", path.display(), e)))
}
