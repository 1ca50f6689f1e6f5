
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {

    #[error("failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // the corpus directory held fewer aligned pairs than requested.
    // a single pass over the directory is made, never a re-scan.
    #[error("corpus exhausted: requested {requested} sentence pairs but only {available} available")]
    CorpusExhausted { requested: usize, available: usize },

    #[error("no target-language twin for source file {0:?}")]
    MissingTargetFile(PathBuf),

    #[error("model not found: {0:?}")]
    ModelNotFound(PathBuf),

    // a pair reached the E-step with no initialized probability entry,
    // meaning the initializer and trainer disagree on the corpus. fatal.
    #[error("support violation: no probability entry for pair ({source_word}, {target_word})")]
    SupportViolation {
        source_word: String,
        target_word: String,
    },

    #[error("bad configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
