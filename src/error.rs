use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures while reading the ticket and goal sources.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required column {column}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("row {row}: unparseable opening date {value:?}")]
    MalformedDate { row: usize, value: String },

    #[error("invalid OTD goal {value:?} for contract {contract}")]
    InvalidGoal { contract: String, value: String },
}
