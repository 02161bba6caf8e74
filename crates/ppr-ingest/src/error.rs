use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("expected sheet not found: {0}")]
    MissingSheet(String),
    #[error("expected column {column} not found in sheet {sheet}")]
    MissingColumn { sheet: String, column: String },
    #[error("invalid workbook manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },
    #[error(transparent)]
    Frame(#[from] ppr_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
