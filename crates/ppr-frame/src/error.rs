use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("row arity mismatch: expected {expected} values, found {found}")]
    RowArity { expected: usize, found: usize },
    #[error("column length mismatch: expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
