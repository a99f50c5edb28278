/// Errors that can occur while loading market or reference data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Data not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("No {0} column found")]
    MissingColumn(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
