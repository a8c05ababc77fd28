use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceGraphError {
    #[error("Invalid depth: {0}")]
    InvalidDepth(String),

    #[error("Malformed trace: {0}")]
    MalformedTrace(String),

    #[error("Empty trace: a trace must contain at least a root node")]
    EmptyTrace,

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TraceGraphError>;
