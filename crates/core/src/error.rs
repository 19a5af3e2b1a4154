//! Error types for the trellis extraction library.

use thiserror::Error;

/// Primary error type for layout analysis and wrapper matching.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("wrapper definition error: {0}")]
    WrapperXml(String),

    #[error("segment document error: {0}")]
    SegmentDocument(String),

    #[error("wrapper graph is not connected")]
    DisconnectedWrapper,

    #[error("wrapper graph has no enabled nodes")]
    EmptyPattern,

    #[error("search budget exceeded after {steps} assignments")]
    BudgetExceeded { steps: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for ExtractError.
pub type Result<T> = std::result::Result<T, ExtractError>;
