use thiserror::Error;

/// Errors raised by the projection engine itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error(
        "insufficient history at offset {offset}: pattern {pattern_length}, forward {forward_length}, series {len}"
    )]
    InsufficientHistory {
        offset: usize,
        pattern_length: usize,
        forward_length: usize,
        len: usize,
    },

    #[error("series is not strictly ascending at index {index}")]
    Unordered { index: usize },

    #[error("truncation offset {offset} leaves too little of a {len}-point series")]
    InvalidOffset { offset: usize, len: usize },

    #[error("projected date {steps} steps of {step_secs}s past the anchor is out of range")]
    DateOutOfRange { step_secs: i64, steps: usize },
}

/// Errors at the data-source boundary, kept apart from engine errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("price source error: {0}")]
    Source(String),

    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
