// Copyright @yucwang 2026

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A call was made in a state that does not allow it (unbound sensor,
    /// unprepared worker, zero-size range, ...).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A bound resource lacks a capability the job requires.
    #[error("capability mismatch: {0}")]
    Capability(String),

    #[error("work result has size {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    IncompatibleResult {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("registry error: {0}")]
    Registry(String),

    #[error("image output failed: {0}")]
    Image(String),

    #[error("worker thread panicked")]
    WorkerPanic,
}

pub type RenderResult<T> = Result<T, RenderError>;
