//! Error types for the financial prediction orchestrator

use thiserror::Error;

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, PredictionError>;

#[derive(Error, Debug)]
pub enum PredictionError {

    // =============================
    // Request-Fatal Errors
    // =============================

    /// Raw profile is missing or malformed a required field.
    /// Aborts the whole run before any model is invoked.
    #[error("Invalid input: {0}")]
    Input(String),

    /// A feature view could not be built from otherwise-valid derived
    /// data. Signals a contract mismatch, aborts the whole run.
    #[error("Feature view '{view}' failed validation, bad fields: {fields:?}")]
    Schema {
        view: &'static str,
        fields: Vec<&'static str>,
    },

    // =============================
    // Process-Fatal Errors
    // =============================

    /// A model artifact failed to load or did not match its expected
    /// contract at process start. Never raised per-request.
    #[error("Model startup error: {0}")]
    Startup(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Adapter-level failures are intentionally not represented here: a failed
// model invocation is recorded as `Outcome::Failure` inside the aggregate
// result and never aborts the run.
