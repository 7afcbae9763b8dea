use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LcaError {
    #[error("no process steps defined for calculation")]
    EmptySteps,

    #[error("duplicate process step id '{id}'")]
    DuplicateStepId { id: String },

    #[error("invalid process step '{step_id}': {reason}")]
    InvalidStep { step_id: String, reason: String },

    #[error("failed to parse calculation input: {0}")]
    InputParse(String),

    #[error("invalid scenario change: {0}")]
    InvalidChange(String),

    #[error("arithmetic overflow in {0}")]
    Overflow(String),

    #[error("failed to load factor tables from {path}: {reason}")]
    FactorTableLoad { path: PathBuf, reason: String },

    #[error("invalid factor tables: {0}")]
    FactorTableInvalid(String),

    #[error("failed to load reference data from {path}: {reason}")]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LcaError {
    /// True for errors caused by the step data handed to the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LcaError::EmptySteps
                | LcaError::DuplicateStepId { .. }
                | LcaError::InvalidStep { .. }
                | LcaError::InputParse(_)
                | LcaError::InvalidChange(_)
                | LcaError::Overflow(_)
        )
    }
}
