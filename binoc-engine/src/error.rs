use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A run was requested without a usable sequence (missing or empty).
    #[error("stimulus sequence is missing or empty")]
    InvalidSequence,
}
