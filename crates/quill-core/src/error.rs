use thiserror::Error;

/// Failures the lifecycle engine can report. Both are caller-fixable and
/// surface as 400-level responses at the API boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("no changes provided")]
    NoChanges,
}
