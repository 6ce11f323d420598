//! Shared error types for the services crate.

use thiserror::Error;

use ladder_core::QuestionError;

/// Errors emitted by question suppliers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SupplyError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("question generator returned an empty response")]
    EmptyResponse,
    #[error("question generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed question payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid question: {0}")]
    InvalidQuestion(#[from] QuestionError),
    #[error("expected {expected} questions, got {got}")]
    ShortBatch { expected: usize, got: usize },
    #[error("only {available} unseen questions left, {requested} requested")]
    Exhausted { requested: usize, available: usize },
}

/// Errors emitted by `GameHandle`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameLoopError {
    #[error("game loop has shut down")]
    Closed,
}
