mod bank;
mod fallback;
mod generator;

use async_trait::async_trait;

use ladder_core::Question;

use crate::error::SupplyError;

pub use bank::QuestionBank;
pub use fallback::FallbackSupplier;
pub use generator::{QuestionGenConfig, QuestionGenerator};

/// Source of fresh questions.
///
/// Implementations return exactly `count` questions whose prompts are not in
/// `already_seen`, with options already in presentation order.
#[async_trait]
pub trait QuestionSupplier: Send + Sync {
    /// # Errors
    ///
    /// Returns `SupplyError` when no batch of the requested size can be produced.
    async fn supply(
        &self,
        count: usize,
        already_seen: &[String],
    ) -> Result<Vec<Question>, SupplyError>;
}
