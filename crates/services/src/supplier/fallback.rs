use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use ladder_core::Question;

use super::QuestionSupplier;
use crate::error::SupplyError;

/// Tries `primary` first and falls back to `fallback` on any error.
#[derive(Clone)]
pub struct FallbackSupplier {
    primary: Arc<dyn QuestionSupplier>,
    fallback: Arc<dyn QuestionSupplier>,
}

impl FallbackSupplier {
    #[must_use]
    pub fn new(primary: Arc<dyn QuestionSupplier>, fallback: Arc<dyn QuestionSupplier>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl QuestionSupplier for FallbackSupplier {
    async fn supply(
        &self,
        count: usize,
        already_seen: &[String],
    ) -> Result<Vec<Question>, SupplyError> {
        match self.primary.supply(count, already_seen).await {
            Ok(questions) => Ok(questions),
            Err(err) => {
                warn!(error = %err, count, "primary question supplier failed, using fallback");
                self.fallback.supply(count, already_seen).await
            }
        }
    }
}
