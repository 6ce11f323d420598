use serde::Serialize;

use crate::ladder::PrizeLadder;
use crate::model::{GamePhase, Lifeline, LifelineState, Question};
use crate::oracle::Advice;

/// Everything the presentation layer needs to render one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub generation: u64,
    pub phase: GamePhase,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: Option<Question>,
    pub selected_answer: Option<String>,
    pub disabled_answers: Vec<String>,
    pub lifelines: LifelineState,
    pub switch_unlocked: bool,
    pub advice: Option<Advice>,
    pub error: Option<String>,
    pub buffered: usize,
    pub awaiting_question: bool,
}

impl GameSnapshot {
    #[must_use]
    pub fn is_disabled(&self, option: &str) -> bool {
        self.disabled_answers.iter().any(|hidden| hidden == option)
    }

    /// Lifelines the player could invoke right now.
    #[must_use]
    pub fn available_lifelines(&self) -> Vec<Lifeline> {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        Lifeline::ALL
            .into_iter()
            .filter(|lifeline| !self.lifelines.is_used(*lifeline))
            .filter(|lifeline| *lifeline != Lifeline::Switch || self.switch_unlocked)
            .collect()
    }

    /// Prize at stake on the current question.
    #[must_use]
    pub fn prize_label(&self) -> Option<String> {
        PrizeLadder.label(self.current_index)
    }

    /// One-based question number.
    #[must_use]
    pub fn question_number(&self) -> usize {
        self.current_index + 1
    }
}
