use std::time::Duration;

/// Tunable constants of a game.
///
/// `Default` yields the canonical prize-ladder rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Questions needed to win.
    pub total_questions: usize,
    /// Size of the batch that must arrive before play begins.
    pub initial_batch: usize,
    /// First question index (0-based) at which the switch lifeline unlocks.
    pub switch_unlock_index: usize,
    /// Delay between selecting an answer and revealing whether it was right.
    pub reveal_delay: Duration,
    /// Delay between a correct reveal and the next question (or the win).
    pub celebrate_delay: Duration,
    /// Delay between a wrong reveal and game over.
    pub reveal_correct_delay: Duration,
    /// How long the audience votes or the friend thinks.
    pub advice_delay: Duration,
    /// Pause before asking the supplier again while play waits for a question.
    pub refill_retry_delay: Duration,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            total_questions: 15,
            initial_batch: 5,
            switch_unlock_index: 7,
            reveal_delay: Duration::from_millis(3000),
            celebrate_delay: Duration::from_millis(3000),
            reveal_correct_delay: Duration::from_millis(5000),
            advice_delay: Duration::from_millis(8000),
            refill_retry_delay: Duration::from_millis(2000),
        }
    }
}

impl GameRules {
    /// Index of the final (winning) question.
    #[must_use]
    pub fn final_index(&self) -> usize {
        self.total_questions.saturating_sub(1)
    }
}
