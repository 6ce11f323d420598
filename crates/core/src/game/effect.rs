use std::time::Duration;

use serde::Serialize;

use crate::model::Lifeline;

/// Player intents forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    SelectAnswer(String),
    UseLifeline(Lifeline),
    /// Close the audience or phone result.
    DismissAdvice,
}

/// Why a batch of questions was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchPurpose {
    /// The batch that gates the start of play.
    Initial,
    /// The rest of the game, fetched while the player plays.
    Background,
    /// The single question requested by the switch lifeline.
    Switch,
    /// Shortfall requested while play waits for the next question.
    Refill,
}

impl FetchPurpose {
    /// Fetches that keep play supplied with questions.
    #[must_use]
    pub fn feeds_play(self) -> bool {
        matches!(self, Self::Background | Self::Refill)
    }
}

/// Ask the supplier for `count` questions, avoiding `already_seen` prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub purpose: FetchPurpose,
    pub count: usize,
    pub already_seen: Vec<String>,
}

/// Delayed transitions the session asks its driver to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// AnswerSelected → AnswerCorrect / AnswerIncorrect.
    Reveal,
    /// AnswerCorrect → Playing (next question) / Win.
    Celebrate,
    /// AnswerIncorrect → GameOver.
    RevealCorrect,
    /// Audience or friend result becomes available.
    Advice(Lifeline),
    /// Ask again for questions after a failed refill.
    RefillRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub generation: u64,
    pub timer: Timer,
    pub after: Duration,
}

/// Sound cues emitted at the moments the game would play audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    BackgroundStart,
    BackgroundStop,
    Select,
    Correct,
    Incorrect,
    SuspenseStart,
    SuspenseStop,
}

/// Work the session hands back to whoever drives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Abort every outstanding fetch and timer of earlier generations.
    CancelPending,
    Fetch(FetchRequest),
    Schedule(TimerRequest),
    Cue(Cue),
}
