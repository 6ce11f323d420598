use serde::Serialize;

/// Where the game currently is. Exactly one phase is active at a time and it alone
/// decides which intents are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    #[default]
    StartScreen,
    Loading,
    Playing,
    AnswerSelected,
    AnswerCorrect,
    AnswerIncorrect,
    GameOver,
    Win,
}

impl GamePhase {
    /// Phases from which a new game may be started.
    #[must_use]
    pub fn accepts_start(self) -> bool {
        matches!(self, Self::StartScreen | Self::GameOver | Self::Win)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Win)
    }

    /// Phases in which a question is on screen.
    #[must_use]
    pub fn shows_question(self) -> bool {
        matches!(
            self,
            Self::Playing | Self::AnswerSelected | Self::AnswerCorrect | Self::AnswerIncorrect
        )
    }
}
