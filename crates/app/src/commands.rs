use ladder_core::{GameSnapshot, Intent, Lifeline};

use crate::render::LETTERS;

/// A line typed by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    /// Option by position, `0` for `A`.
    Answer(usize),
    Lifeline(Lifeline),
    Dismiss,
    Help,
    Quit,
}

impl Command {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let word = line.trim().to_ascii_lowercase();
        let command = match word.as_str() {
            "s" | "start" => Self::Start,
            "5" | "50" | "50:50" => Self::Lifeline(Lifeline::FiftyFifty),
            "v" | "audience" => Self::Lifeline(Lifeline::Audience),
            "p" | "phone" => Self::Lifeline(Lifeline::Phone),
            "w" | "switch" => Self::Lifeline(Lifeline::Switch),
            "x" | "close" => Self::Dismiss,
            "h" | "?" | "help" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            _ => {
                let mut chars = word.chars();
                let (Some(letter), None) = (chars.next(), chars.next()) else {
                    return None;
                };
                let index = LETTERS
                    .iter()
                    .position(|candidate| candidate.eq_ignore_ascii_case(&letter))?;
                Self::Answer(index)
            }
        };
        Some(command)
    }

    /// The intent this command stands for, given what is on screen.
    pub(crate) fn intent(self, snapshot: &GameSnapshot) -> Option<Intent> {
        match self {
            Self::Start => Some(Intent::Start),
            Self::Answer(index) => snapshot
                .question
                .as_ref()
                .and_then(|question| question.options().get(index))
                .map(|option| Intent::SelectAnswer(option.clone())),
            Self::Lifeline(lifeline) => Some(Intent::UseLifeline(lifeline)),
            Self::Dismiss => Some(Intent::DismissAdvice),
            Self::Help | Self::Quit => None,
        }
    }
}

pub(crate) const HELP: &str = "\
Commands:
  s          start a new game
  a b c d    lock in an answer
  5          50:50
  v          ask the audience
  p          phone a friend
  w          switch the question (from question 8)
  x          close the audience or friend result
  h          this help
  q          quit
";
