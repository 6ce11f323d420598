use serde::Serialize;
use std::fmt;

/// The four one-shot assists available in every game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Lifeline {
    /// Hide two wrong options.
    FiftyFifty,
    /// Simulated audience vote.
    Audience,
    /// Simulated call to a friend.
    Phone,
    /// Swap the current question for another one.
    Switch,
}

impl Lifeline {
    pub const ALL: [Lifeline; 4] = [
        Lifeline::FiftyFifty,
        Lifeline::Audience,
        Lifeline::Phone,
        Lifeline::Switch,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Lifeline::FiftyFifty => "50:50",
            Lifeline::Audience => "Ask the audience",
            Lifeline::Phone => "Phone a friend",
            Lifeline::Switch => "Switch question",
        }
    }
}

impl fmt::Display for Lifeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Usage flags; `true` means the lifeline has been spent for this game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifelineState {
    fifty_fifty: bool,
    audience: bool,
    phone: bool,
    switch: bool,
}

impl LifelineState {
    #[must_use]
    pub fn is_used(&self, lifeline: Lifeline) -> bool {
        match lifeline {
            Lifeline::FiftyFifty => self.fifty_fifty,
            Lifeline::Audience => self.audience,
            Lifeline::Phone => self.phone,
            Lifeline::Switch => self.switch,
        }
    }

    /// Spend a lifeline. Returns `false` if it was already spent.
    pub fn mark_used(&mut self, lifeline: Lifeline) -> bool {
        let flag = match lifeline {
            Lifeline::FiftyFifty => &mut self.fifty_fifty,
            Lifeline::Audience => &mut self.audience,
            Lifeline::Phone => &mut self.phone,
            Lifeline::Switch => &mut self.switch,
        };
        !std::mem::replace(flag, true)
    }

    /// Number of lifelines still available.
    #[must_use]
    pub fn remaining(&self) -> usize {
        Lifeline::ALL
            .iter()
            .filter(|lifeline| !self.is_used(**lifeline))
            .count()
    }
}
