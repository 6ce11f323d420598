//! Simulated audience and friend for the advisory lifelines.
//!
//! Both are pure functions of a random source and the question, so a seeded RNG
//! reproduces them exactly.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::model::{Lifeline, OPTION_COUNT, Question};

/// Probability that the audience favours, or the friend names, the right answer.
pub const RELIABILITY: f64 = 0.95;

/// Percentage range for the leading option when the audience is right.
const HONEST_LEAD: std::ops::Range<u8> = 50..80;

/// Percentage range for the leading option when the audience is wrong.
const MISLED_LEAD: std::ops::Range<u8> = 40..70;

/// Result of the audience vote, aligned with the question's option order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudiencePoll {
    options: [String; OPTION_COUNT],
    percentages: [u8; OPTION_COUNT],
}

impl AudiencePoll {
    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn percentages(&self) -> [u8; OPTION_COUNT] {
        self.percentages
    }

    /// The option with the most votes.
    #[must_use]
    pub fn leader(&self) -> &str {
        let index = (0..OPTION_COUNT)
            .max_by_key(|i| self.percentages[*i])
            .unwrap_or_default();
        &self.options[index]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.percentages.iter().map(|p| u32::from(*p)).sum()
    }
}

/// Output of an advisory lifeline, as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advice {
    /// The audience is still voting.
    Voting,
    Poll { poll: AudiencePoll },
    /// The friend is still on the line.
    Calling,
    Friend { suggestion: String },
}

impl Advice {
    /// Placeholder shown while the lifeline's delay runs.
    #[must_use]
    pub fn pending(lifeline: Lifeline) -> Option<Self> {
        match lifeline {
            Lifeline::Audience => Some(Self::Voting),
            Lifeline::Phone => Some(Self::Calling),
            Lifeline::FiftyFifty | Lifeline::Switch => None,
        }
    }

    #[must_use]
    pub fn lifeline(&self) -> Lifeline {
        match self {
            Self::Voting | Self::Poll { .. } => Lifeline::Audience,
            Self::Calling | Self::Friend { .. } => Lifeline::Phone,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Voting | Self::Calling)
    }

    /// Resolve a pending advice against `question`.
    #[must_use]
    pub fn resolve<R: Rng + ?Sized>(
        lifeline: Lifeline,
        rng: &mut R,
        question: &Question,
    ) -> Option<Self> {
        match lifeline {
            Lifeline::Audience => Some(Self::Poll {
                poll: audience_poll(rng, question),
            }),
            Lifeline::Phone => Some(Self::Friend {
                suggestion: phone_friend(rng, question),
            }),
            Lifeline::FiftyFifty | Lifeline::Switch => None,
        }
    }
}

/// Simulate the audience vote.
///
/// The leading option takes a strict plurality; the rest of the hundred is split
/// across the other three options, the last of them absorbing the remainder.
pub fn audience_poll<R: Rng + ?Sized>(rng: &mut R, question: &Question) -> AudiencePoll {
    let correct = question.correct_index();
    let (leader, lead) = if rng.random_bool(RELIABILITY) {
        (correct, rng.random_range(HONEST_LEAD))
    } else {
        let wrong: Vec<usize> = (0..OPTION_COUNT).filter(|i| *i != correct).collect();
        let pick = wrong.choose(rng).copied().unwrap_or(correct);
        (pick, rng.random_range(MISLED_LEAD))
    };

    let mut percentages = [0_u8; OPTION_COUNT];
    percentages[leader] = lead;

    let cap = lead - 1;
    let others: Vec<usize> = (0..OPTION_COUNT).filter(|i| *i != leader).collect();
    let mut remaining = 100 - lead;
    for (n, slot) in others.iter().enumerate() {
        let after = u8::try_from(others.len() - n - 1).unwrap_or(0);
        if after == 0 {
            percentages[*slot] = remaining;
            break;
        }
        // Leave no more for the later slots than they can hold under the cap.
        let floor = remaining.saturating_sub(cap.saturating_mul(after));
        let ceiling = (remaining / 2).max(floor).min(cap);
        let vote = rng.random_range(floor..=ceiling);
        percentages[*slot] = vote;
        remaining -= vote;
    }

    AudiencePoll {
        options: question.options().clone(),
        percentages,
    }
}

/// Simulate the friend's suggestion.
pub fn phone_friend<R: Rng + ?Sized>(rng: &mut R, question: &Question) -> String {
    if rng.random_bool(RELIABILITY) {
        return question.correct_answer().to_owned();
    }
    let wrong: Vec<&str> = question.wrong_options().collect();
    wrong
        .choose(rng)
        .map_or_else(|| question.correct_answer().to_owned(), |s| (*s).to_owned())
}
