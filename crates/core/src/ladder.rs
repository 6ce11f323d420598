use std::ops::Range;

/// Prize amounts for each rung, lowest first.
const AMOUNTS: [u32; 15] = [
    100, 200, 300, 500, 1_000, 2_000, 4_000, 8_000, 16_000, 32_000, 64_000, 125_000, 250_000,
    500_000, 1_000_000,
];

/// Rung numbers (1-based) that are guaranteed milestones.
const MILESTONES: [usize; 3] = [5, 10, 15];

/// The fifteen-rung prize ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrizeLadder;

impl PrizeLadder {
    /// Rung indices, lowest first.
    #[must_use]
    pub fn rungs(self) -> Range<usize> {
        0..AMOUNTS.len()
    }

    /// Prize for answering the question at `index` (0-based) correctly.
    #[must_use]
    pub fn amount(self, index: usize) -> Option<u32> {
        AMOUNTS.get(index).copied()
    }

    #[must_use]
    pub fn is_milestone(self, index: usize) -> bool {
        MILESTONES.contains(&(index + 1))
    }

    /// Prize already banked after correctly answering `answered` questions.
    #[must_use]
    pub fn banked(self, answered: usize) -> u32 {
        answered
            .checked_sub(1)
            .and_then(|index| self.amount(index))
            .unwrap_or(0)
    }

    /// Prize kept after a wrong answer: the highest milestone among the first
    /// `answered` rungs.
    #[must_use]
    pub fn guaranteed(self, answered: usize) -> u32 {
        MILESTONES
            .iter()
            .rev()
            .find(|rung| **rung <= answered)
            .map_or(0, |rung| self.banked(*rung))
    }

    /// Amount formatted with thousands separators, e.g. `1,000,000`.
    #[must_use]
    pub fn label(self, index: usize) -> Option<String> {
        self.amount(index).map(format_amount)
    }
}

/// Group the digits of `value` in threes.
#[must_use]
pub fn format_amount(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
