use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Every question offers exactly this many answer options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt must not be empty")]
    EmptyPrompt,

    #[error("expected {OPTION_COUNT} options, got {len}")]
    OptionCount { len: usize },

    #[error("answer options must not be empty")]
    EmptyOption,

    #[error("duplicate answer option: {0}")]
    DuplicateOption(String),

    #[error("correct answer {0:?} is not one of the options")]
    CorrectNotInOptions(String),
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// Invariants: exactly four pairwise distinct options, and the correct answer is
/// one of them. Option order is the presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_answer: String,
}

impl Question {
    /// Build a question, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is blank, the option count is not four,
    /// an option is blank or repeated, or the correct answer is not an option.
    pub fn new<I, S>(
        id: QuestionId,
        prompt: impl Into<String>,
        options: I,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        for (i, option) in options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(QuestionError::EmptyOption);
            }
            if options[..i].contains(option) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }
        let len = options.len();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| QuestionError::OptionCount { len })?;

        let correct_answer = correct_answer.into();
        if !options.contains(&correct_answer) {
            return Err(QuestionError::CorrectNotInOptions(correct_answer));
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Position of the correct answer within `options`.
    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.options
            .iter()
            .position(|option| *option == self.correct_answer)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    #[must_use]
    pub fn has_option(&self, answer: &str) -> bool {
        self.options.iter().any(|option| option == answer)
    }

    /// Options other than the correct answer, in presentation order.
    pub fn wrong_options(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .map(String::as_str)
            .filter(|option| *option != self.correct_answer)
    }

    /// Shuffle the presentation order of the options.
    #[must_use]
    pub fn with_shuffled_options<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.options.shuffle(rng);
        self
    }
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Unvalidated question as produced by a content generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuestionDraft {
    /// # Errors
    ///
    /// Returns `QuestionError` if the draft violates any question invariant.
    pub fn validate(self, id: QuestionId) -> Result<Question, QuestionError> {
        Question::new(id, self.question, self.options, self.correct_answer)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
