use crate::model::Question;

/// Ordered questions accumulated from one or more supplier batches.
///
/// Append-only, except for [`QuestionBuffer::move_to_end`], which preserves both
/// the length and the set of questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBuffer {
    questions: Vec<Question>,
}

impl QuestionBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, batch: impl IntoIterator<Item = Question>) {
        self.questions.extend(batch);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// True when a question exists after `index`.
    #[must_use]
    pub fn has_lookahead(&self, index: usize) -> bool {
        self.questions.len() > index.saturating_add(1)
    }

    /// Move the question at `index` to the end, shifting the ones after it forward.
    ///
    /// Returns `false` (and changes nothing) when there is no question after `index`.
    pub fn move_to_end(&mut self, index: usize) -> bool {
        if !self.has_lookahead(index) {
            return false;
        }
        self.questions[index..].rotate_left(1);
        true
    }

    /// Prompt texts of every buffered question, used to avoid repeats.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.questions
            .iter()
            .map(|question| question.prompt().to_owned())
            .collect()
    }

    pub fn clear(&mut self) {
        self.questions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
