mod ids;
mod lifeline;
mod phase;
mod question;

pub use ids::QuestionId;
pub use lifeline::{Lifeline, LifelineState};
pub use phase::GamePhase;
pub use question::{OPTION_COUNT, Question, QuestionDraft, QuestionError};
