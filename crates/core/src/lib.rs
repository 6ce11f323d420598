#![forbid(unsafe_code)]

pub mod buffer;
pub mod game;
pub mod ladder;
pub mod model;
pub mod oracle;
pub mod rules;

pub use buffer::QuestionBuffer;
pub use game::{
    Cue, Effect, FetchPurpose, FetchRequest, GameSession, GameSnapshot, Intent, Timer,
    TimerRequest,
};
pub use ladder::{PrizeLadder, format_amount};
pub use model::{
    GamePhase, Lifeline, LifelineState, Question, QuestionDraft, QuestionError, QuestionId,
};
pub use oracle::{Advice, AudiencePoll};
pub use rules::GameRules;
