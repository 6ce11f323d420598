#![forbid(unsafe_code)]

pub mod cues;
pub mod error;
pub mod game_loop;
pub mod supplier;
mod timers;

pub use cues::{CuePlayer, SilentCues};
pub use error::{GameLoopError, SupplyError};
pub use game_loop::{GameHandle, GameLoop};
pub use supplier::{
    FallbackSupplier, QuestionBank, QuestionGenConfig, QuestionGenerator, QuestionSupplier,
};
