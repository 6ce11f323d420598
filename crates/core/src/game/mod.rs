mod effect;
mod session;
mod snapshot;

pub use effect::{Cue, Effect, FetchPurpose, FetchRequest, Intent, Timer, TimerRequest};
pub use session::GameSession;
pub use snapshot::GameSnapshot;
