use ladder_core::Cue;
use tracing::trace;

/// Plays the sound cues a game emits.
///
/// `play` is called from the game loop task and must not block.
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: Cue);
}

/// Cue player that only traces.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play(&self, cue: Cue) {
        trace!(?cue, "cue");
    }
}
