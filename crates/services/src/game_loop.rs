use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use ladder_core::{
    Effect, FetchPurpose, FetchRequest, GameRules, GameSession, GameSnapshot, Intent, Lifeline,
    Question, TimerRequest,
};

use crate::cues::{CuePlayer, SilentCues};
use crate::error::{GameLoopError, SupplyError};
use crate::supplier::QuestionSupplier;
use crate::timers::TimerQueue;

//
// ─── BUILDER ───────────────────────────────────────────────────────────────────
//

/// Configures and spawns the task that drives a [`GameSession`].
pub struct GameLoop {
    supplier: Arc<dyn QuestionSupplier>,
    cues: Arc<dyn CuePlayer>,
    rules: GameRules,
    seed: Option<u64>,
}

impl GameLoop {
    #[must_use]
    pub fn new(supplier: Arc<dyn QuestionSupplier>) -> Self {
        Self {
            supplier,
            cues: Arc::new(SilentCues),
            rules: GameRules::default(),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_cues(mut self, cues: Arc<dyn CuePlayer>) -> Self {
        self.cues = cues;
        self
    }

    /// Seed the audience and friend simulations.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Spawn the game loop on the current Tokio runtime.
    ///
    /// The loop runs until every [`GameHandle`] sender is gone. Outstanding
    /// fetches are aborted when it stops.
    #[must_use]
    pub fn spawn(self) -> GameHandle {
        let session = match self.seed {
            Some(seed) => GameSession::seeded(self.rules, seed),
            None => GameSession::from_os_rng(self.rules),
        };
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let actor = Actor {
            session,
            supplier: self.supplier,
            cues: self.cues,
            fetches: JoinSet::new(),
            in_flight: HashMap::new(),
            timers: TimerQueue::default(),
            snapshots: snapshot_tx,
        };
        let task = tokio::spawn(actor.run(intent_rx));

        GameHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
            task,
        }
    }
}

impl fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameLoop")
            .field("rules", &self.rules)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Sends player intents to a running game and observes its snapshots.
///
/// Dropping the handle stops the game.
pub struct GameHandle {
    intents: mpsc::UnboundedSender<Intent>,
    snapshots: watch::Receiver<GameSnapshot>,
    task: JoinHandle<()>,
}

impl GameHandle {
    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn send(&self, intent: Intent) -> Result<(), GameLoopError> {
        self.intents.send(intent).map_err(|_| GameLoopError::Closed)
    }

    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn start(&self) -> Result<(), GameLoopError> {
        self.send(Intent::Start)
    }

    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn select_answer(&self, answer: impl Into<String>) -> Result<(), GameLoopError> {
        self.send(Intent::SelectAnswer(answer.into()))
    }

    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn use_fifty_fifty(&self) -> Result<(), GameLoopError> {
        self.send(Intent::UseLifeline(Lifeline::FiftyFifty))
    }

    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn use_audience(&self) -> Result<(), GameLoopError> {
        self.send(Intent::UseLifeline(Lifeline::Audience))
    }

    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn use_phone(&self) -> Result<(), GameLoopError> {
        self.send(Intent::UseLifeline(Lifeline::Phone))
    }

    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn use_switch(&self) -> Result<(), GameLoopError> {
        self.send(Intent::UseLifeline(Lifeline::Switch))
    }

    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub fn dismiss_advice(&self) -> Result<(), GameLoopError> {
        self.send(Intent::DismissAdvice)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// An independent receiver for presentation layers.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the next published snapshot.
    ///
    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop has stopped.
    pub async fn changed(&mut self) -> Result<GameSnapshot, GameLoopError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| GameLoopError::Closed)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `predicate`, checking the current one first.
    ///
    /// # Errors
    ///
    /// Returns `GameLoopError::Closed` if the loop stops first.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&GameSnapshot) -> bool,
    ) -> Result<GameSnapshot, GameLoopError> {
        self.snapshots
            .wait_for(predicate)
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| GameLoopError::Closed)
    }

    /// Stop the loop and wait for it to finish.
    pub async fn shutdown(self) {
        let Self { intents, task, .. } = self;
        drop(intents);
        if let Err(err) = task.await {
            if err.is_panic() {
                error!(error = %err, "game loop panicked");
            }
        }
    }
}

impl fmt::Debug for GameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameHandle")
            .field("phase", &self.snapshots.borrow().phase)
            .finish_non_exhaustive()
    }
}

//
// ─── ACTOR ─────────────────────────────────────────────────────────────────────
//

struct FetchOutcome {
    generation: u64,
    purpose: FetchPurpose,
    result: Result<Vec<Question>, SupplyError>,
}

enum Event {
    Intent(Intent),
    Fetched(Result<(task::Id, FetchOutcome), JoinError>),
    Timer(TimerRequest),
}

struct Actor {
    session: GameSession,
    supplier: Arc<dyn QuestionSupplier>,
    cues: Arc<dyn CuePlayer>,
    fetches: JoinSet<FetchOutcome>,
    /// Generation and purpose of each running fetch, so a crashed task can
    /// still be reported to the session.
    in_flight: HashMap<task::Id, (u64, FetchPurpose)>,
    timers: TimerQueue,
    snapshots: watch::Sender<GameSnapshot>,
}

impl Actor {
    async fn run(mut self, mut intents: mpsc::UnboundedReceiver<Intent>) {
        loop {
            let event = tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => Event::Intent(intent),
                    None => break,
                },
                Some(joined) = self.fetches.join_next_with_id() => Event::Fetched(joined),
                request = self.timers.next() => Event::Timer(request),
            };

            let before = self.session.phase();
            let effects = self.handle(event);
            self.execute(effects);

            let after = self.session.phase();
            if before != after {
                debug!(from = ?before, to = ?after, generation = self.session.generation(), "phase changed");
            }
            self.publish();
        }

        self.fetches.abort_all();
        self.timers.clear();
        debug!("game loop stopped");
    }

    fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Intent(intent) => {
                debug!(?intent, "intent");
                self.session.apply(intent)
            }
            Event::Timer(request) => self
                .session
                .timer_elapsed(request.generation, request.timer),
            Event::Fetched(Ok((id, outcome))) => {
                self.in_flight.remove(&id);
                self.fetch_finished(outcome)
            }
            Event::Fetched(Err(err)) => self.fetch_crashed(&err),
        }
    }

    fn fetch_crashed(&mut self, err: &JoinError) -> Vec<Effect> {
        let request = self.in_flight.remove(&err.id());
        if !err.is_panic() {
            debug!("question fetch aborted");
            return Vec::new();
        }
        error!(error = %err, "question fetch panicked");
        let Some((generation, purpose)) = request else {
            return Vec::new();
        };
        let message = match purpose {
            FetchPurpose::Initial => "Could not prepare the questions: question supplier crashed",
            _ => "question supplier crashed",
        };
        self.session.batch_failed(generation, purpose, message)
    }

    fn fetch_finished(&mut self, outcome: FetchOutcome) -> Vec<Effect> {
        let FetchOutcome {
            generation,
            purpose,
            result,
        } = outcome;

        match result {
            Ok(questions) => {
                debug!(?purpose, generation, count = questions.len(), "questions received");
                self.session.batch_received(generation, purpose, questions)
            }
            Err(err) => {
                warn!(?purpose, generation, error = %err, "question fetch failed");
                let message = match purpose {
                    FetchPurpose::Initial => format!("Could not prepare the questions: {err}"),
                    _ => err.to_string(),
                };
                self.session.batch_failed(generation, purpose, message)
            }
        }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CancelPending => {
                    self.fetches.abort_all();
                    self.in_flight.clear();
                    self.timers.clear();
                }
                Effect::Fetch(request) => self.spawn_fetch(request),
                Effect::Schedule(request) => {
                    self.timers.schedule(request);
                    debug!(timer = ?request.timer, pending = self.timers.len(), "timer scheduled");
                }
                Effect::Cue(cue) => self.cues.play(cue),
            }
        }
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        debug!(
            purpose = ?request.purpose,
            count = request.count,
            generation = request.generation,
            "fetching questions"
        );
        let key = (request.generation, request.purpose);
        let supplier = Arc::clone(&self.supplier);
        let task = self.fetches.spawn(async move {
            let result = supplier
                .supply(request.count, &request.already_seen)
                .await;
            FetchOutcome {
                generation: request.generation,
                purpose: request.purpose,
                result,
            }
        });
        self.in_flight.insert(task.id(), key);
    }

    fn publish(&self) {
        let next = self.session.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
