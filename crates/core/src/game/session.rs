use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::buffer::QuestionBuffer;
use crate::game::effect::{Cue, Effect, FetchPurpose, FetchRequest, Intent, Timer, TimerRequest};
use crate::game::snapshot::GameSnapshot;
use crate::model::{GamePhase, Lifeline, LifelineState, Question};
use crate::oracle::Advice;
use crate::rules::GameRules;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// The game progression state machine.
///
/// `GameSession` performs no I/O. Every intent and every completion (timer,
/// supplier batch) goes in through a method, and the work the caller must do comes
/// back out as [`Effect`]s. Fetches and timers are tagged with the session
/// generation, which `start` bumps, so results that belong to an earlier game are
/// dropped on arrival.
///
/// Pairs of (phase, input) with no defined transition are no-ops.
pub struct GameSession<R = StdRng> {
    rules: GameRules,
    rng: R,
    generation: u64,
    phase: GamePhase,
    buffer: QuestionBuffer,
    lifelines: LifelineState,
    current_index: usize,
    selected_answer: Option<String>,
    disabled_answers: Vec<String>,
    advice: Option<Advice>,
    error: Option<String>,
    awaiting_question: bool,
    supply_in_flight: usize,
}

impl GameSession<StdRng> {
    /// Session seeded from the operating system.
    #[must_use]
    pub fn from_os_rng(rules: GameRules) -> Self {
        Self::new(rules, StdRng::from_os_rng())
    }

    #[must_use]
    pub fn seeded(rules: GameRules, seed: u64) -> Self {
        Self::new(rules, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameSession<R> {
    #[must_use]
    pub fn new(rules: GameRules, rng: R) -> Self {
        Self {
            rules,
            rng,
            generation: 0,
            phase: GamePhase::StartScreen,
            buffer: QuestionBuffer::new(),
            lifelines: LifelineState::default(),
            current_index: 0,
            selected_answer: None,
            disabled_answers: Vec::new(),
            advice: None,
            error: None,
            awaiting_question: false,
            supply_in_flight: 0,
        }
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.buffer.get(self.current_index)
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn disabled_answers(&self) -> &[String] {
        &self.disabled_answers
    }

    #[must_use]
    pub fn lifelines(&self) -> LifelineState {
        self.lifelines
    }

    #[must_use]
    pub fn advice(&self) -> Option<&Advice> {
        self.advice.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn buffer(&self) -> &QuestionBuffer {
        &self.buffer
    }

    /// True while a correct answer is waiting for the next question to arrive.
    #[must_use]
    pub fn is_awaiting_question(&self) -> bool {
        self.awaiting_question
    }

    #[must_use]
    pub fn switch_unlocked(&self) -> bool {
        self.current_index >= self.rules.switch_unlock_index
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            generation: self.generation,
            phase: self.phase,
            current_index: self.current_index,
            total_questions: self.rules.total_questions,
            question: self.current_question().cloned(),
            selected_answer: self.selected_answer.clone(),
            disabled_answers: self.disabled_answers.clone(),
            lifelines: self.lifelines,
            switch_unlocked: self.switch_unlocked(),
            advice: self.advice.clone(),
            error: self.error.clone(),
            buffered: self.buffer.len(),
            awaiting_question: self.awaiting_question,
        }
    }

    //
    // ─── INTENTS ───────────────────────────────────────────────────────────────
    //

    pub fn apply(&mut self, intent: Intent) -> Vec<Effect> {
        match intent {
            Intent::Start => self.start(),
            Intent::SelectAnswer(answer) => self.select_answer(&answer),
            Intent::UseLifeline(lifeline) => self.use_lifeline(lifeline),
            Intent::DismissAdvice => self.dismiss_advice(),
        }
    }

    /// Begin a new game from the start screen or a finished game.
    pub fn start(&mut self) -> Vec<Effect> {
        if !self.phase.accepts_start() {
            return Vec::new();
        }

        let suspense = self.dismiss_advice();
        self.generation += 1;
        self.buffer.clear();
        self.lifelines = LifelineState::default();
        self.current_index = 0;
        self.selected_answer = None;
        self.disabled_answers.clear();
        self.error = None;
        self.awaiting_question = false;
        self.supply_in_flight = 0;
        self.phase = GamePhase::Loading;

        let mut effects = vec![Effect::CancelPending];
        effects.extend(suspense);
        effects.push(Effect::Cue(Cue::BackgroundStart));
        effects.push(self.fetch(FetchPurpose::Initial, self.rules.initial_batch));
        effects
    }

    /// Lock in an answer. Only accepted while playing, and only for an option of the
    /// current question that fifty-fifty has not hidden.
    pub fn select_answer(&mut self, answer: &str) -> Vec<Effect> {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        if !question.has_option(answer) || self.is_disabled(answer) {
            return Vec::new();
        }

        self.selected_answer = Some(answer.to_owned());
        self.phase = GamePhase::AnswerSelected;
        vec![
            Effect::Cue(Cue::Select),
            self.schedule(Timer::Reveal, self.rules.reveal_delay),
        ]
    }

    pub fn use_lifeline(&mut self, lifeline: Lifeline) -> Vec<Effect> {
        if self.phase != GamePhase::Playing || self.lifelines.is_used(lifeline) {
            return Vec::new();
        }
        if self.current_question().is_none() {
            return Vec::new();
        }

        match lifeline {
            Lifeline::FiftyFifty => self.use_fifty_fifty(),
            Lifeline::Audience | Lifeline::Phone => self.use_advisory(lifeline),
            Lifeline::Switch => self.use_switch(),
        }
    }

    pub fn dismiss_advice(&mut self) -> Vec<Effect> {
        match self.advice.take() {
            Some(_) => vec![Effect::Cue(Cue::SuspenseStop)],
            None => Vec::new(),
        }
    }

    //
    // ─── COMPLETIONS ───────────────────────────────────────────────────────────
    //

    /// A scheduled timer has elapsed.
    pub fn timer_elapsed(&mut self, generation: u64, timer: Timer) -> Vec<Effect> {
        if generation != self.generation {
            return Vec::new();
        }

        match (timer, self.phase) {
            (Timer::Reveal, GamePhase::AnswerSelected) => self.reveal(),
            (Timer::Celebrate, GamePhase::AnswerCorrect) if !self.awaiting_question => {
                if self.current_index >= self.rules.final_index() {
                    self.finish(GamePhase::Win)
                } else {
                    self.advance_or_wait()
                }
            }
            (Timer::RevealCorrect, GamePhase::AnswerIncorrect) => {
                self.finish(GamePhase::GameOver)
            }
            (Timer::Advice(lifeline), phase) if !phase.is_terminal() => {
                self.resolve_advice(lifeline);
                Vec::new()
            }
            (Timer::RefillRetry, GamePhase::AnswerCorrect)
                if self.awaiting_question && self.supply_in_flight == 0 =>
            {
                self.request_refill()
            }
            _ => Vec::new(),
        }
    }

    /// A supplier batch arrived.
    pub fn batch_received(
        &mut self,
        generation: u64,
        purpose: FetchPurpose,
        questions: Vec<Question>,
    ) -> Vec<Effect> {
        if generation != self.generation {
            return Vec::new();
        }

        match purpose {
            FetchPurpose::Initial => {
                if self.phase != GamePhase::Loading {
                    return Vec::new();
                }
                if questions.is_empty() {
                    return self.fail_initial("the question supplier returned no questions");
                }
                self.buffer.append(questions);
                self.phase = GamePhase::Playing;

                let missing = self.rules.total_questions.saturating_sub(self.buffer.len());
                if missing == 0 {
                    return Vec::new();
                }
                self.supply_in_flight += 1;
                vec![self.fetch(FetchPurpose::Background, missing)]
            }
            FetchPurpose::Background | FetchPurpose::Refill | FetchPurpose::Switch => {
                if purpose.feeds_play() {
                    self.supply_in_flight = self.supply_in_flight.saturating_sub(1);
                }
                self.buffer.append(questions);
                self.resume_if_awaiting()
            }
        }
    }

    /// A supplier batch failed.
    ///
    /// Only the initial batch is visible to the player; later failures leave play
    /// untouched, though a session waiting on its next question retries later.
    pub fn batch_failed(
        &mut self,
        generation: u64,
        purpose: FetchPurpose,
        message: impl Into<String>,
    ) -> Vec<Effect> {
        if generation != self.generation {
            return Vec::new();
        }

        match purpose {
            FetchPurpose::Initial if self.phase == GamePhase::Loading => {
                self.fail_initial(message)
            }
            FetchPurpose::Background | FetchPurpose::Refill => {
                self.supply_in_flight = self.supply_in_flight.saturating_sub(1);
                if self.awaiting_question && self.supply_in_flight == 0 {
                    vec![self.schedule(Timer::RefillRetry, self.rules.refill_retry_delay)]
                } else {
                    Vec::new()
                }
            }
            FetchPurpose::Initial | FetchPurpose::Switch => Vec::new(),
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn reveal(&mut self) -> Vec<Effect> {
        let correct = match (self.current_question(), self.selected_answer.as_deref()) {
            (Some(question), Some(answer)) => question.is_correct(answer),
            _ => false,
        };

        if correct {
            self.phase = GamePhase::AnswerCorrect;
            vec![
                Effect::Cue(Cue::Correct),
                self.schedule(Timer::Celebrate, self.rules.celebrate_delay),
            ]
        } else {
            self.phase = GamePhase::AnswerIncorrect;
            vec![
                Effect::Cue(Cue::Incorrect),
                self.schedule(Timer::RevealCorrect, self.rules.reveal_correct_delay),
            ]
        }
    }

    /// Move to the next question, or hold in `AnswerCorrect` until it is buffered.
    fn advance_or_wait(&mut self) -> Vec<Effect> {
        if self.buffer.has_lookahead(self.current_index) {
            self.awaiting_question = false;
            self.current_index += 1;
            self.selected_answer = None;
            self.disabled_answers.clear();
            self.phase = GamePhase::Playing;
            return self.dismiss_advice();
        }

        self.awaiting_question = true;
        if self.supply_in_flight > 0 {
            return Vec::new();
        }
        self.request_refill()
    }

    fn resume_if_awaiting(&mut self) -> Vec<Effect> {
        if !self.awaiting_question || self.phase != GamePhase::AnswerCorrect {
            return Vec::new();
        }
        self.advance_or_wait()
    }

    fn request_refill(&mut self) -> Vec<Effect> {
        let to_total = self.rules.total_questions.saturating_sub(self.buffer.len());
        let to_next = (self.current_index + 2).saturating_sub(self.buffer.len());
        let count = to_total.max(to_next).max(1);
        self.supply_in_flight += 1;
        vec![self.fetch(FetchPurpose::Refill, count)]
    }

    /// Enter `GameOver` or `Win`, closing any advice still on screen.
    fn finish(&mut self, phase: GamePhase) -> Vec<Effect> {
        self.phase = phase;
        let mut effects = vec![Effect::Cue(Cue::BackgroundStop)];
        effects.extend(self.dismiss_advice());
        effects
    }

    fn fail_initial(&mut self, message: impl Into<String>) -> Vec<Effect> {
        self.error = Some(message.into());
        self.buffer.clear();
        self.phase = GamePhase::StartScreen;
        vec![Effect::Cue(Cue::BackgroundStop)]
    }

    //
    // ─── LIFELINES ─────────────────────────────────────────────────────────────
    //

    fn use_fifty_fifty(&mut self) -> Vec<Effect> {
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        // Deterministic: the first two wrong options in presentation order.
        let hidden: Vec<String> = question.wrong_options().take(2).map(str::to_owned).collect();

        self.lifelines.mark_used(Lifeline::FiftyFifty);
        self.disabled_answers = hidden;
        Vec::new()
    }

    fn use_advisory(&mut self, lifeline: Lifeline) -> Vec<Effect> {
        if self.advice.as_ref().is_some_and(Advice::is_pending) {
            return Vec::new();
        }

        self.lifelines.mark_used(lifeline);
        self.advice = Advice::pending(lifeline);
        vec![
            Effect::Cue(Cue::SuspenseStart),
            self.schedule(Timer::Advice(lifeline), self.rules.advice_delay),
        ]
    }

    fn use_switch(&mut self) -> Vec<Effect> {
        if !self.switch_unlocked() {
            return Vec::new();
        }

        self.lifelines.mark_used(Lifeline::Switch);
        if self.buffer.move_to_end(self.current_index) {
            self.selected_answer = None;
            self.disabled_answers.clear();
            return self.dismiss_advice();
        }

        vec![self.fetch(FetchPurpose::Switch, 1)]
    }

    fn resolve_advice(&mut self, lifeline: Lifeline) {
        let pending = self
            .advice
            .as_ref()
            .is_some_and(|advice| advice.is_pending() && advice.lifeline() == lifeline);
        if !pending {
            return;
        }
        let Some(question) = self.buffer.get(self.current_index) else {
            return;
        };
        self.advice = Advice::resolve(lifeline, &mut self.rng, question);
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    fn is_disabled(&self, answer: &str) -> bool {
        self.disabled_answers.iter().any(|hidden| hidden == answer)
    }

    fn fetch(&self, purpose: FetchPurpose, count: usize) -> Effect {
        Effect::Fetch(FetchRequest {
            generation: self.generation,
            purpose,
            count,
            already_seen: self.buffer.prompts(),
        })
    }

    fn schedule(&self, timer: Timer, after: std::time::Duration) -> Effect {
        Effect::Schedule(TimerRequest {
            generation: self.generation,
            timer,
            after,
        })
    }
}

impl<R> fmt::Debug for GameSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("generation", &self.generation)
            .field("phase", &self.phase)
            .field("current_index", &self.current_index)
            .field("buffered", &self.buffer.len())
            .field("selected_answer", &self.selected_answer)
            .field("lifelines", &self.lifelines)
            .field("awaiting_question", &self.awaiting_question)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::question;
    use std::time::Duration;

    fn batch(range: std::ops::Range<usize>) -> Vec<Question> {
        range.map(question).collect()
    }

    fn session() -> GameSession {
        GameSession::seeded(GameRules::default(), 11)
    }

    /// Started session with `len` questions buffered and the background fetch settled.
    fn playing(len: usize) -> GameSession {
        let mut s = session();
        s.start();
        let generation = s.generation();
        let effects = s.batch_received(generation, FetchPurpose::Initial, batch(0..5.min(len)));
        if effects
            .iter()
            .any(|e| matches!(e, Effect::Fetch(r) if r.purpose == FetchPurpose::Background))
        {
            s.batch_received(generation, FetchPurpose::Background, batch(5.min(len)..len));
        }
        assert_eq!(s.phase(), GamePhase::Playing);
        s
    }

    fn correct_answer(s: &GameSession) -> String {
        s.current_question().unwrap().correct_answer().to_owned()
    }

    fn wrong_answer(s: &GameSession) -> String {
        s.current_question()
            .unwrap()
            .wrong_options()
            .next()
            .unwrap()
            .to_owned()
    }

    /// Answer correctly and let both timers fire.
    fn climb(s: &mut GameSession) -> Vec<Effect> {
        let answer = correct_answer(s);
        s.select_answer(&answer);
        let generation = s.generation();
        s.timer_elapsed(generation, Timer::Reveal);
        s.timer_elapsed(generation, Timer::Celebrate)
    }

    fn scheduled(effects: &[Effect]) -> Vec<(Timer, Duration)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Schedule(t) => Some((t.timer, t.after)),
                _ => None,
            })
            .collect()
    }

    fn fetches(effects: &[Effect]) -> Vec<FetchRequest> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Fetch(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_requests_initial_batch_and_loads() {
        let mut s = session();
        let effects = s.start();

        assert_eq!(s.phase(), GamePhase::Loading);
        assert_eq!(s.generation(), 1);
        assert_eq!(effects[0], Effect::CancelPending);
        assert!(effects.contains(&Effect::Cue(Cue::BackgroundStart)));
        let requests = fetches(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purpose, FetchPurpose::Initial);
        assert_eq!(requests[0].count, 5);
        assert!(requests[0].already_seen.is_empty());
    }

    #[test]
    fn initial_batch_starts_play_and_requests_the_rest() {
        let mut s = session();
        s.start();
        let effects = s.batch_received(1, FetchPurpose::Initial, batch(0..5));

        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.current_index(), 0);
        let requests = fetches(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purpose, FetchPurpose::Background);
        assert_eq!(requests[0].count, 10);
        assert_eq!(requests[0].already_seen.len(), 5);

        s.batch_received(1, FetchPurpose::Background, batch(5..15));
        assert_eq!(s.buffer().len(), 15);
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn initial_failure_returns_to_start_with_error() {
        let mut s = session();
        s.start();
        let effects = s.batch_failed(1, FetchPurpose::Initial, "network down");

        assert_eq!(s.phase(), GamePhase::StartScreen);
        assert_eq!(s.error(), Some("network down"));
        assert!(s.buffer().is_empty());
        assert!(s.current_question().is_none());
        assert_eq!(effects, vec![Effect::Cue(Cue::BackgroundStop)]);
    }

    #[test]
    fn empty_initial_batch_counts_as_failure() {
        let mut s = session();
        s.start();
        s.batch_received(1, FetchPurpose::Initial, Vec::new());
        assert_eq!(s.phase(), GamePhase::StartScreen);
        assert!(s.error().is_some());
    }

    #[test]
    fn restart_clears_error() {
        let mut s = session();
        s.start();
        s.batch_failed(1, FetchPurpose::Initial, "boom");
        s.start();
        assert_eq!(s.phase(), GamePhase::Loading);
        assert!(s.error().is_none());
    }

    #[test]
    fn intents_are_ignored_while_loading() {
        let mut s = session();
        s.start();
        assert!(s.select_answer("right 0").is_empty());
        assert!(s.use_lifeline(Lifeline::FiftyFifty).is_empty());
        assert!(s.start().is_empty());
        assert_eq!(s.phase(), GamePhase::Loading);
        assert_eq!(s.lifelines(), LifelineState::default());
    }

    #[test]
    fn correct_answer_reveals_then_advances() {
        let mut s = playing(15);
        let answer = correct_answer(&s);

        let effects = s.select_answer(&answer);
        assert_eq!(s.phase(), GamePhase::AnswerSelected);
        assert_eq!(s.selected_answer(), Some(answer.as_str()));
        assert_eq!(
            scheduled(&effects),
            vec![(Timer::Reveal, Duration::from_millis(3000))]
        );

        let effects = s.timer_elapsed(1, Timer::Reveal);
        assert_eq!(s.phase(), GamePhase::AnswerCorrect);
        assert!(effects.contains(&Effect::Cue(Cue::Correct)));
        assert_eq!(
            scheduled(&effects),
            vec![(Timer::Celebrate, Duration::from_millis(3000))]
        );

        s.timer_elapsed(1, Timer::Celebrate);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.current_index(), 1);
        assert!(s.selected_answer().is_none());
        assert!(s.disabled_answers().is_empty());
    }

    #[test]
    fn wrong_answer_ends_the_game() {
        let mut s = playing(15);
        climb(&mut s);
        let answer = wrong_answer(&s);
        s.select_answer(&answer);

        let effects = s.timer_elapsed(1, Timer::Reveal);
        assert_eq!(s.phase(), GamePhase::AnswerIncorrect);
        assert_eq!(
            scheduled(&effects),
            vec![(Timer::RevealCorrect, Duration::from_millis(5000))]
        );

        s.timer_elapsed(1, Timer::RevealCorrect);
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn final_question_wins() {
        let mut s = playing(15);
        for _ in 0..14 {
            climb(&mut s);
        }
        assert_eq!(s.current_index(), 14);
        let effects = climb(&mut s);
        assert_eq!(s.phase(), GamePhase::Win);
        assert_eq!(s.current_index(), 14);
        assert!(effects.contains(&Effect::Cue(Cue::BackgroundStop)));
    }

    #[test]
    fn select_is_rejected_outside_playing_and_for_unknown_options() {
        let mut s = playing(15);
        assert!(s.select_answer("not an option").is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);

        let answer = correct_answer(&s);
        s.select_answer(&answer);
        let other = wrong_answer(&s);
        assert!(s.select_answer(&other).is_empty());
        assert_eq!(s.selected_answer(), Some(answer.as_str()));
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut s = playing(15);
        let answer = wrong_answer(&s);
        s.select_answer(&answer);
        s.timer_elapsed(1, Timer::Reveal);
        s.timer_elapsed(1, Timer::RevealCorrect);
        assert_eq!(s.phase(), GamePhase::GameOver);

        s.start();
        assert_eq!(s.generation(), 2);
        assert!(s.batch_received(1, FetchPurpose::Background, batch(0..10)).is_empty());
        assert!(s.buffer().is_empty());
        assert!(s.timer_elapsed(1, Timer::Celebrate).is_empty());
        assert_eq!(s.phase(), GamePhase::Loading);
    }

    #[test]
    fn restart_resets_everything() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::FiftyFifty);
        climb(&mut s);
        let answer = wrong_answer(&s);
        s.select_answer(&answer);
        s.timer_elapsed(1, Timer::Reveal);
        s.timer_elapsed(1, Timer::RevealCorrect);

        let effects = s.start();
        assert_eq!(effects[0], Effect::CancelPending);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.lifelines(), LifelineState::default());
        assert!(s.selected_answer().is_none());
        assert!(s.buffer().is_empty());
    }

    #[test]
    fn fifty_fifty_hides_first_two_wrong_options() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::FiftyFifty);

        let question = s.current_question().unwrap().clone();
        let expected: Vec<String> = question.wrong_options().take(2).map(str::to_owned).collect();
        assert_eq!(s.disabled_answers(), expected.as_slice());
        assert!(!s.disabled_answers().iter().any(|a| a == question.correct_answer()));

        let enabled: Vec<_> = question
            .options()
            .iter()
            .filter(|o| !s.disabled_answers().contains(o))
            .collect();
        assert_eq!(enabled.len(), 2);
        assert!(enabled.iter().any(|o| *o == question.correct_answer()));

        assert!(s.select_answer(&expected[0]).is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn fifty_fifty_resets_on_next_question_and_only_works_once() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::FiftyFifty);
        climb(&mut s);
        assert!(s.disabled_answers().is_empty());

        assert!(s.use_lifeline(Lifeline::FiftyFifty).is_empty());
        assert!(s.disabled_answers().is_empty());
    }

    #[test]
    fn audience_votes_then_resolves() {
        let mut s = playing(15);
        let effects = s.use_lifeline(Lifeline::Audience);

        assert_eq!(s.advice(), Some(&Advice::Voting));
        assert!(effects.contains(&Effect::Cue(Cue::SuspenseStart)));
        assert_eq!(
            scheduled(&effects),
            vec![(Timer::Advice(Lifeline::Audience), Duration::from_millis(8000))]
        );
        assert_eq!(s.phase(), GamePhase::Playing);

        s.timer_elapsed(1, Timer::Advice(Lifeline::Audience));
        match s.advice() {
            Some(Advice::Poll { poll }) => assert_eq!(poll.total(), 100),
            other => panic!("expected poll, got {other:?}"),
        }

        assert_eq!(s.dismiss_advice(), vec![Effect::Cue(Cue::SuspenseStop)]);
        assert!(s.advice().is_none());
        assert!(s.lifelines().is_used(Lifeline::Audience));
    }

    #[test]
    fn spent_audience_cannot_be_used_again() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::Audience);
        s.timer_elapsed(1, Timer::Advice(Lifeline::Audience));
        let resolved = s.advice().cloned();
        assert!(resolved.as_ref().is_some_and(|advice| !advice.is_pending()));

        assert!(s.use_lifeline(Lifeline::Audience).is_empty());
        assert_eq!(s.advice().cloned(), resolved);
        assert_eq!(s.lifelines().remaining(), 3);
    }

    #[test]
    fn spent_phone_cannot_be_used_again() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::Phone);
        s.timer_elapsed(1, Timer::Advice(Lifeline::Phone));
        let resolved = s.advice().cloned();

        assert!(s.use_lifeline(Lifeline::Phone).is_empty());
        assert_eq!(s.advice().cloned(), resolved);
        s.dismiss_advice();
        assert!(s.use_lifeline(Lifeline::Phone).is_empty());
        assert!(s.advice().is_none());
    }

    #[test]
    fn pending_advice_is_closed_on_game_over() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::Audience);
        let answer = wrong_answer(&s);
        s.select_answer(&answer);
        s.timer_elapsed(1, Timer::Reveal);
        let effects = s.timer_elapsed(1, Timer::RevealCorrect);

        assert_eq!(s.phase(), GamePhase::GameOver);
        assert!(s.advice().is_none());
        assert_eq!(
            effects,
            vec![
                Effect::Cue(Cue::BackgroundStop),
                Effect::Cue(Cue::SuspenseStop)
            ]
        );
        // The vote finishing afterwards changes nothing.
        assert!(s.timer_elapsed(1, Timer::Advice(Lifeline::Audience)).is_empty());
        assert!(s.advice().is_none());

        let restart = s.start();
        assert!(!restart.contains(&Effect::Cue(Cue::SuspenseStop)));
    }

    #[test]
    fn pending_advice_is_closed_on_win() {
        let mut s = playing(15);
        for _ in 0..14 {
            climb(&mut s);
        }
        s.use_lifeline(Lifeline::Phone);
        let effects = climb(&mut s);

        assert_eq!(s.phase(), GamePhase::Win);
        assert!(s.advice().is_none());
        assert!(effects.contains(&Effect::Cue(Cue::SuspenseStop)));
        s.timer_elapsed(1, Timer::Advice(Lifeline::Phone));
        assert!(s.advice().is_none());
    }

    #[test]
    fn phone_suggests_an_option() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::Phone);
        assert_eq!(s.advice(), Some(&Advice::Calling));

        s.timer_elapsed(1, Timer::Advice(Lifeline::Phone));
        let question = s.current_question().unwrap().clone();
        match s.advice() {
            Some(Advice::Friend { suggestion }) => assert!(question.has_option(suggestion)),
            other => panic!("expected friend, got {other:?}"),
        }
    }

    #[test]
    fn second_advisory_waits_for_the_first() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::Audience);
        assert!(s.use_lifeline(Lifeline::Phone).is_empty());
        assert!(!s.lifelines().is_used(Lifeline::Phone));

        s.timer_elapsed(1, Timer::Advice(Lifeline::Audience));
        assert!(!s.use_lifeline(Lifeline::Phone).is_empty());
        assert_eq!(s.advice(), Some(&Advice::Calling));
    }

    #[test]
    fn advice_cleared_when_question_changes() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::Phone);
        climb(&mut s);
        assert!(s.advice().is_none());
        // The late timer finds nothing to resolve.
        s.timer_elapsed(1, Timer::Advice(Lifeline::Phone));
        assert!(s.advice().is_none());
    }

    #[test]
    fn switch_is_locked_before_question_eight() {
        let mut s = playing(15);
        for _ in 0..6 {
            climb(&mut s);
        }
        assert_eq!(s.current_index(), 6);
        assert!(s.use_lifeline(Lifeline::Switch).is_empty());
        assert!(!s.lifelines().is_used(Lifeline::Switch));
    }

    #[test]
    fn switch_moves_current_question_to_end() {
        let mut s = playing(9);
        for _ in 0..7 {
            climb(&mut s);
        }
        assert_eq!(s.current_index(), 7);
        assert_eq!(s.buffer().len(), 9);
        s.use_lifeline(Lifeline::FiftyFifty);

        let before = s.current_question().unwrap().id();
        let mut ids_before: Vec<_> = s.buffer().iter().map(Question::id).collect();

        let effects = s.use_lifeline(Lifeline::Switch);
        assert!(fetches(&effects).is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.current_index(), 7);
        assert_eq!(s.buffer().len(), 9);
        assert_eq!(s.buffer().get(8).unwrap().id(), before);
        assert_ne!(s.current_question().unwrap().id(), before);
        assert!(s.selected_answer().is_none());
        assert!(s.disabled_answers().is_empty());

        let mut ids_after: Vec<_> = s.buffer().iter().map(Question::id).collect();
        ids_before.sort();
        ids_after.sort();
        assert_eq!(ids_before, ids_after);

        assert!(s.use_lifeline(Lifeline::Switch).is_empty());
    }

    #[test]
    fn switch_without_lookahead_fetches_one_question() {
        let mut s = playing(8);
        for _ in 0..7 {
            climb(&mut s);
        }
        assert_eq!(s.buffer().len(), 8);
        let current = s.current_question().unwrap().id();

        let effects = s.use_lifeline(Lifeline::Switch);
        let requests = fetches(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purpose, FetchPurpose::Switch);
        assert_eq!(requests[0].count, 1);
        assert_eq!(requests[0].already_seen.len(), 8);
        assert!(s.lifelines().is_used(Lifeline::Switch));
        assert_eq!(s.phase(), GamePhase::Playing);

        s.batch_received(1, FetchPurpose::Switch, batch(100..101));
        assert_eq!(s.buffer().len(), 9);
        assert_eq!(s.current_question().unwrap().id(), current);
    }

    #[test]
    fn switch_fetch_failure_is_swallowed() {
        let mut s = playing(8);
        for _ in 0..7 {
            climb(&mut s);
        }
        s.use_lifeline(Lifeline::Switch);
        assert!(s.batch_failed(1, FetchPurpose::Switch, "nope").is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(s.error().is_none());
    }

    #[test]
    fn advance_waits_for_lagging_background_batch() {
        let mut s = session();
        s.start();
        s.batch_received(1, FetchPurpose::Initial, batch(0..5));
        for _ in 0..4 {
            climb(&mut s);
        }
        assert_eq!(s.current_index(), 4);

        // Background fetch is still in flight: wait without a second request.
        let effects = climb(&mut s);
        assert!(effects.is_empty());
        assert_eq!(s.phase(), GamePhase::AnswerCorrect);
        assert_eq!(s.current_index(), 4);
        assert!(s.is_awaiting_question());
        assert!(s.snapshot().awaiting_question);

        s.batch_received(1, FetchPurpose::Background, batch(5..15));
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.current_index(), 5);
        assert!(!s.is_awaiting_question());
    }

    #[test]
    fn failed_background_batch_is_retried_while_waiting() {
        let mut s = session();
        s.start();
        s.batch_received(1, FetchPurpose::Initial, batch(0..5));
        assert!(s.batch_failed(1, FetchPurpose::Background, "timeout").is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);

        for _ in 0..4 {
            climb(&mut s);
        }
        let effects = climb(&mut s);
        let requests = fetches(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purpose, FetchPurpose::Refill);
        assert_eq!(requests[0].count, 10);

        let effects = s.batch_failed(1, FetchPurpose::Refill, "timeout");
        assert_eq!(
            scheduled(&effects),
            vec![(Timer::RefillRetry, Duration::from_millis(2000))]
        );

        let effects = s.timer_elapsed(1, Timer::RefillRetry);
        assert_eq!(fetches(&effects)[0].purpose, FetchPurpose::Refill);

        s.batch_received(1, FetchPurpose::Refill, batch(5..15));
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.current_index(), 5);
    }

    #[test]
    fn timers_for_other_phases_are_no_ops() {
        let mut s = playing(15);
        assert!(s.timer_elapsed(1, Timer::Reveal).is_empty());
        assert!(s.timer_elapsed(1, Timer::Celebrate).is_empty());
        assert!(s.timer_elapsed(1, Timer::RevealCorrect).is_empty());
        assert!(s.timer_elapsed(1, Timer::RefillRetry).is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn snapshot_mirrors_queries() {
        let mut s = playing(15);
        s.use_lifeline(Lifeline::FiftyFifty);
        let snap = s.snapshot();

        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.total_questions, 15);
        assert_eq!(snap.buffered, 15);
        assert_eq!(
            snap.question.as_ref().map(Question::id),
            s.current_question().map(Question::id)
        );
        assert_eq!(snap.disabled_answers, s.disabled_answers());
        assert!(!snap.switch_unlocked);
        assert_eq!(
            snap.available_lifelines(),
            vec![Lifeline::Audience, Lifeline::Phone]
        );
        assert_eq!(snap.prize_label().as_deref(), Some("100"));
    }
}
