//! Round controller
//!
//! Owns the lifecycle (Idle -> Running -> Ended) and every piece of mutable
//! round state. Ticks, beats and taps are processed one at a time, in the
//! order the caller delivers them.

use serde::{Deserialize, Serialize};

use super::answer;
use super::clock::Clock;
use super::collision::{self, CollisionDetector, CollisionEvent};
use super::combo;
use super::spawner::{RngState, Spawner};
use super::state::{
    ActivePrompt, AnswerId, EndReason, Feedback, FeedbackKind, GameEvent, LaneDirection, Outcome,
    PlayerState, RoundState,
};
use super::track::Track;
use crate::content::ContentSource;
use crate::error::{EngineError, TuningError};
use crate::present::Snapshot;
use crate::score::{ScoreAccumulator, ScoreRecord};
use crate::tuning::Tuning;
use crate::{ms_to_micros, secs_to_micros};

/// Player input accepted while a round is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    LaneChange(LaneDirection),
    AnswerSelected(AnswerId),
}

pub struct RoundController<C: ContentSource> {
    tuning: Tuning,
    content: C,
    /// Base seed; each round derives its own from this
    seed: u64,
    rounds_started: u64,
    state: RoundState,
    clock: Clock,
    track: Track,
    spawner: Spawner,
    detector: CollisionDetector,
    player: PlayerState,
    score: ScoreAccumulator,
    prompt: Option<ActivePrompt>,
    prompt_serial: u32,
    beat: u64,
    feedback: Option<Feedback>,
    record: Option<ScoreRecord>,
    /// Microseconds until the results are presented
    pending_results: Option<u64>,
    events: Vec<GameEvent>,
}

impl<C: ContentSource> RoundController<C> {
    /// Create an idle controller with validated tuning
    pub fn new(tuning: Tuning, content: C, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(tuning, content, seed))
    }

    /// Create an idle controller with the default tuning
    pub fn with_default_tuning(content: C, seed: u64) -> Self {
        Self::build(Tuning::default(), content, seed)
    }

    fn build(tuning: Tuning, content: C, seed: u64) -> Self {
        let clock = Clock::new(
            tuning.beat_interval_us(),
            tuning.round_duration_us(),
            tuning.max_tick_dt,
        );
        let player = PlayerState::new(&tuning);
        Self {
            content,
            seed,
            rounds_started: 0,
            state: RoundState::Idle,
            clock,
            track: Track::new(),
            spawner: Spawner::from_seed(seed),
            detector: CollisionDetector::new(),
            player,
            score: ScoreAccumulator::new(),
            prompt: None,
            prompt_serial: 0,
            beat: 0,
            feedback: None,
            record: None,
            pending_results: None,
            events: Vec::new(),
            tuning,
        }
    }

    // === Lifecycle ===

    /// Start a fresh round. Legal from Idle and Ended.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.state == RoundState::Running {
            log::warn!("start() rejected: round already running");
            return Err(EngineError::InvalidTransition {
                op: "start",
                state: self.state,
            });
        }

        if self.pending_results.take().is_some() {
            log::debug!("Cancelled pending results of previous round");
        }

        let round_seed = self.round_seed();
        self.rounds_started += 1;

        self.clock = Clock::new(
            self.tuning.beat_interval_us(),
            self.tuning.round_duration_us(),
            self.tuning.max_tick_dt,
        );
        self.track.clear();
        self.spawner = Spawner::new(&RngState::new(round_seed));
        self.detector.reset();
        self.player = PlayerState::new(&self.tuning);
        self.score = ScoreAccumulator::new();
        self.prompt = None;
        self.beat = 0;
        self.feedback = None;
        self.record = None;

        self.state = RoundState::Running;
        self.events.push(GameEvent::RoundStarted { seed: round_seed });
        log::info!("Round {} started (seed {})", self.rounds_started, round_seed);

        // Opening set: one prompt, one zone, a little traffic
        self.refresh_prompt();
        self.spawn_zone();
        for spawn in self.spawner.initial_obstacles(&self.tuning) {
            self.spawn_obstacle(spawn.lane, spawn.speed);
        }

        self.clock.start();
        Ok(())
    }

    /// End a running round now and return its record
    pub fn force_end(&mut self) -> Result<ScoreRecord, EngineError> {
        if self.state != RoundState::Running {
            log::warn!("force_end() rejected: round is {:?}", self.state);
            return Err(EngineError::InvalidTransition {
                op: "force_end",
                state: self.state,
            });
        }
        Ok(self.end(EndReason::Forced))
    }

    /// Cancel a results presentation that has not fired yet
    pub fn cancel_pending_results(&mut self) -> bool {
        let cancelled = self.pending_results.take().is_some();
        if cancelled {
            log::debug!("Results presentation cancelled");
        }
        cancelled
    }

    fn end(&mut self, reason: EndReason) -> ScoreRecord {
        self.clock.stop();
        self.state = RoundState::Ended;

        let record = self.score.finalize(self.player.distance);
        self.record = Some(record);
        self.events.push(GameEvent::RoundEnded { reason });
        log::info!(
            "Round ended ({:?}): distance {} m, best combo {}",
            reason,
            record.distance_m,
            record.best_combo
        );

        let delay_us = ms_to_micros(self.tuning.results_delay_ms);
        if delay_us == 0 {
            self.events.push(GameEvent::ResultsReady(record));
        } else {
            self.pending_results = Some(delay_us);
        }
        record
    }

    fn round_seed(&self) -> u64 {
        self.seed ^ self.rounds_started.wrapping_mul(2654435761)
    }

    // === Cadences ===

    /// Advance by one frame (`dt` seconds)
    pub fn tick(&mut self, dt: f32) {
        match self.state {
            RoundState::Running => self.step(dt),
            RoundState::Ended => self.run_results_timer(dt),
            RoundState::Idle => {}
        }
    }

    fn step(&mut self, dt: f32) {
        let Some(step) = self.clock.advance(dt) else {
            return;
        };
        let now_us = self.clock.elapsed_us();

        let gone = self
            .track
            .advance(&self.tuning, &mut self.player, step.dt, now_us);
        self.detector.forget(&gone.obstacles);

        // Uses positions advanced on this same tick
        let hits = self.detector.detect(
            &self.tuning,
            self.player.lane,
            &self.track.obstacles,
            now_us,
        );
        if !hits.is_empty() {
            self.apply_collisions(&hits);
        }

        if combo::advance(&mut self.player, step.dt) {
            self.events.push(GameEvent::BoostLapsed);
        }
        self.run_feedback_timer(step.dt);

        for _ in 0..step.beats {
            self.on_beat();
        }

        if step.expired {
            self.end(EndReason::TimeExpired);
        }
    }

    fn on_beat(&mut self) {
        self.beat += 1;
        let plan = self.spawner.on_beat(&self.tuning, self.beat);

        if plan.zone {
            self.spawn_zone();
        }
        for spawn in plan.obstacles {
            self.spawn_obstacle(spawn.lane, spawn.speed);
        }
        if plan.new_prompt {
            self.refresh_prompt();
        }

        Track::decay_speed(&self.tuning, &mut self.player);
        self.events.push(GameEvent::Beat { index: self.beat });
    }

    fn run_results_timer(&mut self, dt: f32) {
        let Some(remaining) = self.pending_results else {
            return;
        };
        let remaining = remaining.saturating_sub(secs_to_micros(dt));
        if remaining > 0 {
            self.pending_results = Some(remaining);
            return;
        }
        self.pending_results = None;
        if let Some(record) = self.record {
            log::info!("Presenting results");
            self.events.push(GameEvent::ResultsReady(record));
        }
    }

    fn run_feedback_timer(&mut self, dt: f32) {
        if let Some(feedback) = &mut self.feedback {
            feedback.remaining -= dt;
            if feedback.remaining <= 0.0 {
                self.feedback = None;
            }
        }
    }

    fn show_feedback(&mut self, kind: FeedbackKind) {
        let ms = match kind {
            FeedbackKind::Bump => self.tuning.bump_feedback_ms,
            _ => self.tuning.answer_feedback_ms,
        };
        self.feedback = Some(Feedback {
            kind,
            remaining: ms as f32 / 1000.0,
        });
    }

    // === Spawning ===

    fn spawn_zone(&mut self) {
        let id = self.track.spawn_zone(&self.tuning, self.clock.elapsed_us());
        self.events.push(GameEvent::ZoneSpawned { id });
    }

    fn spawn_obstacle(&mut self, lane: usize, speed: f32) {
        let id = self.track.spawn_obstacle(&self.tuning, lane, speed);
        self.events.push(GameEvent::ObstacleSpawned { id, lane });
    }

    /// Replace the active prompt wholesale. A failed fetch leaves no prompt
    /// until the next prompt beat.
    fn refresh_prompt(&mut self) {
        self.prompt_serial += 1;
        match self.content.random_prompt() {
            Ok(prompt) => {
                let serial = self.prompt_serial;
                self.prompt = Some(ActivePrompt::new(serial, prompt, self.clock.elapsed_ms()));
                self.events.push(GameEvent::PromptChanged { serial });
            }
            Err(err) => {
                log::warn!("No prompt this cycle: {err}");
                self.prompt = None;
                self.events.push(GameEvent::ContentUnavailable);
            }
        }
    }

    // === Collisions ===

    fn apply_collisions(&mut self, hits: &[CollisionEvent]) {
        // One penalty per tick
        self.player
            .change_speed(-self.tuning.speed_collision_dec, &self.tuning);
        self.break_combo();
        self.show_feedback(FeedbackKind::Bump);
        for hit in hits {
            self.events.push(GameEvent::Collision {
                obstacle_id: hit.obstacle_id,
            });
        }
    }

    fn break_combo(&mut self) {
        if combo::register_break(&mut self.player) {
            self.events.push(GameEvent::BoostLapsed);
        }
    }

    // === Input ===

    /// Route an input event. Ignored unless the round is running.
    pub fn handle_input(&mut self, input: InputEvent) -> Option<Outcome> {
        match input {
            InputEvent::LaneChange(direction) => {
                self.change_lane(direction);
                None
            }
            InputEvent::AnswerSelected(id) => self.select_answer(id),
        }
    }

    /// Move one lane up or down. Returns true if the lane changed.
    pub fn change_lane(&mut self, direction: LaneDirection) -> bool {
        if self.state != RoundState::Running {
            return false;
        }
        let changed = Track::shift_lane(&self.tuning, &mut self.player, direction.delta());
        if changed {
            self.events.push(GameEvent::LaneChanged {
                lane: self.player.lane,
            });
        }
        changed
    }

    /// Signed lane request (-1 = up, +1 = down). Other values are ignored.
    pub fn lane_change_requested(&mut self, sign: i32) -> bool {
        match LaneDirection::from_sign(sign) {
            Some(direction) => self.change_lane(direction),
            None => {
                log::debug!("Ignoring lane request {sign}");
                false
            }
        }
    }

    /// Evaluate a tap. Returns `None` for taps that do nothing: not running,
    /// no prompt, an option of a replaced prompt, or a second tap.
    pub fn select_answer(&mut self, id: AnswerId) -> Option<Outcome> {
        if self.state != RoundState::Running {
            return None;
        }
        let now_ms = self.clock.elapsed_ms();

        let active = self.prompt.as_mut()?;
        let Some(option) = active.live_option(id) else {
            log::debug!("Ignoring tap on inert answer {:?}", id);
            return None;
        };
        let is_correct = option.is_correct;
        let latency_ms = now_ms.saturating_sub(option.presented_at_ms);
        let category = active.category();
        active.answered = true;

        let zone_occupied = self.is_in_zone();
        let outcome = answer::evaluate(is_correct, zone_occupied);
        answer::apply(
            outcome,
            category,
            latency_ms,
            &self.tuning,
            &mut self.player,
            &mut self.score,
        );

        if outcome.is_success() {
            if let Some(tier) = combo::register_success(&self.tuning, &mut self.player) {
                self.events.push(GameEvent::BoostActivated { tier });
            }
        } else {
            self.break_combo();
        }
        self.score.observe_combo(self.player.combo);

        self.show_feedback(outcome.into());
        self.events.push(GameEvent::Answered {
            outcome,
            combo: self.player.combo,
        });
        Some(outcome)
    }

    // === Read-only views ===

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn score(&self) -> &ScoreAccumulator {
        &self.score
    }

    pub fn prompt(&self) -> Option<&ActivePrompt> {
        self.prompt.as_ref()
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn beat(&self) -> u64 {
        self.beat
    }

    /// Final record, once the round has ended
    pub fn record(&self) -> Option<ScoreRecord> {
        self.record
    }

    pub fn results_pending(&self) -> bool {
        self.pending_results.is_some()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed_ms()
    }

    pub fn time_left_ms(&self) -> u64 {
        match self.state {
            RoundState::Idle => self.tuning.round_duration_ms,
            _ => self.clock.remaining_us() / 1000,
        }
    }

    /// Whether the player's reference point is inside any green zone
    pub fn is_in_zone(&self) -> bool {
        collision::is_in_zone(
            self.tuning.player_reference(),
            &self.track.zones,
            self.tuning.zone_tolerance,
        )
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for the presentation layer
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.state,
            player: &self.player,
            obstacles: &self.track.obstacles,
            zones: &self.track.zones,
            prompt: self.prompt.as_ref(),
            feedback: self.feedback,
            beat: self.beat,
            time_left_ms: self.time_left_ms(),
            in_zone: self.is_in_zone(),
            boost_active: self.player.boost_active(),
            speed_mps: self.player.speed_mps(&self.tuning),
        }
    }
}
