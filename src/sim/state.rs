//! Round state and core simulation types
//!
//! Everything the presentation layer may look at lives here. Mutation goes
//! through the round controller.

use serde::{Deserialize, Serialize};

use crate::content::{Prompt, PromptCategory};
use crate::score::ScoreRecord;
use crate::tuning::Tuning;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Waiting for `start()`
    Idle,
    /// Clock running, input accepted
    Running,
    /// Round over, score finalized
    Ended,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeExpired,
    Forced,
}

/// Boost tier unlocked by combos
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum BoostTier {
    #[default]
    None,
    Tier1,
    Tier2,
}

impl BoostTier {
    pub fn level(self) -> u8 {
        match self {
            BoostTier::None => 0,
            BoostTier::Tier1 => 1,
            BoostTier::Tier2 => 2,
        }
    }
}

/// Lane change direction (-1 = up, +1 = down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneDirection {
    Up,
    Down,
}

impl LaneDirection {
    pub fn delta(self) -> i32 {
        match self {
            LaneDirection::Up => -1,
            LaneDirection::Down => 1,
        }
    }

    /// Map a signed swipe direction, anything else is not a lane change
    pub fn from_sign(dir: i32) -> Option<Self> {
        match dir {
            -1 => Some(LaneDirection::Up),
            1 => Some(LaneDirection::Down),
            _ => None,
        }
    }
}

/// The player's car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current speed (px/s), always within the tuning's speed bounds
    pub speed: f32,
    /// Meters travelled this round
    pub distance: f32,
    /// Index into the lane list
    pub lane: usize,
    /// Consecutive successful answers since the last miss or collision
    pub combo: u32,
    pub boost_tier: BoostTier,
    /// Seconds left on the most recent boost activation (0 = inactive)
    pub boost_remaining: f32,
}

impl PlayerState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            speed: tuning.speed_min,
            distance: 0.0,
            lane: tuning.start_lane,
            combo: 0,
            boost_tier: BoostTier::None,
            boost_remaining: 0.0,
        }
    }

    /// Add `delta` to speed, clamped to the tuning's bounds
    pub fn change_speed(&mut self, delta: f32, tuning: &Tuning) {
        self.speed = (self.speed + delta).clamp(tuning.speed_min, tuning.speed_max);
    }

    pub fn boost_active(&self) -> bool {
        self.boost_remaining > 0.0
    }

    /// Speed in meters per second (HUD readout)
    pub fn speed_mps(&self, tuning: &Tuning) -> f32 {
        self.speed / tuning.px_per_meter
    }
}

/// A traffic car sharing the road
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub lane: usize,
    /// Track x of the trailing (left) edge
    pub x: f32,
    /// Own forward speed (px/s)
    pub speed: f32,
}

impl Obstacle {
    /// Trailing and leading edges on the track
    pub fn span(&self, length: f32) -> (f32, f32) {
        (self.x, self.x + length)
    }
}

/// A green zone: answering while inside one is a Perfect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingZone {
    pub id: u32,
    /// Track x of the zone's trailing edge
    pub start: f32,
    pub width: f32,
    /// Round time (µs) the zone was created
    pub created_at_us: u64,
    /// Optional lifetime (µs)
    pub ttl_us: Option<u64>,
}

impl TimingZone {
    pub fn end(&self) -> f32 {
        self.start + self.width
    }

    pub fn contains(&self, point: f32, tolerance: f32) -> bool {
        point >= self.start - tolerance && point <= self.end() + tolerance
    }

    pub fn expired(&self, now_us: u64) -> bool {
        self.ttl_us
            .is_some_and(|ttl| now_us.saturating_sub(self.created_at_us) >= ttl)
    }
}

/// Identity of an answer option: the prompt serial it belongs to plus its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerId {
    pub prompt: u32,
    pub index: usize,
}

/// Tappable view of one prompt option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: AnswerId,
    pub word: String,
    pub is_correct: bool,
    /// Round time (ms) the option was shown; latency metrics only
    pub presented_at_ms: u64,
}

/// The single live prompt and its answer set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePrompt {
    pub serial: u32,
    pub prompt: Prompt,
    pub options: Vec<AnswerOption>,
    /// Set on the first tap; every later tap on this prompt is a no-op
    pub answered: bool,
}

impl ActivePrompt {
    pub fn new(serial: u32, prompt: Prompt, presented_at_ms: u64) -> Self {
        let options = prompt
            .options
            .iter()
            .enumerate()
            .map(|(index, word)| AnswerOption {
                id: AnswerId {
                    prompt: serial,
                    index,
                },
                word: word.clone(),
                is_correct: prompt.is_correct(index),
                presented_at_ms,
            })
            .collect();
        Self {
            serial,
            prompt,
            options,
            answered: false,
        }
    }

    pub fn category(&self) -> Option<PromptCategory> {
        self.prompt.category
    }

    /// Look up a still-tappable option
    pub fn live_option(&self, id: AnswerId) -> Option<&AnswerOption> {
        if self.answered || id.prompt != self.serial {
            return None;
        }
        self.options.get(id.index)
    }
}

/// Result of evaluating one tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Perfect,
    Good,
    Miss,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Perfect | Outcome::Good)
    }
}

/// What the feedback banner currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    Perfect,
    Good,
    Miss,
    Bump,
}

impl From<Outcome> for FeedbackKind {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Perfect => FeedbackKind::Perfect,
            Outcome::Good => FeedbackKind::Good,
            Outcome::Miss => FeedbackKind::Miss,
        }
    }
}

/// Feedback banner with its remaining display time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub remaining: f32,
}

/// Discrete state changes for external consumers (audio, effects, results screen)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { seed: u64 },
    Beat { index: u64 },
    PromptChanged { serial: u32 },
    ContentUnavailable,
    ObstacleSpawned { id: u32, lane: usize },
    ZoneSpawned { id: u32 },
    Collision { obstacle_id: u32 },
    Answered { outcome: Outcome, combo: u32 },
    BoostActivated { tier: BoostTier },
    BoostLapsed,
    LaneChanged { lane: usize },
    RoundEnded { reason: EndReason },
    ResultsReady(ScoreRecord),
}
