//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Integer microsecond clock, clamped frame steps
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod answer;
pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod combo;
pub mod round;
pub mod spawner;
pub mod state;
pub mod track;

pub use autopilot::Autopilot;
pub use clock::{Clock, ClockStep};
pub use collision::{CollisionDetector, CollisionEvent, PlayerWindow, is_in_zone};
pub use round::{InputEvent, RoundController};
pub use spawner::{RngState, SpawnPlan, Spawner};
pub use state::{
    ActivePrompt, AnswerId, AnswerOption, BoostTier, EndReason, Feedback, FeedbackKind, GameEvent,
    LaneDirection, Obstacle, Outcome, PlayerState, RoundState, TimingZone,
};
pub use track::Track;
