//! Rhyme Racer - a rhythm-timed lane runner
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (track, spawner, collisions, scoring)
//! - `content`: Rhyme prompt sources
//! - `score`: Score accumulation and the final round record
//! - `present`: Presentation sink interface (rendering lives outside this crate)
//! - `tuning`: Data-driven game balance

pub mod content;
pub mod error;
pub mod present;
pub mod score;
pub mod sim;
pub mod tuning;

pub use content::{ContentSource, Prompt, PromptCategory, PromptDeck};
pub use error::{EngineError, TuningError};
pub use score::{Grade, ScoreAccumulator, ScoreRecord};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Beat cadence in milliseconds (50 BPM)
    pub const BEAT_INTERVAL_MS: u64 = 1200;
    /// Length of one round
    pub const ROUND_DURATION_MS: u64 = 60_000;
    /// Largest simulation step accepted per tick (bounds integration error after stalls)
    pub const MAX_TICK_DT: f32 = 0.05;
    /// Delay between round end and results presentation
    pub const RESULTS_DELAY_MS: u64 = 800;

    /// Track pixels per meter of distance
    pub const PX_PER_METER: f32 = 2.2;

    /// Player speed bounds (px/s)
    pub const SPEED_MIN: f32 = 140.0;
    pub const SPEED_MAX: f32 = 520.0;
    /// Correct answer outside any green zone
    pub const SPEED_GOOD_INC: f32 = 30.0;
    /// Correct answer inside a green zone
    pub const SPEED_PERFECT_INC: f32 = 80.0;
    /// Wrong answer penalty
    pub const SPEED_MISS_DEC: f32 = 70.0;
    /// Bump penalty
    pub const SPEED_COLLISION_DEC: f32 = 120.0;
    /// Multiplicative speed decay applied on every beat
    pub const BEAT_SPEED_DECAY: f32 = 0.96;

    /// Visible track width (px); entities spawn past this edge
    pub const TRACK_WIDTH: f32 = 400.0;
    /// Player's fixed x on the track (35% of the track width)
    pub const PLAYER_X: f32 = 140.0;
    /// Half the player body length; reference point is PLAYER_X + this
    pub const PLAYER_HALF_LENGTH: f32 = 22.0;
    /// Collision window around the player reference point
    pub const COLLISION_WINDOW_BEHIND: f32 = 30.0;
    pub const COLLISION_WINDOW_AHEAD: f32 = 24.0;

    /// Lane offsets from the road bottom, top lane first
    pub const LANE_OFFSETS: [f32; 3] = [55.0, 45.0, 35.0];
    /// Lanes whose offsets differ by less than this are the same lane
    pub const LANE_EPSILON: f32 = 1.0;
    /// Lane the player starts each round in (middle)
    pub const START_LANE: usize = 1;

    /// Obstacle defaults
    pub const OBSTACLE_LENGTH: f32 = 35.0;
    pub const OBSTACLE_SPEED_MIN: f32 = 180.0;
    pub const OBSTACLE_SPEED_MAX: f32 = 300.0;
    pub const OBSTACLE_SPAWN_MARGIN: f32 = 80.0;
    /// Obstacles behind this x are gone
    pub const OBSTACLE_DESPAWN_BEHIND: f32 = -120.0;
    /// Obstacles that outrun the player this far past the track edge are gone
    pub const OBSTACLE_DESPAWN_AHEAD: f32 = 240.0;
    /// Minimum interval between two recorded collisions
    pub const COLLISION_COOLDOWN_MS: u64 = 350;

    /// Green zone defaults
    pub const ZONE_WIDTH: f32 = 70.0;
    pub const ZONE_SPAWN_MARGIN: f32 = 40.0;
    pub const ZONE_TOLERANCE: f32 = 2.0;

    /// Spawn cadence
    pub const ZONE_EVERY_BEATS: u64 = 4;
    pub const OBSTACLES_PER_ZONE_BEAT: u32 = 2;
    pub const OFFBEAT_OBSTACLE_CHANCE: f64 = 0.45;
    pub const INITIAL_OBSTACLES: u32 = 3;

    /// Combo thresholds for boost tiers 1 and 2
    pub const BOOST_TIER1_COMBO: u32 = 5;
    pub const BOOST_TIER2_COMBO: u32 = 10;
    /// How long a freshly entered boost tier stays active
    pub const BOOST_ACTIVE_MS: u64 = 2400;

    /// Feedback display durations
    pub const ANSWER_FEEDBACK_MS: u64 = 850;
    pub const BUMP_FEEDBACK_MS: u64 = 580;
}

/// Convert a frame delta in seconds to whole microseconds
#[inline]
pub fn secs_to_micros(secs: f32) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs as f64 * 1_000_000.0).round() as u64
    } else {
        0
    }
}

/// Convert milliseconds to microseconds, saturating at `u64::MAX`
#[inline]
pub const fn ms_to_micros(ms: u64) -> u64 {
    ms.saturating_mul(1000)
}

/// Rounded percentage of `part` over `whole`, 0 when `whole` is 0
#[inline]
pub fn percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (part.min(whole) as f64 / whole as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_micros() {
        assert_eq!(secs_to_micros(0.05), 50_000);
        assert_eq!(secs_to_micros(1.0 / 60.0), 16_667);
        assert_eq!(secs_to_micros(-1.0), 0);
        assert_eq!(secs_to_micros(f32::NAN), 0);
    }

    #[test]
    fn test_ms_to_micros_saturates() {
        assert_eq!(ms_to_micros(1200), 1_200_000);
        assert_eq!(ms_to_micros(u64::MAX / 1000 + 1), u64::MAX);
        assert_eq!(ms_to_micros(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(8, 10), 80);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(5, 5), 100);
    }
}
