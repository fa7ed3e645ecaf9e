//! Data-driven game balance
//!
//! Every gameplay constant in `consts` has a field here so a round can be
//! re-tuned from a JSON file without rebuilding. Missing fields fall back to
//! the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;
use crate::ms_to_micros;

/// Largest millisecond value that converts to microseconds without overflow
const MAX_MS: u64 = u64::MAX / 1000;

/// Tunable round parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    pub beat_interval_ms: u64,
    pub round_duration_ms: u64,
    pub max_tick_dt: f32,
    pub results_delay_ms: u64,

    // === Speed ===
    pub px_per_meter: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub speed_good_inc: f32,
    pub speed_perfect_inc: f32,
    pub speed_miss_dec: f32,
    pub speed_collision_dec: f32,
    pub beat_speed_decay: f32,

    // === Track geometry ===
    pub track_width: f32,
    pub player_x: f32,
    pub player_half_length: f32,
    pub collision_window_behind: f32,
    pub collision_window_ahead: f32,
    pub lane_offsets: Vec<f32>,
    pub lane_epsilon: f32,
    pub start_lane: usize,

    // === Obstacles ===
    pub obstacle_length: f32,
    pub obstacle_speed_min: f32,
    pub obstacle_speed_max: f32,
    pub obstacle_spawn_margin: f32,
    pub obstacle_despawn_behind: f32,
    pub obstacle_despawn_ahead: f32,
    pub collision_cooldown_ms: u64,

    // === Green zones ===
    pub zone_width: f32,
    pub zone_spawn_margin: f32,
    pub zone_tolerance: f32,
    /// Optional lifetime; zones without one live until they pass the player
    pub zone_ttl_ms: Option<u64>,

    // === Spawn cadence ===
    pub zone_every_beats: u64,
    pub obstacles_per_zone_beat: u32,
    pub offbeat_obstacle_chance: f64,
    pub initial_obstacles: u32,

    // === Combo / boost ===
    pub boost_tier1_combo: u32,
    pub boost_tier2_combo: u32,
    pub boost_active_ms: u64,

    // === Feedback ===
    pub answer_feedback_ms: u64,
    pub bump_feedback_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            beat_interval_ms: BEAT_INTERVAL_MS,
            round_duration_ms: ROUND_DURATION_MS,
            max_tick_dt: MAX_TICK_DT,
            results_delay_ms: RESULTS_DELAY_MS,

            px_per_meter: PX_PER_METER,
            speed_min: SPEED_MIN,
            speed_max: SPEED_MAX,
            speed_good_inc: SPEED_GOOD_INC,
            speed_perfect_inc: SPEED_PERFECT_INC,
            speed_miss_dec: SPEED_MISS_DEC,
            speed_collision_dec: SPEED_COLLISION_DEC,
            beat_speed_decay: BEAT_SPEED_DECAY,

            track_width: TRACK_WIDTH,
            player_x: PLAYER_X,
            player_half_length: PLAYER_HALF_LENGTH,
            collision_window_behind: COLLISION_WINDOW_BEHIND,
            collision_window_ahead: COLLISION_WINDOW_AHEAD,
            lane_offsets: LANE_OFFSETS.to_vec(),
            lane_epsilon: LANE_EPSILON,
            start_lane: START_LANE,

            obstacle_length: OBSTACLE_LENGTH,
            obstacle_speed_min: OBSTACLE_SPEED_MIN,
            obstacle_speed_max: OBSTACLE_SPEED_MAX,
            obstacle_spawn_margin: OBSTACLE_SPAWN_MARGIN,
            obstacle_despawn_behind: OBSTACLE_DESPAWN_BEHIND,
            obstacle_despawn_ahead: OBSTACLE_DESPAWN_AHEAD,
            collision_cooldown_ms: COLLISION_COOLDOWN_MS,

            zone_width: ZONE_WIDTH,
            zone_spawn_margin: ZONE_SPAWN_MARGIN,
            zone_tolerance: ZONE_TOLERANCE,
            zone_ttl_ms: None,

            zone_every_beats: ZONE_EVERY_BEATS,
            obstacles_per_zone_beat: OBSTACLES_PER_ZONE_BEAT,
            offbeat_obstacle_chance: OFFBEAT_OBSTACLE_CHANCE,
            initial_obstacles: INITIAL_OBSTACLES,

            boost_tier1_combo: BOOST_TIER1_COMBO,
            boost_tier2_combo: BOOST_TIER2_COMBO,
            boost_active_ms: BOOST_ACTIVE_MS,

            answer_feedback_ms: ANSWER_FEEDBACK_MS,
            bump_feedback_ms: BUMP_FEEDBACK_MS,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would break the engine's invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(msg: impl Into<String>) -> Result<(), TuningError> {
            Err(TuningError::Invalid(msg.into()))
        }

        if !(self.speed_min > 0.0 && self.speed_min < self.speed_max) {
            return invalid(format!(
                "speed range [{}, {}] must be positive and non-empty",
                self.speed_min, self.speed_max
            ));
        }
        if self.beat_interval_ms == 0 {
            return invalid("beat_interval_ms must be positive");
        }
        if self.round_duration_ms == 0 {
            return invalid("round_duration_ms must be positive");
        }
        let durations = [
            ("beat_interval_ms", Some(self.beat_interval_ms)),
            ("round_duration_ms", Some(self.round_duration_ms)),
            ("results_delay_ms", Some(self.results_delay_ms)),
            ("collision_cooldown_ms", Some(self.collision_cooldown_ms)),
            ("boost_active_ms", Some(self.boost_active_ms)),
            ("zone_ttl_ms", self.zone_ttl_ms),
        ];
        for (name, value) in durations {
            if value.is_some_and(|ms| ms > MAX_MS) {
                return invalid(format!("{name} must be at most {MAX_MS}"));
            }
        }
        if !(self.max_tick_dt > 0.0) {
            return invalid("max_tick_dt must be positive");
        }
        if !(self.px_per_meter > 0.0) {
            return invalid("px_per_meter must be positive");
        }
        if !(self.beat_speed_decay > 0.0 && self.beat_speed_decay <= 1.0) {
            return invalid("beat_speed_decay must be within (0, 1]");
        }
        if self.lane_offsets.is_empty() {
            return invalid("at least one lane is required");
        }
        if self.start_lane >= self.lane_offsets.len() {
            return invalid(format!(
                "start_lane {} out of range for {} lanes",
                self.start_lane,
                self.lane_offsets.len()
            ));
        }
        if self.zone_every_beats == 0 {
            return invalid("zone_every_beats must be positive");
        }
        if !(0.0..=1.0).contains(&self.offbeat_obstacle_chance) {
            return invalid("offbeat_obstacle_chance must be within [0, 1]");
        }
        if !(self.obstacle_speed_min < self.obstacle_speed_max) {
            return invalid("obstacle speed range must be non-empty");
        }
        if self.boost_tier1_combo == 0 || self.boost_tier1_combo >= self.boost_tier2_combo {
            return invalid("boost thresholds must satisfy 0 < tier1 < tier2");
        }
        if !(self.zone_width > 0.0 && self.obstacle_length > 0.0) {
            return invalid("zone_width and obstacle_length must be positive");
        }
        Ok(())
    }

    /// Number of lanes on the track
    pub fn lane_count(&self) -> usize {
        self.lane_offsets.len()
    }

    /// Player reference point (center of the player body)
    pub fn player_reference(&self) -> f32 {
        self.player_x + self.player_half_length
    }

    pub fn beat_interval_us(&self) -> u64 {
        ms_to_micros(self.beat_interval_ms)
    }

    pub fn round_duration_us(&self) -> u64 {
        ms_to_micros(self.round_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.lane_count(), 3);
        assert!((tuning.player_reference() - 162.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{ "round_duration_ms": 30000, "speed_max": 600.0 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.round_duration_ms, 30_000);
        assert_eq!(tuning.speed_max, 600.0);
        assert_eq!(tuning.beat_interval_ms, BEAT_INTERVAL_MS);
    }

    #[test]
    fn test_rejects_inverted_speed_range() {
        let err = Tuning::from_json(r#"{ "speed_min": 600.0, "speed_max": 100.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_thresholds_and_lanes() {
        let mut tuning = Tuning::default();
        tuning.boost_tier2_combo = tuning.boost_tier1_combo;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.lane_offsets.clear();
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.start_lane = 7;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_overflowing_durations() {
        for field in ["results_delay_ms", "round_duration_ms", "beat_interval_ms", "zone_ttl_ms"] {
            let json = format!(r#"{{ "{field}": 18446744073709552 }}"#);
            let err = Tuning::from_json(&json).unwrap_err();
            assert!(matches!(err, TuningError::Invalid(_)), "{field} accepted");
        }
        let ok = format!(r#"{{ "results_delay_ms": {MAX_MS} }}"#);
        assert!(Tuning::from_json(&ok).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }
}
