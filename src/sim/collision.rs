//! Collision and green zone detection
//!
//! Positions are read after the track has advanced on the same tick. An
//! obstacle can bump the player once in its lifetime, and no two bumps are
//! recorded within the cooldown window.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::state::{Obstacle, TimingZone};
use super::track::Track;
use crate::ms_to_micros;
use crate::tuning::Tuning;

/// A recorded bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub obstacle_id: u32,
}

/// Fixed window on the track the player's car occupies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerWindow {
    pub behind: f32,
    pub ahead: f32,
}

impl PlayerWindow {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        let reference = tuning.player_reference();
        Self {
            behind: reference - tuning.collision_window_behind,
            ahead: reference + tuning.collision_window_ahead,
        }
    }

    /// Whether a span `[lo, hi]` overlaps the window
    pub fn overlaps(&self, lo: f32, hi: f32) -> bool {
        lo <= self.ahead && hi >= self.behind
    }
}

/// Tracks which obstacles already hit and when the last hit was
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionDetector {
    collided: BTreeSet<u32>,
    last_collision_us: Option<u64>,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.collided.clear();
        self.last_collision_us = None;
    }

    /// Drop markers for obstacles that left the track
    pub fn forget(&mut self, ids: &[u32]) {
        for id in ids {
            self.collided.remove(id);
        }
    }

    /// Report new collisions between the player and `obstacles`
    pub fn detect(
        &mut self,
        tuning: &Tuning,
        player_lane: usize,
        obstacles: &[Obstacle],
        now_us: u64,
    ) -> Vec<CollisionEvent> {
        let window = PlayerWindow::from_tuning(tuning);
        let cooldown_us = ms_to_micros(tuning.collision_cooldown_ms);
        let mut events = Vec::new();

        for obstacle in obstacles {
            if self.collided.contains(&obstacle.id) {
                continue;
            }
            if !Track::same_lane(tuning, obstacle.lane, player_lane) {
                continue;
            }
            let (lo, hi) = obstacle.span(tuning.obstacle_length);
            if !window.overlaps(lo, hi) {
                continue;
            }
            let cooling = self
                .last_collision_us
                .is_some_and(|last| now_us.saturating_sub(last) < cooldown_us);
            if cooling {
                continue;
            }

            self.collided.insert(obstacle.id);
            self.last_collision_us = Some(now_us);
            log::debug!("Collision with obstacle {} in lane {}", obstacle.id, obstacle.lane);
            events.push(CollisionEvent {
                obstacle_id: obstacle.id,
            });
        }

        events
    }
}

/// Whether `point` lies inside any live zone (union of all zones, inclusive, with tolerance)
pub fn is_in_zone(point: f32, zones: &[TimingZone], tolerance: f32) -> bool {
    zones.iter().any(|z| z.contains(point, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle(id: u32, lane: usize, x: f32) -> Obstacle {
        Obstacle {
            id,
            lane,
            x,
            speed: 200.0,
        }
    }

    fn zone(id: u32, start: f32) -> TimingZone {
        TimingZone {
            id,
            start,
            width: 70.0,
            created_at_us: 0,
            ttl_us: None,
        }
    }

    #[test]
    fn test_same_lane_overlap_collides() {
        let tuning = Tuning::default();
        let mut detector = CollisionDetector::new();
        let reference = tuning.player_reference();
        let hits = detector.detect(&tuning, 1, &[obstacle(1, 1, reference - 10.0)], 0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].obstacle_id, 1);
        assert!(detector.collided.contains(&1));
    }

    #[test]
    fn test_other_lane_or_far_away_misses() {
        let tuning = Tuning::default();
        let mut detector = CollisionDetector::new();
        let reference = tuning.player_reference();
        let obstacles = [
            obstacle(1, 0, reference),
            obstacle(2, 1, reference + 100.0),
            obstacle(3, 1, reference - 100.0),
        ];
        assert!(detector.detect(&tuning, 1, &obstacles, 0).is_empty());
    }

    #[test]
    fn test_edges_touching_window_count() {
        let tuning = Tuning::default();
        let window = PlayerWindow::from_tuning(&tuning);
        let mut detector = CollisionDetector::new();
        // Leading edge exactly on the back of the window
        let x = window.behind - tuning.obstacle_length;
        assert_eq!(detector.detect(&tuning, 1, &[obstacle(1, 1, x)], 0).len(), 1);
        // Trailing edge exactly on the front of the window
        let mut detector = CollisionDetector::new();
        assert_eq!(detector.detect(&tuning, 1, &[obstacle(2, 1, window.ahead)], 0).len(), 1);
    }

    #[test]
    fn test_one_collision_per_obstacle_across_ticks() {
        let tuning = Tuning::default();
        let mut detector = CollisionDetector::new();
        let reference = tuning.player_reference();
        let mut total = 0;
        for tick in 0..20u64 {
            let o = obstacle(5, 1, reference - 20.0 + tick as f32);
            total += detector.detect(&tuning, 1, &[o], tick * 16_000).len();
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn test_cooldown_blocks_second_obstacle() {
        let tuning = Tuning::default();
        let mut detector = CollisionDetector::new();
        let reference = tuning.player_reference();
        let pair = [obstacle(1, 1, reference - 10.0), obstacle(2, 1, reference - 5.0)];

        let hits = detector.detect(&tuning, 1, &pair, 0);
        assert_eq!(hits.len(), 1);
        // Still inside the 350 ms cooldown
        assert!(detector.detect(&tuning, 1, &pair, 200_000).is_empty());
        // Cooldown over: the second car may now bump
        let hits = detector.detect(&tuning, 1, &pair, 400_000);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].obstacle_id, 2);
    }

    #[test]
    fn test_forget_and_reset() {
        let tuning = Tuning::default();
        let mut detector = CollisionDetector::new();
        let parked = [obstacle(1, 1, tuning.player_reference())];
        assert_eq!(detector.detect(&tuning, 1, &parked, 0).len(), 1);
        assert!(detector.detect(&tuning, 1, &parked, 1_000_000).is_empty());

        // A forgotten id may bump again once the cooldown is over
        detector.forget(&[1]);
        assert_eq!(detector.detect(&tuning, 1, &parked, 2_000_000).len(), 1);

        detector.reset();
        assert!(detector.collided.is_empty());
        assert!(detector.last_collision_us.is_none());
    }

    #[test]
    fn test_is_in_zone_union() {
        let zones = [zone(1, 100.0), zone(2, 150.0)];
        assert!(is_in_zone(120.0, &zones, 0.0));
        assert!(is_in_zone(200.0, &zones, 0.0));
        assert!(is_in_zone(220.0, &zones, 0.0));
        assert!(!is_in_zone(221.0, &zones, 0.0));
        assert!(is_in_zone(221.0, &zones, 2.0));
        assert!(!is_in_zone(50.0, &zones, 2.0));
        assert!(!is_in_zone(120.0, &[], 2.0));
    }
}
