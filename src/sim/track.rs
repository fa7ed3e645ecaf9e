//! Track model
//!
//! Owns lane geometry and the obstacle / green zone populations, and
//! integrates the player's distance. The player sits at a fixed x; the world
//! scrolls past at the player's speed.

use serde::{Deserialize, Serialize};

use super::state::{Obstacle, PlayerState, TimingZone};
use crate::tuning::Tuning;

/// Entities removed by one advance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Despawned {
    pub obstacles: Vec<u32>,
    pub zones: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Live traffic, sorted by id
    pub obstacles: Vec<Obstacle>,
    /// Live green zones, sorted by id
    pub zones: Vec<TimingZone>,
    /// Next entity ID
    next_id: u32,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            zones: Vec::new(),
            next_id: 1,
        }
    }

    /// Drop all entities. Identities keep counting up so none is reused.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.zones.clear();
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Lane offset, or `None` for an unknown lane
    pub fn lane_offset(tuning: &Tuning, lane: usize) -> Option<f32> {
        tuning.lane_offsets.get(lane).copied()
    }

    /// Whether two lane indices resolve to the same physical lane
    pub fn same_lane(tuning: &Tuning, a: usize, b: usize) -> bool {
        match (Self::lane_offset(tuning, a), Self::lane_offset(tuning, b)) {
            (Some(ya), Some(yb)) => (ya - yb).abs() < tuning.lane_epsilon,
            _ => false,
        }
    }

    /// Move one lane in `delta` direction, clamped to the road. Returns true if the lane changed.
    pub fn shift_lane(tuning: &Tuning, player: &mut PlayerState, delta: i32) -> bool {
        let max_lane = tuning.lane_count().saturating_sub(1) as i64;
        let next = (player.lane as i64 + delta as i64).clamp(0, max_lane) as usize;
        if next == player.lane {
            return false;
        }
        player.lane = next;
        true
    }

    /// Spawn an obstacle at the far edge of the track
    pub fn spawn_obstacle(&mut self, tuning: &Tuning, lane: usize, speed: f32) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            lane: lane.min(tuning.lane_count().saturating_sub(1)),
            x: tuning.track_width + tuning.obstacle_spawn_margin,
            speed,
        });
        id
    }

    /// Spawn a green zone at the far edge of the track
    pub fn spawn_zone(&mut self, tuning: &Tuning, now_us: u64) -> u32 {
        let id = self.next_entity_id();
        self.zones.push(TimingZone {
            id,
            start: tuning.track_width + tuning.zone_spawn_margin,
            width: tuning.zone_width,
            created_at_us: now_us,
            ttl_us: tuning.zone_ttl_ms.map(crate::ms_to_micros),
        });
        id
    }

    /// Scroll the world by `dt` seconds and integrate distance
    ///
    /// Obstacles move by their speed relative to the player, zones by the
    /// player's full speed. `dt` must already be clamped by the clock.
    pub fn advance(
        &mut self,
        tuning: &Tuning,
        player: &mut PlayerState,
        dt: f32,
        now_us: u64,
    ) -> Despawned {
        let player_speed = player.speed;
        let mut despawned = Despawned::default();

        for obstacle in &mut self.obstacles {
            let relative = player_speed - obstacle.speed;
            obstacle.x -= relative * dt;
        }
        let behind = tuning.obstacle_despawn_behind;
        let ahead = tuning.track_width + tuning.obstacle_despawn_ahead;
        self.obstacles.retain(|o| {
            let keep = o.x > behind && o.x < ahead;
            if !keep {
                despawned.obstacles.push(o.id);
            }
            keep
        });

        for zone in &mut self.zones {
            zone.start -= player_speed * dt;
        }
        let reference = tuning.player_reference();
        let tolerance = tuning.zone_tolerance;
        self.zones.retain(|z| {
            let passed = z.end() + tolerance < reference;
            let keep = !passed && !z.expired(now_us);
            if !keep {
                despawned.zones.push(z.id);
            }
            keep
        });

        player.distance += player_speed * dt / tuning.px_per_meter;

        despawned
    }

    /// Apply the beat's multiplicative speed decay
    pub fn decay_speed(tuning: &Tuning, player: &mut PlayerState) {
        player.speed =
            (player.speed * tuning.beat_speed_decay).clamp(tuning.speed_min, tuning.speed_max);
    }
}
