//! Beat-driven spawner
//!
//! Decides, per beat, what to create. The decision depends only on the beat
//! index and the seeded RNG; placing the entities is the track's job.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// One obstacle to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpawn {
    pub lane: usize,
    pub speed: f32,
}

/// Everything a beat asks for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnPlan {
    pub zone: bool,
    pub new_prompt: bool,
    pub obstacles: Vec<ObstacleSpawn>,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Draws to skip past the seeded start
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        rng.advance(self.stream);
        rng
    }
}

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
}

impl Spawner {
    pub fn new(rng_state: &RngState) -> Self {
        Self {
            rng: rng_state.to_rng(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(&RngState::new(seed))
    }

    /// Plan for beat `beat_index` (1-based; the first pulse after start is beat 1)
    pub fn on_beat(&mut self, tuning: &Tuning, beat_index: u64) -> SpawnPlan {
        let mut plan = SpawnPlan::default();

        if beat_index > 0 && beat_index.is_multiple_of(tuning.zone_every_beats) {
            plan.zone = true;
            plan.new_prompt = true;
            for _ in 0..tuning.obstacles_per_zone_beat {
                plan.obstacles.push(self.random_obstacle(tuning));
            }
        } else if self.rng.random_bool(tuning.offbeat_obstacle_chance) {
            plan.obstacles.push(self.random_obstacle(tuning));
        }

        plan
    }

    /// Opening traffic for a fresh round
    pub fn initial_obstacles(&mut self, tuning: &Tuning) -> Vec<ObstacleSpawn> {
        (0..tuning.initial_obstacles)
            .map(|_| self.random_obstacle(tuning))
            .collect()
    }

    fn random_obstacle(&mut self, tuning: &Tuning) -> ObstacleSpawn {
        let lane = self.rng.random_range(0..tuning.lane_count().max(1));
        let speed = self
            .rng
            .random_range(tuning.obstacle_speed_min..tuning.obstacle_speed_max);
        ObstacleSpawn { lane, speed }
    }
}
