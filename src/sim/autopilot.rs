//! Demo driver
//!
//! Reads the frame snapshot and produces the inputs a reasonable player
//! would: swerve out of lanes with traffic closing in, and tap an answer
//! while the car sits in a green zone. Used for attract mode and the
//! headless binary.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::round::InputEvent;
use super::state::{LaneDirection, RoundState};
use super::track::Track;
use crate::present::Snapshot;
use crate::tuning::Tuning;

/// How far ahead of the collision window traffic counts as a threat (px)
const LOOKAHEAD: f32 = 90.0;

pub struct Autopilot {
    rng: Pcg32,
    /// Chance of picking the correct option (0..=1)
    accuracy: f64,
}

impl Autopilot {
    pub fn new(seed: u64, accuracy: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
        }
    }

    /// Inputs for this frame, in delivery order
    pub fn next_inputs(&mut self, snapshot: &Snapshot<'_>, tuning: &Tuning) -> Vec<InputEvent> {
        let mut inputs = Vec::new();
        if snapshot.state != RoundState::Running {
            return inputs;
        }

        let lane = snapshot.player.lane;
        if lane_threatened(snapshot, tuning, lane) {
            if let Some(direction) = escape_direction(snapshot, tuning, lane) {
                inputs.push(InputEvent::LaneChange(direction));
            }
        }

        // Wait for a zone unless none is on the way
        let zone_ahead = snapshot
            .zones
            .iter()
            .any(|z| z.start > tuning.player_reference());
        if snapshot.in_zone || !zone_ahead {
            if let Some(prompt) = snapshot.prompt.filter(|p| !p.answered) {
                let want_correct = self.rng.random_bool(self.accuracy);
                let pick = prompt
                    .options
                    .iter()
                    .find(|o| o.is_correct == want_correct)
                    .or_else(|| prompt.options.first());
                if let Some(option) = pick {
                    inputs.push(InputEvent::AnswerSelected(option.id));
                }
            }
        }

        inputs
    }
}

/// Whether traffic in `lane` is inside or about to enter the collision window
fn lane_threatened(snapshot: &Snapshot<'_>, tuning: &Tuning, lane: usize) -> bool {
    let reference = tuning.player_reference();
    let lo = reference - tuning.collision_window_behind - tuning.obstacle_length;
    let hi = reference + tuning.collision_window_ahead + LOOKAHEAD;
    snapshot
        .obstacles
        .iter()
        .any(|o| Track::same_lane(tuning, o.lane, lane) && o.x >= lo && o.x <= hi)
}

/// First neighbouring lane that is clear
fn escape_direction(
    snapshot: &Snapshot<'_>,
    tuning: &Tuning,
    lane: usize,
) -> Option<LaneDirection> {
    [LaneDirection::Up, LaneDirection::Down]
        .into_iter()
        .find(|direction| {
            let target = lane as i32 + direction.delta();
            target >= 0
                && (target as usize) < tuning.lane_count()
                && !lane_threatened(snapshot, tuning, target as usize)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PromptDeck;
    use crate::sim::RoundController;
    use crate::sim::state::GameEvent;

    #[test]
    fn test_idle_round_gets_no_input() {
        let round = RoundController::with_default_tuning(PromptDeck::builtin(1), 1);
        let mut pilot = Autopilot::new(1, 1.0);
        assert!(pilot.next_inputs(&round.snapshot(), round.tuning()).is_empty());
    }

    #[test]
    fn test_waits_for_zone_before_answering() {
        let mut round = RoundController::with_default_tuning(PromptDeck::builtin(1), 1);
        round.start().expect("starts");
        let mut pilot = Autopilot::new(1, 1.0);
        // Opening zone is still ahead of the car
        let inputs = pilot.next_inputs(&round.snapshot(), round.tuning());
        assert!(!inputs.iter().any(|i| matches!(i, InputEvent::AnswerSelected(_))));
    }

    #[test]
    fn test_full_round_scores_perfects() {
        let mut round = RoundController::with_default_tuning(PromptDeck::builtin(11), 11);
        round.start().expect("starts");
        let mut pilot = Autopilot::new(11, 1.0);
        let mut collisions = 0;
        let mut spawned = 0;

        for _ in 0..3600 {
            let inputs = pilot.next_inputs(&round.snapshot(), round.tuning());
            for input in inputs {
                round.handle_input(input);
            }
            round.tick(1.0 / 60.0);
            for event in round.drain_events() {
                match event {
                    GameEvent::Collision { .. } => collisions += 1,
                    GameEvent::ObstacleSpawned { .. } => spawned += 1,
                    _ => {}
                }
            }
        }
        for _ in 0..120 {
            round.tick(1.0 / 60.0);
        }

        assert_eq!(round.state(), RoundState::Ended);
        let record = round.record().expect("record after end");
        assert!(round.score().overall.attempts > 0);
        assert!(record.beat_sync_accuracy > 0);
        assert!(record.distance_m > 0);
        assert!(collisions < spawned, "{collisions} of {spawned} cars hit");
    }
}
