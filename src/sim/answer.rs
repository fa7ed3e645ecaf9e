//! Answer evaluation
//!
//! Classifies a tap and applies its speed change and score counters. Combo
//! bookkeeping follows in `combo`.

use super::state::{Outcome, PlayerState};
use crate::content::PromptCategory;
use crate::score::ScoreAccumulator;
use crate::tuning::Tuning;

/// Perfect iff correct and in a zone, Good iff correct outside one, Miss otherwise
pub fn evaluate(is_correct: bool, zone_occupied: bool) -> Outcome {
    match (is_correct, zone_occupied) {
        (true, true) => Outcome::Perfect,
        (true, false) => Outcome::Good,
        (false, _) => Outcome::Miss,
    }
}

/// Signed speed change for an outcome
pub fn speed_delta(outcome: Outcome, tuning: &Tuning) -> f32 {
    match outcome {
        Outcome::Perfect => tuning.speed_perfect_inc,
        Outcome::Good => tuning.speed_good_inc,
        Outcome::Miss => -tuning.speed_miss_dec,
    }
}

/// Apply an outcome's speed change and record the attempt
pub fn apply(
    outcome: Outcome,
    category: Option<PromptCategory>,
    latency_ms: u64,
    tuning: &Tuning,
    player: &mut PlayerState,
    score: &mut ScoreAccumulator,
) {
    player.change_speed(speed_delta(outcome, tuning), tuning);
    score.record_answer(outcome, category, latency_ms);
    log::debug!(
        "Answer {:?} (category {:?}) -> speed {:.1}",
        outcome,
        category,
        player.speed
    );
}
