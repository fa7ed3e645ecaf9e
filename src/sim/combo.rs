//! Combo / boost state machine
//!
//! Tier 0 -> 1 at the first combo threshold, 1 -> 2 at the second. A miss or
//! a collision drops straight back to tier 0. Entering a tier starts a short
//! "boost active" window; the tier itself outlives that window.

use super::state::{BoostTier, PlayerState};
use crate::tuning::Tuning;

/// Count a successful answer. Returns the tier entered, if any.
pub fn register_success(tuning: &Tuning, player: &mut PlayerState) -> Option<BoostTier> {
    player.combo += 1;

    let next = match player.boost_tier {
        BoostTier::None if player.combo >= tuning.boost_tier1_combo => BoostTier::Tier1,
        BoostTier::Tier1 if player.combo >= tuning.boost_tier2_combo => BoostTier::Tier2,
        _ => return None,
    };

    player.boost_tier = next;
    player.boost_remaining = tuning.boost_active_ms as f32 / 1000.0;
    log::debug!("Boost tier {} at combo {}", next.level(), player.combo);
    Some(next)
}

/// Miss or collision: combo and tier back to zero. Returns true if this cut
/// short an active boost window.
pub fn register_break(player: &mut PlayerState) -> bool {
    if player.combo > 0 || player.boost_tier != BoostTier::None {
        log::debug!("Combo broken at {}", player.combo);
    }
    let cut_short = player.boost_active();
    player.combo = 0;
    player.boost_tier = BoostTier::None;
    player.boost_remaining = 0.0;
    cut_short
}

/// Run down the active window. Returns true on the tick it lapses.
pub fn advance(player: &mut PlayerState, dt: f32) -> bool {
    if player.boost_remaining <= 0.0 {
        return false;
    }
    player.boost_remaining = (player.boost_remaining - dt).max(0.0);
    player.boost_remaining == 0.0
}
