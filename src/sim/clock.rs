//! Round clock
//!
//! One monotonic time source, two cadences: the variable frame tick and the
//! fixed beat pulse. Time is kept in whole microseconds so a round of length D
//! ends at exactly D no matter how the frames were sliced.

use serde::{Deserialize, Serialize};

use crate::secs_to_micros;

/// What one clock advance produced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClockStep {
    /// Simulation seconds to integrate this tick (clamped, truncated at round end)
    pub dt: f32,
    /// Beat pulses that fell due during this tick
    pub beats: u32,
    /// Round duration reached on this tick
    pub expired: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    elapsed_us: u64,
    beat_acc_us: u64,
    beat_interval_us: u64,
    duration_us: u64,
    max_step_us: u64,
    running: bool,
}

impl Clock {
    pub fn new(beat_interval_us: u64, duration_us: u64, max_dt: f32) -> Self {
        Self {
            elapsed_us: 0,
            beat_acc_us: 0,
            beat_interval_us: beat_interval_us.max(1),
            duration_us,
            max_step_us: secs_to_micros(max_dt),
            running: false,
        }
    }

    /// Reset to zero and subscribe both cadences
    pub fn start(&mut self) {
        self.elapsed_us = 0;
        self.beat_acc_us = 0;
        self.running = true;
    }

    /// Unsubscribe both cadences; later advances produce nothing
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }

    pub fn remaining_us(&self) -> u64 {
        self.duration_us.saturating_sub(self.elapsed_us)
    }

    /// Advance by a frame delta (seconds). Returns `None` once stopped.
    pub fn advance(&mut self, dt: f32) -> Option<ClockStep> {
        if !self.running {
            return None;
        }

        let step_us = secs_to_micros(dt)
            .min(self.max_step_us)
            .min(self.remaining_us());
        self.elapsed_us += step_us;
        self.beat_acc_us += step_us;

        let mut beats = 0;
        while self.beat_acc_us >= self.beat_interval_us {
            self.beat_acc_us -= self.beat_interval_us;
            beats += 1;
        }

        Some(ClockStep {
            dt: step_us as f32 / 1_000_000.0,
            beats,
            expired: self.elapsed_us >= self.duration_us,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> Clock {
        let mut clock = Clock::new(1_200_000, 60_000_000, 0.05);
        clock.start();
        clock
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut clock = clock();
        let step = clock.advance(3.0).expect("running");
        assert!((step.dt - 0.05).abs() < 1e-6);
        assert_eq!(clock.elapsed_us(), 50_000);
    }

    #[test]
    fn test_beats_fire_on_interval() {
        let mut clock = clock();
        let mut beats = 0;
        // 1.2 s in 24 ticks of 50 ms
        for i in 0..24 {
            let step = clock.advance(0.05).expect("running");
            beats += step.beats;
            if i < 23 {
                assert_eq!(beats, 0);
            }
        }
        assert_eq!(beats, 1);
    }

    #[test]
    fn test_expires_exactly_at_duration() {
        let mut clock = Clock::new(1_200_000, 1_000_000, 0.05);
        clock.start();
        let mut expired_at = None;
        for i in 0..100 {
            let step = clock.advance(0.03).expect("running");
            if step.expired {
                expired_at = Some(i);
                break;
            }
        }
        // 33 ticks of 30 ms = 990 ms, the 34th is truncated to 10 ms
        assert_eq!(expired_at, Some(33));
        assert_eq!(clock.elapsed_us(), 1_000_000);
    }

    #[test]
    fn test_stopped_clock_produces_nothing() {
        let mut clock = clock();
        clock.stop();
        assert!(clock.advance(0.016).is_none());
        assert_eq!(clock.elapsed_us(), 0);
    }

    #[test]
    fn test_negative_dt_is_zero() {
        let mut clock = clock();
        let step = clock.advance(-0.5).expect("running");
        assert_eq!(step.dt, 0.0);
        assert_eq!(clock.elapsed_us(), 0);
    }
}
