//! Presentation boundary
//!
//! The engine never draws. Each frame a sink receives a read-only snapshot,
//! plus the discrete events queued since the previous frame.

use serde::Serialize;

use crate::content::ContentSource;
use crate::score::ScoreRecord;
use crate::sim::{
    ActivePrompt, Feedback, GameEvent, Obstacle, PlayerState, RoundController, RoundState,
    TimingZone,
};

/// Read-only view of one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub state: RoundState,
    pub player: &'a PlayerState,
    pub obstacles: &'a [Obstacle],
    pub zones: &'a [TimingZone],
    pub prompt: Option<&'a ActivePrompt>,
    pub feedback: Option<Feedback>,
    pub beat: u64,
    pub time_left_ms: u64,
    pub in_zone: bool,
    pub boost_active: bool,
    pub speed_mps: f32,
}

/// Receives frames and events from a round
pub trait PresentationSink {
    /// Render the current frame
    fn present_frame(&mut self, snapshot: &Snapshot<'_>);

    /// Show the results screen
    fn present_results(&mut self, record: &ScoreRecord);

    /// Hook for one-shot effects (sounds, flashes)
    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Flush queued events to `sink`, then hand it the current frame.
/// Returns true if results were presented.
pub fn publish<C, S>(round: &mut RoundController<C>, sink: &mut S) -> bool
where
    C: ContentSource,
    S: PresentationSink + ?Sized,
{
    let mut presented = false;
    for event in round.drain_events() {
        sink.on_event(&event);
        if let GameEvent::ResultsReady(record) = &event {
            sink.present_results(record);
            presented = true;
        }
    }
    sink.present_frame(&round.snapshot());
    presented
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PromptDeck;

    #[derive(Default)]
    struct RecordingSink {
        frames: usize,
        events: Vec<GameEvent>,
        results: Vec<ScoreRecord>,
        last_time_left: u64,
    }

    impl PresentationSink for RecordingSink {
        fn present_frame(&mut self, snapshot: &Snapshot<'_>) {
            self.frames += 1;
            self.last_time_left = snapshot.time_left_ms;
        }

        fn present_results(&mut self, record: &ScoreRecord) {
            self.results.push(*record);
        }

        fn on_event(&mut self, event: &GameEvent) {
            self.events.push(event.clone());
        }
    }

    #[test]
    fn test_publish_forwards_events_and_frame() {
        let mut round = RoundController::with_default_tuning(PromptDeck::builtin(3), 3);
        let mut sink = RecordingSink::default();
        round.start().expect("starts");

        assert!(!publish(&mut round, &mut sink));
        assert_eq!(sink.frames, 1);
        assert_eq!(sink.last_time_left, 60_000);
        assert!(matches!(sink.events.first(), Some(GameEvent::RoundStarted { .. })));

        // Drained events are delivered once
        let seen = sink.events.len();
        publish(&mut round, &mut sink);
        assert_eq!(sink.events.len(), seen);
    }

    #[test]
    fn test_publish_presents_results_after_delay() {
        let mut round = RoundController::with_default_tuning(PromptDeck::builtin(3), 3);
        let mut sink = RecordingSink::default();
        round.start().expect("starts");
        let record = round.force_end().expect("ends");

        assert!(!publish(&mut round, &mut sink));
        assert!(sink.results.is_empty());

        let mut presented = false;
        for _ in 0..20 {
            round.tick(0.05);
            presented |= publish(&mut round, &mut sink);
        }
        assert!(presented);
        assert_eq!(sink.results, vec![record]);
    }

    #[test]
    fn test_snapshot_serializes_hud_fields() {
        let mut round = RoundController::with_default_tuning(PromptDeck::builtin(3), 3);
        round.start().expect("starts");
        round.tick(0.05);
        let json = serde_json::to_value(round.snapshot()).expect("serializable");
        assert_eq!(json["state"], "Running");
        assert_eq!(json["time_left_ms"], 59_950);
        assert_eq!(json["obstacles"].as_array().map(Vec::len), Some(3));
        assert!(json["prompt"]["options"].is_array());
        assert_eq!(json["boost_active"], false);
        assert!(json["speed_mps"].as_f64().is_some_and(|v| v > 60.0));
    }
}
