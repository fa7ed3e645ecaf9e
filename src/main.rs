//! Rhyme Racer headless runner
//!
//! Plays one round with the autopilot at a fixed step and prints the final
//! score record as JSON.

use std::env;

use rhyme_racer::present::{PresentationSink, Snapshot, publish};
use rhyme_racer::sim::{Autopilot, GameEvent, RoundController};
use rhyme_racer::{Grade, PromptDeck, ScoreRecord, Tuning};

/// Autopilot answer accuracy
const DEMO_ACCURACY: f64 = 0.85;

fn tuning() -> Result<Tuning, rhyme_racer::TuningError> {
    match env::var("RHYME_RACER_TUNING") {
        Ok(path) => Tuning::load(path),
        Err(_) => Ok(Tuning::default()),
    }
}

fn seed() -> u64 {
    env::var("RHYME_RACER_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0x5EED_CAFE)
}

fn tick_hz() -> u32 {
    env::var("RHYME_RACER_TICK_HZ")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&hz: &u32| hz > 0)
        .unwrap_or(60)
}

/// Logs frames sparsely and keeps the results
#[derive(Default)]
struct LogSink {
    frames: u64,
    results: Option<ScoreRecord>,
}

impl PresentationSink for LogSink {
    fn present_frame(&mut self, snapshot: &Snapshot<'_>) {
        self.frames += 1;
        if self.frames.is_multiple_of(600) {
            log::info!(
                "t-{:>5} ms | lane {} | {:.0} m/s | {:.0} m | combo {}",
                snapshot.time_left_ms,
                snapshot.player.lane,
                snapshot.speed_mps,
                snapshot.player.distance,
                snapshot.player.combo
            );
        }
    }

    fn present_results(&mut self, record: &ScoreRecord) {
        self.results = Some(*record);
    }

    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::BoostActivated { tier } => log::info!("Boost tier {}", tier.level()),
            GameEvent::Collision { obstacle_id } => log::debug!("Bumped car {obstacle_id}"),
            _ => {}
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let tuning = tuning()?;
    let seed = seed();
    let hz = tick_hz();
    let dt = 1.0 / hz as f32;

    let mut round = RoundController::new(tuning, PromptDeck::builtin(seed), seed)?;
    let mut pilot = Autopilot::new(seed, DEMO_ACCURACY);
    let mut sink = LogSink::default();

    round.start()?;
    log::info!("Running headless round at {hz} Hz (seed {seed})");

    // Round length plus the results delay, with slack
    let budget = (round.tuning().round_duration_ms + round.tuning().results_delay_ms) / 1000 + 5;
    let max_frames = budget * hz as u64;

    for _ in 0..max_frames {
        for input in pilot.next_inputs(&round.snapshot(), round.tuning()) {
            round.handle_input(input);
        }
        round.tick(dt);
        if publish(&mut round, &mut sink) {
            break;
        }
    }

    let record = sink
        .results
        .or_else(|| round.record())
        .ok_or("round did not finish")?;

    let overall = record.overall_score();
    log::info!(
        "Overall {} ({}), beat sync: {}",
        overall,
        Grade::for_score(overall).message(),
        Grade::for_score(record.beat_sync_accuracy).beat_sync_message()
    );
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Rhyme Racer (headless) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
