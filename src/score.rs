//! Round scoring
//!
//! Counters accumulate during the round; the record is computed once when
//! the round ends and never changes afterwards.

use serde::{Deserialize, Serialize};

use crate::content::PromptCategory;
use crate::percent;
use crate::sim::Outcome;

/// Attempt/correct tally for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub attempts: u32,
    pub correct: u32,
}

impl Tally {
    fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }

    pub fn accuracy(&self) -> u8 {
        percent(self.correct, self.attempts)
    }
}

/// Running score for the current round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreAccumulator {
    pub overall: Tally,
    pub perfect_hits: u32,
    pub rhyme: Tally,
    pub creativity: Tally,
    pub best_combo: u32,
    /// Sum of tap latencies (ms) over all attempts
    pub latency_total_ms: u64,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one answered prompt
    pub fn record_answer(
        &mut self,
        outcome: Outcome,
        category: Option<PromptCategory>,
        latency_ms: u64,
    ) {
        let correct = outcome.is_success();
        self.overall.record(correct);
        if outcome == Outcome::Perfect {
            self.perfect_hits += 1;
        }
        match category {
            Some(PromptCategory::Rhyme) => self.rhyme.record(correct),
            Some(PromptCategory::Creativity) => self.creativity.record(correct),
            None => {}
        }
        self.latency_total_ms = self.latency_total_ms.saturating_add(latency_ms);
    }

    /// Note the current combo; only ever raises the best
    pub fn observe_combo(&mut self, combo: u32) {
        self.best_combo = self.best_combo.max(combo);
    }

    /// Compute the immutable end-of-round record
    pub fn finalize(&self, distance_m: f32) -> ScoreRecord {
        let mean_latency = if self.overall.attempts == 0 {
            0
        } else {
            (self.latency_total_ms / self.overall.attempts as u64) as u32
        };
        ScoreRecord {
            rhyme_accuracy_score: self.rhyme.accuracy(),
            beat_sync_accuracy: percent(self.perfect_hits, self.overall.attempts),
            creativity_score: self.creativity.accuracy(),
            best_combo: self.best_combo,
            distance_m: distance_m.max(0.0).round() as u32,
            mean_answer_latency_ms: mean_latency,
        }
    }
}

/// Final round result handed to the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Correct rhyme-tagged answers over rhyme-tagged attempts (0-100)
    pub rhyme_accuracy_score: u8,
    /// Perfect hits over all attempts (0-100)
    pub beat_sync_accuracy: u8,
    /// Correct creativity-tagged answers over creativity-tagged attempts (0-100)
    pub creativity_score: u8,
    #[serde(rename = "bestCombo")]
    pub best_combo: u32,
    #[serde(default)]
    pub distance_m: u32,
    #[serde(default)]
    pub mean_answer_latency_ms: u32,
}

impl ScoreRecord {
    /// Mean of the three percentages
    pub fn overall_score(&self) -> u8 {
        let sum = self.rhyme_accuracy_score as u32
            + self.beat_sync_accuracy as u32
            + self.creativity_score as u32;
        (sum as f64 / 3.0).round() as u8
    }
}

/// Coarse rating for a percentage score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    NeedsPractice,
}

impl Grade {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => Grade::Excellent,
            60..=79 => Grade::Good,
            _ => Grade::NeedsPractice,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent!",
            Grade::Good => "Good job!",
            Grade::NeedsPractice => "Keep practicing!",
        }
    }

    /// Beat sync gets its own wording
    pub fn beat_sync_message(&self) -> &'static str {
        match self {
            Grade::Excellent => "Perfect timing!",
            Grade::Good => "Good rhythm!",
            Grade::NeedsPractice => "Work on timing!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_round_is_all_zero() {
        let record = ScoreAccumulator::new().finalize(0.0);
        assert_eq!(record.rhyme_accuracy_score, 0);
        assert_eq!(record.beat_sync_accuracy, 0);
        assert_eq!(record.creativity_score, 0);
        assert_eq!(record.best_combo, 0);
        assert_eq!(record.mean_answer_latency_ms, 0);
        assert_eq!(record.overall_score(), 0);
    }

    #[test]
    fn test_category_accuracy_uses_tagged_prompts_only() {
        let mut score = ScoreAccumulator::new();
        // 8 perfect: 4 rhyme, 2 creativity, 2 untagged
        for category in [
            Some(PromptCategory::Rhyme),
            Some(PromptCategory::Rhyme),
            Some(PromptCategory::Rhyme),
            Some(PromptCategory::Rhyme),
            Some(PromptCategory::Creativity),
            Some(PromptCategory::Creativity),
            None,
            None,
        ] {
            score.record_answer(Outcome::Perfect, category, 500);
        }
        // 2 misses: one rhyme, one creativity
        score.record_answer(Outcome::Miss, Some(PromptCategory::Rhyme), 500);
        score.record_answer(Outcome::Miss, Some(PromptCategory::Creativity), 500);

        let record = score.finalize(123.4);
        assert_eq!(record.beat_sync_accuracy, 80);
        assert_eq!(record.rhyme_accuracy_score, 80);
        assert_eq!(record.creativity_score, 67);
        assert_eq!(record.distance_m, 123);
        assert_eq!(record.mean_answer_latency_ms, 500);
    }

    #[test]
    fn test_good_counts_for_category_not_beat_sync() {
        let mut score = ScoreAccumulator::new();
        score.record_answer(Outcome::Good, Some(PromptCategory::Rhyme), 0);
        let record = score.finalize(0.0);
        assert_eq!(record.rhyme_accuracy_score, 100);
        assert_eq!(record.beat_sync_accuracy, 0);
        assert_eq!(score.overall.correct, 1);
    }

    #[test]
    fn test_best_combo_only_rises() {
        let mut score = ScoreAccumulator::new();
        score.observe_combo(4);
        score.observe_combo(2);
        assert_eq!(score.best_combo, 4);
    }

    #[test]
    fn test_record_wire_names() {
        let record = ScoreRecord {
            best_combo: 7,
            ..Default::default()
        };
        let json = serde_json::to_value(record).expect("serializable");
        assert_eq!(json["bestCombo"], 7);
        assert_eq!(json["rhyme_accuracy_score"], 0);
        assert_eq!(json["beat_sync_accuracy"], 0);
        assert_eq!(json["creativity_score"], 0);
    }

    #[test]
    fn test_grades() {
        assert_eq!(Grade::for_score(80), Grade::Excellent);
        assert_eq!(Grade::for_score(79), Grade::Good);
        assert_eq!(Grade::for_score(60), Grade::Good);
        assert_eq!(Grade::for_score(59), Grade::NeedsPractice);
        assert_eq!(Grade::for_score(100).beat_sync_message(), "Perfect timing!");
        assert_eq!(Grade::for_score(10).message(), "Keep practicing!");
    }

    #[test]
    fn test_overall_score() {
        let record = ScoreRecord {
            rhyme_accuracy_score: 80,
            beat_sync_accuracy: 70,
            creativity_score: 61,
            ..Default::default()
        };
        assert_eq!(record.overall_score(), 70);
    }
}
