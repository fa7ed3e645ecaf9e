//! Rhyme prompt content
//!
//! The engine only ever asks for "a random prompt". Where prompts come from is
//! the caller's business; `PromptDeck` is the built-in in-memory source.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scoring category a prompt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptCategory {
    /// Pick the word that rhymes
    Rhyme,
    /// Pick the most inventive continuation
    Creativity,
}

/// An immutable prompt record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Lyric line shown to the player
    pub text: String,
    /// Candidate words, in display order
    pub options: Vec<String>,
    /// The correct word (one of `options`)
    pub correct: String,
    /// Category used for per-category accuracy
    #[serde(default)]
    pub category: Option<PromptCategory>,
}

impl Prompt {
    pub fn new(
        text: impl Into<String>,
        options: &[&str],
        correct: impl Into<String>,
        category: Option<PromptCategory>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct: correct.into(),
            category,
        }
    }

    /// Whether the option at `index` is the correct word
    pub fn is_correct(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|word| *word == self.correct)
    }
}

/// Content source failures. Both are recovered by skipping a prompt cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("content source has no prompts")]
    Empty,
    #[error("content unavailable: {0}")]
    Unavailable(String),
}

/// Supplies prompts on request
///
/// Must be callable at any time and must not touch engine state. A source that
/// cannot answer right now (e.g. a remote fetch still in flight) returns
/// `ContentError::Unavailable`; the round carries on without a prompt.
pub trait ContentSource {
    fn random_prompt(&mut self) -> Result<Prompt, ContentError>;
}

impl<F> ContentSource for F
where
    F: FnMut() -> Result<Prompt, ContentError>,
{
    fn random_prompt(&mut self) -> Result<Prompt, ContentError> {
        self()
    }
}

/// In-memory prompt deck with a seeded picker
#[derive(Debug, Clone)]
pub struct PromptDeck {
    prompts: Vec<Prompt>,
    rng: Pcg32,
}

impl PromptDeck {
    pub fn new(prompts: Vec<Prompt>, seed: u64) -> Self {
        Self {
            prompts,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// The built-in lyric deck
    pub fn builtin(seed: u64) -> Self {
        Self::new(builtin_prompts(), seed)
    }

    /// Parse a deck from a JSON array of prompts
    pub fn from_json(json: &str, seed: u64) -> Result<Self, serde_json::Error> {
        let prompts: Vec<Prompt> = serde_json::from_str(json)?;
        Ok(Self::new(prompts, seed))
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl ContentSource for PromptDeck {
    fn random_prompt(&mut self) -> Result<Prompt, ContentError> {
        if self.prompts.is_empty() {
            return Err(ContentError::Empty);
        }
        let index = self.rng.random_range(0..self.prompts.len());
        Ok(self.prompts[index].clone())
    }
}

fn builtin_prompts() -> Vec<Prompt> {
    use PromptCategory::{Creativity, Rhyme};

    vec![
        Prompt::new(
            "I'm cruising down the street, feeling the ___",
            &["beat", "car", "road", "light"],
            "beat",
            Some(Rhyme),
        ),
        Prompt::new(
            "The night is young, the stars are ___",
            &["bright", "dim", "cold", "gone"],
            "bright",
            Some(Rhyme),
        ),
        Prompt::new(
            "Hands on the wheel, I know the ___",
            &["deal", "way", "time", "song"],
            "deal",
            Some(Rhyme),
        ),
        Prompt::new(
            "Neon in the rain, racing through the ___",
            &["lane", "town", "dark", "park"],
            "lane",
            Some(Rhyme),
        ),
        Prompt::new(
            "Bass is dropping low, let the engine ___",
            &["glow", "stop", "turn", "sleep"],
            "glow",
            Some(Rhyme),
        ),
        Prompt::new(
            "Paint the skyline with a ___",
            &["comet trail", "grey wall", "parking lot", "traffic jam"],
            "comet trail",
            Some(Creativity),
        ),
        Prompt::new(
            "My rhymes hit harder than a ___",
            &["thunder drum", "soft pillow", "paper cup", "slow walk"],
            "thunder drum",
            Some(Creativity),
        ),
        Prompt::new(
            "Tonight the city hums a ___",
            &["silver tune", "quiet nap", "tax form", "bus stop"],
            "silver tune",
            Some(Creativity),
        ),
        Prompt::new(
            "Feel the rhythm in your ___",
            &["soul", "shoe", "desk", "mail"],
            "soul",
            None,
        ),
    ]
}
