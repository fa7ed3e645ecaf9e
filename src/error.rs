//! Error types
//!
//! Nothing in here is fatal to a running round. Lifecycle misuse is rejected
//! with state left unchanged; tuning errors only occur before a round exists.

use thiserror::Error;

use crate::sim::RoundState;

/// Errors returned by the round controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A lifecycle operation was called out of order
    #[error("cannot {op} while round is {state:?}")]
    InvalidTransition {
        op: &'static str,
        state: RoundState,
    },
}

/// Errors produced while loading or validating tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}
