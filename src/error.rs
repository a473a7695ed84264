//! Error types for estimation and simulation.

use thiserror::Error;

/// Errors raised by the Bayesian estimator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("Invalid prior: {0}")]
    InvalidPrior(String),
    #[error("Observation {0} is inconsistent with every remaining hypothesis")]
    DegenerateLikelihood(String),
}

/// Errors raised while setting up or running a battle or an experiment.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid party: {0}")]
    InvalidParty(String),
    #[error(transparent)]
    Estimator(#[from] EstimatorError),
    #[error("Invalid attack: {0}")]
    InvalidAttack(String),
    #[error("{attacker} found no living opponent although one was reported alive")]
    NoLiveOpponent { attacker: String },
    #[error("{character}: {quantity} resolved to {found}, true value is {expected}")]
    GroundTruthMismatch {
        character: String,
        quantity: &'static str,
        expected: i32,
        found: i32,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
