//! Monte Carlo harness for estimator convergence.
//!
//! Runs thousands of seeded battles and measures how many observations the
//! tracked character's estimators need before they collapse to one value:
//! - attack modifier rounds-to-certainty
//! - armor class rounds-to-certainty
//! - battle outcomes and lengths
//!
//! Every battle goes through `CombatSimulator` (src/combat/logic.rs), so the
//! harness measures exactly what a single simulated fight would produce.

mod config;
mod matchup;
mod report;
mod runner;
mod stats;

pub use config::SimConfig;
pub use matchup::Matchup;
pub use report::{ExperimentReport, OutcomeTally};
pub use runner::{rounds_to_certainty, run_experiment, run_trial, TrialResult};
pub use stats::{histogram, HistogramBin, Summary};
