//! Combat Inference - Bayesian estimation of hidden combat stats
//!
//! An observer watches a simulated d20 battle and infers each tracked
//! combatant's attack modifier and armor class from to-hit rolls and their
//! hit/miss outcomes. The simulator module runs the experiment many times and
//! reports how quickly the estimates become certain.

pub mod character;
pub mod combat;
pub mod core;
pub mod error;
pub mod estimator;
pub mod simulator;

pub use character::{Character, Side};
pub use combat::{simulate_battle, BattleOutcome, BattleRules, CombatSimulator, CombatState};
pub use error::{EstimatorError, SimError};
pub use estimator::{AcEstimator, Estimator, HitObservation, ModifierEstimator};
pub use simulator::{run_experiment, ExperimentReport, Matchup, SimConfig};
