//! Bayesian estimation of hidden combat stats.

pub mod engine;
pub mod models;

pub use engine::*;
pub use models::*;
