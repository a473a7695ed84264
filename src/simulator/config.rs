//! Simulation configuration.

use super::matchup::Matchup;
use crate::character::Side;
use crate::combat::BattleRules;
use crate::core::constants::{
    DEFAULT_MAX_ROUNDS, DEFAULT_TRIALS, HISTOGRAM_BIN_WIDTH, HISTOGRAM_UPPER_EDGE,
};

/// Configuration for an experiment run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of independent battles to simulate
    pub num_trials: u32,

    /// Base random seed; trial `i` uses `seed + i` (None = draw one from entropy)
    pub seed: Option<u64>,

    /// Maximum rounds per battle before it is called off
    pub max_rounds: u32,

    /// Party whose stats are inferred
    pub tracked_side: Side,

    /// Stop a battle once every tracked estimate has collapsed
    pub track_convergence: bool,

    /// Spread trials over the rayon thread pool
    pub parallel: bool,

    /// Histogram bin width for rounds-to-certainty
    pub histogram_bin_width: u32,

    /// Last histogram edge; larger samples are counted as out of range
    pub histogram_upper_edge: u32,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per trial, 3 = per attack)
    pub verbosity: u8,

    /// The parties that fight in every trial
    pub matchup: Matchup,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_trials: DEFAULT_TRIALS,
            seed: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            tracked_side: Side::Party2,
            track_convergence: true,
            parallel: true,
            histogram_bin_width: HISTOGRAM_BIN_WIDTH,
            histogram_upper_edge: HISTOGRAM_UPPER_EDGE,
            verbosity: 1,
            matchup: Matchup::reference(),
        }
    }
}

impl SimConfig {
    /// Quick config for a short, reproducible check
    pub fn quick(num_trials: u32, seed: u64) -> Self {
        Self {
            num_trials,
            seed: Some(seed),
            verbosity: 0,
            ..Default::default()
        }
    }

    /// Config that lets every battle run until one party falls
    pub fn full_battles(num_trials: u32) -> Self {
        Self {
            num_trials,
            track_convergence: false,
            ..Default::default()
        }
    }

    pub fn with_matchup(mut self, matchup: Matchup) -> Self {
        self.matchup = matchup;
        self
    }

    pub fn battle_rules(&self) -> BattleRules {
        BattleRules {
            tracked_side: self.tracked_side,
            track_convergence: self.track_convergence,
            max_rounds: self.max_rounds,
        }
    }
}
