//! Experiment runner: many independent battles, one convergence sample each.
//!
//! Every trial builds fresh characters and estimators and draws from its own
//! `ChaCha8Rng` seeded with `base_seed + trial`, so a run is reproducible and
//! gives the same results sequentially or on the rayon pool.

use super::config::SimConfig;
use super::report::ExperimentReport;
use crate::combat::{simulate_battle, BattleOutcome};
use crate::error::SimError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// One battle and the convergence indices extracted from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub trial: u32,
    pub seed: u64,
    pub outcome: BattleOutcome,
    pub modifier_rounds: usize,
    pub ac_rounds: usize,
}

/// Index of the first trace entry equal to 1.
///
/// A trace that never collapses is right-censored at its length.
pub fn rounds_to_certainty(trace: &[usize]) -> usize {
    trace
        .iter()
        .position(|&remaining| remaining == 1)
        .unwrap_or(trace.len())
}

/// Run the full experiment and aggregate it into a report.
///
/// The first failing trial aborts the run; a failure means the estimators and
/// the simulated ground truth disagree, which no amount of retrying fixes.
pub fn run_experiment(config: &SimConfig) -> Result<ExperimentReport, SimError> {
    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    tracing::info!(
        trials = config.num_trials,
        seed = base_seed,
        parallel = config.parallel,
        "starting experiment"
    );

    let trials: Vec<TrialResult> = if config.parallel {
        (0..config.num_trials)
            .into_par_iter()
            .map(|trial| run_trial(config, trial, base_seed))
            .collect::<Result<_, _>>()?
    } else {
        (0..config.num_trials)
            .map(|trial| run_trial(config, trial, base_seed))
            .collect::<Result<_, _>>()?
    };

    let report = ExperimentReport::from_trials(&trials, config, base_seed);
    tracing::info!(
        modifier_mean = report.modifier.mean,
        ac_mean = report.armor_class.mean,
        "experiment finished"
    );
    Ok(report)
}

/// Simulate one battle with its own RNG stream.
pub fn run_trial(config: &SimConfig, trial: u32, base_seed: u64) -> Result<TrialResult, SimError> {
    let seed = base_seed.wrapping_add(trial as u64);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let (party1, party2) = config.matchup.fresh_parties();
    let outcome = simulate_battle(party1, party2, config.battle_rules(), &mut rng)?;

    let representative = outcome.traces.first().ok_or_else(|| {
        SimError::InvalidParty(format!("{} has no tracked character", config.tracked_side))
    })?;
    let modifier_rounds = rounds_to_certainty(&representative.modifier_trace);
    let ac_rounds = rounds_to_certainty(&representative.ac_trace);

    tracing::debug!(
        trial,
        seed,
        state = ?outcome.state,
        rounds = outcome.rounds,
        modifier_rounds,
        ac_rounds,
        "trial finished"
    );

    Ok(TrialResult {
        trial,
        seed,
        outcome,
        modifier_rounds,
        ac_rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::CombatState;

    #[test]
    fn test_rounds_to_certainty_finds_first_one() {
        assert_eq!(rounds_to_certainty(&[31, 20, 4, 1, 1]), 3);
        assert_eq!(rounds_to_certainty(&[1]), 0);
    }

    #[test]
    fn test_rounds_to_certainty_censors_at_length() {
        assert_eq!(rounds_to_certainty(&[21, 18, 9, 2]), 4);
        assert_eq!(rounds_to_certainty(&[]), 0);
    }

    #[test]
    fn test_single_trial() {
        let config = SimConfig::quick(1, 12345);
        let result = run_trial(&config, 0, 12345).unwrap();

        assert_eq!(result.seed, 12345);
        assert!(result.outcome.state.is_terminal());
        assert!(result.outcome.rounds > 0);
        let trace = &result.outcome.traces[0];
        assert_eq!(trace.name, "Brute");
        assert!(result.ac_rounds <= trace.ac_trace.len());
        assert!(result.modifier_rounds <= trace.modifier_trace.len());
    }

    #[test]
    fn test_trial_is_reproducible() {
        let config = SimConfig::quick(1, 0);
        let a = run_trial(&config, 7, 1000).unwrap();
        let b = run_trial(&config, 7, 1000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolved_trial_pins_true_values() {
        let config = SimConfig::quick(40, 77);
        let report_trials: Vec<TrialResult> = (0..40)
            .map(|t| run_trial(&config, t, 77).unwrap())
            .collect();

        for result in report_trials
            .iter()
            .filter(|r| r.outcome.state == CombatState::Resolved)
        {
            let trace = &result.outcome.traces[0];
            assert_eq!(trace.modifier_estimate, trace.true_modifier as f64);
            assert_eq!(trace.ac_estimate, trace.true_armor_class as f64);
            assert_eq!(trace.modifier_trace[result.modifier_rounds], 1);
            assert_eq!(trace.ac_trace[result.ac_rounds], 1);
        }
    }

    #[test]
    fn test_full_simulation() {
        let config = SimConfig {
            num_trials: 5,
            seed: Some(42),
            verbosity: 0,
            ..Default::default()
        };
        let report = run_experiment(&config).unwrap();
        assert_eq!(report.num_trials, 5);
        assert_eq!(report.seed, 42);
        assert_eq!(report.modifier_rounds.len(), 5);
        assert!(report.avg_rounds > 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = SimConfig {
            parallel: true,
            ..SimConfig::quick(30, 2024)
        };
        let sequential = SimConfig {
            parallel: false,
            ..SimConfig::quick(30, 2024)
        };
        assert_eq!(
            run_experiment(&parallel).unwrap(),
            run_experiment(&sequential).unwrap()
        );
    }

    #[test]
    fn test_entropy_seed_is_recorded() {
        let config = SimConfig {
            num_trials: 2,
            seed: None,
            verbosity: 0,
            ..Default::default()
        };
        let report = run_experiment(&config).unwrap();
        let replay = run_experiment(&SimConfig {
            seed: Some(report.seed),
            ..config
        })
        .unwrap();
        assert_eq!(report, replay);
    }
}
