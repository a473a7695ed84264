//! Integration test: Bayesian estimators under streams of consistent observations
//!
//! Feeds seeded observations generated from a known true value and checks that
//! the posterior stays normalized, never loses the truth, and only narrows.

use combat_inference::core::dice::roll_d20;
use combat_inference::error::EstimatorError;
use combat_inference::estimator::{AcEstimator, HitObservation, ModifierEstimator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn assert_normalized(probabilities: &[f64]) {
    let sum: f64 = probabilities.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9, "posterior sums to {}", sum);
    assert!(probabilities.iter().all(|p| *p >= 0.0));
}

// =============================================================================
// Modifier estimator
// =============================================================================

#[test]
fn test_modifier_truth_survives_every_update() {
    for seed in 0..25u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let true_modifier = rng.gen_range(-5..=15);
        let mut est = ModifierEstimator::default();
        let mut previous = est.active_hypothesis_count();

        for _ in 0..60 {
            let total = roll_d20(&mut rng) + true_modifier;
            est.update(total).unwrap();

            assert_normalized(est.probabilities());
            assert!(est.probability_of(true_modifier) > 0.0);
            let active = est.active_hypothesis_count();
            assert!(active <= previous, "active count grew");
            previous = active;
        }

        let (lo, hi) = est.support().unwrap();
        assert!(lo <= true_modifier && true_modifier <= hi);
    }
}

#[test]
fn test_modifier_collapses_after_both_extremes() {
    let mut est = ModifierEstimator::default();
    // Natural 1 and natural 20 with a true modifier of +4.
    est.update(5).unwrap();
    est.update(24).unwrap();
    assert_eq!(est.active_hypothesis_count(), 1);
    assert_eq!(est.resolved_value(), Some(4));
    assert_eq!(est.most_likely(), 4.0);
    assert_eq!(est.observations(), 2);
}

#[test]
fn test_modifier_surviving_hypotheses_stay_uniform() {
    let mut est = ModifierEstimator::default();
    est.update(12).unwrap();
    est.update(8).unwrap();

    let surviving: Vec<f64> = est
        .probabilities()
        .iter()
        .copied()
        .filter(|p| *p > 0.0)
        .collect();
    let first = surviving[0];
    assert!(surviving.iter().all(|p| (p - first).abs() < 1e-12));
}

#[test]
fn test_modifier_impossible_total_is_rejected() {
    let mut est = ModifierEstimator::default();
    est.update(10).unwrap();
    let before = est.probabilities().to_vec();

    let result = est.update(200);
    assert!(matches!(result, Err(EstimatorError::DegenerateLikelihood(_))));
    assert_eq!(est.probabilities(), before.as_slice());
    assert_eq!(est.observations(), 1);
}

// =============================================================================
// Armor class estimator
// =============================================================================

#[test]
fn test_ac_truth_survives_every_update() {
    for seed in 100..125u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let true_ac = rng.gen_range(0..=30);
        let attacker_modifier = rng.gen_range(-5..=15);
        let mut est = AcEstimator::default();
        let mut previous = est.active_hypothesis_count();

        for _ in 0..60 {
            let roll = roll_d20(&mut rng) + attacker_modifier;
            est.update(HitObservation::new(roll, roll >= true_ac)).unwrap();

            assert_normalized(est.probabilities());
            assert!(est.probability_of(true_ac) > 0.0);
            let active = est.active_hypothesis_count();
            assert!(active <= previous, "active count grew");
            previous = active;
        }
    }
}

#[test]
fn test_ac_pinned_by_adjacent_hit_and_miss() {
    let mut est = AcEstimator::default();
    est.update(HitObservation::new(10, true)).unwrap();
    est.update(HitObservation::new(9, false)).unwrap();
    assert_eq!(est.resolved_value(), Some(10));
    assert_eq!(est.weighted_mean(), 10.0);
}

#[test]
fn test_ac_hit_then_higher_miss_is_degenerate() {
    let mut est = AcEstimator::default();
    // Hit at 8 means AC <= 8; a miss at 12 would need AC > 12.
    est.update(HitObservation::new(8, true)).unwrap();
    let result = est.update(HitObservation::new(12, false));
    assert!(matches!(result, Err(EstimatorError::DegenerateLikelihood(_))));
    assert_eq!(est.support(), Some((0, 8)));
}

// =============================================================================
// Point estimates
// =============================================================================

#[test]
fn test_uniform_prior_estimates_center() {
    assert_eq!(ModifierEstimator::default().most_likely(), 5.0);
    assert_eq!(AcEstimator::default().most_likely(), 15.0);
    assert!((ModifierEstimator::default().weighted_mean() - 5.0).abs() < 1e-9);
}

#[test]
fn test_point_mass_prior() {
    let mut prior = vec![0.0; 31];
    prior[12] = 1.0;
    let est = AcEstimator::with_prior(Default::default(), prior).unwrap();
    assert_eq!(est.most_likely(), 12.0);
    assert_eq!(est.resolved_value(), Some(12));
}

#[test]
fn test_bad_priors_are_rejected() {
    assert!(matches!(
        AcEstimator::with_prior(Default::default(), vec![1.0; 3]),
        Err(EstimatorError::InvalidPrior(_))
    ));
    assert!(matches!(
        ModifierEstimator::with_prior(Default::default(), vec![0.5; 21]),
        Err(EstimatorError::InvalidPrior(_))
    ));
}
