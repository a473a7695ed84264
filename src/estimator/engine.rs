//! Discrete Bayesian estimator over a finite, ordered hypothesis space.
//!
//! The posterior is a plain probability vector aligned with the model's
//! hypothesis values. Each observation multiplies it by the model's likelihood
//! vector and renormalizes:
//!
//! ```text
//! P(h | obs_1..n) ∝ P(h | obs_1..n-1) · P(obs_n | h)
//! ```
//!
//! Both shipped models only ever zero out entries, so the number of surviving
//! hypotheses is a direct measure of the remaining uncertainty.

use super::models::{AcLikelihood, LikelihoodModel, ModifierLikelihood};
use crate::core::constants::{DEGENERATE_MASS, MAP_TIE_TOLERANCE, PRIOR_SUM_TOLERANCE};
use crate::error::EstimatorError;

/// Estimates an attacker's total to-hit bonus.
pub type ModifierEstimator = Estimator<ModifierLikelihood>;

/// Estimates a defender's armor class.
pub type AcEstimator = Estimator<AcLikelihood>;

#[derive(Debug, Clone)]
pub struct Estimator<M: LikelihoodModel> {
    model: M,
    values: Vec<i32>,
    probabilities: Vec<f64>,
    observations: usize,
}

impl<M: LikelihoodModel + Default> Default for Estimator<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}

impl<M: LikelihoodModel> Estimator<M> {
    /// Create an estimator with a uniform prior over the model's hypotheses.
    pub fn new(model: M) -> Self {
        let values: Vec<i32> = model.hypothesis_range().collect();
        let n = values.len();
        Self {
            model,
            values,
            probabilities: vec![1.0 / n as f64; n],
            observations: 0,
        }
    }

    /// Create an estimator with an explicit prior.
    ///
    /// The prior must have one finite, non-negative entry per hypothesis and
    /// sum to 1 within [`PRIOR_SUM_TOLERANCE`].
    pub fn with_prior(model: M, prior: Vec<f64>) -> Result<Self, EstimatorError> {
        let mut estimator = Self::new(model);
        if prior.len() != estimator.values.len() {
            return Err(EstimatorError::InvalidPrior(format!(
                "{} entries for {} hypotheses",
                prior.len(),
                estimator.values.len()
            )));
        }
        if let Some(index) = prior.iter().position(|p| !p.is_finite() || *p < 0.0) {
            return Err(EstimatorError::InvalidPrior(format!(
                "entry {} is {}",
                index, prior[index]
            )));
        }
        let sum: f64 = prior.iter().sum();
        if (sum - 1.0).abs() > PRIOR_SUM_TOLERANCE {
            return Err(EstimatorError::InvalidPrior(format!("sums to {}", sum)));
        }
        estimator.probabilities = prior;
        Ok(estimator)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Concrete hypothesis values, aligned with [`Self::probabilities`].
    pub fn hypothesis_values(&self) -> &[i32] {
        &self.values
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn hypothesis_count(&self) -> usize {
        self.values.len()
    }

    /// Number of observations absorbed so far.
    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn probability_of(&self, value: i32) -> f64 {
        self.values
            .iter()
            .position(|v| *v == value)
            .map(|i| self.probabilities[i])
            .unwrap_or(0.0)
    }

    /// Likelihood of `measurement` under each hypothesis.
    pub fn likelihood(&self, measurement: M::Measurement) -> Vec<f64> {
        self.values
            .iter()
            .map(|h| self.model.likelihood_of(*h, measurement))
            .collect()
    }

    /// Fold one observation into the posterior.
    ///
    /// Fails, leaving the posterior untouched, when the observation rules out
    /// every remaining hypothesis.
    pub fn update(&mut self, measurement: M::Measurement) -> Result<(), EstimatorError> {
        let mut posterior: Vec<f64> = self
            .probabilities
            .iter()
            .zip(self.likelihood(measurement))
            .map(|(prior, likelihood)| prior * likelihood)
            .collect();

        let mass: f64 = posterior.iter().sum();
        if !(mass > DEGENERATE_MASS) {
            return Err(EstimatorError::DegenerateLikelihood(format!(
                "{:?} ({})",
                measurement,
                M::QUANTITY
            )));
        }

        for p in &mut posterior {
            *p /= mass;
        }
        self.probabilities = posterior;
        self.observations += 1;
        Ok(())
    }

    /// Maximum a posteriori value.
    ///
    /// When several hypotheses share the maximum, returns the average of their
    /// values weighted by posterior mass. Tied masses are equal, so this is the
    /// sum of tied values over the number of tied hypotheses.
    pub fn most_likely(&self) -> f64 {
        let highest = self
            .probabilities
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let (sum, count) = self
            .values
            .iter()
            .zip(&self.probabilities)
            .filter(|(_, p)| highest - **p <= MAP_TIE_TOLERANCE)
            .fold((0i64, 0usize), |(sum, count), (v, _)| {
                (sum + *v as i64, count + 1)
            });

        sum as f64 / count as f64
    }

    /// Posterior mean: Σ value · P(value).
    pub fn weighted_mean(&self) -> f64 {
        self.values
            .iter()
            .zip(&self.probabilities)
            .map(|(v, p)| *v as f64 * p)
            .sum()
    }

    /// Number of hypotheses still carrying strictly positive probability.
    pub fn active_hypothesis_count(&self) -> usize {
        self.probabilities.iter().filter(|p| **p > 0.0).count()
    }

    /// Lowest and highest surviving hypothesis.
    pub fn support(&self) -> Option<(i32, i32)> {
        let mut surviving = self
            .values
            .iter()
            .zip(&self.probabilities)
            .filter(|(_, p)| **p > 0.0)
            .map(|(v, _)| *v);
        let first = surviving.next()?;
        let last = surviving.last().unwrap_or(first);
        Some((first, last))
    }

    /// The single surviving hypothesis, once the estimate has fully collapsed.
    pub fn resolved_value(&self) -> Option<i32> {
        match self.support() {
            Some((lo, hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }
}
