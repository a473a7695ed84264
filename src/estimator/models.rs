//! Likelihood models for the two hidden combat quantities.

use crate::core::constants::{
    ARMOR_CLASS_MAX, ARMOR_CLASS_MIN, D20, MODIFIER_MAX, MODIFIER_MIN, NATURAL_MAX, NATURAL_MIN,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// A probabilistic observation model over an ordered integer hypothesis space.
pub trait LikelihoodModel {
    type Measurement: Copy + fmt::Debug;

    /// Human-readable name of the inferred quantity, used in logs and errors.
    const QUANTITY: &'static str;

    /// The ordered values the hidden quantity may take.
    fn hypothesis_range(&self) -> RangeInclusive<i32>;

    /// P(measurement | hypothesis), in [0, 1].
    fn likelihood_of(&self, hypothesis: i32, measurement: Self::Measurement) -> f64;
}

/// What a defender learns from being attacked: the to-hit total and whether it landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitObservation {
    pub roll: i32,
    pub hit: bool,
}

impl HitObservation {
    pub fn new(roll: i32, hit: bool) -> Self {
        Self { roll, hit }
    }
}

/// Infers an attacker's total to-hit bonus from raw to-hit totals.
///
/// A total `t` under bonus `m` implies a natural roll of `t - m`, which is
/// uniformly 1/20 likely when it lies on the die and impossible otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierLikelihood;

impl LikelihoodModel for ModifierLikelihood {
    type Measurement = i32;
    const QUANTITY: &'static str = "attack modifier";

    fn hypothesis_range(&self) -> RangeInclusive<i32> {
        MODIFIER_MIN..=MODIFIER_MAX
    }

    fn likelihood_of(&self, hypothesis: i32, total: i32) -> f64 {
        let natural = total - hypothesis;
        if (NATURAL_MIN..=NATURAL_MAX).contains(&natural) {
            1.0 / D20 as f64
        } else {
            0.0
        }
    }
}

/// Infers a defender's armor class from hit/miss outcomes.
///
/// The comparison against AC is deterministic, so each observation simply cuts
/// the space at the roll: a hit keeps `ac <= roll`, a miss keeps `ac > roll`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcLikelihood;

impl LikelihoodModel for AcLikelihood {
    type Measurement = HitObservation;
    const QUANTITY: &'static str = "armor class";

    fn hypothesis_range(&self) -> RangeInclusive<i32> {
        ARMOR_CLASS_MIN..=ARMOR_CLASS_MAX
    }

    fn likelihood_of(&self, hypothesis: i32, obs: HitObservation) -> f64 {
        let consistent = if obs.hit {
            hypothesis <= obs.roll
        } else {
            hypothesis > obs.roll
        };
        if consistent {
            1.0
        } else {
            0.0
        }
    }
}
