use crate::character::{Character, Side};
use crate::estimator::{AcEstimator, HitObservation, ModifierEstimator};
use serde::{Deserialize, Serialize};

/// Where a battle stands after the most recent round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatState {
    Ongoing,
    /// Every member of party 2 is down.
    Party1Victory,
    /// Every member of party 1 is down.
    Party2Victory,
    /// Every tracked estimate collapsed to its true value.
    Resolved,
    /// The round cap was reached with both parties still standing.
    RoundLimit,
}

impl CombatState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CombatState::Ongoing)
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            CombatState::Party1Victory => Some(Side::Party1),
            CombatState::Party2Victory => Some(Side::Party2),
            _ => None,
        }
    }

    pub fn victory_for(side: Side) -> Self {
        match side {
            Side::Party1 => CombatState::Party1Victory,
            Side::Party2 => CombatState::Party2Victory,
        }
    }
}

/// A character together with the side tag assigned at setup.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub character: Character,
    pub side: Side,
}

/// Which estimator an attack fed, and with what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// A tracked attacker's raw to-hit total.
    Modifier { attacker: usize, roll: i32 },
    /// An untracked attacker's roll against a tracked defender.
    ArmorClass {
        defender: usize,
        observation: HitObservation,
    },
}

/// One resolved attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackRecord {
    pub round: u32,
    pub attacker: usize,
    pub defender: usize,
    pub roll: i32,
    pub hit: bool,
    pub damage: i32,
    pub defender_hp: i32,
    pub observation: Observation,
    /// Active hypothesis count of the estimator that was just updated.
    pub remaining: usize,
}

/// Estimators and uncertainty traces for one tracked character.
///
/// Each trace starts with the full hypothesis count and grows by one entry per
/// observation, so the index of the first `1` is the number of observations
/// it took to become certain.
#[derive(Debug, Clone)]
pub struct EstimateTracker {
    pub combatant: usize,
    pub modifier: ModifierEstimator,
    pub armor_class: AcEstimator,
    pub modifier_trace: Vec<usize>,
    pub ac_trace: Vec<usize>,
}

impl EstimateTracker {
    pub fn new(combatant: usize) -> Self {
        let modifier = ModifierEstimator::default();
        let armor_class = AcEstimator::default();
        Self {
            combatant,
            modifier_trace: vec![modifier.active_hypothesis_count()],
            ac_trace: vec![armor_class.active_hypothesis_count()],
            modifier,
            armor_class,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.modifier.active_hypothesis_count() == 1
            && self.armor_class.active_hypothesis_count() == 1
    }
}

/// Final uncertainty record for one tracked character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateTrace {
    pub name: String,
    pub true_modifier: i32,
    pub true_armor_class: i32,
    pub modifier_trace: Vec<usize>,
    pub ac_trace: Vec<usize>,
    pub modifier_estimate: f64,
    pub ac_estimate: f64,
}

/// Everything a finished battle hands to the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub state: CombatState,
    pub rounds: u32,
    /// Party HP totals, starting totals first, then one entry per round.
    pub party1_hp: Vec<i64>,
    pub party2_hp: Vec<i64>,
    /// One entry per tracked character, in roster order.
    pub traces: Vec<EstimateTrace>,
}
