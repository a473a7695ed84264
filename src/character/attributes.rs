use crate::core::constants::ABILITY_BASELINE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttributeType {
    Strength,
    Dexterity,
}

/// Ability modifier for a raw score, rounding toward negative infinity
/// (a score of 9 is -1, not 0).
pub fn ability_modifier(score: i32) -> i32 {
    (score - ABILITY_BASELINE).div_euclid(2)
}
