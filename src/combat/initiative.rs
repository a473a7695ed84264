//! Turn order, rolled once per battle.

use super::types::Combatant;
use rand::Rng;
use std::cmp::Reverse;

/// Roll initiative for every combatant and return their indices in acting order.
///
/// Sorted descending by `(initiative, dexterity)`. The sort is stable, so
/// combatants with identical pairs keep roster order.
pub fn roll_initiative_order(combatants: &[Combatant], rng: &mut impl Rng) -> Vec<usize> {
    let scores: Vec<(i32, i32)> = combatants
        .iter()
        .map(|c| c.character.roll_initiative(rng))
        .collect();

    let mut order: Vec<usize> = (0..combatants.len()).collect();
    order.sort_by_key(|&i| Reverse(scores[i]));
    order
}
