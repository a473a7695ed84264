//! Die rolling on an injected random source.

use super::constants::D20;
use rand::Rng;

/// Roll a single die with `sides` faces, returning 1..=sides.
///
/// A zero-sided die is treated as a d1 so a malformed weapon never panics the
/// simulation loop.
pub fn roll_die(sides: u32, rng: &mut impl Rng) -> i32 {
    rng.gen_range(1..=sides.max(1)) as i32
}

/// Roll a d20.
pub fn roll_d20(rng: &mut impl Rng) -> i32 {
    roll_die(D20, rng)
}
