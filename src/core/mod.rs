//! Shared constants and dice.

pub mod constants;
pub mod dice;

pub use constants::*;
pub use dice::*;
