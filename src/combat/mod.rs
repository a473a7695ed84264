//! Combat system types and logic.

pub mod initiative;
pub mod logic;
pub mod types;

pub use initiative::*;
pub use logic::*;
pub use types::*;
