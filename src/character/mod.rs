//! Character stats and derived combat values.

pub mod attributes;
pub mod types;

pub use attributes::*;
pub use types::*;
