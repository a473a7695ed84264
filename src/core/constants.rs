// Dice
pub const D20: u32 = 20;
pub const NATURAL_MIN: i32 = 1;
pub const NATURAL_MAX: i32 = D20 as i32;

// Character derivations
pub const ABILITY_BASELINE: i32 = 10;
pub const BASE_ARMOR_CLASS: i32 = 10;

// Hypothesis spaces
pub const MODIFIER_MIN: i32 = -5;
pub const MODIFIER_MAX: i32 = 15;
pub const ARMOR_CLASS_MIN: i32 = 0;
pub const ARMOR_CLASS_MAX: i32 = 30;

// Numerical tolerances
pub const PRIOR_SUM_TOLERANCE: f64 = 1e-9;
pub const DEGENERATE_MASS: f64 = 1e-12;
pub const MAP_TIE_TOLERANCE: f64 = 1e-12;

// Experiment defaults
pub const DEFAULT_TRIALS: u32 = 10_000;
pub const DEFAULT_MAX_ROUNDS: u32 = 1_000;
pub const HISTOGRAM_BIN_WIDTH: u32 = 10;
pub const HISTOGRAM_UPPER_EDGE: u32 = 240;
