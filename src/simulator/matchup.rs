//! Party compositions.

use crate::character::{Character, Side};
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Two ordered parties. Matchup files are JSON with the same shape:
///
/// ```json
/// { "party1": [{ "name": "...", "max_hp": 90, "dexterity": 10, "strength": 10,
///                "proficiency": 0, "weapon_die": 8, "finesse": false }],
///   "party2": [ ... ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub party1: Vec<Character>,
    pub party2: Vec<Character>,
}

impl Default for Matchup {
    fn default() -> Self {
        Self::reference()
    }
}

impl Matchup {
    pub fn new(party1: Vec<Character>, party2: Vec<Character>) -> Self {
        Self { party1, party2 }
    }

    /// Two modest attackers against one sturdy, tracked opponent.
    pub fn reference() -> Self {
        Self {
            party1: vec![
                Character::new("Sellsword", 90, 10, 10, 0, 8, false),
                Character::new("Duelist", 150, 14, 10, 0, 10, false),
            ],
            party2: vec![Character::new("Brute", 240, 14, 10, 0, 8, false)],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn party(&self, side: Side) -> &[Character] {
        match side {
            Side::Party1 => &self.party1,
            Side::Party2 => &self.party2,
        }
    }

    /// Full-HP copies of both parties for a new trial.
    pub fn fresh_parties(&self) -> (Vec<Character>, Vec<Character>) {
        let fresh = |party: &[Character]| {
            party
                .iter()
                .cloned()
                .map(|mut c| {
                    c.reset_hp();
                    c
                })
                .collect()
        };
        (fresh(&self.party1), fresh(&self.party2))
    }

    /// The tracked character whose convergence the harness reports.
    pub fn representative(&self, tracked: Side) -> Option<&Character> {
        self.party(tracked).first()
    }
}
