use super::attributes::{ability_modifier, AttributeType};
use crate::core::constants::BASE_ARMOR_CLASS;
use crate::core::dice::{roll_d20, roll_die};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which party a combatant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Party1,
    Party2,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Party1 => Side::Party2,
            Side::Party2 => Side::Party1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Party1 => write!(f, "Party 1"),
            Side::Party2 => write!(f, "Party 2"),
        }
    }
}

/// The stat block a character is built from; this is what matchup files hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub name: String,
    pub max_hp: i32,
    pub dexterity: i32,
    pub strength: i32,
    pub proficiency: i32,
    pub weapon_die: u32,
    #[serde(default)]
    pub finesse: bool,
}

/// A combatant: fixed stats plus the one piece of mutable state, hit points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CharacterSheet", into = "CharacterSheet")]
pub struct Character {
    pub name: String,
    pub max_hp: i32,
    pub dexterity: i32,
    pub strength: i32,
    pub proficiency: i32,
    pub weapon_die: u32,
    pub finesse: bool,
    hp: i32,
}

impl From<CharacterSheet> for Character {
    fn from(sheet: CharacterSheet) -> Self {
        Self {
            hp: sheet.max_hp,
            name: sheet.name,
            max_hp: sheet.max_hp,
            dexterity: sheet.dexterity,
            strength: sheet.strength,
            proficiency: sheet.proficiency,
            weapon_die: sheet.weapon_die,
            finesse: sheet.finesse,
        }
    }
}

impl From<Character> for CharacterSheet {
    fn from(character: Character) -> Self {
        Self {
            name: character.name,
            max_hp: character.max_hp,
            dexterity: character.dexterity,
            strength: character.strength,
            proficiency: character.proficiency,
            weapon_die: character.weapon_die,
            finesse: character.finesse,
        }
    }
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        max_hp: i32,
        dexterity: i32,
        strength: i32,
        proficiency: i32,
        weapon_die: u32,
        finesse: bool,
    ) -> Self {
        Self {
            name: name.into(),
            max_hp,
            hp: max_hp,
            dexterity,
            strength,
            proficiency,
            weapon_die,
            finesse,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// A character at or below zero HP is down: it neither acts nor can be targeted.
    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_down()
    }

    /// Apply damage. Negative amounts (a weak roll with a large penalty) deal
    /// nothing, so HP never climbs above its maximum.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp -= amount.max(0);
    }

    /// Restore full HP, used when a roster is reused for a fresh trial.
    pub fn reset_hp(&mut self) {
        self.hp = self.max_hp;
    }

    pub fn modifier(&self, attr: AttributeType) -> i32 {
        match attr {
            AttributeType::Strength => ability_modifier(self.strength),
            AttributeType::Dexterity => ability_modifier(self.dexterity),
        }
    }

    pub fn dexterity_modifier(&self) -> i32 {
        self.modifier(AttributeType::Dexterity)
    }

    pub fn strength_modifier(&self) -> i32 {
        self.modifier(AttributeType::Strength)
    }

    /// Finesse weapons use the better of STR and DEX.
    pub fn weapon_bonus(&self) -> i32 {
        if self.finesse {
            self.dexterity_modifier().max(self.strength_modifier())
        } else {
            self.strength_modifier()
        }
    }

    pub fn armor_class(&self) -> i32 {
        BASE_ARMOR_CLASS + self.dexterity_modifier()
    }

    /// Everything added to the d20 when attacking.
    pub fn attack_modifier(&self) -> i32 {
        self.weapon_bonus() + self.proficiency
    }

    /// Initiative total paired with the raw DEX score for tie-breaks.
    pub fn roll_initiative(&self, rng: &mut impl Rng) -> (i32, i32) {
        (roll_d20(rng) + self.dexterity_modifier(), self.dexterity)
    }

    pub fn roll_to_hit(&self, rng: &mut impl Rng) -> i32 {
        roll_d20(rng) + self.attack_modifier()
    }

    pub fn roll_damage(&self, rng: &mut impl Rng) -> i32 {
        roll_die(self.weapon_die, rng) + self.weapon_bonus()
    }
}
