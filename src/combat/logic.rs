//! Turn-based battle between two parties, feeding every attack into the
//! estimators of the tracked side.
//!
//! A battle rolls initiative once, then repeats rounds over that fixed order.
//! Each living combatant attacks a random living opponent. The public result of
//! the attack updates exactly one estimator:
//!
//! - an untracked attacker reveals `(roll, hit)` against a tracked defender's AC;
//! - a tracked attacker reveals its raw to-hit total, which bounds its modifier.

use super::initiative::roll_initiative_order;
use super::types::{
    AttackRecord, BattleOutcome, CombatState, Combatant, EstimateTrace, EstimateTracker,
    Observation,
};
use crate::character::{Character, Side};
use crate::core::constants::DEFAULT_MAX_ROUNDS;
use crate::error::SimError;
use crate::estimator::{AcLikelihood, HitObservation, LikelihoodModel, ModifierLikelihood};
use rand::seq::SliceRandom;
use rand::Rng;

/// Per-battle rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleRules {
    /// The party whose modifier and AC are being inferred.
    pub tracked_side: Side,
    /// End the battle as soon as every tracked estimate has collapsed.
    pub track_convergence: bool,
    /// Rounds after which a battle with both parties standing is called off.
    pub max_rounds: u32,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            tracked_side: Side::Party2,
            track_convergence: true,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

pub struct CombatSimulator {
    combatants: Vec<Combatant>,
    trackers: Vec<EstimateTracker>,
    tracker_of: Vec<Option<usize>>,
    order: Vec<usize>,
    rules: BattleRules,
    state: CombatState,
    round: u32,
    party1_hp: Vec<i64>,
    party2_hp: Vec<i64>,
}

impl CombatSimulator {
    /// Set up a battle and roll initiative.
    pub fn new(
        party1: Vec<Character>,
        party2: Vec<Character>,
        rules: BattleRules,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        validate_party(Side::Party1, &party1)?;
        validate_party(Side::Party2, &party2)?;

        let combatants: Vec<Combatant> = party1
            .into_iter()
            .map(|character| Combatant {
                character,
                side: Side::Party1,
            })
            .chain(party2.into_iter().map(|character| Combatant {
                character,
                side: Side::Party2,
            }))
            .collect();

        let mut trackers = Vec::new();
        let mut tracker_of = vec![None; combatants.len()];
        for (idx, combatant) in combatants.iter().enumerate() {
            if combatant.side == rules.tracked_side {
                validate_trackable(&combatant.character)?;
                tracker_of[idx] = Some(trackers.len());
                trackers.push(EstimateTracker::new(idx));
            }
        }

        let order = roll_initiative_order(&combatants, rng);

        let mut sim = Self {
            combatants,
            trackers,
            tracker_of,
            order,
            rules,
            state: CombatState::Ongoing,
            round: 0,
            party1_hp: Vec::new(),
            party2_hp: Vec::new(),
        };
        sim.record_hp();
        Ok(sim)
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn initiative_order(&self) -> &[usize] {
        &self.order
    }

    pub fn trackers(&self) -> &[EstimateTracker] {
        &self.trackers
    }

    /// Tracker for a combatant, if it belongs to the tracked side.
    pub fn tracker_for(&self, combatant: usize) -> Option<&EstimateTracker> {
        self.tracker_of
            .get(combatant)
            .copied()
            .flatten()
            .map(|t| &self.trackers[t])
    }

    /// Index of a combatant by name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.combatants
            .iter()
            .position(|c| c.character.name == name)
    }

    /// Summed in `i64` so large rosters cannot overflow.
    pub fn party_hp(&self, side: Side) -> i64 {
        self.members(side).map(|c| c.character.hp() as i64).sum()
    }

    pub fn party_down(&self, side: Side) -> bool {
        self.members(side).all(|c| c.character.is_down())
    }

    fn members(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(move |c| c.side == side)
    }

    /// Resolve one attack and route its observation to the tracked estimator.
    pub fn attack(
        &mut self,
        attacker: usize,
        defender: usize,
        rng: &mut impl Rng,
    ) -> Result<AttackRecord, SimError> {
        self.check_attack(attacker, defender)?;
        let roll = self.combatants[attacker].character.roll_to_hit(rng);
        let hit = roll >= self.combatants[defender].character.armor_class();
        let damage = if hit {
            self.combatants[attacker].character.roll_damage(rng)
        } else {
            0
        };
        if hit {
            self.combatants[defender].character.take_damage(damage);
        }

        let (observation, remaining) = if self.combatants[attacker].side == self.rules.tracked_side
        {
            let t = self.tracker_index(attacker)?;
            let tracker = &mut self.trackers[t];
            tracker.modifier.update(roll)?;
            let remaining = tracker.modifier.active_hypothesis_count();
            tracker.modifier_trace.push(remaining);
            (Observation::Modifier { attacker, roll }, remaining)
        } else {
            let t = self.tracker_index(defender)?;
            let tracker = &mut self.trackers[t];
            let observation = HitObservation::new(roll, hit);
            tracker.armor_class.update(observation)?;
            let remaining = tracker.armor_class.active_hypothesis_count();
            tracker.ac_trace.push(remaining);
            (
                Observation::ArmorClass {
                    defender,
                    observation,
                },
                remaining,
            )
        };

        let record = AttackRecord {
            round: self.round,
            attacker,
            defender,
            roll,
            hit,
            damage,
            defender_hp: self.combatants[defender].character.hp(),
            observation,
            remaining,
        };
        tracing::trace!(
            round = record.round,
            attacker = %self.combatants[attacker].character.name,
            defender = %self.combatants[defender].character.name,
            roll,
            hit,
            damage,
            defender_hp = record.defender_hp,
            remaining,
            "attack resolved"
        );
        Ok(record)
    }

    fn check_attack(&self, attacker: usize, defender: usize) -> Result<(), SimError> {
        let count = self.combatants.len();
        let (a, d) = match (self.combatants.get(attacker), self.combatants.get(defender)) {
            (Some(a), Some(d)) => (a, d),
            _ => {
                return Err(SimError::InvalidAttack(format!(
                    "combatant {} -> {} out of range for {} combatants",
                    attacker, defender, count
                )))
            }
        };
        if a.side == d.side {
            return Err(SimError::InvalidAttack(format!(
                "{} and {} are both in {}",
                a.character.name, d.character.name, a.side
            )));
        }
        if a.character.is_down() {
            return Err(SimError::InvalidAttack(format!(
                "{} is down and cannot attack",
                a.character.name
            )));
        }
        if d.character.is_down() {
            return Err(SimError::InvalidAttack(format!(
                "{} is already down",
                d.character.name
            )));
        }
        Ok(())
    }

    fn tracker_index(&self, combatant: usize) -> Result<usize, SimError> {
        self.tracker_of[combatant].ok_or_else(|| {
            SimError::InvalidParty(format!(
                "{} is not on the tracked side",
                self.combatants[combatant].character.name
            ))
        })
    }

    fn pick_target(&self, attacker: usize, rng: &mut impl Rng) -> Result<usize, SimError> {
        let foes = self.combatants[attacker].side.opponent();
        let live: Vec<usize> = self
            .combatants
            .iter()
            .enumerate()
            .filter(|(_, c)| c.side == foes && c.character.is_alive())
            .map(|(i, _)| i)
            .collect();
        live.choose(rng)
            .copied()
            .ok_or_else(|| SimError::NoLiveOpponent {
                attacker: self.combatants[attacker].character.name.clone(),
            })
    }

    /// Play one full pass of the initiative order and evaluate the end-of-round checks.
    pub fn step_round(&mut self, rng: &mut impl Rng) -> Result<CombatState, SimError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        self.round += 1;

        for slot in 0..self.order.len() {
            let actor = self.order[slot];
            if self.combatants[actor].character.is_down() {
                continue;
            }
            if self.party_down(self.combatants[actor].side.opponent()) {
                break;
            }
            let target = self.pick_target(actor, rng)?;
            self.attack(actor, target, rng)?;
        }

        self.record_hp();
        self.state = self.end_of_round()?;
        Ok(self.state)
    }

    fn end_of_round(&self) -> Result<CombatState, SimError> {
        for side in [Side::Party1, Side::Party2] {
            if self.party_down(side) {
                return Ok(CombatState::victory_for(side.opponent()));
            }
        }
        if self.rules.track_convergence
            && !self.trackers.is_empty()
            && self.trackers.iter().all(EstimateTracker::is_resolved)
        {
            self.verify_ground_truth()?;
            return Ok(CombatState::Resolved);
        }
        if self.round >= self.rules.max_rounds {
            return Ok(CombatState::RoundLimit);
        }
        Ok(CombatState::Ongoing)
    }

    /// A collapsed estimate that disagrees with the true stat means a likelihood
    /// model pruned the truth.
    fn verify_ground_truth(&self) -> Result<(), SimError> {
        for tracker in &self.trackers {
            let character = &self.combatants[tracker.combatant].character;
            check_resolved(
                character,
                ModifierLikelihood::QUANTITY,
                character.attack_modifier(),
                tracker.modifier.resolved_value(),
            )?;
            check_resolved(
                character,
                AcLikelihood::QUANTITY,
                character.armor_class(),
                tracker.armor_class.resolved_value(),
            )?;
        }
        Ok(())
    }

    fn record_hp(&mut self) {
        self.party1_hp.push(self.party_hp(Side::Party1));
        self.party2_hp.push(self.party_hp(Side::Party2));
    }

    /// Play rounds until a terminal state.
    pub fn run(&mut self, rng: &mut impl Rng) -> Result<CombatState, SimError> {
        while !self.state.is_terminal() {
            self.step_round(rng)?;
        }
        Ok(self.state)
    }

    /// Snapshot the battle's traces and HP series.
    pub fn outcome(&self) -> BattleOutcome {
        let traces = self
            .trackers
            .iter()
            .map(|tracker| {
                let character = &self.combatants[tracker.combatant].character;
                EstimateTrace {
                    name: character.name.clone(),
                    true_modifier: character.attack_modifier(),
                    true_armor_class: character.armor_class(),
                    modifier_trace: tracker.modifier_trace.clone(),
                    ac_trace: tracker.ac_trace.clone(),
                    modifier_estimate: tracker.modifier.most_likely(),
                    ac_estimate: tracker.armor_class.most_likely(),
                }
            })
            .collect();

        BattleOutcome {
            state: self.state,
            rounds: self.round,
            party1_hp: self.party1_hp.clone(),
            party2_hp: self.party2_hp.clone(),
            traces,
        }
    }
}

fn check_resolved(
    character: &Character,
    quantity: &'static str,
    expected: i32,
    found: Option<i32>,
) -> Result<(), SimError> {
    match found {
        Some(found) if found != expected => Err(SimError::GroundTruthMismatch {
            character: character.name.clone(),
            quantity,
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

fn validate_party(side: Side, party: &[Character]) -> Result<(), SimError> {
    if party.is_empty() {
        return Err(SimError::InvalidParty(format!("{} has no members", side)));
    }
    if party.iter().all(Character::is_down) {
        return Err(SimError::InvalidParty(format!(
            "{} has no member with positive HP",
            side
        )));
    }
    Ok(())
}

/// A tracked character's true stats must lie inside the hypothesis spaces,
/// otherwise its own observations would eventually rule out every hypothesis.
fn validate_trackable(character: &Character) -> Result<(), SimError> {
    let modifier = character.attack_modifier();
    if !ModifierLikelihood.hypothesis_range().contains(&modifier) {
        return Err(SimError::InvalidParty(format!(
            "{} has attack modifier {} outside the estimable range",
            character.name, modifier
        )));
    }
    let ac = character.armor_class();
    if !AcLikelihood.hypothesis_range().contains(&ac) {
        return Err(SimError::InvalidParty(format!(
            "{} has armor class {} outside the estimable range",
            character.name, ac
        )));
    }
    Ok(())
}

/// Set up and play a whole battle.
pub fn simulate_battle(
    party1: Vec<Character>,
    party2: Vec<Character>,
    rules: BattleRules,
    rng: &mut impl Rng,
) -> Result<BattleOutcome, SimError> {
    let mut sim = CombatSimulator::new(party1, party2, rules, rng)?;
    sim.run(rng)?;
    Ok(sim.outcome())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn attacker() -> Character {
        Character::new("Attacker", 50, 10, 14, 2, 8, false)
    }

    fn target_dummy() -> Character {
        Character::new("Defender", 10_000, 10, 10, 0, 4, false)
    }

    #[test]
    fn test_empty_party_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = CombatSimulator::new(
            vec![],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(SimError::InvalidParty(_))));
    }

    #[test]
    fn test_all_down_party_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut fallen = attacker();
        fallen.take_damage(100);
        let result =
            CombatSimulator::new(vec![fallen], vec![target_dummy()], BattleRules::default(), &mut rng);
        assert!(matches!(result, Err(SimError::InvalidParty(_))));
    }

    #[test]
    fn test_untrackable_modifier_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let prodigy = Character::new("Prodigy", 10, 10, 30, 8, 6, false);
        assert_eq!(prodigy.attack_modifier(), 18);
        let result =
            CombatSimulator::new(vec![attacker()], vec![prodigy], BattleRules::default(), &mut rng);
        assert!(matches!(result, Err(SimError::InvalidParty(_))));
    }

    #[test]
    fn test_untracked_side_may_exceed_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let prodigy = Character::new("Prodigy", 10, 10, 30, 8, 6, false);
        let result =
            CombatSimulator::new(vec![prodigy], vec![target_dummy()], BattleRules::default(), &mut rng);
        assert!(result.is_ok());
    }

    #[test]
    fn test_side_tags_and_trackers() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let sim = CombatSimulator::new(
            vec![attacker()],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(sim.combatants()[0].side, Side::Party1);
        assert_eq!(sim.combatants()[1].side, Side::Party2);
        assert_eq!(sim.trackers().len(), 1);
        assert!(sim.tracker_for(0).is_none());
        assert!(sim.tracker_for(1).is_some());
        assert_eq!(sim.find("Defender"), Some(1));
        assert_eq!(sim.state(), CombatState::Ongoing);
    }

    #[test]
    fn test_untracked_attack_updates_defender_ac() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut sim = CombatSimulator::new(
            vec![attacker()],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();

        let record = sim.attack(0, 1, &mut rng).unwrap();
        assert_eq!(record.hit, record.roll >= 10);
        assert!(matches!(record.observation, Observation::ArmorClass { defender: 1, .. }));

        let tracker = sim.tracker_for(1).unwrap();
        assert_eq!(tracker.ac_trace.len(), 2);
        assert_eq!(tracker.modifier_trace.len(), 1);
        assert_eq!(*tracker.ac_trace.last().unwrap(), record.remaining);
    }

    #[test]
    fn test_tracked_attack_updates_attacker_modifier() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut sim = CombatSimulator::new(
            vec![target_dummy()],
            vec![attacker()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();

        let record = sim.attack(1, 0, &mut rng).unwrap();
        assert_eq!(record.observation, Observation::Modifier { attacker: 1, roll: record.roll });
        let tracker = sim.tracker_for(1).unwrap();
        assert_eq!(tracker.modifier_trace.len(), 2);
        assert!(tracker.modifier.probability_of(4) > 0.0);
    }

    #[test]
    fn test_attack_out_of_range_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut sim = CombatSimulator::new(
            vec![attacker()],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();
        assert!(matches!(
            sim.attack(0, 7, &mut rng),
            Err(SimError::InvalidAttack(_))
        ));
        assert!(matches!(
            sim.attack(7, 1, &mut rng),
            Err(SimError::InvalidAttack(_))
        ));
        assert_eq!(sim.tracker_for(1).unwrap().ac_trace.len(), 1);
    }

    #[test]
    fn test_attack_on_own_side_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut sim = CombatSimulator::new(
            vec![attacker(), attacker()],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();
        assert!(matches!(
            sim.attack(0, 1, &mut rng),
            Err(SimError::InvalidAttack(_))
        ));
        assert_eq!(sim.combatants()[1].character.hp(), 50);
    }

    #[test]
    fn test_attack_involving_downed_combatant_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut fallen = attacker();
        fallen.take_damage(50);
        let mut sim = CombatSimulator::new(
            vec![attacker(), fallen],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();
        assert!(matches!(
            sim.attack(2, 1, &mut rng),
            Err(SimError::InvalidAttack(_))
        ));
        assert!(matches!(
            sim.attack(1, 2, &mut rng),
            Err(SimError::InvalidAttack(_))
        ));
        assert!(sim.attack(0, 2, &mut rng).is_ok());
    }

    #[test]
    fn test_huge_party_hp_totals_do_not_overflow() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let giant = Character::new("Giant", i32::MAX, 10, 10, 0, 4, false);
        let rules = BattleRules {
            max_rounds: 3,
            ..Default::default()
        };
        let outcome = simulate_battle(
            vec![giant.clone(), giant],
            vec![target_dummy()],
            rules,
            &mut rng,
        )
        .unwrap();
        assert_eq!(outcome.party1_hp[0], 2 * i32::MAX as i64);
        assert_eq!(outcome.party1_hp.len(), outcome.rounds as usize + 1);
    }

    #[test]
    fn test_wiped_party_names_the_winner() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        // Modifier +50 always hits and d4+10 always drops a 10 HP defender.
        let titan = Character::new("Titan", 100, 10, 30, 40, 4, false);
        let outcome = simulate_battle(
            vec![Character::new("Mouse", 10, 10, 10, 0, 4, false)],
            vec![titan],
            BattleRules {
                tracked_side: Side::Party1,
                ..Default::default()
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(outcome.state, CombatState::Party2Victory);
        assert_eq!(outcome.state.winner(), Some(Side::Party2));
    }

    #[test]
    fn test_damage_only_on_hit() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut sim = CombatSimulator::new(
            vec![attacker()],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();
        for _ in 0..30 {
            let before = sim.combatants()[1].character.hp();
            let record = sim.attack(0, 1, &mut rng).unwrap();
            if record.hit {
                assert!((3..=10).contains(&record.damage));
                assert_eq!(record.defender_hp, before - record.damage);
            } else {
                assert_eq!(record.damage, 0);
                assert_eq!(record.defender_hp, before);
            }
        }
    }

    #[test]
    fn test_hp_series_starts_with_totals() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut sim = CombatSimulator::new(
            vec![attacker(), attacker()],
            vec![target_dummy()],
            BattleRules::default(),
            &mut rng,
        )
        .unwrap();
        sim.step_round(&mut rng).unwrap();
        let outcome = sim.outcome();
        assert_eq!(outcome.party1_hp[0], 100);
        assert_eq!(outcome.party2_hp[0], 10_000);
        assert_eq!(outcome.party1_hp.len(), 2);
        assert_eq!(outcome.rounds, 1);
    }

    #[test]
    fn test_round_limit_stops_hopeless_battle() {
        // Neither side can ever reach the other's AC.
        let wall = Character::new("Wall", 20, 50, 1, 0, 4, false);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let rules = BattleRules {
            tracked_side: Side::Party1,
            track_convergence: false,
            max_rounds: 25,
        };
        let outcome = simulate_battle(
            vec![Character::new("Pebble", 20, 30, 1, 0, 4, false)],
            vec![wall],
            rules,
            &mut rng,
        )
        .unwrap();
        assert_eq!(outcome.state, CombatState::RoundLimit);
        assert_eq!(outcome.rounds, 25);
    }

    #[test]
    fn test_step_after_terminal_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let rules = BattleRules {
            max_rounds: 1,
            track_convergence: false,
            ..Default::default()
        };
        let mut sim =
            CombatSimulator::new(vec![attacker()], vec![target_dummy()], rules, &mut rng).unwrap();
        let state = sim.step_round(&mut rng).unwrap();
        assert_eq!(state, CombatState::RoundLimit);
        assert_eq!(sim.step_round(&mut rng).unwrap(), CombatState::RoundLimit);
        assert_eq!(sim.round(), 1);
    }
}
