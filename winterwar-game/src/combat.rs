//! Turn-based d20 battle resolver.
//!
//! A [`BattleState`] moves `PLAYER_TURN -> ENEMY_TURN -> PLAYER_TURN ...`
//! until one side drops to zero, then [`resolve_battle`] applies the result
//! to the profile. The caller drops the state afterwards so a battle is
//! resolved exactly once.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::attributes::{attack_bonus, defense, strength_modifier, weapon_bonus};
use crate::constants::{
    CAPTURE_HP_FLOOR, CRITICAL_ROLL, D20, DEFECTOR_CHANCE, DEFECTORS_MAX, DEFECTORS_MIN,
    ENEMY_DAMAGE_BONUS, ENEMY_WEAPON_DIE, FUMBLE_ROLL, LOOT_CHANCE, PLAYER_WEAPON_DIE,
    REWARD_GOLD_BASE, REWARD_GOLD_HP_DIVISOR, REWARD_RENOWN,
};
use crate::dice::DiceSource;
use crate::encounters::HostileParty;
use crate::items::{Item, market_catalog};
use crate::numbers::{clamp_i32_to_u32, u32_to_i32};
use crate::profile::CharacterProfile;
use crate::units::UnitType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattlePhase {
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl BattlePhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlayerTurn => "player turn",
            Self::EnemyTurn => "enemy turn",
            Self::Victory => "victory",
            Self::Defeat => "defeat",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatLogKind {
    Info,
    PlayerHit,
    PlayerMiss,
    EnemyHit,
    EnemyMiss,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: CombatLogKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
}

impl CombatLogEntry {
    fn new(text: String, kind: CombatLogKind, damage: Option<u32>) -> Self {
        Self { text, kind, damage }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weather {
    #[default]
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRewards {
    pub gold: u32,
    pub renown: u32,
}

impl BattleRewards {
    /// Rewards are fixed from the enemy's starting strength.
    #[must_use]
    pub const fn for_strength(enemy_max_hp: u32) -> Self {
        Self {
            gold: REWARD_GOLD_BASE + enemy_max_hp / REWARD_GOLD_HP_DIVISOR,
            renown: REWARD_RENOWN,
        }
    }
}

/// Player actions offered on the battle screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerAction {
    Attack,
    /// Shown but not yet available.
    Defend,
}

impl PlayerAction {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Attack)
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attack => "attack",
            Self::Defend => "defend",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("it is not the {expected} (battle is in {actual})")]
    WrongPhase {
        expected: BattlePhase,
        actual: BattlePhase,
    },
    #[error("{0} is not available yet")]
    ActionDisabled(PlayerAction),
    #[error("the battle is still being fought")]
    NotFinished,
}

/// Battle in progress. Hit points are signed so a killing blow can overshoot;
/// the stored value is floored at zero once a side falls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    pub turn: u32,
    pub phase: BattlePhase,
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub enemy_hp: i32,
    pub enemy_max_hp: i32,
    pub enemy_name: String,
    pub enemy_ac: i32,
    pub enemy_attack_bonus: i32,
    pub log: Vec<CombatLogEntry>,
    pub weather: Weather,
    pub rewards: BattleRewards,
}

impl BattleState {
    /// Open a battle against a hostile force of `strength` hit points.
    #[must_use]
    pub fn start(profile: &CharacterProfile, enemy_name: &str, strength: u32) -> Self {
        let hostile = HostileParty::from_strength(strength);
        let opening = format!(
            "Battle begins! You draw steel against {enemy_name} (AC {}).",
            hostile.armor_class
        );
        log::info!("battle vs {enemy_name}: hp {strength}, ac {}", hostile.armor_class);
        Self {
            turn: 1,
            phase: BattlePhase::PlayerTurn,
            player_hp: u32_to_i32(profile.stats.current_hp),
            player_max_hp: u32_to_i32(profile.stats.max_hp),
            enemy_hp: u32_to_i32(hostile.max_hp),
            enemy_max_hp: u32_to_i32(hostile.max_hp),
            enemy_name: enemy_name.to_string(),
            enemy_ac: hostile.armor_class,
            enemy_attack_bonus: hostile.attack_bonus,
            log: vec![CombatLogEntry::new(opening, CombatLogKind::Info, None)],
            weather: Weather::Clear,
            rewards: BattleRewards::for_strength(hostile.max_hp),
        }
    }

    fn expect_phase(&self, expected: BattlePhase) -> Result<(), CombatError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CombatError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}

/// Bonuses one side brings to an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attacker {
    pub attack_bonus: i32,
    pub weapon_die: u32,
    pub damage_modifier: i32,
}

impl Attacker {
    /// The player: strength modifier plus proficiency to hit, d8 plus
    /// strength modifier plus weapon bonus for damage.
    #[must_use]
    pub fn player(profile: &CharacterProfile) -> Self {
        Self {
            attack_bonus: attack_bonus(profile),
            weapon_die: PLAYER_WEAPON_DIE,
            damage_modifier: strength_modifier(profile) + weapon_bonus(profile),
        }
    }

    #[must_use]
    pub const fn enemy(battle: &BattleState) -> Self {
        Self {
            attack_bonus: battle.enemy_attack_bonus,
            weapon_die: ENEMY_WEAPON_DIE,
            damage_modifier: ENEMY_DAMAGE_BONUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Critical,
    Fumble,
    Hit,
    Miss,
}

/// Result of one attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    pub d20: u32,
    pub total: i32,
    pub outcome: AttackOutcome,
    pub damage: u32,
}

impl AttackRoll {
    #[must_use]
    pub const fn landed(&self) -> bool {
        matches!(self.outcome, AttackOutcome::Critical | AttackOutcome::Hit)
    }
}

/// Roll one attack against `defender_ac`.
///
/// A natural 20 always hits for two weapon dice, a natural 1 always misses.
/// Damage never goes below zero.
pub fn resolve_attack<D: DiceSource + ?Sized>(
    dice: &mut D,
    attacker: Attacker,
    defender_ac: i32,
) -> AttackRoll {
    let d20 = dice.roll(D20);
    let total = u32_to_i32(d20) + attacker.attack_bonus;
    let (outcome, dice_count) = if d20 == CRITICAL_ROLL {
        (AttackOutcome::Critical, 2)
    } else if d20 == FUMBLE_ROLL {
        (AttackOutcome::Fumble, 0)
    } else if total >= defender_ac {
        (AttackOutcome::Hit, 1)
    } else {
        (AttackOutcome::Miss, 0)
    };

    let damage = if dice_count == 0 {
        0
    } else {
        let rolled: i32 = (0..dice_count)
            .map(|_| u32_to_i32(dice.roll(attacker.weapon_die)))
            .sum();
        clamp_i32_to_u32(rolled + attacker.damage_modifier)
    };

    AttackRoll {
        d20,
        total,
        outcome,
        damage,
    }
}

/// The player's half of a round. Enemy HP at or below zero ends the battle
/// in victory immediately; otherwise the enemy is up.
///
/// # Errors
///
/// `WrongPhase` outside the player's turn, `ActionDisabled` for actions that
/// are modeled but not offered. Neither mutates the battle.
pub fn player_turn<D: DiceSource + ?Sized>(
    battle: &mut BattleState,
    profile: &CharacterProfile,
    action: PlayerAction,
    dice: &mut D,
) -> Result<AttackRoll, CombatError> {
    battle.expect_phase(BattlePhase::PlayerTurn)?;
    if !action.is_enabled() {
        return Err(CombatError::ActionDisabled(action));
    }

    let attacker = Attacker::player(profile);
    let roll = resolve_attack(dice, attacker, battle.enemy_ac);
    let bonus = attacker.attack_bonus;
    let entry = match roll.outcome {
        AttackOutcome::Critical => CombatLogEntry::new(
            format!("CRITICAL HIT! (Nat 20): A perfect blow! ({} damage)", roll.damage),
            CombatLogKind::Critical,
            Some(roll.damage),
        ),
        AttackOutcome::Fumble => CombatLogEntry::new(
            String::from("MISS (Nat 1): Your attack goes wide."),
            CombatLogKind::PlayerMiss,
            None,
        ),
        AttackOutcome::Hit => CombatLogEntry::new(
            format!(
                "HIT ({}+{bonus}): You wound the enemy. ({} damage)",
                roll.d20, roll.damage
            ),
            CombatLogKind::PlayerHit,
            Some(roll.damage),
        ),
        AttackOutcome::Miss => CombatLogEntry::new(
            format!("MISS ({}+{bonus}): Their armor holds.", roll.d20),
            CombatLogKind::PlayerMiss,
            None,
        ),
    };
    battle.log.push(entry);
    battle.enemy_hp -= u32_to_i32(roll.damage);

    if battle.enemy_hp <= 0 {
        battle.enemy_hp = 0;
        battle.phase = BattlePhase::Victory;
        log::info!("{} defeated on turn {}", battle.enemy_name, battle.turn);
    } else {
        battle.phase = BattlePhase::EnemyTurn;
    }
    Ok(roll)
}

/// The enemy's half of a round against the player's derived defense.
///
/// # Errors
///
/// `WrongPhase` unless the battle is waiting on the enemy.
pub fn enemy_turn<D: DiceSource + ?Sized>(
    battle: &mut BattleState,
    profile: &CharacterProfile,
    dice: &mut D,
) -> Result<AttackRoll, CombatError> {
    battle.expect_phase(BattlePhase::EnemyTurn)?;

    let roll = resolve_attack(dice, Attacker::enemy(battle), defense(profile));
    let entry = match roll.outcome {
        AttackOutcome::Critical => CombatLogEntry::new(
            format!("ENEMY CRITICAL! ({} damage)", roll.damage),
            CombatLogKind::Critical,
            Some(roll.damage),
        ),
        AttackOutcome::Hit => CombatLogEntry::new(
            format!("ENEMY HIT ({} damage)", roll.damage),
            CombatLogKind::EnemyHit,
            Some(roll.damage),
        ),
        AttackOutcome::Fumble | AttackOutcome::Miss => CombatLogEntry::new(
            String::from("You parry the blow."),
            CombatLogKind::EnemyMiss,
            None,
        ),
    };
    battle.log.push(entry);
    battle.player_hp -= u32_to_i32(roll.damage);

    if battle.player_hp <= 0 {
        battle.player_hp = 0;
        battle.phase = BattlePhase::Defeat;
        log::info!("player fell on turn {}", battle.turn);
    } else {
        battle.phase = BattlePhase::PlayerTurn;
        battle.turn = battle.turn.saturating_add(1);
    }
    Ok(roll)
}

/// What a finished battle did to the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleResolution {
    Victory {
        gold: u32,
        renown: u32,
        loot: Option<Item>,
        defectors: u32,
    },
    Captured {
        days: u32,
    },
}

/// Apply a finished battle to the profile.
///
/// Victory restores the battle HP to the profile, pays the fixed rewards and
/// rolls for one catalog loot item (50%) and bandit defectors (30%, 1 to 3).
/// Defeat makes the player a prisoner for `captivity_days` at 10 HP.
///
/// # Errors
///
/// `NotFinished` while neither side has fallen; nothing is applied.
pub fn resolve_battle<D: DiceSource + ?Sized>(
    battle: &BattleState,
    profile: &mut CharacterProfile,
    dice: &mut D,
    captivity_days: u32,
) -> Result<BattleResolution, CombatError> {
    match battle.phase {
        BattlePhase::Victory => {
            profile.stats.set_hp(battle.player_hp);
            profile.stats.credit(battle.rewards.gold);
            profile.clan.renown = profile.clan.renown.saturating_add(battle.rewards.renown);

            let loot = if dice.chance(LOOT_CHANCE) {
                let catalog = market_catalog();
                let pick = dice.index(catalog.len());
                catalog.into_iter().nth(pick)
            } else {
                None
            };
            if let Some(item) = &loot {
                profile.inventory.push(item.clone());
            }

            let defectors = if dice.chance(DEFECTOR_CHANCE) {
                dice.range(DEFECTORS_MIN, DEFECTORS_MAX)
            } else {
                0
            };
            profile.party.enlist(UnitType::Bandit, defectors);

            log::info!(
                "victory: +{} gold, loot {:?}, {defectors} defectors",
                battle.rewards.gold,
                loot.as_ref().map(|item| item.id.as_str())
            );
            Ok(BattleResolution::Victory {
                gold: battle.rewards.gold,
                renown: battle.rewards.renown,
                loot,
                defectors,
            })
        }
        BattlePhase::Defeat => {
            profile.is_prisoner = true;
            profile.prisoner_days_remaining = captivity_days;
            profile.stats.set_hp(u32_to_i32(CAPTURE_HP_FLOOR));
            log::info!("captured for {captivity_days} days");
            Ok(BattleResolution::Captured {
                days: captivity_days,
            })
        }
        BattlePhase::PlayerTurn | BattlePhase::EnemyTurn => Err(CombatError::NotFinished),
    }
}
