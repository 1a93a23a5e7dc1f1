//! The character profile: the single root aggregate of a campaign.
use serde::{Deserialize, Serialize};

use crate::attributes::{Attributes, Background, Culture};
use crate::items::{Equipment, Item};
use crate::time::GameTime;
use crate::units::Party;
use crate::world::Kingdom;

/// Resource pool and vital statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub attributes: Attributes,
    pub gold: u32,
    pub food: u32,
    pub current_hp: u32,
    pub max_hp: u32,
    pub morale: u32,
    pub speed: f64,
    pub base_ac: i32,
}

impl PlayerStats {
    /// Deduct gold only when the full amount is available.
    ///
    /// Returns `false` and leaves the purse untouched otherwise.
    pub fn try_spend(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(remaining) => {
                self.gold = remaining;
                true
            }
            None => false,
        }
    }

    /// Deduct up to `amount` gold, flooring the purse at zero. Returns what was taken.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.gold);
        self.gold -= taken;
        taken
    }

    pub const fn credit(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Restore hit points without exceeding max. Returns the amount healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        self.current_hp - before
    }

    /// Set hit points, clamped into `0..=max_hp`.
    pub fn set_hp(&mut self, hp: i32) {
        self.current_hp = crate::numbers::clamp_i32_to_u32(hp).min(self.max_hp);
    }

    pub const fn wound(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sigil {
    Wolf,
    Bear,
    Eagle,
    Sword,
    Skull,
    Tree,
}

/// Purely cosmetic clan heraldry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub color: String,
    pub sigil: Sigil,
    pub sigil_color: String,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            color: String::from("#1e3a8a"),
            sigil: Sigil::Sword,
            sigil_color: String::from("#fbbf24"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanionRole {
    Scout,
    Medic,
    Quartermaster,
    Warrior,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Companion {
    pub id: String,
    pub name: String,
    pub role: CompanionRole,
    pub story: String,
    pub cost: u32,
    pub wage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clan {
    pub name: String,
    pub tier: u32,
    pub renown: u32,
    pub influence: u32,
    pub companions: Vec<Companion>,
    pub banner: Banner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Personality {
    Honorable,
    Cruel,
    Calculating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lord {
    pub id: String,
    pub name: String,
    pub clan_name: String,
    pub kingdom: Kingdom,
    pub relation: i32,
    pub strength: u32,
    pub personality: Personality,
    pub is_met: bool,
    pub location_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestKind {
    DeliverItems,
    HuntBandits,
    TrainTroops,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub giver_id: String,
    pub title: String,
    pub description: String,
    pub reward_gold: u32,
    pub reward_relation: i32,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    pub target_amount: u32,
    pub current_amount: u32,
    pub is_active: bool,
}

/// Root aggregate for a campaign session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub culture: Culture,
    pub background: Background,
    pub stats: PlayerStats,
    pub clan: Clan,
    pub party: Party,
    pub inventory: Vec<Item>,
    pub equipment: Equipment,
    pub known_lords: Vec<Lord>,
    pub active_quests: Vec<Quest>,
    pub current_location_id: Option<String>,
    pub time: GameTime,
    pub is_prisoner: bool,
    pub prisoner_days_remaining: u32,
    pub at_war_with: Vec<Kingdom>,
}

impl CharacterProfile {
    /// Items carried plus items worn.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.inventory.len() + self.equipment.filled()
    }

    /// Position of the first carried item with `item_id`.
    #[must_use]
    pub fn inventory_position(&self, item_id: &str) -> Option<usize> {
        self.inventory.iter().position(|item| item.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{CharacterDraft, create_profile};

    fn stats() -> PlayerStats {
        create_profile(&CharacterDraft::new(Culture::Steppe, Background::Orphan)).stats
    }

    #[test]
    fn try_spend_rejects_without_mutation() {
        let mut stats = stats();
        stats.gold = 30;
        assert!(!stats.try_spend(31));
        assert_eq!(stats.gold, 30);
        assert!(stats.try_spend(30));
        assert_eq!(stats.gold, 0);
    }

    #[test]
    fn drain_floors_at_zero() {
        let mut stats = stats();
        stats.gold = 12;
        assert_eq!(stats.drain(40), 12);
        assert_eq!(stats.gold, 0);
    }

    #[test]
    fn hp_helpers_clamp() {
        let mut stats = stats();
        stats.set_hp(-5);
        assert_eq!(stats.current_hp, 0);
        assert_eq!(stats.heal(1_000), stats.max_hp);
        stats.set_hp(i32::MAX);
        assert_eq!(stats.current_hp, stats.max_hp);
        stats.wound(u32::MAX);
        assert_eq!(stats.current_hp, 0);
    }
}
