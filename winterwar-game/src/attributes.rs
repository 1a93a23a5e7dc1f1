//! Attribute model and derived combat statistics.
//!
//! Everything here is a pure function of its inputs. Derived numbers are
//! recomputed on demand from the profile and never cached.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    ARMOR_AC_BASELINE, BASE_AC, BASE_ATTRIBUTE, BASE_GOLD, BASE_HP, BASE_SPEED, CITY_GOLD_BONUS,
    DEFAULT_CLAN_NAME, DEFAULT_HERO_NAME, HP_PER_CON, PLAYER_PROFICIENCY, SMITH_GOLD_BONUS,
    STARTING_DAY, STARTING_FOOD, STARTING_HOUR, STARTING_MORALE,
};
use crate::items::{EquipSlot, Equipment};
use crate::numbers::attribute_modifier;
use crate::profile::{Banner, CharacterProfile, Clan, PlayerStats};
use crate::time::GameTime;
use crate::units::Party;

/// D&D-style ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "str")]
    pub strength: u32,
    #[serde(rename = "dex")]
    pub dexterity: u32,
    #[serde(rename = "con")]
    pub constitution: u32,
    #[serde(rename = "int")]
    pub intelligence: u32,
    #[serde(rename = "wis")]
    pub wisdom: u32,
    #[serde(rename = "cha")]
    pub charisma: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: BASE_ATTRIBUTE,
            dexterity: BASE_ATTRIBUTE,
            constitution: BASE_ATTRIBUTE,
            intelligence: BASE_ATTRIBUTE,
            wisdom: BASE_ATTRIBUTE,
            charisma: BASE_ATTRIBUTE,
        }
    }
}

impl Attributes {
    fn apply(&mut self, bonus: AttributeBonus) {
        self.strength += bonus.strength;
        self.dexterity += bonus.dexterity;
        self.constitution += bonus.constitution;
        self.intelligence += bonus.intelligence;
        self.wisdom += bonus.wisdom;
        self.charisma += bonus.charisma;
    }
}

/// Additive creation-time modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeBonus {
    pub strength: u32,
    pub dexterity: u32,
    pub constitution: u32,
    pub intelligence: u32,
    pub wisdom: u32,
    pub charisma: u32,
    pub gold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Culture {
    Steppe,
    Mountain,
    City,
}

impl Culture {
    #[must_use]
    pub const fn bonus(self) -> AttributeBonus {
        let none = AttributeBonus {
            strength: 0,
            dexterity: 0,
            constitution: 0,
            intelligence: 0,
            wisdom: 0,
            charisma: 0,
            gold: 0,
        };
        match self {
            Self::Steppe => AttributeBonus {
                dexterity: 2,
                constitution: 1,
                ..none
            },
            Self::Mountain => AttributeBonus {
                strength: 2,
                constitution: 1,
                ..none
            },
            Self::City => AttributeBonus {
                intelligence: 2,
                charisma: 1,
                gold: CITY_GOLD_BONUS,
                ..none
            },
        }
    }

    /// Map node the character starts on.
    #[must_use]
    pub const fn starting_location(self) -> &'static str {
        match self {
            Self::Steppe => "n1",
            Self::City => "n4",
            Self::Mountain => "n7",
        }
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Steppe => "steppe",
            Self::Mountain => "mountain",
            Self::City => "city",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Background {
    Smith,
    Poacher,
    Orphan,
}

impl Background {
    #[must_use]
    pub const fn bonus(self) -> AttributeBonus {
        let none = AttributeBonus {
            strength: 0,
            dexterity: 0,
            constitution: 0,
            intelligence: 0,
            wisdom: 0,
            charisma: 0,
            gold: 0,
        };
        match self {
            Self::Smith => AttributeBonus {
                strength: 2,
                gold: SMITH_GOLD_BONUS,
                ..none
            },
            Self::Poacher => AttributeBonus {
                dexterity: 2,
                wisdom: 1,
                ..none
            },
            Self::Orphan => AttributeBonus {
                dexterity: 1,
                constitution: 2,
                ..none
            },
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Smith => "smith",
            Self::Poacher => "poacher",
            Self::Orphan => "orphan",
        })
    }
}

/// Choices collected by the character creation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub clan_name: String,
    pub culture: Culture,
    pub background: Background,
    #[serde(default)]
    pub banner: Banner,
}

impl CharacterDraft {
    /// Draft with blank names and the default banner.
    #[must_use]
    pub fn new(culture: Culture, background: Background) -> Self {
        Self {
            name: String::new(),
            clan_name: String::new(),
            culture,
            background,
            banner: Banner::default(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: &str, clan_name: &str) -> Self {
        self.name = name.to_string();
        self.clan_name = clan_name.to_string();
        self
    }
}

/// Maximum hit points for a constitution score.
#[must_use]
pub const fn max_hp_for(constitution: u32) -> u32 {
    BASE_HP + HP_PER_CON * constitution
}

/// Unarmored armor class for a dexterity score.
#[must_use]
pub fn starting_ac(dexterity: u32) -> i32 {
    BASE_AC + attribute_modifier(dexterity)
}

/// Finalize a draft into a fresh campaign profile.
#[must_use]
pub fn create_profile(draft: &CharacterDraft) -> CharacterProfile {
    let culture = draft.culture.bonus();
    let background = draft.background.bonus();

    let mut attributes = Attributes::default();
    attributes.apply(culture);
    attributes.apply(background);
    let gold = BASE_GOLD + culture.gold + background.gold;
    let max_hp = max_hp_for(attributes.constitution);

    CharacterProfile {
        name: non_blank(&draft.name, DEFAULT_HERO_NAME),
        culture: draft.culture,
        background: draft.background,
        stats: PlayerStats {
            attributes,
            gold,
            food: STARTING_FOOD,
            current_hp: max_hp,
            max_hp,
            morale: STARTING_MORALE,
            speed: BASE_SPEED,
            base_ac: starting_ac(attributes.dexterity),
        },
        clan: Clan {
            name: non_blank(&draft.clan_name, DEFAULT_CLAN_NAME),
            tier: 0,
            renown: 0,
            influence: 0,
            companions: Vec::new(),
            banner: draft.banner.clone(),
        },
        party: Party::new(),
        inventory: Vec::new(),
        equipment: Equipment::default(),
        known_lords: Vec::new(),
        active_quests: Vec::new(),
        current_location_id: Some(draft.culture.starting_location().to_string()),
        time: GameTime::new(STARTING_DAY, STARTING_HOUR),
        is_prisoner: false,
        prisoner_days_remaining: 0,
        at_war_with: Vec::new(),
    }
}

fn non_blank(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Strength modifier added to every player damage roll.
#[must_use]
pub fn strength_modifier(profile: &CharacterProfile) -> i32 {
    attribute_modifier(profile.stats.attributes.strength)
}

/// Bonus added to the player's d20 when attacking.
#[must_use]
pub fn attack_bonus(profile: &CharacterProfile) -> i32 {
    strength_modifier(profile) + PLAYER_PROFICIENCY
}

/// Damage bonus of the equipped weapon, zero when unarmed.
#[must_use]
pub fn weapon_bonus(profile: &CharacterProfile) -> i32 {
    profile.equipment.bonus(EquipSlot::Weapon)
}

/// Attack power shown on the character sheet.
#[must_use]
pub fn attack_power(profile: &CharacterProfile) -> i32 {
    attack_bonus(profile) + weapon_bonus(profile)
}

/// Armor class enemies must meet to hit the player.
///
/// Armor bonuses are absolute (10 is unarmored) so only the excess counts;
/// helmets add their bonus directly. Horses do not contribute.
#[must_use]
pub fn defense(profile: &CharacterProfile) -> i32 {
    let equipment = &profile.equipment;
    let armor = equipment
        .get(EquipSlot::Armor)
        .map_or(0, |item| item.stat_bonus - ARMOR_AC_BASELINE);
    profile.stats.base_ac + armor + equipment.bonus(EquipSlot::Helmet)
}

/// Map movement speed.
///
/// An equipped horse is deliberately ignored here: its bonus is displayed on
/// the character sheet but has never affected travel time.
#[must_use]
pub const fn movement_speed(profile: &CharacterProfile) -> f64 {
    profile.stats.speed
}

/// Natural healing applied each time a day rolls over.
#[must_use]
pub fn daily_healing(profile: &CharacterProfile) -> u32 {
    profile.stats.attributes.constitution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::catalog_item;

    #[test]
    fn mountain_smith_starts_strong() {
        let profile = create_profile(&CharacterDraft::new(Culture::Mountain, Background::Smith));
        let attrs = profile.stats.attributes;
        assert_eq!(attrs.strength, 14);
        assert_eq!(attrs.constitution, 11);
        assert_eq!(attrs.dexterity, 10);
        assert_eq!(profile.stats.gold, 70);
        assert_eq!(profile.stats.max_hp, 47);
        assert_eq!(profile.stats.current_hp, 47);
        assert_eq!(profile.stats.base_ac, 10);
        assert_eq!(profile.current_location_id.as_deref(), Some("n7"));
        assert_eq!(attack_bonus(&profile), 4);
    }

    #[test]
    fn city_poacher_gets_city_gold_and_dex_ac() {
        let profile = create_profile(&CharacterDraft::new(Culture::City, Background::Poacher));
        let attrs = profile.stats.attributes;
        assert_eq!(attrs.intelligence, 12);
        assert_eq!(attrs.charisma, 11);
        assert_eq!(attrs.dexterity, 12);
        assert_eq!(attrs.wisdom, 11);
        assert_eq!(profile.stats.gold, 100);
        assert_eq!(profile.stats.base_ac, 11);
        assert_eq!(profile.current_location_id.as_deref(), Some("n4"));
    }

    #[test]
    fn steppe_orphan_is_hardy() {
        let profile = create_profile(&CharacterDraft::new(Culture::Steppe, Background::Orphan));
        let attrs = profile.stats.attributes;
        assert_eq!(attrs.dexterity, 13);
        assert_eq!(attrs.constitution, 13);
        assert_eq!(profile.stats.max_hp, 51);
        assert_eq!(profile.stats.base_ac, 11);
        assert_eq!(profile.stats.gold, 50);
        assert_eq!(profile.current_location_id.as_deref(), Some("n1"));
        assert_eq!(profile.time.day, 1);
        assert_eq!(profile.time.hour, 8);
    }

    #[test]
    fn blank_names_fall_back_and_names_pass_through() {
        let anonymous = create_profile(&CharacterDraft::new(Culture::City, Background::Smith));
        assert_eq!(anonymous.name, DEFAULT_HERO_NAME);
        assert_eq!(anonymous.clan.name, DEFAULT_CLAN_NAME);

        let named = create_profile(
            &CharacterDraft::new(Culture::City, Background::Smith)
                .named("Ragnar", "Northern Wolves"),
        );
        assert_eq!(named.name, "Ragnar");
        assert_eq!(named.clan.name, "Northern Wolves");
    }

    #[test]
    fn gear_feeds_derived_stats() {
        let mut profile =
            create_profile(&CharacterDraft::new(Culture::Mountain, Background::Smith));
        assert_eq!(attack_power(&profile), 4);
        assert_eq!(defense(&profile), 10);

        profile.equipment.weapon = catalog_item("w2");
        profile.equipment.armor = catalog_item("a2");
        profile.equipment.helmet = catalog_item("h1");
        profile.equipment.horse = catalog_item("ho1");

        assert_eq!(attack_power(&profile), 10);
        assert_eq!(attack_bonus(&profile), 4);
        assert_eq!(defense(&profile), 10 + 5 + 1);
        assert!((movement_speed(&profile) - BASE_SPEED).abs() < f64::EPSILON);
    }

    #[test]
    fn weak_characters_get_negative_modifiers() {
        let mut profile = create_profile(&CharacterDraft::new(Culture::City, Background::Orphan));
        profile.stats.attributes.strength = 7;
        assert_eq!(strength_modifier(&profile), -2);
        assert_eq!(attack_bonus(&profile), 0);
        assert_eq!(starting_ac(8), 9);
    }
}
