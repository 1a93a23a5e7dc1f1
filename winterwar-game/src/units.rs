//! Troop definitions and party roster stacks.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::world::Kingdom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    Peasant,
    ValgardInfantry,
    ValgardHuscarl,
    AethelgardSoldier,
    AethelgardKnight,
    SarrinArcher,
    SarrinMamluke,
    FyrodRanger,
    FyrodChampion,
    Mercenary,
    Bandit,
    Deserter,
}

impl UnitType {
    pub const ALL: [Self; 12] = [
        Self::Peasant,
        Self::ValgardInfantry,
        Self::ValgardHuscarl,
        Self::AethelgardSoldier,
        Self::AethelgardKnight,
        Self::SarrinArcher,
        Self::SarrinMamluke,
        Self::FyrodRanger,
        Self::FyrodChampion,
        Self::Mercenary,
        Self::Bandit,
        Self::Deserter,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Peasant => "peasant",
            Self::ValgardInfantry => "valgard_infantry",
            Self::ValgardHuscarl => "valgard_huscarl",
            Self::AethelgardSoldier => "aethelgard_soldier",
            Self::AethelgardKnight => "aethelgard_knight",
            Self::SarrinArcher => "sarrin_archer",
            Self::SarrinMamluke => "sarrin_mamluke",
            Self::FyrodRanger => "fyrod_ranger",
            Self::FyrodChampion => "fyrod_champion",
            Self::Mercenary => "mercenary",
            Self::Bandit => "bandit",
            Self::Deserter => "deserter",
        }
    }

    /// Entry-level troop each kingdom's towns offer.
    #[must_use]
    pub const fn basic_for(kingdom: Kingdom) -> Self {
        match kingdom {
            Kingdom::Valgard => Self::ValgardInfantry,
            Kingdom::Aethelgard => Self::AethelgardSoldier,
            Kingdom::Sarrin => Self::SarrinArcher,
            Kingdom::Fyrod => Self::FyrodRanger,
        }
    }

    /// Static definition for this unit type.
    #[must_use]
    pub const fn def(self) -> UnitDef {
        match self {
            Self::Peasant => UnitDef::new(
                "Village Volunteer",
                1,
                2,
                20,
                UnitRole::Infantry,
                30,
                5,
                0,
                &[Self::Mercenary],
            ),
            Self::Mercenary => UnitDef::new(
                "Sellsword",
                2,
                5,
                50,
                UnitRole::Infantry,
                50,
                10,
                5,
                &[],
            ),
            Self::ValgardInfantry => UnitDef::new(
                "Icebreaker Guard",
                2,
                8,
                60,
                UnitRole::Infantry,
                70,
                18,
                5,
                &[Self::ValgardHuscarl],
            ),
            Self::ValgardHuscarl => UnitDef::new(
                "Valgard Warlord",
                3,
                15,
                0,
                UnitRole::Infantry,
                100,
                25,
                15,
                &[],
            ),
            Self::AethelgardSoldier => UnitDef::new(
                "Sun Legionnaire",
                2,
                8,
                60,
                UnitRole::Infantry,
                60,
                12,
                12,
                &[Self::AethelgardKnight],
            ),
            Self::AethelgardKnight => UnitDef::new(
                "Imperial Knight",
                3,
                20,
                0,
                UnitRole::Cavalry,
                90,
                20,
                25,
                &[],
            ),
            Self::SarrinArcher => UnitDef::new(
                "Desert Scorpion",
                2,
                8,
                60,
                UnitRole::Archer,
                40,
                15,
                2,
                &[Self::SarrinMamluke],
            ),
            Self::SarrinMamluke => UnitDef::new(
                "Dune Rider",
                3,
                18,
                0,
                UnitRole::Cavalry,
                80,
                22,
                10,
                &[],
            ),
            Self::FyrodRanger => UnitDef::new(
                "Shadow Ranger",
                2,
                8,
                60,
                UnitRole::Archer,
                50,
                18,
                5,
                &[Self::FyrodChampion],
            ),
            Self::FyrodChampion => UnitDef::new(
                "Warden of the Wilds",
                3,
                16,
                0,
                UnitRole::Archer,
                70,
                28,
                8,
                &[],
            ),
            Self::Bandit => UnitDef::new(
                "Highwayman",
                1,
                0,
                0,
                UnitRole::Infantry,
                40,
                8,
                0,
                &[],
            ),
            Self::Deserter => UnitDef::new(
                "Turncoat Soldier",
                2,
                0,
                0,
                UnitRole::Infantry,
                60,
                15,
                5,
                &[],
            ),
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitRole {
    Infantry,
    Archer,
    Cavalry,
}

/// Per-soldier combat numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub hp: u32,
    pub attack: u32,
    /// Used as the unit's armor class base.
    pub defense: u32,
}

/// Fixed lookup entry describing a troop type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDef {
    pub name: &'static str,
    pub tier: u8,
    pub wage: u32,
    pub upgrade_cost: u32,
    pub role: UnitRole,
    pub stats: UnitStats,
    pub upgrades_to: &'static [UnitType],
}

impl UnitDef {
    #[allow(clippy::too_many_arguments)]
    const fn new(
        name: &'static str,
        tier: u8,
        wage: u32,
        upgrade_cost: u32,
        role: UnitRole,
        hp: u32,
        attack: u32,
        defense: u32,
        upgrades_to: &'static [UnitType],
    ) -> Self {
        Self {
            name,
            tier,
            wage,
            upgrade_cost,
            role,
            stats: UnitStats {
                hp,
                attack,
                defense,
            },
            upgrades_to,
        }
    }
}

/// A roster entry aggregating identical soldiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStack {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub name: String,
    pub count: u32,
    pub tier: u8,
    pub wage: u32,
    pub role: UnitRole,
    pub stats: UnitStats,
}

impl UnitStack {
    /// Fresh stack built from the static definition table.
    #[must_use]
    pub fn from_def(unit_type: UnitType, count: u32) -> Self {
        let def = unit_type.def();
        Self {
            unit_type,
            name: def.name.to_string(),
            count,
            tier: def.tier,
            wage: def.wage,
            role: def.role,
            stats: def.stats,
        }
    }

    /// Daily upkeep for the whole stack.
    #[must_use]
    pub const fn upkeep(&self) -> u32 {
        self.wage.saturating_mul(self.count)
    }
}

/// Ordered party roster. Unit types are unique within the party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party(Vec<UnitStack>);

impl Party {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add soldiers, merging into an existing stack of the same type.
    pub fn enlist(&mut self, unit_type: UnitType, count: u32) {
        if count == 0 {
            return;
        }
        if let Some(stack) = self.stack_mut(unit_type) {
            stack.count = stack.count.saturating_add(count);
        } else {
            self.0.push(UnitStack::from_def(unit_type, count));
        }
    }

    #[must_use]
    pub fn stack(&self, unit_type: UnitType) -> Option<&UnitStack> {
        self.0.iter().find(|stack| stack.unit_type == unit_type)
    }

    fn stack_mut(&mut self, unit_type: UnitType) -> Option<&mut UnitStack> {
        self.0.iter_mut().find(|stack| stack.unit_type == unit_type)
    }

    /// Sum of wage times count across every stack.
    #[must_use]
    pub fn daily_wages(&self) -> u32 {
        self.0
            .iter()
            .fold(0u32, |total, stack| total.saturating_add(stack.upkeep()))
    }

    /// Total soldiers across every stack.
    #[must_use]
    pub fn headcount(&self) -> u32 {
        self.0
            .iter()
            .fold(0u32, |total, stack| total.saturating_add(stack.count))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnitStack> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enlisting_same_type_merges_stacks() {
        let mut party = Party::new();
        party.enlist(UnitType::Mercenary, 1);
        party.enlist(UnitType::Mercenary, 1);
        assert_eq!(party.len(), 1);
        assert_eq!(party.stack(UnitType::Mercenary).map(|s| s.count), Some(2));

        party.enlist(UnitType::Bandit, 3);
        assert_eq!(party.len(), 2);
        assert_eq!(party.headcount(), 5);
    }

    #[test]
    fn zero_count_enlist_is_ignored() {
        let mut party = Party::new();
        party.enlist(UnitType::Peasant, 0);
        assert!(party.is_empty());
    }

    #[test]
    fn wages_sum_over_stacks() {
        let mut party = Party::new();
        party.enlist(UnitType::Mercenary, 3);
        party.enlist(UnitType::ValgardInfantry, 2);
        party.enlist(UnitType::Bandit, 4);
        assert_eq!(party.daily_wages(), 3 * 5 + 2 * 8);
    }

    #[test]
    fn upgrade_paths_point_to_higher_tiers() {
        for unit in UnitType::ALL {
            let def = unit.def();
            for next in def.upgrades_to {
                assert!(next.def().tier > def.tier, "{unit} upgrades sideways");
            }
        }
    }

    #[test]
    fn kingdom_basic_units_are_tier_two() {
        for kingdom in Kingdom::ALL {
            assert_eq!(UnitType::basic_for(kingdom).def().tier, 2);
        }
    }
}
