//! Items, equipment slots and the market catalog.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Weapon,
    Helmet,
    Armor,
    Horse,
    TradeGood,
    Food,
    Scroll,
}

impl ItemType {
    /// Equipment slot this item occupies when equipped, if any.
    #[must_use]
    pub const fn slot(self) -> Option<EquipSlot> {
        match self {
            Self::Weapon => Some(EquipSlot::Weapon),
            Self::Helmet => Some(EquipSlot::Helmet),
            Self::Armor => Some(EquipSlot::Armor),
            Self::Horse => Some(EquipSlot::Horse),
            Self::TradeGood | Self::Food | Self::Scroll => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Helmet => "helmet",
            Self::Armor => "armor",
            Self::Horse => "horse",
            Self::TradeGood => "trade_good",
            Self::Food => "food",
            Self::Scroll => "scroll",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A carried, equipped or stocked item.
///
/// `stat_bonus` reads differently per type: damage for weapons, armor class
/// for armor (absolute, 10 is unarmored) and helmets (additive), speed for
/// horses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub value: u32,
    pub stat_bonus: i32,
    pub tier: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Item {
    #[must_use]
    pub fn new(
        id: &str,
        name: &str,
        kind: ItemType,
        value: u32,
        stat_bonus: i32,
        tier: u8,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            value,
            stat_bonus,
            tier,
            description: None,
        }
    }

    /// Whether this item can occupy an equipment slot.
    #[must_use]
    pub const fn is_equippable(&self) -> bool {
        self.kind.slot().is_some()
    }
}

/// Equipment slots on the paper doll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipSlot {
    Weapon,
    Helmet,
    Armor,
    Horse,
}

impl EquipSlot {
    pub const ALL: [Self; 4] = [Self::Weapon, Self::Helmet, Self::Armor, Self::Horse];
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weapon => "weapon",
            Self::Helmet => "helmet",
            Self::Armor => "armor",
            Self::Horse => "horse",
        })
    }
}

/// Items currently worn. Each slot holds at most one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub helmet: Option<Item>,
    pub armor: Option<Item>,
    pub horse: Option<Item>,
}

impl Equipment {
    #[must_use]
    pub const fn get(&self, slot: EquipSlot) -> Option<&Item> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Helmet => self.helmet.as_ref(),
            EquipSlot::Armor => self.armor.as_ref(),
            EquipSlot::Horse => self.horse.as_ref(),
        }
    }

    pub const fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<Item> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Helmet => &mut self.helmet,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Horse => &mut self.horse,
        }
    }

    /// Number of filled slots.
    #[must_use]
    pub fn filled(&self) -> usize {
        EquipSlot::ALL
            .iter()
            .filter(|slot| self.get(**slot).is_some())
            .count()
    }

    /// Bonus of the item in `slot`, zero when empty.
    #[must_use]
    pub fn bonus(&self, slot: EquipSlot) -> i32 {
        self.get(slot).map_or(0, |item| item.stat_bonus)
    }
}

/// Everything a market can stock, in catalog order.
#[must_use]
pub fn market_catalog() -> Vec<Item> {
    vec![
        Item::new("f1", "Sack of Grain", ItemType::Food, 10, 0, 1),
        Item::new("f2", "Dried Meat", ItemType::Food, 25, 0, 1),
        Item::new("w1", "Rusty Sword", ItemType::Weapon, 40, 4, 1),
        Item::new("w2", "Iron Axe", ItemType::Weapon, 120, 6, 2),
        Item::new("w3", "Knight's Sword", ItemType::Weapon, 450, 8, 3),
        Item::new("a1", "Leather Armor", ItemType::Armor, 100, 12, 1),
        Item::new("a2", "Chain Mail", ItemType::Armor, 350, 15, 2),
        Item::new("a3", "Plate Armor", ItemType::Armor, 1200, 18, 4),
        Item::new("h1", "Leather Cap", ItemType::Helmet, 50, 1, 1),
        Item::new("ho1", "War Horse", ItemType::Horse, 500, 5, 3),
    ]
}

/// Catalog entry by id.
#[must_use]
pub fn catalog_item(item_id: &str) -> Option<Item> {
    market_catalog().into_iter().find(|item| item.id == item_id)
}
