//! All-or-nothing economy and roster transactions.
//!
//! Every operation validates first and mutates only on success, so a
//! rejected transaction leaves the profile and market exactly as they were.
use thiserror::Error;

use crate::constants::{SELL_RATIO_DENOMINATOR, SELL_RATIO_NUMERATOR};
use crate::items::{EquipSlot, Item, ItemType};
use crate::profile::CharacterProfile;
use crate::units::UnitType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
    #[error("the market does not stock {0}")]
    NotForSale(String),
    #[error("you do not carry {0}")]
    NotOwned(String),
    #[error("{name} ({kind}) cannot be equipped")]
    NotEquippable { name: String, kind: ItemType },
    #[error("nothing is equipped in the {0} slot")]
    SlotEmpty(EquipSlot),
}

/// Price the market pays for an item: 70% of its value, rounded down.
#[must_use]
pub const fn sell_price(item: &Item) -> u32 {
    item.value.saturating_mul(SELL_RATIO_NUMERATOR) / SELL_RATIO_DENOMINATOR
}

fn charge(profile: &mut CharacterProfile, amount: u32) -> Result<(), TransactionError> {
    if profile.stats.try_spend(amount) {
        Ok(())
    } else {
        Err(TransactionError::InsufficientFunds {
            needed: amount,
            available: profile.stats.gold,
        })
    }
}

/// Buy the first stocked item with `item_id`, moving it from the market into
/// the inventory.
///
/// # Errors
///
/// `NotForSale` for unknown ids, `InsufficientFunds` when gold is short.
pub fn buy(
    profile: &mut CharacterProfile,
    market: &mut Vec<Item>,
    item_id: &str,
) -> Result<Item, TransactionError> {
    let Some(position) = market.iter().position(|item| item.id == item_id) else {
        return Err(TransactionError::NotForSale(item_id.to_string()));
    };
    charge(profile, market[position].value)?;
    let item = market.remove(position);
    profile.inventory.push(item.clone());
    Ok(item)
}

/// Sell the first carried item with `item_id`. The item joins the market
/// pool. Returns the gold received.
///
/// # Errors
///
/// `NotOwned` when no carried item matches. Equipped items must be
/// unequipped first.
pub fn sell(
    profile: &mut CharacterProfile,
    market: &mut Vec<Item>,
    item_id: &str,
) -> Result<(Item, u32), TransactionError> {
    let Some(position) = profile.inventory_position(item_id) else {
        return Err(TransactionError::NotOwned(item_id.to_string()));
    };
    let item = profile.inventory.remove(position);
    let price = sell_price(&item);
    profile.stats.credit(price);
    market.push(item.clone());
    Ok((item, price))
}

/// Hire one soldier of `unit_type` for `cost` gold.
///
/// # Errors
///
/// `InsufficientFunds` when gold is short.
pub fn recruit(
    profile: &mut CharacterProfile,
    unit_type: UnitType,
    cost: u32,
) -> Result<(), TransactionError> {
    charge(profile, cost)?;
    profile.party.enlist(unit_type, 1);
    Ok(())
}

/// Move a carried item into its slot. Whatever occupied the slot goes back to
/// the inventory and is returned.
///
/// # Errors
///
/// `NotOwned` or `NotEquippable`.
pub fn equip(
    profile: &mut CharacterProfile,
    item_id: &str,
) -> Result<Option<Item>, TransactionError> {
    let Some(position) = profile.inventory_position(item_id) else {
        return Err(TransactionError::NotOwned(item_id.to_string()));
    };
    let candidate = &profile.inventory[position];
    let Some(slot) = candidate.kind.slot() else {
        return Err(TransactionError::NotEquippable {
            name: candidate.name.clone(),
            kind: candidate.kind,
        });
    };
    let item = profile.inventory.remove(position);
    let previous = profile.equipment.slot_mut(slot).replace(item);
    if let Some(old) = &previous {
        profile.inventory.push(old.clone());
    }
    Ok(previous)
}

/// Move the item in `slot` back to the inventory.
///
/// # Errors
///
/// `SlotEmpty` when there is nothing to remove.
pub fn unequip(profile: &mut CharacterProfile, slot: EquipSlot) -> Result<Item, TransactionError> {
    let Some(item) = profile.equipment.slot_mut(slot).take() else {
        return Err(TransactionError::SlotEmpty(slot));
    };
    profile.inventory.push(item.clone());
    Ok(item)
}

/// Hand over `amount` gold to buy safe passage.
///
/// # Errors
///
/// `InsufficientFunds` when gold is short.
pub fn pay_tribute(profile: &mut CharacterProfile, amount: u32) -> Result<(), TransactionError> {
    charge(profile, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Background, CharacterDraft, Culture, create_profile};
    use crate::items::catalog_item;

    fn profile_with_gold(gold: u32) -> CharacterProfile {
        let mut profile = create_profile(&CharacterDraft::new(Culture::City, Background::Smith));
        profile.stats.gold = gold;
        profile
    }

    fn stock(ids: &[&str]) -> Vec<Item> {
        ids.iter().filter_map(|id| catalog_item(id)).collect()
    }

    #[test]
    fn buy_moves_item_and_charges_value() {
        let mut profile = profile_with_gold(150);
        let mut market = stock(&["w2", "f1"]);
        let item = buy(&mut profile, &mut market, "w2").unwrap();
        assert_eq!(item.id, "w2");
        assert_eq!(profile.stats.gold, 30);
        assert_eq!(profile.inventory.len(), 1);
        assert_eq!(market.len(), 1);
    }

    #[test]
    fn buy_rejects_without_mutation() {
        let mut profile = profile_with_gold(100);
        let mut market = stock(&["a2"]);
        let before = (profile.clone(), market.clone());
        assert_eq!(
            buy(&mut profile, &mut market, "a2"),
            Err(TransactionError::InsufficientFunds {
                needed: 350,
                available: 100
            })
        );
        assert_eq!(
            buy(&mut profile, &mut market, "zz"),
            Err(TransactionError::NotForSale("zz".into()))
        );
        assert_eq!((profile, market), before);
    }

    #[test]
    fn sell_pays_seventy_percent_rounded_down() {
        let mut profile = profile_with_gold(0);
        profile.inventory = stock(&["f2", "f2"]);
        let mut market = Vec::new();
        let (item, price) = sell(&mut profile, &mut market, "f2").unwrap();
        assert_eq!(item.id, "f2");
        assert_eq!(price, 17);
        assert_eq!(profile.stats.gold, 17);
        assert_eq!(profile.inventory.len(), 1);
        assert_eq!(market.len(), 1);
        assert_eq!(
            sell(&mut profile, &mut market, "w3"),
            Err(TransactionError::NotOwned("w3".into()))
        );
    }

    #[test]
    fn recruiting_twice_merges_into_one_stack() {
        let mut profile = profile_with_gold(200);
        recruit(&mut profile, UnitType::Mercenary, 100).unwrap();
        recruit(&mut profile, UnitType::Mercenary, 100).unwrap();
        assert_eq!(profile.party.len(), 1);
        assert_eq!(profile.party.stack(UnitType::Mercenary).map(|s| s.count), Some(2));
        assert_eq!(profile.stats.gold, 0);
        assert!(recruit(&mut profile, UnitType::Mercenary, 100).is_err());
        assert_eq!(profile.party.headcount(), 2);
    }

    #[test]
    fn equip_swaps_and_conserves_items() {
        let mut profile = profile_with_gold(0);
        profile.inventory = stock(&["w1", "w2", "f1"]);
        let total = profile.total_items();

        assert_eq!(equip(&mut profile, "w1").unwrap(), None);
        let replaced = equip(&mut profile, "w2").unwrap();
        assert_eq!(replaced.map(|item| item.id), Some(String::from("w1")));
        assert_eq!(profile.equipment.weapon.as_ref().map(|i| i.id.as_str()), Some("w2"));
        assert_eq!(profile.total_items(), total);

        let removed = unequip(&mut profile, EquipSlot::Weapon).unwrap();
        assert_eq!(removed.id, "w2");
        assert_eq!(profile.total_items(), total);
        assert_eq!(
            unequip(&mut profile, EquipSlot::Weapon),
            Err(TransactionError::SlotEmpty(EquipSlot::Weapon))
        );
    }

    #[test]
    fn food_cannot_be_equipped() {
        let mut profile = profile_with_gold(0);
        profile.inventory = stock(&["f1"]);
        let before = profile.clone();
        assert!(matches!(
            equip(&mut profile, "f1"),
            Err(TransactionError::NotEquippable { kind: ItemType::Food, .. })
        ));
        assert_eq!(profile, before);
    }

    #[test]
    fn tribute_is_gold_validated() {
        let mut profile = profile_with_gold(99);
        assert!(pay_tribute(&mut profile, 100).is_err());
        assert_eq!(profile.stats.gold, 99);
        profile.stats.gold = 130;
        pay_tribute(&mut profile, 100).unwrap();
        assert_eq!(profile.stats.gold, 30);
    }
}
