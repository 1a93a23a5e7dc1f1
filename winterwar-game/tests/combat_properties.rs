//! Property tests for attack resolution, the purse and the clock.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use winterwar_game::combat::Attacker;
use winterwar_game::items::catalog_item;
use winterwar_game::{
    AttackOutcome, Background, CharacterDraft, CharacterProfile, Culture, EquipSlot, ScriptedDice,
    UnitType, advance_time, buy, create_profile, equip, market_catalog, recruit, resolve_attack,
    sell, unequip,
};

fn profile() -> CharacterProfile {
    create_profile(&CharacterDraft::new(Culture::City, Background::Smith))
}

fn attacker(attack_bonus: i32, weapon_die: u32, damage_modifier: i32) -> Attacker {
    Attacker {
        attack_bonus,
        weapon_die,
        damage_modifier,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn natural_one_never_deals_damage(
        bonus in -5i32..30,
        modifier in -5i32..20,
        die in prop::sample::select(vec![6u32, 8]),
        ac in 0i32..30,
        faces in prop::collection::vec(1u32..=8, 2),
    ) {
        let mut dice = ScriptedDice::new().with_values([1].into_iter().chain(faces));
        let roll = resolve_attack(&mut dice, attacker(bonus, die, modifier), ac);
        prop_assert_eq!(roll.outcome, AttackOutcome::Fumble);
        prop_assert_eq!(roll.damage, 0);
    }

    #[test]
    fn natural_twenty_always_hits_for_two_dice(
        bonus in -5i32..10,
        modifier in -3i32..10,
        ac in 0i32..40,
        first in 1u32..=8,
        second in 1u32..=8,
    ) {
        let mut dice = ScriptedDice::new().with_values([20, first, second]);
        let roll = resolve_attack(&mut dice, attacker(bonus, 8, modifier), ac);
        prop_assert!(roll.landed());
        let expected = i32::try_from(first + second).unwrap() + modifier;
        prop_assert_eq!(i64::from(roll.damage), i64::from(expected.max(0)));
        prop_assert!(i64::from(roll.damage) >= i64::from((2 + modifier).max(0)));
    }

    #[test]
    fn damage_implies_a_legitimate_hit(
        d20 in 1u32..=20,
        bonus in -5i32..15,
        modifier in -5i32..10,
        ac in 5i32..25,
        face in 1u32..=6,
    ) {
        let mut dice = ScriptedDice::new().with_values([d20, face, face]);
        let roll = resolve_attack(&mut dice, attacker(bonus, 6, modifier), ac);
        if roll.damage > 0 {
            prop_assert!(d20 == 20 || i32::try_from(d20).unwrap() + bonus >= ac);
        }
        if roll.outcome == AttackOutcome::Miss {
            prop_assert!(i32::try_from(d20).unwrap() + bonus < ac);
        }
    }

    #[test]
    fn purse_survives_any_transaction_sequence(
        ops in prop::collection::vec((0u8..4, 0usize..10), 1..60),
    ) {
        let mut profile = profile();
        let mut market = market_catalog();
        let catalog = market_catalog();
        for (op, pick) in ops {
            let gold = profile.stats.gold;
            let item_id = catalog[pick].id.clone();
            let result = match op {
                0 => buy(&mut profile, &mut market, &item_id).map(|_| ()),
                1 => sell(&mut profile, &mut market, &item_id).map(|_| ()),
                2 => recruit(&mut profile, UnitType::Mercenary, 100),
                _ => {
                    advance_time(&mut profile, 24);
                    Ok(())
                }
            };
            if result.is_err() {
                prop_assert_eq!(profile.stats.gold, gold);
            }
        }
        prop_assert!(profile.stats.current_hp <= profile.stats.max_hp);
    }

    #[test]
    fn equipping_conserves_items(
        ops in prop::collection::vec((any::<bool>(), 0usize..10), 1..40),
    ) {
        let mut profile = profile();
        profile.inventory = market_catalog();
        let total = profile.total_items();
        let slots = [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Helmet, EquipSlot::Horse];
        for (wear, pick) in ops {
            if wear {
                let item_id = market_catalog()[pick].id.clone();
                let _ = equip(&mut profile, &item_id);
            } else {
                let _ = unequip(&mut profile, slots[pick % slots.len()]);
            }
            prop_assert_eq!(profile.total_items(), total);
        }
    }

    #[test]
    fn clock_follows_floor_and_modulo(start in 0u32..24, hours in 0u32..500) {
        let mut profile = profile();
        profile.time.hour = start;
        profile.time.day = 1;
        advance_time(&mut profile, hours);
        prop_assert_eq!(profile.time.day, 1 + (start + hours) / 24);
        prop_assert_eq!(profile.time.hour, (start + hours) % 24);
    }
}

#[test]
fn weapon_bonus_feeds_damage() {
    let mut profile = profile();
    profile.inventory.push(catalog_item("w2").unwrap());
    equip(&mut profile, "w2").unwrap();
    let striker = Attacker::player(&profile);
    assert_eq!(striker.attack_bonus, 3);
    assert_eq!(striker.damage_modifier, 7);
}
