use winterwar_game::combat::BattleRewards;
use winterwar_game::{
    AttackOutcome, Background, BattlePhase, BattleResolution, BattleState, CharacterDraft,
    CharacterProfile, Culture, DayPhase, PlayerAction, ScriptedDice, TickResult, TravelState,
    UnitType, advance_time, create_profile, player_turn, recruit, resolve_battle, travel_tick,
    wait_in_captivity,
};

fn mountain_smith() -> CharacterProfile {
    create_profile(&CharacterDraft::new(Culture::Mountain, Background::Smith))
}

#[test]
fn twenty_five_hours_from_late_night_lands_on_day_three() {
    let mut profile = mountain_smith();
    profile.time.day = 1;
    profile.time.hour = 23;
    let report = advance_time(&mut profile, 25);
    assert_eq!(profile.time.day, 3);
    assert_eq!(profile.time.hour, 0);
    assert_eq!(profile.time.phase, DayPhase::Night);
    assert_eq!(report.days_elapsed, 2);
}

#[test]
fn recruiting_twice_stacks() {
    let mut profile = mountain_smith();
    profile.stats.gold = 200;
    recruit(&mut profile, UnitType::FyrodRanger, 50).unwrap();
    recruit(&mut profile, UnitType::FyrodRanger, 50).unwrap();
    assert_eq!(profile.party.len(), 1);
    assert_eq!(
        profile.party.stack(UnitType::FyrodRanger).map(|stack| stack.count),
        Some(2)
    );
    assert_eq!(profile.stats.gold, 100);
}

#[test]
fn strength_fourteen_hits_armor_twelve_on_fifteen() {
    let profile = mountain_smith();
    assert_eq!(profile.stats.attributes.strength, 14);
    for face in 1..=8 {
        let mut battle = BattleState::start(&profile, "Bandit Leader", 175);
        assert_eq!(battle.enemy_ac, 12);
        let mut dice = ScriptedDice::new().with_values([15, face]);
        let roll = player_turn(&mut battle, &profile, PlayerAction::Attack, &mut dice).unwrap();
        assert_eq!(roll.outcome, AttackOutcome::Hit);
        assert!((3..=10).contains(&roll.damage));
        assert_eq!(battle.phase, BattlePhase::EnemyTurn);
    }
}

#[test]
fn three_hour_journey_arrives_on_the_third_tick() {
    let mut profile = mountain_smith();
    let mut travel = TravelState {
        origin_id: Some(String::from("n7")),
        destination_id: String::from("n4"),
        total_hours: 3,
        elapsed_hours: 0,
    };
    let mut dice = ScriptedDice::new().with_chances([false, false, false]);
    for _ in 0..2 {
        let (result, _) = travel_tick(&mut travel, &mut profile, &mut dice, 0.15);
        assert_eq!(result, TickResult::EnRoute);
        assert_eq!(profile.current_location_id.as_deref(), Some("n7"));
    }
    let (result, _) = travel_tick(&mut travel, &mut profile, &mut dice, 0.15);
    assert_eq!(result, TickResult::Arrived);
    assert_eq!(profile.current_location_id.as_deref(), Some("n4"));
    assert_eq!(profile.time.hour, 11);
}

#[test]
fn defeat_means_three_days_in_chains() {
    let mut profile = mountain_smith();
    let mut battle = BattleState::start(&profile, "Bandit Leader", 700);
    battle.phase = BattlePhase::Defeat;
    battle.player_hp = 0;

    let resolution =
        resolve_battle(&battle, &mut profile, &mut ScriptedDice::new(), 3).unwrap();
    assert_eq!(resolution, BattleResolution::Captured { days: 3 });
    assert_eq!(profile.stats.current_hp, 10);
    assert!(profile.is_prisoner);
    assert_eq!(profile.prisoner_days_remaining, 3);

    let waits: Vec<bool> = (0..3)
        .map(|_| wait_in_captivity(&mut profile).released)
        .collect();
    assert_eq!(waits, vec![false, false, true]);
    assert!(!profile.is_prisoner);
}

#[test]
fn victory_pays_rewards_fixed_at_the_start() {
    let mut profile = mountain_smith();
    let mut battle = BattleState::start(&profile, "Bandit Leader", 300);
    assert_eq!(battle.rewards, BattleRewards { gold: 150, renown: 5 });
    battle.enemy_hp = 1;
    battle.player_hp = 30;
    let mut dice = ScriptedDice::new().with_values([20, 8, 8]);
    player_turn(&mut battle, &profile, PlayerAction::Attack, &mut dice).unwrap();
    assert_eq!(battle.phase, BattlePhase::Victory);

    let mut loot = ScriptedDice::new()
        .with_chances([true, true])
        .with_values([2, 3]);
    let resolution = resolve_battle(&battle, &mut profile, &mut loot, 3).unwrap();
    let BattleResolution::Victory {
        gold,
        loot,
        defectors,
        ..
    } = resolution
    else {
        panic!("expected victory");
    };
    assert_eq!(gold, 150);
    assert_eq!(loot.map(|item| item.id), Some(String::from("w1")));
    assert_eq!(defectors, 3);
    assert_eq!(profile.stats.gold, 70 + 150);
    assert_eq!(profile.stats.current_hp, 30);
    assert_eq!(profile.clan.renown, 5);
    assert_eq!(
        profile.party.stack(UnitType::Bandit).map(|stack| stack.count),
        Some(3)
    );
}
