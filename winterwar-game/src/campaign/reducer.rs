//! Pure campaign reducer: one intent against one snapshot.
//!
//! `reduce` never touches its input. Accepted intents yield a fresh snapshot
//! plus an [`Outcome`]; rejected intents yield an [`IntentError`] and emit no
//! signals except `insufficient-funds`.
use crate::arena::{ArenaDifficulty, ArenaOutcome, settle_bout};
use crate::attributes::movement_speed;
use crate::captivity::wait_in_captivity;
use crate::combat::{
    AttackOutcome, AttackRoll, BattlePhase, BattleResolution, BattleState, CombatError,
    PlayerAction, enemy_turn, player_turn, resolve_battle,
};
use crate::config::CampaignConfig;
use crate::constants::{
    BANDIT_LEADER_NAME, DEFAULT_ENEMY_STRENGTH, LOG_ARENA_LOSS, LOG_ARENA_WIN, LOG_BATTLE_START,
    LOG_CAPTIVITY_WAIT, LOG_CAPTURED, LOG_ENTER, LOG_EQUIPPED, LOG_EVENT_CHOICE, LOG_NOTHING_HERE,
    LOG_PURCHASE, LOG_RECRUITED, LOG_RELEASED, LOG_SALE, LOG_SCOUT, LOG_TRAVEL_AMBUSH,
    LOG_TRAVEL_ARRIVE, LOG_TRAVEL_START, LOG_UNEQUIPPED, LOG_VICTORY, LOG_VILLAGE, LOG_WAGES_PAID,
};
use crate::dice::{DiceStreams, Streams};
use crate::encounters::{
    ChoiceId, ChoiceKind, EventKind, LocationEntry, bandit_ambush, enter_location,
};
use crate::items::EquipSlot;
use crate::market::{buy, equip, pay_tribute, recruit, sell, unequip};
use crate::narrative::{NarrativeOracle, request_travel_event, request_village_problem};
use crate::profile::CharacterProfile;
use crate::signals::{Signal, SignalSink};
use crate::time::{TimeReport, advance_time};
use crate::travel::{TickResult, TravelState, travel_tick};
use crate::units::UnitType;
use crate::world::{MapNode, find_node};

use super::{CampaignSnapshot, Effect, Intent, IntentError, Message, Outcome, TownView, View};

/// Collaborators one reduction may draw on.
pub struct ReducerContext<'a, R: ?Sized, O: ?Sized, S: ?Sized> {
    pub dice: &'a mut R,
    pub oracle: &'a mut O,
    pub config: &'a CampaignConfig,
    pub signals: &'a mut S,
}

/// Messages and signals buffered until the reduction is known to succeed.
#[derive(Debug, Default)]
struct Journal {
    messages: Vec<Message>,
    signals: Vec<Signal>,
}

impl Journal {
    fn say(&mut self, key: &'static str, text: impl Into<String>) {
        self.messages.push(Message::new(key, text));
    }

    fn cue(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    fn time(&mut self, report: &TimeReport) {
        if report.wages_paid > 0 {
            self.say(
                LOG_WAGES_PAID,
                format!("Daily wages paid: {} gold.", report.wages_paid),
            );
        }
    }
}

/// Apply `intent` to a copy of `snapshot`.
///
/// # Errors
///
/// Any [`IntentError`]; the caller's snapshot is untouched either way.
pub fn reduce<R, O, S>(
    snapshot: &CampaignSnapshot,
    intent: Intent,
    ctx: &mut ReducerContext<'_, R, O, S>,
) -> Result<(CampaignSnapshot, Outcome), IntentError>
where
    R: DiceStreams + ?Sized,
    O: NarrativeOracle + ?Sized,
    S: SignalSink + ?Sized,
{
    let name = intent.name();
    if let Err(err) = admit(snapshot, &intent) {
        log::debug!("{name} rejected in {}: {err}", snapshot.view);
        return Err(err);
    }

    let mut next = snapshot.clone();
    let mut journal = Journal::default();
    let mut dice = ctx.dice.streams();
    match apply(
        &mut next,
        intent,
        &mut dice,
        &mut *ctx.oracle,
        ctx.config,
        &mut journal,
    ) {
        Ok(effect) => {
            for signal in journal.signals {
                ctx.signals.emit(signal);
            }
            log::debug!("{name} -> {} ({effect:?})", next.view);
            Ok((
                next,
                Outcome {
                    effect,
                    messages: journal.messages,
                },
            ))
        }
        Err(err) => {
            if err.is_insufficient_funds() {
                ctx.signals.emit(Signal::InsufficientFunds);
            }
            log::debug!("{name} rejected: {err}");
            Err(err)
        }
    }
}

/// Travel, pending events and the current view decide which intents are
/// admissible at all.
fn admit(snapshot: &CampaignSnapshot, intent: &Intent) -> Result<(), IntentError> {
    if snapshot.is_traveling() {
        return if matches!(intent, Intent::TravelTick) {
            Ok(())
        } else {
            Err(IntentError::Traveling)
        };
    }
    if matches!(intent, Intent::TravelTick) {
        return Err(IntentError::NotTraveling);
    }
    if snapshot.event.is_some() {
        return if matches!(intent, Intent::ChooseEventOption { .. }) {
            Ok(())
        } else {
            Err(IntentError::EventPending)
        };
    }
    if matches!(intent, Intent::ChooseEventOption { .. }) {
        return Err(IntentError::NoPendingEvent);
    }

    let allowed = match (snapshot.view, intent) {
        (
            View::Map,
            Intent::TravelTo { .. }
            | Intent::EnterLocation
            | Intent::WaitHour
            | Intent::Patrol
            | Intent::Scout,
        )
        | (View::Map | View::Town(_) | View::Village, Intent::Equip { .. } | Intent::Unequip { .. })
        | (View::Town(_), Intent::OpenTownView { .. })
        | (View::Town(_) | View::Village, Intent::Leave)
        | (View::Town(TownView::Market), Intent::Buy { .. } | Intent::Sell { .. })
        | (View::Town(TownView::Barracks), Intent::Recruit { .. })
        | (View::Town(TownView::Arena), Intent::ArenaBout { .. })
        | (
            View::Battle,
            Intent::Attack | Intent::Defend | Intent::EnemyTurn | Intent::ResolveBattle,
        )
        | (View::Captured, Intent::WaitInCaptivity) => true,
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(IntentError::WrongView {
            intent: intent.name(),
            view: snapshot.view,
        })
    }
}

fn apply<O: NarrativeOracle + ?Sized>(
    next: &mut CampaignSnapshot,
    intent: Intent,
    dice: &mut Streams<'_>,
    oracle: &mut O,
    config: &CampaignConfig,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    match intent {
        Intent::TravelTo { node_id } => travel_to(next, &node_id, dice, oracle, config, journal),
        Intent::TravelTick => travel_step(next, dice, config, journal),
        Intent::EnterLocation => {
            let node = current_node(next)?;
            Ok(enter(next, node, dice, oracle, config, journal))
        }
        Intent::WaitHour => {
            let report = advance_time(&mut next.profile, 1);
            journal.time(&report);
            Ok(Effect::TimePassed(report))
        }
        Intent::Patrol => {
            raise_ambush(next, dice, journal);
            Ok(Effect::EventRaised)
        }
        Intent::Scout => scout(next, oracle, journal),
        Intent::ChooseEventOption { choice } => choose(next, choice, journal),
        Intent::OpenTownView { view } => {
            next.view = View::Town(view);
            Ok(Effect::ViewChanged(next.view))
        }
        Intent::Leave => Ok(leave(next)),
        Intent::Buy { item_id } => {
            let item = buy(&mut next.profile, &mut next.market, &item_id)?;
            journal.cue(Signal::Purchase);
            journal.say(
                LOG_PURCHASE,
                format!("Bought {} for {} gold.", item.name, item.value),
            );
            Ok(Effect::Purchased(item))
        }
        Intent::Sell { item_id } => {
            let (item, price) = sell(&mut next.profile, &mut next.market, &item_id)?;
            journal.cue(Signal::Sale);
            journal.say(LOG_SALE, format!("Sold {} for {price} gold.", item.name));
            Ok(Effect::Sold { item, price })
        }
        Intent::Recruit { unit_type } => hire(next, unit_type, journal),
        Intent::Equip { item_id } => {
            let name = next
                .profile
                .inventory
                .iter()
                .find(|item| item.id == item_id)
                .map(|item| item.name.clone())
                .unwrap_or_default();
            let replaced = equip(&mut next.profile, &item_id)?;
            journal.cue(Signal::Equipped);
            journal.say(LOG_EQUIPPED, format!("You equip {name}."));
            Ok(Effect::Equipped { replaced })
        }
        Intent::Unequip { slot } => stow(next, slot, journal),
        Intent::Attack => exchange(next, PlayerAction::Attack, dice, config, journal),
        Intent::Defend => exchange(next, PlayerAction::Defend, dice, config, journal),
        Intent::EnemyTurn => {
            let Some(battle) = next.battle.as_mut() else {
                return Err(no_battle("enemy-turn", next.view));
            };
            let roll = enemy_strike(battle, &next.profile, dice, journal)?;
            Ok(Effect::Exchange {
                player: None,
                enemy: Some(roll),
            })
        }
        Intent::ResolveBattle => resolve(next, dice, config, journal),
        Intent::WaitInCaptivity => Ok(serve_day(next, journal)),
        Intent::ArenaBout { difficulty, won } => Ok(bout(next, difficulty, won, dice, journal)),
    }
}

fn current_node(snapshot: &CampaignSnapshot) -> Result<&'static MapNode, IntentError> {
    snapshot
        .profile
        .current_location_id
        .as_deref()
        .and_then(find_node)
        .ok_or(IntentError::NoLocation)
}

const fn no_battle(intent: &'static str, view: View) -> IntentError {
    IntentError::WrongView { intent, view }
}

fn travel_to<O: NarrativeOracle + ?Sized>(
    next: &mut CampaignSnapshot,
    node_id: &str,
    dice: &mut Streams<'_>,
    oracle: &mut O,
    config: &CampaignConfig,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let destination =
        find_node(node_id).ok_or_else(|| IntentError::UnknownNode(node_id.to_string()))?;
    if next.profile.current_location_id.as_deref() == Some(node_id) {
        return Ok(enter(next, destination, dice, oracle, config, journal));
    }

    let origin = next
        .profile
        .current_location_id
        .as_deref()
        .and_then(find_node);
    let plan = TravelState::plan(origin, destination, movement_speed(&next.profile));
    let hours = plan.total_hours;
    next.travel = Some(plan);
    journal.cue(Signal::TravelStart);
    journal.say(
        LOG_TRAVEL_START,
        format!("You set out for {} ({hours}h on the road).", destination.name),
    );
    Ok(Effect::TravelStarted {
        destination: destination.id.to_string(),
        hours,
    })
}

fn travel_step(
    next: &mut CampaignSnapshot,
    dice: &mut Streams<'_>,
    config: &CampaignConfig,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let Some(travel) = next.travel.as_mut() else {
        return Err(IntentError::NotTraveling);
    };
    let (result, report) = travel_tick(
        travel,
        &mut next.profile,
        &mut *dice.encounter,
        config.ambush_chance,
    );
    journal.time(&report);

    match result {
        TickResult::EnRoute => Ok(Effect::EnRoute {
            remaining_hours: travel.remaining_hours(),
        }),
        TickResult::Arrived => {
            let node_id = travel.destination_id.clone();
            next.travel = None;
            let name = find_node(&node_id).map_or(node_id.as_str(), |node| node.name);
            journal.cue(Signal::TravelArrive);
            journal.say(LOG_TRAVEL_ARRIVE, format!("You reach {name}."));
            Ok(Effect::Arrived { node_id })
        }
        TickResult::Ambushed => {
            next.travel = None;
            raise_ambush(next, dice, journal);
            Ok(Effect::Ambushed)
        }
    }
}

fn raise_ambush(next: &mut CampaignSnapshot, dice: &mut Streams<'_>, journal: &mut Journal) {
    let event = bandit_ambush(&mut *dice.encounter);
    journal.cue(Signal::Ambush);
    journal.say(LOG_TRAVEL_AMBUSH, event.description.clone());
    next.event = Some(event);
}

fn enter<O: NarrativeOracle + ?Sized>(
    next: &mut CampaignSnapshot,
    node: &MapNode,
    dice: &mut Streams<'_>,
    oracle: &mut O,
    config: &CampaignConfig,
    journal: &mut Journal,
) -> Effect {
    match enter_location(
        node,
        &mut *dice.market,
        &mut *dice.encounter,
        config.market_size,
    ) {
        LocationEntry::Commerce { market, recruits } => {
            next.market = market;
            next.recruits = recruits;
            next.view = View::Town(TownView::Center);
            journal.say(LOG_ENTER, format!("You pass the gates of {}.", node.name));
            Effect::EnteredTown
        }
        LocationEntry::Village => {
            let narration = request_village_problem(oracle, node.name);
            let fallback = narration.is_fallback();
            let problem = narration.into_value();
            journal.say(
                LOG_VILLAGE,
                format!("{}: {}", problem.title, problem.description),
            );
            next.village_problem = Some(problem);
            next.view = View::Village;
            Effect::EnteredVillage { fallback }
        }
        LocationEntry::Event(event) => {
            if event.kind == Some(EventKind::Combat) {
                journal.cue(Signal::Ambush);
            }
            journal.say(LOG_ENTER, event.title.clone());
            next.event = Some(event);
            Effect::EventRaised
        }
        LocationEntry::Nothing => {
            journal.say(
                LOG_NOTHING_HERE,
                format!("{} lies empty. There is nothing here.", node.name),
            );
            Effect::NothingHere
        }
    }
}

fn scout<O: NarrativeOracle + ?Sized>(
    next: &mut CampaignSnapshot,
    oracle: &mut O,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let node = current_node(next)?;
    let event = request_travel_event(oracle, &next.profile, node.name).into_value();
    journal.say(LOG_SCOUT, format!("Your scouts return: {}", event.title));
    next.event = Some(event);
    Ok(Effect::EventRaised)
}

fn choose(
    next: &mut CampaignSnapshot,
    choice_id: ChoiceId,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let Some(event) = next.event.as_ref() else {
        return Err(IntentError::NoPendingEvent);
    };
    let choice = event
        .choice(choice_id)
        .ok_or(IntentError::NoSuchChoice(choice_id))?;
    journal.say(LOG_EVENT_CHOICE, choice.text.clone());

    if choice.kind == ChoiceKind::Combat {
        let strength = event.enemy_strength.unwrap_or(DEFAULT_ENEMY_STRENGTH);
        let battle = BattleState::start(&next.profile, BANDIT_LEADER_NAME, strength);
        journal.cue(Signal::WarHorn);
        journal.say(
            LOG_BATTLE_START,
            format!("Steel is drawn against the {BANDIT_LEADER_NAME}."),
        );
        next.battle = Some(battle);
        next.event = None;
        next.view = View::Battle;
        return Ok(Effect::BattleStarted);
    }

    if let Some(cost) = choice.cost {
        pay_tribute(&mut next.profile, cost)?;
    }
    next.event = None;
    Ok(Effect::EventResolved { choice: choice_id })
}

fn leave(next: &mut CampaignSnapshot) -> Effect {
    match next.view {
        View::Town(_) => {
            next.market.clear();
            next.recruits.clear();
        }
        View::Village => next.village_problem = None,
        View::Map | View::Battle | View::Captured => {}
    }
    next.view = View::Map;
    Effect::ViewChanged(View::Map)
}

fn hire(
    next: &mut CampaignSnapshot,
    unit_type: UnitType,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let Some(offer) = next
        .recruits
        .iter_mut()
        .find(|offer| offer.unit_type == unit_type)
    else {
        return Err(IntentError::RecruitUnavailable(unit_type));
    };
    if offer.count == 0 {
        return Err(IntentError::RecruitExhausted(unit_type));
    }
    recruit(&mut next.profile, unit_type, offer.cost)?;
    offer.count -= 1;
    journal.cue(Signal::Recruited);
    journal.say(
        LOG_RECRUITED,
        format!("A {} joins your party.", unit_type.def().name),
    );
    Ok(Effect::Recruited(unit_type))
}

fn stow(
    next: &mut CampaignSnapshot,
    slot: EquipSlot,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let item = unequip(&mut next.profile, slot)?;
    journal.cue(Signal::Unequipped);
    journal.say(LOG_UNEQUIPPED, format!("You stow {}.", item.name));
    Ok(Effect::Unequipped(item))
}

fn exchange(
    next: &mut CampaignSnapshot,
    action: PlayerAction,
    dice: &mut Streams<'_>,
    config: &CampaignConfig,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let Some(battle) = next.battle.as_mut() else {
        return Err(no_battle(
            if action == PlayerAction::Attack {
                "attack"
            } else {
                "defend"
            },
            next.view,
        ));
    };
    let player = player_turn(battle, &next.profile, action, &mut *dice.combat)?;
    journal.cue(match player.outcome {
        AttackOutcome::Critical => Signal::Critical,
        AttackOutcome::Fumble => Signal::Fumble,
        AttackOutcome::Hit => Signal::AttackHit,
        AttackOutcome::Miss => Signal::AttackMiss,
    });

    if battle.phase == BattlePhase::Victory {
        journal.cue(Signal::Victory);
    }
    let enemy = if battle.phase == BattlePhase::EnemyTurn && !config.defer_enemy_turn {
        Some(enemy_strike(battle, &next.profile, dice, journal)?)
    } else {
        None
    };
    Ok(Effect::Exchange {
        player: Some(player),
        enemy,
    })
}

fn enemy_strike(
    battle: &mut BattleState,
    profile: &CharacterProfile,
    dice: &mut Streams<'_>,
    journal: &mut Journal,
) -> Result<AttackRoll, CombatError> {
    let roll = enemy_turn(battle, profile, &mut *dice.combat)?;
    journal.cue(if roll.landed() {
        Signal::EnemyHit
    } else {
        Signal::EnemyMiss
    });
    if battle.phase == BattlePhase::Defeat {
        journal.cue(Signal::Defeat);
    }
    Ok(roll)
}

fn resolve(
    next: &mut CampaignSnapshot,
    dice: &mut Streams<'_>,
    config: &CampaignConfig,
    journal: &mut Journal,
) -> Result<Effect, IntentError> {
    let Some(battle) = next.battle.take() else {
        return Err(no_battle("resolve-battle", next.view));
    };
    let resolution = resolve_battle(
        &battle,
        &mut next.profile,
        &mut *dice.loot,
        config.captivity_days,
    )?;

    match &resolution {
        BattleResolution::Victory {
            gold,
            renown,
            loot,
            defectors,
        } => {
            journal.say(
                LOG_VICTORY,
                format!("Victory! +{gold} gold, +{renown} renown."),
            );
            if let Some(item) = loot {
                journal.say(LOG_VICTORY, format!("You claim {} from the fallen.", item.name));
            }
            if *defectors > 0 {
                journal.say(
                    LOG_RECRUITED,
                    format!("{defectors} bandits throw down their arms and join you."),
                );
            }
            next.view = View::Map;
        }
        BattleResolution::Captured { days } => {
            journal.cue(Signal::Captured);
            journal.say(
                LOG_CAPTURED,
                format!("You wake in chains. {days} days of captivity await."),
            );
            next.view = View::Captured;
        }
    }
    Ok(Effect::BattleResolved(resolution))
}

fn serve_day(next: &mut CampaignSnapshot, journal: &mut Journal) -> Effect {
    let wait = wait_in_captivity(&mut next.profile);
    journal.time(&wait.time);
    if wait.released {
        next.view = View::Map;
        journal.cue(Signal::Released);
        journal.say(LOG_RELEASED, "The gates open. You are free.");
    } else {
        journal.say(
            LOG_CAPTIVITY_WAIT,
            format!("A day passes in chains. {} remain.", wait.days_remaining),
        );
    }
    Effect::Captivity(wait)
}

fn bout(
    next: &mut CampaignSnapshot,
    difficulty: ArenaDifficulty,
    won: bool,
    dice: &mut Streams<'_>,
    journal: &mut Journal,
) -> Effect {
    let outcome = settle_bout(&mut next.profile, difficulty, won, &mut *dice.loot);
    match &outcome {
        ArenaOutcome::Won { gold, prize } => {
            journal.cue(Signal::ArenaWin);
            journal.say(LOG_ARENA_WIN, format!("The crowd roars! +{gold} gold."));
            if let Some(item) = prize {
                journal.say(LOG_ARENA_WIN, format!("The champion's prize: {}.", item.name));
            }
        }
        ArenaOutcome::Lost { hp_lost } => {
            journal.cue(Signal::ArenaLoss);
            journal.say(
                LOG_ARENA_LOSS,
                format!("You are dragged from the sand (-{hp_lost} HP)."),
            );
        }
    }
    Effect::Arena(outcome)
}
