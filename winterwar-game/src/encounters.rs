//! Encounter generation: hostile parties, fixed events, location entry and
//! commerce offers.
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::fmt;

use crate::constants::{
    BANDIT_GROUP_MAX, BANDIT_GROUP_MIN, BANDIT_HP_PER_MEMBER, HIDEOUT_STRENGTH, HOSTILE_BASE_AC,
    HOSTILE_BASE_ATTACK, HOSTILE_HP_PER_STEP, HOSTILE_MAX_AC, KINGDOM_RECRUIT_COST,
    KINGDOM_RECRUIT_MAX, KINGDOM_RECRUIT_MIN, MERCENARY_RECRUIT_COST, MERCENARY_RECRUIT_MAX,
    MERCENARY_RECRUIT_MIN, TRIBUTE_COST,
};
use crate::dice::DiceSource;
use crate::items::{Item, market_catalog};
use crate::numbers::u32_to_i32;
use crate::units::UnitType;
use crate::world::{Kingdom, MapNode, NodeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceId {
    A,
    B,
    C,
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        })
    }
}

/// How a choice is resolved. Only `Combat` changes the view; the rest are
/// narrative and close the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceKind {
    Aggressive,
    Diplomatic,
    Risky,
    Trade,
    Work,
    Combat,
    Surrender,
    Loot,
    Accept,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameChoice {
    pub id: ChoiceId,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ChoiceKind,
    #[serde(default)]
    pub requires_skill: bool,
    /// Gold charged when this choice is taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
}

impl GameChoice {
    #[must_use]
    pub fn new(id: ChoiceId, text: &str, kind: ChoiceKind) -> Self {
        Self {
            id,
            text: text.to_string(),
            kind,
            requires_skill: false,
            cost: None,
        }
    }

    #[must_use]
    pub const fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Combat,
    Story,
    Loot,
    LordEncounter,
    WarDeclaration,
    Messenger,
}

/// A pending decision presented to the player.
///
/// Also the payload the narrative oracle returns for travel events, hence the
/// camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub title: String,
    pub description: String,
    pub choices: SmallVec<[GameChoice; 3]>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_strength: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_lord_id: Option<String>,
    #[serde(
        rename = "relatedKingdomId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub related_kingdom: Option<Kingdom>,
}

impl GameEvent {
    #[must_use]
    pub fn choice(&self, id: ChoiceId) -> Option<&GameChoice> {
        self.choices.iter().find(|choice| choice.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VillageProblemKind {
    Combat,
    Work,
    Trade,
}

/// Trouble a village asks the player to deal with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VillageProblem {
    pub title: String,
    pub description: String,
    pub reward_gold: u32,
    pub reward_relation: i32,
    #[serde(rename = "type")]
    pub kind: VillageProblemKind,
}

/// Combat numbers for any hostile force, derived from its total hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostileParty {
    pub max_hp: u32,
    pub armor_class: i32,
    pub attack_bonus: i32,
}

impl HostileParty {
    /// Every 200 HP of strength adds one point of AC (capped at 18) and one
    /// point of attack bonus.
    #[must_use]
    pub fn from_strength(strength: u32) -> Self {
        let step = strength / HOSTILE_HP_PER_STEP;
        let armor_class = HOSTILE_BASE_AC.saturating_add(step).min(HOSTILE_MAX_AC);
        Self {
            max_hp: strength,
            armor_class: u32_to_i32(armor_class),
            attack_bonus: u32_to_i32(HOSTILE_BASE_ATTACK.saturating_add(step)),
        }
    }
}

/// Strength of a bandit group of `size` members.
#[must_use]
pub const fn bandit_strength(size: u32) -> u32 {
    size.saturating_mul(BANDIT_HP_PER_MEMBER)
}

/// Random bandit group blocking the road.
pub fn bandit_ambush<D: DiceSource + ?Sized>(dice: &mut D) -> GameEvent {
    let size = dice.range(BANDIT_GROUP_MIN, BANDIT_GROUP_MAX);
    let strength = bandit_strength(size);
    log::debug!("bandit group of {size} (strength {strength})");
    GameEvent {
        title: String::from("Bandit Ambush!"),
        description: format!(
            "A band of {size} bandits blocks your path. \
             Their blades are rusty but their eyes are hungry."
        ),
        choices: smallvec![
            GameChoice::new(ChoiceId::A, "Attack!", ChoiceKind::Combat),
            GameChoice::new(ChoiceId::B, "Pay tribute (100g)", ChoiceKind::Diplomatic)
                .with_cost(TRIBUTE_COST),
            GameChoice::new(ChoiceId::C, "Try to flee", ChoiceKind::Risky),
        ],
        kind: Some(EventKind::Combat),
        enemy_strength: Some(strength),
        related_lord_id: None,
        related_kingdom: None,
    }
}

/// The fixed event raised when entering a bandit hideout.
#[must_use]
pub fn hideout_event() -> GameEvent {
    GameEvent {
        title: String::from("Bandit Hideout"),
        description: String::from("It is dark inside. Steel rings somewhere in the tunnels."),
        choices: smallvec![
            GameChoice::new(ChoiceId::A, "Attack", ChoiceKind::Combat),
            GameChoice::new(ChoiceId::B, "Retreat", ChoiceKind::Diplomatic),
        ],
        kind: None,
        enemy_strength: Some(HIDEOUT_STRENGTH),
        related_lord_id: None,
        related_kingdom: None,
    }
}

/// Troops for hire at a town barracks. `count` is the remaining stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitOffer {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub count: u32,
    pub cost: u32,
}

/// Draw `size` distinct catalog items in random order.
pub fn market_stock<D: DiceSource + ?Sized>(dice: &mut D, size: usize) -> Vec<Item> {
    let mut pool = market_catalog();
    let take = size.min(pool.len());
    for slot in 0..take {
        let pick = slot + dice.index(pool.len() - slot);
        pool.swap(slot, pick);
    }
    pool.truncate(take);
    pool
}

/// Barracks offers: the holding kingdom's basic troop, then sellswords.
pub fn recruit_offers<D: DiceSource + ?Sized>(
    dice: &mut D,
    kingdom: Option<Kingdom>,
) -> Vec<RecruitOffer> {
    let mut offers = Vec::with_capacity(2);
    if let Some(kingdom) = kingdom {
        offers.push(RecruitOffer {
            unit_type: UnitType::basic_for(kingdom),
            count: dice.range(KINGDOM_RECRUIT_MIN, KINGDOM_RECRUIT_MAX),
            cost: KINGDOM_RECRUIT_COST,
        });
    }
    offers.push(RecruitOffer {
        unit_type: UnitType::Mercenary,
        count: dice.range(MERCENARY_RECRUIT_MIN, MERCENARY_RECRUIT_MAX),
        cost: MERCENARY_RECRUIT_COST,
    });
    offers
}

/// What entering a map node produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationEntry {
    Commerce {
        market: Vec<Item>,
        recruits: Vec<RecruitOffer>,
    },
    /// The village's problem comes from the narrative oracle.
    Village,
    Event(GameEvent),
    Nothing,
}

/// Resolve entering `node`. Market and recruit rolls draw from `market_dice`,
/// mountain-pass ambushes from `encounter_dice`.
pub fn enter_location<M, E>(
    node: &MapNode,
    market_dice: &mut M,
    encounter_dice: &mut E,
    market_size: usize,
) -> LocationEntry
where
    M: DiceSource + ?Sized,
    E: DiceSource + ?Sized,
{
    match node.node_type {
        NodeType::Town | NodeType::Castle => LocationEntry::Commerce {
            market: market_stock(market_dice, market_size),
            recruits: recruit_offers(market_dice, node.allegiance.kingdom()),
        },
        NodeType::Village => LocationEntry::Village,
        NodeType::Hideout => LocationEntry::Event(hideout_event()),
        NodeType::MountainPass => LocationEntry::Event(bandit_ambush(encounter_dice)),
        NodeType::Ruin => LocationEntry::Nothing,
    }
}
