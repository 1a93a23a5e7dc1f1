//! Campaign orchestration: views, intents, the snapshot they act on, and
//! the session that commits reducer results.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::arena::{ArenaDifficulty, ArenaOutcome};
use crate::captivity::CaptivityWait;
use crate::combat::{AttackRoll, BattleResolution, BattleState, CombatError};
use crate::constants::{LOG_INSUFFICIENT_FUNDS, LOG_REJECTED};
use crate::encounters::{ChoiceId, GameEvent, RecruitOffer, VillageProblem};
use crate::items::{EquipSlot, Item};
use crate::market::TransactionError;
use crate::profile::CharacterProfile;
use crate::time::TimeReport;
use crate::travel::TravelState;
use crate::units::UnitType;

pub mod reducer;
pub mod session;

pub use reducer::{ReducerContext, reduce};
pub use session::CampaignSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TownView {
    Center,
    Barracks,
    Market,
    Arena,
    Tavern,
    Hall,
}

/// Top-level screen. A battle exists exactly while the view is `Battle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Map,
    Town(TownView),
    Village,
    Battle,
    Captured,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => f.write_str("map"),
            Self::Town(sub) => write!(f, "town ({sub:?})"),
            Self::Village => f.write_str("village"),
            Self::Battle => f.write_str("battle"),
            Self::Captured => f.write_str("captivity"),
        }
    }
}

/// Everything the player can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "kebab-case")]
pub enum Intent {
    TravelTo { node_id: String },
    TravelTick,
    EnterLocation,
    WaitHour,
    Patrol,
    Scout,
    ChooseEventOption { choice: ChoiceId },
    OpenTownView { view: TownView },
    Leave,
    Buy { item_id: String },
    Sell { item_id: String },
    Recruit { unit_type: UnitType },
    Equip { item_id: String },
    Unequip { slot: EquipSlot },
    Attack,
    Defend,
    EnemyTurn,
    ResolveBattle,
    WaitInCaptivity,
    ArenaBout { difficulty: ArenaDifficulty, won: bool },
}

impl Intent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TravelTo { .. } => "travel-to",
            Self::TravelTick => "travel-tick",
            Self::EnterLocation => "enter-location",
            Self::WaitHour => "wait-hour",
            Self::Patrol => "patrol",
            Self::Scout => "scout",
            Self::ChooseEventOption { .. } => "choose-event-option",
            Self::OpenTownView { .. } => "open-town-view",
            Self::Leave => "leave",
            Self::Buy { .. } => "buy",
            Self::Sell { .. } => "sell",
            Self::Recruit { .. } => "recruit",
            Self::Equip { .. } => "equip",
            Self::Unequip { .. } => "unequip",
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::EnemyTurn => "enemy-turn",
            Self::ResolveBattle => "resolve-battle",
            Self::WaitInCaptivity => "wait-in-captivity",
            Self::ArenaBout { .. } => "arena-bout",
        }
    }
}

/// Why an intent was turned down. Rejections never change the snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("you are on the road")]
    Traveling,
    #[error("you are not travelling")]
    NotTraveling,
    #[error("an event demands your decision")]
    EventPending,
    #[error("there is no event to answer")]
    NoPendingEvent,
    #[error("{intent} is not possible in the {view}")]
    WrongView { intent: &'static str, view: View },
    #[error("unknown location {0}")]
    UnknownNode(String),
    #[error("you are nowhere on the map")]
    NoLocation,
    #[error("choice {0} is not offered")]
    NoSuchChoice(ChoiceId),
    #[error("{0} are not for hire here")]
    RecruitUnavailable(UnitType),
    #[error("no more {0} are willing to join")]
    RecruitExhausted(UnitType),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Combat(#[from] CombatError),
}

impl IntentError {
    #[must_use]
    pub const fn is_insufficient_funds(&self) -> bool {
        matches!(
            self,
            Self::Transaction(TransactionError::InsufficientFunds { .. })
        )
    }

    /// Log key for the player-facing message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        if self.is_insufficient_funds() {
            LOG_INSUFFICIENT_FUNDS
        } else {
            LOG_REJECTED
        }
    }
}

/// One line of the player-facing log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub key: &'static str,
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn new(key: &'static str, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "> {}", self.text)
    }
}

/// Complete campaign state. The reducer maps one snapshot to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub profile: CharacterProfile,
    pub view: View,
    pub battle: Option<BattleState>,
    pub event: Option<GameEvent>,
    pub travel: Option<TravelState>,
    /// Stock of the market in the current town.
    pub market: Vec<Item>,
    pub recruits: Vec<RecruitOffer>,
    pub village_problem: Option<VillageProblem>,
}

impl CampaignSnapshot {
    #[must_use]
    pub const fn new(profile: CharacterProfile) -> Self {
        Self {
            profile,
            view: View::Map,
            battle: None,
            event: None,
            travel: None,
            market: Vec::new(),
            recruits: Vec::new(),
            village_problem: None,
        }
    }

    #[must_use]
    pub const fn is_traveling(&self) -> bool {
        self.travel.is_some()
    }
}

/// What an accepted intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    TravelStarted { destination: String, hours: u32 },
    EnRoute { remaining_hours: u32 },
    Arrived { node_id: String },
    Ambushed,
    EnteredTown,
    EnteredVillage { fallback: bool },
    EventRaised,
    NothingHere,
    TimePassed(TimeReport),
    EventResolved { choice: ChoiceId },
    BattleStarted,
    ViewChanged(View),
    Purchased(Item),
    Sold { item: Item, price: u32 },
    Recruited(UnitType),
    Equipped { replaced: Option<Item> },
    Unequipped(Item),
    Exchange {
        player: Option<AttackRoll>,
        enemy: Option<AttackRoll>,
    },
    BattleResolved(BattleResolution),
    Captivity(CaptivityWait),
    Arena(ArenaOutcome),
}

/// Result of an accepted intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub effect: Effect,
    /// Log lines in the order they happened.
    pub messages: Vec<Message>,
}
