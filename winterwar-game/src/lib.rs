//! Winterwar Campaign Engine
//!
//! Platform-agnostic core logic for the Winterwar frozen-north campaign:
//! character creation, time and wages, travel and encounters, d20 combat,
//! trade and recruitment, captivity, and the intent reducer tying them
//! together. No UI, audio or network code lives here.

pub mod arena;
pub mod attributes;
pub mod campaign;
pub mod captivity;
pub mod combat;
pub mod config;
pub mod constants;
pub mod dice;
pub mod encounters;
pub mod items;
pub mod market;
pub mod narrative;
pub mod numbers;
pub mod profile;
pub mod signals;
pub mod time;
pub mod travel;
pub mod units;
pub mod world;

// Re-export commonly used types
pub use arena::{ArenaDifficulty, ArenaOutcome, settle_bout};
pub use attributes::{
    AttributeBonus, Attributes, Background, CharacterDraft, Culture, attack_bonus, attack_power,
    create_profile, defense, movement_speed,
};
pub use campaign::{
    CampaignSession, CampaignSnapshot, Effect, Intent, IntentError, Message, Outcome,
    ReducerContext, TownView, View, reduce,
};
pub use captivity::{CaptivityWait, wait_in_captivity};
pub use combat::{
    AttackOutcome, AttackRoll, BattlePhase, BattleResolution, BattleState, CombatError,
    PlayerAction, enemy_turn, player_turn, resolve_attack, resolve_battle,
};
pub use config::{CampaignConfig, ConfigError};
pub use dice::{DiceSource, DiceStreams, RngBundle, ScriptedDice, ScriptedStreams, Streams};
pub use encounters::{
    ChoiceId, ChoiceKind, EventKind, GameChoice, GameEvent, LocationEntry, RecruitOffer,
    VillageProblem, VillageProblemKind, enter_location,
};
pub use items::{EquipSlot, Equipment, Item, ItemType, market_catalog};
pub use market::{TransactionError, buy, equip, pay_tribute, recruit, sell, unequip};
#[cfg(feature = "async")]
pub use narrative::{
    AsyncNarrativeOracle, fetch_opening_scene, fetch_travel_event, fetch_village_problem,
};
pub use narrative::{
    BoundedOracle, CannedOracle, NarrativeOracle, Narration, OfflineOracle, OracleError,
    request_opening_scene, request_travel_event, request_village_problem,
};
pub use profile::{CharacterProfile, PlayerStats};
pub use signals::{NullSink, Signal, SignalSink};
pub use time::{DayPhase, GameTime, TimeReport, advance_time};
pub use travel::{TickResult, TravelState, travel_tick};
pub use units::{Party, UnitStack, UnitType};
pub use world::{Kingdom, MapNode, NodeType, find_node, map_nodes};
