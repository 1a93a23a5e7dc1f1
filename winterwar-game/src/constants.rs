//! Centralized balance and tuning constants for Winterwar campaign logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that balance can only be adjusted via
//! code changes reviewed in version control.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_WAGES_PAID: &str = "log.time.wages";
pub(crate) const LOG_TRAVEL_START: &str = "log.travel.start";
pub(crate) const LOG_TRAVEL_ARRIVE: &str = "log.travel.arrive";
pub(crate) const LOG_TRAVEL_AMBUSH: &str = "log.travel.ambush";
pub(crate) const LOG_PURCHASE: &str = "log.market.purchase";
pub(crate) const LOG_SALE: &str = "log.market.sale";
pub(crate) const LOG_INSUFFICIENT_FUNDS: &str = "log.market.insufficient-funds";
pub(crate) const LOG_RECRUITED: &str = "log.barracks.recruited";
pub(crate) const LOG_VICTORY: &str = "log.battle.victory";
pub(crate) const LOG_CAPTURED: &str = "log.battle.captured";
pub(crate) const LOG_RELEASED: &str = "log.captivity.released";
pub(crate) const LOG_CAPTIVITY_WAIT: &str = "log.captivity.wait";
pub(crate) const LOG_ARENA_WIN: &str = "log.arena.win";
pub(crate) const LOG_ARENA_LOSS: &str = "log.arena.loss";
pub(crate) const LOG_EVENT_CHOICE: &str = "log.event.choice";
pub(crate) const LOG_NOTHING_HERE: &str = "log.location.empty";
pub(crate) const LOG_REJECTED: &str = "log.intent.rejected";
pub(crate) const LOG_OPENING: &str = "log.campaign.opening";
pub(crate) const LOG_VILLAGE: &str = "log.village.problem";
pub(crate) const LOG_ENTER: &str = "log.location.enter";
pub(crate) const LOG_SCOUT: &str = "log.map.scout";
pub(crate) const LOG_EQUIPPED: &str = "log.inventory.equipped";
pub(crate) const LOG_UNEQUIPPED: &str = "log.inventory.unequipped";
pub(crate) const LOG_BATTLE_START: &str = "log.battle.start";

// Character creation -------------------------------------------------------
pub const BASE_ATTRIBUTE: u32 = 10;
pub const BASE_GOLD: u32 = 50;
pub const CITY_GOLD_BONUS: u32 = 50;
pub const SMITH_GOLD_BONUS: u32 = 20;
pub const BASE_HP: u32 = 25;
pub const HP_PER_CON: u32 = 2;
pub const BASE_AC: i32 = 10;
pub const STARTING_FOOD: u32 = 10;
pub const STARTING_MORALE: u32 = 50;
pub const BASE_SPEED: f64 = 4.0;
pub const STARTING_DAY: u32 = 1;
pub const STARTING_HOUR: u32 = 8;
pub const DEFAULT_HERO_NAME: &str = "Nameless Exile";
pub const DEFAULT_CLAN_NAME: &str = "Clan of Exiles";

// Combat -------------------------------------------------------------------
pub const D20: u32 = 20;
pub const CRITICAL_ROLL: u32 = 20;
pub const FUMBLE_ROLL: u32 = 1;
pub const PLAYER_WEAPON_DIE: u32 = 8;
pub const ENEMY_WEAPON_DIE: u32 = 6;
pub const PLAYER_PROFICIENCY: i32 = 2;
pub const ENEMY_DAMAGE_BONUS: i32 = 2;
pub const ARMOR_AC_BASELINE: i32 = 10;
pub const REWARD_GOLD_BASE: u32 = 50;
pub const REWARD_GOLD_HP_DIVISOR: u32 = 3;
pub const REWARD_RENOWN: u32 = 5;
pub const LOOT_CHANCE: f64 = 0.5;
pub const DEFECTOR_CHANCE: f64 = 0.3;
pub const DEFECTORS_MIN: u32 = 1;
pub const DEFECTORS_MAX: u32 = 3;
pub const CAPTURE_HP_FLOOR: u32 = 10;
pub const CAPTIVITY_DAYS: u32 = 3;
pub const DEFAULT_ENEMY_STRENGTH: u32 = 50;
pub const BANDIT_LEADER_NAME: &str = "Bandit Leader";

// Hostile party scaling ----------------------------------------------------
pub const BANDIT_GROUP_MIN: u32 = 5;
pub const BANDIT_GROUP_MAX: u32 = 20;
pub const BANDIT_HP_PER_MEMBER: u32 = 35;
pub const HOSTILE_BASE_AC: u32 = 12;
pub const HOSTILE_MAX_AC: u32 = 18;
pub const HOSTILE_BASE_ATTACK: u32 = 2;
pub const HOSTILE_HP_PER_STEP: u32 = 200;
pub const HIDEOUT_STRENGTH: u32 = 300;
pub const TRIBUTE_COST: u32 = 100;

// Travel -------------------------------------------------------------------
pub const AMBUSH_CHANCE: f64 = 0.15;
pub const UNKNOWN_ORIGIN_DISTANCE: f64 = 10.0;
pub const TRAVEL_DISTANCE_FACTOR: f64 = 2.0;

// Time ---------------------------------------------------------------------
pub const HOURS_PER_DAY: u32 = 24;
pub const DAWN_START: u32 = 5;
pub const DAY_START: u32 = 8;
pub const DUSK_START: u32 = 18;
pub const NIGHT_START: u32 = 21;
pub const CAPTIVITY_WAIT_HOURS: u32 = 24;

// Commerce -----------------------------------------------------------------
pub const MARKET_OFFER_SIZE: usize = 8;
pub const SELL_RATIO_NUMERATOR: u32 = 7;
pub const SELL_RATIO_DENOMINATOR: u32 = 10;
pub const KINGDOM_RECRUIT_COST: u32 = 50;
pub const KINGDOM_RECRUIT_MIN: u32 = 2;
pub const KINGDOM_RECRUIT_MAX: u32 = 6;
pub const MERCENARY_RECRUIT_COST: u32 = 100;
pub const MERCENARY_RECRUIT_MIN: u32 = 1;
pub const MERCENARY_RECRUIT_MAX: u32 = 3;

// Arena --------------------------------------------------------------------
pub const ARENA_EASY_PURSE: u32 = 50;
pub const ARENA_MEDIUM_PURSE: u32 = 150;
pub const ARENA_HARD_PURSE: u32 = 300;
pub const ARENA_LOSS_HP: u32 = 10;

// Session ------------------------------------------------------------------
pub const MESSAGE_LOG_LEN: usize = 5;
pub const ENEMY_TURN_DELAY_MS: u64 = 1_000;
pub const ORACLE_TIMEOUT_MS: u64 = 8_000;
