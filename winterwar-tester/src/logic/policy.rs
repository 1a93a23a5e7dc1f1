use std::fmt;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use winterwar_game::{
    BattlePhase, CampaignSnapshot, ChoiceId, ChoiceKind, GameChoice, GameEvent, Intent, Item,
    TownView, View, map_nodes,
};

/// Built-in play styles for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GameplayStrategy {
    /// Patrols for bandits and always draws steel.
    Aggressive,
    /// Rests when hurt and buys its way out of fights it can afford.
    Cautious,
    /// Roams the map at random, poking into places it passes.
    Wanderer,
    /// Shuttles between towns buying better gear.
    Merchant,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Aggressive, Self::Cautious, Self::Wanderer, Self::Merchant];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Cautious => "Cautious",
            Self::Wanderer => "Wanderer",
            Self::Merchant => "Merchant",
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Picks the next intent for a campaign from its snapshot alone.
///
/// Destinations come from the autopilot's own ChaCha stream so that the
/// game's dice streams see the same draws on every replay of a seed.
#[derive(Debug, Clone)]
pub struct Autopilot {
    strategy: GameplayStrategy,
    rng: ChaCha20Rng,
    last_entered: Option<String>,
    shopped: bool,
}

impl Autopilot {
    #[must_use]
    pub fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: ChaCha20Rng::seed_from_u64(seed),
            last_entered: None,
            shopped: false,
        }
    }

    pub fn next_intent(&mut self, snapshot: &CampaignSnapshot) -> Intent {
        if snapshot.is_traveling() {
            return Intent::TravelTick;
        }
        if let Some(event) = &snapshot.event {
            return Intent::ChooseEventOption {
                choice: self.pick_choice(event, snapshot.profile.stats.gold),
            };
        }
        match snapshot.view {
            View::Battle => match snapshot.battle.as_ref().map(|battle| battle.phase) {
                Some(BattlePhase::PlayerTurn) => Intent::Attack,
                Some(BattlePhase::EnemyTurn) => Intent::EnemyTurn,
                _ => Intent::ResolveBattle,
            },
            View::Captured => Intent::WaitInCaptivity,
            View::Village => Intent::Leave,
            View::Town(view) => self.town_intent(snapshot, view),
            View::Map => self.map_intent(snapshot),
        }
    }

    fn pick_choice(&self, event: &GameEvent, gold: u32) -> ChoiceId {
        let affordable = |choice: &&GameChoice| choice.cost.is_none_or(|cost| cost <= gold);
        let fight = |choice: &&GameChoice| choice.kind == ChoiceKind::Combat;

        let picked = match self.strategy {
            GameplayStrategy::Aggressive => event
                .choices
                .iter()
                .find(fight)
                .or_else(|| event.choices.iter().find(affordable)),
            _ => event
                .choices
                .iter()
                .filter(affordable)
                .find(|choice| !fight(choice))
                .or_else(|| event.choices.iter().find(fight)),
        };
        picked
            .or_else(|| event.choices.first())
            .map_or(ChoiceId::A, |choice| choice.id)
    }

    fn map_intent(&mut self, snapshot: &CampaignSnapshot) -> Intent {
        let profile = &snapshot.profile;
        let wounded = profile.stats.current_hp.saturating_mul(2) < profile.stats.max_hp;
        match self.strategy {
            GameplayStrategy::Aggressive => Intent::Patrol,
            GameplayStrategy::Cautious if wounded => Intent::WaitHour,
            GameplayStrategy::Cautious => Intent::Patrol,
            GameplayStrategy::Wanderer => {
                let fresh = profile.current_location_id.is_some()
                    && profile.current_location_id != self.last_entered;
                if fresh && self.rng.gen_bool(0.5) {
                    self.enter(snapshot)
                } else {
                    self.roam(snapshot, false)
                }
            }
            GameplayStrategy::Merchant => {
                if let Some(item) = upgrade_in_pack(snapshot) {
                    return Intent::Equip {
                        item_id: item.id.clone(),
                    };
                }
                let at_town = current_has_commerce(snapshot);
                if at_town && profile.current_location_id != self.last_entered {
                    self.enter(snapshot)
                } else {
                    self.roam(snapshot, true)
                }
            }
        }
    }

    fn town_intent(&mut self, snapshot: &CampaignSnapshot, view: TownView) -> Intent {
        if self.strategy != GameplayStrategy::Merchant {
            return Intent::Leave;
        }
        match view {
            TownView::Market if !self.shopped => {
                self.shopped = true;
                best_affordable(snapshot).map_or(Intent::Leave, |item| Intent::Buy {
                    item_id: item.id.clone(),
                })
            }
            TownView::Center if !self.shopped => Intent::OpenTownView {
                view: TownView::Market,
            },
            _ => Intent::Leave,
        }
    }

    fn enter(&mut self, snapshot: &CampaignSnapshot) -> Intent {
        self.last_entered.clone_from(&snapshot.profile.current_location_id);
        self.shopped = false;
        Intent::EnterLocation
    }

    fn roam(&mut self, snapshot: &CampaignSnapshot, towns_only: bool) -> Intent {
        let here = snapshot.profile.current_location_id.as_deref();
        let candidates: Vec<&str> = map_nodes()
            .iter()
            .filter(|node| Some(node.id) != here)
            .filter(|node| !towns_only || node.node_type.has_commerce())
            .map(|node| node.id)
            .collect();
        if candidates.is_empty() {
            return Intent::Patrol;
        }
        let pick = self.rng.gen_range(0..candidates.len());
        Intent::TravelTo {
            node_id: candidates[pick].to_string(),
        }
    }
}

fn current_has_commerce(snapshot: &CampaignSnapshot) -> bool {
    let here = snapshot.profile.current_location_id.as_deref();
    map_nodes()
        .iter()
        .any(|node| Some(node.id) == here && node.node_type.has_commerce())
}

fn improves(snapshot: &CampaignSnapshot, item: &Item) -> bool {
    item.kind
        .slot()
        .is_some_and(|slot| item.stat_bonus > snapshot.profile.equipment.bonus(slot))
}

fn upgrade_in_pack(snapshot: &CampaignSnapshot) -> Option<&Item> {
    snapshot
        .profile
        .inventory
        .iter()
        .find(|item| improves(snapshot, item))
}

/// The strongest upgrade the purse covers.
fn best_affordable(snapshot: &CampaignSnapshot) -> Option<&Item> {
    let gold = snapshot.profile.stats.gold;
    snapshot
        .market
        .iter()
        .filter(|item| item.value <= gold && improves(snapshot, item))
        .max_by_key(|item| (item.stat_bonus, std::cmp::Reverse(item.value)))
}
