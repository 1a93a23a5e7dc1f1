use std::collections::VecDeque;
use std::time::Duration;

use crate::attributes::{CharacterDraft, create_profile};
use crate::combat::BattlePhase;
use crate::config::CampaignConfig;
use crate::constants::LOG_OPENING;
use crate::dice::{DiceStreams, RngBundle};
use crate::narrative::{BoundedOracle, NarrativeOracle, request_opening_scene};
use crate::profile::CharacterProfile;
use crate::signals::SignalSink;

use super::{CampaignSnapshot, Intent, IntentError, Message, Outcome, ReducerContext, View, reduce};

/// High-level session binding a snapshot to its dice, oracle and signal sink.
///
/// The snapshot is only ever replaced by a successful reduction. Every oracle
/// call is bounded by `oracle_timeout_ms` and falls back when it runs out.
#[derive(Debug, Clone)]
pub struct CampaignSession<O, S, R = RngBundle> {
    snapshot: CampaignSnapshot,
    dice: R,
    oracle: BoundedOracle<O>,
    signals: S,
    config: CampaignConfig,
    opening_scene: String,
    messages: VecDeque<Message>,
}

impl<O, S> CampaignSession<O, S, RngBundle>
where
    O: NarrativeOracle + Send + 'static,
    S: SignalSink,
{
    /// Start a campaign with dice streams derived from `seed`.
    #[must_use]
    pub fn new(
        draft: &CharacterDraft,
        seed: u64,
        config: CampaignConfig,
        oracle: O,
        signals: S,
    ) -> Self {
        Self::with_dice(draft, RngBundle::from_user_seed(seed), config, oracle, signals)
    }

    /// User seed behind the dice streams.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.dice.seed()
    }
}

impl<O, S, R> CampaignSession<O, S, R>
where
    O: NarrativeOracle + Send + 'static,
    S: SignalSink,
    R: DiceStreams,
{
    /// Start a campaign with caller-supplied dice.
    #[must_use]
    pub fn with_dice(
        draft: &CharacterDraft,
        dice: R,
        config: CampaignConfig,
        oracle: O,
        signals: S,
    ) -> Self {
        let limit = Duration::from_millis(config.oracle_timeout_ms);
        let mut session = Self {
            snapshot: CampaignSnapshot::new(create_profile(draft)),
            dice,
            oracle: BoundedOracle::new(oracle, limit),
            signals,
            config,
            opening_scene: String::new(),
            messages: VecDeque::new(),
        };
        session.open();
        session
    }

    fn open(&mut self) {
        let scene =
            request_opening_scene(&mut self.oracle, &self.snapshot.profile).into_value();
        log::info!(
            "campaign opens for {} on day {}",
            self.snapshot.profile.name,
            self.snapshot.profile.time.day
        );
        self.record(Message::new(LOG_OPENING, scene.clone()));
        self.opening_scene = scene;
    }

    fn record(&mut self, message: Message) {
        self.messages.push_front(message);
        self.messages.truncate(self.config.message_log_len);
    }

    /// Reduce one intent and commit the result.
    ///
    /// # Errors
    ///
    /// The reducer's rejection. The snapshot stays as it was and the error
    /// text is added to the message log.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome, IntentError> {
        let mut ctx = ReducerContext {
            dice: &mut self.dice,
            oracle: &mut self.oracle,
            config: &self.config,
            signals: &mut self.signals,
        };
        match reduce(&self.snapshot, intent, &mut ctx) {
            Ok((next, outcome)) => {
                self.snapshot = next;
                for message in &outcome.messages {
                    self.record(message.clone());
                }
                Ok(outcome)
            }
            Err(err) => {
                self.record(Message::new(err.message_key(), err.to_string()));
                Err(err)
            }
        }
    }

    /// Set out for `node_id` and tick until the journey ends in arrival or
    /// an ambush. Travelling to the current node enters it instead.
    ///
    /// # Errors
    ///
    /// Whatever the first rejected intent reports.
    pub fn travel_to_completion(&mut self, node_id: &str) -> Result<Vec<Outcome>, IntentError> {
        let mut outcomes = vec![self.dispatch(Intent::TravelTo {
            node_id: node_id.to_string(),
        })?];
        while self.snapshot.is_traveling() {
            outcomes.push(self.dispatch(Intent::TravelTick)?);
        }
        Ok(outcomes)
    }

    /// Replace the character. Dice keep rolling from where they were.
    pub fn restart(&mut self, draft: &CharacterDraft) {
        self.snapshot = CampaignSnapshot::new(create_profile(draft));
        self.messages.clear();
        self.open();
    }

    /// Pause a presentation layer should hold before sending `EnemyTurn`.
    /// `None` unless the enemy turn is deferred and due.
    #[must_use]
    pub fn enemy_turn_delay(&self) -> Option<Duration> {
        let due = self
            .snapshot
            .battle
            .as_ref()
            .is_some_and(|battle| battle.phase == BattlePhase::EnemyTurn);
        (self.config.defer_enemy_turn && due)
            .then(|| Duration::from_millis(self.config.enemy_turn_delay_ms))
    }

    /// Message log, newest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[must_use]
    pub const fn snapshot(&self) -> &CampaignSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn profile(&self) -> &CharacterProfile {
        &self.snapshot.profile
    }

    #[must_use]
    pub const fn view(&self) -> View {
        self.snapshot.view
    }

    #[must_use]
    pub const fn config(&self) -> &CampaignConfig {
        &self.config
    }

    #[must_use]
    pub fn opening_scene(&self) -> &str {
        &self.opening_scene
    }

    #[must_use]
    pub const fn signals(&self) -> &S {
        &self.signals
    }

    pub const fn signals_mut(&mut self) -> &mut S {
        &mut self.signals
    }

    #[must_use]
    pub const fn dice(&self) -> &R {
        &self.dice
    }

    #[must_use]
    pub fn into_snapshot(self) -> CampaignSnapshot {
        self.snapshot
    }
}
