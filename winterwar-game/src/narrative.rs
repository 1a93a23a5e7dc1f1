//! Narrative oracle contract and the fallback content used when it fails.
//!
//! Oracles hand back raw JSON text. Parsing is strict: anything that does not
//! match the typed payload degrades to the fixed fallback, and the caller is
//! told which one it got through [`Narration`].
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use smallvec::smallvec;
use thiserror::Error;

use crate::encounters::{
    ChoiceId, ChoiceKind, EventKind, GameChoice, GameEvent, VillageProblem, VillageProblemKind,
};
use crate::profile::CharacterProfile;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle timed out after {0} ms")]
    Timeout(u64),
    #[error("malformed oracle payload: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for OracleError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Text producer for events, village problems and the opening scene.
pub trait NarrativeOracle {
    /// JSON for a [`GameEvent`] happening near `location`.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    fn travel_event(
        &mut self,
        profile: &CharacterProfile,
        location: &str,
    ) -> Result<String, OracleError>;

    /// JSON for a [`VillageProblem`].
    ///
    /// # Errors
    ///
    /// Any transport failure.
    fn village_problem(&mut self, village_name: &str) -> Result<String, OracleError>;

    /// A line or two of prose introducing the character.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    fn opening_scene(&mut self, profile: &CharacterProfile) -> Result<String, OracleError>;
}

impl<O: NarrativeOracle + ?Sized> NarrativeOracle for &mut O {
    fn travel_event(
        &mut self,
        profile: &CharacterProfile,
        location: &str,
    ) -> Result<String, OracleError> {
        (**self).travel_event(profile, location)
    }

    fn village_problem(&mut self, village_name: &str) -> Result<String, OracleError> {
        (**self).village_problem(village_name)
    }

    fn opening_scene(&mut self, profile: &CharacterProfile) -> Result<String, OracleError> {
        (**self).opening_scene(profile)
    }
}

/// Oracle result, generated or substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narration<T> {
    Generated(T),
    Fallback { value: T, reason: OracleError },
}

impl<T> Narration<T> {
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    #[must_use]
    pub const fn value(&self) -> &T {
        match self {
            Self::Generated(value) | Self::Fallback { value, .. } => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Self::Generated(value) | Self::Fallback { value, .. } => value,
        }
    }

    fn settle(result: Result<T, OracleError>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Self::Generated(value),
            Err(reason) => {
                log::warn!("narrative fallback: {reason}");
                Self::Fallback {
                    value: fallback(),
                    reason,
                }
            }
        }
    }
}

/// Event used when the oracle cannot produce one.
#[must_use]
pub fn fallback_travel_event() -> GameEvent {
    GameEvent {
        title: String::from("Frozen Caravan"),
        description: String::from(
            "A plundered caravan lies by the road. The bodies are still warm.",
        ),
        choices: smallvec![
            GameChoice::new(ChoiceId::A, "Loot", ChoiceKind::Loot),
            GameChoice::new(ChoiceId::B, "Move on", ChoiceKind::Diplomatic),
        ],
        kind: Some(EventKind::Story),
        enemy_strength: None,
        related_lord_id: None,
        related_kingdom: None,
    }
}

#[must_use]
pub fn fallback_village_problem() -> VillageProblem {
    VillageProblem {
        title: String::from("Ice Wolves"),
        description: String::from("Every night the wolves carry off another child."),
        reward_gold: 100,
        reward_relation: 10,
        kind: VillageProblemKind::Combat,
    }
}

pub const FALLBACK_OPENING_SCENE: &str =
    "You open your eyes. The cold burns your lungs. You must survive.";

fn parse_event(raw: &str) -> Result<GameEvent, OracleError> {
    let event: GameEvent = serde_json::from_str(raw)?;
    if event.choices.is_empty() {
        return Err(OracleError::Malformed(String::from("event has no choices")));
    }
    Ok(event)
}

fn parse_village_problem(raw: &str) -> Result<VillageProblem, OracleError> {
    Ok(serde_json::from_str(raw)?)
}

fn parse_scene(raw: String) -> Result<String, OracleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OracleError::Malformed(String::from("empty scene")));
    }
    Ok(trimmed.to_string())
}

/// Ask for a travel event, falling back to the frozen caravan.
pub fn request_travel_event<O: NarrativeOracle + ?Sized>(
    oracle: &mut O,
    profile: &CharacterProfile,
    location: &str,
) -> Narration<GameEvent> {
    let result = oracle
        .travel_event(profile, location)
        .and_then(|raw| parse_event(&raw));
    Narration::settle(result, fallback_travel_event)
}

/// Ask for a village problem, falling back to the ice wolves.
pub fn request_village_problem<O: NarrativeOracle + ?Sized>(
    oracle: &mut O,
    village_name: &str,
) -> Narration<VillageProblem> {
    let result = oracle
        .village_problem(village_name)
        .and_then(|raw| parse_village_problem(&raw));
    Narration::settle(result, fallback_village_problem)
}

pub fn request_opening_scene<O: NarrativeOracle + ?Sized>(
    oracle: &mut O,
    profile: &CharacterProfile,
) -> Narration<String> {
    let result = oracle.opening_scene(profile).and_then(parse_scene);
    Narration::settle(result, || FALLBACK_OPENING_SCENE.to_string())
}

/// Oracle with no backend. Every request falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

impl NarrativeOracle for OfflineOracle {
    fn travel_event(&mut self, _: &CharacterProfile, _: &str) -> Result<String, OracleError> {
        Err(OracleError::Unavailable(String::from("offline")))
    }

    fn village_problem(&mut self, _: &str) -> Result<String, OracleError> {
        Err(OracleError::Unavailable(String::from("offline")))
    }

    fn opening_scene(&mut self, _: &CharacterProfile) -> Result<String, OracleError> {
        Err(OracleError::Unavailable(String::from("offline")))
    }
}

/// Oracle that replays fixed payloads. Missing payloads behave like an
/// offline backend.
#[derive(Debug, Clone, Default)]
pub struct CannedOracle {
    pub travel_event: Option<String>,
    pub village_problem: Option<String>,
    pub opening_scene: Option<String>,
}

impl CannedOracle {
    fn reply(payload: Option<&String>) -> Result<String, OracleError> {
        payload
            .cloned()
            .ok_or_else(|| OracleError::Unavailable(String::from("no canned reply")))
    }
}

impl NarrativeOracle for CannedOracle {
    fn travel_event(&mut self, _: &CharacterProfile, _: &str) -> Result<String, OracleError> {
        Self::reply(self.travel_event.as_ref())
    }

    fn village_problem(&mut self, _: &str) -> Result<String, OracleError> {
        Self::reply(self.village_problem.as_ref())
    }

    fn opening_scene(&mut self, _: &CharacterProfile) -> Result<String, OracleError> {
        Self::reply(self.opening_scene.as_ref())
    }
}

fn timeout_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

/// Oracle whose calls are abandoned after `limit`.
///
/// Every request runs on its own worker thread and the caller waits at most
/// `limit` for the reply. An abandoned call keeps the oracle locked until it
/// returns; later requests queue behind it on their own workers, never on the
/// caller.
#[derive(Debug)]
pub struct BoundedOracle<O> {
    inner: Arc<Mutex<O>>,
    limit: Duration,
}

impl<O> Clone for BoundedOracle<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            limit: self.limit,
        }
    }
}

impl<O: NarrativeOracle + Send + 'static> BoundedOracle<O> {
    #[must_use]
    pub fn new(oracle: O, limit: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(oracle)),
            limit,
        }
    }

    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    fn call<F>(&self, request: F) -> Result<String, OracleError>
    where
        F: FnOnce(&mut O) -> Result<String, OracleError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name(String::from("narrative-oracle"))
            .spawn(move || {
                let mut oracle = inner.lock().unwrap_or_else(PoisonError::into_inner);
                // The caller may have stopped waiting.
                let _ = reply_tx.send(request(&mut *oracle));
            })
            .map_err(|err| OracleError::Unavailable(err.to_string()))?;

        match reply_rx.recv_timeout(self.limit) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) => Err(OracleError::Timeout(timeout_millis(self.limit))),
            Err(RecvTimeoutError::Disconnected) => Err(OracleError::Unavailable(
                String::from("oracle worker stopped"),
            )),
        }
    }
}

impl<O: NarrativeOracle + Send + 'static> NarrativeOracle for BoundedOracle<O> {
    fn travel_event(
        &mut self,
        profile: &CharacterProfile,
        location: &str,
    ) -> Result<String, OracleError> {
        let profile = profile.clone();
        let location = location.to_string();
        self.call(move |oracle| oracle.travel_event(&profile, &location))
    }

    fn village_problem(&mut self, village_name: &str) -> Result<String, OracleError> {
        let village_name = village_name.to_string();
        self.call(move |oracle| oracle.village_problem(&village_name))
    }

    fn opening_scene(&mut self, profile: &CharacterProfile) -> Result<String, OracleError> {
        let profile = profile.clone();
        self.call(move |oracle| oracle.opening_scene(&profile))
    }
}

#[cfg(feature = "async")]
pub use self::remote::{
    AsyncNarrativeOracle, fetch_opening_scene, fetch_travel_event, fetch_village_problem,
};

/// Async oracle calls bounded by a timeout.
#[cfg(feature = "async")]
mod remote {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{
        FALLBACK_OPENING_SCENE, Narration, OracleError, fallback_travel_event,
        fallback_village_problem, parse_event, parse_scene, parse_village_problem,
        timeout_millis,
    };
    use crate::encounters::{GameEvent, VillageProblem};
    use crate::profile::CharacterProfile;

    #[async_trait]
    pub trait AsyncNarrativeOracle: Send {
        async fn travel_event(
            &mut self,
            profile: &CharacterProfile,
            location: &str,
        ) -> Result<String, OracleError>;

        async fn village_problem(&mut self, village_name: &str) -> Result<String, OracleError>;

        async fn opening_scene(&mut self, profile: &CharacterProfile)
        -> Result<String, OracleError>;
    }

    async fn bounded<F>(limit: Duration, call: F) -> Result<String, OracleError>
    where
        F: std::future::Future<Output = Result<String, OracleError>> + Send,
    {
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(OracleError::Timeout(timeout_millis(limit))))
    }

    pub async fn fetch_travel_event<O: AsyncNarrativeOracle + ?Sized>(
        oracle: &mut O,
        profile: &CharacterProfile,
        location: &str,
        limit: Duration,
    ) -> Narration<GameEvent> {
        let result = bounded(limit, oracle.travel_event(profile, location))
            .await
            .and_then(|raw| parse_event(&raw));
        Narration::settle(result, fallback_travel_event)
    }

    pub async fn fetch_village_problem<O: AsyncNarrativeOracle + ?Sized>(
        oracle: &mut O,
        village_name: &str,
        limit: Duration,
    ) -> Narration<VillageProblem> {
        let result = bounded(limit, oracle.village_problem(village_name))
            .await
            .and_then(|raw| parse_village_problem(&raw));
        Narration::settle(result, fallback_village_problem)
    }

    pub async fn fetch_opening_scene<O: AsyncNarrativeOracle + ?Sized>(
        oracle: &mut O,
        profile: &CharacterProfile,
        limit: Duration,
    ) -> Narration<String> {
        let result = bounded(limit, oracle.opening_scene(profile))
            .await
            .and_then(parse_scene);
        Narration::settle(result, || FALLBACK_OPENING_SCENE.to_string())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::attributes::{Background, CharacterDraft, Culture, create_profile};

        struct SlowOracle {
            delay: Duration,
        }

        #[async_trait]
        impl AsyncNarrativeOracle for SlowOracle {
            async fn travel_event(
                &mut self,
                _: &CharacterProfile,
                _: &str,
            ) -> Result<String, OracleError> {
                tokio::time::sleep(self.delay).await;
                Ok(String::from(concat!(
                    r#"{"title":"Storm","description":"Snow.","#,
                    r#""choices":[{"id":"A","text":"Shelter","type":"WORK"}]}"#,
                )))
            }

            async fn village_problem(&mut self, _: &str) -> Result<String, OracleError> {
                tokio::time::sleep(self.delay).await;
                Ok(String::from("not json"))
            }

            async fn opening_scene(&mut self, _: &CharacterProfile) -> Result<String, OracleError> {
                tokio::time::sleep(self.delay).await;
                Ok(String::from("The storm broke."))
            }
        }

        fn profile() -> CharacterProfile {
            create_profile(&CharacterDraft::new(Culture::City, Background::Orphan))
        }

        #[tokio::test]
        async fn slow_oracle_times_out_to_fallback() {
            let mut oracle = SlowOracle {
                delay: Duration::from_millis(500),
            };
            let narration =
                fetch_travel_event(&mut oracle, &profile(), "n1", Duration::from_millis(10)).await;
            assert_eq!(
                narration,
                Narration::Fallback {
                    value: fallback_travel_event(),
                    reason: OracleError::Timeout(10),
                }
            );
        }

        #[tokio::test]
        async fn prompt_oracle_is_parsed() {
            let mut oracle = SlowOracle {
                delay: Duration::from_millis(1),
            };
            let limit = Duration::from_secs(5);
            let event = fetch_travel_event(&mut oracle, &profile(), "n1", limit).await;
            assert_eq!(event.value().title, "Storm");
            assert!(!event.is_fallback());

            let problem = fetch_village_problem(&mut oracle, "Wolfden", limit).await;
            assert!(problem.is_fallback());

            let scene = fetch_opening_scene(&mut oracle, &profile(), limit).await;
            assert_eq!(scene, Narration::Generated(String::from("The storm broke.")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Background, CharacterDraft, Culture, create_profile};

    fn profile() -> CharacterProfile {
        create_profile(&CharacterDraft::new(Culture::Mountain, Background::Poacher))
    }

    #[test]
    fn offline_oracle_always_falls_back() {
        let mut oracle = OfflineOracle;
        let event = request_travel_event(&mut oracle, &profile(), "n1");
        assert!(event.is_fallback());
        assert_eq!(event.value().title, "Frozen Caravan");
        assert_eq!(event.value().choices.len(), 2);

        let problem = request_village_problem(&mut oracle, "Wolfden").into_value();
        assert_eq!(problem.reward_gold, 100);
        assert_eq!(problem.reward_relation, 10);
        assert_eq!(problem.kind, VillageProblemKind::Combat);

        let scene = request_opening_scene(&mut oracle, &profile());
        assert_eq!(scene.value(), FALLBACK_OPENING_SCENE);
    }

    #[test]
    fn well_formed_payloads_are_generated() {
        let mut oracle = CannedOracle {
            travel_event: Some(String::from(concat!(
                r#"{"title":"Wolves","description":"Howling.","type":"COMBAT","#,
                r#""enemyStrength":120,"choices":[{"id":"A","text":"Fight","type":"COMBAT"},"#,
                r#"{"id":"B","text":"Run","type":"RISKY"}]}"#,
            ))),
            village_problem: Some(String::from(concat!(
                r#"{"title":"Flood","description":"Water.","rewardGold":40,"#,
                r#""rewardRelation":5,"type":"WORK"}"#,
            ))),
            opening_scene: Some(String::from("  Snow falls.  ")),
        };
        let event = request_travel_event(&mut oracle, &profile(), "n3");
        assert_eq!(event.value().enemy_strength, Some(120));
        assert!(!event.is_fallback());
        let problem = request_village_problem(&mut oracle, "Wolfden");
        assert_eq!(problem.value().kind, VillageProblemKind::Work);
        assert_eq!(
            request_opening_scene(&mut oracle, &profile()),
            Narration::Generated(String::from("Snow falls."))
        );
    }

    /// Sleeps before answering every request with `reply`.
    struct SluggishOracle {
        delay: Duration,
        reply: CannedOracle,
    }

    impl NarrativeOracle for SluggishOracle {
        fn travel_event(
            &mut self,
            profile: &CharacterProfile,
            location: &str,
        ) -> Result<String, OracleError> {
            thread::sleep(self.delay);
            self.reply.travel_event(profile, location)
        }

        fn village_problem(&mut self, village_name: &str) -> Result<String, OracleError> {
            thread::sleep(self.delay);
            self.reply.village_problem(village_name)
        }

        fn opening_scene(&mut self, profile: &CharacterProfile) -> Result<String, OracleError> {
            thread::sleep(self.delay);
            self.reply.opening_scene(profile)
        }
    }

    #[test]
    fn stalled_oracle_is_abandoned_at_the_limit() {
        let slow = SluggishOracle {
            delay: Duration::from_millis(1_500),
            reply: CannedOracle {
                opening_scene: Some(String::from("Too late.")),
                ..CannedOracle::default()
            },
        };
        let mut oracle = BoundedOracle::new(slow, Duration::from_millis(10));
        let started = std::time::Instant::now();
        let event = request_travel_event(&mut oracle, &profile(), "n3");
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(
            event,
            Narration::Fallback {
                value: fallback_travel_event(),
                reason: OracleError::Timeout(10),
            }
        );

        // Queued behind the stalled call, still bounded.
        let started = std::time::Instant::now();
        assert!(request_opening_scene(&mut oracle, &profile()).is_fallback());
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn prompt_oracle_answers_through_the_bound() {
        let quick = SluggishOracle {
            delay: Duration::ZERO,
            reply: CannedOracle {
                opening_scene: Some(String::from(" Dawn. ")),
                ..CannedOracle::default()
            },
        };
        let mut oracle = BoundedOracle::new(quick, Duration::from_secs(5));
        assert_eq!(oracle.limit(), Duration::from_secs(5));
        assert_eq!(
            request_opening_scene(&mut oracle, &profile()),
            Narration::Generated(String::from("Dawn."))
        );
        assert!(matches!(
            request_village_problem(&mut oracle, "Wolfden"),
            Narration::Fallback {
                reason: OracleError::Unavailable(_),
                ..
            }
        ));
    }

    #[test]
    fn malformed_payloads_degrade() {
        let mut oracle = CannedOracle {
            travel_event: Some(String::from(
                r#"{"title":"Empty","description":"","choices":[]}"#,
            )),
            village_problem: Some(String::from(r#"{"title":"Bad","rewardGold":-5}"#)),
            opening_scene: Some(String::from("   ")),
        };
        let event = request_travel_event(&mut oracle, &profile(), "n3");
        assert!(matches!(
            event,
            Narration::Fallback {
                reason: OracleError::Malformed(_),
                ..
            }
        ));
        assert!(request_village_problem(&mut oracle, "Wolfden").is_fallback());
        assert!(request_opening_scene(&mut oracle, &profile()).is_fallback());
    }
}
