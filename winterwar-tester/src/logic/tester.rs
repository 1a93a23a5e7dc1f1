use std::hash::Hasher;
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use twox_hash::XxHash64;
use winterwar_game::{
    BattleResolution, CampaignConfig, CampaignSession, CampaignSnapshot, CharacterDraft, Effect,
    IntentError, OfflineOracle, Signal,
};

use super::policy::{Autopilot, GameplayStrategy};

type Session = CampaignSession<OfflineOracle, Vec<Signal>>;

/// Why a single autopilot run was flagged.
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error("step {step}: {intent} rejected: {source}")]
    Rejected {
        step: usize,
        intent: &'static str,
        source: IntentError,
    },
    #[error("step {step}: {detail}")]
    Invariant { step: usize, detail: String },
    #[error("replay of seed {seed} diverged ({first:016x} vs {second:016x})")]
    Diverged { seed: u64, first: u64, second: u64 },
    #[error("snapshot could not be digested: {0}")]
    Digest(#[from] serde_json::Error),
}

/// What one seeded campaign looked like after the autopilot was done with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub strategy: GameplayStrategy,
    pub seed: u64,
    pub steps: usize,
    pub day: u32,
    pub gold: u32,
    pub hp: u32,
    pub renown: u32,
    pub victories: u32,
    pub captures: u32,
    pub purchases: u32,
    pub journeys: u32,
    pub digest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub runs: Vec<RunSummary>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

/// Runs autopilot campaigns and checks the session invariants after every
/// accepted intent.
pub struct LogicTester {
    draft: CharacterDraft,
    config: CampaignConfig,
    max_steps: usize,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(
        draft: CharacterDraft,
        config: CampaignConfig,
        max_steps: usize,
        verbose: bool,
    ) -> Self {
        Self {
            draft,
            config,
            max_steps,
            verbose,
        }
    }

    pub fn run_strategy(
        &self,
        strategy: GameplayStrategy,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing strategy: {} (seed: {seed})",
                        strategy.label().bright_white()
                    );
                }
                self.run_single_scenario(strategy, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        strategy: GameplayStrategy,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut failures = Vec::new();
        let mut runs = Vec::new();
        let mut durations = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            match self.run_checked(strategy, iteration_seed) {
                Ok(summary) => {
                    durations.push(start_time.elapsed());
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{iterations} day {} gold {} \
                             victories {} captures {}",
                            i + 1,
                            summary.day,
                            summary.gold,
                            summary.victories,
                            summary.captures
                        );
                    }
                    runs.push(summary);
                }
                Err(err) => {
                    log::warn!("{strategy} seed {iteration_seed}: {err}");
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{iterations} failed: {}",
                            i + 1,
                            err.to_string().red()
                        );
                    }
                    failures.push(format!(
                        "Iteration {} (strategy {strategy}, seed {iteration_seed}): {err}",
                        i + 1
                    ));
                }
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: strategy.label().to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: runs.len(),
            failures,
            runs,
            average_duration,
        }
    }

    /// Play the seed twice and insist both runs end on the same snapshot.
    fn run_checked(&self, strategy: GameplayStrategy, seed: u64) -> Result<RunSummary, RunFailure> {
        let first = self.play(strategy, seed)?;
        let second = self.play(strategy, seed)?;
        if first.digest != second.digest {
            return Err(RunFailure::Diverged {
                seed,
                first: u64::from_str_radix(&first.digest, 16).unwrap_or_default(),
                second: u64::from_str_radix(&second.digest, 16).unwrap_or_default(),
            });
        }
        Ok(first)
    }

    pub fn play(&self, strategy: GameplayStrategy, seed: u64) -> Result<RunSummary, RunFailure> {
        let mut session: Session = CampaignSession::new(
            &self.draft,
            seed,
            self.config.clone(),
            OfflineOracle,
            Vec::new(),
        );
        let mut pilot = Autopilot::new(strategy, seed);
        let mut summary = RunSummary {
            strategy,
            seed,
            steps: 0,
            day: 0,
            gold: 0,
            hp: 0,
            renown: 0,
            victories: 0,
            captures: 0,
            purchases: 0,
            journeys: 0,
            digest: String::new(),
        };

        for step in 0..self.max_steps {
            let intent = pilot.next_intent(session.snapshot());
            let name = intent.name();
            let outcome = session
                .dispatch(intent)
                .map_err(|source| RunFailure::Rejected {
                    step,
                    intent: name,
                    source,
                })?;
            match outcome.effect {
                Effect::BattleResolved(BattleResolution::Victory { .. }) => summary.victories += 1,
                Effect::BattleResolved(BattleResolution::Captured { .. }) => summary.captures += 1,
                Effect::Purchased(_) => summary.purchases += 1,
                Effect::Arrived { .. } => summary.journeys += 1,
                _ => {}
            }
            check_invariants(session.snapshot())
                .map_err(|detail| RunFailure::Invariant { step, detail })?;
            summary.steps = step + 1;
        }

        let profile = session.profile();
        summary.day = profile.time.day;
        summary.gold = profile.stats.gold;
        summary.hp = profile.stats.current_hp;
        summary.renown = profile.clan.renown;
        summary.digest = format!("{:016x}", snapshot_digest(session.snapshot())?);
        Ok(summary)
    }
}

/// xxHash64 of the snapshot's JSON form.
pub fn snapshot_digest(snapshot: &CampaignSnapshot) -> Result<u64, serde_json::Error> {
    let bytes = serde_json::to_vec(snapshot)?;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(&bytes);
    Ok(hasher.finish())
}

fn check_invariants(snapshot: &CampaignSnapshot) -> Result<(), String> {
    let profile = &snapshot.profile;
    if snapshot.battle.is_some() != (snapshot.view == winterwar_game::View::Battle) {
        return Err(format!("battle present in the {} view", snapshot.view));
    }
    if profile.is_prisoner != (snapshot.view == winterwar_game::View::Captured) {
        return Err(format!("prisoner flag out of step with the {} view", snapshot.view));
    }
    if profile.stats.current_hp > profile.stats.max_hp {
        return Err(format!(
            "hp {} above maximum {}",
            profile.stats.current_hp, profile.stats.max_hp
        ));
    }
    if profile.time.hour >= 24 {
        return Err(format!("clock reads hour {}", profile.time.hour));
    }
    if let Some(battle) = &snapshot.battle
        && (battle.enemy_hp < 0 || battle.player_hp < 0 || battle.enemy_hp > battle.enemy_max_hp)
    {
        return Err(format!(
            "battle hp out of range: player {} enemy {}/{}",
            battle.player_hp, battle.enemy_hp, battle.enemy_max_hp
        ));
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winterwar_game::{Background, Culture};

    fn tester(max_steps: usize) -> LogicTester {
        LogicTester::new(
            CharacterDraft::new(Culture::Mountain, Background::Smith),
            CampaignConfig::default(),
            max_steps,
            false,
        )
    }

    #[test]
    fn every_strategy_survives_a_short_campaign() {
        let tester = tester(150);
        for strategy in GameplayStrategy::ALL {
            let results = tester.run_strategy(strategy, &[3, 1337], 2);
            for result in results {
                assert!(result.passed, "{strategy}: {:?}", result.failures);
                assert_eq!(result.successful_iterations, 2);
            }
        }
    }

    #[test]
    fn replays_share_a_digest() {
        let tester = tester(120);
        let first = tester.play(GameplayStrategy::Wanderer, 77).unwrap();
        let second = tester.play(GameplayStrategy::Wanderer, 77).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.digest.len(), 16);
    }

    #[test]
    fn aggressive_runs_see_combat() {
        let summary = tester(200).play(GameplayStrategy::Aggressive, 5).unwrap();
        assert!(summary.victories + summary.captures > 0);
    }

    #[test]
    fn invariants_catch_a_stray_battle() {
        let mut snapshot = CampaignSnapshot::new(winterwar_game::create_profile(
            &CharacterDraft::new(Culture::City, Background::Orphan),
        ));
        assert!(check_invariants(&snapshot).is_ok());
        snapshot.profile.is_prisoner = true;
        assert!(check_invariants(&snapshot).is_err());
    }
}
