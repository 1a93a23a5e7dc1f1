mod common;
mod logic;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use common::{OutputTarget, split_csv};
use logic::{GameplayStrategy, LogicTester, ScenarioResult, resolve_seed_inputs};
use winterwar_game::{Background, CampaignConfig, CharacterDraft, Culture};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CultureArg {
    Steppe,
    Mountain,
    City,
}

impl From<CultureArg> for Culture {
    fn from(value: CultureArg) -> Self {
        match value {
            CultureArg::Steppe => Self::Steppe,
            CultureArg::Mountain => Self::Mountain,
            CultureArg::City => Self::City,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackgroundArg {
    Smith,
    Poacher,
    Orphan,
}

impl From<BackgroundArg> for Background {
    fn from(value: BackgroundArg) -> Self {
        match value {
            BackgroundArg::Smith => Self::Smith,
            BackgroundArg::Poacher => Self::Poacher,
            BackgroundArg::Orphan => Self::Orphan,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "winterwar-tester", version = "0.1.0")]
#[command(about = "Seeded autopilot campaigns for Winterwar with invariant and replay checks")]
struct Args {
    /// Strategies to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated integers or `sweep:N`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Consecutive seeds played per listed seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Intents dispatched per campaign
    #[arg(long, default_value_t = 400)]
    max_steps: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Campaign tuning as a JSON document; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = CultureArg::Mountain)]
    culture: CultureArg,

    #[arg(long, value_enum, default_value_t = BackgroundArg::Smith)]
    background: BackgroundArg,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let strategies = expand_strategies(&args.strategies)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let config = load_config(args.config.as_deref())?;
    let draft = CharacterDraft::new(args.culture.into(), args.background.into());
    log::info!(
        "running {} strategies over {} seeds, {} steps each",
        strategies.len(),
        seeds.len(),
        args.max_steps
    );

    let tester = LogicTester::new(draft, config, args.max_steps, args.verbose);
    let results: Vec<ScenarioResult> = strategies
        .iter()
        .flat_map(|&strategy| tester.run_strategy(strategy, &seeds, args.iterations))
        .collect();

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target, "Available strategies:")?;
    for strategy in GameplayStrategy::ALL {
        let key = strategy
            .to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default();
        writeln!(output_target, "  {key:12} - {strategy}")?;
    }
    output_target.flush()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "❄️  Winterwar Campaign Tester".bright_cyan().bold());
    println!("{}", "==============================".cyan());
}

fn expand_strategies(arg: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(arg) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(GameplayStrategy::ALL);
            continue;
        }
        match GameplayStrategy::from_str(&token, true) {
            Ok(strategy) => strategies.push(strategy),
            Err(_) => bail!("Unknown strategy: {token}"),
        }
    }
    strategies.dedup();
    if strategies.is_empty() {
        bail!("No strategies selected");
    }
    Ok(strategies)
}

fn load_config(path: Option<&Path>) -> Result<CampaignConfig> {
    let Some(path) = path else {
        return Ok(CampaignConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    CampaignConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    if output_target.is_file() {
        colored::control::set_override(false);
    }

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, results)?,
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(output_target, "No campaigns executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(output_target)?;
            writeln!(output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from(["winterwar-tester"]).unwrap();
        assert_eq!(args.strategies, "all");
        assert_eq!(args.iterations, 3);
        assert_eq!(args.max_steps, 400);
        assert!(matches!(args.culture, CultureArg::Mountain));
    }

    #[test]
    fn unknown_report_format_is_refused() {
        assert!(Args::try_parse_from(["winterwar-tester", "--report", "csv"]).is_err());
    }

    #[test]
    fn strategies_expand_and_validate() {
        assert_eq!(expand_strategies("all").unwrap().len(), 4);
        assert_eq!(
            expand_strategies("merchant, Cautious").unwrap(),
            vec![GameplayStrategy::Merchant, GameplayStrategy::Cautious]
        );
        assert!(expand_strategies("berserker").is_err());
        assert!(expand_strategies(" , ").is_err());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!(
            "winterwar-config-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::write(&path, r#"{"ambush_chance": 0.5}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!((config.ambush_chance - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.market_size, CampaignConfig::default().market_size);

        std::fs::write(&path, r#"{"ambush_chance": 3.0}"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert!(load_config(Some(Path::new("/nonexistent/winterwar.json"))).is_err());
    }
}
