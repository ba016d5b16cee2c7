#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command line front end for Star Sortie.
//!
//! Quotes difficulty prices, manages the merit ledger and flies headless
//! sorties end to end.

mod autopilot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use star_sortie_core::{
    DifficultyMultiplier, GameConfig, ProgressionLedger, RewardBreakdown, UpgradeAttribute,
};
use star_sortie_ledger::FileLedger;
use star_sortie_system_economy::{DifficultyEconomy, Settlement, UpgradePricing};
use star_sortie_system_encounter::budget;
use star_sortie_system_hangar::{Deployment, Workshop};
use tracing_subscriber::EnvFilter;

use crate::autopilot::Gunner;

const DEFAULT_LEDGER: &str = "star-sortie-profile.json";

/// Star Sortie difficulty economy and headless encounter runner.
#[derive(Debug, Parser)]
#[command(name = "star-sortie", version, about)]
struct Cli {
    /// TOML file overriding the built-in tuning.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON file holding the merit balance and upgrade levels.
    #[arg(long, global = true, default_value = DEFAULT_LEDGER)]
    ledger: PathBuf,
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Prints the price of a difficulty and the spawn budget of every wave.
    Quote {
        /// Difficulty multiplier to price.
        difficulty: f64,
    },
    /// Prints the highest difficulty a balance affords.
    Afford {
        /// Balance to test; defaults to the ledger balance.
        #[arg(long)]
        merits: Option<u64>,
    },
    /// Prints the ledger balance and upgrade levels.
    Balance,
    /// Credits merits to the ledger.
    Grant {
        /// Merits to credit.
        amount: u64,
    },
    /// Buys, or with `--refund` sells back, one level of an upgrade.
    Upgrade {
        /// Attribute key, e.g. `fire_rate`.
        attribute: UpgradeAttribute,
        /// Refund the most recent level instead of buying one.
        #[arg(long)]
        refund: bool,
    },
    /// Deploys at a difficulty and flies a headless sortie.
    Sortie {
        /// Requested difficulty; lowered to what the balance affords.
        #[arg(long, default_value_t = 1.0)]
        difficulty: f64,
        /// Seed for the encounter and the gunner.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Probability that each autopilot shot hits.
        #[arg(long, default_value_t = 0.85)]
        accuracy: f64,
        /// Overrides the configured starting lives.
        #[arg(long)]
        lives: Option<u32>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    run(cli.action, config, cli.ledger)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn open_ledger(path: PathBuf) -> Result<FileLedger> {
    let display = path.display().to_string();
    FileLedger::open(path).with_context(|| format!("failed to open ledger at {display}"))
}

fn run(action: Action, config: GameConfig, ledger_path: PathBuf) -> Result<()> {
    let economy = DifficultyEconomy::new(config.difficulty.clone(), config.reward.clone());
    match action {
        Action::Quote { difficulty } => {
            quote(&config, &economy, difficulty);
            Ok(())
        }
        Action::Afford { merits } => {
            let merits = match merits {
                Some(merits) => merits,
                None => open_ledger(ledger_path)?.balance(),
            };
            let ceiling = economy.max_affordable(merits);
            println!(
                "{merits} merits afford difficulty x{:.3} (cost {})",
                ceiling.get(),
                economy.cost(ceiling)
            );
            Ok(())
        }
        Action::Balance => {
            let ledger = open_ledger(ledger_path)?;
            println!("merits: {}", ledger.balance());
            let levels = ledger.upgrade_levels()?;
            for attribute in UpgradeAttribute::ALL {
                println!("  {attribute:<18} level {}", levels.level(attribute));
            }
            Ok(())
        }
        Action::Grant { amount } => {
            let mut ledger = open_ledger(ledger_path)?;
            ledger.add(amount);
            println!("credited {amount}; merits: {}", ledger.balance());
            Ok(())
        }
        Action::Upgrade { attribute, refund } => {
            let mut ledger = open_ledger(ledger_path)?;
            let workshop = Workshop::new(UpgradePricing::new(config.upgrades.clone()));
            let receipt = if refund {
                workshop.refund(&mut ledger, attribute)?
            } else {
                workshop.purchase(&mut ledger, attribute)?
            };
            let verb = if refund { "refunded" } else { "paid" };
            println!(
                "{} now level {}; {verb} {} merits; merits: {}",
                receipt.attribute,
                receipt.level,
                receipt.merits,
                ledger.balance()
            );
            Ok(())
        }
        Action::Sortie {
            difficulty,
            seed,
            accuracy,
            lives,
        } => {
            let mut config = config;
            if let Some(lives) = lives {
                config.arena.player_lives = lives.max(1);
            }
            let mut ledger = open_ledger(ledger_path)?;
            sortie(&config, economy, &mut ledger, difficulty, seed, accuracy)
        }
    }
}

fn quote(config: &GameConfig, economy: &DifficultyEconomy, requested: f64) {
    let difficulty = DifficultyMultiplier::clamped(requested, &config.difficulty);
    println!(
        "difficulty x{:.3} costs {} merits",
        difficulty.get(),
        economy.cost(difficulty)
    );
    println!("wave  interval  cap  batch  hp  speed");
    for wave in 0..=config.encounter.last_wave_index() {
        let spawn = budget::derive(&config.encounter, difficulty, wave);
        println!(
            "{wave:>4}  {:>6}ms  {:>3}  {:>5}  {:>2}  {:>5.2}",
            spawn.interval_floor.as_millis(),
            spawn.concurrent_cap,
            spawn.batch_size,
            spawn.enemy_hp,
            spawn.enemy_speed_scale
        );
    }
    println!(
        "boss hp {}",
        budget::boss_hp(&config.encounter, difficulty)
    );
}

fn sortie(
    config: &GameConfig,
    economy: DifficultyEconomy,
    ledger: &mut FileLedger,
    requested: f64,
    seed: u64,
    accuracy: f64,
) -> Result<()> {
    let mut deployment = Deployment::new(economy.clone());
    let selected = deployment.select(&*ledger, requested);
    if selected.get() != requested {
        tracing::warn!(
            requested,
            selected = selected.get(),
            "requested difficulty adjusted to the selectable, affordable range"
        );
    }
    let receipt = deployment.confirm(ledger)?;
    println!(
        "deployed at x{:.3} for {} merits",
        receipt.difficulty.get(),
        receipt.cost
    );

    let levels = ledger.upgrade_levels()?;
    let gunner = Gunner::new(accuracy, &levels, seed);
    let outcome = autopilot::fly(config, receipt.difficulty, seed, gunner)?;
    let settlement = economy.settle(&outcome, receipt.difficulty);
    ledger.add(settlement.payout);

    println!(
        "{} after {:.1}s: {}/{} destroyed{}",
        if outcome.victory { "victory" } else { "defeat" },
        outcome.elapsed.as_secs_f64(),
        outcome.enemies_killed,
        outcome.enemies_spawned,
        if outcome.boss_killed { ", boss down" } else { "" }
    );
    print_settlement(&settlement);
    println!("merits: {}", ledger.balance());
    Ok(())
}

fn print_settlement(settlement: &Settlement) {
    let RewardBreakdown {
        base,
        difficulty_bonus,
        kill_bonus,
        speed_bonus,
        boss_bonus,
        perfect_bonus,
        total,
        performance_score,
    } = settlement.breakdown;
    if settlement.consolation {
        println!("consolation {} (victory base {base})", settlement.payout);
        return;
    }
    println!("base        {base:>8}");
    println!("difficulty  {difficulty_bonus:>8}");
    println!("kills       {kill_bonus:>8}");
    println!("speed       {speed_bonus:>8}");
    println!("boss        {boss_bonus:>8}");
    println!("perfect     {perfect_bonus:>8}");
    println!("total       {total:>8}  (score {performance_score})");
}
