use std::time::Duration;

use star_sortie_core::{
    DifficultyConfig, DifficultyMultiplier, RewardBreakdown, RewardConfig, RunTally,
};
use star_sortie_system_economy::DifficultyEconomy;

fn economy() -> DifficultyEconomy {
    DifficultyEconomy::new(DifficultyConfig::default(), RewardConfig::default())
}

fn multiplier(value: f64) -> DifficultyMultiplier {
    DifficultyMultiplier::clamped(value, &DifficultyConfig::default())
}

#[test]
fn baseline_and_easier_difficulties_are_free() {
    let lenient = DifficultyConfig {
        min: 0.25,
        ..DifficultyConfig::default()
    };
    let economy = DifficultyEconomy::new(lenient.clone(), RewardConfig::default());
    for value in [0.25, 0.5, 0.9, 1.0] {
        let selected = DifficultyMultiplier::clamped(value, &lenient);
        assert_eq!(economy.cost(selected), 0, "m = {value}");
    }
}

#[test]
fn cost_is_monotonic_above_baseline() {
    let economy = economy();
    let mut previous = 0;
    let mut value = 1.0;
    while value < 100_000.0 {
        value = value * 1.07 + 0.003;
        let cost = economy.cost(multiplier(value));
        assert!(cost >= previous, "cost dropped at m = {value}");
        previous = cost;
    }
}

#[test]
fn max_affordable_never_overspends() {
    let economy = economy();
    assert_eq!(economy.max_affordable(0).get(), 1.0);

    for currency in [1, 7, 22, 23, 100, 1_000, 54_321, 10_000_000] {
        let found = economy.max_affordable(currency);
        assert!(
            economy.cost(found) <= currency,
            "currency {currency} bought m = {}",
            found.get()
        );
        let just_above = multiplier(found.get() + 0.02);
        assert!(
            economy.cost(just_above) > currency,
            "currency {currency} left a better multiplier than {}",
            found.get()
        );
    }
}

#[test]
fn max_affordable_returns_ceiling_when_everything_fits() {
    let economy = economy();
    assert_eq!(economy.max_affordable(u64::MAX).get(), 100_000.0);
}

#[test]
fn defeat_pays_nothing_from_the_breakdown() {
    let breakdown = economy().compute_detailed_reward(
        multiplier(1.0),
        0,
        10,
        Duration::from_secs(60),
        Duration::from_secs(60),
        false,
    );
    assert_eq!(breakdown, RewardBreakdown::ZERO);
}

#[test]
fn baseline_full_clear_matches_documented_sum() {
    let breakdown = economy().compute_detailed_reward(
        multiplier(1.0),
        10,
        10,
        Duration::from_secs(10),
        Duration::from_secs(60),
        true,
    );

    assert_eq!(breakdown.base, 10);
    assert_eq!(breakdown.difficulty_bonus, 0);
    assert_eq!(breakdown.kill_bonus, 5);
    // 10 * 0.3 * ((50/60 - 0.2) / 0.8) = 2.375
    assert_eq!(breakdown.speed_bonus, 2);
    assert_eq!(breakdown.boss_bonus, 3);
    assert_eq!(breakdown.perfect_bonus, 10);
    assert_eq!(breakdown.total, 30);
    assert_eq!(breakdown.performance_score, 95);
}

#[test]
fn instant_full_clear_earns_perfect_bonus() {
    let breakdown = economy().compute_detailed_reward(
        multiplier(8.0),
        25,
        25,
        Duration::ZERO,
        Duration::from_secs(60),
        true,
    );
    assert!(breakdown.perfect_bonus > 0);
    assert!(breakdown.total >= 10);
    assert_eq!(breakdown.performance_score, 100);
}

#[test]
fn zero_denominators_contribute_nothing() {
    let breakdown = economy().compute_detailed_reward(
        multiplier(1.0),
        0,
        0,
        Duration::from_secs(5),
        Duration::ZERO,
        true,
    );
    assert_eq!(breakdown.kill_bonus, 0);
    assert_eq!(breakdown.speed_bonus, 0);
    assert_eq!(breakdown.boss_bonus, 0);
    assert_eq!(breakdown.perfect_bonus, 0);
    assert_eq!(breakdown.total, 10);
    assert_eq!(breakdown.performance_score, 0);
}

#[test]
fn victory_total_respects_minimum() {
    let economy = DifficultyEconomy::new(
        DifficultyConfig::default(),
        RewardConfig {
            baseline_base: 2,
            ..RewardConfig::default()
        },
    );
    let breakdown = economy.compute_detailed_reward(
        multiplier(1.0),
        0,
        10,
        Duration::from_secs(60),
        Duration::from_secs(60),
        true,
    );
    assert_eq!(breakdown.total, 10);
}

#[test]
fn defeat_settles_with_a_third_of_victory_base() {
    let economy = economy();
    let mut tally = RunTally::new();
    for _ in 0..10 {
        tally.record_spawn();
    }
    let outcome = tally.finalize(false, Duration::from_secs(60), Duration::from_secs(60));
    let selected = multiplier(4.0);

    let settlement = economy.settle(&outcome, selected);

    // cost(4) = 90, victory base = round(90 * 1.5) = 135
    assert!(settlement.consolation);
    assert_eq!(settlement.breakdown.base, 135);
    assert_eq!(settlement.payout, 45);
    assert_eq!(settlement.breakdown.total, 45);
    assert_eq!(settlement.breakdown.kill_bonus, 0);
}

#[test]
fn victory_settles_with_full_breakdown() {
    let economy = economy();
    let mut tally = RunTally::new();
    for _ in 0..9 {
        tally.record_spawn();
        tally.record_kill();
    }
    tally.record_boss_spawn();
    tally.record_boss_kill();
    let outcome = tally.finalize(true, Duration::from_secs(10), Duration::from_secs(60));

    let settlement = economy.settle(&outcome, multiplier(1.0));

    assert!(!settlement.consolation);
    assert_eq!(settlement.payout, 30);
    assert_eq!(settlement.breakdown.performance_score, 95);
}
