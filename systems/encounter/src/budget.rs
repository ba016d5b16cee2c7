//! Per-axis spawn scaling. Every axis is bounded for any multiplier the
//! difficulty range admits.

use std::time::Duration;

use star_sortie_core::{
    scaling::{self, LogBase},
    DifficultyMultiplier, EncounterConfig, SpawnBudget,
};

const INTERVAL_RELIEF_FLOOR: f64 = 0.5;
const CAP_RELIEF_FLOOR: f64 = 0.5;
const HP_RELIEF_FLOOR: f64 = 0.5;
const SPEED_RELIEF_FLOOR: f64 = 0.6;

/// Derives the full spawn budget for `wave` at `difficulty`.
#[must_use]
pub fn derive(config: &EncounterConfig, difficulty: DifficultyMultiplier, wave: u32) -> SpawnBudget {
    SpawnBudget {
        interval_floor: spawn_interval(config, difficulty, wave),
        concurrent_cap: concurrent_cap(config, difficulty),
        batch_size: batch_size(config, difficulty),
        enemy_hp: enemy_hp(config, difficulty, wave),
        enemy_speed_scale: speed_scale(config, difficulty),
    }
}

/// Minimum time between spawn events; never below the configured floor.
#[must_use]
pub fn spawn_interval(config: &EncounterConfig, difficulty: DifficultyMultiplier, wave: u32) -> Duration {
    let d = difficulty.get();
    let divisor = if d > 1.0 {
        let k = positive_or_one(config.delay_log_k);
        scaling::log_growth(d, k, LogBase::Ten).max(1.0)
    } else {
        d.max(INTERVAL_RELIEF_FLOOR)
    };
    scaling::divide_duration(config.wave_min_interval(wave), divisor)
        .max(config.spawn_interval_floor())
}

/// Concurrent ordinary enemies allowed; within `[1, concurrent_hard_ceiling]`.
#[must_use]
pub fn concurrent_cap(config: &EncounterConfig, difficulty: DifficultyMultiplier) -> u32 {
    let scale = scaling::difficulty_scale(
        difficulty.get(),
        config.cap_log_k,
        LogBase::Ten,
        CAP_RELIEF_FLOOR,
    );
    scaling::floor_u32(f64::from(config.base_concurrent) * scale)
        .min(config.concurrent_hard_ceiling)
        .max(1)
}

/// Enemies per spawn event before the free-space clamp; at least 1.
#[must_use]
pub fn batch_size(config: &EncounterConfig, difficulty: DifficultyMultiplier) -> u32 {
    let d = difficulty.get();
    let scale = if d > 1.0 {
        scaling::log_growth(d, config.batch_log_k, LogBase::Ten).min(config.batch_scale_ceiling)
    } else {
        1.0
    };
    scaling::floor_u32(f64::from(config.base_batch) * scale).max(1)
}

/// Hit points of a basic enemy in `wave`; at least 1.
#[must_use]
pub fn enemy_hp(config: &EncounterConfig, difficulty: DifficultyMultiplier, wave: u32) -> u32 {
    let wave_hp = (1 + wave / 2).min(config.enemy_hp_cap.max(1));
    let scale = scaling::difficulty_scale(
        difficulty.get(),
        positive_or_one(config.hp_log_k),
        LogBase::Two,
        HP_RELIEF_FLOOR,
    );
    scaling::ceil_u32(f64::from(wave_hp) * scale).max(1)
}

/// Velocity multiplier for spawned enemies.
#[must_use]
pub fn speed_scale(config: &EncounterConfig, difficulty: DifficultyMultiplier) -> f64 {
    scaling::difficulty_scale(
        difficulty.get(),
        config.speed_log_k,
        LogBase::Ten,
        SPEED_RELIEF_FLOOR,
    )
}

/// Boss hit points; never below the configured base.
#[must_use]
pub fn boss_hp(config: &EncounterConfig, difficulty: DifficultyMultiplier) -> u32 {
    let growth = scaling::log_growth(difficulty.get().max(1.0), config.hp_log_k, LogBase::Ten);
    scaling::ceil_u32(f64::from(config.boss_base_hp) * growth.max(1.0)).max(1)
}

fn positive_or_one(coefficient: f64) -> f64 {
    if coefficient > 0.0 {
        coefficient
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_sortie_core::DifficultyConfig;

    fn at(value: f64) -> DifficultyMultiplier {
        DifficultyMultiplier::clamped(value, &DifficultyConfig::default())
    }

    #[test]
    fn baseline_budget_matches_wave_table() {
        let config = EncounterConfig::default();
        let budget = derive(&config, at(1.0), 0);
        assert_eq!(budget.interval_floor, Duration::from_millis(600));
        assert_eq!(budget.concurrent_cap, 60);
        assert_eq!(budget.batch_size, 2);
        assert_eq!(budget.enemy_hp, 1);
        assert!((budget.enemy_speed_scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hp_grows_with_wave_and_difficulty() {
        let config = EncounterConfig::default();
        assert_eq!(enemy_hp(&config, at(1.0), 4), 3);
        // 3 * (1 + 2 * log2 4) = 15
        assert_eq!(enemy_hp(&config, at(4.0), 4), 15);
        // wave contribution caps at 5
        assert_eq!(enemy_hp(&config, at(1.0), 40), 5);
    }

    #[test]
    fn interval_shrinks_with_difficulty_down_to_floor() {
        let config = EncounterConfig::default();
        // 600 / (1 + log10 10) = 300
        assert_eq!(spawn_interval(&config, at(10.0), 0), Duration::from_millis(300));
        assert_eq!(spawn_interval(&config, at(100_000.0), 4), Duration::from_millis(80));
    }

    #[test]
    fn easier_than_baseline_slows_spawns_and_weakens_enemies() {
        let config = EncounterConfig::default();
        let lenient = DifficultyConfig {
            min: 0.25,
            ..DifficultyConfig::default()
        };
        let easy = DifficultyMultiplier::clamped(0.25, &lenient);
        assert_eq!(spawn_interval(&config, easy, 0), Duration::from_millis(1_200));
        assert_eq!(concurrent_cap(&config, easy), 60);
        assert_eq!(batch_size(&config, easy), 2);
        assert!((speed_scale(&config, easy) - 0.6).abs() < f64::EPSILON);
        assert_eq!(enemy_hp(&config, easy, 0), 1);
    }

    #[test]
    fn boss_hp_uses_decimal_growth() {
        let config = EncounterConfig::default();
        assert_eq!(boss_hp(&config, at(1.0)), 60);
        // 60 * (1 + 2 * log10 100) = 300
        assert_eq!(boss_hp(&config, at(100.0)), 300);
    }

    #[test]
    fn non_positive_coefficients_fall_back_to_unit_growth() {
        let config = EncounterConfig {
            delay_log_k: 0.0,
            hp_log_k: -3.0,
            ..EncounterConfig::default()
        };
        assert_eq!(spawn_interval(&config, at(10.0), 0), Duration::from_millis(300));
        // 1 * (1 + log2 4) = 3
        assert_eq!(enemy_hp(&config, at(4.0), 0), 3);
    }
}
