//! Tuning surface consumed by the economy, encounter and hangar systems.
//!
//! Every formula reads its constants from a [`GameConfig`] handed to the
//! system constructor. Defaults reproduce the shipped balance; a TOML file may
//! override any subset of fields.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::UpgradeAttribute;

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}")]
    Io {
        /// Location of the file that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration contents were not valid TOML for this schema.
    #[error("failed to parse config toml")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value that would break a formula invariant.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable description of the constraint.
        reason: String,
    },
}

/// Aggregated tuning knobs for one game installation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Selectable difficulty range and its pricing.
    pub difficulty: DifficultyConfig,
    /// Wave timeline, spawn scaling coefficients and boss tuning.
    pub encounter: EncounterConfig,
    /// Reward formula constants.
    pub reward: RewardConfig,
    /// Permanent upgrade prices and level caps.
    pub upgrades: UpgradeConfig,
    /// Play area geometry and player defaults.
    pub arena: ArenaConfig,
}

impl GameConfig {
    /// Parses a configuration from TOML and validates it.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects values that would leave a formula unbounded or undefined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.difficulty.validate()?;
        self.encounter.validate()?;
        self.reward.validate()?;
        self.arena.validate()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Selectable difficulty range and cost curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Lowest selectable multiplier.
    pub min: f64,
    /// Highest selectable multiplier.
    pub max: f64,
    /// Linear merit cost per +1.0 of difficulty before the logarithmic surcharge.
    pub cost_base: u64,
    /// Resolution of the affordability bisection.
    pub search_tolerance: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 100_000.0,
            cost_base: 15,
            search_tolerance: 0.01,
        }
    }
}

impl DifficultyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.min > 0.0) {
            return Err(invalid("difficulty.min", "must be finite and positive"));
        }
        if !(self.max.is_finite() && self.max >= self.min) {
            return Err(invalid("difficulty.max", "must be finite and at least `min`"));
        }
        if !(self.search_tolerance > 0.0) {
            return Err(invalid("difficulty.search_tolerance", "must be positive"));
        }
        Ok(())
    }
}

/// Relative weights used to pick an enemy archetype within one wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeWeights {
    /// Weight of the straight-flying basic fighter.
    pub basic: u32,
    /// Weight of the weaving zigzag fighter.
    pub zigzag: u32,
    /// Weight of the slower, sturdier shooter.
    pub shooter: u32,
    /// Weight of the heavily armoured tank.
    pub tank: u32,
}

impl ArchetypeWeights {
    /// Creates a weight table.
    #[must_use]
    pub const fn new(basic: u32, zigzag: u32, shooter: u32, tank: u32) -> Self {
        Self {
            basic,
            zigzag,
            shooter,
            tank,
        }
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.basic) + u64::from(self.zigzag) + u64::from(self.shooter) + u64::from(self.tank)
    }
}

/// Wave timeline, spawn scaling and boss tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Length of a whole run including the boss phase; reaching it forces victory.
    pub total_duration_ms: u64,
    /// Length of the ordinary-enemy phase before the boss appears.
    pub small_phase_duration_ms: u64,
    /// Number of waves in the enemy phase.
    pub wave_count: u32,
    /// Length of each wave.
    pub wave_length_ms: u64,
    /// Minimum spawn interval per wave, shrinking wave by wave.
    pub wave_min_intervals_ms: Vec<u64>,
    /// Concurrent enemy allowance at baseline difficulty.
    pub base_concurrent: u32,
    /// Enemies spawned per spawn event at baseline difficulty.
    pub base_batch: u32,
    /// Spawn intervals never fall below this value.
    pub spawn_interval_floor_ms: u64,
    /// Concurrent enemy cap never exceeds this value.
    pub concurrent_hard_ceiling: u32,
    /// Logarithmic coefficient shrinking the spawn interval.
    pub delay_log_k: f64,
    /// Logarithmic coefficient growing the concurrency cap.
    pub cap_log_k: f64,
    /// Logarithmic coefficient growing the batch size.
    pub batch_log_k: f64,
    /// Upper bound of the batch growth factor.
    pub batch_scale_ceiling: f64,
    /// Logarithmic coefficient growing enemy speed.
    pub speed_log_k: f64,
    /// Logarithmic coefficient growing enemy and boss hit points.
    pub hp_log_k: f64,
    /// Cap of the wave-driven base hit points before difficulty scaling.
    pub enemy_hp_cap: u32,
    /// Hit point multiplier applied to tanks.
    pub tank_hp_multiplier: f64,
    /// Boss hit points at baseline difficulty.
    pub boss_base_hp: u32,
    /// Time into the boss phase after which the boss takes double damage.
    pub enrage_start_ms: u64,
    /// Time into the boss phase after which the boss takes triple damage.
    pub triple_damage_start_ms: u64,
    /// Archetype weights per wave; waves past the end reuse the last table.
    pub archetype_tables: Vec<ArchetypeWeights>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            total_duration_ms: 60_000,
            small_phase_duration_ms: 45_000,
            wave_count: 5,
            wave_length_ms: 9_000,
            wave_min_intervals_ms: vec![600, 500, 400, 320, 250],
            base_concurrent: 120,
            base_batch: 2,
            spawn_interval_floor_ms: 80,
            concurrent_hard_ceiling: 60,
            delay_log_k: 1.0,
            cap_log_k: 0.2,
            batch_log_k: 0.15,
            batch_scale_ceiling: 2.5,
            speed_log_k: 0.2,
            hp_log_k: 2.0,
            enemy_hp_cap: 5,
            tank_hp_multiplier: 2.0,
            boss_base_hp: 60,
            enrage_start_ms: 10_000,
            triple_damage_start_ms: 14_000,
            archetype_tables: vec![
                ArchetypeWeights::new(70, 30, 0, 0),
                ArchetypeWeights::new(50, 25, 25, 0),
                ArchetypeWeights::new(40, 20, 20, 20),
                ArchetypeWeights::new(30, 20, 25, 25),
            ],
        }
    }
}

impl EncounterConfig {
    /// Total run duration.
    #[must_use]
    pub const fn total_duration(&self) -> Duration {
        Duration::from_millis(self.total_duration_ms)
    }

    /// Duration of the ordinary-enemy phase.
    #[must_use]
    pub const fn small_phase_duration(&self) -> Duration {
        Duration::from_millis(self.small_phase_duration_ms)
    }

    /// Duration of a single wave.
    #[must_use]
    pub const fn wave_length(&self) -> Duration {
        Duration::from_millis(self.wave_length_ms)
    }

    /// Absolute lower bound on the spawn interval.
    #[must_use]
    pub const fn spawn_interval_floor(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_floor_ms)
    }

    /// Boss-phase time at which double damage starts.
    #[must_use]
    pub const fn enrage_start(&self) -> Duration {
        Duration::from_millis(self.enrage_start_ms)
    }

    /// Boss-phase time at which triple damage starts.
    #[must_use]
    pub const fn triple_damage_start(&self) -> Duration {
        Duration::from_millis(self.triple_damage_start_ms)
    }

    /// Highest valid wave index.
    #[must_use]
    pub fn last_wave_index(&self) -> u32 {
        self.wave_count.saturating_sub(1)
    }

    /// Configured minimum spawn interval for `wave`, clamped to the last configured wave.
    #[must_use]
    pub fn wave_min_interval(&self, wave: u32) -> Duration {
        let index = usize::try_from(wave).unwrap_or(usize::MAX);
        self.wave_min_intervals_ms
            .get(index)
            .or_else(|| self.wave_min_intervals_ms.last())
            .map_or(self.spawn_interval_floor(), |millis| Duration::from_millis(*millis))
    }

    /// Archetype weights for `wave`, clamped to the last configured table.
    #[must_use]
    pub fn archetype_weights(&self, wave: u32) -> ArchetypeWeights {
        let index = usize::try_from(wave).unwrap_or(usize::MAX);
        self.archetype_tables
            .get(index)
            .or_else(|| self.archetype_tables.last())
            .copied()
            .unwrap_or(ArchetypeWeights::new(1, 0, 0, 0))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.wave_count == 0 {
            return Err(invalid("encounter.wave_count", "must be at least 1"));
        }
        if self.wave_length_ms == 0 {
            return Err(invalid("encounter.wave_length_ms", "must be positive"));
        }
        let expected = usize::try_from(self.wave_count).unwrap_or(usize::MAX);
        if self.wave_min_intervals_ms.len() != expected {
            return Err(invalid(
                "encounter.wave_min_intervals_ms",
                format!(
                    "expected {expected} entries, found {}",
                    self.wave_min_intervals_ms.len()
                ),
            ));
        }
        if self.small_phase_duration_ms > self.total_duration_ms {
            return Err(invalid(
                "encounter.small_phase_duration_ms",
                "must not exceed total_duration_ms",
            ));
        }
        if self.concurrent_hard_ceiling == 0 {
            return Err(invalid("encounter.concurrent_hard_ceiling", "must be at least 1"));
        }
        if self.base_batch == 0 {
            return Err(invalid("encounter.base_batch", "must be at least 1"));
        }
        if !(self.batch_scale_ceiling >= 1.0) {
            return Err(invalid("encounter.batch_scale_ceiling", "must be at least 1.0"));
        }
        if self.enrage_start_ms > self.triple_damage_start_ms {
            return Err(invalid(
                "encounter.enrage_start_ms",
                "must not exceed triple_damage_start_ms",
            ));
        }
        if self.archetype_tables.is_empty() {
            return Err(invalid("encounter.archetype_tables", "needs at least one table"));
        }
        if self.archetype_tables.iter().any(|table| table.total() == 0) {
            return Err(invalid(
                "encounter.archetype_tables",
                "every table needs a positive weight",
            ));
        }
        Ok(())
    }
}

/// Reward formula constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Multiplier applied to the difficulty cost to obtain the base reward.
    pub base_cost_factor: f64,
    /// Base reward used when the difficulty was free.
    pub baseline_base: u64,
    /// Share of the base paid per binary order of magnitude of difficulty.
    pub difficulty_bonus_factor: f64,
    /// Share of the base paid at a perfect kill ratio.
    pub kill_bonus_factor: f64,
    /// Kill ratio at which the kill bonus starts.
    pub kill_threshold: f64,
    /// Kill ratio span over which the kill bonus ramps to full.
    pub kill_span: f64,
    /// Share of the base paid for finishing with the whole clock remaining.
    pub speed_bonus_factor: f64,
    /// Remaining-time ratio at which the speed bonus starts.
    pub speed_threshold: f64,
    /// Remaining-time span over which the speed bonus ramps to full.
    pub speed_span: f64,
    /// Share of the base paid for a full clear including the boss.
    pub boss_bonus_factor: f64,
    /// Kill ratio required for the perfect-run capstone.
    pub perfect_kill_ratio: f64,
    /// Remaining-time ratio that must be exceeded for the perfect-run capstone.
    pub perfect_speed_ratio: f64,
    /// Share of the running bonus sum paid as the perfect-run capstone.
    pub perfect_bonus_factor: f64,
    /// Lowest total paid for any victory.
    pub minimum_total: u64,
    /// Divisor applied to the would-be victory base when a run is lost.
    pub consolation_divisor: u64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_cost_factor: 1.5,
            baseline_base: 10,
            difficulty_bonus_factor: 0.5,
            kill_bonus_factor: 0.5,
            kill_threshold: 0.7,
            kill_span: 0.3,
            speed_bonus_factor: 0.3,
            speed_threshold: 0.2,
            speed_span: 0.8,
            boss_bonus_factor: 0.3,
            perfect_kill_ratio: 0.95,
            perfect_speed_ratio: 0.3,
            perfect_bonus_factor: 0.5,
            minimum_total: 10,
            consolation_divisor: 3,
        }
    }
}

impl RewardConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let factors = [
            ("reward.base_cost_factor", self.base_cost_factor),
            ("reward.difficulty_bonus_factor", self.difficulty_bonus_factor),
            ("reward.kill_bonus_factor", self.kill_bonus_factor),
            ("reward.speed_bonus_factor", self.speed_bonus_factor),
            ("reward.boss_bonus_factor", self.boss_bonus_factor),
            ("reward.perfect_bonus_factor", self.perfect_bonus_factor),
        ];
        for (field, value) in factors {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be finite and non-negative"));
            }
        }
        if self.consolation_divisor == 0 {
            return Err(invalid("reward.consolation_divisor", "must be at least 1"));
        }
        Ok(())
    }
}

/// Price and level cap of one upgrade attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRule {
    /// Price of the first level; each further level doubles it.
    pub base_cost: u64,
    /// Highest purchasable level.
    pub max_level: u32,
}

impl UpgradeRule {
    /// Creates a rule.
    #[must_use]
    pub const fn new(base_cost: u64, max_level: u32) -> Self {
        Self {
            base_cost,
            max_level,
        }
    }
}

/// Permanent upgrade prices and level caps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    /// +0.5 shots per second per level.
    pub fire_rate: UpgradeRule,
    /// +1 bullet per volley per level.
    pub bullets_per_shot: UpgradeRule,
    /// +1 pierced enemy per level.
    pub penetration: UpgradeRule,
    /// 5 degrees of spread per level.
    pub spread_narrow: UpgradeRule,
    /// +0.5 bullet speed per level.
    pub bullet_speed: UpgradeRule,
    /// +1 bullet damage per level.
    pub bullet_damage: UpgradeRule,
    /// +5% burst chance per level.
    pub burst_chance: UpgradeRule,
    /// Homing bullets; a single level.
    pub homing: UpgradeRule,
    /// +0.02 rad homing turn rate per level.
    pub turn_rate: UpgradeRule,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            fire_rate: UpgradeRule::new(1, 50),
            bullets_per_shot: UpgradeRule::new(3, 19),
            penetration: UpgradeRule::new(2, 10),
            spread_narrow: UpgradeRule::new(1, 35),
            bullet_speed: UpgradeRule::new(1, 44),
            bullet_damage: UpgradeRule::new(3, 10),
            burst_chance: UpgradeRule::new(2, 20),
            homing: UpgradeRule::new(2_147_483_647, 1),
            turn_rate: UpgradeRule::new(2, 49),
        }
    }
}

impl UpgradeConfig {
    /// Rule governing `attribute`.
    #[must_use]
    pub const fn rule(&self, attribute: UpgradeAttribute) -> UpgradeRule {
        match attribute {
            UpgradeAttribute::FireRate => self.fire_rate,
            UpgradeAttribute::BulletsPerShot => self.bullets_per_shot,
            UpgradeAttribute::Penetration => self.penetration,
            UpgradeAttribute::SpreadNarrow => self.spread_narrow,
            UpgradeAttribute::BulletSpeed => self.bullet_speed,
            UpgradeAttribute::BulletDamage => self.bullet_damage,
            UpgradeAttribute::BurstChance => self.burst_chance,
            UpgradeAttribute::Homing => self.homing,
            UpgradeAttribute::TurnRate => self.turn_rate,
        }
    }
}

/// Play area geometry and player defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Width of the play area in world units.
    pub width: f32,
    /// Height of the play area in world units.
    pub height: f32,
    /// Lives the player starts a run with.
    pub player_lives: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            player_lives: 3,
        }
    }
}

impl ArenaConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(invalid("arena", "width and height must be positive"));
        }
        if self.player_lives == 0 {
            return Err(invalid("arena.player_lives", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_toml_overrides_keep_other_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [difficulty]
            max = 500.0

            [encounter]
            concurrent_hard_ceiling = 12
            "#,
        )
        .expect("config parses");

        assert!((config.difficulty.max - 500.0).abs() < f64::EPSILON);
        assert_eq!(config.difficulty.cost_base, 15);
        assert_eq!(config.encounter.concurrent_hard_ceiling, 12);
        assert_eq!(config.encounter.wave_count, 5);
    }

    #[test]
    fn mismatched_wave_intervals_are_rejected() {
        let error = GameConfig::from_toml_str(
            r#"
            [encounter]
            wave_count = 3
            "#,
        )
        .expect_err("interval table no longer matches wave count");

        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "encounter.wave_min_intervals_ms",
                ..
            }
        ));
    }

    #[test]
    fn zero_hard_ceiling_is_rejected() {
        let mut config = GameConfig::default();
        config.encounter.concurrent_hard_ceiling = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn wave_lookups_clamp_to_last_entry() {
        let config = EncounterConfig::default();
        assert_eq!(config.wave_min_interval(0), Duration::from_millis(600));
        assert_eq!(config.wave_min_interval(42), Duration::from_millis(250));
        assert_eq!(config.archetype_weights(9), ArchetypeWeights::new(30, 20, 25, 25));
    }
}
