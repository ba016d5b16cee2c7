#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Encounter scheduling for a single sortie.
//!
//! The scheduler decides when ordinary enemies and the boss enter play and
//! when the run times out. It owns no entities: it observes world events,
//! reads live counts through [`EnemyCensus`], and emits [`Command`] values.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use star_sortie_core::{
    ArchetypeWeights, ArenaConfig, BossDamageMultiplier, Command, DifficultyMultiplier,
    EncounterClock, EncounterConfig, EncounterPhase, EnemyArchetype, EnemyCensus, Event,
    PlanePoint, PlaneSize, PlaneVector, ResolutionCause, SpawnBudget,
};

pub mod budget;

const SPAWN_HEIGHT: f32 = -30.0;
const SPAWN_MARGIN: f32 = 40.0;
const BASE_VERTICAL_SPEED: i32 = 2;

const BOSS_SPAWN_HEIGHT: f32 = 60.0;
const BOSS_VELOCITY: PlaneVector = PlaneVector::new(1.2, 0.8);
const BOSS_SIZE: PlaneSize = PlaneSize::new(100.0, 60.0);

const SHOOTER_SPEED_FACTOR: f64 = 0.6;
const TANK_VERTICAL_FACTOR: f64 = 0.5;
const ZIGZAG_TOUGHENS_FROM_WAVE: u32 = 4;

/// Pure system that drives the enemy and boss phases of a run.
#[derive(Debug)]
pub struct EncounterScheduler {
    config: EncounterConfig,
    difficulty: DifficultyMultiplier,
    spawn_lane_width: u32,
    boss_position: PlanePoint,
    rng: ChaCha8Rng,
    phase: EncounterPhase,
    start_time: Duration,
    phase_start: Duration,
    last_observed: Duration,
    current_wave_index: u32,
    last_spawn_time: Duration,
    boss_spawned: bool,
    spawned_enemies: u32,
}

impl EncounterScheduler {
    /// Creates a scheduler for one run, in the enemy phase with its clock at zero.
    ///
    /// Call [`Self::start`] to anchor the clock at a later run time.
    #[must_use]
    pub fn new(config: EncounterConfig, difficulty: DifficultyMultiplier, seed: u64) -> Self {
        let arena = ArenaConfig::default();
        Self {
            config,
            difficulty,
            spawn_lane_width: spawn_lane_width(&arena),
            boss_position: boss_spawn_point(&arena),
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: EncounterPhase::Enemy,
            start_time: Duration::ZERO,
            phase_start: Duration::ZERO,
            last_observed: Duration::ZERO,
            current_wave_index: 0,
            last_spawn_time: Duration::ZERO,
            boss_spawned: false,
            spawned_enemies: 0,
        }
    }

    /// Sizes the spawn lane and centres the boss spawn on `arena` instead of the default 800 unit width.
    #[must_use]
    pub fn with_arena(mut self, arena: &ArenaConfig) -> Self {
        self.spawn_lane_width = spawn_lane_width(arena);
        self.boss_position = boss_spawn_point(arena);
        self
    }

    /// Resets the clock and enters the enemy phase at `now`.
    pub fn start(&mut self, now: Duration) {
        self.phase = EncounterPhase::Enemy;
        self.start_time = now;
        self.phase_start = now;
        self.last_observed = now;
        self.current_wave_index = 0;
        self.last_spawn_time = now;
        self.boss_spawned = false;
        self.spawned_enemies = 0;
        tracing::info!(
            difficulty = self.difficulty.get(),
            start = ?now,
            "encounter started"
        );
    }

    /// Consumes world events and emits spawn and timeout commands for the step ending at `now`.
    pub fn handle<C>(&mut self, events: &[Event], now: Duration, census: &C, out: &mut Vec<Command>)
    where
        C: EnemyCensus + ?Sized,
    {
        self.last_observed = now;
        if events
            .iter()
            .any(|event| matches!(event, Event::RunResolved { .. }))
        {
            self.enter_phase(EncounterPhase::Resolved, now);
        }
        if self.phase == EncounterPhase::Resolved {
            return;
        }

        let elapsed = now.saturating_sub(self.start_time);
        if elapsed >= self.config.total_duration() {
            out.push(Command::ResolveRun {
                cause: ResolutionCause::Timeout,
            });
            self.enter_phase(EncounterPhase::Resolved, now);
            return;
        }

        if elapsed >= self.config.small_phase_duration() {
            if !self.boss_spawned {
                self.boss_spawned = true;
                let health = budget::boss_hp(&self.config, self.difficulty);
                out.push(Command::SpawnBoss {
                    position: self.boss_position,
                    velocity: BOSS_VELOCITY,
                    size: BOSS_SIZE,
                    health,
                });
                tracing::debug!(health, "boss spawn requested");
            }
            if self.phase == EncounterPhase::Enemy {
                let boss_phase_start = self.boss_phase_start();
                self.enter_phase(EncounterPhase::Boss, boss_phase_start);
            }
            return;
        }

        self.spawn_wave(elapsed, now, census, out);
    }

    /// Damage-taken multiplier for the boss at `now`.
    ///
    /// Measured from the scheduled boss-phase start, so a late first tick does
    /// not delay the enrage.
    #[must_use]
    pub fn boss_damage_multiplier(&self, now: Duration) -> BossDamageMultiplier {
        if !self.boss_spawned {
            return BossDamageMultiplier::Standard;
        }
        let in_phase = now.saturating_sub(self.boss_phase_start());
        if in_phase < self.config.enrage_start() {
            BossDamageMultiplier::Standard
        } else if in_phase < self.config.triple_damage_start() {
            BossDamageMultiplier::Enraged
        } else {
            BossDamageMultiplier::Frenzied
        }
    }

    /// Snapshot of the scheduler clock as of the most recent step.
    #[must_use]
    pub fn clock(&self) -> EncounterClock {
        EncounterClock {
            start_time: self.start_time,
            elapsed_since_phase_start: self.last_observed.saturating_sub(self.phase_start),
            current_wave_index: self.current_wave_index,
            last_spawn_time: self.last_spawn_time,
            boss_spawned: self.boss_spawned,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> EncounterPhase {
        self.phase
    }

    /// Ordinary enemies requested so far.
    #[must_use]
    pub fn spawned_enemies(&self) -> u32 {
        self.spawned_enemies
    }

    /// Spawn budget for the wave currently in progress.
    #[must_use]
    pub fn current_budget(&self) -> SpawnBudget {
        budget::derive(&self.config, self.difficulty, self.current_wave_index)
    }

    fn boss_phase_start(&self) -> Duration {
        self.start_time
            .saturating_add(self.config.small_phase_duration())
    }

    fn enter_phase(&mut self, phase: EncounterPhase, at: Duration) {
        if self.phase == phase {
            return;
        }
        tracing::info!(from = ?self.phase, to = ?phase, at = ?at, "encounter phase changed");
        self.phase = phase;
        self.phase_start = at;
    }

    fn spawn_wave<C>(&mut self, elapsed: Duration, now: Duration, census: &C, out: &mut Vec<Command>)
    where
        C: EnemyCensus + ?Sized,
    {
        let wave = wave_index(&self.config, elapsed);
        self.current_wave_index = wave;
        let budget = budget::derive(&self.config, self.difficulty, wave);

        if now.saturating_sub(self.last_spawn_time) < budget.interval_floor {
            return;
        }

        let active = census.active_ordinary();
        let space = budget.concurrent_cap.saturating_sub(active);
        if space == 0 {
            return;
        }
        let batch = budget.batch_size.clamp(1, space);

        let weights = self.config.archetype_weights(wave);
        for _ in 0..batch {
            let command = self.roll_enemy(wave, &budget, weights);
            out.push(command);
            self.spawned_enemies = self.spawned_enemies.saturating_add(1);
        }
        self.last_spawn_time = now;
        tracing::debug!(wave, batch, active, cap = budget.concurrent_cap, "spawned batch");
    }

    fn roll_enemy(&mut self, wave: u32, budget: &SpawnBudget, weights: ArchetypeWeights) -> Command {
        let x = self.rng.gen_range(0..self.spawn_lane_width) as f32;
        let speed = budget.enemy_speed_scale;
        let lateral = f64::from(self.rng.gen_range(-1_i32..=1)) * speed;
        let vertical = f64::from(BASE_VERTICAL_SPEED + self.rng.gen_range(0_i32..=1)) * speed;
        let archetype = pick_archetype(&mut self.rng, weights);

        let hp = budget.enemy_hp;
        let (health, velocity, size) = match archetype {
            EnemyArchetype::Basic => (hp, (lateral, vertical), PlaneSize::new(30.0, 25.0)),
            EnemyArchetype::Zigzag => {
                let bonus = u32::from(wave >= ZIGZAG_TOUGHENS_FROM_WAVE);
                (hp.saturating_add(bonus), (lateral, vertical), PlaneSize::new(25.0, 20.0))
            }
            EnemyArchetype::Shooter => (
                hp.saturating_add(wave / 2),
                (lateral * SHOOTER_SPEED_FACTOR, vertical * SHOOTER_SPEED_FACTOR),
                PlaneSize::new(35.0, 30.0),
            ),
            EnemyArchetype::Tank => {
                let health = star_sortie_core::scaling::floor_u32(
                    f64::from(hp) * self.config.tank_hp_multiplier,
                )
                .max(1);
                (health, (0.0, vertical * TANK_VERTICAL_FACTOR), PlaneSize::new(45.0, 35.0))
            }
        };

        Command::SpawnEnemy {
            archetype,
            position: PlanePoint::new(x, SPAWN_HEIGHT),
            velocity: PlaneVector::new(velocity.0 as f32, velocity.1 as f32),
            size,
            health,
        }
    }
}

fn wave_index(config: &EncounterConfig, elapsed: Duration) -> u32 {
    let wave_length = config.wave_length().as_nanos().max(1);
    let index = elapsed.as_nanos() / wave_length;
    u32::try_from(index)
        .unwrap_or(u32::MAX)
        .min(config.last_wave_index())
}

fn spawn_lane_width(arena: &ArenaConfig) -> u32 {
    star_sortie_core::scaling::floor_u32(f64::from(arena.width - SPAWN_MARGIN)).max(1)
}

fn boss_spawn_point(arena: &ArenaConfig) -> PlanePoint {
    PlanePoint::new(
        ((arena.width - BOSS_SIZE.width) * 0.5).max(0.0),
        BOSS_SPAWN_HEIGHT,
    )
}

fn pick_archetype(rng: &mut ChaCha8Rng, weights: ArchetypeWeights) -> EnemyArchetype {
    let total = weights.total();
    if total == 0 {
        return EnemyArchetype::Basic;
    }
    let mut roll = rng.gen_range(0..total);
    let table = [
        (EnemyArchetype::Basic, weights.basic),
        (EnemyArchetype::Zigzag, weights.zigzag),
        (EnemyArchetype::Shooter, weights.shooter),
        (EnemyArchetype::Tank, weights.tank),
    ];
    for (archetype, weight) in table {
        let weight = u64::from(weight);
        if roll < weight {
            return archetype;
        }
        roll -= weight;
    }
    EnemyArchetype::Tank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_index_clamps_to_last_wave() {
        let config = EncounterConfig::default();
        assert_eq!(wave_index(&config, Duration::from_millis(8_999)), 0);
        assert_eq!(wave_index(&config, Duration::from_millis(9_000)), 1);
        assert_eq!(wave_index(&config, Duration::from_secs(44)), 4);
        assert_eq!(wave_index(&config, Duration::from_secs(500)), 4);
    }

    #[test]
    fn first_wave_never_rolls_shooters_or_tanks() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let weights = EncounterConfig::default().archetype_weights(0);
        for _ in 0..500 {
            let archetype = pick_archetype(&mut rng, weights);
            assert!(matches!(archetype, EnemyArchetype::Basic | EnemyArchetype::Zigzag));
        }
    }

    #[test]
    fn spawn_lane_follows_arena_width() {
        let arena = ArenaConfig {
            width: 400.0,
            ..ArenaConfig::default()
        };
        assert_eq!(spawn_lane_width(&arena), 360);
        assert_eq!(spawn_lane_width(&ArenaConfig::default()), 760);
    }

    #[test]
    fn boss_spawns_centred_in_the_arena() {
        let arena = ArenaConfig {
            width: 400.0,
            ..ArenaConfig::default()
        };
        assert_eq!(boss_spawn_point(&arena), PlanePoint::new(150.0, 60.0));
        assert_eq!(
            boss_spawn_point(&ArenaConfig::default()),
            PlanePoint::new(350.0, 60.0)
        );
    }

    #[test]
    fn fresh_scheduler_matches_one_started_at_zero() {
        let config = EncounterConfig::default();
        let fresh = EncounterScheduler::new(config.clone(), DifficultyMultiplier::BASELINE, 1);
        let mut restarted = EncounterScheduler::new(config, DifficultyMultiplier::BASELINE, 1);
        restarted.start(Duration::ZERO);

        assert_eq!(fresh.phase(), restarted.phase());
        assert_eq!(fresh.clock(), restarted.clock());
        assert_eq!(fresh.spawned_enemies(), 0);
    }
}
