#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for Star Sortie.

use std::time::Duration;

use glam::Vec2;
use star_sortie_core::{
    ArenaConfig, Command, EnemyArchetype, EnemyCategory, EnemyCensus, EnemyId, Event, PlanePoint,
    PlaneSize, PlaneVector, ResolutionCause, RunOutcome, RunTally,
};

/// Velocities are expressed per frame of a 60 Hz loop.
const FRAMES_PER_SECOND: f32 = 60.0;

const BOSS_PATROL_SIDE_MARGIN: f32 = 50.0;
const BOSS_PATROL_TOP: f32 = 20.0;

const ZIGZAG_AMPLITUDE: f32 = 2.0;
const ZIGZAG_PERIOD_SECS: f32 = 1.0;

#[derive(Debug)]
struct Enemy {
    id: EnemyId,
    archetype: EnemyArchetype,
    position: Vec2,
    velocity: Vec2,
    size: Vec2,
    health: u32,
    weave_phase: f32,
}

impl Enemy {
    fn advance(&mut self, dt_secs: f32) {
        if self.archetype == EnemyArchetype::Zigzag {
            self.weave_phase += std::f32::consts::TAU / ZIGZAG_PERIOD_SECS * dt_secs;
            self.velocity.x = self.weave_phase.sin() * ZIGZAG_AMPLITUDE;
        }
        self.position += self.velocity * FRAMES_PER_SECOND * dt_secs;
    }
}

#[derive(Debug)]
struct Boss {
    position: Vec2,
    velocity: Vec2,
    size: Vec2,
    health: u32,
    max_health: u32,
}

impl Boss {
    fn advance(&mut self, dt_secs: f32, patrol: Patrol) {
        self.position += self.velocity * FRAMES_PER_SECOND * dt_secs;
        let far_corner = self.position + self.size;
        if self.position.x < patrol.min.x || far_corner.x > patrol.max.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < patrol.min.y || far_corner.y > patrol.max.y {
            self.velocity.y = -self.velocity.y;
        }
    }
}

/// Box the boss bounces around in: the upper half of the arena, inset from the sides.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Patrol {
    min: Vec2,
    max: Vec2,
}

impl Patrol {
    fn within(arena: &ArenaConfig) -> Self {
        let min = Vec2::new(BOSS_PATROL_SIDE_MARGIN, BOSS_PATROL_TOP);
        let max = Vec2::new(
            (arena.width - BOSS_PATROL_SIDE_MARGIN).max(min.x),
            (arena.height * 0.5).max(min.y),
        );
        Self { min, max }
    }
}

/// Represents the authoritative state of a single sortie.
#[derive(Debug)]
pub struct World {
    arena_height: f32,
    boss_patrol: Patrol,
    total_duration: Duration,
    clock: Duration,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    boss: Option<Boss>,
    lives: u32,
    tally: Option<RunTally>,
    outcome: Option<RunOutcome>,
    resolution: Option<ResolutionCause>,
}

impl World {
    /// Creates an empty battle world for a run lasting at most `total_duration`.
    #[must_use]
    pub fn new(arena: &ArenaConfig, total_duration: Duration) -> Self {
        Self {
            arena_height: arena.height,
            boss_patrol: Patrol::within(arena),
            total_duration,
            clock: Duration::ZERO,
            enemies: Vec::new(),
            next_enemy_id: 0,
            boss: None,
            lives: arena.player_lives,
            tally: Some(RunTally::new()),
            outcome: None,
            resolution: None,
        }
    }

    fn tally_mut(&mut self) -> Option<&mut RunTally> {
        self.tally.as_mut()
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|candidate| candidate.id == enemy)
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let dt_secs = dt.as_secs_f32();
        for enemy in &mut self.enemies {
            enemy.advance(dt_secs);
        }
        if let Some(boss) = self.boss.as_mut() {
            boss.advance(dt_secs, self.boss_patrol);
        }

        let arena_height = self.arena_height;
        self.enemies.retain(|enemy| {
            if enemy.position.y > arena_height {
                out_events.push(Event::EnemyEscaped {
                    enemy: enemy.id,
                    archetype: enemy.archetype,
                });
                false
            } else {
                true
            }
        });
    }

    fn resolve(&mut self, cause: ResolutionCause, out_events: &mut Vec<Event>) {
        if self.resolution.is_some() {
            return;
        }
        let victory = cause.is_victory();
        self.resolution = Some(cause);
        if let Some(tally) = self.tally.take() {
            let elapsed = self.clock.min(self.total_duration);
            self.outcome = Some(tally.finalize(victory, elapsed, self.total_duration));
        }
        tracing::info!(?cause, victory, clock = ?self.clock, "run resolved");
        out_events.push(Event::RunResolved { victory, cause });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the run is resolved every command is ignored, so the run clock and the
/// finalized outcome stay frozen.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.resolution.is_some() {
        return;
    }

    match command {
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::SpawnEnemy {
            archetype,
            position,
            velocity,
            size,
            health,
        } => {
            let id = EnemyId::new(world.next_enemy_id);
            world.next_enemy_id = world.next_enemy_id.wrapping_add(1);
            world.enemies.push(Enemy {
                id,
                archetype,
                position: Vec2::new(position.x, position.y),
                velocity: Vec2::new(velocity.x, velocity.y),
                size: Vec2::new(size.width, size.height),
                health: health.max(1),
                weave_phase: 0.0,
            });
            if let Some(tally) = world.tally_mut() {
                tally.record_spawn();
            }
            tracing::trace!(enemy = id.get(), archetype = archetype.label(), health, "enemy spawned");
            out_events.push(Event::EnemySpawned {
                enemy: id,
                archetype,
            });
        }
        Command::SpawnBoss {
            position,
            velocity,
            size,
            health,
        } => {
            if world.boss.is_some() {
                return;
            }
            let health = health.max(1);
            world.boss = Some(Boss {
                position: Vec2::new(position.x, position.y),
                velocity: Vec2::new(velocity.x, velocity.y),
                size: Vec2::new(size.width, size.height),
                health,
                max_health: health,
            });
            if let Some(tally) = world.tally_mut() {
                tally.record_boss_spawn();
            }
            tracing::info!(health, "boss entered the arena");
            out_events.push(Event::BossSpawned { health });
        }
        Command::DamageEnemy { enemy, amount } => {
            if amount == 0 {
                return;
            }
            let Some(index) = world.enemy_index(enemy) else {
                return;
            };
            let target = &mut world.enemies[index];
            target.health = target.health.saturating_sub(amount);
            if target.health > 0 {
                return;
            }
            let destroyed = world.enemies.remove(index);
            if let Some(tally) = world.tally_mut() {
                tally.record_kill();
            }
            out_events.push(Event::EnemyDestroyed {
                enemy: destroyed.id,
                archetype: destroyed.archetype,
            });
        }
        Command::DamageBoss { amount, multiplier } => {
            let Some(boss) = world.boss.as_mut() else {
                return;
            };
            let dealt = amount.saturating_mul(multiplier.factor());
            if dealt == 0 {
                return;
            }
            boss.health = boss.health.saturating_sub(dealt);
            let remaining = boss.health;
            out_events.push(Event::BossDamaged {
                amount: dealt,
                remaining,
            });
            if remaining == 0 {
                world.boss = None;
                if let Some(tally) = world.tally_mut() {
                    tally.record_boss_kill();
                }
                world.resolve(ResolutionCause::BossDefeated, out_events);
            }
        }
        Command::DamagePlayer { amount } => {
            if amount == 0 {
                return;
            }
            world.lives = world.lives.saturating_sub(amount);
            out_events.push(Event::PlayerDamaged {
                lives_remaining: world.lives,
            });
            if world.lives == 0 {
                world.resolve(ResolutionCause::PlayerDestroyed, out_events);
            }
        }
        Command::ResolveRun { cause } => world.resolve(cause, out_events),
    }
}

impl EnemyCensus for World {
    fn active(&self, category: EnemyCategory) -> u32 {
        match category {
            EnemyCategory::Boss => u32::from(self.boss.is_some()),
            EnemyCategory::Ordinary(archetype) => {
                let count = self
                    .enemies
                    .iter()
                    .filter(|enemy| enemy.archetype == archetype)
                    .count();
                u32::try_from(count).unwrap_or(u32::MAX)
            }
        }
    }

    fn active_ordinary(&self) -> u32 {
        u32::try_from(self.enemies.len()).unwrap_or(u32::MAX)
    }
}

fn point(value: Vec2) -> PlanePoint {
    PlanePoint::new(value.x, value.y)
}

fn extent(value: Vec2) -> PlaneSize {
    PlaneSize::new(value.x, value.y)
}

fn vector(value: Vec2) -> PlaneVector {
    PlaneVector::new(value.x, value.y)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{extent, point, vector, World};
    use star_sortie_core::{
        EnemyArchetype, EnemyId, PlanePoint, PlaneSize, PlaneVector, ResolutionCause, RunOutcome,
        RunTally,
    };

    /// Run time simulated so far; frozen once the run resolves.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Lives the player has left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Captures the live ordinary enemies in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                archetype: enemy.archetype,
                position: point(enemy.position),
                velocity: vector(enemy.velocity),
                size: extent(enemy.size),
                health: enemy.health,
            })
            .collect()
    }

    /// Captures the boss if it is in play.
    #[must_use]
    pub fn boss(world: &World) -> Option<BossSnapshot> {
        world.boss.as_ref().map(|boss| BossSnapshot {
            position: point(boss.position),
            size: extent(boss.size),
            health: boss.health,
            max_health: boss.max_health,
        })
    }

    /// Running tally; `None` once it has been finalized.
    #[must_use]
    pub fn run_tally(world: &World) -> Option<&RunTally> {
        world.tally.as_ref()
    }

    /// Finalized outcome; `Some` only after the run resolved.
    #[must_use]
    pub fn run_outcome(world: &World) -> Option<&RunOutcome> {
        world.outcome.as_ref()
    }

    /// Reason the run ended, if it has.
    #[must_use]
    pub fn resolution(world: &World) -> Option<ResolutionCause> {
        world.resolution
    }

    /// Whether the run has ended.
    #[must_use]
    pub fn is_resolved(world: &World) -> bool {
        world.resolution.is_some()
    }

    /// Read-only description of a live ordinary enemy.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier of the enemy.
        pub id: EnemyId,
        /// Behaviour family of the enemy.
        pub archetype: EnemyArchetype,
        /// Top-left corner.
        pub position: PlanePoint,
        /// Current displacement per frame.
        pub velocity: PlaneVector,
        /// Bounding box.
        pub size: PlaneSize,
        /// Hit points left.
        pub health: u32,
    }

    /// Read-only description of the boss.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BossSnapshot {
        /// Top-left corner.
        pub position: PlanePoint,
        /// Bounding box.
        pub size: PlaneSize,
        /// Hit points left.
        pub health: u32,
        /// Hit points at spawn.
        pub max_health: u32,
    }
}
