//! Headless sortie driver: a fixed-timestep loop wiring the world, the
//! encounter scheduler and a scripted gunner together.

use std::time::Duration;

use anyhow::{anyhow, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use star_sortie_core::{
    BossDamageMultiplier, Command, DifficultyMultiplier, Event, GameConfig, RunOutcome,
    UpgradeAttribute, UpgradeLevels,
};
use star_sortie_system_encounter::EncounterScheduler;
use star_sortie_world::{self as world, query, World};

/// One 60 Hz frame.
pub(crate) const STEP: Duration = Duration::from_micros(16_667);

const BASE_VOLLEY_FRAMES: u32 = 15;
const MIN_VOLLEY_FRAMES: u32 = 3;
const GUNNER_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Scripted gunner that shoots at the lowest enemy, or the boss when no enemy is in sight.
#[derive(Debug)]
pub(crate) struct Gunner {
    accuracy: f64,
    damage: u32,
    shots_per_volley: u32,
    volley_frames: u32,
    rng: ChaCha8Rng,
}

impl Gunner {
    /// Builds a gunner whose firepower follows the purchased upgrade levels.
    pub(crate) fn new(accuracy: f64, levels: &UpgradeLevels, seed: u64) -> Self {
        let accuracy = if accuracy.is_finite() {
            accuracy.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let fire_rate = levels.level(UpgradeAttribute::FireRate);
        Self {
            accuracy,
            damage: 1 + levels.level(UpgradeAttribute::BulletDamage),
            shots_per_volley: 1 + levels.level(UpgradeAttribute::BulletsPerShot),
            volley_frames: BASE_VOLLEY_FRAMES
                .saturating_sub(fire_rate.saturating_mul(2))
                .max(MIN_VOLLEY_FRAMES),
            rng: ChaCha8Rng::seed_from_u64(seed ^ GUNNER_STREAM),
        }
    }

    fn fire(
        &mut self,
        frame: u64,
        world: &World,
        multiplier: BossDamageMultiplier,
        out: &mut Vec<Command>,
    ) {
        if frame % u64::from(self.volley_frames) != 0 {
            return;
        }
        let target = query::enemies(world)
            .into_iter()
            .filter(|enemy| enemy.position.y > 0.0)
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y));
        let boss_present = query::boss(world).is_some();

        for _ in 0..self.shots_per_volley {
            if !self.rng.gen_bool(self.accuracy) {
                continue;
            }
            if let Some(enemy) = &target {
                out.push(Command::DamageEnemy {
                    enemy: enemy.id,
                    amount: self.damage,
                });
            } else if boss_present {
                out.push(Command::DamageBoss {
                    amount: self.damage,
                    multiplier,
                });
            }
        }
    }
}

/// Flies one complete run and returns its finalized outcome.
///
/// Every enemy that slips past the bottom of the arena costs the player a life.
pub(crate) fn fly(
    config: &GameConfig,
    difficulty: DifficultyMultiplier,
    seed: u64,
    mut gunner: Gunner,
) -> Result<RunOutcome> {
    let total = config.encounter.total_duration();
    let mut scheduler = EncounterScheduler::new(config.encounter.clone(), difficulty, seed)
        .with_arena(&config.arena);
    let mut world = World::new(&config.arena, total);

    let frame_limit = u64::try_from(total.as_nanos() / STEP.as_nanos())
        .unwrap_or(u64::MAX)
        .saturating_add(2);
    let mut events: Vec<Event> = Vec::new();
    let mut commands: Vec<Command> = Vec::new();
    let mut frame: u64 = 0;

    while !query::is_resolved(&world) && frame <= frame_limit {
        world::apply(&mut world, Command::Tick { dt: STEP }, &mut events);
        let now = query::clock(&world);

        for event in &events {
            if let Event::EnemyEscaped { .. } = event {
                commands.push(Command::DamagePlayer { amount: 1 });
            }
        }
        scheduler.handle(&events, now, &world, &mut commands);
        events.clear();

        gunner.fire(
            frame,
            &world,
            scheduler.boss_damage_multiplier(now),
            &mut commands,
        );

        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        frame += 1;
    }

    tracing::debug!(frames = frame, lives = query::lives(&world), "sortie loop finished");
    query::run_outcome(&world)
        .cloned()
        .ok_or_else(|| anyhow!("sortie did not resolve within {frame_limit} frames"))
}

#[cfg(test)]
mod tests {
    use star_sortie_core::DifficultyConfig;

    use super::*;

    fn difficulty(value: f64) -> DifficultyMultiplier {
        DifficultyMultiplier::clamped(value, &DifficultyConfig::default())
    }

    #[test]
    fn upgrades_shorten_the_volley_interval() {
        let mut levels = UpgradeLevels::new();
        assert_eq!(Gunner::new(1.0, &levels, 0).volley_frames, 15);
        levels.set_level(UpgradeAttribute::FireRate, 3);
        assert_eq!(Gunner::new(1.0, &levels, 0).volley_frames, 9);
        levels.set_level(UpgradeAttribute::FireRate, 40);
        assert_eq!(Gunner::new(1.0, &levels, 0).volley_frames, MIN_VOLLEY_FRAMES);
    }

    #[test]
    fn accuracy_is_clamped() {
        let levels = UpgradeLevels::new();
        assert_eq!(Gunner::new(4.0, &levels, 0).accuracy, 1.0);
        assert_eq!(Gunner::new(f64::NAN, &levels, 0).accuracy, 0.0);
    }

    #[test]
    fn blind_gunner_loses_at_high_difficulty() {
        let config = GameConfig::default();
        let gunner = Gunner::new(0.0, &UpgradeLevels::new(), 3);
        let outcome = fly(&config, difficulty(50.0), 3, gunner).expect("resolves");
        assert!(!outcome.victory);
        assert_eq!(outcome.enemies_killed, 0);
    }

    #[test]
    fn same_seed_flies_the_same_sortie() {
        let config = GameConfig::default();
        let levels = UpgradeLevels::new();
        let first = fly(&config, difficulty(2.0), 11, Gunner::new(0.8, &levels, 11));
        let second = fly(&config, difficulty(2.0), 11, Gunner::new(0.8, &levels, 11));
        assert_eq!(first.expect("first"), second.expect("second"));
    }
}
