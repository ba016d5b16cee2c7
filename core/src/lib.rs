#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Star Sortie engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative battle world, and pure systems. Systems such as the encounter
//! scheduler emit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that systems observe on the next update step. Systems never
//! reach into world storage; they read it through narrow capabilities such as
//! [`EnemyCensus`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod progression;
pub mod run;
pub mod scaling;

pub use config::{
    ArchetypeWeights, ArenaConfig, ConfigError, DifficultyConfig, EncounterConfig, GameConfig,
    RewardConfig, UpgradeConfig, UpgradeRule,
};
pub use progression::{
    LedgerError, ProgressionLedger, UnknownAttribute, UpgradeAttribute, UpgradeLevels,
};
pub use run::{
    BossDamageMultiplier, DifficultyMultiplier, EncounterClock, EncounterPhase, ResolutionCause,
    RewardBreakdown, RunOutcome, RunTally, SpawnBudget,
};

/// Commands that express all permissible battle world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the run clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an ordinary enemy enter play.
    SpawnEnemy {
        /// Behaviour family of the enemy.
        archetype: EnemyArchetype,
        /// Initial top-left corner in world units.
        position: PlanePoint,
        /// Displacement per 60 Hz frame.
        velocity: PlaneVector,
        /// Bounding box dimensions.
        size: PlaneSize,
        /// Starting hit points.
        health: u32,
    },
    /// Requests that the boss enter play.
    SpawnBoss {
        /// Initial top-left corner in world units.
        position: PlanePoint,
        /// Displacement per 60 Hz frame.
        velocity: PlaneVector,
        /// Bounding box dimensions.
        size: PlaneSize,
        /// Starting hit points.
        health: u32,
    },
    /// Applies damage to an ordinary enemy.
    DamageEnemy {
        /// Enemy receiving the hit.
        enemy: EnemyId,
        /// Hit points removed.
        amount: u32,
    },
    /// Applies damage to the boss, scaled by the soft-enrage multiplier.
    DamageBoss {
        /// Hit points removed before scaling.
        amount: u32,
        /// Damage-taken multiplier currently in force.
        multiplier: BossDamageMultiplier,
    },
    /// Removes player lives.
    DamagePlayer {
        /// Lives removed.
        amount: u32,
    },
    /// Forces the run to end for the provided reason.
    ResolveRun {
        /// Reason the run ends.
        cause: ResolutionCause,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the run clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an ordinary enemy entered play.
    EnemySpawned {
        /// Identifier assigned by the world.
        enemy: EnemyId,
        /// Behaviour family of the enemy.
        archetype: EnemyArchetype,
    },
    /// Confirms that an ordinary enemy was destroyed by the player.
    EnemyDestroyed {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Behaviour family of the enemy.
        archetype: EnemyArchetype,
    },
    /// Reports that an ordinary enemy left the play area unharmed.
    EnemyEscaped {
        /// Identifier of the departed enemy.
        enemy: EnemyId,
        /// Behaviour family of the enemy.
        archetype: EnemyArchetype,
    },
    /// Confirms that the boss entered play.
    BossSpawned {
        /// Starting hit points of the boss.
        health: u32,
    },
    /// Reports damage dealt to the boss.
    BossDamaged {
        /// Hit points removed after scaling.
        amount: u32,
        /// Hit points left.
        remaining: u32,
    },
    /// Reports lost player lives.
    PlayerDamaged {
        /// Lives left.
        lives_remaining: u32,
    },
    /// Announces the end of the run. Emitted at most once per run.
    RunResolved {
        /// Whether the run ended in victory.
        victory: bool,
        /// Reason the run ended.
        cause: ResolutionCause,
    },
}

/// Behaviour family of an ordinary enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyArchetype {
    /// Flies straight down at standard speed.
    Basic,
    /// Weaves sideways while descending; slightly smaller.
    Zigzag,
    /// Slower, sturdier, returns fire.
    Shooter,
    /// Slow heavy hull with doubled hit points.
    Tank,
}

impl EnemyArchetype {
    /// Every archetype in table order.
    pub const ALL: [Self; 4] = [Self::Basic, Self::Zigzag, Self::Shooter, Self::Tank];

    /// Lowercase display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Zigzag => "zigzag",
            Self::Shooter => "shooter",
            Self::Tank => "tank",
        }
    }
}

/// Category used when counting live hostile units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnemyCategory {
    /// Ordinary enemy of the given archetype.
    Ordinary(EnemyArchetype),
    /// The boss.
    Boss,
}

impl From<EnemyArchetype> for EnemyCategory {
    fn from(archetype: EnemyArchetype) -> Self {
        Self::Ordinary(archetype)
    }
}

/// Capability reporting how many hostile units are currently alive.
///
/// Implemented by whatever storage holds the entities; consumers never
/// assume a particular layout.
pub trait EnemyCensus {
    /// Number of live units in `category`.
    fn active(&self, category: EnemyCategory) -> u32;

    /// Number of live ordinary enemies across every archetype.
    fn active_ordinary(&self) -> u32 {
        EnemyArchetype::ALL
            .into_iter()
            .map(|archetype| self.active(EnemyCategory::Ordinary(archetype)))
            .fold(0, u32::saturating_add)
    }
}

/// Unique identifier assigned to an ordinary enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location in world units; y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanePoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl PlanePoint {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Displacement per 60 Hz frame in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneVector {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl PlaneVector {
    /// Creates a vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Dimensions of an axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneSize {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl PlaneSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCensus;

    impl EnemyCensus for FixedCensus {
        fn active(&self, category: EnemyCategory) -> u32 {
            match category {
                EnemyCategory::Ordinary(EnemyArchetype::Basic) => 3,
                EnemyCategory::Ordinary(EnemyArchetype::Tank) => 2,
                EnemyCategory::Ordinary(_) => 0,
                EnemyCategory::Boss => 1,
            }
        }
    }

    #[test]
    fn ordinary_census_excludes_boss() {
        assert_eq!(FixedCensus.active_ordinary(), 5);
    }

    #[test]
    fn resolution_causes_map_to_victory() {
        assert!(ResolutionCause::BossDefeated.is_victory());
        assert!(ResolutionCause::Timeout.is_victory());
        assert!(!ResolutionCause::PlayerDestroyed.is_victory());
    }
}
