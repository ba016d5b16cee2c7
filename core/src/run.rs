//! Per-run value types: the chosen difficulty, the outcome tally and the
//! derived reward and spawn figures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{scaling, DifficultyConfig};

/// Player-selected difficulty, clamped into the configured range at construction.
///
/// Serializes as a bare number but is never deserialized: the only way in is
/// [`Self::clamped`], which needs the configured bounds.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
pub struct DifficultyMultiplier(f64);

impl DifficultyMultiplier {
    /// Baseline difficulty; free to select.
    pub const BASELINE: Self = Self(1.0);

    /// Clamps `value` into `[bounds.min, bounds.max]`; NaN and infinities map to the minimum.
    #[must_use]
    pub fn clamped(value: f64, bounds: &DifficultyConfig) -> Self {
        let value = if value.is_finite() { value } else { bounds.min };
        Self(scaling::clamp_finite(value, bounds.min, bounds.max))
    }

    /// Smallest selectable multiplier.
    #[must_use]
    pub fn minimum(bounds: &DifficultyConfig) -> Self {
        Self::clamped(bounds.min, bounds)
    }

    /// Largest selectable multiplier.
    #[must_use]
    pub fn maximum(bounds: &DifficultyConfig) -> Self {
        Self::clamped(bounds.max, bounds)
    }

    /// Raw multiplier value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for DifficultyMultiplier {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Reason a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionCause {
    /// The boss's hit points reached zero.
    BossDefeated,
    /// The run clock reached the total duration; counts as a victory.
    Timeout,
    /// The player ran out of lives.
    PlayerDestroyed,
}

impl ResolutionCause {
    /// Whether this resolution awards a victory.
    #[must_use]
    pub const fn is_victory(self) -> bool {
        match self {
            Self::BossDefeated | Self::Timeout => true,
            Self::PlayerDestroyed => false,
        }
    }
}

/// Damage-taken multiplier applied to the boss as its phase drags on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossDamageMultiplier {
    /// Regular damage.
    Standard,
    /// Double damage after the first enrage threshold.
    Enraged,
    /// Triple damage after the second threshold.
    Frenzied,
}

impl BossDamageMultiplier {
    /// Integer factor applied to incoming damage.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::Standard => 1,
            Self::Enraged => 2,
            Self::Frenzied => 3,
        }
    }
}

/// In-run accumulator of spawn and kill counts.
///
/// The boss counts as exactly one unit on each side: spawning it bumps
/// `enemies_spawned`, killing it bumps `enemies_killed`. Kills beyond the
/// spawn count are ignored so `enemies_killed <= enemies_spawned` always holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunTally {
    enemies_killed: u32,
    enemies_spawned: u32,
    boss_spawned: bool,
    boss_killed: bool,
}

impl RunTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an ordinary enemy entering play.
    pub fn record_spawn(&mut self) {
        self.enemies_spawned = self.enemies_spawned.saturating_add(1);
    }

    /// Records an ordinary enemy destroyed by the player.
    pub fn record_kill(&mut self) {
        if self.enemies_killed < self.enemies_spawned {
            self.enemies_killed += 1;
        }
    }

    /// Records the boss entering play. Repeated calls are ignored.
    pub fn record_boss_spawn(&mut self) {
        if self.boss_spawned {
            return;
        }
        self.boss_spawned = true;
        self.record_spawn();
    }

    /// Records the boss being destroyed. Ignored unless the boss spawned and is still alive.
    pub fn record_boss_kill(&mut self) {
        if !self.boss_spawned || self.boss_killed {
            return;
        }
        self.boss_killed = true;
        self.record_kill();
    }

    /// Enemies destroyed so far, boss included.
    #[must_use]
    pub const fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    /// Enemies spawned so far, boss included.
    #[must_use]
    pub const fn enemies_spawned(&self) -> u32 {
        self.enemies_spawned
    }

    /// Whether the boss has entered play.
    #[must_use]
    pub const fn boss_spawned(&self) -> bool {
        self.boss_spawned
    }

    /// Whether the boss has been destroyed.
    #[must_use]
    pub const fn boss_killed(&self) -> bool {
        self.boss_killed
    }

    /// Consumes the tally, producing the run's immutable outcome.
    #[must_use]
    pub fn finalize(self, victory: bool, elapsed: Duration, total_allotted: Duration) -> RunOutcome {
        RunOutcome {
            victory,
            enemies_killed: self.enemies_killed,
            enemies_spawned: self.enemies_spawned,
            boss_spawned: self.boss_spawned,
            boss_killed: self.boss_killed,
            elapsed,
            total_allotted,
        }
    }
}

/// Finalized record of a run, consumed once to compute its reward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Whether the run ended in victory (boss killed or timeout).
    pub victory: bool,
    /// Enemies destroyed, boss included.
    pub enemies_killed: u32,
    /// Enemies spawned, boss included.
    pub enemies_spawned: u32,
    /// Whether the boss entered play.
    pub boss_spawned: bool,
    /// Whether the boss was destroyed.
    pub boss_killed: bool,
    /// Run time consumed before resolution.
    pub elapsed: Duration,
    /// Run time allotted.
    pub total_allotted: Duration,
}

/// Itemised merit reward of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Reward derived from the difficulty cost.
    pub base: u64,
    /// Bonus for choosing a difficulty above baseline.
    pub difficulty_bonus: u64,
    /// Bonus for a high kill ratio.
    pub kill_bonus: u64,
    /// Bonus for finishing with time to spare.
    pub speed_bonus: u64,
    /// Bonus for a full clear including the boss.
    pub boss_bonus: u64,
    /// Capstone bonus for a near-flawless run.
    pub perfect_bonus: u64,
    /// Sum credited to the ledger.
    pub total: u64,
    /// Display-only composite score in `0..=100`.
    pub performance_score: u8,
}

impl RewardBreakdown {
    /// Breakdown paying nothing.
    pub const ZERO: Self = Self {
        base: 0,
        difficulty_bonus: 0,
        kill_bonus: 0,
        speed_bonus: 0,
        boss_bonus: 0,
        perfect_bonus: 0,
        total: 0,
        performance_score: 0,
    };
}

/// Spawn parameters derived from the difficulty and the current wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnBudget {
    /// Minimum time between two spawn events.
    pub interval_floor: Duration,
    /// Maximum number of ordinary enemies alive at once.
    pub concurrent_cap: u32,
    /// Enemies per spawn event before the free-space clamp.
    pub batch_size: u32,
    /// Hit points of a basic enemy.
    pub enemy_hp: u32,
    /// Velocity multiplier applied to spawned enemies.
    pub enemy_speed_scale: f64,
}

/// Phase of the encounter state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncounterPhase {
    /// Wave-driven ordinary spawns.
    Enemy,
    /// The boss is in play; no further ordinary spawns.
    Boss,
    /// The run has ended.
    Resolved,
}

/// Snapshot of the encounter scheduler's clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncounterClock {
    /// Run time at which the encounter started.
    pub start_time: Duration,
    /// Time spent in the current phase.
    pub elapsed_since_phase_start: Duration,
    /// Wave selected by the most recent enemy-phase tick.
    pub current_wave_index: u32,
    /// Run time of the most recent spawn event.
    pub last_spawn_time: Duration,
    /// Whether the boss has been spawned.
    pub boss_spawned: bool,
}
