#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Merit economy: what a difficulty costs, what a run pays, and what upgrades cost.
//!
//! Every function here is pure. Degenerate inputs (zero spawns, zero run
//! length, out-of-range multipliers) collapse to zero contributions instead of
//! failing.

use std::time::Duration;

use star_sortie_core::{
    scaling, DifficultyConfig, DifficultyMultiplier, RewardBreakdown, RewardConfig, RunOutcome,
};

mod upgrades;

pub use upgrades::UpgradePricing;

/// Weight of the binary logarithm in the cost surcharge.
const COST_LOG_WEIGHT: f64 = 0.5;

/// Upper bound on bisection rounds, reached only by a degenerate tolerance.
const MAX_BISECTION_STEPS: u32 = 128;

const SCORE_KILL_WEIGHT: f64 = 40.0;
const SCORE_SPEED_WEIGHT: f64 = 30.0;
const SCORE_BOSS_POINTS: f64 = 30.0;

/// Prices difficulty multipliers and computes run rewards.
#[derive(Clone, Debug)]
pub struct DifficultyEconomy {
    difficulty: DifficultyConfig,
    reward: RewardConfig,
}

impl DifficultyEconomy {
    /// Creates an economy over the provided difficulty bounds and reward constants.
    #[must_use]
    pub fn new(difficulty: DifficultyConfig, reward: RewardConfig) -> Self {
        Self { difficulty, reward }
    }

    /// Difficulty bounds this economy prices.
    #[must_use]
    pub fn difficulty_config(&self) -> &DifficultyConfig {
        &self.difficulty
    }

    /// Merit price of `multiplier`. Baseline and easier difficulties are free;
    /// anything harder costs at least one merit.
    #[must_use]
    pub fn cost(&self, multiplier: DifficultyMultiplier) -> u64 {
        let value = multiplier.get();
        if !(value > 1.0) {
            return 0;
        }
        let base = self.difficulty.cost_base.max(1) as f64;
        let log_factor = 1.0 + COST_LOG_WEIGHT * value.max(1.0).log2();
        scaling::floor_u64((value - 1.0) * base * log_factor).max(1)
    }

    /// Highest multiplier whose cost fits within `currency`.
    ///
    /// When even the minimum is unaffordable the minimum is returned; callers
    /// confirming a deployment still check the cost.
    #[must_use]
    pub fn max_affordable(&self, currency: u64) -> DifficultyMultiplier {
        let minimum = DifficultyMultiplier::minimum(&self.difficulty);
        if currency == 0 {
            return minimum;
        }
        let maximum = DifficultyMultiplier::maximum(&self.difficulty);
        if self.cost(maximum) <= currency {
            return maximum;
        }
        if self.cost(minimum) > currency {
            return minimum;
        }

        let mut low = minimum.get();
        let mut high = maximum.get();
        let mut steps = 0;
        while high - low > self.difficulty.search_tolerance && steps < MAX_BISECTION_STEPS {
            let middle = low + (high - low) / 2.0;
            if self.cost(DifficultyMultiplier::clamped(middle, &self.difficulty)) <= currency {
                low = middle;
            } else {
                high = middle;
            }
            steps += 1;
        }
        DifficultyMultiplier::clamped(low, &self.difficulty)
    }

    /// Itemised reward for a run. A defeat pays nothing.
    #[must_use]
    pub fn compute_detailed_reward(
        &self,
        multiplier: DifficultyMultiplier,
        killed: u32,
        spawned: u32,
        elapsed: Duration,
        total: Duration,
        victory: bool,
    ) -> RewardBreakdown {
        if !victory {
            return RewardBreakdown::ZERO;
        }
        let tuning = &self.reward;
        let value = multiplier.get();

        let cost = self.cost(multiplier);
        let base = if cost == 0 {
            tuning.baseline_base
        } else {
            scaling::round_u64(cost as f64 * tuning.base_cost_factor)
        };
        let base_f = base as f64;

        let difficulty_bonus = if value > 1.0 {
            scaling::round_u64(base_f * tuning.difficulty_bonus_factor * value.log2())
        } else {
            0
        };

        let kill_ratio = scaling::unit_ratio(f64::from(killed), f64::from(spawned));
        let kill_bonus = scaling::round_u64(
            base_f
                * tuning.kill_bonus_factor
                * scaling::ramp(kill_ratio, tuning.kill_threshold, tuning.kill_span),
        );

        let total_secs = total.as_secs_f64();
        let speed_ratio =
            scaling::unit_ratio(total_secs - elapsed.as_secs_f64(), total_secs);
        let speed_bonus = scaling::round_u64(
            base_f
                * tuning.speed_bonus_factor
                * scaling::ramp(speed_ratio, tuning.speed_threshold, tuning.speed_span),
        );

        let boss_killed = spawned > 0 && killed >= spawned;
        let boss_bonus = if boss_killed {
            scaling::round_u64(base_f * tuning.boss_bonus_factor)
        } else {
            0
        };

        let running = base
            .saturating_add(difficulty_bonus)
            .saturating_add(kill_bonus)
            .saturating_add(speed_bonus)
            .saturating_add(boss_bonus);
        let perfect = kill_ratio >= tuning.perfect_kill_ratio
            && speed_ratio > tuning.perfect_speed_ratio
            && boss_killed;
        let perfect_bonus = if perfect {
            scaling::round_u64(tuning.perfect_bonus_factor * running as f64)
        } else {
            0
        };

        let total = running
            .saturating_add(perfect_bonus)
            .max(tuning.minimum_total);

        let boss_points = if boss_killed { SCORE_BOSS_POINTS } else { 0.0 };
        let score = scaling::clamp_finite(
            kill_ratio * SCORE_KILL_WEIGHT + speed_ratio * SCORE_SPEED_WEIGHT + boss_points,
            0.0,
            100.0,
        );

        RewardBreakdown {
            base,
            difficulty_bonus,
            kill_bonus,
            speed_bonus,
            boss_bonus,
            perfect_bonus,
            total,
            performance_score: u8::try_from(scaling::round_u64(score)).unwrap_or(100),
        }
    }

    /// Itemised reward for a finalized run.
    #[must_use]
    pub fn compute_reward(
        &self,
        outcome: &RunOutcome,
        multiplier: DifficultyMultiplier,
    ) -> RewardBreakdown {
        self.compute_detailed_reward(
            multiplier,
            outcome.enemies_killed,
            outcome.enemies_spawned,
            outcome.elapsed,
            outcome.total_allotted,
            outcome.victory,
        )
    }

    /// Decides what a finished run actually pays.
    ///
    /// Victories pay the full breakdown. Defeats pay a consolation of the base a
    /// victory would have earned, divided by `consolation_divisor`.
    #[must_use]
    pub fn settle(&self, outcome: &RunOutcome, multiplier: DifficultyMultiplier) -> Settlement {
        if outcome.victory {
            let breakdown = self.compute_reward(outcome, multiplier);
            tracing::info!(
                difficulty = multiplier.get(),
                payout = breakdown.total,
                score = breakdown.performance_score,
                "victory settled"
            );
            return Settlement {
                breakdown,
                consolation: false,
                payout: breakdown.total,
            };
        }

        let would_have_paid = self.compute_detailed_reward(
            multiplier,
            outcome.enemies_killed,
            outcome.enemies_spawned,
            outcome.elapsed,
            outcome.total_allotted,
            true,
        );
        let payout = would_have_paid.base / self.reward.consolation_divisor.max(1);
        tracing::info!(difficulty = multiplier.get(), payout, "defeat settled with consolation");
        Settlement {
            breakdown: RewardBreakdown {
                base: would_have_paid.base,
                total: payout,
                ..RewardBreakdown::ZERO
            },
            consolation: true,
            payout,
        }
    }
}

/// What a finished run credits to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Itemised reward; on defeat only `base` and `total` are populated.
    pub breakdown: RewardBreakdown,
    /// Whether the payout is the defeat consolation.
    pub consolation: bool,
    /// Merits to credit.
    pub payout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy() -> DifficultyEconomy {
        DifficultyEconomy::new(DifficultyConfig::default(), RewardConfig::default())
    }

    fn multiplier(value: f64) -> DifficultyMultiplier {
        DifficultyMultiplier::clamped(value, &DifficultyConfig::default())
    }

    #[test]
    fn cost_truncates_and_never_drops_below_one() {
        let economy = economy();
        assert_eq!(economy.cost(multiplier(1.0)), 0);
        assert_eq!(economy.cost(multiplier(1.001)), 1);
        // (2 - 1) * 15 * (1 + 0.5 * 1) = 22.5
        assert_eq!(economy.cost(multiplier(2.0)), 22);
        // (4 - 1) * 15 * (1 + 0.5 * 2) = 90
        assert_eq!(economy.cost(multiplier(4.0)), 90);
    }

    #[test]
    fn zero_cost_base_prices_as_one() {
        let economy = DifficultyEconomy::new(
            DifficultyConfig {
                cost_base: 0,
                ..DifficultyConfig::default()
            },
            RewardConfig::default(),
        );
        // (3 - 1) * 1 * (1 + 0.5 * log2 3) = 3.58
        assert_eq!(economy.cost(multiplier(3.0)), 3);
    }

    #[test]
    fn bisection_survives_degenerate_tolerance() {
        let economy = DifficultyEconomy::new(
            DifficultyConfig {
                search_tolerance: 0.0,
                ..DifficultyConfig::default()
            },
            RewardConfig::default(),
        );
        let found = economy.max_affordable(100);
        assert!(economy.cost(found) <= 100);
        assert!(found.get() > 1.0);
    }
}
