use star_sortie_core::{DifficultyMultiplier, ProgressionLedger};
use star_sortie_system_economy::DifficultyEconomy;

use crate::{insufficient, HangarError};

/// Stepper increments, keyed by the exclusive upper bound of the range they apply to.
const STEPS: [(f64, f64); 7] = [
    (2.0, 0.1),
    (10.0, 0.5),
    (100.0, 1.0),
    (1_000.0, 10.0),
    (10_000.0, 100.0),
    (100_000.0, 1_000.0),
    (1_000_000.0, 10_000.0),
];
const LARGEST_STEP: f64 = 100_000.0;

/// Difficulty selection for the next sortie.
///
/// The selection can never rise above what the ledger balance affords.
#[derive(Clone, Debug)]
pub struct Deployment {
    economy: DifficultyEconomy,
    selected: DifficultyMultiplier,
}

/// Record of a confirmed deployment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeploymentReceipt {
    /// Difficulty the sortie flies at.
    pub difficulty: DifficultyMultiplier,
    /// Merits spent.
    pub cost: u64,
    /// Ledger balance after the spend.
    pub balance_after: u64,
}

impl Deployment {
    /// Starts a selection at the minimum difficulty.
    #[must_use]
    pub fn new(economy: DifficultyEconomy) -> Self {
        let selected = DifficultyMultiplier::minimum(economy.difficulty_config());
        Self { economy, selected }
    }

    /// Stepper increment applied at `value`; coarser as difficulty grows.
    #[must_use]
    pub fn step_for(value: f64) -> f64 {
        STEPS
            .iter()
            .find(|(bound, _)| value < *bound)
            .map_or(LARGEST_STEP, |(_, step)| *step)
    }

    /// Currently selected difficulty.
    #[must_use]
    pub fn selected(&self) -> DifficultyMultiplier {
        self.selected
    }

    /// Price of the current selection.
    #[must_use]
    pub fn cost(&self) -> u64 {
        self.economy.cost(self.selected)
    }

    /// Highest difficulty the ledger can pay for, never above the configured maximum.
    #[must_use]
    pub fn ceiling<L>(&self, ledger: &L) -> DifficultyMultiplier
    where
        L: ProgressionLedger + ?Sized,
    {
        self.economy.max_affordable(ledger.balance())
    }

    /// Selects an explicit difficulty, clamped to the affordable range.
    ///
    /// Non-finite requests select the minimum.
    pub fn select<L>(&mut self, ledger: &L, value: f64) -> DifficultyMultiplier
    where
        L: ProgressionLedger + ?Sized,
    {
        let requested = DifficultyMultiplier::clamped(value, self.economy.difficulty_config());
        let ceiling = self.ceiling(ledger);
        self.selected = if requested > ceiling {
            ceiling
        } else {
            requested
        };
        self.selected
    }

    /// Raises the selection by one step.
    pub fn increase<L>(&mut self, ledger: &L) -> DifficultyMultiplier
    where
        L: ProgressionLedger + ?Sized,
    {
        let current = self.selected.get();
        self.select(ledger, current + Self::step_for(current))
    }

    /// Jumps to the affordable ceiling, or back to the minimum when already there.
    pub fn toggle_extreme<L>(&mut self, ledger: &L) -> DifficultyMultiplier
    where
        L: ProgressionLedger + ?Sized,
    {
        let ceiling = self.ceiling(ledger);
        self.selected = if self.selected < ceiling {
            ceiling
        } else {
            DifficultyMultiplier::minimum(self.economy.difficulty_config())
        };
        self.selected
    }

    /// Pays for the selection and locks it in for the sortie.
    pub fn confirm<L>(&self, ledger: &mut L) -> Result<DeploymentReceipt, HangarError>
    where
        L: ProgressionLedger + ?Sized,
    {
        let cost = self.cost();
        if !ledger.spend(cost) {
            return Err(insufficient(&*ledger, cost));
        }
        let balance_after = ledger.balance();
        tracing::info!(
            difficulty = self.selected.get(),
            cost,
            balance_after,
            "deployment confirmed"
        );
        Ok(DeploymentReceipt {
            difficulty: self.selected,
            cost,
            balance_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_coarsen_per_decade() {
        assert_eq!(Deployment::step_for(1.0), 0.1);
        assert_eq!(Deployment::step_for(1.99), 0.1);
        assert_eq!(Deployment::step_for(2.0), 0.5);
        assert_eq!(Deployment::step_for(50.0), 1.0);
        assert_eq!(Deployment::step_for(500.0), 10.0);
        assert_eq!(Deployment::step_for(5_000.0), 100.0);
        assert_eq!(Deployment::step_for(50_000.0), 1_000.0);
        assert_eq!(Deployment::step_for(500_000.0), 10_000.0);
        assert_eq!(Deployment::step_for(5_000_000.0), 100_000.0);
    }
}
