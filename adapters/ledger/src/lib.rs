#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Merit ledger backends.

use star_sortie_core::{LedgerError, ProgressionLedger, UpgradeLevels};

mod file;

pub use file::FileLedger;

/// Ledger held entirely in memory; nothing survives the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    merits: u64,
    levels: UpgradeLevels,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger holding `merits`.
    #[must_use]
    pub fn with_balance(merits: u64) -> Self {
        Self {
            merits,
            levels: UpgradeLevels::new(),
        }
    }
}

impl ProgressionLedger for MemoryLedger {
    fn balance(&self) -> u64 {
        self.merits
    }

    fn spend(&mut self, amount: u64) -> bool {
        match self.merits.checked_sub(amount) {
            Some(remaining) => {
                self.merits = remaining;
                true
            }
            None => false,
        }
    }

    fn add(&mut self, amount: u64) {
        self.merits = self.merits.saturating_add(amount);
    }

    fn upgrade_levels(&self) -> Result<UpgradeLevels, LedgerError> {
        Ok(self.levels.clone())
    }

    fn save_upgrade_levels(&mut self, levels: &UpgradeLevels) -> Result<(), LedgerError> {
        self.levels = levels.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_is_all_or_nothing() {
        let mut ledger = MemoryLedger::with_balance(10);
        assert!(!ledger.spend(11));
        assert_eq!(ledger.balance(), 10);
        assert!(ledger.spend(10));
        assert_eq!(ledger.balance(), 0);
        assert!(ledger.spend(0));
    }

    #[test]
    fn crediting_saturates() {
        let mut ledger = MemoryLedger::with_balance(u64::MAX - 1);
        ledger.add(0);
        assert_eq!(ledger.balance(), u64::MAX - 1);
        ledger.add(5);
        assert_eq!(ledger.balance(), u64::MAX);
    }
}
