#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pre-run hangar logic: choosing a difficulty to deploy at and buying
//! permanent upgrades, both settled against a [`ProgressionLedger`].

use star_sortie_core::{LedgerError, ProgressionLedger, UpgradeAttribute};

mod deployment;
mod workshop;

pub use deployment::{Deployment, DeploymentReceipt};
pub use workshop::{UpgradeReceipt, Workshop};

/// Errors raised by hangar transactions.
#[derive(Debug, thiserror::Error)]
pub enum HangarError {
    /// The ledger balance does not cover the price.
    #[error("{needed} merits needed but only {available} available")]
    InsufficientMerits {
        /// Price of the transaction.
        needed: u64,
        /// Balance at the time of the attempt.
        available: u64,
    },
    /// The attribute cannot be raised any further.
    #[error("`{attribute}` is already at its maximum level {max_level}")]
    MaxLevelReached {
        /// Attribute that was requested.
        attribute: UpgradeAttribute,
        /// Cap of the attribute.
        max_level: u32,
    },
    /// The attribute has no purchased level to give back.
    #[error("`{attribute}` has no purchased level to refund")]
    NothingToRefund {
        /// Attribute that was requested.
        attribute: UpgradeAttribute,
    },
    /// Upgrade levels could not be loaded or saved.
    #[error("failed to persist upgrade levels")]
    Persistence(#[from] LedgerError),
}

fn insufficient<L>(ledger: &L, needed: u64) -> HangarError
where
    L: ProgressionLedger + ?Sized,
{
    HangarError::InsufficientMerits {
        needed,
        available: ledger.balance(),
    }
}
