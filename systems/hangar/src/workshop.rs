use star_sortie_core::{ProgressionLedger, UpgradeAttribute};
use star_sortie_system_economy::UpgradePricing;

use crate::{insufficient, HangarError};

/// Buys and refunds permanent upgrades against the ledger.
#[derive(Clone, Debug)]
pub struct Workshop {
    pricing: UpgradePricing,
}

/// Record of a completed workshop transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeReceipt {
    /// Attribute that changed.
    pub attribute: UpgradeAttribute,
    /// Level after the transaction.
    pub level: u32,
    /// Merits spent on a purchase or credited by a refund.
    pub merits: u64,
}

impl Workshop {
    /// Creates a workshop using `pricing`.
    #[must_use]
    pub fn new(pricing: UpgradePricing) -> Self {
        Self { pricing }
    }

    /// Pricing rules in use.
    #[must_use]
    pub fn pricing(&self) -> &UpgradePricing {
        &self.pricing
    }

    /// Raises `attribute` by one level, paying its price.
    ///
    /// The spend is returned to the ledger when the new level cannot be saved.
    pub fn purchase<L>(
        &self,
        ledger: &mut L,
        attribute: UpgradeAttribute,
    ) -> Result<UpgradeReceipt, HangarError>
    where
        L: ProgressionLedger + ?Sized,
    {
        let mut levels = ledger.upgrade_levels()?;
        let level = levels.level(attribute);
        if !self.pricing.can_increase(attribute, level) {
            return Err(HangarError::MaxLevelReached {
                attribute,
                max_level: self.pricing.max_level(attribute),
            });
        }

        let cost = self.pricing.next_cost(attribute, level);
        if !ledger.spend(cost) {
            return Err(insufficient(&*ledger, cost));
        }

        let level = level + 1;
        levels.set_level(attribute, level);
        if let Err(error) = ledger.save_upgrade_levels(&levels) {
            ledger.add(cost);
            return Err(error.into());
        }

        tracing::info!(%attribute, level, cost, "upgrade purchased");
        Ok(UpgradeReceipt {
            attribute,
            level,
            merits: cost,
        })
    }

    /// Lowers `attribute` by one level, crediting the price paid for it.
    pub fn refund<L>(
        &self,
        ledger: &mut L,
        attribute: UpgradeAttribute,
    ) -> Result<UpgradeReceipt, HangarError>
    where
        L: ProgressionLedger + ?Sized,
    {
        let mut levels = ledger.upgrade_levels()?;
        let level = levels.level(attribute);
        let Some(lowered) = level.checked_sub(1) else {
            return Err(HangarError::NothingToRefund { attribute });
        };

        let amount = self.pricing.refund(attribute, level);
        levels.set_level(attribute, lowered);
        ledger.save_upgrade_levels(&levels)?;
        ledger.add(amount);

        tracing::info!(%attribute, level = lowered, amount, "upgrade refunded");
        Ok(UpgradeReceipt {
            attribute,
            level: lowered,
            merits: amount,
        })
    }
}
