use star_sortie_core::{UpgradeAttribute, UpgradeConfig};

/// Prices permanent upgrades: each level costs twice the previous one.
#[derive(Clone, Debug)]
pub struct UpgradePricing {
    config: UpgradeConfig,
}

impl UpgradePricing {
    /// Creates pricing over the provided per-attribute rules.
    #[must_use]
    pub fn new(config: UpgradeConfig) -> Self {
        Self { config }
    }

    /// Price of raising `attribute` from `level` to `level + 1`.
    #[must_use]
    pub fn next_cost(&self, attribute: UpgradeAttribute, level: u32) -> u64 {
        let base = self.config.rule(attribute).base_cost;
        2_u64
            .checked_pow(level)
            .and_then(|factor| base.checked_mul(factor))
            .unwrap_or(u64::MAX)
    }

    /// Merits returned when lowering `attribute` from `level` to `level - 1`.
    ///
    /// Equals the price originally paid for that level.
    #[must_use]
    pub fn refund(&self, attribute: UpgradeAttribute, level: u32) -> u64 {
        match level.checked_sub(1) {
            Some(previous) => self.next_cost(attribute, previous),
            None => 0,
        }
    }

    /// Whether `attribute` at `level` is below its cap.
    #[must_use]
    pub fn can_increase(&self, attribute: UpgradeAttribute, level: u32) -> bool {
        level < self.config.rule(attribute).max_level
    }

    /// Level cap of `attribute`.
    #[must_use]
    pub fn max_level(&self, attribute: UpgradeAttribute) -> u32 {
        self.config.rule(attribute).max_level
    }
}
