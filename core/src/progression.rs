//! Meta-progression contracts: permanent upgrades and the merit ledger.

use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Permanent ship attribute purchasable with merits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeAttribute {
    /// Shots per second.
    FireRate,
    /// Bullets fired per volley.
    BulletsPerShot,
    /// Enemies a bullet passes through.
    Penetration,
    /// Narrower volley spread.
    SpreadNarrow,
    /// Bullet travel speed.
    BulletSpeed,
    /// Damage per bullet.
    BulletDamage,
    /// Chance of a follow-up burst.
    BurstChance,
    /// Homing bullets.
    Homing,
    /// Homing turn rate.
    TurnRate,
}

impl UpgradeAttribute {
    /// Every attribute in menu order.
    pub const ALL: [Self; 9] = [
        Self::FireRate,
        Self::BulletsPerShot,
        Self::Penetration,
        Self::SpreadNarrow,
        Self::BulletSpeed,
        Self::BulletDamage,
        Self::BurstChance,
        Self::Homing,
        Self::TurnRate,
    ];

    /// Stable snake_case key used in persisted data and on the command line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FireRate => "fire_rate",
            Self::BulletsPerShot => "bullets_per_shot",
            Self::Penetration => "penetration",
            Self::SpreadNarrow => "spread_narrow",
            Self::BulletSpeed => "bullet_speed",
            Self::BulletDamage => "bullet_damage",
            Self::BurstChance => "burst_chance",
            Self::Homing => "homing",
            Self::TurnRate => "turn_rate",
        }
    }
}

impl fmt::Display for UpgradeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown upgrade attribute key.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown upgrade attribute `{0}`")]
pub struct UnknownAttribute(pub String);

impl FromStr for UpgradeAttribute {
    type Err = UnknownAttribute;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.key() == value)
            .ok_or_else(|| UnknownAttribute(value.to_owned()))
    }
}

/// Purchased level of every upgrade attribute; absent attributes sit at level 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeLevels(BTreeMap<UpgradeAttribute, u32>);

impl UpgradeLevels {
    /// Creates an empty set of levels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of `attribute`.
    #[must_use]
    pub fn level(&self, attribute: UpgradeAttribute) -> u32 {
        self.0.get(&attribute).copied().unwrap_or(0)
    }

    /// Overwrites the level of `attribute`, dropping the entry at level 0.
    pub fn set_level(&mut self, attribute: UpgradeAttribute, level: u32) {
        if level == 0 {
            let _ = self.0.remove(&attribute);
        } else {
            let _ = self.0.insert(attribute, level);
        }
    }

    /// Iterator over attributes with a non-zero level.
    pub fn iter(&self) -> impl Iterator<Item = (UpgradeAttribute, u32)> + '_ {
        self.0.iter().map(|(attribute, level)| (*attribute, *level))
    }
}

/// Errors surfaced by ledger persistence.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The backing store could not be read or written.
    #[error("failed to access ledger storage at {path}")]
    Io {
        /// Location of the backing store.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A stored entry could not be decoded.
    #[error("ledger entry `{key}` is corrupt: {reason}")]
    Corrupt {
        /// Key of the offending entry.
        key: String,
        /// Description of the decoding failure.
        reason: String,
    },
}

/// Persistent merit balance and upgrade levels shared across runs.
///
/// Mutations take `&mut self`, so a spend's balance check and deduction can
/// never interleave with another writer.
pub trait ProgressionLedger {
    /// Current merit balance.
    fn balance(&self) -> u64;

    /// Deducts `amount` if the balance covers it; returns whether it did.
    ///
    /// Spending zero always succeeds. The balance is never driven below zero.
    fn spend(&mut self, amount: u64) -> bool;

    /// Credits `amount`; crediting zero is a no-op.
    fn add(&mut self, amount: u64);

    /// Loads the persisted upgrade levels.
    fn upgrade_levels(&self) -> Result<UpgradeLevels, LedgerError>;

    /// Persists the provided upgrade levels.
    fn save_upgrade_levels(&mut self, levels: &UpgradeLevels) -> Result<(), LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_keys_parse_back() {
        for attribute in UpgradeAttribute::ALL {
            assert_eq!(attribute.key().parse::<UpgradeAttribute>(), Ok(attribute));
        }
        assert!("warp_drive".parse::<UpgradeAttribute>().is_err());
    }

    #[test]
    fn level_zero_entries_are_dropped() {
        let mut levels = UpgradeLevels::new();
        levels.set_level(UpgradeAttribute::Penetration, 2);
        levels.set_level(UpgradeAttribute::Homing, 1);
        levels.set_level(UpgradeAttribute::Homing, 0);

        assert_eq!(levels.level(UpgradeAttribute::Penetration), 2);
        assert_eq!(levels.level(UpgradeAttribute::Homing), 0);
        assert_eq!(levels.iter().count(), 1);
    }

    #[test]
    fn levels_serialize_as_snake_case_map() {
        let mut levels = UpgradeLevels::new();
        levels.set_level(UpgradeAttribute::FireRate, 3);
        let json = serde_json::to_string(&levels).expect("serialize");
        assert_eq!(json, r#"{"fire_rate":3}"#);
    }
}
