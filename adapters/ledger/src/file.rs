use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use star_sortie_core::{LedgerError, ProgressionLedger, UpgradeLevels};

const MERITS_KEY: &str = "merits";
const UPGRADES_KEY: &str = "upgrades";

/// Ledger persisted as a JSON object of key/value pairs.
///
/// Balance and upgrade levels live under the `merits` and `upgrades` keys;
/// any other keys found on disk are carried through untouched. The file is
/// rewritten after every mutation.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    merits: u64,
    levels: UpgradeLevels,
    other: BTreeMap<String, Value>,
}

impl FileLedger {
    /// Opens the ledger stored at `path`; a missing file is an empty profile.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no ledger on disk, starting empty");
                return Ok(Self {
                    path,
                    merits: 0,
                    levels: UpgradeLevels::new(),
                    other: BTreeMap::new(),
                });
            }
            Err(source) => return Err(LedgerError::Io { path, source }),
        };

        let mut entries: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|error| LedgerError::Corrupt {
                key: path.display().to_string(),
                reason: error.to_string(),
            })?;
        let merits = take_entry(&mut entries, MERITS_KEY)?.unwrap_or(0);
        let levels = take_entry(&mut entries, UPGRADES_KEY)?.unwrap_or_default();

        Ok(Self {
            path,
            merits,
            levels,
            other: entries.into_iter().collect(),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), LedgerError> {
        let mut entries: Map<String, Value> = self
            .other
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let _ = entries.insert(MERITS_KEY.to_owned(), Value::from(self.merits));
        let levels = serde_json::to_value(&self.levels).map_err(|error| LedgerError::Corrupt {
            key: UPGRADES_KEY.to_owned(),
            reason: error.to_string(),
        })?;
        let _ = entries.insert(UPGRADES_KEY.to_owned(), levels);

        let json = serde_json::to_string_pretty(&Value::Object(entries)).map_err(|error| {
            LedgerError::Corrupt {
                key: self.path.display().to_string(),
                reason: error.to_string(),
            }
        })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }
        fs::write(&self.path, json).map_err(|source| self.io_error(source))
    }

    fn persist_best_effort(&self) {
        if let Err(error) = self.persist() {
            tracing::warn!(path = %self.path.display(), %error, "failed to persist merit balance");
        }
    }

    fn io_error(&self, source: io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn take_entry<T>(entries: &mut Map<String, Value>, key: &str) -> Result<Option<T>, LedgerError>
where
    T: DeserializeOwned,
{
    entries
        .remove(key)
        .map(|value| {
            serde_json::from_value(value).map_err(|error| LedgerError::Corrupt {
                key: key.to_owned(),
                reason: error.to_string(),
            })
        })
        .transpose()
}

impl ProgressionLedger for FileLedger {
    fn balance(&self) -> u64 {
        self.merits
    }

    fn spend(&mut self, amount: u64) -> bool {
        if amount == 0 {
            return true;
        }
        let Some(remaining) = self.merits.checked_sub(amount) else {
            return false;
        };
        self.merits = remaining;
        self.persist_best_effort();
        true
    }

    fn add(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.merits = self.merits.saturating_add(amount);
        self.persist_best_effort();
    }

    fn upgrade_levels(&self) -> Result<UpgradeLevels, LedgerError> {
        Ok(self.levels.clone())
    }

    fn save_upgrade_levels(&mut self, levels: &UpgradeLevels) -> Result<(), LedgerError> {
        let previous = std::mem::replace(&mut self.levels, levels.clone());
        if let Err(error) = self.persist() {
            self.levels = previous;
            return Err(error);
        }
        Ok(())
    }
}
