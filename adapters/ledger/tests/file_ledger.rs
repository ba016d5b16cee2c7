use std::{fs, path::PathBuf};

use star_sortie_core::{LedgerError, ProgressionLedger, UpgradeAttribute, UpgradeLevels};
use star_sortie_ledger::FileLedger;

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "star-sortie-ledger-{}-{name}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir.join("profile.json")
}

#[test]
fn missing_file_opens_as_empty_profile() {
    let ledger = FileLedger::open(scratch_path("missing")).expect("missing file is empty");
    assert_eq!(ledger.balance(), 0);
    assert_eq!(ledger.upgrade_levels().expect("levels"), UpgradeLevels::new());
}

#[test]
fn balance_and_levels_survive_reopen() {
    let path = scratch_path("reopen");
    {
        let mut ledger = FileLedger::open(&path).expect("open");
        ledger.add(120);
        assert!(ledger.spend(20));
        let mut levels = UpgradeLevels::new();
        levels.set_level(UpgradeAttribute::Penetration, 2);
        ledger.save_upgrade_levels(&levels).expect("save");
    }

    let reopened = FileLedger::open(&path).expect("reopen");
    assert_eq!(reopened.balance(), 100);
    assert_eq!(
        reopened
            .upgrade_levels()
            .expect("levels")
            .level(UpgradeAttribute::Penetration),
        2
    );
}

#[test]
fn refused_spend_leaves_balance_on_disk() {
    let path = scratch_path("refused");
    let mut ledger = FileLedger::open(&path).expect("open");
    ledger.add(5);

    assert!(!ledger.spend(6));
    assert!(ledger.spend(0));

    let reopened = FileLedger::open(&path).expect("reopen");
    assert_eq!(reopened.balance(), 5);
}

#[test]
fn unknown_keys_are_preserved() {
    let path = scratch_path("foreign");
    fs::create_dir_all(path.parent().expect("parent")).expect("dir");
    fs::write(&path, r#"{ "merits": 7, "last_pilot": "vega" }"#).expect("seed");

    let mut ledger = FileLedger::open(&path).expect("open");
    assert_eq!(ledger.balance(), 7);
    ledger.add(3);

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(stored["merits"], 10);
    assert_eq!(stored["last_pilot"], "vega");
}

#[test]
fn corrupt_entry_names_its_key() {
    let path = scratch_path("corrupt");
    fs::create_dir_all(path.parent().expect("parent")).expect("dir");
    fs::write(&path, r#"{ "merits": "plenty" }"#).expect("seed");

    let error = FileLedger::open(&path).expect_err("merits must be a number");
    assert!(matches!(error, LedgerError::Corrupt { ref key, .. } if key == "merits"));
}
