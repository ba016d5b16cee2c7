use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn scratch_ledger(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("star-sortie-cli-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir.join("profile.json")
}

fn star_sortie(ledger: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_star-sortie"))
        .arg("--ledger")
        .arg(ledger)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch star-sortie")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "star-sortie failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn quote_prices_the_difficulty() {
    let ledger = scratch_ledger("quote");
    let text = stdout(&star_sortie(&ledger, &["quote", "4"]));
    assert!(text.contains("difficulty x4.000 costs 90 merits"), "{text}");
    assert!(text.contains("boss hp"), "{text}");
}

#[test]
fn empty_balance_affords_only_the_baseline() {
    let ledger = scratch_ledger("afford");
    let text = stdout(&star_sortie(&ledger, &["afford", "--merits", "0"]));
    assert!(text.contains("afford difficulty x1.000"), "{text}");
}

#[test]
fn granted_merits_persist_between_invocations() {
    let ledger = scratch_ledger("grant");
    let _ = stdout(&star_sortie(&ledger, &["grant", "25"]));
    let text = stdout(&star_sortie(&ledger, &["balance"]));
    assert!(text.contains("merits: 25"), "{text}");
}

#[test]
fn upgrade_without_funds_fails() {
    let ledger = scratch_ledger("upgrade");
    let output = star_sortie(&ledger, &["upgrade", "fire_rate"]);
    assert!(!output.status.success());
}

#[test]
fn baseline_sortie_runs_to_settlement() {
    let ledger = scratch_ledger("sortie");
    let text = stdout(&star_sortie(&ledger, &["sortie", "--seed", "5"]));
    assert!(text.contains("deployed at x1.000 for 0 merits"), "{text}");
    assert!(text.contains("merits: "), "{text}");
    assert!(ledger.exists());
}
