use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use forest_stand_simulator::{
    io::write_stand_json,
    models::{SiteQuality, Species, Stand, TreeRecord},
    PeriodYield,
};

fn sample_stand() -> Stand {
    let records: Vec<TreeRecord> = (0..40)
        .map(|i| {
            let species = if i % 4 == 0 {
                Species::WesternHemlock
            } else {
                Species::DouglasFir
            };
            let dbh = 7.0 + (i % 10) as f64;
            TreeRecord {
                tag: i,
                species,
                dbh,
                height: 35.0 + 3.0 * dbh,
                crown_ratio: 0.5,
                expansion_factor: 6.0,
            }
        })
        .collect();
    let site = SiteQuality {
        primary_site_index: 125.0,
        secondary_site_index: 105.0,
    };
    Stand::from_records(&records, site, 30.0).unwrap()
}

/// Write the sample stand to a JSON file in the given directory.
fn create_test_stand(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("stand.json");
    write_stand_json("CLI Test", &sample_stand(), &path, true).unwrap();
    path
}

fn create_test_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "variant = \"NWO\"\nperiods = 3\n\n[[thinning]]\nperiod = 2\nfrom_below_percent = 30.0\n",
    )
    .unwrap();
    path
}

fn cmd() -> Command {
    Command::cargo_bin("stand-simulator").unwrap()
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Forest stand growth simulator"));
}

#[test]
fn test_cli_simulate() {
    let dir = TempDir::new().unwrap();
    let stand = create_test_stand(&dir);
    let config = create_test_config(&dir);

    cmd()
        .args(["simulate", "--stand"])
        .arg(&stand)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stand Summary"))
        .stdout(predicate::str::contains("Stand Trajectory"))
        .stdout(predicate::str::contains("Net Present Value"));
}

#[test]
fn test_cli_simulate_writes_yields() {
    let dir = TempDir::new().unwrap();
    let stand = create_test_stand(&dir);
    let config = create_test_config(&dir);
    let output = dir.path().join("yields.json");

    cmd()
        .args(["simulate", "--stand"])
        .arg(&stand)
        .arg("--config")
        .arg(&config)
        .args(["--periods", "4", "--pretty", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 5 periods"));

    let yields: Vec<PeriodYield> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(yields.len(), 5);
    assert_eq!(yields[4].period, 4);
    assert!(yields[2].basal_area_removed > 0.0);
    assert_eq!(yields[3].basal_area_removed, 0.0);
}

#[test]
fn test_cli_simulate_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let stand = create_test_stand(&dir);
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "variant = \"NWO\"\nperiods = 500\n").unwrap();

    cmd()
        .args(["simulate", "--stand"])
        .arg(&stand)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("number of periods"));
}

#[test]
fn test_cli_validate() {
    let dir = TempDir::new().unwrap();
    let stand = create_test_stand(&dir);

    cmd()
        .args(["validate", "--stand"])
        .arg(&stand)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid:"))
        .stdout(predicate::str::contains("40 trees in 2 cohorts"));
}

#[test]
fn test_cli_validate_unsupported_variant_species() {
    let dir = TempDir::new().unwrap();
    let stand = create_test_stand(&dir);

    // SWO has no western hemlock
    cmd()
        .args(["validate", "--variant", "SWO", "--stand"])
        .arg(&stand)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid for"));
}

#[test]
fn test_cli_missing_stand_file() {
    cmd()
        .args(["validate", "--stand", "/nonexistent/stand.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading stand"));
}
