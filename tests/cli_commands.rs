#![allow(deprecated)]

/// End-to-end tests for the `cultura` binary
///
/// These run the headless commands only; `chat` needs a terminal.
use assert_cmd::Command;
use predicates::prelude::*;
mod common;

fn cultura() -> Command {
    let mut cmd = Command::cargo_bin("cultura").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("CULTURA_SEED")
        .env_remove("CULTURA_CATALOG_PATH")
        .env_remove("CULTURA_ACTIVATION_PROBABILITY")
        .env_remove("CULTURA_TICK_INTERVAL_MS")
        .env_remove("CULTURA_LOG_LEVEL");
    cmd
}

#[test]
fn test_personas_json_lists_builtin_catalog() {
    let output = cultura().arg("personas").arg("--json").output().unwrap();
    assert!(output.status.success());

    let personas: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let personas = personas.as_array().unwrap();
    assert_eq!(personas.len(), 8);
    assert!(personas.iter().any(|p| p["id"] == "kenji"));
    assert!(personas
        .iter()
        .all(|p| p["personality"].as_str().is_some()));
}

#[test]
fn test_personas_table() {
    cultura()
        .arg("personas")
        .assert()
        .success()
        .stdout(predicate::str::contains("Personality"))
        .stdout(predicate::str::contains("amara"));
}

#[test]
fn test_personas_from_custom_catalog() {
    let (_dir, path) = common::temp_catalog_file(
        "personas:\n  - id: ines\n    display_name: Inês\n    avatar: x\n    personality: creative\n    culture: Portuguese\n",
    );
    cultura()
        .arg("--catalog")
        .arg(path)
        .arg("personas")
        .assert()
        .success()
        .stdout(predicate::str::contains("ines"))
        .stdout(predicate::str::contains("Portuguese"))
        .stdout(predicate::str::contains("kenji").not());
}

#[test]
fn test_unknown_personality_in_catalog_fails() {
    let (_dir, path) = common::temp_catalog_file(
        "personas:\n  - id: zed\n    display_name: Zed\n    avatar: z\n    personality: grumpy\n",
    );
    cultura()
        .arg("--catalog")
        .arg(path)
        .arg("personas")
        .assert()
        .failure()
        .stderr(predicate::str::contains("persona catalog"));
}

#[test]
fn test_seeded_simulation_json_is_reproducible() {
    let run = || {
        cultura()
            .args(["--seed", "1", "simulate", "--ticks", "12", "--json"])
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let feed: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    let engagement = feed["engagement"].as_u64().unwrap();
    assert!(engagement <= 12);
    assert!(!feed["active"].as_array().unwrap().is_empty());
    assert_eq!(
        feed["active"].as_array().unwrap().len() + feed["discovery"].as_array().unwrap().len(),
        8
    );
}

#[test]
fn test_simulation_full_activation() {
    let output = cultura()
        .args([
            "--seed",
            "3",
            "simulate",
            "--ticks",
            "5",
            "--activation-probability",
            "1.0",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let feed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(feed["engagement"], 5);
    assert_eq!(feed["total_unread"], 5);
}

#[test]
fn test_invalid_activation_override_is_rejected() {
    cultura()
        .args(["simulate", "--ticks", "1", "--activation-probability", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("activation_probability"));
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let (_dir, path) = common::temp_config_file("simulator:\n  tick_interval_ms: 0\n");
    cultura()
        .arg("--config")
        .arg(path)
        .args(["simulate", "--ticks", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be greater than 0"));
}

#[test]
fn test_ticks_and_duration_conflict() {
    cultura()
        .args(["simulate", "--ticks", "1", "--duration-secs", "1"])
        .assert()
        .failure();
}
