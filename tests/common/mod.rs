use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use cultura::config::Config;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn temp_catalog_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let catalog_path = temp_dir.path().join("personas.yaml");
    fs::write(&catalog_path, contents).expect("failed to write catalog file");
    (temp_dir, catalog_path)
}

/// Seeded config with default timings and no presence churn
#[allow(dead_code)]
pub fn seeded_config(activation_probability: f64) -> Config {
    let mut config = Config::default();
    config.simulator.seed = Some(7);
    config.simulator.activation_probability = activation_probability;
    config.simulator.presence_churn_probability = 0.0;
    config
}
