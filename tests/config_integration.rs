//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use pushball::config::AppConfig;
use serial_test::serial;
use std::path::PathBuf;

fn config_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pushball-config-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("PB_SCENES__FIRST_LEVEL", "Level2");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("PB_SCENES__FIRST_LEVEL");
    assert_eq!(config.scenes.first_level, "Level2");
    assert_eq!(config.scenes.main_menu, "MainMenu");
}

#[test]
#[serial]
fn test_repo_default_config_matches_defaults() {
    std::env::remove_var("PB_SCENES__FIRST_LEVEL");
    let dir = config_dir("repo");
    std::fs::copy("config/default.toml", dir.join("default.toml")).unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    let defaults = AppConfig::default();
    assert_eq!(config.scenes.transition_scene, defaults.scenes.transition_scene);
    assert_eq!(config.scenes.load_steps, defaults.scenes.load_steps);
    assert_eq!(config.character.max_push_force, defaults.character.max_push_force);
    assert_eq!(config.physics.gravity, defaults.physics.gravity);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
#[serial]
fn test_user_config_overrides_default() {
    let dir = config_dir("user");
    std::fs::write(
        dir.join("default.toml"),
        "[physics]\ngravity = -9.81\nfixed_timestep = 0.02\n\n[character]\nmax_speed = 5.0\n",
    )
    .unwrap();
    std::fs::write(dir.join("user.toml"), "[character]\nmax_speed = 8.0\n").unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.character.max_speed, 8.0);
    assert_eq!(config.physics.fixed_timestep, 0.02);
    // Untouched sections keep their defaults
    assert_eq!(config.scenes.first_level, "Level1");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.debug.log_level, "info");
}

#[test]
#[serial]
fn test_malformed_file_is_error() {
    let dir = config_dir("bad");
    std::fs::write(dir.join("default.toml"), "[physics]\ngravity = \"down\"\n").unwrap();

    let err = AppConfig::load_from(&dir).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));

    std::fs::remove_dir_all(&dir).unwrap();
}
