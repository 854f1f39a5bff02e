//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests:
//! - Priority order: CLI > environment > TOML > compiled defaults
//! - Missing TOML file does not stop startup
//! - Invalid values are rejected
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate CAMVIEW_* variables are marked with #[serial].

use camview_common::config::{
    CliOverrides, PlayerConfig, TomlConfig, DEFAULT_FALLBACK_BASE, DEFAULT_PORT,
    DEFAULT_PRIMARY_BASE, ENV_FALLBACK_BASE, ENV_PORT, ENV_PRIMARY_BASE,
    ENV_RECOVERY_DELAY_SECS,
};
use camview_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;

fn clear_env() {
    env::remove_var(ENV_PRIMARY_BASE);
    env::remove_var(ENV_FALLBACK_BASE);
    env::remove_var(ENV_RECOVERY_DELAY_SECS);
    env::remove_var(ENV_PORT);
}

fn relay_toml() -> TomlConfig {
    TomlConfig::parse(
        r#"
        port = 7000

        [relay]
        primary_base = "http://toml-relay:8889"
        fallback_base = "http://toml-relay:8888"
        recovery_delay_secs = 12

        [logging]
        level = "warn"
        "#,
    )
    .unwrap()
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = PlayerConfig::resolve_with(&CliOverrides::default(), &TomlConfig::default())
        .unwrap();

    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.primary_base, DEFAULT_PRIMARY_BASE);
    assert_eq!(config.fallback_base, DEFAULT_FALLBACK_BASE);
    assert_eq!(config.recovery_delay, Duration::from_secs(30));
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();

    let config = PlayerConfig::resolve_with(&CliOverrides::default(), &relay_toml()).unwrap();

    assert_eq!(config.port, 7000);
    assert_eq!(config.primary_base, "http://toml-relay:8889");
    assert_eq!(config.fallback_base, "http://toml-relay:8888");
    assert_eq!(config.recovery_delay, Duration::from_secs(12));
    assert_eq!(config.log_level, "warn");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_PRIMARY_BASE, "http://env-relay:8889");
    env::set_var(ENV_RECOVERY_DELAY_SECS, "5");

    let config = PlayerConfig::resolve_with(&CliOverrides::default(), &relay_toml()).unwrap();

    assert_eq!(config.primary_base, "http://env-relay:8889");
    assert_eq!(config.fallback_base, "http://toml-relay:8888");
    assert_eq!(config.recovery_delay, Duration::from_secs(5));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_PORT, "7100");
    env::set_var(ENV_FALLBACK_BASE, "http://env-relay:8888");

    let cli = CliOverrides {
        port: Some(7200),
        fallback_base: Some("http://cli-relay:8888".to_string()),
        ..CliOverrides::default()
    };
    let config = PlayerConfig::resolve_with(&cli, &relay_toml()).unwrap();

    assert_eq!(config.port, 7200);
    assert_eq!(config.fallback_base, "http://cli-relay:8888");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_value_is_rejected() {
    clear_env();
    env::set_var(ENV_RECOVERY_DELAY_SECS, "soon");

    let result = PlayerConfig::resolve_with(&CliOverrides::default(), &TomlConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_relay_base_is_rejected() {
    clear_env();

    let cli = CliOverrides {
        primary_base: Some("not a url".to_string()),
        ..CliOverrides::default()
    };
    let result = PlayerConfig::resolve_with(&cli, &TomlConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_missing_config_file_falls_back_to_defaults() {
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let cli = CliOverrides {
        config_file: Some(dir.path().join("does-not-exist.toml")),
        ..CliOverrides::default()
    };
    let config = PlayerConfig::resolve(&cli).unwrap();

    assert_eq!(config, PlayerConfig::default());
}

#[test]
#[serial]
fn test_config_file_is_loaded() {
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [relay]
        primary_base = "https://relay.example.com:8889"
        "#
    )
    .unwrap();

    let cli = CliOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..CliOverrides::default()
    };
    let config = PlayerConfig::resolve(&cli).unwrap();

    assert_eq!(config.primary_base, "https://relay.example.com:8889");
    assert_eq!(config.fallback_base, DEFAULT_FALLBACK_BASE);
}

#[test]
#[serial]
fn test_malformed_config_file_is_an_error() {
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let cli = CliOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..CliOverrides::default()
    };
    assert!(matches!(PlayerConfig::resolve(&cli), Err(Error::Toml(_))));
}
