//! Integration tests for configuration loading and root folder resolution
//!
//! Tests touching `DISC_ROOT_FOLDER` run serially.

use disc_common::config::{
    resolve_root_folder, ServiceConfig, TomlConfig, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_HOST,
    DEFAULT_PORT, ROOT_FOLDER_ENV,
};
use disc_common::Error;
use serial_test::serial;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_cli_beats_env() {
    std::env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let root = resolve_root_folder(Some(Path::new("/from/cli")), ROOT_FOLDER_ENV, &TomlConfig::default());
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/from/cli"));
}

#[test]
#[serial]
fn test_env_beats_file() {
    std::env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let file = TomlConfig {
        root_folder: Some(PathBuf::from("/from/file")),
        ..Default::default()
    };
    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &file);
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_blank_env_is_ignored() {
    std::env::set_var(ROOT_FOLDER_ENV, "   ");
    let file = TomlConfig {
        root_folder: Some(PathBuf::from("/from/file")),
        ..Default::default()
    };
    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &file);
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/from/file"));
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    std::env::remove_var(ROOT_FOLDER_ENV);
    let config = ServiceConfig::resolve(None, None, None, &TomlConfig::default());

    assert!(config.root_folder.ends_with("disc-assessment") || config.root_folder.ends_with("disc_data"));
    assert_eq!(config.host, DEFAULT_HOST);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.database.path, config.root_folder.join("disc.db"));
    assert_eq!(config.database.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 6000\ndatabase_file = \"x.db\"\n").unwrap();

    let config = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.database_file.as_deref(), Some("x.db"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = [not valid").unwrap();

    assert!(matches!(TomlConfig::load(&path), Err(Error::Config(_))));
}

#[test]
fn test_ensure_root_folder_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("a").join("b");
    let config = ServiceConfig::resolve(Some(root.as_path()), None, None, &TomlConfig::default());

    config.ensure_root_folder().unwrap();
    assert!(root.is_dir());
    // Second call is a no-op
    config.ensure_root_folder().unwrap();
}
