use cookiecutter::config::get_user_config;
use cookiecutter::error::Error;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config_flag_skips_the_file() {
    let config = get_user_config(None, true).unwrap();
    assert!(config.default_context.is_empty());
    assert!(config.abbreviations.contains_key("gh"));
}

#[test]
fn test_explicit_config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        concat!(
            "cookiecutters_dir: /tmp/clones\n",
            "replay_dir: /tmp/replay\n",
            "default_context:\n",
            "  full_name: Jane Doe\n",
            "abbreviations:\n",
            "  my: https://example.com/{0}.git\n",
        ),
    )
    .unwrap();

    let config = get_user_config(Some(&path), false).unwrap();

    assert_eq!(config.cookiecutters_dir, std::path::Path::new("/tmp/clones"));
    assert_eq!(config.replay_dir, std::path::Path::new("/tmp/replay"));
    assert_eq!(config.default_context["full_name"], json!("Jane Doe"));
    // file abbreviations extend the built-in set
    assert_eq!(config.abbreviations["my"], "https://example.com/{0}.git");
    assert_eq!(config.abbreviations["gh"], "https://github.com/{0}.git");
}

#[test]
fn test_missing_explicit_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = get_user_config(Some(&dir.path().join("nope.yaml")), false);
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "cookiecutters_dir: [not: a: path\n").unwrap();

    let result = get_user_config(Some(&path), false);
    assert!(matches!(result, Err(Error::ConfigError(_))));
}
