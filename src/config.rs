//! User configuration handling for cookiecutter.
//! Loads the optional YAML configuration file that controls where cloned
//! templates and replay files live, default context values and template
//! source abbreviations.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an alternative configuration file.
pub const CONFIG_ENV_VAR: &str = "COOKIECUTTER_CONFIG";

/// Default user configuration file, relative to the home directory.
pub const CONFIG_FILE: &str = ".cookiecutterrc";

/// User-level configuration.
///
/// Every field is optional in the file; missing fields fall back to the
/// built-in defaults. Abbreviations given in the file are merged on top of
/// the built-in ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    /// Directory where cloned templates are cached
    pub cookiecutters_dir: PathBuf,
    /// Directory where replay files are written
    pub replay_dir: PathBuf,
    /// Context values applied before any command-line overrides
    pub default_context: IndexMap<String, serde_json::Value>,
    /// Template source abbreviations, e.g. `gh:user/repo`
    pub abbreviations: IndexMap<String, String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            cookiecutters_dir: home.join(".cookiecutters"),
            replay_dir: home.join(".cookiecutter_replay"),
            default_context: IndexMap::new(),
            abbreviations: builtin_abbreviations(),
        }
    }
}

/// Built-in template source abbreviations.
pub fn builtin_abbreviations() -> IndexMap<String, String> {
    IndexMap::from([
        ("gh".to_string(), "https://github.com/{0}.git".to_string()),
        ("gl".to_string(), "https://gitlab.com/{0}.git".to_string()),
        ("bb".to_string(), "https://bitbucket.org/{0}".to_string()),
    ])
}

/// Expands a leading `~` or `~/` to the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    let Ok(stripped) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(stripped),
        None => path.to_path_buf(),
    }
}

/// Parses configuration file contents into a [`UserConfig`].
///
/// Built-in abbreviations are kept unless the file overrides them by name,
/// and home-relative directories are expanded.
pub fn parse_config(content: &str) -> Result<UserConfig> {
    let mut config: UserConfig = serde_yaml::from_str(content)
        .map_err(|e| Error::ConfigError(format!("invalid configuration file: {}", e)))?;

    let mut abbreviations = builtin_abbreviations();
    abbreviations.extend(std::mem::take(&mut config.abbreviations));
    config.abbreviations = abbreviations;

    config.cookiecutters_dir = expand_home(&config.cookiecutters_dir);
    config.replay_dir = expand_home(&config.replay_dir);
    Ok(config)
}

/// Returns the user configuration.
///
/// Resolution order: `--default-config` short-circuits to the built-in
/// defaults; an explicit `config_file` must exist; otherwise the
/// `COOKIECUTTER_CONFIG` environment variable or `~/.cookiecutterrc` is used
/// when present, and the defaults when not.
pub fn get_user_config(config_file: Option<&Path>, default_config: bool) -> Result<UserConfig> {
    if default_config {
        return Ok(UserConfig::default());
    }

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(Error::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        debug!("Loading configuration from {}", path.display());
        return parse_config(&std::fs::read_to_string(path)?);
    }

    let candidate = std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(CONFIG_FILE)));

    match candidate {
        Some(path) if path.exists() => {
            debug!("Loading configuration from {}", path.display());
            parse_config(&std::fs::read_to_string(path)?)
        }
        _ => Ok(UserConfig::default()),
    }
}
