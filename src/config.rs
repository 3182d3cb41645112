//! Configuration loading and validation.
//!
//! Meshline reads a single TOML file (`~/.meshline/config.toml` by
//! default, or `--config`). Every field has a default, so a missing file
//! at the default location is not an error. The Slack token itself never
//! lives in the file: the config names the environment variable that
//! holds it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Slack Web API settings.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Notification channel bindings.
    #[serde(default)]
    pub channels: ChannelsConfig,
}

/// Slack Web API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    /// Web API base URL. Overridable to point at a local stub in tests.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable name holding the bot token.
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            bot_token_env: default_bot_token_env(),
        }
    }
}

/// Channel bindings: which channel each event kind announces to.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Channel for join-request notifications.
    #[serde(default = "default_join_requests_channel")]
    pub join_requests: String,

    /// Channel for panorama notifications.
    #[serde(default = "default_panoramas_channel")]
    pub panoramas: String,

    /// Channel for install-team notifications.
    #[serde(default = "default_install_team_channel")]
    pub install_team: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            join_requests: default_join_requests_channel(),
            panoramas: default_panoramas_channel(),
            install_team: default_install_team_channel(),
        }
    }
}

// Default value functions for serde

fn default_api_base() -> String {
    "https://slack.com/api".to_owned()
}
fn default_bot_token_env() -> String {
    "MESHLINE_SLACK_TOKEN".to_owned()
}
fn default_join_requests_channel() -> String {
    "join-requests-test".to_owned()
}
fn default_panoramas_channel() -> String {
    "panoramas-test".to_owned()
}
fn default_install_team_channel() -> String {
    "install-team-test".to_owned()
}

/// Load config from an explicit path, or from the default location.
///
/// With an explicit path the file must exist and parse. Without one, a
/// missing file at the default location yields `Config::default()`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or (for the
/// default location) if the home directory cannot be determined.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return read_config(path);
    }
    let default_path = config_dir()?.join("config.toml");
    if !default_path.exists() {
        return Ok(Config::default());
    }
    read_config(&default_path)
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Resolve the default config directory (`~/.meshline/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".meshline"))
}
