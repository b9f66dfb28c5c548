//! Shared configuration for snykform.
//!
//! TOML profiles, API key resolution (profile env var, `SNYK_API_KEY`,
//! keyring, plaintext), and translation to `snykform_core::ProviderConfig`.
//! The CLI layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use snykform_core::ProviderConfig;

/// Environment variable holding the Snyk group id.
pub const GROUP_ENV: &str = "SNYK_API_GROUP";
/// Environment variable holding the Snyk API key.
pub const API_KEY_ENV: &str = "SNYK_API_KEY";
/// Prefix for config overrides, e.g. `SNYK_DEFAULTS__TIMEOUT=60`.
pub const ENV_PREFIX: &str = "SNYK_";

const KEYRING_SERVICE: &str = "snykform";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no Snyk group configured for profile '{profile}'")]
    NoGroup { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` isn't given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile called `name`, or the default profile when `None`.
    ///
    /// A missing default profile yields an empty one so a purely
    /// environment-driven setup (`SNYK_API_GROUP` + `SNYK_API_KEY`) works
    /// without any config file.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        match name {
            Some(name) => self
                .profiles
                .get(name)
                .cloned()
                .map(|p| (name.to_owned(), p))
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() }),
            None => {
                let name = self.default_profile.as_deref().unwrap_or("default");
                Ok((
                    name.to_owned(),
                    self.profiles.get(name).cloned().unwrap_or_default(),
                ))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Snapshot file used when `--state` isn't given.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            state_file: default_state_file(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_state_file() -> PathBuf {
    PathBuf::from(snykform_core::DEFAULT_SNAPSHOT_FILE)
}

/// A named Snyk account profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Group that owns the managed organizations.
    pub group_id: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// API root override (regional or self-hosted endpoints).
    pub endpoint: Option<String>,

    /// Path to an extra CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "snykform", "snykform").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("snykform");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) with `SNYK_` env overrides.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Store an API key in the system keyring for `profile_name`.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))?;
    entry.set_password(key)?;
    Ok(())
}

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(profile, profile_name, |name| std::env::var(name).ok(), true)
}

fn resolve_api_key_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    use_keyring: bool,
) -> Result<SecretString, ConfigError> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    // 1. Profile's api_key_env → env var lookup
    if let Some(key) = non_empty(profile.api_key_env.as_deref().and_then(&env)) {
        return Ok(SecretString::from(key));
    }

    // 2. SNYK_API_KEY
    if let Some(key) = non_empty(env(API_KEY_ENV)) {
        return Ok(SecretString::from(key));
    }

    // 3. System keyring
    if use_keyring {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key")) {
            if let Ok(secret) = entry.get_password() {
                return Ok(SecretString::from(secret));
            }
        }
    }

    // 4. Plaintext in config
    if let Some(key) = non_empty(profile.api_key.clone()) {
        return Ok(SecretString::from(key));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the group id: profile first, then `SNYK_API_GROUP`.
pub fn resolve_group_id(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    resolve_group_id_with(profile, profile_name, |name| std::env::var(name).ok())
}

fn resolve_group_id_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    profile
        .group_id
        .clone()
        .or_else(|| env(GROUP_ENV))
        .filter(|g| !g.trim().is_empty())
        .ok_or_else(|| ConfigError::NoGroup {
            profile: profile_name.into(),
        })
}

/// Build a `ProviderConfig` from a profile, no CLI flag overrides.
pub fn profile_to_provider_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ProviderConfig, ConfigError> {
    let group_id = resolve_group_id(profile, profile_name)?;
    let api_key = resolve_api_key(profile, profile_name)?;
    build_provider_config(profile, defaults, group_id, api_key)
}

/// Assemble a `ProviderConfig` from already-resolved credentials.
pub fn build_provider_config(
    profile: &Profile,
    defaults: &Defaults,
    group_id: String,
    api_key: SecretString,
) -> Result<ProviderConfig, ConfigError> {
    let mut config =
        ProviderConfig::new(group_id, api_key).map_err(|e| ConfigError::Validation {
            field: "endpoint".into(),
            reason: e.to_string(),
        })?;

    if let Some(ref endpoint) = profile.endpoint {
        config.endpoint = endpoint.parse().map_err(|_| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL: {endpoint}"),
        })?;
    }
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.ca_cert.clone_from(&profile.ca_cert);
    Ok(config)
}
