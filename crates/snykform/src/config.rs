//! CLI configuration, a thin wrapper around `snykform_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--group-id, --api-key, --endpoint, ...).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use snykform_core::ProviderConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use snykform_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config, store_api_key,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up the active profile, listing the known ones if it doesn't exist.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    config.profile(global.profile.as_deref()).map_err(|_| {
        let available = config.profiles.keys().cloned().collect::<Vec<_>>().join(", ");
        CliError::ProfileNotFound {
            name: active_profile_name(global, config),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available
            },
        }
    })
}

/// Build a `ProviderConfig` from the config file, profile, and CLI overrides.
///
/// Flag (or its environment variable) beats profile, profile beats the
/// shared resolution chain.
pub fn build_provider_config(global: &GlobalOpts) -> Result<ProviderConfig, CliError> {
    let config = load_config()?;
    let (profile_name, mut profile) = active_profile(global, &config)?;

    if let Some(ref endpoint) = global.endpoint {
        profile.endpoint = Some(endpoint.clone());
    }

    let group_id = match global.group_id.as_deref().filter(|g| !g.trim().is_empty()) {
        Some(group) => group.to_owned(),
        None => snykform_config::resolve_group_id(&profile, &profile_name)?,
    };
    let api_key = resolve_api_key_with_flag(&profile, &profile_name, global)?;

    let mut provider =
        snykform_config::build_provider_config(&profile, &config.defaults, group_id, api_key)?;
    if let Some(seconds) = global.timeout {
        provider.timeout = Duration::from_secs(seconds);
    }
    provider.validate()?;
    Ok(provider)
}

/// Resolve API key with CLI flag override, then fall through to shared resolution.
fn resolve_api_key_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    if let Some(key) = global.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        return Ok(SecretString::from(key.to_owned()));
    }
    Ok(snykform_config::resolve_api_key(profile, profile_name)?)
}

/// State file path: `--state` flag, else the configured default.
pub fn state_path(flag: Option<&PathBuf>) -> PathBuf {
    flag.cloned()
        .unwrap_or_else(|| load_config_or_default().defaults.state_file)
}
