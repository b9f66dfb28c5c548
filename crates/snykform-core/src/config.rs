// ── Runtime provider configuration ──
//
// Describes *which* Snyk account to reconcile against and how to reach it.
// Carries the API key but never touches disk: the CLI resolves profiles,
// environment and keyring entries and hands a `ProviderConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use snykform_api::transport::DEFAULT_USER_AGENT;
use snykform_api::{DEFAULT_BASE_URL, SnykClient, SnykOptions, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Account-level configuration shared by every resource.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Snyk group that owns the managed organizations.
    pub group_id: String,
    pub api_key: SecretString,
    /// API root (defaults to the public v1 endpoint).
    pub endpoint: Url,
    pub user_agent: String,
    pub timeout: Duration,
    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,
}

impl ProviderConfig {
    /// Config for the public endpoint with default transport settings.
    pub fn new(group_id: impl Into<String>, api_key: SecretString) -> Result<Self, CoreError> {
        let endpoint = Url::parse(DEFAULT_BASE_URL).map_err(snykform_api::Error::from)?;
        Ok(Self {
            group_id: group_id.into(),
            api_key,
            endpoint,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            ca_cert: None,
        })
    }

    /// Both the group id and the API key are required.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.group_id.trim().is_empty() {
            return Err(CoreError::validation("group", "a Snyk group id is required"));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(CoreError::validation("api_key", "a Snyk API key is required"));
        }
        Ok(())
    }

    pub fn to_options(&self) -> SnykOptions {
        SnykOptions {
            group_id: self.group_id.clone(),
            api_key: self.api_key.clone(),
            base_url: self.endpoint.clone(),
            transport: TransportConfig {
                tls: self
                    .ca_cert
                    .clone()
                    .map_or(TlsMode::System, TlsMode::CustomCa),
                timeout: self.timeout,
                user_agent: self.user_agent.clone(),
            },
        }
    }

    /// Validate and build the shared API client.
    pub fn connect(&self) -> Result<SnykClient, CoreError> {
        self.validate()?;
        Ok(SnykClient::new(&self.to_options())?)
    }
}
