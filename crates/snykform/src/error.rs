//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use snykform_config::ConfigError;
use snykform_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Snyk API")]
    #[diagnostic(
        code(snykform::connection_failed),
        help(
            "Check network access and the configured endpoint.\n\
             Override it with --endpoint or SNYK_ENDPOINT."
        )
    )]
    ConnectionFailed {
        #[source]
        source: snykform_api::Error,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(snykform::auth_failed),
        help(
            "Verify the API key for this group.\n\
             Run: snykform config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(snykform::permission_denied),
        help("The API key is valid but cannot manage this group or organization.")
    )]
    PermissionDenied { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(snykform::no_credentials),
        help(
            "Configure credentials with: snykform config init\n\
             Or set the SNYK_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("No Snyk group configured for profile '{profile}'")]
    #[diagnostic(
        code(snykform::no_group),
        help(
            "Set group_id with: snykform config set group_id <id>\n\
             Or set the SNYK_API_GROUP environment variable."
        )
    )]
    NoGroup { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(snykform::not_found),
        help("Run: snykform refresh to drop resources that no longer exist")
    )]
    NotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(snykform::api_error))]
    ApiError { message: String },

    // ── Declarations ─────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(snykform::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(snykform::manifest),
        help("Fix the manifest and run: snykform validate")
    )]
    Manifest { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(snykform::state),
        help("The state file is the only record of applied ids and credentials; restore it from a backup if it is damaged.")
    )]
    State { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(snykform::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: snykform config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(snykform::config))]
    Config(Box<figment::Error>),

    #[error("{message}")]
    #[diagnostic(code(snykform::config))]
    ConfigFile { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(snykform::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(snykform::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::NoGroup { .. } => {
                exit_code::AUTH
            }
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::Manifest { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) => api.into(),

            CoreError::Validation { attribute, reason } => CliError::Validation {
                field: attribute,
                reason,
            },

            CoreError::Manifest { .. } => CliError::Manifest {
                message: err.to_string(),
            },

            CoreError::Snapshot { .. } => CliError::State {
                message: err.to_string(),
            },

            CoreError::UnresolvedReference { address, reference } => CliError::Validation {
                field: address,
                reason: format!("reference '{reference}' does not name a declared organization"),
            },

            CoreError::StateDecode { .. } | CoreError::MissingIdentity { .. } => CliError::State {
                message: err.to_string(),
            },
        }
    }
}

impl From<snykform_api::Error> for CliError {
    fn from(err: snykform_api::Error) -> Self {
        use snykform_api::Error as Api;

        match err {
            Api::Unauthenticated => CliError::AuthFailed {
                message: err.to_string(),
            },
            Api::Unauthorized => CliError::PermissionDenied {
                message: err.to_string(),
            },
            Api::NotFound { .. } | Api::Missing { .. } => CliError::NotFound {
                message: err.to_string(),
            },
            Api::Transport(_) | Api::ClientBuild(_) => CliError::ConnectionFailed { source: err },
            Api::InvalidApiKey { .. } => CliError::AuthFailed {
                message: err.to_string(),
            },
            _ => CliError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::NoGroup { profile } => CliError::NoGroup { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Figment(inner) => CliError::Config(inner),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Keyring(_) | ConfigError::Serialization(_) => CliError::ConfigFile {
                message: err.to_string(),
            },
        }
    }
}
