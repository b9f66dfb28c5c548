use thiserror::Error;

/// Top-level error type for the `snykform-api` crate.
///
/// Covers every failure mode of a single gateway call: status
/// classification, transport, response decoding, and listing lookups
/// that came back empty. `snykform-core` propagates these unchanged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Status classification ───────────────────────────────────────
    /// HTTP 401 -- the API key was rejected.
    #[error("credentials not valid")]
    Unauthenticated,

    /// HTTP 403 -- the API key is valid but lacks access to the resource.
    #[error("credentials not authorized to access resource")]
    Unauthorized,

    /// HTTP 404 on the requested path.
    #[error("requested resource not found: {path}")]
    NotFound { path: String },

    /// Any other status at or above 300.
    #[error("unexpected HTTP status code {status}")]
    UnexpectedStatus { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API key cannot be carried in an HTTP header.
    #[error("Invalid API key: {message}")]
    InvalidApiKey { message: String },

    /// Building the underlying `reqwest::Client` failed (bad CA bundle, etc.)
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A listing was fetched successfully but holds no matching element.
    #[error("{kind} not found: {key}")]
    Missing { kind: &'static str, key: String },
}

impl Error {
    /// Returns `true` if the remote object is absent, either because the
    /// API answered 404 or because a listing scan came up empty.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Missing { .. })
    }

    /// Returns `true` if the API key was rejected or lacks permission.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Unauthorized)
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated => Some(401),
            Self::Unauthorized => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
