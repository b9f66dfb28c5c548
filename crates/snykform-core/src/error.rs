// ── Core error types ──
//
// Gateway errors pass through untouched (`Api`); everything else describes
// a problem with declared state, the manifest, or the snapshot file.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote ───────────────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] snykform_api::Error),

    // ── Declared state ───────────────────────────────────────────────
    /// A required exactly-one block is missing or empty.
    #[error("unable to fetch {block} from state")]
    StateDecode { block: String },

    #[error("invalid value for {attribute}: {reason}")]
    Validation { attribute: String, reason: String },

    /// An operation that needs a remote id ran against state without one.
    #[error("{resource} has no remote id recorded")]
    MissingIdentity { resource: String },

    #[error("{address}: reference '{reference}' cannot be resolved")]
    UnresolvedReference { address: String, reference: String },

    // ── Files ────────────────────────────────────────────────────────
    #[error("manifest {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("state file {path}: {message}")]
    Snapshot { path: String, message: String },
}

impl CoreError {
    pub(crate) fn validation(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the remote object is gone (404 or absent from
    /// its listing). Callers treat the resource as no longer applied.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_not_found())
    }

    /// The underlying gateway error, if this came from the remote API.
    pub fn api_error(&self) -> Option<&snykform_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}
