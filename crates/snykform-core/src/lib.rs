//! Declarative reconciliation of Snyk organizations and integrations.
//!
//! Sits between `snykform-api` and the CLI:
//!
//! - **[`resources`]**: create/read/update/delete for the `organization`
//!   and `integration` resource kinds, plus the read-only organization
//!   data source. Organization reads carry the declared `issueType`
//!   forward when the API drops it; integration creates reactivate an
//!   already-listed type instead of failing.
//!
//! - **[`state`] / [`schema`]**: the attribute model. [`ResourceData`]
//!   holds an id plus JSON attributes; [`Schema`] validates declarations,
//!   fills defaults, diffs against applied state (flagging force-new
//!   changes) and redacts sensitive values.
//!
//! - **[`Engine`]**: plans a [`Manifest`] against the applied
//!   [`Snapshot`], applies the plan in dependency order, refreshes and
//!   destroys. The snapshot is the only copy of write-only credentials.
//!
//! - **[`ProviderConfig`]**: group id, API key and transport settings;
//!   built by the CLI, never read from disk here.

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod resources;
pub mod schema;
pub mod snapshot;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ProviderConfig;
pub use engine::{
    Action, ApplyReport, DestroyReport, Engine, Plan, PlanSummary, PlannedChange, RefreshReport,
    plan,
};
pub use error::CoreError;
pub use manifest::{Manifest, ManifestFormat};
pub use resources::ResourceKind;
pub use schema::{Attribute, Change, Diff, REDACTED, Schema};
pub use snapshot::{Address, DEFAULT_SNAPSHOT_FILE, Snapshot};
pub use state::{Attributes, ResourceData};
