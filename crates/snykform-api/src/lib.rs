// snykform-api: Async Rust client for the Snyk v1 REST API

pub mod client;
pub mod error;
pub mod integrations;
pub mod models;
pub mod notifications;
pub mod organizations;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, SnykClient, SnykOptions};
pub use error::Error;
pub use models::{
    IntegrationCredentials, IntegrationListing, IntegrationType, IssueSeverity, IssueType,
    NewIssuesRemediations, NotificationSettings, Organization, Toggle,
};
pub use transport::{TlsMode, TransportConfig};
