// Snyk v1 wire types.
//
// Field names follow the API's JSON exactly (camelCase for most payloads,
// kebab-case keys for the notification-settings groups).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── Organizations ───────────────────────────────────────────────────

/// An organization as listed under a group or returned from `POST /org`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// `GET /group/{groupId}/orgs` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct GroupOrganizations {
    #[serde(default)]
    pub orgs: Vec<Organization>,
}

/// `POST /org` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrganizationRequest<'a> {
    pub name: &'a str,
    pub group_id: &'a str,
}

// ── Notification settings ───────────────────────────────────────────

/// Which severities trigger new-issue notifications.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueSeverity {
    All,
    High,
}

/// Which issue kinds trigger new-issue notifications.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueType {
    All,
    Vuln,
    License,
    None,
}

/// The `new-issues-remediations` group.
///
/// The API answers `""` for `issueType` whenever `enabled` is false, so
/// both selectors decode an empty string as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssuesRemediations {
    pub enabled: bool,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub issue_severity: Option<IssueSeverity>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub issue_type: Option<IssueType>,
}

/// A single on/off notification group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Toggle {
    pub enabled: bool,
}

impl Toggle {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// `GET|PUT /org/{id}/notification-settings` body. Always sent whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(rename = "new-issues-remediations")]
    pub new_issues_remediations: NewIssuesRemediations,
    #[serde(rename = "project-imported", default)]
    pub project_imported: Toggle,
    #[serde(rename = "test-limit", default)]
    pub test_limit: Toggle,
    #[serde(rename = "weekly-report", default)]
    pub weekly_report: Toggle,
}

// ── Integrations ────────────────────────────────────────────────────

/// Third-party tools Snyk can integrate with, by their API identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IntegrationType {
    Acr,
    ArtifactoryCr,
    AzureRepos,
    BitbucketCloud,
    BitbucketServer,
    DigitaloceanCr,
    DockerHub,
    Ecr,
    Gcr,
    Github,
    GithubCr,
    GithubEnterprise,
    Gitlab,
    GitlabCr,
    GoogleArtifactCr,
    HarborCr,
    NexusCr,
    QuayCr,
}

/// Integration credentials. Write-only: the API accepts them but never
/// returns them. Which members are meaningful depends on the type.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
}

impl std::fmt::Debug for IntegrationCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("IntegrationCredentials")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("registry_base", &self.registry_base)
            .field("url", &self.url)
            .field("token", &redact(&self.token))
            .field("region", &self.region)
            .field("role_arn", &self.role_arn)
            .finish()
    }
}

/// `POST /org/{orgId}/integrations` and `PUT .../{id}` request body.
#[derive(Debug, Serialize)]
pub(crate) struct IntegrationRequest<'a> {
    #[serde(rename = "type")]
    pub integration_type: IntegrationType,
    pub credentials: &'a IntegrationCredentials,
}

/// `POST /org/{orgId}/integrations` response body (extra fields ignored).
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedIntegration {
    pub id: String,
}

/// `GET /org/{orgId}/integrations` -- integration type to integration id.
///
/// Keys are kept as raw strings so types this crate doesn't know about
/// never break decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationListing(BTreeMap<String, String>);

impl IntegrationListing {
    /// The id registered for `integration_type`. An empty id counts as absent.
    pub fn id_of(&self, integration_type: IntegrationType) -> Option<&str> {
        self.0
            .get(integration_type.as_ref())
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn contains(&self, integration_type: IntegrationType) -> bool {
        self.id_of(integration_type).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, String)> for IntegrationListing {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Serde helpers ───────────────────────────────────────────────────

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => T::deserialize(IntoDeserializer::<D::Error>::into_deserializer(s)).map(Some),
    }
}

#[allow(clippy::ref_option)]
fn none_as_empty<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn disabled_new_issues_decodes_empty_type_as_none() {
        let raw = json!({
            "new-issues-remediations": {"enabled": false, "issueSeverity": "high", "issueType": ""},
            "project-imported": {"enabled": true},
            "test-limit": {"enabled": false},
            "weekly-report": {"enabled": true}
        });
        let settings: NotificationSettings = serde_json::from_value(raw).unwrap();
        assert_eq!(settings.new_issues_remediations.issue_type, None);
        assert_eq!(
            settings.new_issues_remediations.issue_severity,
            Some(IssueSeverity::High)
        );
        assert!(settings.weekly_report.enabled);
    }

    #[test]
    fn notification_settings_serialize_with_api_keys() {
        let settings = NotificationSettings {
            new_issues_remediations: NewIssuesRemediations {
                enabled: true,
                issue_severity: Some(IssueSeverity::All),
                issue_type: Some(IssueType::Vuln),
            },
            project_imported: Toggle::new(false),
            test_limit: Toggle::new(true),
            weekly_report: Toggle::new(false),
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            value,
            json!({
                "new-issues-remediations": {"enabled": true, "issueSeverity": "all", "issueType": "vuln"},
                "project-imported": {"enabled": false},
                "test-limit": {"enabled": true},
                "weekly-report": {"enabled": false}
            })
        );
    }

    #[test]
    fn integration_type_uses_api_identifiers() {
        assert_eq!(IntegrationType::BitbucketCloud.as_ref(), "bitbucket-cloud");
        assert_eq!(IntegrationType::GoogleArtifactCr.to_string(), "google-artifact-cr");
        assert_eq!("docker-hub".parse::<IntegrationType>().unwrap(), IntegrationType::DockerHub);
        assert!("not-a-tool".parse::<IntegrationType>().is_err());
    }

    #[test]
    fn credentials_skip_unset_members() {
        let creds = IntegrationCredentials {
            username: Some("u".into()),
            password: Some("p".into()),
            ..IntegrationCredentials::default()
        };
        let request = IntegrationRequest {
            integration_type: IntegrationType::BitbucketCloud,
            credentials: &creds,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"type": "bitbucket-cloud", "credentials": {"username": "u", "password": "p"}})
        );
        assert!(!format!("{creds:?}").contains("\"p\""));
    }

    #[test]
    fn listing_treats_empty_id_as_absent() {
        let listing: IntegrationListing =
            serde_json::from_value(json!({"github": "abc", "gitlab": "", "some-new-tool": "x"}))
                .unwrap();
        assert_eq!(listing.id_of(IntegrationType::Github), Some("abc"));
        assert!(!listing.contains(IntegrationType::Gitlab));
        assert!(!listing.contains(IntegrationType::Ecr));
        assert_eq!(listing.len(), 3);
    }
}
