// ── Declarative state <-> API conversions ──
//
// Decodes declared attributes into `snykform_api` request types and encodes
// API responses back into attributes. Declared state is authoritative for
// anything the API can't echo back: credentials are never read from the
// remote side, and a remote read may not blank out a declared notification
// selector.

use std::str::FromStr;

use serde_json::{Map, Value};

use snykform_api::{
    IntegrationCredentials, IntegrationType, NewIssuesRemediations, NotificationSettings,
    Organization, Toggle,
};

use crate::error::CoreError;
use crate::state::{Attributes, ResourceData, block, single_block};

// ── Helpers ────────────────────────────────────────────────────────

fn required_bool(attrs: &Attributes, block_name: &str, name: &str) -> Result<bool, CoreError> {
    attrs.get(name).and_then(Value::as_bool).ok_or_else(|| {
        CoreError::validation(format!("{block_name}.{name}"), "expected a boolean")
    })
}

/// Parse an optional enum-valued string; absent or empty means `None`.
fn optional_enum<T: FromStr>(
    attrs: &Attributes,
    path: &str,
    name: &str,
) -> Result<Option<T>, CoreError> {
    match attrs.get(name).and_then(Value::as_str) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            CoreError::validation(format!("{path}.{name}"), format!("unsupported value '{raw}'"))
        }),
    }
}

fn non_empty(attrs: &Attributes, name: &str) -> Option<String> {
    attrs
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

// ── Organization ───────────────────────────────────────────────────

/// Refresh the read-only organization attributes from a remote read.
pub fn set_organization_state(data: &mut ResourceData, org: &Organization) {
    data.set_id(org.id.as_str());
    data.set("name", org.name.as_str());
    data.set("slug", org.slug.as_str());
    data.set("url", org.url.as_str());
    match org.created {
        Some(created) => data.set("created", created.to_rfc3339()),
        None => {
            data.remove("created");
        }
    }
}

// ── Notification settings ──────────────────────────────────────────

/// Decode the `notifications` block into the full four-group structure.
pub fn notifications_from_state(attrs: &Attributes) -> Result<NotificationSettings, CoreError> {
    let notifications = block(attrs, "notifications")?;
    let new_issues = block(notifications, "new_issues")?;

    Ok(NotificationSettings {
        new_issues_remediations: NewIssuesRemediations {
            enabled: required_bool(new_issues, "notifications.new_issues", "enabled")?,
            issue_severity: optional_enum(new_issues, "notifications.new_issues", "severity")?,
            issue_type: optional_enum(new_issues, "notifications.new_issues", "type")?,
        },
        project_imported: Toggle::new(required_bool(
            notifications,
            "notifications",
            "project_imports",
        )?),
        test_limit: Toggle::new(required_bool(notifications, "notifications", "test_limits")?),
        weekly_report: Toggle::new(required_bool(
            notifications,
            "notifications",
            "weekly_report",
        )?),
    })
}

/// Encode settings as the `notifications` block value.
pub fn notifications_to_state(settings: &NotificationSettings) -> Value {
    let remediations = &settings.new_issues_remediations;
    let mut new_issues = Map::new();
    new_issues.insert("enabled".into(), remediations.enabled.into());
    if let Some(severity) = remediations.issue_severity {
        new_issues.insert("severity".into(), severity.as_ref().into());
    }
    if let Some(issue_type) = remediations.issue_type {
        new_issues.insert("type".into(), issue_type.as_ref().into());
    }

    let mut notifications = Map::new();
    notifications.insert("new_issues".into(), single_block(new_issues));
    notifications.insert(
        "project_imports".into(),
        settings.project_imported.enabled.into(),
    );
    notifications.insert("test_limits".into(), settings.test_limit.enabled.into());
    notifications.insert("weekly_report".into(), settings.weekly_report.enabled.into());
    single_block(notifications)
}

/// Merge a fresh remote read over previously declared settings.
///
/// The API clears `issueType` whenever new-issue notifications are
/// disabled, so in that case the declared type is carried forward. A
/// selector the remote returns empty never replaces a declared one.
pub fn merge_notifications(
    declared: Option<&NotificationSettings>,
    mut remote: NotificationSettings,
) -> NotificationSettings {
    let Some(declared) = declared else {
        return remote;
    };
    let declared = &declared.new_issues_remediations;
    let remote_issues = &mut remote.new_issues_remediations;

    if !remote_issues.enabled || remote_issues.issue_type.is_none() {
        remote_issues.issue_type = declared.issue_type.or(remote_issues.issue_type);
    }
    if remote_issues.issue_severity.is_none() {
        remote_issues.issue_severity = declared.issue_severity;
    }
    remote
}

// ── Integration ────────────────────────────────────────────────────

pub fn integration_type_from_state(attrs: &Attributes) -> Result<IntegrationType, CoreError> {
    let raw = attrs
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::validation("type", "required attribute is not set"))?;
    raw.parse()
        .map_err(|_| CoreError::validation("type", format!("unsupported integration type '{raw}'")))
}

/// Decode the `credentials` block. Empty members are treated as unset.
pub fn credentials_from_state(attrs: &Attributes) -> Result<IntegrationCredentials, CoreError> {
    let creds = block(attrs, "credentials")?;
    Ok(IntegrationCredentials {
        username: non_empty(creds, "username"),
        password: non_empty(creds, "password"),
        registry_base: non_empty(creds, "registry_base"),
        url: non_empty(creds, "url"),
        token: non_empty(creds, "token"),
        region: non_empty(creds, "region"),
        role_arn: non_empty(creds, "role_arn"),
    })
}

/// Encode credentials as the `credentials` block value, writing only the
/// members that are set so an empty string never shows up as a value.
pub fn credentials_to_state(creds: &IntegrationCredentials) -> Value {
    let members = [
        ("username", &creds.username),
        ("password", &creds.password),
        ("registry_base", &creds.registry_base),
        ("url", &creds.url),
        ("token", &creds.token),
        ("region", &creds.region),
        ("role_arn", &creds.role_arn),
    ];
    let element: Map<String, Value> = members
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (name.to_owned(), Value::String(v.to_owned())))
        })
        .collect();
    single_block(element)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use snykform_api::{IssueSeverity, IssueType};

    use super::*;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn declared(enabled: bool, issue_type: &str) -> Attributes {
        attrs(json!({
            "name": "acme",
            "notifications": [{
                "new_issues": [{"enabled": enabled, "severity": "high", "type": issue_type}],
                "project_imports": true,
                "test_limits": false,
                "weekly_report": true
            }]
        }))
    }

    #[test]
    fn decodes_full_notification_structure() {
        let settings = notifications_from_state(&declared(true, "vuln")).unwrap();
        assert!(settings.new_issues_remediations.enabled);
        assert_eq!(
            settings.new_issues_remediations.issue_severity,
            Some(IssueSeverity::High)
        );
        assert_eq!(
            settings.new_issues_remediations.issue_type,
            Some(IssueType::Vuln)
        );
        assert!(settings.project_imported.enabled);
        assert!(!settings.test_limit.enabled);
        assert!(settings.weekly_report.enabled);
    }

    #[test]
    fn encode_then_decode_preserves_settings() {
        let settings = notifications_from_state(&declared(false, "license")).unwrap();
        let mut state = Map::new();
        state.insert("notifications".into(), notifications_to_state(&settings));
        assert_eq!(notifications_from_state(&state).unwrap(), settings);
    }

    #[test]
    fn missing_new_issues_block_is_state_decode_error() {
        let state = attrs(json!({"notifications": [{"project_imports": true}]}));
        let err = notifications_from_state(&state).unwrap_err();
        assert_eq!(err.to_string(), "unable to fetch new_issues from state");
    }

    #[test]
    fn unsupported_issue_type_is_rejected() {
        let err = notifications_from_state(&declared(true, "everything")).unwrap_err();
        assert!(
            matches!(err, CoreError::Validation { ref attribute, .. } if attribute == "notifications.new_issues.type")
        );
    }

    #[test]
    fn disabled_remote_keeps_declared_issue_type() {
        let declared = notifications_from_state(&declared(false, "vuln")).unwrap();
        let mut remote = declared.clone();
        remote.new_issues_remediations.issue_type = None;

        let merged = merge_notifications(Some(&declared), remote);
        assert_eq!(
            merged.new_issues_remediations.issue_type,
            Some(IssueType::Vuln)
        );
    }

    #[test]
    fn enabled_remote_value_wins() {
        let declared = notifications_from_state(&declared(true, "vuln")).unwrap();
        let mut remote = declared.clone();
        remote.new_issues_remediations.issue_type = Some(IssueType::License);
        remote.weekly_report = Toggle::new(false);

        let merged = merge_notifications(Some(&declared), remote);
        assert_eq!(
            merged.new_issues_remediations.issue_type,
            Some(IssueType::License)
        );
        assert!(!merged.weekly_report.enabled);
    }

    #[test]
    fn no_declared_state_accepts_remote_as_is() {
        let remote = notifications_from_state(&declared(false, "")).unwrap();
        assert_eq!(merge_notifications(None, remote.clone()), remote);
    }

    #[test]
    fn credentials_encode_only_set_members() {
        let creds = IntegrationCredentials {
            username: Some("u".into()),
            password: Some("p".into()),
            region: Some(String::new()),
            ..IntegrationCredentials::default()
        };
        assert_eq!(
            credentials_to_state(&creds),
            json!([{"username": "u", "password": "p"}])
        );
    }

    #[test]
    fn credentials_decode_treats_empty_as_unset() {
        let state = attrs(json!({
            "credentials": [{"token": "t", "url": "", "region": "eu-west-1"}]
        }));
        let creds = credentials_from_state(&state).unwrap();
        assert_eq!(creds.token.as_deref(), Some("t"));
        assert_eq!(creds.url, None);
        assert_eq!(creds.region.as_deref(), Some("eu-west-1"));

        let err = credentials_from_state(&attrs(json!({"credentials": []}))).unwrap_err();
        assert_eq!(err.to_string(), "unable to fetch credentials from state");
    }

    #[test]
    fn integration_type_parses_api_identifier() {
        let state = attrs(json!({"type": "bitbucket-cloud"}));
        assert_eq!(
            integration_type_from_state(&state).unwrap(),
            IntegrationType::BitbucketCloud
        );
        assert!(integration_type_from_state(&attrs(json!({"type": "svn"}))).is_err());
    }

    #[test]
    fn organization_state_includes_read_only_fields() {
        let org: Organization = serde_json::from_value(json!({
            "id": "org-1",
            "name": "acme",
            "slug": "acme-slug",
            "url": "https://app.snyk.io/org/acme-slug",
            "created": "2021-06-01T12:00:00Z"
        }))
        .unwrap();
        let mut data = ResourceData::default();
        set_organization_state(&mut data, &org);
        assert_eq!(data.id(), Some("org-1"));
        assert_eq!(data.get_str("slug"), Some("acme-slug"));
        assert_eq!(data.get_str("created"), Some("2021-06-01T12:00:00+00:00"));
    }
}
