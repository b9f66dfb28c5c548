// ── Organization resource ──
//
// An organization inside the configured group, together with its
// notification settings. Renaming is a replacement; notification changes
// are applied in place with a full-replace PUT.

use strum::IntoEnumIterator;
use tracing::{debug, warn};

use snykform_api::{IssueSeverity, IssueType, SnykClient};

use crate::convert::{
    merge_notifications, notifications_from_state, notifications_to_state,
    set_organization_state,
};
use crate::error::CoreError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

const RESOURCE: &str = "organization";

pub fn schema() -> Schema {
    let new_issues = Schema::new()
        .attribute("enabled", Attribute::bool().required())
        .attribute(
            "severity",
            Attribute::string()
                .default_value("high")
                .one_of(IssueSeverity::iter()),
        )
        .attribute(
            "type",
            Attribute::string()
                .default_value("none")
                .one_of(IssueType::iter()),
        );

    let notifications = Schema::new()
        .attribute("new_issues", Attribute::block(new_issues).required())
        .attribute("project_imports", Attribute::bool().required())
        .attribute("test_limits", Attribute::bool().required())
        .attribute("weekly_report", Attribute::bool().required());

    Schema::new()
        .attribute("name", Attribute::string().required().force_new())
        .attribute("notifications", Attribute::block(notifications).required())
        .attribute("slug", Attribute::string().computed())
        .attribute("url", Attribute::string().computed())
        .attribute("created", Attribute::string().computed())
}

/// Create the organization, then push its notification settings.
///
/// The notifications block is decoded before anything is sent so a
/// malformed declaration never leaves a half-configured organization.
/// If a later step fails the new organization is deleted again and the
/// first error is returned, so nothing is left untracked remotely.
pub async fn create(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let name = data.require_str("name")?.to_owned();
    let settings = notifications_from_state(data.attributes())?;

    let org = client.create_organization(&name).await?;
    debug!(id = %org.id, %name, "organization created");
    data.set_id(org.id.as_str());

    let configured = match client.set_notification_settings(&org.id, &settings).await {
        Ok(_) => read(client, data).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = configured {
        if let Err(cleanup) = client.delete_organization(&org.id).await {
            warn!(
                id = %org.id,
                %name,
                error = %cleanup,
                "could not remove partially created organization"
            );
        }
        data.clear_id();
        return Err(e);
    }
    Ok(())
}

/// Refresh name, read-only fields and notification settings.
///
/// A vanished organization surfaces as a not-found error; the caller
/// decides whether to drop it from state.
pub async fn read(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let id = data.require_id(RESOURCE)?.to_owned();

    let org = client.get_organization(&id).await?;
    set_organization_state(data, &org);

    let remote = client.get_notification_settings(&id).await?;
    let declared = notifications_from_state(data.attributes()).ok();
    let merged = merge_notifications(declared.as_ref(), remote);
    data.set("notifications", notifications_to_state(&merged));
    Ok(())
}

/// Only the notification settings are mutable in place.
pub async fn update(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let id = data.require_id(RESOURCE)?.to_owned();
    let settings = notifications_from_state(data.attributes())?;
    client.set_notification_settings(&id, &settings).await?;
    read(client, data).await
}

pub async fn delete(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let id = data.require_id(RESOURCE)?.to_owned();
    client.delete_organization(&id).await?;
    data.clear_id();
    Ok(())
}
