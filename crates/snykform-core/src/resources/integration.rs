// ── Integration resource ──
//
// A credentialed connection of one type within an organization. At most
// one integration of each type exists per organization, so the listing
// (type -> id) is the lookup index and `(organization, type)` is the
// identity. Credentials are write-only: nothing here ever reads them back.

use strum::IntoEnumIterator;
use tracing::{debug, info};

use snykform_api::{IntegrationType, SnykClient};

use crate::convert::{credentials_from_state, integration_type_from_state};
use crate::error::CoreError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

pub fn schema() -> Schema {
    let credentials = Schema::new()
        .attribute("username", Attribute::string())
        .attribute("password", Attribute::string().sensitive())
        .attribute("registry_base", Attribute::string())
        .attribute("url", Attribute::string())
        .attribute("token", Attribute::string().sensitive())
        .attribute("region", Attribute::string())
        .attribute("role_arn", Attribute::string());

    Schema::new()
        .attribute("organization", Attribute::string().required().force_new())
        .attribute(
            "type",
            Attribute::string()
                .required()
                .force_new()
                .one_of(IntegrationType::iter()),
        )
        .attribute("credentials", Attribute::block(credentials).required())
}

fn identity(data: &ResourceData) -> Result<(String, IntegrationType), CoreError> {
    let org_id = data.require_str("organization")?.to_owned();
    let integration_type = integration_type_from_state(data.attributes())?;
    Ok((org_id, integration_type))
}

/// Declare the integration.
///
/// The listing is fetched once. A type that is already listed (for example
/// one configured outside this tool, or revoked and re-declared) is
/// reactivated by updating its credentials rather than failing.
pub async fn create(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let (org_id, integration_type) = identity(data)?;
    let credentials = credentials_from_state(data.attributes())?;

    let listing = client.list_integrations(&org_id).await?;
    let id = match listing.id_of(integration_type) {
        Some(existing) => {
            info!(org = %org_id, %integration_type, id = existing, "integration already listed, updating it");
            client
                .update_integration(&org_id, existing, integration_type, &credentials)
                .await?
        }
        None => {
            client
                .create_integration(&org_id, integration_type, &credentials)
                .await?
        }
    };
    debug!(org = %org_id, %integration_type, %id, "integration declared");
    data.set_id(id);
    read(client, data).await
}

/// Confirm the type is still listed and refresh its id.
///
/// Declared credentials stay as they are; the API never returns them.
pub async fn read(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let (org_id, integration_type) = identity(data)?;
    let id = client.integration_id(&org_id, integration_type).await?;
    data.set_id(id);
    Ok(())
}

pub async fn update(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let (org_id, integration_type) = identity(data)?;
    let credentials = credentials_from_state(data.attributes())?;

    let id = client.integration_id(&org_id, integration_type).await?;
    let id = client
        .update_integration(&org_id, &id, integration_type, &credentials)
        .await?;
    data.set_id(id);
    read(client, data).await
}

/// Revoke the integration's authentication.
pub async fn delete(client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
    let (org_id, integration_type) = identity(data)?;
    let id = client.integration_id(&org_id, integration_type).await?;
    client.delete_integration(&org_id, &id).await?;
    data.clear_id();
    Ok(())
}
