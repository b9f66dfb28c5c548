// ── Organization data source ──
//
// Read-only lookup of an existing organization by id, for referencing
// organizations that are managed elsewhere.

use snykform_api::SnykClient;

use crate::convert::set_organization_state;
use crate::error::CoreError;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

pub fn schema() -> Schema {
    Schema::new()
        .attribute("id", Attribute::string().required())
        .attribute("name", Attribute::string().computed())
        .attribute("slug", Attribute::string().computed())
        .attribute("url", Attribute::string().computed())
        .attribute("created", Attribute::string().computed())
}

/// Look up organization `id` in the configured group.
pub async fn lookup_organization(client: &SnykClient, id: &str) -> Result<ResourceData, CoreError> {
    let org = client.get_organization(id).await?;
    let mut data = ResourceData::default();
    data.set("id", org.id.as_str());
    set_organization_state(&mut data, &org);
    Ok(data)
}
