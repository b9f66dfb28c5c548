// Organization endpoints
//
// There is no GET-by-id endpoint: lookups list every organization in the
// group (`GET /group/{groupId}/orgs`, one page) and scan the result.

use tracing::debug;

use crate::client::SnykClient;
use crate::error::Error;
use crate::models::{CreateOrganizationRequest, GroupOrganizations, Organization};

impl SnykClient {
    /// List every organization in the configured group.
    ///
    /// `GET /group/{groupId}/orgs`
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, Error> {
        let path = format!("group/{}/orgs", self.group_id());
        let group: GroupOrganizations = self.get(&path).await?;
        Ok(group.orgs)
    }

    /// Create an organization in the configured group.
    ///
    /// `POST /org` with `{"name": ..., "groupId": ...}`
    pub async fn create_organization(&self, name: &str) -> Result<Organization, Error> {
        debug!(name, "creating organization");
        self.post(
            "org",
            &CreateOrganizationRequest {
                name,
                group_id: self.group_id(),
            },
        )
        .await
    }

    /// Find an organization by id in the group listing.
    ///
    /// Returns [`Error::Missing`] when the id isn't listed.
    pub async fn get_organization(&self, id: &str) -> Result<Organization, Error> {
        self.list_organizations()
            .await?
            .into_iter()
            .find(|org| org.id == id)
            .ok_or_else(|| Error::Missing {
                kind: "organization",
                key: id.to_owned(),
            })
    }

    /// Whether any organization in the group carries `name`.
    ///
    /// Names aren't unique, so this is only suitable for verifying that a
    /// destroyed organization is gone -- never for resolving identity.
    pub async fn organization_exists_by_name(&self, name: &str) -> Result<bool, Error> {
        Ok(self
            .list_organizations()
            .await?
            .iter()
            .any(|org| org.name == name))
    }

    /// Delete an organization.
    ///
    /// `DELETE /org/{id}`. Deleting an id that is already gone surfaces
    /// the API's 404 as [`Error::NotFound`].
    pub async fn delete_organization(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting organization");
        self.delete(&format!("org/{id}")).await
    }
}
