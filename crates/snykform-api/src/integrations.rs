// Integration endpoints
//
// Integrations are identified by (organization, type). The API only
// exposes a listing from type to id, so every id resolution goes through
// `list_integrations`.

use tracing::debug;

use crate::client::SnykClient;
use crate::error::Error;
use crate::models::{
    CreatedIntegration, IntegrationCredentials, IntegrationListing, IntegrationRequest,
    IntegrationType,
};

impl SnykClient {
    /// `GET /org/{orgId}/integrations`
    pub async fn list_integrations(&self, org_id: &str) -> Result<IntegrationListing, Error> {
        self.get(&format!("org/{org_id}/integrations")).await
    }

    /// Whether an integration of `integration_type` is registered.
    pub async fn integration_exists(
        &self,
        org_id: &str,
        integration_type: IntegrationType,
    ) -> Result<bool, Error> {
        Ok(self
            .list_integrations(org_id)
            .await?
            .contains(integration_type))
    }

    /// Resolve the id of the `integration_type` integration.
    pub async fn integration_id(
        &self,
        org_id: &str,
        integration_type: IntegrationType,
    ) -> Result<String, Error> {
        let listing = self.list_integrations(org_id).await?;
        listing
            .id_of(integration_type)
            .map(str::to_owned)
            .ok_or_else(|| Error::Missing {
                kind: "integration",
                key: format!("{org_id}/{integration_type}"),
            })
    }

    /// Register a new integration. Returns the server-assigned id.
    ///
    /// `POST /org/{orgId}/integrations` with `{"type": ..., "credentials": {...}}`
    pub async fn create_integration(
        &self,
        org_id: &str,
        integration_type: IntegrationType,
        credentials: &IntegrationCredentials,
    ) -> Result<String, Error> {
        debug!(org_id, %integration_type, "creating integration");
        let created: CreatedIntegration = self
            .post(
                &format!("org/{org_id}/integrations"),
                &IntegrationRequest {
                    integration_type,
                    credentials,
                },
            )
            .await?;
        Ok(created.id)
    }

    /// Replace type and credentials of an existing integration.
    ///
    /// `PUT /org/{orgId}/integrations/{id}`. The response body is ignored;
    /// the id passed in is returned.
    pub async fn update_integration(
        &self,
        org_id: &str,
        id: &str,
        integration_type: IntegrationType,
        credentials: &IntegrationCredentials,
    ) -> Result<String, Error> {
        debug!(org_id, id, %integration_type, "updating integration");
        self.put_no_response(
            &format!("org/{org_id}/integrations/{id}"),
            &IntegrationRequest {
                integration_type,
                credentials,
            },
        )
        .await?;
        Ok(id.to_owned())
    }

    /// Revoke the integration's authentication. The integration record
    /// itself stays listed.
    ///
    /// `DELETE /org/{orgId}/integrations/{id}/authentication`
    pub async fn delete_integration(&self, org_id: &str, id: &str) -> Result<(), Error> {
        debug!(org_id, id, "revoking integration authentication");
        self.delete(&format!("org/{org_id}/integrations/{id}/authentication"))
            .await
    }
}
