// Organization notification-settings endpoints
//
// A singleton per organization: never created or deleted, only read and
// overwritten whole.

use tracing::debug;

use crate::client::SnykClient;
use crate::error::Error;
use crate::models::NotificationSettings;

impl SnykClient {
    /// `GET /org/{id}/notification-settings`
    pub async fn get_notification_settings(
        &self,
        org_id: &str,
    ) -> Result<NotificationSettings, Error> {
        self.get(&format!("org/{org_id}/notification-settings"))
            .await
    }

    /// Replace all four notification groups.
    ///
    /// `PUT /org/{id}/notification-settings`; returns the settings as stored.
    pub async fn set_notification_settings(
        &self,
        org_id: &str,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, Error> {
        debug!(org_id, "writing notification settings");
        self.put(&format!("org/{org_id}/notification-settings"), settings)
            .await
    }
}
