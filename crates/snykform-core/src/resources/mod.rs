// ── Resource reconcilers ──
//
// Create/read/update/delete for each managed resource kind. Every
// operation takes the account client and the resource's `ResourceData`,
// performs its remote calls in order, and leaves `data` reflecting what
// the remote side now holds. Reads that find the object gone return a
// not-found error (see `CoreError::is_not_found`).

pub mod data_source;
pub mod integration;
pub mod organization;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use snykform_api::SnykClient;

use crate::error::CoreError;
use crate::schema::Schema;
use crate::state::ResourceData;

/// Managed resource kinds, in dependency order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Organization,
    Integration,
}

impl ResourceKind {
    pub fn schema(self) -> Schema {
        match self {
            Self::Organization => organization::schema(),
            Self::Integration => integration::schema(),
        }
    }

    pub async fn create(self, client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
        match self {
            Self::Organization => organization::create(client, data).await,
            Self::Integration => integration::create(client, data).await,
        }
    }

    pub async fn read(self, client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
        match self {
            Self::Organization => organization::read(client, data).await,
            Self::Integration => integration::read(client, data).await,
        }
    }

    pub async fn update(self, client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
        match self {
            Self::Organization => organization::update(client, data).await,
            Self::Integration => integration::update(client, data).await,
        }
    }

    pub async fn delete(self, client: &SnykClient, data: &mut ResourceData) -> Result<(), CoreError> {
        match self {
            Self::Organization => organization::delete(client, data).await,
            Self::Integration => integration::delete(client, data).await,
        }
    }
}
