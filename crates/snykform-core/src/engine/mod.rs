// ── Reconciliation engine ──
//
// Drives the resource reconcilers from a plan and keeps the snapshot in
// step with the remote side. Every successful step is persisted through
// the caller's hook so an interrupted run can be resumed by planning again.

pub mod plan;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use snykform_api::{IntegrationListing, Organization, SnykClient};

use crate::config::ProviderConfig;
use crate::error::CoreError;
use crate::resources::{ResourceKind, data_source};
use crate::snapshot::{Address, Snapshot};
use crate::state::ResourceData;

pub use plan::{Action, KNOWN_AFTER_APPLY, Plan, PlanSummary, PlannedChange, plan};

// ── Reports ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub created: Vec<Address>,
    pub updated: Vec<Address>,
    pub replaced: Vec<Address>,
    pub deleted: Vec<Address>,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.replaced.len() + self.deleted.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<Address>,
    /// Entries whose remote object no longer exists.
    pub removed: Vec<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DestroyReport {
    pub destroyed: Vec<Address>,
    /// Organization names still listed in the group after deletion.
    pub lingering: Vec<String>,
}

// ── Engine ───────────────────────────────────────────────────────

/// Applies plans, refreshes and destroys against one Snyk group.
#[derive(Debug, Clone)]
pub struct Engine {
    client: SnykClient,
}

impl Engine {
    pub fn new(client: SnykClient) -> Self {
        Self { client }
    }

    pub fn connect(config: &ProviderConfig) -> Result<Self, CoreError> {
        Ok(Self::new(config.connect()?))
    }

    pub fn client(&self) -> &SnykClient {
        &self.client
    }

    // ── Apply ────────────────────────────────────────────────────

    /// Execute `plan` against the remote side.
    ///
    /// Order: integration removals, organization removals, organization
    /// creates and updates, then integration creates and updates. The first
    /// error aborts the run; steps completed before it are already saved.
    pub async fn apply<F>(
        &self,
        plan: &Plan,
        snapshot: &mut Snapshot,
        mut persist: F,
    ) -> Result<ApplyReport, CoreError>
    where
        F: FnMut(&mut Snapshot) -> Result<(), CoreError>,
    {
        let mut report = ApplyReport::default();
        let of_kind = |kind: ResourceKind| {
            plan.changes
                .iter()
                .filter(move |c| c.address.kind == kind && c.action.is_change())
        };

        for kind in [ResourceKind::Integration, ResourceKind::Organization] {
            for change in of_kind(kind).filter(|c| c.action.destroys()) {
                self.remove(&change.address, snapshot).await?;
                persist(snapshot)?;
                if change.action == Action::Delete {
                    report.deleted.push(change.address.clone());
                }
            }
        }

        for kind in [ResourceKind::Organization, ResourceKind::Integration] {
            for change in of_kind(kind).filter(|c| !matches!(c.action, Action::Delete)) {
                let Some(desired) = &change.desired else {
                    continue;
                };
                let desired =
                    plan::resolve_for_apply(&change.address, desired, &applied_org_ids(snapshot))?;

                match change.action {
                    Action::Create | Action::Replace => {
                        let mut data = ResourceData::new(desired);
                        kind.create(&self.client, &mut data).await?;
                        info!(address = %change.address, id = data.id().unwrap_or_default(), "created");
                        snapshot.insert(change.address.clone(), data);
                        if change.action == Action::Create {
                            report.created.push(change.address.clone());
                        } else {
                            report.replaced.push(change.address.clone());
                        }
                    }
                    Action::Update => {
                        let prior = snapshot.get(&change.address).ok_or_else(|| {
                            CoreError::MissingIdentity {
                                resource: change.address.to_string(),
                            }
                        })?;
                        let id = prior.require_id(&change.address.to_string())?.to_owned();
                        let mut data = ResourceData::with_id(id, desired);
                        kind.update(&self.client, &mut data).await?;
                        info!(address = %change.address, "updated");
                        snapshot.insert(change.address.clone(), data);
                        report.updated.push(change.address.clone());
                    }
                    Action::NoOp | Action::Delete => continue,
                }
                persist(snapshot)?;
            }
        }

        Ok(report)
    }

    /// Delete the object recorded at `address` and drop it from `snapshot`.
    ///
    /// An object that is already gone counts as deleted. Any other failure
    /// leaves the entry (and its id) in place.
    async fn remove(&self, address: &Address, snapshot: &mut Snapshot) -> Result<(), CoreError> {
        let Some(mut data) = snapshot.get(address).cloned() else {
            return Ok(());
        };
        match address.kind.delete(&self.client, &mut data).await {
            Ok(()) => info!(%address, "deleted"),
            Err(e) if e.is_not_found() => warn!(%address, "already gone on the remote side"),
            Err(e) => return Err(e),
        }
        snapshot.remove(address);
        Ok(())
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Re-read every applied resource. Entries whose remote object has
    /// disappeared are dropped so the next plan recreates them.
    pub async fn refresh(&self, snapshot: &mut Snapshot) -> Result<RefreshReport, CoreError> {
        let mut report = RefreshReport::default();
        for address in snapshot.addresses() {
            let Some(mut data) = snapshot.get(&address).cloned() else {
                continue;
            };
            match address.kind.read(&self.client, &mut data).await {
                Ok(()) => {
                    debug!(%address, "refreshed");
                    snapshot.insert(address.clone(), data);
                    report.refreshed.push(address);
                }
                Err(e) if e.is_not_found() => {
                    warn!(%address, "no longer exists remotely, removing from state");
                    snapshot.remove(&address);
                    report.removed.push(address);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    // ── Destroy ──────────────────────────────────────────────────

    /// Delete everything in `snapshot`, integrations first, then check
    /// that each destroyed organization is no longer listed.
    pub async fn destroy<F>(
        &self,
        snapshot: &mut Snapshot,
        mut persist: F,
    ) -> Result<DestroyReport, CoreError>
    where
        F: FnMut(&mut Snapshot) -> Result<(), CoreError>,
    {
        let mut report = DestroyReport::default();
        let mut org_names = Vec::new();

        for address in snapshot.addresses().into_iter().rev() {
            if address.kind == ResourceKind::Organization {
                if let Some(name) = snapshot.get(&address).and_then(|d| d.get_str("name")) {
                    org_names.push(name.to_owned());
                }
            }
            self.remove(&address, snapshot).await?;
            persist(snapshot)?;
            report.destroyed.push(address);
        }

        for name in org_names {
            if self.client.organization_exists_by_name(&name).await? {
                warn!(%name, "organization still listed after delete");
                report.lingering.push(name);
            }
        }
        Ok(report)
    }

    // ── Lookups ──────────────────────────────────────────────────

    /// Read-only lookup of any organization in the group by id.
    pub async fn lookup_organization(&self, id: &str) -> Result<ResourceData, CoreError> {
        data_source::lookup_organization(&self.client, id).await
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, CoreError> {
        Ok(self.client.list_organizations().await?)
    }

    pub async fn list_integrations(&self, org_id: &str) -> Result<IntegrationListing, CoreError> {
        Ok(self.client.list_integrations(org_id).await?)
    }
}

/// Applied organization ids keyed by resource name.
fn applied_org_ids(snapshot: &Snapshot) -> BTreeMap<String, String> {
    snapshot
        .iter()
        .filter(|(address, _)| address.kind == ResourceKind::Organization)
        .filter_map(|(address, data)| data.id().map(|id| (address.name.clone(), id.to_owned())))
        .collect()
}
