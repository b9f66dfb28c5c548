// ── Plan computation ──
//
// Pure comparison of declared resources against the applied snapshot.
// No remote calls: run a refresh first if the snapshot may be stale.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display};

use crate::error::CoreError;
use crate::manifest::Manifest;
use crate::resources::ResourceKind;
use crate::schema::Diff;
use crate::snapshot::{Address, Snapshot};
use crate::state::Attributes;

/// Shown in place of an id that only exists once its target is applied.
pub const KNOWN_AFTER_APPLY: &str = "(known after apply)";

const REFERENCE_PREFIX: &str = "organization.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    NoOp,
    Create,
    Update,
    /// Delete, then create (a force-new attribute changed).
    Replace,
    Delete,
}

impl Action {
    pub fn is_change(self) -> bool {
        self != Self::NoOp
    }

    /// Whether applying this action removes the existing remote object.
    pub fn destroys(self) -> bool {
        matches!(self, Self::Replace | Self::Delete)
    }

    /// Whether applying this action results in a remote object.
    pub fn creates(self) -> bool {
        matches!(self, Self::Create | Self::Replace)
    }
}

/// What will happen to one address.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub address: Address,
    pub action: Action,
    /// Declared attributes, references not yet resolved. `None` for deletes.
    pub desired: Option<Attributes>,
    pub diff: Diff,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub changes: Vec<PlannedChange>,
}

/// Per-action counts for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub unchanged: usize,
}

impl Plan {
    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(|c| c.action.is_change())
    }

    pub fn get(&self, address: &Address) -> Option<&PlannedChange> {
        self.changes.iter().find(|c| &c.address == address)
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in &self.changes {
            match change.action {
                Action::NoOp => summary.unchanged += 1,
                Action::Create => summary.create += 1,
                Action::Update => summary.update += 1,
                Action::Replace => summary.replace += 1,
                Action::Delete => summary.delete += 1,
            }
        }
        summary
    }
}

/// Compute the plan that moves `snapshot` to `manifest`.
///
/// Organizations are planned first so integrations referencing
/// `organization.<name>` know whether that organization keeps its id.
pub fn plan(manifest: &Manifest, snapshot: &Snapshot) -> Result<Plan, CoreError> {
    let declared = manifest.resources()?;
    let mut changes: Vec<PlannedChange> = Vec::new();
    // (organization, type) -> first integration address declaring it.
    let mut identities: BTreeMap<(String, String), &Address> = BTreeMap::new();

    for (address, desired) in &declared {
        let schema = address.kind.schema();
        let prior = snapshot.get(address).filter(|data| data.id().is_some());

        let comparable = match address.kind {
            ResourceKind::Organization => desired.clone(),
            ResourceKind::Integration => {
                let mut resolved = desired.clone();
                let (organization, owner) =
                    match resolve_organization(address, desired, &changes, snapshot)? {
                        Resolution::Id(id) => (id.clone(), id),
                        Resolution::Pending => (
                            KNOWN_AFTER_APPLY.to_owned(),
                            attribute_str(desired, "organization").to_owned(),
                        ),
                    };
                let identity = (owner, attribute_str(desired, "type").to_owned());
                if let Some(first) = identities.get(&identity) {
                    return Err(CoreError::validation(
                        address.to_string(),
                        format!(
                            "declares the same organization and type ({}) as {first}",
                            identity.1
                        ),
                    ));
                }
                identities.insert(identity, address);
                resolved.insert("organization".into(), Value::String(organization));
                resolved
            }
        };

        let (action, diff) = match prior {
            None => (Action::Create, schema.diff(&Attributes::new(), &comparable)),
            Some(prior) => {
                let diff = schema.diff(prior.attributes(), &comparable);
                let action = if diff.requires_replacement {
                    Action::Replace
                } else if diff.is_empty() {
                    Action::NoOp
                } else {
                    Action::Update
                };
                (action, diff)
            }
        };

        changes.push(PlannedChange {
            address: address.clone(),
            action,
            desired: Some(desired.clone()),
            diff,
        });
    }

    for (address, data) in snapshot.iter() {
        if declared.contains_key(address) {
            continue;
        }
        changes.push(PlannedChange {
            address: address.clone(),
            action: Action::Delete,
            desired: None,
            diff: address.kind.schema().diff(data.attributes(), &Attributes::new()),
        });
    }

    changes.sort_by(|a, b| a.address.cmp(&b.address));
    Ok(Plan { changes })
}

fn attribute_str<'a>(attributes: &'a Attributes, name: &str) -> &'a str {
    attributes.get(name).and_then(Value::as_str).unwrap_or_default()
}

#[derive(Debug, PartialEq)]
enum Resolution {
    Id(String),
    /// The referenced organization is created during this apply.
    Pending,
}

/// Name of the organization an `organization.<name>` value points at.
pub(crate) fn organization_reference(value: &str) -> Option<&str> {
    value
        .strip_prefix(REFERENCE_PREFIX)
        .filter(|name| !name.is_empty())
}

fn resolve_organization(
    address: &Address,
    desired: &Attributes,
    planned: &[PlannedChange],
    snapshot: &Snapshot,
) -> Result<Resolution, CoreError> {
    let value = attribute_str(desired, "organization");
    let Some(name) = organization_reference(value) else {
        return Ok(Resolution::Id(value.to_owned()));
    };

    let target = Address::organization(name);
    let unresolved = || CoreError::UnresolvedReference {
        address: address.to_string(),
        reference: value.to_owned(),
    };
    let change = planned.iter().find(|c| c.address == target).ok_or_else(unresolved)?;
    if change.action.creates() {
        return Ok(Resolution::Pending);
    }
    snapshot
        .get(&target)
        .and_then(|data| data.id())
        .map(|id| Resolution::Id(id.to_owned()))
        .ok_or_else(unresolved)
}

/// Resolve `organization.<name>` against applied state.
///
/// Used at apply time, once the referenced organization has an id.
pub(crate) fn resolve_for_apply(
    address: &Address,
    desired: &Attributes,
    applied: &BTreeMap<String, String>,
) -> Result<Attributes, CoreError> {
    let mut resolved = desired.clone();
    if address.kind != ResourceKind::Integration {
        return Ok(resolved);
    }
    let value = desired
        .get("organization")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if let Some(name) = organization_reference(value) {
        let id = applied
            .get(name)
            .ok_or_else(|| CoreError::UnresolvedReference {
                address: address.to_string(),
                reference: value.to_owned(),
            })?;
        resolved.insert("organization".into(), Value::String(id.clone()));
    }
    Ok(resolved)
}
