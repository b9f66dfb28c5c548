//! Manifest workflow handlers: validate, plan, apply, refresh, destroy, show.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tabled::Tabled;

use snykform_core::{
    Address, ApplyReport, Attributes, DestroyReport, Engine, Manifest, Plan, RefreshReport,
    ResourceKind, Snapshot,
};

use crate::cli::{GlobalOpts, ManifestArgs, PlanArgs, StateArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn state_path(args: &StateArgs) -> PathBuf {
    config::state_path(args.state.as_ref())
}

/// Refresh `snapshot` and save it if anything was read back.
async fn refresh_and_save(
    engine: &Engine,
    snapshot: &mut Snapshot,
    path: &Path,
) -> Result<RefreshReport, CliError> {
    let report = engine.refresh(snapshot).await?;
    if !report.refreshed.is_empty() || !report.removed.is_empty() {
        snapshot.save(path)?;
    }
    for address in &report.removed {
        eprintln!("  {address} no longer exists remotely and was removed from state");
    }
    Ok(report)
}

// ── Validate ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ValidateSummary {
    file: String,
    organizations: usize,
    integrations: usize,
}

pub fn validate(args: &ManifestArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let manifest = Manifest::load(&args.file)?;
    // Planning against empty state checks schemas and references.
    snykform_core::plan(&manifest, &Snapshot::default())?;

    let summary = ValidateSummary {
        file: args.file.display().to_string(),
        organizations: manifest.count(ResourceKind::Organization),
        integrations: manifest.count(ResourceKind::Integration),
    };
    let out = output::render_single(
        &global.output,
        &summary,
        |s| {
            format!(
                "✓ {} is valid ({} organizations, {} integrations)",
                s.file, s.organizations, s.integrations
            )
        },
        |s| s.file.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Plan / Apply ─────────────────────────────────────────────────────

/// Load inputs, optionally refresh, and compute the plan.
async fn prepare(
    args: &PlanArgs,
    engine: Option<&Engine>,
) -> Result<(Snapshot, PathBuf, Plan), CliError> {
    let manifest = Manifest::load(&args.manifest.file)?;
    let path = state_path(&args.state);
    let mut snapshot = Snapshot::load(&path)?;

    if let Some(engine) = engine {
        refresh_and_save(engine, &mut snapshot, &path).await?;
    }

    let plan = snykform_core::plan(&manifest, &snapshot)?;
    Ok((snapshot, path, plan))
}

pub async fn plan(args: &PlanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Without a refresh, planning needs nothing but local files.
    let engine = if args.no_refresh {
        None
    } else {
        Some(super::connect(global)?)
    };
    let (_, _, plan) = prepare(args, engine.as_ref()).await?;

    let out = output::render_plan(&global.output, &plan, output::should_color(&global.color));
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn apply(args: &PlanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let engine = super::connect(global)?;
    let refresh = if args.no_refresh {
        None
    } else {
        Some(&engine)
    };
    let (mut snapshot, path, plan) = prepare(args, refresh).await?;

    let rendered = output::render_plan(&global.output, &plan, output::should_color(&global.color));
    output::print_output(&rendered, global.quiet);
    if !plan.has_changes() {
        return Ok(());
    }

    if !util::confirm("Apply these changes?", "apply", global.yes)? {
        eprintln!("Apply cancelled.");
        return Ok(());
    }

    let report = engine.apply(&plan, &mut snapshot, util::saver(&path)).await?;
    let out = output::render_single(&global.output, &report, apply_detail, |r| {
        r.total().to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

fn addresses(list: &[Address]) -> String {
    if list.is_empty() {
        return "-".into();
    }
    list.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn apply_detail(report: &ApplyReport) -> String {
    format!(
        "Apply complete: {} added, {} changed, {} replaced, {} destroyed.",
        report.created.len(),
        report.updated.len(),
        report.replaced.len(),
        report.deleted.len()
    )
}

// ── Refresh ──────────────────────────────────────────────────────────

pub async fn refresh(args: &StateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = state_path(args);
    let mut snapshot = Snapshot::load(&path)?;
    if snapshot.is_empty() {
        eprintln!("State is empty; nothing to refresh.");
        return Ok(());
    }

    let engine = super::connect(global)?;
    let report = refresh_and_save(&engine, &mut snapshot, &path).await?;
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            output::detail(&[
                ("Refreshed", addresses(&r.refreshed)),
                ("Removed", addresses(&r.removed)),
            ])
        },
        |r| r.refreshed.len().to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Destroy ──────────────────────────────────────────────────────────

pub async fn destroy(args: &StateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = state_path(args);
    let mut snapshot = Snapshot::load(&path)?;
    if snapshot.is_empty() {
        eprintln!("State is empty; nothing to destroy.");
        return Ok(());
    }

    if !global.quiet {
        for address in snapshot.addresses() {
            eprintln!("  - {address}");
        }
    }
    let prompt = format!(
        "Destroy {} resources? Organizations and their projects will be deleted.",
        snapshot.len()
    );
    if !util::confirm(&prompt, "destroy", global.yes)? {
        eprintln!("Destroy cancelled.");
        return Ok(());
    }

    let engine = super::connect(global)?;
    let report = engine.destroy(&mut snapshot, util::saver(&path)).await?;
    for name in &report.lingering {
        eprintln!("warning: organization '{name}' is still listed in the group");
    }
    let out = output::render_single(&global.output, &report, destroy_detail, |r| {
        r.destroyed.len().to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

fn destroy_detail(report: &DestroyReport) -> String {
    format!("Destroy complete: {} destroyed.", report.destroyed.len())
}

// ── Show ─────────────────────────────────────────────────────────────

/// One state entry with sensitive values masked.
#[derive(Debug, Serialize)]
struct StateEntry {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    attributes: Attributes,
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name/Type")]
    label: String,
}

impl From<&StateEntry> for StateRow {
    fn from(e: &StateEntry) -> Self {
        let label = e
            .attributes
            .get("name")
            .or_else(|| e.attributes.get("type"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_owned();
        Self {
            address: e.address.clone(),
            id: e.id.clone().unwrap_or_default(),
            label,
        }
    }
}

fn state_entries(snapshot: &Snapshot) -> Vec<StateEntry> {
    snapshot
        .iter()
        .map(|(address, data)| StateEntry {
            address: address.to_string(),
            id: data.id().map(str::to_owned),
            attributes: address.kind.schema().redact(data.attributes()),
        })
        .collect()
}

pub fn show(args: &StateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = Snapshot::load(&state_path(args))?;
    let entries = state_entries(&snapshot);
    let out = output::render_list(&global.output, &entries, |e| StateRow::from(e), |e| {
        e.address.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
