//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Plans get their own renderer with per-attribute diffs.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use snykform_core::{Action, Plan, PlanSummary};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are
/// key/value listings rather than `Tabled` rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Key/value detail view, one `key: value` line per pair.
pub fn detail(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact text form of an attribute value.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        Value::Null => "null".into(),
        other => other.to_string(),
    }
}

// ── Plans ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PlanView {
    changes: Vec<ChangeView>,
    summary: PlanSummary,
}

#[derive(Debug, Serialize)]
struct ChangeView {
    address: String,
    action: Action,
    attributes: Vec<AttributeView>,
}

/// One attribute change, sensitive values already masked.
#[derive(Debug, Serialize)]
struct AttributeView {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<Value>,
    forces_replacement: bool,
}

fn plan_view(plan: &Plan) -> PlanView {
    PlanView {
        changes: plan
            .changes
            .iter()
            .filter(|c| c.action.is_change())
            .map(|c| ChangeView {
                address: c.address.to_string(),
                action: c.action,
                attributes: c
                    .diff
                    .changes
                    .iter()
                    .map(|a| AttributeView {
                        path: a.path.clone(),
                        before: a.display_before(),
                        after: a.display_after(),
                        forces_replacement: a.forces_replacement,
                    })
                    .collect(),
            })
            .collect(),
        summary: plan.summary(),
    }
}

/// Render a plan. Sensitive attribute values never appear in any format.
pub fn render_plan(format: &OutputFormat, plan: &Plan, color: bool) -> String {
    let view = plan_view(plan);
    match format {
        OutputFormat::Table => plan_text(&view, color),
        OutputFormat::Json => render_json(&view, false),
        OutputFormat::JsonCompact => render_json(&view, true),
        OutputFormat::Yaml => render_yaml(&view),
        OutputFormat::Plain => view
            .changes
            .iter()
            .map(|c| format!("{} {}", c.action, c.address))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn symbol(action: Action) -> &'static str {
    match action {
        Action::Create => "+",
        Action::Update => "~",
        Action::Replace => "-/+",
        Action::Delete => "-",
        Action::NoOp => " ",
    }
}

fn paint(text: &str, action: Action, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match action {
        Action::Create => text.green().to_string(),
        Action::Update => text.yellow().to_string(),
        Action::Replace => text.magenta().to_string(),
        Action::Delete => text.red().to_string(),
        Action::NoOp => text.to_owned(),
    }
}

fn plan_text(view: &PlanView, color: bool) -> String {
    if view.changes.is_empty() {
        return "No changes. Remote resources match the manifest.".into();
    }

    let mut lines = Vec::new();
    for change in &view.changes {
        let header = format!("{:>3} {}", symbol(change.action), change.address);
        lines.push(paint(&header, change.action, color));
        for attr in &change.attributes {
            let before = attr.before.as_ref().map(value_text);
            let after = attr.after.as_ref().map(value_text);
            let value = match (before, after) {
                (Some(b), Some(a)) => format!("{b} -> {a}"),
                (None, Some(a)) => a,
                (Some(b), None) => format!("{b} -> null"),
                (None, None) => String::new(),
            };
            let note = if attr.forces_replacement && change.action == Action::Replace {
                "  # forces replacement"
            } else {
                ""
            };
            lines.push(format!("      {} = {value}{note}", attr.path));
        }
    }

    let s = &view.summary;
    lines.push(String::new());
    lines.push(format!(
        "Plan: {} to add, {} to change, {} to replace, {} to destroy.",
        s.create, s.update, s.replace, s.delete
    ));
    lines.join("\n")
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: {e}"))
}
