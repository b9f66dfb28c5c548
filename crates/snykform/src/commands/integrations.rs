//! Integration lookup handlers.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use snykform_api::IntegrationType;
use snykform_core::Engine;

use crate::cli::{GlobalOpts, IntegrationsArgs, IntegrationsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct IntegrationEntry {
    #[serde(rename = "type")]
    integration_type: String,
    id: String,
}

#[derive(Tabled)]
struct IntegrationRow {
    #[tabled(rename = "Type")]
    integration_type: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&IntegrationEntry> for IntegrationRow {
    fn from(e: &IntegrationEntry) -> Self {
        Self {
            integration_type: e.integration_type.clone(),
            id: e.id.clone(),
        }
    }
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    name: String,
}

/// List the integration types that can be declared. Needs no connection.
pub fn types(global: &GlobalOpts) -> Result<(), CliError> {
    let types: Vec<String> = IntegrationType::iter().map(|t| t.to_string()).collect();
    let out = output::render_list(
        &global.output,
        &types,
        |t| TypeRow { name: t.clone() },
        |t| t.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    engine: &Engine,
    args: IntegrationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        IntegrationsCommand::List { org } => {
            let listing = engine.list_integrations(&org).await?;
            let entries: Vec<IntegrationEntry> = listing
                .iter()
                .map(|(t, id)| IntegrationEntry {
                    integration_type: t.to_owned(),
                    id: id.to_owned(),
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &entries,
                |e| IntegrationRow::from(e),
                |e| format!("{}\t{}", e.integration_type, e.id),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        IntegrationsCommand::Types => types(global),
    }
}
