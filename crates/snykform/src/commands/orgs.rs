//! Organization lookup handlers.

use tabled::Tabled;

use snykform_api::Organization;
use snykform_core::{Engine, ResourceData};

use crate::cli::{GlobalOpts, OrgsArgs, OrgsCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OrgRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Organization> for OrgRow {
    fn from(o: &Organization) -> Self {
        Self {
            id: o.id.clone(),
            name: o.name.clone(),
            slug: o.slug.clone(),
            created: o
                .created
                .map(|c| c.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn org_detail(data: &ResourceData) -> String {
    let field = |name: &str| data.get_str(name).unwrap_or_default().to_owned();
    output::detail(&[
        ("ID", data.id().unwrap_or_default().to_owned()),
        ("Name", field("name")),
        ("Slug", field("slug")),
        ("URL", field("url")),
        ("Created", field("created")),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(engine: &Engine, args: OrgsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        OrgsCommand::List => {
            let orgs = engine.list_organizations().await?;
            let out = output::render_list(
                &global.output,
                &orgs,
                |o| OrgRow::from(o),
                |o| o.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OrgsCommand::Get { id } => {
            let data = engine.lookup_organization(&id).await?;
            let out = output::render_single(&global.output, &data, org_detail, |d| {
                d.id().unwrap_or_default().to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
