//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod config_cmd;
pub mod integrations;
pub mod orgs;
pub mod util;
pub mod workflow;

use snykform_core::Engine;

use crate::cli::{Command, GlobalOpts, IntegrationsCommand};
use crate::config;
use crate::error::CliError;

/// Dispatch a command to its handler.
///
/// Workflow commands connect on their own since some of them only need
/// local files; lookups always connect first.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Validate(args) => workflow::validate(&args, global),
        Command::Plan(args) => workflow::plan(&args, global).await,
        Command::Apply(args) => workflow::apply(&args, global).await,
        Command::Refresh(args) => workflow::refresh(&args, global).await,
        Command::Destroy(args) => workflow::destroy(&args, global).await,
        Command::Show(args) => workflow::show(&args, global),

        Command::Integrations(args) if matches!(args.command, IntegrationsCommand::Types) => {
            integrations::types(global)
        }
        Command::Orgs(args) => orgs::handle(&connect(global)?, args, global).await,
        Command::Integrations(args) => integrations::handle(&connect(global)?, args, global).await,

        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Ok(()),
    }
}

pub(crate) fn connect(global: &GlobalOpts) -> Result<Engine, CliError> {
    let provider = config::build_provider_config(global)?;
    Ok(Engine::connect(&provider)?)
}
