//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use snykform_core::{CoreError, Snapshot};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` becomes mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Persist hook for the engine: save the snapshot after every step.
pub fn saver(path: &Path) -> impl FnMut(&mut Snapshot) -> Result<(), CoreError> + '_ {
    move |snapshot| snapshot.save(path)
}
