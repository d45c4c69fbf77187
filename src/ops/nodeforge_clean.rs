//! Implementation of `nodeforge clean`.

use anyhow::Result;

use crate::core::project::Project;
use crate::util::fs::{relative_path, remove_dir_all_if_exists};
use crate::util::shell::{Log, Status};

/// Remove every build of the project's native crate.
///
/// Deletes cargo's build tree and the installed addon, then resets the ledger
/// to empty. Running it on an already clean project is a no-op.
pub fn clean(project: &mut Project, log: Log) -> Result<()> {
    let target_dir = project.krate().target_dir();
    let shown = relative_path(project.root(), &target_dir);

    log(Status::Cleaning, &shown.display().to_string());
    remove_dir_all_if_exists(&target_dir)?;

    project.krate().remove_addon()?;
    project.krate_mut().update_ledger(|ledger| ledger.reset())?;

    tracing::debug!("reset ledger at {}", project.krate().ledger_path().display());
    log(Status::Removed, &shown.display().to_string());
    Ok(())
}
