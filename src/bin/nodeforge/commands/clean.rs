//! `nodeforge clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use nodeforge::ops::clean;
use nodeforge::util::{GlobalContext, Shell};

pub fn execute(args: CleanArgs, shell: Shell) -> Result<()> {
    let ctx = GlobalContext::new(args.path.as_deref(), shell)?;
    let mut project = ctx.open_project()?;

    let log = ctx.log();
    clean(&mut project, &log)
}
