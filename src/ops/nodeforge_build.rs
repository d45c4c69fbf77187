//! Implementation of `nodeforge build`.
//!
//! The protocol, per invocation:
//!
//! 1. compute the current [`BuildSettings`];
//! 2. if the target's ledger record is missing or does not match, clean the
//!    target so cargo starts from scratch (cargo's own cache cannot see a
//!    host runtime or `npm_config_*` change);
//! 3. run cargo; a failed compile aborts without touching the addon;
//! 4. copy the fresh binary into the addon slot.
//!
//! The ledger is marked active in step 3, before the copy in step 4. An
//! interruption between the two leaves the ledger claiming a binary the addon
//! slot does not hold yet; the next build repairs it because it always
//! re-copies.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::platform::HostEnv;
use crate::core::project::Project;
use crate::core::settings::BuildSettings;
use crate::core::target::{Profile, Target};
use crate::core::toolchain::Toolchain;
use crate::util::fs::relative_path;
use crate::util::shell::{Log, Status};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build in release mode
    pub release: bool,

    /// Architecture to build for (defaults to `npm_config_arch` or the host)
    pub arch: Option<String>,

    /// Arguments passed through to `cargo build`
    pub extra_args: Vec<String>,
}

/// What a successful build did.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub target: Target,
    /// Whether the target was cleaned first because its settings drifted.
    pub cleaned: bool,
    /// Path of the installed addon.
    pub addon: PathBuf,
}

/// Build the project's native crate and install it as the addon.
pub fn build(
    project: &mut Project,
    toolchain: &dyn Toolchain,
    host: &HostEnv,
    opts: &BuildOptions,
    log: Log,
) -> Result<BuildResult> {
    let settings = BuildSettings::current(toolchain)?;
    build_with_settings(project, toolchain, host, settings, opts, log)
}

/// [`build`] with already computed settings.
pub fn build_with_settings(
    project: &mut Project,
    toolchain: &dyn Toolchain,
    host: &HostEnv,
    settings: BuildSettings,
    opts: &BuildOptions,
    log: Log,
) -> Result<BuildResult> {
    let host = match &opts.arch {
        Some(arch) => host.clone().with_arch(arch.as_str()),
        None => host.clone(),
    };
    let target = project.target(&host, Profile::from_release(opts.release))?;

    let cleaned = !target.in_state(project.krate().ledger(), &settings);
    if cleaned {
        if project.krate().ledger().lookup(target.key()).is_some() {
            tracing::info!(
                "build settings for `{}` changed, rebuilding from scratch",
                target.key()
            );
            log(
                Status::Stale,
                &format!("`{}` was built with different settings", target.key()),
            );
        } else {
            tracing::debug!("no ledger record for `{}`", target.key());
        }
        target.clean(project.krate_mut())?;
    }

    log(
        Status::Compiling,
        &format!("{} ({})", project.krate().name(), describe(&target)),
    );

    target.build(project.krate_mut(), toolchain, settings, &opts.extra_args)?;

    let krate = project.krate();
    krate.finish(target.binary_path())?;

    let addon = krate.addon_path().to_path_buf();
    log(
        Status::Finished,
        &relative_path(project.root(), &addon).display().to_string(),
    );

    Ok(BuildResult {
        target,
        cleaned,
        addon,
    })
}

fn describe(target: &Target) -> String {
    if target.triple().is_empty() {
        target.profile().to_string()
    } else {
        format!("{}, {}", target.profile(), target.triple())
    }
}
