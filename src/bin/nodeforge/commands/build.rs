//! `nodeforge build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use nodeforge::core::platform::HostEnv;
use nodeforge::core::toolchain::RustToolchain;
use nodeforge::ops::{build, BuildOptions};
use nodeforge::util::{GlobalContext, Shell, Status};

pub fn execute(args: BuildArgs, shell: Shell) -> Result<()> {
    let ctx = GlobalContext::new(args.path.as_deref(), shell)?;
    let config = ctx.config();

    let mut project = ctx.open_project()?;

    // Toolchain: CLI > config > whatever rustup picks
    let channel = args.toolchain.or_else(|| config.build.toolchain.clone());
    let toolchain = RustToolchain::detect(channel)?;
    if let Some(channel) = toolchain.channel() {
        ctx.shell()
            .status(Status::Info, format!("using toolchain `{}`", channel));
    }

    let host = HostEnv::detect()?;

    // Release: CLI flag OR config setting
    let release = args.release || config.build.release.unwrap_or(false);

    // Config args first so trailing CLI args can override them
    let mut extra_args = config.build.cargo_args.clone();
    extra_args.extend(args.cargo_args);

    let opts = BuildOptions {
        release,
        arch: args.arch,
        extra_args,
    };

    if let (Some(arch), Some(triple)) = (&opts.arch, &host.triple_override) {
        ctx.shell().warn(format!(
            "ignoring --arch {} because CARGO_BUILD_TARGET={} is set",
            arch, triple
        ));
    }

    let log = ctx.log();
    let result = build(&mut project, &toolchain, &host, &opts, &log)?;

    tracing::debug!(
        "installed `{}` from {}",
        result.target.key(),
        result.target.binary_path().display()
    );

    Ok(())
}
