//! The Rust toolchain used to compile native addons.
//!
//! Orchestration talks to the compiler only through the [`Toolchain`] trait,
//! so tests can substitute a scripted implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::BuildError;
use crate::util::process::{find_executable, stdout_first_line, ProcessBuilder};

/// Exit information of a `cargo build` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileStatus {
    pub success: bool,
    pub code: Option<i32>,
}

impl CompileStatus {
    pub fn from_exit(status: std::process::ExitStatus) -> Self {
        CompileStatus {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// A compiler capable of building a cdylib crate.
pub trait Toolchain {
    /// Full version line reported by `rustc --version`.
    fn rustc_version(&self) -> Result<String>;

    /// Run `cargo build <args>` in `crate_root` with inherited stdio and
    /// `env` added to the inherited environment.
    fn cargo_build(
        &self,
        crate_root: &Path,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CompileStatus>;
}

/// `cargo` and `rustc` found on PATH, optionally pinned to a rustup channel.
#[derive(Debug, Clone)]
pub struct RustToolchain {
    cargo: PathBuf,
    rustc: PathBuf,
    channel: Option<String>,
}

impl RustToolchain {
    /// Locate `cargo` and `rustc`.
    ///
    /// `channel` is a rustup toolchain name such as `nightly` or `1.80.0`;
    /// it is passed as `+channel` to both tools.
    pub fn detect(channel: Option<String>) -> Result<Self> {
        let cargo = find_executable("cargo").ok_or_else(|| BuildError::ToolchainNotFound {
            program: "cargo".to_string(),
        })?;
        let rustc = find_executable("rustc").ok_or_else(|| BuildError::ToolchainNotFound {
            program: "rustc".to_string(),
        })?;

        tracing::debug!(
            "using cargo={}, rustc={}, channel={:?}",
            cargo.display(),
            rustc.display(),
            channel
        );

        Ok(RustToolchain {
            cargo,
            rustc,
            channel,
        })
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    fn command(&self, program: &Path) -> ProcessBuilder {
        let pb = ProcessBuilder::new(program);
        match &self.channel {
            Some(channel) => pb.arg(format!("+{}", channel)),
            None => pb,
        }
    }
}

impl Toolchain for RustToolchain {
    fn rustc_version(&self) -> Result<String> {
        let pb = self.command(&self.rustc).arg("--version");
        let output = pb.output().map_err(|e| BuildError::Toolchain {
            command: pb.to_string(),
            message: format!("{:#}", e),
        })?;

        if !output.status.success() {
            return Err(BuildError::Toolchain {
                command: pb.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let line = stdout_first_line(&output).unwrap_or_default();
        parse_rustc_version(&line).ok_or_else(|| BuildError::Toolchain {
            command: pb.to_string(),
            message: format!("unrecognized version output `{}`", line),
        })?;

        Ok(line)
    }

    fn cargo_build(
        &self,
        crate_root: &Path,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CompileStatus> {
        let pb = self
            .command(&self.cargo)
            .arg("build")
            .args(args)
            .envs(env.iter().cloned())
            .cwd(crate_root);
        tracing::debug!("running `{}` in {}", pb, crate_root.display());

        let status = pb.run().map_err(|e| BuildError::Toolchain {
            command: pb.to_string(),
            message: format!("{:#}", e),
        })?;

        Ok(CompileStatus::from_exit(status))
    }
}

/// Extract the semantic version from a `rustc --version` line,
/// e.g. `rustc 1.80.0 (051478957 2024-07-21)`.
pub fn parse_rustc_version(line: &str) -> Option<semver::Version> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "rustc" {
        return None;
    }
    semver::Version::parse(parts.next()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rustc_version() {
        let v = parse_rustc_version("rustc 1.80.0 (051478957 2024-07-21)").unwrap();
        assert_eq!(v, semver::Version::new(1, 80, 0));

        let nightly = parse_rustc_version("rustc 1.82.0-nightly (2c93fabd9 2024-08-15)").unwrap();
        assert_eq!(nightly.pre.as_str(), "nightly");
    }

    #[test]
    fn test_parse_rustc_version_rejects_garbage() {
        assert!(parse_rustc_version("").is_none());
        assert!(parse_rustc_version("cargo 1.80.0").is_none());
        assert!(parse_rustc_version("rustc unknown").is_none());
    }

    #[test]
    fn test_channel_is_passed_first() {
        let toolchain = RustToolchain {
            cargo: PathBuf::from("cargo"),
            rustc: PathBuf::from("rustc"),
            channel: Some("nightly".to_string()),
        };
        let pb = toolchain.command(Path::new("cargo")).arg("build");
        assert_eq!(pb.to_string(), "cargo +nightly build");
    }
}
