//! Build targets: a (triple, profile) pair and where its binary lands.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::artifacts::Artifacts;
use crate::core::errors::BuildError;
use crate::core::native_crate::NativeCrate;
use crate::core::platform::HostEnv;
use crate::core::settings::BuildSettings;
use crate::core::toolchain::Toolchain;
use crate::util::fs::remove_dir_all_if_exists;

/// Variable through which the addon crate reads the host runtime's module
/// ABI at compile time.
pub const NODE_ABI_VAR: &str = "NEON_NODE_ABI";

/// Cargo build profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Debug,
    Release,
}

impl Profile {
    pub fn from_release(release: bool) -> Self {
        if release {
            Profile::Release
        } else {
            Profile::Debug
        }
    }

    /// Directory name cargo uses for this profile.
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "debug" => Some(Profile::Debug),
            "release" => Some(Profile::Release),
            _ => None,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `key` has the shape [`Target::key`] produces: a profile name,
/// optionally preceded by a triple and a slash.
pub fn is_target_key(key: &str) -> bool {
    let (triple, profile) = match key.split_once('/') {
        Some((triple, profile)) => (Some(triple), profile),
        None => (None, key),
    };

    let triple_ok = triple.map_or(true, |t| {
        !t.is_empty()
            && t.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    });

    triple_ok && Profile::from_dir_name(profile).is_some()
}

/// One buildable configuration of a native crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    triple: String,
    profile: Profile,
    key: String,
    output_dir: PathBuf,
    binary_path: PathBuf,
    env: Vec<(String, String)>,
}

impl Target {
    /// Resolve the target for `profile` on `host`.
    pub fn new(krate: &NativeCrate, host: &HostEnv, profile: Profile) -> Result<Self, BuildError> {
        let triple = host.resolve_triple()?;

        let key = if triple.is_empty() {
            profile.as_str().to_string()
        } else {
            format!("{}/{}", triple, profile)
        };

        let mut output_dir = krate.target_dir();
        if !triple.is_empty() {
            output_dir.push(&triple);
        }
        output_dir.push(profile.as_str());

        let binary_path = output_dir.join(host.platform.dylib_name(krate.name()));

        let env = host
            .node_abi
            .iter()
            .map(|abi| (NODE_ABI_VAR.to_string(), abi.clone()))
            .collect();

        Ok(Target {
            triple,
            profile,
            key,
            output_dir,
            binary_path,
            env,
        })
    }

    /// Target triple, empty for a native build.
    pub fn triple(&self) -> &str {
        &self.triple
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Ledger key: `"<triple>/<profile>"`, or `"<profile>"` for native builds.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where cargo leaves the compiled cdylib.
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Variables added to cargo's environment for this target.
    pub fn cargo_env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Whether the last build of this target used settings matching `current`.
    pub fn in_state(&self, ledger: &Artifacts, current: &BuildSettings) -> bool {
        match ledger.lookup(&self.key) {
            Some(recorded) => recorded.matches(current),
            None => false,
        }
    }

    /// Throw away this target's build output and ledger record.
    pub fn clean(&self, krate: &mut NativeCrate) -> Result<()> {
        remove_dir_all_if_exists(&self.output_dir)?;

        if krate.ledger().have_activated(&self.key) {
            krate.remove_addon()?;
        }

        krate.update_ledger(|ledger| ledger.delete(&self.key))
    }

    /// Arguments following `cargo build`.
    pub fn cargo_args(&self, extra_args: &[String]) -> Vec<String> {
        let mut args = Vec::new();
        if self.profile == Profile::Release {
            args.push("--release".to_string());
        }
        if !self.triple.is_empty() {
            args.push("--target".to_string());
            args.push(self.triple.clone());
        }
        args.extend(extra_args.iter().cloned());
        args
    }

    /// Compile this target.
    ///
    /// On success the ledger records `settings` for this target, marks it
    /// active and is saved before this returns, so it reflects the compile
    /// even if installing the addon afterwards fails. On failure the ledger
    /// is left alone.
    pub fn build(
        &self,
        krate: &mut NativeCrate,
        toolchain: &dyn Toolchain,
        settings: BuildSettings,
        extra_args: &[String],
    ) -> Result<()> {
        let args = self.cargo_args(extra_args);
        let status = toolchain.cargo_build(krate.root(), &args, &self.env)?;

        if !status.success {
            return Err(BuildError::BuildFailed { code: status.code }.into());
        }

        krate.update_ledger(|ledger| ledger.activate(&self.key, settings))
    }
}
