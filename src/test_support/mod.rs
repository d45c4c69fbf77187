//! Test utilities and mocks for nodeforge unit tests.
//!
//! The central piece is [`MockToolchain`], a scripted stand-in for
//! `cargo`/`rustc` that records every build it is asked to run and, on
//! success, drops a fake cdylib where cargo would have put one.
//!
//! # Example
//!
//! ```rust,ignore
//! use nodeforge::test_support::{fixtures::create_project, MockToolchain};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let root = create_project(tmp.path(), "addon");
//!
//!     let toolchain = MockToolchain::new().producing_file("libaddon.so");
//!     // Run ops::build against `root` with `&toolchain`...
//!     assert_eq!(toolchain.builds().len(), 1);
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::BuildError;
use crate::core::toolchain::{CompileStatus, Toolchain};

/// One recorded `cargo build` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBuild {
    pub crate_root: PathBuf,
    pub args: Vec<String>,
    /// Variables added to cargo's environment.
    pub env: Vec<(String, String)>,
    /// Whether each observed path existed when the build started.
    pub observed: Vec<(PathBuf, bool)>,
}

/// Scripted toolchain.
#[derive(Debug)]
pub struct MockToolchain {
    version: String,
    installed: bool,
    exit_code: i32,
    output_file: Option<String>,
    observe: Vec<PathBuf>,
    builds: RefCell<Vec<RecordedBuild>>,
}

impl MockToolchain {
    pub fn new() -> Self {
        MockToolchain {
            version: "rustc 1.80.0 (051478957 2024-07-21)".to_string(),
            installed: true,
            exit_code: 0,
            output_file: None,
            observe: Vec::new(),
            builds: RefCell::new(Vec::new()),
        }
    }

    /// Pretend `cargo` and `rustc` are not installed.
    pub fn missing(mut self) -> Self {
        self.installed = false;
        self
    }

    /// Make every build exit with `code`.
    pub fn failing(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Report a different `rustc --version` line.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// On success, write `file_name` into the output directory cargo would
    /// use for the requested profile and `--target`.
    pub fn producing_file(mut self, file_name: impl Into<String>) -> Self {
        self.output_file = Some(file_name.into());
        self
    }

    /// Record whether `path` exists at the start of every build.
    pub fn observing(mut self, path: impl AsRef<Path>) -> Self {
        self.observe.push(path.as_ref().to_path_buf());
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn builds(&self) -> Vec<RecordedBuild> {
        self.builds.borrow().clone()
    }

    fn output_dir(crate_root: &Path, args: &[String]) -> PathBuf {
        let mut dir = crate_root.join("target");
        if let Some(pos) = args.iter().position(|a| a == "--target") {
            if let Some(triple) = args.get(pos + 1) {
                dir.push(triple);
            }
        }
        if args.iter().any(|a| a == "--release") {
            dir.push("release");
        } else {
            dir.push("debug");
        }
        dir
    }
}

impl Default for MockToolchain {
    fn default() -> Self {
        MockToolchain::new()
    }
}

impl Toolchain for MockToolchain {
    fn rustc_version(&self) -> Result<String> {
        if !self.installed {
            return Err(BuildError::ToolchainNotFound {
                program: "rustc".to_string(),
            }
            .into());
        }
        Ok(self.version.clone())
    }

    fn cargo_build(
        &self,
        crate_root: &Path,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<CompileStatus> {
        if !self.installed {
            return Err(BuildError::ToolchainNotFound {
                program: "cargo".to_string(),
            }
            .into());
        }

        let observed = self
            .observe
            .iter()
            .map(|p| (p.clone(), p.exists()))
            .collect();

        let mut builds = self.builds.borrow_mut();
        builds.push(RecordedBuild {
            crate_root: crate_root.to_path_buf(),
            args: args.to_vec(),
            env: env.to_vec(),
            observed,
        });

        if self.exit_code != 0 {
            return Ok(CompileStatus {
                success: false,
                code: Some(self.exit_code),
            });
        }

        if let Some(file_name) = &self.output_file {
            let dir = Self::output_dir(crate_root, args);
            std::fs::create_dir_all(&dir)?;
            std::fs::write(dir.join(file_name), format!("build #{}", builds.len()))?;
        }

        Ok(CompileStatus {
            success: true,
            code: Some(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_writes_output_for_target() {
        let tmp = TempDir::new().unwrap();
        let toolchain = MockToolchain::new().producing_file("addon.dll");

        let args = vec![
            "--release".to_string(),
            "--target".to_string(),
            "i686-pc-windows-msvc".to_string(),
        ];
        let status = toolchain.cargo_build(tmp.path(), &args, &[]).unwrap();

        assert!(status.success);
        let out = tmp
            .path()
            .join("target/i686-pc-windows-msvc/release/addon.dll");
        assert_eq!(std::fs::read_to_string(out).unwrap(), "build #1");
    }

    #[test]
    fn test_mock_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let toolchain = MockToolchain::new().failing(1).producing_file("libaddon.so");

        let status = toolchain.cargo_build(tmp.path(), &[], &[]).unwrap();
        assert!(!status.success);
        assert_eq!(status.code, Some(1));
        assert!(!tmp.path().join("target").exists());
        assert_eq!(toolchain.builds().len(), 1);
    }
}
