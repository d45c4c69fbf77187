//! Error types for the build cache and orchestration layer.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// A failure that aborts a `build` or `clean` invocation.
///
/// These travel inside `anyhow::Error` through the orchestration layer;
/// callers that care about the kind use `downcast_ref::<BuildError>()`.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("could not find `{program}` in PATH")]
    #[diagnostic(
        code(nodeforge::toolchain::not_found),
        help("install Rust with rustup (https://rustup.rs) and make sure `cargo` and `rustc` are on your PATH")
    )]
    ToolchainNotFound { program: String },

    #[error("`{command}` failed: {message}")]
    #[diagnostic(code(nodeforge::toolchain::error))]
    Toolchain { command: String, message: String },

    #[error("cargo build failed{}", exit_code_suffix(.code))]
    #[diagnostic(code(nodeforge::build::failed))]
    BuildFailed { code: Option<i32> },

    #[error("unsupported platform `{platform}`")]
    #[diagnostic(
        code(nodeforge::target::platform),
        help("supported platforms: linux, freebsd, openbsd, darwin, win32")
    )]
    UnsupportedPlatform { platform: String },

    #[error("unsupported architecture `{arch}` for platform `{platform}`")]
    #[diagnostic(
        code(nodeforge::target::arch),
        help("set CARGO_BUILD_TARGET to the Rust target triple you want to build for")
    )]
    UnsupportedArchitecture { arch: String, platform: String },

    #[error("no Cargo.toml found at {}", .path.display())]
    #[diagnostic(code(nodeforge::manifest::missing))]
    ManifestMissing { path: PathBuf },

    #[error("invalid manifest {}: {reason}", .path.display())]
    #[diagnostic(code(nodeforge::manifest::invalid))]
    ManifestInvalid { path: PathBuf, reason: String },
}

fn exit_code_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

/// What went wrong at a specific field of a persisted JSON record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Missing,
    ExpectedObject,
    ExpectedString,
    ExpectedStringOrNull,
    /// A `targets` key that is not `<profile>` or `<triple>/<profile>`.
    InvalidTargetKey,
    /// `active` names a key missing from `targets`.
    UnknownTarget,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrorKind::Missing => write!(f, "missing required field"),
            ValidationErrorKind::ExpectedObject => write!(f, "expected an object"),
            ValidationErrorKind::ExpectedString => write!(f, "expected a string"),
            ValidationErrorKind::ExpectedStringOrNull => write!(f, "expected a string or null"),
            ValidationErrorKind::InvalidTargetKey => write!(f, "not a valid target key"),
            ValidationErrorKind::UnknownTarget => write!(f, "names no recorded target"),
        }
    }
}

/// Schema violation found while reading the ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `targets.release.env.npm_config_arch`.
    pub path: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        ValidationError {
            path: path.into(),
            kind,
        }
    }

    /// Prefix the path with an enclosing field name.
    pub fn within(mut self, parent: &str) -> Self {
        self.path = if self.path.is_empty() {
            parent.to_string()
        } else {
            format!("{}.{}", parent, self.path)
        };
        self
    }
}
