//! nodeforge - A build cache for native host-runtime addons written in Rust
//!
//! This crate provides the core library functionality for nodeforge:
//! fingerprinting the build environment, keeping the artifacts ledger, and
//! deciding when a cached binary must be thrown away before cargo runs.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for nodeforge unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted toolchain and on-disk project
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use self::core::{
    artifacts::Artifacts, native_crate::NativeCrate, project::Project, settings::BuildSettings,
    target::Target,
};

pub use util::context::GlobalContext;
