//! Core data structures for nodeforge.
//!
//! This module contains the types the build cache is made of:
//! - Build settings and the artifacts ledger that records them
//! - Platform and target resolution
//! - The native crate and the project around it

pub mod artifacts;
pub mod errors;
pub mod manifest;
pub mod native_crate;
pub mod platform;
pub mod project;
pub mod settings;
pub mod target;
pub mod toolchain;

pub use artifacts::Artifacts;
pub use errors::BuildError;
pub use native_crate::NativeCrate;
pub use platform::{HostEnv, Platform};
pub use project::Project;
pub use settings::BuildSettings;
pub use target::{Profile, Target};
pub use toolchain::{RustToolchain, Toolchain};
