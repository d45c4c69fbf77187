//! High-level operations.
//!
//! This module contains the implementation of nodeforge commands.

pub mod nodeforge_build;
pub mod nodeforge_clean;

pub use nodeforge_build::{build, build_with_settings, BuildOptions, BuildResult};
pub use nodeforge_clean::clean;
