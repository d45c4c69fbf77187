//! The native crate: its manifest, its ledger and the addon slot.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::artifacts::Artifacts;
use crate::core::errors::BuildError;
use crate::core::manifest::{library_name, MANIFEST_NAME};
use crate::util::fs::{copy_file, remove_file_if_exists};

/// Default file name of the addon the host runtime loads.
pub const DEFAULT_ADDON_NAME: &str = "index.node";

/// Ledger file kept beside the addon.
pub const LEDGER_NAME: &str = "artifacts.json";

/// A Rust crate compiled into a single addon file.
#[derive(Debug)]
pub struct NativeCrate {
    root: PathBuf,
    name: String,
    addon_path: PathBuf,
    ledger_path: PathBuf,
    ledger: Artifacts,
}

impl NativeCrate {
    /// Open the crate rooted at `root`.
    ///
    /// Fails before anything is built if the manifest is missing or has no
    /// usable library name. The ledger is loaded leniently.
    pub fn open(root: impl Into<PathBuf>, addon_name: &str) -> Result<Self, BuildError> {
        let root = root.into();
        let name = library_name(&root.join(MANIFEST_NAME))?;
        let addon_path = root.join(addon_name);
        let ledger_path = root.join(LEDGER_NAME);
        let ledger = Artifacts::load_or_empty(&ledger_path);

        tracing::debug!(
            "opened crate `{}` at {} (active target: {:?})",
            name,
            root.display(),
            ledger.active()
        );

        Ok(NativeCrate {
            root,
            name,
            addon_path,
            ledger_path,
            ledger,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Library name from the manifest.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addon_path(&self) -> &Path {
        &self.addon_path
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn ledger(&self) -> &Artifacts {
        &self.ledger
    }

    /// Cargo's build tree for this crate.
    pub fn target_dir(&self) -> PathBuf {
        self.root.join("target")
    }

    /// Apply `mutate` to the on-disk ledger and persist the result.
    ///
    /// The ledger is re-read first so changes written by an earlier step are
    /// never lost, and saved before returning so no caller can forget to.
    pub fn update_ledger<T>(&mut self, mutate: impl FnOnce(&mut Artifacts) -> T) -> Result<T> {
        let mut ledger = Artifacts::load_or_empty(&self.ledger_path);
        let out = mutate(&mut ledger);
        ledger.save(&self.ledger_path)?;
        self.ledger = ledger;
        Ok(out)
    }

    /// Install `binary` as the addon.
    ///
    /// Not crash-atomic: an interrupted copy leaves a partial addon, which the
    /// next build's staleness check replaces.
    pub fn finish(&self, binary: &Path) -> Result<()> {
        self.remove_addon()?;
        copy_file(binary, &self.addon_path)
    }

    /// Delete the addon file if there is one.
    pub fn remove_addon(&self) -> Result<()> {
        remove_file_if_exists(&self.addon_path)
    }
}
