//! A host-runtime project containing one native crate.

use std::path::{Path, PathBuf};

use crate::core::errors::BuildError;
use crate::core::native_crate::NativeCrate;
use crate::core::platform::HostEnv;
use crate::core::target::{Profile, Target};
use crate::util::config::Config;

/// File marking the root of a host-runtime project.
pub const PACKAGE_JSON: &str = "package.json";

/// Project root plus its native crate.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    krate: NativeCrate,
}

impl Project {
    /// Open the project at `root`, with the crate layout taken from `config`.
    pub fn open(root: impl Into<PathBuf>, config: &Config) -> Result<Self, BuildError> {
        let root = root.into();
        let krate = NativeCrate::open(root.join(config.crate_dir()), config.addon_name())?;
        Ok(Project { root, krate })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn krate(&self) -> &NativeCrate {
        &self.krate
    }

    pub fn krate_mut(&mut self) -> &mut NativeCrate {
        &mut self.krate
    }

    /// Resolve the build target for `profile` on `host`.
    pub fn target(&self, host: &HostEnv, profile: Profile) -> Result<Target, BuildError> {
        Target::new(&self.krate, host, profile)
    }
}

/// Nearest ancestor of `start` (inclusive) containing a `package.json`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PACKAGE_JSON).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::create_project;
    use tempfile::TempDir;

    #[test]
    fn test_open_default_layout() {
        let tmp = TempDir::new().unwrap();
        let root = create_project(tmp.path(), "my-addon");

        let project = Project::open(&root, &Config::default()).unwrap();
        assert_eq!(project.root(), root);
        assert_eq!(project.krate().root(), root.join("native"));
        assert_eq!(project.krate().name(), "my_addon");
        assert_eq!(project.krate().addon_path(), root.join("native").join("index.node"));
    }

    #[test]
    fn test_open_custom_layout() {
        let tmp = TempDir::new().unwrap();
        let root = create_project(tmp.path(), "addon");

        let mut config = Config::default();
        config.krate.addon = Some("addon.node".to_string());
        let project = Project::open(&root, &config).unwrap();
        assert_eq!(project.krate().addon_path(), root.join("native").join("addon.node"));

        config.krate.path = Some(PathBuf::from("rust"));
        let err = Project::open(&root, &config).unwrap_err();
        assert!(matches!(err, BuildError::ManifestMissing { .. }));
    }

    #[test]
    fn test_find_project_root() {
        let tmp = TempDir::new().unwrap();
        let root = create_project(tmp.path(), "addon");
        let nested = root.join("native").join("src");

        assert_eq!(find_project_root(&nested), Some(root.clone()));
        assert_eq!(find_project_root(&root), Some(root));
    }
}
