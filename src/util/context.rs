//! Global context for nodeforge operations.
//!
//! Provides centralized access to the project location, the merged
//! configuration and the output shell.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::{find_project_root, Project};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::shell::{Shell, Status};

/// Global context containing configuration and paths.
#[derive(Debug)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Root of the project commands operate on
    project_root: PathBuf,

    /// Global and project config, merged
    config: Config,

    shell: Shell,
}

impl GlobalContext {
    /// Create a context for the current directory.
    ///
    /// `path` overrides project discovery; otherwise the nearest ancestor
    /// with a `package.json` is used, falling back to the working directory.
    pub fn new(path: Option<&Path>, shell: Shell) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let global = global_config_path();
        Ok(Self::with_cwd(cwd, path, global.as_deref(), shell))
    }

    /// Create a context with an explicit working directory and global config.
    pub fn with_cwd(
        cwd: PathBuf,
        path: Option<&Path>,
        global_config: Option<&Path>,
        shell: Shell,
    ) -> Self {
        let project_root = match path {
            Some(path) => cwd.join(path),
            None => find_project_root(&cwd).unwrap_or_else(|| cwd.clone()),
        };

        let config = load_config(global_config, &project_config_path(&project_root));
        tracing::debug!("project root: {}", project_root.display());

        GlobalContext {
            cwd,
            project_root,
            config,
            shell,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Open the project at the resolved root.
    pub fn open_project(&self) -> Result<Project> {
        Ok(Project::open(&self.project_root, &self.config)?)
    }

    /// Logging callback printing through this context's shell.
    pub fn log(&self) -> impl Fn(Status, &str) + '_ {
        move |status: Status, msg: &str| self.shell.status(status, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::create_project;
    use crate::util::shell::{ColorChoice, Verbosity};
    use tempfile::TempDir;

    fn shell() -> Shell {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    #[test]
    fn test_discovers_project_root() {
        let tmp = TempDir::new().unwrap();
        let root = create_project(tmp.path(), "addon");
        let cwd = root.join("native").join("src");

        let ctx = GlobalContext::with_cwd(cwd.clone(), None, None, shell());
        assert_eq!(ctx.cwd(), cwd);
        assert_eq!(ctx.project_root(), root);
        assert_eq!(ctx.open_project().unwrap().krate().name(), "addon");
    }

    #[test]
    fn test_explicit_path_wins() {
        let tmp = TempDir::new().unwrap();
        let root = create_project(tmp.path(), "addon");
        let elsewhere = tmp.path().join("elsewhere");
        std::fs::create_dir_all(&elsewhere).unwrap();

        let ctx = GlobalContext::with_cwd(root.clone(), Some(elsewhere.as_path()), None, shell());
        assert_eq!(ctx.project_root(), elsewhere);
        assert!(ctx.open_project().is_err());
    }

    #[test]
    fn test_reads_project_config() {
        let tmp = TempDir::new().unwrap();
        let root = create_project(tmp.path(), "addon");
        let config_path = project_config_path(&root);
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "[crate]\naddon = \"addon.node\"\n").unwrap();

        let ctx = GlobalContext::with_cwd(root.clone(), None, None, shell());
        assert_eq!(ctx.config().addon_name(), "addon.node");
        assert_eq!(
            ctx.open_project().unwrap().krate().addon_path(),
            root.join("native").join("addon.node")
        );
    }
}
