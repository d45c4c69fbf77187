//! On-disk fixtures for projects with a native crate.

use std::path::{Path, PathBuf};

/// Directory of the native crate inside a fixture project.
pub const NATIVE_DIR: &str = "native";

/// Cargo.toml for a cdylib crate named `name`.
pub fn cdylib_manifest(name: &str) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "0.1.0"
edition = "2021"

[lib]
crate-type = ["cdylib"]

[dependencies]
"#
    )
}

/// Create `<dir>/native` holding a cdylib crate named `name`; returns the
/// crate root.
pub fn create_native_crate(dir: &Path, name: &str) -> PathBuf {
    let root = dir.join(NATIVE_DIR);
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("Cargo.toml"), cdylib_manifest(name)).unwrap();
    std::fs::write(root.join("src").join("lib.rs"), "").unwrap();
    root
}

/// Create a project at `dir` whose native crate is named `name`; returns the
/// project root.
pub fn create_project(dir: &Path, name: &str) -> PathBuf {
    std::fs::write(
        dir.join("package.json"),
        format!(r#"{{ "name": "{name}", "main": "native/index.node" }}"#),
    )
    .unwrap();
    create_native_crate(dir, name);
    dir.to_path_buf()
}
