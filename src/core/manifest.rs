//! Reading the native crate's `Cargo.toml`.
//!
//! Only the library name matters here: it determines the file name cargo
//! gives the compiled cdylib.

use std::path::Path;

use serde::Deserialize;

use crate::core::errors::BuildError;

pub const MANIFEST_NAME: &str = "Cargo.toml";

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<PackageSection>,
    lib: Option<LibSection>,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LibSection {
    name: Option<String>,
}

/// Library name of the crate whose manifest is at `path`.
///
/// Uses `[lib] name` when present, otherwise the package name with `-`
/// replaced by `_`, which is what cargo does.
pub fn library_name(path: &Path) -> Result<String, BuildError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BuildError::ManifestMissing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(BuildError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    parse_library_name(&contents).map_err(|reason| BuildError::ManifestInvalid {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_library_name(contents: &str) -> Result<String, String> {
    let manifest: CargoManifest = toml::from_str(contents).map_err(|e| e.message().to_string())?;

    let name = manifest
        .lib
        .and_then(|lib| lib.name)
        .or_else(|| manifest.package.map(|pkg| pkg.name.replace('-', "_")))
        .ok_or_else(|| "no `[lib] name` or `[package] name`".to_string())?;

    if name.trim().is_empty() {
        return Err("library name is empty".to_string());
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lib_name_wins() {
        let name = parse_library_name(
            r#"
[package]
name = "my-addon"
version = "0.1.0"

[lib]
name = "native_core"
crate-type = ["cdylib"]
"#,
        )
        .unwrap();
        assert_eq!(name, "native_core");
    }

    #[test]
    fn test_package_name_fallback() {
        let name = parse_library_name(
            r#"
[package]
name = "my-addon"
version = "0.1.0"

[lib]
crate-type = ["cdylib"]
"#,
        )
        .unwrap();
        assert_eq!(name, "my_addon");
    }

    #[test]
    fn test_no_name_is_invalid() {
        assert!(parse_library_name("[dependencies]\nserde = \"1\"\n").is_err());
        assert!(parse_library_name("[lib]\nname = \"\"\n").is_err());
        assert!(parse_library_name("not toml at all [").is_err());
    }

    #[test]
    fn test_missing_manifest() {
        let tmp = TempDir::new().unwrap();
        let err = library_name(&tmp.path().join(MANIFEST_NAME)).unwrap_err();
        assert!(matches!(err, BuildError::ManifestMissing { .. }));
    }

    #[test]
    fn test_invalid_manifest_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&path, "[package\nname = ").unwrap();

        let err = library_name(&path).unwrap_err();
        assert!(matches!(err, BuildError::ManifestInvalid { .. }));
    }
}
