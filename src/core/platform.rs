//! Host platform and architecture tables.
//!
//! Platform and architecture names follow the host runtime's conventions
//! (`linux`, `darwin`, `win32`; `x64`, `ia32`, `arm64`, `arm`) since those are
//! what `npm_config_arch` and friends carry.

use std::fmt;
use std::str::FromStr;

use crate::core::errors::BuildError;
use crate::core::settings::host_runtime_abi;

/// Operating systems we know how to name a dynamic library for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    FreeBsd,
    OpenBsd,
    Darwin,
    Windows,
}

impl Platform {
    /// Platform of the running process.
    pub fn current() -> Result<Self, BuildError> {
        Self::from_rust_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value.
    pub fn from_rust_os(os: &str) -> Result<Self, BuildError> {
        match os {
            "linux" | "android" => Ok(Platform::Linux),
            "freebsd" => Ok(Platform::FreeBsd),
            "openbsd" => Ok(Platform::OpenBsd),
            "macos" | "ios" => Ok(Platform::Darwin),
            "windows" => Ok(Platform::Windows),
            other => Err(BuildError::UnsupportedPlatform {
                platform: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::FreeBsd => "freebsd",
            Platform::OpenBsd => "openbsd",
            Platform::Darwin => "darwin",
            Platform::Windows => "win32",
        }
    }

    /// `(prefix, suffix)` of a cdylib produced by cargo on this platform.
    pub fn dylib_affixes(&self) -> (&'static str, &'static str) {
        match self {
            Platform::Linux | Platform::FreeBsd | Platform::OpenBsd => ("lib", ".so"),
            Platform::Darwin => ("lib", ".dylib"),
            Platform::Windows => ("", ".dll"),
        }
    }

    /// File name of the cdylib for `crate_name`.
    pub fn dylib_name(&self, crate_name: &str) -> String {
        let (prefix, suffix) = self.dylib_affixes();
        format!("{}{}{}", prefix, crate_name, suffix)
    }

    /// Rust target triple for `arch` on this platform, if known.
    pub fn triple_for(&self, arch: &str) -> Option<&'static str> {
        let triple = match (self, arch) {
            (Platform::Windows, "ia32") => "i686-pc-windows-msvc",
            (Platform::Windows, "x64") => "x86_64-pc-windows-msvc",
            (Platform::Windows, "arm64") => "aarch64-pc-windows-msvc",
            (Platform::Darwin, "x64") => "x86_64-apple-darwin",
            (Platform::Darwin, "arm64") => "aarch64-apple-darwin",
            (Platform::Linux, "x64") => "x86_64-unknown-linux-gnu",
            (Platform::Linux, "ia32") => "i686-unknown-linux-gnu",
            (Platform::Linux, "arm64") => "aarch64-unknown-linux-gnu",
            (Platform::Linux, "arm") => "armv7-unknown-linux-gnueabihf",
            (Platform::FreeBsd, "x64") => "x86_64-unknown-freebsd",
            _ => return None,
        };
        Some(triple)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Platform::Linux),
            "freebsd" => Ok(Platform::FreeBsd),
            "openbsd" => Ok(Platform::OpenBsd),
            "darwin" => Ok(Platform::Darwin),
            "win32" => Ok(Platform::Windows),
            other => Err(BuildError::UnsupportedPlatform {
                platform: other.to_string(),
            }),
        }
    }
}

/// Map a `std::env::consts::ARCH` value onto the host runtime's naming.
pub fn runtime_arch(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        other => other,
    }
}

/// Everything target resolution needs to know about the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    pub platform: Platform,
    /// Architecture of the running process.
    pub host_arch: String,
    /// Architecture requested for the build.
    pub arch: String,
    /// Explicit triple, wins over every table lookup.
    pub triple_override: Option<String>,
    /// Module ABI of the installed host runtime, handed to the compiler.
    pub node_abi: Option<String>,
}

impl HostEnv {
    /// Describe the running process, honoring `npm_config_arch` and
    /// `CARGO_BUILD_TARGET`, and ask the installed runtime for its ABI.
    pub fn detect() -> Result<Self, BuildError> {
        let env = Self::detect_with(|key| std::env::var(key).ok())?;
        Ok(HostEnv {
            node_abi: host_runtime_abi(),
            ..env
        })
    }

    /// Same as [`HostEnv::detect`] with an explicit environment lookup.
    /// The runtime is not queried, so `node_abi` is left unset.
    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BuildError> {
        let platform = Platform::current()?;
        let host_arch = runtime_arch(std::env::consts::ARCH).to_string();
        let arch = lookup("npm_config_arch")
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| host_arch.clone());
        let triple_override = lookup("CARGO_BUILD_TARGET").filter(|t| !t.is_empty());

        Ok(HostEnv {
            platform,
            host_arch,
            arch,
            triple_override,
            node_abi: None,
        })
    }

    /// Request a different architecture than the environment specified.
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    /// Resolve the target triple; empty means a native build.
    pub fn resolve_triple(&self) -> Result<String, BuildError> {
        if let Some(triple) = &self.triple_override {
            return Ok(triple.clone());
        }

        let cross = self.arch != self.host_arch;

        // MSVC triples are always spelled out, even for native builds.
        if cross || self.platform == Platform::Windows {
            if let Some(triple) = self.platform.triple_for(&self.arch) {
                return Ok(triple.to_string());
            }
        }

        if cross {
            return Err(BuildError::UnsupportedArchitecture {
                arch: self.arch.clone(),
                platform: self.platform.to_string(),
            });
        }

        Ok(String::new())
    }
}
