//! Build settings fingerprinting.
//!
//! A [`BuildSettings`] records the toolchain version, the host runtime
//! version and a fixed set of environment variables under which a binary was
//! produced. Comparing the current settings against the stored record tells
//! us whether a cached binary can still be served.

use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::core::errors::{ValidationError, ValidationErrorKind};
use crate::core::toolchain::Toolchain;
use crate::util::process::{find_executable, stdout_first_line, ProcessBuilder};

/// Environment variables that affect the ABI of a compiled addon.
///
/// Records carry one entry per variable in this list. A record written with a
/// different list never matches, so editing it invalidates every ledger.
pub const ENV_WHITELIST: &[&str] = &[
    "npm_config_target",
    "npm_config_arch",
    "npm_config_target_arch",
    "npm_config_disturl",
    "npm_config_runtime",
    "npm_config_build_from_source",
    "npm_config_devdir",
    "npm_config_nodedir",
];

/// Fingerprint of the environment a target was built in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    rustc: String,
    node_version: Option<String>,
    env: BTreeMap<String, Option<String>>,
}

impl BuildSettings {
    /// Capture the settings of the current process.
    pub fn current(toolchain: &dyn Toolchain) -> Result<Self> {
        let rustc = toolchain.rustc_version()?;
        let node_version = host_runtime_version();
        Ok(Self::capture(rustc, node_version, |key| {
            std::env::var(key).ok()
        }))
    }

    /// Build settings from explicit parts, reading whitelisted variables
    /// through `lookup`.
    pub fn capture(
        rustc: impl Into<String>,
        node_version: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env = ENV_WHITELIST
            .iter()
            .map(|key| (key.to_string(), lookup(key)))
            .collect();

        BuildSettings {
            rustc: rustc.into(),
            node_version,
            env,
        }
    }

    pub fn rustc(&self) -> &str {
        &self.rustc
    }

    pub fn node_version(&self) -> Option<&str> {
        self.node_version.as_deref()
    }

    pub fn env(&self) -> &BTreeMap<String, Option<String>> {
        &self.env
    }

    /// Value of a whitelisted variable, `None` when unset.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).and_then(|v| v.as_deref())
    }

    /// Whether a binary built under `other` can be served under `self`.
    ///
    /// The host runtime version must be identical and both records must
    /// track the same variables. Values compare with unset and empty treated
    /// as equal. The rustc version is not compared; cargo tracks compiler
    /// changes on its own.
    pub fn matches(&self, other: &BuildSettings) -> bool {
        if self.node_version != other.node_version {
            return false;
        }

        if !self.env.keys().eq(other.env.keys()) {
            return false;
        }

        self.env.keys().all(|key| {
            normalize(self.env_var(key)) == normalize(other.env_var(key))
        })
    }

    /// Serialize to the ledger's record format.
    pub fn to_json(&self) -> Value {
        let env: Map<String, Value> = self
            .env
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Some(s) => Value::String(s.clone()),
                    None => Value::Null,
                };
                (k.clone(), value)
            })
            .collect();

        serde_json::json!({
            "rustc": self.rustc,
            "nodeVersion": self.node_version,
            "env": env,
        })
    }

    /// Validate and deserialize a ledger record.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidationError::new("", ValidationErrorKind::ExpectedObject))?;

        let rustc = match obj.get("rustc") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ValidationError::new(
                    "rustc",
                    ValidationErrorKind::ExpectedString,
                ))
            }
            None => return Err(ValidationError::new("rustc", ValidationErrorKind::Missing)),
        };

        // Records written before the host version was tracked have no field.
        let node_version = match obj.get("nodeVersion") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(ValidationError::new(
                    "nodeVersion",
                    ValidationErrorKind::ExpectedStringOrNull,
                ))
            }
        };

        let env_obj = match obj.get("env") {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ValidationError::new(
                    "env",
                    ValidationErrorKind::ExpectedObject,
                ))
            }
            None => return Err(ValidationError::new("env", ValidationErrorKind::Missing)),
        };

        let mut env = BTreeMap::new();
        for (key, value) in env_obj {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                _ => {
                    return Err(ValidationError::new(
                        key.as_str(),
                        ValidationErrorKind::ExpectedStringOrNull,
                    )
                    .within("env"))
                }
            };
            env.insert(key.clone(), value);
        }

        Ok(BuildSettings {
            rustc,
            node_version,
            env,
        })
    }
}

fn normalize(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

/// Version of the installed host runtime, without the leading `v`.
///
/// Returns `None` when `node` is not installed or does not answer.
pub fn host_runtime_version() -> Option<String> {
    query_node(&["--version"]).map(|line| line.trim_start_matches('v').to_string())
}

/// Module ABI number of the installed host runtime, e.g. `115` for node 20.
pub fn host_runtime_abi() -> Option<String> {
    query_node(&["-p", "process.versions.modules"])
}

fn query_node(args: &[&str]) -> Option<String> {
    let node = find_executable("node")?;
    let pb = ProcessBuilder::new(node).args(args.iter().copied());
    let output = match pb.output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::debug!("`{}` exited with {:?}", pb, output.status.code());
            return None;
        }
        Err(e) => {
            tracing::debug!("failed to query host runtime: {:#}", e);
            return None;
        }
    };

    stdout_first_line(&output)
}
