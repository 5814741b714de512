//! Startup settings for the built-in backends.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the path of a settings JSON file.
pub const SETTINGS_ENV: &str = "NODEOPS_SETTINGS";

/// Kernel used by the fixed-point softmax backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftmaxVariant {
    /// Float scratch buffer, any `dec_bits >= 0`.
    #[default]
    Float,
    /// Integer-only q7 routine, inputs with `dec_bits == 0`.
    Q7,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub softmax_variant: SoftmaxVariant,
    /// Backend names left out of the built-in registration list.
    pub disabled_backends: Vec<String>,
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse nodeops settings")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings at {}", path.display()))
    }

    /// Load from the file named by `NODEOPS_SETTINGS`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn is_disabled(&self, backend: &str) -> bool {
        self.disabled_backends.iter().any(|name| name == backend)
    }
}
