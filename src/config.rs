// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Options controlling how a provider binds call arguments.
///
/// ```yaml
/// allow-positional: false
/// preload-defaults: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct BindConfig {
    /// Accept positional arguments, bound in schema order.
    pub allow_positional: bool,

    /// Resolve all defaults when the provider is built instead of on first
    /// use. A malformed default then fails the declaration.
    pub preload_defaults: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            allow_positional: true,
            preload_defaults: false,
        }
    }
}

impl BindConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
