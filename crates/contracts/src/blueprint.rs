//! DispatchBlueprint - Config Loader output
//!
//! Describes the dispatch settings and every backend to register, in
//! registration order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{LevelPolicy, LevelSet};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete dispatch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Manager-wide settings
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Backends, registered in this order
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Manager-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Catch a panicking backend so later backends still receive the call
    #[serde(default = "default_isolate_faults")]
    pub isolate_faults: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            isolate_faults: default_isolate_faults(),
        }
    }
}

fn default_isolate_faults() -> bool {
    true
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend name
    pub name: String,

    /// Backend type
    pub backend_type: BackendType,

    /// Levels the backend declares safe to receive
    #[serde(default)]
    pub handles_levels: LevelSet,

    /// Levels forwarded regardless of `handles_levels`. Use with care.
    #[serde(default)]
    pub bypass_levels: LevelSet,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl BackendConfig {
    pub fn policy(&self) -> LevelPolicy {
        LevelPolicy::new(self.handles_levels, self.bypass_levels)
    }
}

/// Built-in backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Log emitted calls through tracing
    Log,
    /// Keep emitted calls in memory
    Memory,
}
