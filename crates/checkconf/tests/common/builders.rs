//! Builders for manifest resources.
//!
//! These produce the YAML text a user would write, so tests exercise the
//! loader as well as the reconciler.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::Value;

use checkconf::catalog::{
    CheckConfigResource, CheckConfigSpec, ResourceKind, SettingsResource, SettingsSpec,
};
use checkconf::{Ensure, JsonMap, Platform};

/// Builder for the `Settings` resource.
pub struct SettingsBuilder {
    spec: SettingsSpec,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            spec: SettingsSpec {
                platform: Some(Platform::Unix),
                etc_dir: None,
            },
        }
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.spec.platform = Some(platform);
        self
    }

    pub fn etc_dir(mut self, dir: &Path) -> Self {
        self.spec.etc_dir = Some(dir.to_path_buf());
        self
    }

    pub fn build(self) -> String {
        let resource = SettingsResource::new(ResourceKind::Settings, "default", self.spec);
        serde_yaml::to_string(&resource).expect("Failed to serialize settings")
    }
}

/// Builder for `CheckConfig` resources.
pub struct CheckBuilder {
    name: String,
    spec: CheckConfigSpec,
}

impl CheckBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            spec: CheckConfigSpec::default(),
        }
    }

    pub fn absent(mut self) -> Self {
        self.spec.ensure = Ensure::Absent;
        self
    }

    /// Sets `config` from a JSON object literal.
    pub fn config(mut self, value: Value) -> Self {
        self.spec.config = to_map(value);
        self
    }

    /// Sets `event` from a JSON object literal.
    pub fn event(mut self, value: Value) -> Self {
        self.spec.event = to_map(value);
        self
    }

    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.base_path = Some(path.into());
        self
    }

    pub fn dependency(mut self, dependency: &str) -> Self {
        self.spec.dependencies.push(dependency.to_string());
        self
    }

    pub fn build(self) -> String {
        let resource = CheckConfigResource::new(ResourceKind::CheckConfig, self.name, self.spec);
        serde_yaml::to_string(&resource).expect("Failed to serialize check")
    }
}

fn to_map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
