//! K8s-style resource types for the desired-state manifest.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::fspaths::{Fspaths, Platform};
use crate::provider::{Ensure, JsonMap};

/// The API version for all manifest resources.
pub const API_VERSION: &str = "sensu.io/v1";

/// The kind of resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Settings,
    CheckConfig,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Settings => write!(f, "Settings"),
            ResourceKind::CheckConfig => write!(f, "CheckConfig"),
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "settings" => Ok(ResourceKind::Settings),
            "checkconfig" => Ok(ResourceKind::CheckConfig),
            _ => Err(format!("Unknown resource kind: {}", s)),
        }
    }
}

/// Metadata for a resource, following K8s conventions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// The unique name of the resource within its kind.
    pub name: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: HashMap::new(),
            annotations: HashMap::new(),
        }
    }
}

/// A generic K8s-style resource wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource<T> {
    /// API version, should always be `sensu.io/v1`.
    pub api_version: String,
    pub kind: ResourceKind,
    pub metadata: ObjectMeta,
    pub spec: T,
}

impl<T> Resource<T> {
    /// Creates a new resource with the given kind and spec.
    pub fn new(kind: ResourceKind, name: impl Into<String>, spec: T) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind,
            metadata: ObjectMeta::new(name),
            spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Header used to peek at the kind before parsing the whole resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHeader {
    pub api_version: String,
    pub kind: ResourceKind,
}

// ============================================================================
// Settings Resource
// ============================================================================

/// Settings specification: where Sensu keeps its configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSpec {
    /// Platform family deciding the default etc directory. Defaults to the
    /// platform this binary runs on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    /// Overrides the Sensu etc directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etc_dir: Option<PathBuf>,
}

impl SettingsSpec {
    /// Resolves the path defaults described by these settings.
    pub fn fspaths(&self) -> Fspaths {
        let fspaths = Fspaths::new(self.platform.unwrap_or_else(Platform::current));
        match &self.etc_dir {
            Some(dir) => fspaths.with_etc_dir(dir),
            None => fspaths,
        }
    }
}

pub type SettingsResource = Resource<SettingsSpec>;

// ============================================================================
// CheckConfig Resource
// ============================================================================

/// Desired state of one check config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckConfigSpec {
    #[serde(default)]
    pub ensure: Ensure,

    /// Check configuration for the client to use.
    #[serde(
        default,
        deserialize_with = "non_null_mapping",
        skip_serializing_if = "JsonMap::is_empty"
    )]
    pub config: JsonMap,

    /// Configuration to send with the event to handlers.
    #[serde(
        default,
        deserialize_with = "non_null_mapping",
        skip_serializing_if = "JsonMap::is_empty"
    )]
    pub event: JsonMap,

    /// Directory holding the config file. Defaults to the checks directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,

    /// Resources this check relates to, e.g. `Service[sensu-client]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

pub type CheckConfigResource = Resource<CheckConfigSpec>;

/// Accepts a mapping and rejects an explicit `null`.
fn non_null_mapping<'de, D>(deserializer: D) -> Result<JsonMap, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Ok(map),
        None | Some(Value::Null) => Err(serde::de::Error::custom(
            "expected a mapping, found null (omit the key to leave it unset)",
        )),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a mapping, found {}",
            other
        ))),
    }
}

// ============================================================================
// Any Resource
// ============================================================================

/// Any manifest resource.
#[derive(Debug, Clone)]
pub enum AnyResource {
    Settings(SettingsResource),
    CheckConfig(CheckConfigResource),
}

impl AnyResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyResource::Settings(_) => ResourceKind::Settings,
            AnyResource::CheckConfig(_) => ResourceKind::CheckConfig,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AnyResource::Settings(r) => r.name(),
            AnyResource::CheckConfig(r) => r.name(),
        }
    }
}

/// A resource together with the manifest file it came from.
#[derive(Debug, Clone)]
pub struct ResourceWithPath<T> {
    pub resource: T,
    /// Path relative to the manifest directory.
    pub path: PathBuf,
}

impl<T> ResourceWithPath<T> {
    pub fn new(resource: T, path: impl Into<PathBuf>) -> Self {
        Self {
            resource,
            path: path.into(),
        }
    }
}
