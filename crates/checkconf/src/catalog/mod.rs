//! Desired-state catalog for check configuration.
//!
//! This module provides a Kubernetes-style manifest format with:
//! - Multi-file YAML manifests
//! - Two resource kinds: Settings, CheckConfig
//! - Conversion into the [`Catalog`] consumed by the reconciler
//! - Name and path validation

pub mod desired;
pub mod loader;
pub mod resource;
pub mod validation;

pub use desired::{Catalog, DesiredCheck};
pub use loader::{LoadedManifest, ManifestLoader};
pub use resource::{
    AnyResource, CheckConfigResource, CheckConfigSpec, ObjectMeta, Resource, ResourceKind,
    ResourceWithPath, SettingsResource, SettingsSpec, API_VERSION,
};
pub use validation::{validate_check_name, CatalogValidator};
