//! In-memory representation of one check configuration resource.
//!
//! A [`CheckRecord`] holds two views of the same check: the *current* state
//! read from disk (`config`, `event`, `ensure`) and the *pending* document
//! that will replace the file on the next flush. Getters always report the
//! current state; only the staging setters touch the pending document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::catalog::DesiredCheck;
use crate::fspaths::Fspaths;

/// A JSON object, as stored under a check's keys in its config file.
pub type JsonMap = Map<String, Value>;

/// Top-level key holding the per-check event configuration.
pub const CHECKS_KEY: &str = "checks";

/// Whether a resource exists (or should exist) on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl std::fmt::Display for Ensure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ensure::Present => write!(f, "present"),
            Ensure::Absent => write!(f, "absent"),
        }
    }
}

/// The current value of a property.
///
/// `Absent` means the key was not found. It is distinct from an empty
/// mapping, and a JSON `null` is never surfaced as a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyValue {
    #[default]
    Absent,
    Present(JsonMap),
}

impl PropertyValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, PropertyValue::Absent)
    }

    /// Returns the mapping if the property is present.
    pub fn as_map(&self) -> Option<&JsonMap> {
        match self {
            PropertyValue::Absent => None,
            PropertyValue::Present(map) => Some(map),
        }
    }

    /// Whether this current value satisfies the desired mapping.
    ///
    /// An absent value is in sync with an empty desired mapping, which is the
    /// default for both properties.
    pub fn in_sync_with(&self, desired: &JsonMap) -> bool {
        match self {
            PropertyValue::Absent => desired.is_empty(),
            PropertyValue::Present(current) => current == desired,
        }
    }

    /// Builds a property from an optional JSON value found in a document.
    ///
    /// Anything other than an object (including `null`) counts as absent.
    pub(crate) fn from_document_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => PropertyValue::Present(map.clone()),
            _ => PropertyValue::Absent,
        }
    }

    /// A desired mapping viewed as a property: empty means not supplied.
    fn from_desired(map: &JsonMap) -> Self {
        if map.is_empty() {
            PropertyValue::Absent
        } else {
            PropertyValue::Present(map.clone())
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Absent => write!(f, "absent"),
            PropertyValue::Present(map) => write!(f, "{}", Value::Object(map.clone())),
        }
    }
}

/// Association between a record and the desired resource it reconciles.
#[derive(Debug, Clone)]
pub(super) struct Binding {
    pub(super) desired: DesiredCheck,
    pub(super) base_path: PathBuf,
}

/// One check configuration resource during a reconciliation pass.
#[derive(Debug, Clone)]
pub struct CheckRecord {
    pub(super) name: String,
    pub(super) ensure: Ensure,
    pub(super) config: PropertyValue,
    pub(super) event: PropertyValue,
    /// File this record was discovered from, if any.
    pub(super) source: Option<PathBuf>,
    pub(super) binding: Option<Binding>,
    /// The full document written on flush. Not a diff.
    pub(super) pending_write: JsonMap,
    pub(super) staged: bool,
    pub(super) marked_for_destroy: bool,
}

impl CheckRecord {
    /// A record describing a config file found on disk.
    pub fn discovered(
        name: impl Into<String>,
        config: PropertyValue,
        event: PropertyValue,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            ensure: Ensure::Present,
            config,
            event,
            source: Some(source.into()),
            binding: None,
            pending_write: JsonMap::new(),
            staged: false,
            marked_for_destroy: false,
        }
    }

    /// A record for a desired resource with no file on disk.
    ///
    /// Properties are populated from the desired intent; empty mappings stay
    /// absent. The record is not bound yet.
    pub fn absent(desired: &DesiredCheck) -> Self {
        Self {
            name: desired.name.clone(),
            ensure: Ensure::Absent,
            config: PropertyValue::from_desired(&desired.config),
            event: PropertyValue::from_desired(&desired.event),
            source: None,
            binding: None,
            pending_write: JsonMap::new(),
            staged: false,
            marked_for_destroy: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current existence state, as found by discovery.
    pub fn ensure(&self) -> Ensure {
        self.ensure
    }

    /// Current check configuration block.
    pub fn config(&self) -> &PropertyValue {
        &self.config
    }

    /// Current event configuration from the `checks` block.
    pub fn event(&self) -> &PropertyValue {
        &self.event
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The document that the next flush will write.
    pub fn pending_write(&self) -> &JsonMap {
        &self.pending_write
    }

    /// Whether anything has been staged since the last flush.
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    pub fn is_marked_for_destroy(&self) -> bool {
        self.marked_for_destroy
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The desired resource this record is bound to.
    pub fn desired(&self) -> Option<&DesiredCheck> {
        self.binding.as_ref().map(|b| &b.desired)
    }

    /// Declared dependencies of the bound resource, carried for an external
    /// scheduler.
    pub fn dependencies(&self) -> &[String] {
        self.binding
            .as_ref()
            .map(|b| b.desired.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Associates this record with a desired resource.
    pub(super) fn bind_to(&mut self, desired: &DesiredCheck, fspaths: &Fspaths) {
        self.binding = Some(Binding {
            base_path: desired.resolved_base_path(fspaths),
            desired: desired.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_absent_is_not_empty_mapping() {
        let absent = PropertyValue::Absent;
        let empty = PropertyValue::Present(JsonMap::new());
        assert_ne!(absent, empty);
        assert!(absent.is_absent());
        assert_eq!(absent.as_map(), None);
        assert_eq!(empty.as_map(), Some(&JsonMap::new()));
    }

    #[test]
    fn test_in_sync_with() {
        let desired = map(json!({"interval": 60}));
        assert!(PropertyValue::Absent.in_sync_with(&JsonMap::new()));
        assert!(!PropertyValue::Absent.in_sync_with(&desired));
        assert!(PropertyValue::Present(desired.clone()).in_sync_with(&desired));
        assert!(!PropertyValue::Present(map(json!({"interval": 30}))).in_sync_with(&desired));
    }

    #[test]
    fn test_from_document_value_null_is_absent() {
        assert!(PropertyValue::from_document_value(Some(&Value::Null)).is_absent());
        assert!(PropertyValue::from_document_value(Some(&json!("text"))).is_absent());
        assert!(PropertyValue::from_document_value(None).is_absent());
        assert_eq!(
            PropertyValue::from_document_value(Some(&json!({"foo": "bar"}))),
            PropertyValue::Present(map(json!({"foo": "bar"})))
        );
    }

    #[test]
    fn test_absent_record_takes_desired_properties() {
        let desired = DesiredCheck::new("mycheck").with_config(map(json!({"foo": "bar"})));
        let record = CheckRecord::absent(&desired);

        assert_eq!(record.name(), "mycheck");
        assert_eq!(record.ensure(), Ensure::Absent);
        assert_eq!(record.config(), &PropertyValue::Present(map(json!({"foo": "bar"}))));
        assert_eq!(record.event(), &PropertyValue::Absent);
        assert!(record.pending_write().is_empty());
        assert!(!record.is_bound());
    }

    #[test]
    fn test_discovered_record_is_present() {
        let record = CheckRecord::discovered(
            "ntp",
            PropertyValue::Absent,
            PropertyValue::Present(map(json!({"interval": 60}))),
            "/etc/sensu/conf.d/checks/config_ntp.json",
        );
        assert_eq!(record.ensure(), Ensure::Present);
        assert_eq!(
            record.source_path(),
            Some(Path::new("/etc/sensu/conf.d/checks/config_ntp.json"))
        );
        assert!(record.dependencies().is_empty());
    }
}
