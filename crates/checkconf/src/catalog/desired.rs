//! Desired-state records handed to the reconciler.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::resource::{CheckConfigResource, CheckConfigSpec, SettingsSpec};
use crate::error::{CheckConfError, Result};
use crate::fspaths::Fspaths;
use crate::provider::{Ensure, JsonMap};

/// The desired state of one check config file.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredCheck {
    pub name: String,
    pub ensure: Ensure,
    pub config: JsonMap,
    pub event: JsonMap,
    /// Overrides the default checks directory.
    pub base_path: Option<PathBuf>,
    /// Opaque relationship list for an external scheduler.
    pub dependencies: Vec<String>,
}

impl DesiredCheck {
    /// A check that should be present with empty config and event.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: Ensure::Present,
            config: JsonMap::new(),
            event: JsonMap::new(),
            base_path: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    pub fn with_config(mut self, config: JsonMap) -> Self {
        self.config = config;
        self
    }

    pub fn with_event(mut self, event: JsonMap) -> Self {
        self.event = event;
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// The directory holding this check's config file.
    pub fn resolved_base_path(&self, fspaths: &Fspaths) -> PathBuf {
        self.base_path
            .clone()
            .unwrap_or_else(|| fspaths.checks_dir())
    }
}

impl From<CheckConfigResource> for DesiredCheck {
    fn from(resource: CheckConfigResource) -> Self {
        let CheckConfigSpec {
            ensure,
            config,
            event,
            base_path,
            dependencies,
        } = resource.spec;

        Self {
            name: resource.metadata.name,
            ensure,
            config,
            event,
            base_path,
            dependencies,
        }
    }
}

/// Every desired check for one reconciliation pass, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    settings: SettingsSpec,
    checks: BTreeMap<String, DesiredCheck>,
}

impl Catalog {
    pub fn new(settings: SettingsSpec) -> Self {
        Self {
            settings,
            checks: BTreeMap::new(),
        }
    }

    /// Adds a check, rejecting a second check with the same name.
    pub fn insert(&mut self, check: DesiredCheck) -> Result<()> {
        if self.checks.contains_key(&check.name) {
            return Err(CheckConfError::DuplicateName {
                kind: "CheckConfig".to_string(),
                name: check.name,
            });
        }
        self.checks.insert(check.name.clone(), check);
        Ok(())
    }

    pub fn with_check(mut self, check: DesiredCheck) -> Result<Self> {
        self.insert(check)?;
        Ok(self)
    }

    pub fn settings(&self) -> &SettingsSpec {
        &self.settings
    }

    /// Path defaults for this catalog.
    pub fn fspaths(&self) -> Fspaths {
        self.settings.fspaths()
    }

    pub fn get(&self, name: &str) -> Option<&DesiredCheck> {
        self.checks.get(name)
    }

    pub fn checks(&self) -> &BTreeMap<String, DesiredCheck> {
        &self.checks
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Groups checks by the directory their config files live in.
    pub fn by_base_path(
        &self,
        fspaths: &Fspaths,
    ) -> BTreeMap<PathBuf, BTreeMap<String, DesiredCheck>> {
        let mut groups: BTreeMap<PathBuf, BTreeMap<String, DesiredCheck>> = BTreeMap::new();
        for (name, check) in &self.checks {
            groups
                .entry(check.resolved_base_path(fspaths))
                .or_default()
                .insert(name.clone(), check.clone());
        }
        groups
    }
}
