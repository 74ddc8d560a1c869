//! Test harness for isolated reconciliation passes.
//!
//! Each harness owns a temporary directory with:
//! - `manifest/` holding the desired-state YAML files
//! - `etc/` used as the Sensu etc directory, so checks land in
//!   `etc/conf.d/checks`

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use checkconf::{ManifestLoader, ReconcileReport, Reconciler};

use super::builders::SettingsBuilder;

/// Test harness providing an isolated Sensu etc directory and manifest.
pub struct TestHarness {
    temp_dir: TempDir,
    /// Directory of YAML manifests.
    pub manifest_dir: PathBuf,
    /// Sensu etc directory the settings point at.
    pub etc_dir: PathBuf,
}

impl TestHarness {
    /// Creates a harness whose manifest already carries a Settings resource
    /// pointing at the temporary etc directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let manifest_dir = temp_dir.path().join("manifest");
        let etc_dir = temp_dir.path().join("etc");
        fs::create_dir_all(&manifest_dir).expect("Failed to create manifest dir");

        let harness = Self {
            temp_dir,
            manifest_dir,
            etc_dir,
        };
        harness.write_manifest(
            "settings.yaml",
            &SettingsBuilder::new().etc_dir(&harness.etc_dir).build(),
        );
        harness
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The default checks directory for this harness.
    pub fn checks_dir(&self) -> PathBuf {
        self.etc_dir.join("conf.d").join("checks")
    }

    /// Path of the config file for `name` in the default checks directory.
    pub fn check_path(&self, name: &str) -> PathBuf {
        self.checks_dir().join(format!("config_{}.json", name))
    }

    /// Writes a manifest file relative to the manifest directory.
    pub fn write_manifest(&self, relative: &str, yaml: &str) {
        let path = self.manifest_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create manifest subdir");
        }
        fs::write(path, yaml).expect("Failed to write manifest");
    }

    /// Writes raw content as the config file for `name`.
    pub fn write_check_file(&self, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(self.checks_dir()).expect("Failed to create checks dir");
        let path = self.check_path(name);
        fs::write(&path, content).expect("Failed to write check file");
        path
    }

    /// Reads and parses the config file for `name`.
    pub fn read_check(&self, name: &str) -> Value {
        let content = fs::read_to_string(self.check_path(name)).expect("Failed to read check");
        serde_json::from_str(&content).expect("Check file is not valid JSON")
    }

    /// Loads the manifest and runs a full pass.
    pub fn apply(&self) -> ReconcileReport {
        let catalog = ManifestLoader::new(&self.manifest_dir)
            .load_catalog()
            .expect("Failed to load manifest");
        Reconciler::for_catalog(&catalog)
            .apply(&catalog)
            .expect("Reconciliation pass failed")
    }

    /// Loads the manifest and plans a pass without writing.
    pub fn plan(&self) -> ReconcileReport {
        let catalog = ManifestLoader::new(&self.manifest_dir)
            .load_catalog()
            .expect("Failed to load manifest");
        Reconciler::for_catalog(&catalog)
            .plan(&catalog)
            .expect("Planning failed")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
