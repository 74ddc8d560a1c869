//! Tests for loading the desired-state manifest directory.

mod common;

use assert_fs::prelude::*;
use serde_json::json;

use checkconf::{CheckConfError, Ensure, ManifestLoader, Platform};
use common::{CheckBuilder, SettingsBuilder};

#[test]
fn test_loads_settings_and_checks() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("settings.yaml")
        .write_str(&SettingsBuilder::new().platform(Platform::Windows).build())
        .unwrap();
    temp.child("checks/ntp.yaml")
        .write_str(
            &CheckBuilder::new("ntp")
                .event(json!({"interval": 60}))
                .dependency("Service[sensu-client]")
                .build(),
        )
        .unwrap();
    temp.child("checks/disk.yaml")
        .write_str(&CheckBuilder::new("disk").absent().build())
        .unwrap();

    let catalog = ManifestLoader::new(temp.path()).load_catalog().unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(
        catalog.fspaths().checks_dir(),
        std::path::PathBuf::from("C:/opt/sensu/conf.d/checks")
    );
    assert_eq!(catalog.get("disk").unwrap().ensure, Ensure::Absent);
    assert_eq!(
        catalog.get("ntp").unwrap().dependencies,
        vec!["Service[sensu-client]"]
    );
}

#[test]
fn test_hidden_and_foreign_files_are_skipped() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("checks/ntp.yaml")
        .write_str(&CheckBuilder::new("ntp").build())
        .unwrap();
    temp.child(".git/config.yaml").write_str("not: a resource").unwrap();
    temp.child("checks/.draft.yaml").write_str("garbage").unwrap();
    temp.child("README.md").write_str("# manifests").unwrap();

    let manifest = ManifestLoader::new(temp.path()).load().unwrap();

    assert!(manifest.settings.is_none());
    assert_eq!(manifest.checks.len(), 1);
}

#[test]
fn test_duplicate_check_names_fail() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.yaml")
        .write_str(&CheckBuilder::new("ntp").build())
        .unwrap();
    temp.child("b.yaml")
        .write_str(&CheckBuilder::new("ntp").build())
        .unwrap();

    let result = ManifestLoader::new(temp.path()).load();
    assert!(matches!(result, Err(CheckConfError::DuplicateName { .. })));
}

#[test]
fn test_wrong_api_version_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("ntp.yaml")
        .write_str(
            r#"
apiVersion: sensu.io/v2
kind: CheckConfig
metadata:
  name: ntp
spec: {}
"#,
        )
        .unwrap();

    let result = ManifestLoader::new(temp.path()).load();
    assert!(matches!(
        result,
        Err(CheckConfError::InvalidApiVersion { .. })
    ));
}
