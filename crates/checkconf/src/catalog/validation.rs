//! Validation of the desired-state catalog.

use regex::Regex;
use std::path::{Component, Path};
use std::sync::LazyLock;

// A name is spliced into `config_<name>.json`, so it must stay one path segment.
static RE_CHECK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").unwrap());

use super::desired::{Catalog, DesiredCheck};
use crate::error::{CheckConfError, Result};

/// Validator for a desired-state catalog.
pub struct CatalogValidator {
    /// Collected validation errors.
    errors: Vec<String>,
}

impl CatalogValidator {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Validates every check in the catalog, reporting all problems at once.
    pub fn validate(&mut self, catalog: &Catalog) -> Result<()> {
        self.errors.clear();

        for check in catalog.checks().values() {
            self.validate_check(check);
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CheckConfError::Validation(self.errors.join("; ")))
        }
    }

    fn validate_check(&mut self, check: &DesiredCheck) {
        if let Err(reason) = check_name(&check.name) {
            self.errors
                .push(format!("Invalid check name '{}': {}", check.name, reason));
        }

        if let Some(base_path) = &check.base_path {
            if !is_absolute(base_path) {
                self.errors.push(format!(
                    "CheckConfig '{}': basePath '{}' must be absolute",
                    check.name,
                    base_path.display()
                ));
            }
            if base_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
            {
                self.errors.push(format!(
                    "CheckConfig '{}': basePath '{}' must not contain '..'",
                    check.name,
                    base_path.display()
                ));
            }
        }
    }

    /// Returns the collected errors.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl Default for CatalogValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that `name` can be used as a check name.
pub fn validate_check_name(name: &str) -> Result<()> {
    check_name(name).map_err(|reason| CheckConfError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn check_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if !RE_CHECK_NAME.is_match(name) {
        return Err(
            "name must start with a letter or digit and contain only letters, digits, '_', '-' or '.'"
                .to_string(),
        );
    }
    Ok(())
}

// Windows drive paths such as `C:/opt/sensu` count as absolute on any host.
fn is_absolute(path: &Path) -> bool {
    if path.is_absolute() || path.has_root() {
        return true;
    }
    let s = path.to_string_lossy();
    let bytes = s.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}
