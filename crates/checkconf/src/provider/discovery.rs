//! Discovery of check config files on disk.
//!
//! Scans one directory for `config_<name>.json` files and turns each into a
//! [`CheckRecord`] describing its current state.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;
use walkdir::WalkDir;

use super::record::{CheckRecord, PropertyValue, CHECKS_KEY};
use crate::error::{CheckConfError, Result};

/// File name prefix of every check config file.
pub const FILE_PREFIX: &str = "config_";

/// File name suffix of every check config file.
pub const FILE_SUFFIX: &str = ".json";

/// A single pass over the config files in one directory.
///
/// Yields one item per matching file in directory-listing order, which is
/// not stable across platforms. An unreadable config file yields an error for
/// that entry only and the scan continues with the next one. Broken entries
/// that are not config files, such as a dangling symlink, are skipped.
pub struct Discovery {
    directory: PathBuf,
    entries: Option<walkdir::IntoIter>,
}

impl Discovery {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Classifies a walk error.
    ///
    /// Failing to list the directory itself is a directory error. A broken
    /// entry is an error for that check only when its name is a check config
    /// file; anything else is skipped.
    fn entry_error(directory: &Path, e: walkdir::Error) -> Option<CheckConfError> {
        let path = e
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| directory.to_path_buf());

        if e.depth() == 0 {
            return Some(CheckConfError::ReadDirectory {
                path,
                source: e.into(),
            });
        }

        if check_name_from_path(&path).is_some() {
            return Some(CheckConfError::ReadFile {
                path,
                source: e.into(),
            });
        }

        debug!("Skipping unreadable entry {}: {}", path.display(), e);
        None
    }
}

impl Iterator for Discovery {
    type Item = Result<CheckRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let directory = &self.directory;
        let entries = self.entries.as_mut()?;

        for entry in entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => match Self::entry_error(directory, e) {
                    Some(err) => return Some(Err(err)),
                    None => continue,
                },
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = check_name_from_path(entry.path()) else {
                continue;
            };

            return Some(load_record(name, entry.path()));
        }

        None
    }
}

/// Lists the config files in `directory` as records.
///
/// A directory that does not exist holds no checks and yields nothing.
pub fn discover_all(directory: impl AsRef<Path>) -> Discovery {
    let directory = directory.as_ref().to_path_buf();

    let entries = if directory.is_dir() {
        Some(
            WalkDir::new(&directory)
                .min_depth(1)
                .max_depth(1)
                .follow_links(true)
                .into_iter(),
        )
    } else {
        debug!(
            "Checks directory {} does not exist, nothing to discover",
            directory.display()
        );
        None
    };

    Discovery { directory, entries }
}

/// Collects every record in `directory`, failing on the first unreadable file.
pub fn list_checks(directory: impl AsRef<Path>) -> Result<Vec<CheckRecord>> {
    discover_all(directory).collect()
}

/// Extracts `<name>` from a `config_<name>.json` path.
pub fn check_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Reads a JSON document, treating unparseable content as `{}`.
///
/// An empty or corrupted file, including one that is not valid UTF-8, must
/// not block reconciliation: its content is simply written back out on the
/// next flush. Read failures still propagate.
pub fn load_json(path: &Path) -> Result<Value> {
    let content = fs::read(path).map_err(|e| CheckConfError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    match serde_json::from_slice::<Value>(&content) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => {
            debug!(
                "{} does not hold a JSON object. Using {{}}.",
                path.display()
            );
            Ok(Value::Object(Default::default()))
        }
        Err(e) => {
            debug!(
                "Could not parse {} as JSON. Using {{}}. {}",
                path.display(),
                e
            );
            Ok(Value::Object(Default::default()))
        }
    }
}

/// Picks this check's properties out of a whole config document.
pub(crate) fn properties_from_document(
    name: &str,
    document: &Value,
) -> (PropertyValue, PropertyValue) {
    let config = PropertyValue::from_document_value(document.get(name));
    let event = PropertyValue::from_document_value(
        document
            .get(CHECKS_KEY)
            .and_then(|checks| checks.get(name)),
    );
    (config, event)
}

fn load_record(name: String, path: &Path) -> Result<CheckRecord> {
    let document = load_json(path)?;
    let (config, event) = properties_from_document(&name, &document);
    debug!("Discovered check '{}' at {}", name, path.display());
    Ok(CheckRecord::discovered(name, config, event, path))
}
