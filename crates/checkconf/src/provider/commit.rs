//! Ensurable operations and the single durable write per record.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::Value;

use super::discovery::properties_from_document;
use super::record::{CheckRecord, Ensure};
use crate::error::{CheckConfError, Result};
use crate::fspaths::Fspaths;

/// What a flush did to the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The pending document replaced the file.
    Written(PathBuf),
    /// The file was deleted.
    Removed(PathBuf),
    /// The record was marked for destroy but the file was already gone.
    AlreadyAbsent(PathBuf),
    /// Nothing was staged, so nothing was written.
    Unchanged,
}

impl CheckRecord {
    /// Whether discovery found a file for this record.
    pub fn exists(&self) -> bool {
        self.ensure == Ensure::Present
    }

    /// Stages the desired properties of the bound resource.
    ///
    /// Empty desired mappings are left out of the document. The record is
    /// staged even if both are empty, so the following flush still creates
    /// the file.
    pub fn create(&mut self) -> Result<()> {
        let desired = self
            .desired()
            .cloned()
            .ok_or_else(|| CheckConfError::NotBound(self.name.clone()))?;

        self.begin_staging();
        if !desired.event.is_empty() {
            self.set_event(desired.event);
        }
        if !desired.config.is_empty() {
            self.set_config(desired.config);
        }
        Ok(())
    }

    /// Marks the record for removal on the next flush.
    pub fn destroy(&mut self) {
        self.marked_for_destroy = true;
    }

    /// Full path of this record's config file.
    ///
    /// A bound record uses the base path of its desired resource. An unbound
    /// record (from introspection) falls back to the default checks directory.
    pub fn config_file(&self, fspaths: &Fspaths) -> PathBuf {
        let base_path = match &self.binding {
            Some(binding) => binding.base_path.clone(),
            None => fspaths.checks_dir(),
        };
        Fspaths::config_file_in(&base_path, &self.name)
    }

    /// Makes the staged state durable with one write or one delete.
    ///
    /// On success the record reflects the new on-disk state and the staging
    /// buffer is cleared.
    pub fn flush(&mut self, fspaths: &Fspaths) -> Result<FlushOutcome> {
        let path = self.config_file(fspaths);

        if self.marked_for_destroy {
            let outcome = remove_if_exists(&path)?;
            self.ensure = Ensure::Absent;
            self.marked_for_destroy = false;
            self.reset_staging();
            return Ok(outcome);
        }

        if !self.staged {
            debug!("Nothing staged for check '{}', skipping flush", self.name);
            return Ok(FlushOutcome::Unchanged);
        }

        let document = Value::Object(std::mem::take(&mut self.pending_write));
        let mut content =
            serde_json::to_string_pretty(&document).map_err(|e| CheckConfError::SerializeJson {
                path: path.clone(),
                source: e,
            })?;
        content.push('\n');

        if let Err(e) = write_atomically(&path, &content) {
            if let Value::Object(pending) = document {
                self.pending_write = pending;
            }
            return Err(e);
        }
        info!("Wrote check config {}", path.display());

        let (config, event) = properties_from_document(&self.name, &document);
        self.config = config;
        self.event = event;
        self.ensure = Ensure::Present;
        self.source = Some(path.clone());
        self.reset_staging();

        Ok(FlushOutcome::Written(path))
    }

    fn reset_staging(&mut self) {
        self.pending_write.clear();
        self.staged = false;
    }
}

fn remove_if_exists(path: &Path) -> Result<FlushOutcome> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed check config {}", path.display());
            Ok(FlushOutcome::Removed(path.to_path_buf()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Check config {} already absent", path.display());
            Ok(FlushOutcome::AlreadyAbsent(path.to_path_buf()))
        }
        Err(e) => Err(CheckConfError::RemoveFile {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `content` next to `path` and renames it into place, so readers see
/// either the old document or the whole new one.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let write_error = |e: std::io::Error| CheckConfError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("config.json");
    let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(e));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(e));
    }
    Ok(())
}
