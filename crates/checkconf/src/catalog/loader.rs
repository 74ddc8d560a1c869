//! Loader for multi-file YAML manifests describing the desired state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::desired::{Catalog, DesiredCheck};
use super::resource::{
    AnyResource, CheckConfigResource, ResourceHeader, ResourceKind, ResourceWithPath,
    SettingsResource, API_VERSION,
};
use crate::error::{CheckConfError, Result};

/// Resources loaded from a manifest directory.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    /// The settings resource, if the manifest has one.
    pub settings: Option<ResourceWithPath<SettingsResource>>,
    /// All check config resources, sorted by name.
    pub checks: Vec<ResourceWithPath<CheckConfigResource>>,
}

impl LoadedManifest {
    /// Converts the manifest into the catalog used by the reconciler.
    pub fn to_catalog(&self) -> Result<Catalog> {
        let settings = self
            .settings
            .as_ref()
            .map(|s| s.resource.spec.clone())
            .unwrap_or_default();

        let mut catalog = Catalog::new(settings);
        for check in &self.checks {
            catalog.insert(DesiredCheck::from(check.resource.clone()))?;
        }
        Ok(catalog)
    }
}

/// Manifest loader.
pub struct ManifestLoader {
    /// Root directory for manifest files.
    manifest_dir: PathBuf,
}

impl ManifestLoader {
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
        }
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    /// Loads all resources from the manifest directory.
    pub fn load(&self) -> Result<LoadedManifest> {
        if !self.manifest_dir.exists() {
            return Err(CheckConfError::ManifestDirNotFound(
                self.manifest_dir.clone(),
            ));
        }

        let mut settings: Option<ResourceWithPath<SettingsResource>> = None;
        let mut checks: Vec<ResourceWithPath<CheckConfigResource>> = Vec::new();

        for entry in WalkDir::new(&self.manifest_dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => match self.walk_error(e) {
                    Some(err) => return Err(err),
                    None => continue,
                },
            };

            let path = entry.path();
            if !path.is_file() || self.is_hidden(path) || !is_manifest_file(path) {
                continue;
            }

            let resource = match self.load_file(path) {
                Ok(resource) => resource,
                Err(e) => {
                    log::warn!("Failed to load {}: {}", path.display(), e);
                    return Err(e);
                }
            };
            let relative_path = path
                .strip_prefix(&self.manifest_dir)
                .unwrap_or(path)
                .to_path_buf();

            match resource {
                AnyResource::Settings(r) => {
                    if settings.is_some() {
                        return Err(CheckConfError::DuplicateName {
                            kind: ResourceKind::Settings.to_string(),
                            name: r.metadata.name.clone(),
                        });
                    }
                    settings = Some(ResourceWithPath::new(r, relative_path));
                }
                AnyResource::CheckConfig(r) => {
                    if checks
                        .iter()
                        .any(|c| c.resource.metadata.name == r.metadata.name)
                    {
                        return Err(CheckConfError::DuplicateName {
                            kind: ResourceKind::CheckConfig.to_string(),
                            name: r.metadata.name.clone(),
                        });
                    }
                    checks.push(ResourceWithPath::new(r, relative_path));
                }
            }
        }

        checks.sort_by(|a, b| a.resource.metadata.name.cmp(&b.resource.metadata.name));
        log::debug!(
            "Loaded {} check resources from {}",
            checks.len(),
            self.manifest_dir.display()
        );

        Ok(LoadedManifest { settings, checks })
    }

    /// Loads the manifest and converts it into a catalog.
    pub fn load_catalog(&self) -> Result<Catalog> {
        self.load()?.to_catalog()
    }

    /// Loads a single resource file.
    pub fn load_file(&self, path: &Path) -> Result<AnyResource> {
        let content = fs::read_to_string(path).map_err(|e| CheckConfError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.parse_resource(&content, path)
    }

    /// Parses a resource from YAML content.
    pub fn parse_resource(&self, content: &str, path: &Path) -> Result<AnyResource> {
        let parse_error = |e: serde_yaml::Error| CheckConfError::ParseYaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let header: ResourceHeader = serde_yaml::from_str(content).map_err(parse_error)?;

        if header.api_version != API_VERSION {
            return Err(CheckConfError::InvalidApiVersion {
                version: header.api_version,
                expected: API_VERSION.to_string(),
            });
        }

        match header.kind {
            ResourceKind::Settings => {
                let resource: SettingsResource =
                    serde_yaml::from_str(content).map_err(parse_error)?;
                Ok(AnyResource::Settings(resource))
            }
            ResourceKind::CheckConfig => {
                let resource: CheckConfigResource =
                    serde_yaml::from_str(content).map_err(parse_error)?;
                Ok(AnyResource::CheckConfig(resource))
            }
        }
    }

    // Skips hidden files and anything under a hidden directory.
    fn is_hidden(&self, path: &Path) -> bool {
        path.strip_prefix(&self.manifest_dir)
            .map(|relative| {
                relative.components().any(|c| {
                    c.as_os_str()
                        .to_str()
                        .map(|s| s.starts_with('.'))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    }

    /// Classifies an error from walking the manifest directory.
    ///
    /// A dangling link that could not be a manifest is skipped with a
    /// warning. Anything else could hide desired checks and fails the load.
    fn walk_error(&self, e: walkdir::Error) -> Option<CheckConfError> {
        let path = e
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.manifest_dir.clone());

        if e.depth() > 0 && self.is_hidden(&path) {
            log::debug!("Skipping unreadable hidden entry {}: {}", path.display(), e);
            return None;
        }

        let dangling = e
            .io_error()
            .map(|io| io.kind() == ErrorKind::NotFound)
            .unwrap_or(false);
        if e.depth() > 0 && dangling && !is_manifest_file(&path) {
            log::warn!("Skipping unreadable entry {}: {}", path.display(), e);
            return None;
        }

        log::warn!("Failed to walk {}: {}", path.display(), e);
        Some(CheckConfError::ReadDirectory {
            path,
            source: e.into(),
        })
    }
}

fn is_manifest_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
