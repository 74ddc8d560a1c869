//! Reconciliation pass: discover → bind → stage → flush.
//!
//! One pass reads each checks directory once, binds what it found to the
//! desired checks, stages every change in memory and then commits each
//! record with a single write or delete. A failure for one check never stops
//! the others from being committed.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::catalog::{Catalog, CatalogValidator, DesiredCheck};
use crate::error::{CheckConfError, Result};
use crate::fspaths::Fspaths;
use crate::provider::{bind, check_name_from_path, discover_all, CheckRecord, Ensure, FlushOutcome};

/// What a pass decided to do with one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    /// No file exists; write one from the desired state.
    Create,
    /// The file exists but some properties drifted.
    Update { config: bool, event: bool },
    /// The file exists but should not.
    Destroy,
    /// Already in the desired state.
    Noop,
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannedAction::Create => write!(f, "create"),
            PlannedAction::Update { config, event } => {
                let changed: Vec<&str> = [("config", *config), ("event", *event)]
                    .into_iter()
                    .filter_map(|(name, drifted)| drifted.then_some(name))
                    .collect();
                write!(f, "update ({})", changed.join(", "))
            }
            PlannedAction::Destroy => write!(f, "destroy"),
            PlannedAction::Noop => write!(f, "noop"),
        }
    }
}

/// How a check ended up after the pass.
#[derive(Debug)]
pub enum OutcomeStatus {
    /// Dry run: the action was decided but nothing was written.
    Planned,
    /// The action was committed (or there was nothing to commit).
    Committed(FlushOutcome),
    /// Discovery, staging or commit failed for this check.
    Failed(CheckConfError),
}

/// Result of reconciling one check.
#[derive(Debug)]
pub struct ResourceOutcome {
    pub name: String,
    pub action: PlannedAction,
    pub status: OutcomeStatus,
}

impl ResourceOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&CheckConfError> {
        match &self.status {
            OutcomeStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-check outcomes of one reconciliation pass, sorted by check name.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub dry_run: bool,
    pub outcomes: Vec<ResourceOutcome>,
}

impl ReconcileReport {
    pub fn get(&self, name: &str) -> Option<&ResourceOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Checks whose action was something other than a no-op.
    pub fn changed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.action != PlannedAction::Noop && !o.is_failed())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Runs reconciliation passes against one set of path defaults.
pub struct Reconciler {
    fspaths: Fspaths,
}

impl Reconciler {
    pub fn new(fspaths: Fspaths) -> Self {
        Self { fspaths }
    }

    /// A reconciler using the path defaults from the catalog's settings.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.fspaths())
    }

    pub fn fspaths(&self) -> &Fspaths {
        &self.fspaths
    }

    /// Decides what each check needs without writing anything.
    pub fn plan(&self, catalog: &Catalog) -> Result<ReconcileReport> {
        self.run(catalog, true)
    }

    /// Runs a full pass and commits every change.
    pub fn apply(&self, catalog: &Catalog) -> Result<ReconcileReport> {
        self.run(catalog, false)
    }

    fn run(&self, catalog: &Catalog, dry_run: bool) -> Result<ReconcileReport> {
        let _span = tracing::info_span!("reconcile.pass", dry_run).entered();

        CatalogValidator::new().validate(catalog)?;

        let mut outcomes = Vec::with_capacity(catalog.len());
        for (base_path, desired) in catalog.by_base_path(&self.fspaths) {
            let (mut records, mut failed) = self.prefetch(&base_path, &desired);
            outcomes.append(&mut failed);

            for (name, record) in records.iter_mut() {
                outcomes.push(self.reconcile_one(name, record, dry_run));
            }
        }
        outcomes.sort_by(|a, b| a.name.cmp(&b.name));

        let report = ReconcileReport { dry_run, outcomes };
        info!(
            "Reconciled {} checks: {} changed, {} failed",
            report.outcomes.len(),
            report.changed(),
            report.failed()
        );
        Ok(report)
    }

    /// Discovers one directory and binds the result to its desired checks.
    ///
    /// A check whose file could not be read is reported as failed and left
    /// out of the pass, since its current state is unknown.
    fn prefetch(
        &self,
        base_path: &Path,
        desired: &BTreeMap<String, DesiredCheck>,
    ) -> (BTreeMap<String, CheckRecord>, Vec<ResourceOutcome>) {
        let mut discovered = Vec::new();
        let mut unreadable: BTreeMap<String, CheckConfError> = BTreeMap::new();
        let mut directory_error: Option<(PathBuf, io::Error)> = None;

        let _span = tracing::info_span!("discovery.scan", dir = %base_path.display()).entered();
        for item in discover_all(base_path) {
            match item {
                Ok(record) => discovered.push(record),
                Err(CheckConfError::ReadFile { path, source }) => {
                    let name = check_name_from_path(&path);
                    match name {
                        Some(name) if desired.contains_key(&name) => {
                            unreadable.insert(name, CheckConfError::ReadFile { path, source });
                        }
                        _ => debug!("Ignoring unreadable unmanaged file {}", path.display()),
                    }
                }
                Err(CheckConfError::ReadDirectory { path, source }) => {
                    warn!("Failed to list {}: {}", path.display(), source);
                    directory_error = Some((path, source));
                }
                Err(e) => warn!("Discovery error in {}: {}", base_path.display(), e),
            }
        }

        let mut failed = Vec::new();

        if let Some((path, source)) = directory_error {
            for name in desired.keys() {
                failed.push(ResourceOutcome {
                    name: name.clone(),
                    action: PlannedAction::Noop,
                    status: OutcomeStatus::Failed(CheckConfError::ReadDirectory {
                        path: path.clone(),
                        source: io::Error::new(source.kind(), source.to_string()),
                    }),
                });
            }
            return (BTreeMap::new(), failed);
        }

        let mut records = bind(discovered, desired, &self.fspaths);
        for (name, error) in unreadable {
            warn!("Skipping check '{}': {}", name, error);
            records.remove(&name);
            failed.push(ResourceOutcome {
                name,
                action: PlannedAction::Noop,
                status: OutcomeStatus::Failed(error),
            });
        }

        (records, failed)
    }

    fn reconcile_one(&self, name: &str, record: &mut CheckRecord, dry_run: bool) -> ResourceOutcome {
        let action = match record.desired() {
            Some(desired) => decide(record, desired),
            None => PlannedAction::Noop,
        };

        let status = if dry_run {
            OutcomeStatus::Planned
        } else {
            match self.commit(record, action) {
                Ok(outcome) => OutcomeStatus::Committed(outcome),
                Err(e) => {
                    warn!("Failed to reconcile check '{}': {}", name, e);
                    OutcomeStatus::Failed(e)
                }
            }
        };

        if action != PlannedAction::Noop {
            info!("Check '{}': {}", name, action);
        }

        ResourceOutcome {
            name: name.to_string(),
            action,
            status,
        }
    }

    /// Stages the action on the record, then flushes it.
    fn commit(&self, record: &mut CheckRecord, action: PlannedAction) -> Result<FlushOutcome> {
        match action {
            PlannedAction::Noop => return Ok(FlushOutcome::Unchanged),
            PlannedAction::Create => record.create()?,
            PlannedAction::Destroy => record.destroy(),
            PlannedAction::Update { config, event } => {
                let desired = record
                    .desired()
                    .cloned()
                    .ok_or_else(|| CheckConfError::NotBound(record.name().to_string()))?;
                if config {
                    record.set_config(desired.config);
                }
                if event {
                    record.set_event(desired.event);
                }
            }
        }
        record.flush(&self.fspaths)
    }
}

/// Compares current and desired state for one bound record.
pub fn decide(record: &CheckRecord, desired: &DesiredCheck) -> PlannedAction {
    match (desired.ensure, record.exists()) {
        (Ensure::Present, false) => PlannedAction::Create,
        (Ensure::Present, true) => {
            let config = !record.config().in_sync_with(&desired.config);
            let event = !record.event().in_sync_with(&desired.event);
            if config || event {
                PlannedAction::Update { config, event }
            } else {
                PlannedAction::Noop
            }
        }
        (Ensure::Absent, true) => PlannedAction::Destroy,
        (Ensure::Absent, false) => PlannedAction::Noop,
    }
}
