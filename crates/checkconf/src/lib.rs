//! Declarative management of Sensu check configuration files.
//!
//! Each check lives in its own `config_<name>.json` under the checks
//! directory. A [`Reconciler`] pass discovers those files, binds them to the
//! desired checks of a [`Catalog`], stages the changes in memory and commits
//! each file with a single write or delete.

pub mod catalog;
pub mod cli;
pub mod error;
pub mod fspaths;
pub mod logging;
pub mod provider;
pub mod reconciler;

pub use catalog::{Catalog, CatalogValidator, DesiredCheck, ManifestLoader};
pub use error::{CheckConfError, Result};
pub use fspaths::{Fspaths, Platform};
pub use provider::{CheckRecord, Ensure, FlushOutcome, JsonMap, PropertyValue};
pub use reconciler::{OutcomeStatus, PlannedAction, ReconcileReport, Reconciler, ResourceOutcome};
