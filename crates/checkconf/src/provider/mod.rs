//! JSON-file provider for check configuration.
//!
//! A reconciliation pass runs in four phases:
//! - [`discover_all`] reads every `config_<name>.json` in a directory
//! - [`bind`] matches discovered records to desired checks by name
//! - the staging setters accumulate writes in each record's pending document
//! - [`CheckRecord::flush`] performs one write or one delete per record

pub mod commit;
pub mod discovery;
pub mod matcher;
pub mod record;
pub mod staging;

pub use commit::FlushOutcome;
pub use discovery::{
    check_name_from_path, discover_all, list_checks, load_json, Discovery, FILE_PREFIX,
    FILE_SUFFIX,
};
pub use matcher::bind;
pub use record::{CheckRecord, Ensure, JsonMap, PropertyValue, CHECKS_KEY};
