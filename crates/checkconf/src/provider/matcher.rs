//! Binds discovered records to desired resources by name.

use std::collections::BTreeMap;

use log::debug;

use super::record::CheckRecord;
use crate::catalog::DesiredCheck;
use crate::fspaths::Fspaths;

/// Matches discovered records to desired checks.
///
/// Every desired check gets exactly one bound record back: the discovered
/// one when a file with its name was found, otherwise a fresh absent record
/// built from the desired intent. Discovered records with no desired
/// counterpart are dropped. No filesystem I/O happens here.
pub fn bind<I>(
    discovered: I,
    desired: &BTreeMap<String, DesiredCheck>,
    fspaths: &Fspaths,
) -> BTreeMap<String, CheckRecord>
where
    I: IntoIterator<Item = CheckRecord>,
{
    let mut bound = BTreeMap::new();

    for mut record in discovered {
        match desired.get(record.name()) {
            Some(check) => {
                record.bind_to(check, fspaths);
                bound.insert(record.name().to_string(), record);
            }
            None => {
                debug!("Ignoring unmanaged check '{}'", record.name());
            }
        }
    }

    for (name, check) in desired {
        if bound.contains_key(name) {
            continue;
        }
        let mut record = CheckRecord::absent(check);
        record.bind_to(check, fspaths);
        bound.insert(name.clone(), record);
    }

    bound
}
