//! Staging setters: accumulate property writes into the pending document.
//!
//! None of these touch the filesystem. Every setter call lands in the same
//! buffer, so the flush that follows writes the whole document at once.

use serde_json::Value;

use super::record::{CheckRecord, JsonMap, PropertyValue, CHECKS_KEY};

impl CheckRecord {
    /// Stages the check configuration block under the check's own key.
    ///
    /// Overwrites any value staged earlier in the same pass.
    pub fn set_config(&mut self, value: JsonMap) {
        self.begin_staging();
        self.pending_write
            .insert(self.name.clone(), Value::Object(value));
    }

    /// Stages the event configuration under `checks.<name>`.
    ///
    /// If `checks` is already a mapping the value is merged in at this
    /// check's key and other entries survive. Anything else at `checks` is
    /// replaced outright.
    pub fn set_event(&mut self, value: JsonMap) {
        self.begin_staging();
        match self.pending_write.get_mut(CHECKS_KEY) {
            Some(Value::Object(checks)) => {
                checks.insert(self.name.clone(), Value::Object(value));
            }
            _ => {
                let mut checks = JsonMap::new();
                checks.insert(self.name.clone(), Value::Object(value));
                self.pending_write
                    .insert(CHECKS_KEY.to_string(), Value::Object(checks));
            }
        }
    }

    /// Marks the record as staged.
    ///
    /// On the first call for a record that exists on disk, the pending
    /// document is seeded with the discovered properties so a pass that
    /// changes one property still writes the other back.
    pub(super) fn begin_staging(&mut self) {
        if self.staged {
            return;
        }
        self.staged = true;

        if !self.exists() {
            return;
        }
        if let PropertyValue::Present(config) = &self.config {
            self.pending_write
                .insert(self.name.clone(), Value::Object(config.clone()));
        }
        if let PropertyValue::Present(event) = &self.event {
            let mut checks = JsonMap::new();
            checks.insert(self.name.clone(), Value::Object(event.clone()));
            self.pending_write
                .insert(CHECKS_KEY.to_string(), Value::Object(checks));
        }
    }
}
