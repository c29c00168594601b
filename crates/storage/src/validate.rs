//! Full-table validation
//!
//! Walks every record in identifier order, optionally handing each payload
//! to a [`RecordValidator`], and cross-checks the tracked byte count against
//! the payloads actually stored. Problems are accumulated, never returned
//! early, so one pass reports everything wrong with the table.

use crate::store::RecordStore;
use memrec_core::RecordValidator;
use serde::Serialize;
use tracing::warn;

/// Outcome of [`RecordStore::validate`]
///
/// `valid` is false as soon as any error was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateResults {
    /// No errors found
    pub valid: bool,
    /// One description per problem, in discovery order
    pub errors: Vec<String>,
    /// Records visited
    pub record_count: u64,
}

impl ValidateResults {
    /// A clean result with nothing visited
    pub fn ok() -> Self {
        ValidateResults {
            valid: true,
            errors: Vec::new(),
            record_count: 0,
        }
    }

    /// Record a problem
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.errors.push(error.into());
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Fold another result into this one
    ///
    /// Used to combine the results of several stores into one report.
    pub fn merge(&mut self, other: ValidateResults) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.record_count += other.record_count;
    }

    /// Number of problems found
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl Default for ValidateResults {
    fn default() -> Self {
        Self::ok()
    }
}

impl RecordStore {
    /// Validate every record
    ///
    /// With `scan_payloads` set and a `validator` given, each payload is
    /// checked; failures are logged and collected. The byte count is always
    /// cross-checked.
    pub fn validate(
        &self,
        scan_payloads: bool,
        validator: Option<&dyn RecordValidator>,
    ) -> ValidateResults {
        let (records, tracked_size) = self.shared_table().snapshot();
        let mut results = ValidateResults::ok();
        let mut actual_size = 0u64;

        for (id, data) in &records {
            results.record_count += 1;
            actual_size += data.size();

            if !scan_payloads {
                continue;
            }
            if let Some(validator) = validator {
                if let Err(reason) = validator.validate(*id, data) {
                    warn!(
                        target: "memrec::storage",
                        ns = %self.ns(),
                        id = %id,
                        reason = %reason,
                        "Invalid record"
                    );
                    results.add_error(format!("record {} is not valid: {}", id, reason));
                }
            }
        }

        if actual_size != tracked_size {
            warn!(
                target: "memrec::storage",
                ns = %self.ns(),
                tracked = tracked_size,
                actual = actual_size,
                "Data size mismatch"
            );
            results.add_error(format!(
                "data size {} does not match stored payloads totalling {}",
                tracked_size, actual_size
            ));
        }

        results
    }
}
