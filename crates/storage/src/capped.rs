//! Capped eviction
//!
//! After an insert or update, a capped table evicts its oldest records one
//! at a time until it is back under both ceilings. Eviction is strictly by
//! identifier order, never by size or recency, so log-typed readers keep
//! oldest-first retention.
//!
//! Each eviction is an ordinary journaled remove, so a failure partway
//! through (the hook refusing a delete) leaves a valid, partially evicted
//! table that the enclosing transaction can still roll back.

use crate::journal::RecoveryUnit;
use crate::store::RecordStore;
use memrec_core::invariant::invariant_violation;
use memrec_core::StoreResult;
use tracing::debug;

impl RecordStore {
    /// Whether the table is currently over a capped ceiling
    pub fn capped_and_need_delete(&self) -> bool {
        let Some(capped) = self.capped else {
            return false;
        };
        let table = self.shared_table();
        let data = table.read();
        capped.is_exceeded(data.data_size, data.records.len() as u64)
    }

    /// Evict oldest records until the table fits its ceilings
    ///
    /// The capped-delete hook runs before each eviction, with no table lock
    /// held. Its error stops eviction and is returned as-is.
    pub(crate) fn capped_delete_as_needed(&self, txn: &mut dyn RecoveryUnit) -> StoreResult<()> {
        let table = self.shared_table();

        while self.capped_and_need_delete() {
            let (id, oldest) = {
                let data = table.read();
                match data.records.iter().next() {
                    Some((id, rec)) => (*id, rec.clone()),
                    None => invariant_violation(format_args!(
                        "{}: capped table over its ceiling with no records",
                        self.ns()
                    )),
                }
            };

            if let Some(hook) = &self.capped_delete_hook {
                hook.about_to_delete_capped(id, &oldest)?;
            }

            table.remove(txn, id);
            debug!(
                target: "memrec::storage",
                ns = %self.ns(),
                id = %id,
                size = oldest.size(),
                "Evicted oldest capped record"
            );
        }

        Ok(())
    }
}
