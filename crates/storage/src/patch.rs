//! In-place patches
//!
//! A patch list describes byte-range copies from a caller-owned source
//! buffer onto a copy of a record's base bytes. Patches apply in list
//! order, so later ones may overwrite earlier ones.

use crate::journal::RecoveryUnit;
use crate::store::RecordStore;
use memrec_core::invariant;
use memrec_core::{RecordData, RecordId, StoreResult, UpdateNotifier};
use serde::{Deserialize, Serialize};

/// One byte-range copy: `source[source_offset..][..size]` onto
/// `target[target_offset..][..size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Offset into the source buffer
    pub source_offset: usize,
    /// Offset into the record
    pub target_offset: usize,
    /// Number of bytes
    pub size: usize,
}

impl Patch {
    /// Build a patch
    pub fn new(source_offset: usize, target_offset: usize, size: usize) -> Self {
        Self {
            source_offset,
            target_offset,
            size,
        }
    }
}

/// Apply `patches` to a copy of `base`
///
/// Out-of-range patches are a caller bug.
pub fn apply_to(base: &[u8], source: &[u8], patches: &[Patch]) -> Vec<u8> {
    let mut out = base.to_vec();
    for patch in patches {
        invariant!(
            patch.source_offset.checked_add(patch.size).map_or(false, |end| end <= source.len()),
            "patch {:?} reads past source of {} bytes",
            patch,
            source.len()
        );
        invariant!(
            patch.target_offset.checked_add(patch.size).map_or(false, |end| end <= out.len()),
            "patch {:?} writes past record of {} bytes",
            patch,
            out.len()
        );
        out[patch.target_offset..patch.target_offset + patch.size]
            .copy_from_slice(&source[patch.source_offset..patch.source_offset + patch.size]);
    }
    out
}

impl RecordStore {
    /// Rebuild the record at `id` from `base` plus `patches`
    ///
    /// `base` is the payload the caller read and computed the patches
    /// against. The record must exist. The previous payload is journaled,
    /// the patched copy replaces it, and capped eviction runs afterwards.
    ///
    /// # Errors
    ///
    /// - `ExceedsCapacity` / `CappedGrowthNotAllowed`: as for updates, if
    ///   `base` is larger than the stored record
    /// - whatever the notifier or the capped-delete hook returns
    pub fn apply_patches(
        &self,
        txn: &mut dyn RecoveryUnit,
        id: RecordId,
        base: &[u8],
        source: &[u8],
        patches: &[Patch],
        notifier: Option<&dyn UpdateNotifier>,
    ) -> StoreResult<RecordData> {
        let old = self.data_for(id);
        self.check_capped_update(id, old.size(), base.len() as u64)?;

        let patched = RecordData::from(apply_to(base, source, patches));

        if let Some(notifier) = notifier {
            notifier.going_to_update_in_place(id)?;
        }

        self.shared_table().replace(txn, id, patched.clone());
        self.capped_delete_as_needed(txn)?;
        Ok(patched)
    }
}
