//! Ordered cursors with save/restore
//!
//! A cursor walks the table in identifier order (forward) or reverse
//! identifier order, reading through the shared table handle. Nothing is
//! snapshotted: between `save()` and `restore()` the table may gain or lose
//! arbitrary records, and `restore()` re-resolves the position by key.
//!
//! # State machine
//!
//! ```text
//!              advance / seek hit             advance past last
//!   Unseeked ---------------------> Positioned ----------------> AtEnd
//!                                    ^    |
//!           restore, exact hit       |    | restore, saved record gone
//!                                    |    v
//!                                   PostRestore
//! ```
//!
//! `PostRestore` means the restore already landed on the element the next
//! `advance()` must return, so that `advance()` does not move.
//!
//! # Restore rules
//!
//! - Nothing saved: reposition to end, succeed
//! - Forward: land on the first record with id >= saved
//! - Reverse: land on the first record with id <= saved
//! - Capped tables: if the saved record itself is gone, fail instead of
//!   skipping ahead; the reader lost its position to eviction

use crate::table::{RecordTable, Records};
use memrec_core::{Record, RecordId};
use std::ops::Bound;

/// Iteration direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending identifiers
    Forward,
    /// Descending identifiers
    Reverse,
}

impl Direction {
    fn first(self, records: &Records) -> Option<RecordId> {
        match self {
            Direction::Forward => records.keys().next().copied(),
            Direction::Reverse => records.keys().next_back().copied(),
        }
    }

    fn step(self, records: &Records, from: RecordId) -> Option<RecordId> {
        match self {
            Direction::Forward => records
                .range((Bound::Excluded(from), Bound::Unbounded))
                .next()
                .map(|(id, _)| *id),
            Direction::Reverse => records.range(..from).next_back().map(|(id, _)| *id),
        }
    }

    /// Nearest record at or beyond `saved`, looking in this direction
    fn resume_at(self, records: &Records, saved: RecordId) -> Option<RecordId> {
        match self {
            Direction::Forward => records.range(saved..).next().map(|(id, _)| *id),
            Direction::Reverse => records.range(..=saved).next_back().map(|(id, _)| *id),
        }
    }
}

/// Where a cursor currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Nothing read yet; the next `advance()` starts at the first record
    Unseeked,
    /// On a record
    Positioned(RecordId),
    /// A restore landed here (or at end, for `None`); the next `advance()`
    /// returns this position without moving
    PostRestore(Option<RecordId>),
    /// Iteration exhausted
    AtEnd,
}

/// Seekable cursor over a record table
///
/// Also an `Iterator` over records; `next()` is `advance()`.
#[derive(Debug)]
pub struct RecordCursor {
    table: RecordTable,
    direction: Direction,
    capped: bool,
    state: CursorState,
    saved: Option<RecordId>,
}

impl RecordCursor {
    /// Cursor over `table`; `capped` selects the fail-on-lost-position rule
    pub fn new(table: RecordTable, direction: Direction, capped: bool) -> Self {
        Self {
            table,
            direction,
            capped,
            state: CursorState::Unseeked,
            saved: None,
        }
    }

    /// Iteration direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current state
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Record id the cursor is on, if positioned
    pub fn current(&self) -> Option<RecordId> {
        match self.state {
            CursorState::Positioned(id) => Some(id),
            _ => None,
        }
    }

    /// Position recorded by the last effective `save()`
    pub fn saved_position(&self) -> Option<RecordId> {
        self.saved
    }

    /// Next record in iteration order, or `None` at end
    pub fn advance(&mut self) -> Option<Record> {
        let data = self.table.read();
        let records = &data.records;

        let next = match self.state {
            CursorState::Unseeked => self.direction.first(records),
            CursorState::Positioned(id) => self.direction.step(records, id),
            // Re-resolved in case the landing record went away meanwhile
            CursorState::PostRestore(landed) => {
                landed.and_then(|id| self.direction.resume_at(records, id))
            }
            CursorState::AtEnd => None,
        };

        match next {
            Some(id) => {
                self.state = CursorState::Positioned(id);
                records.get(&id).map(|rec| Record::new(id, rec.clone()))
            }
            None => {
                self.state = CursorState::AtEnd;
                None
            }
        }
    }

    /// Position exactly on `id`
    ///
    /// On a miss the cursor is left at end; `advance()` after a failed seek
    /// carries no ordering guarantee.
    pub fn seek_exact(&mut self, id: RecordId) -> Option<Record> {
        let found = self.table.lookup(id);
        self.state = match found {
            Some(_) => CursorState::Positioned(id),
            None => CursorState::AtEnd,
        };
        found.map(|rec| Record::new(id, rec))
    }

    /// Remember the current position for a later `restore()`
    ///
    /// No-op before the first move and right after a restore, so repeated
    /// save/restore cycles keep the originally saved key.
    pub fn save(&mut self) {
        match self.state {
            CursorState::Positioned(id) => self.saved = Some(id),
            CursorState::AtEnd => self.saved = None,
            CursorState::Unseeked | CursorState::PostRestore(_) => {}
        }
    }

    /// Forget any saved position; `restore()` will go to end
    pub fn save_unpositioned(&mut self) {
        self.saved = None;
    }

    /// Reposition after the table may have changed
    ///
    /// Returns `false` only for capped tables whose saved record has been
    /// removed; the caller must treat that as lost position.
    pub fn restore(&mut self) -> bool {
        let Some(saved) = self.saved else {
            if self.state != CursorState::Unseeked {
                self.state = CursorState::AtEnd;
            }
            return true;
        };

        let landed = {
            let data = self.table.read();
            self.direction.resume_at(&data.records, saved)
        };

        if landed == Some(saved) {
            self.state = CursorState::Positioned(saved);
            true
        } else {
            self.state = CursorState::PostRestore(landed);
            !self.capped
        }
    }
}

impl Iterator for RecordCursor {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.advance()
    }
}
