//! Fatal path for programmer errors
//!
//! Operating on a record that the contract says must exist, allocator
//! exhaustion and similar conditions are caller bugs, not runtime failures.
//! They are logged and then panic; release builds are compiled with
//! `panic = "abort"`, so the process terminates. None of this flows through
//! [`crate::StoreResult`].

use std::fmt;

/// Log an invariant violation and terminate
#[cold]
#[track_caller]
pub fn invariant_violation(what: impl fmt::Display) -> ! {
    let location = std::panic::Location::caller();
    tracing::error!(
        target: "memrec::invariant",
        violation = %what,
        location = %location,
        "Invariant violated"
    );
    panic!("invariant violated: {}", what)
}

/// Check a condition, calling [`invariant_violation`] if it does not hold
///
/// ```should_panic
/// use memrec_core::invariant;
///
/// let records = 0;
/// invariant!(records > 0, "table must not be empty, found {} records", records);
/// ```
#[macro_export]
macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::invariant::invariant_violation(format_args!($($arg)+));
        }
    };
}
