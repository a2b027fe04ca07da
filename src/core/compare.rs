//! Safe equality comparator for opaque values
//!
//! `safe_equal` is total: it never panics and never propagates a panic raised
//! by a caller-supplied `PartialEq` implementation. Policy, in order:
//!
//! 1. Same stored value (same allocation) is equal. This keeps the relation
//!    reflexive for values such as `f64::NAN`.
//! 2. Different concrete types are unequal.
//! 3. Two structurally comparable values are compared with `PartialEq`.
//!    If that comparison panics the result falls back to identity, which at
//!    this point is `false`.
//! 4. Anything else compares by identity only.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::opaque::Opaque;

/// Compare two opaque values without ever aborting the calling thread
pub fn safe_equal(a: &Opaque, b: &Opaque) -> bool {
    if a.ptr_eq(b) {
        return true;
    }

    let (left, right) = (a.erased(), b.erased());
    if left.value_type_id() != right.value_type_id() {
        return false;
    }

    if !(left.is_comparable() && right.is_comparable()) {
        return false;
    }

    match catch_unwind(AssertUnwindSafe(|| left.structural_eq(right.as_any()))) {
        Ok(equal) => equal,
        Err(_) => {
            log::warn!(
                "structural comparison of {} panicked; falling back to identity",
                left.type_name()
            );
            false
        }
    }
}
