//! Nearest-binding lookup with scope shadowing

use crate::core::{Opaque, Result, ScopeError, safe_equal};
use crate::scope::Context;
use crate::walker::{WalkControl, walk_values};

/// Find the binding for `key` nearest to the leaf of `ctx`
///
/// Returns `Ok(None)` when no scope binds `key`. The walk stops at the first
/// match, so shadowed bindings further up the chain are never inspected.
pub fn resolve(ctx: &Context, key: &Opaque) -> Result<Option<Opaque>> {
    let mut found = None;
    walk_values(ctx, |candidate, value| {
        if safe_equal(candidate, key) {
            found = Some(value.clone());
            return Ok::<_, ScopeError>(WalkControl::Stop);
        }
        Ok(WalkControl::Continue)
    })?;
    Ok(found)
}

/// Resolve `key` and clone the value out if it has type `T`
///
/// A binding of a different type still shadows outer bindings: the result is
/// `Ok(None)` rather than a search further up the chain.
pub fn resolve_as<T: Clone + 'static>(ctx: &Context, key: &Opaque) -> Result<Option<T>> {
    Ok(resolve(ctx, key)?.and_then(|value| value.downcast_ref::<T>().cloned()))
}

impl Context {
    /// Look up the effective value bound to `key`
    pub fn value(&self, key: impl Into<Opaque>) -> Result<Option<Opaque>> {
        resolve(self, &key.into())
    }

    /// Look up the effective value bound to `key` as a `T`
    pub fn value_as<T: Clone + 'static>(&self, key: impl Into<Opaque>) -> Result<Option<T>> {
        resolve_as(self, &key.into())
    }
}
