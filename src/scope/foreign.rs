//! Bridge for scope implementations that this crate does not own

use std::fmt;

/// A scope node supplied by a third-party context implementation
///
/// Foreign scopes can sit in a chain (usually as its origin, bridged in from
/// another runtime) but expose no parent link. The walker visits them and then
/// fails with [`ScopeError::UnknownScopeKind`](crate::ScopeError::UnknownScopeKind)
/// instead of guessing at their ancestry.
pub trait ForeignScope: fmt::Debug + Send + Sync {
    /// Concrete type name reported in traversal errors
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
