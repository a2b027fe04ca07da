//! Immutable context chains for request-scoped runtimes
//!
//! A [`Context`] is a chain of scopes built by wrapping a parent: value
//! bindings, cancellation and deadlines. This crate owns the node model, so
//! tools can walk a chain's full ancestry, resolve keys with exact shadowing
//! semantics, and flatten a deep chain into a single cache-friendly scope.
//!
//! ```rust
//! use std::time::Duration;
//! use ctxchain::{Context, ScopeKind, WalkControl, walk};
//!
//! let (ctx, _cancel) = Context::background()
//!     .with_value("Hello", "World!")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let mut kinds = Vec::new();
//! walk(&ctx, |node| {
//!     kinds.push(node.kind());
//!     Ok::<_, ctxchain::ScopeError>(WalkControl::Continue)
//! })?;
//! assert_eq!(
//!     kinds,
//!     vec![Some(ScopeKind::Deadline), Some(ScopeKind::Value), Some(ScopeKind::Root)]
//! );
//! # Ok::<(), ctxchain::ScopeError>(())
//! ```

pub mod core;
pub mod flatten;
pub mod info;
pub mod resolver;
pub mod scope;
pub mod walker;

// Re-export main types
pub use crate::core::{ErrorCode, Opaque, Result, ScopeError, safe_equal};
pub use flatten::{FlattenConfig, FlattenMode, flatten, flatten_with};
pub use info::{ScopeInfo, bindings, chain_info};
pub use resolver::{resolve, resolve_as};
pub use scope::{
    Binding, CancelHandle, Context, DoneReason, ForeignScope, ScopeKind, ScopeNode,
};
pub use walker::{Ancestors, WalkControl, walk, walk_values};
