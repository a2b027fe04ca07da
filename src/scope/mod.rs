//! Scope node model and the wrap constructors that build chains

pub mod foreign;
pub mod node;
pub mod signal;

pub use foreign::ForeignScope;
pub use node::{
    Binding, Bindings, CancelScope, Context, DeadlineScope, FlattenedValueScope, ScopeKind,
    ScopeNode, ValueScope, INLINE_BINDINGS,
};
pub use signal::{CancelHandle, DoneReason};
