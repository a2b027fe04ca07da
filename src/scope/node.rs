//! Scope node model
//!
//! A context is an immutable, singly linked chain of scope nodes ending at a
//! root. Each wrap operation allocates one new node that holds a shared
//! reference to its parent; existing nodes are never mutated, so a parent can
//! back any number of child chains across threads without locking.

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::foreign::ForeignScope;
use super::signal::{CancelHandle, CancelSignal, DoneReason};
use crate::core::Opaque;

/// Inline capacity of a flattened scope's binding array
pub const INLINE_BINDINGS: usize = 4;

/// Ordered binding storage of a flattened scope
pub type Bindings = SmallVec<[Binding; INLINE_BINDINGS]>;

/// The closed set of scope kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Origin of a chain; has no parent
    Root,
    /// Adds a cancellation capability
    Cancel,
    /// Adds a deadline (and cancellation) capability
    Deadline,
    /// Binds one key to one value
    Value,
    /// Binds an ordered batch of pairs, nearest binding first
    FlattenedValue,
}

impl ScopeKind {
    /// Whether scopes of this kind carry value bindings
    pub fn carries_values(&self) -> bool {
        matches!(self, ScopeKind::Value | ScopeKind::FlattenedValue)
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Root => write!(f, "root"),
            ScopeKind::Cancel => write!(f, "cancel"),
            ScopeKind::Deadline => write!(f, "deadline"),
            ScopeKind::Value => write!(f, "value"),
            ScopeKind::FlattenedValue => write!(f, "flattened-value"),
        }
    }
}

/// A single key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub key: Opaque,
    pub value: Opaque,
}

impl Binding {
    pub fn new(key: impl Into<Opaque>, value: impl Into<Opaque>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub struct CancelScope {
    parent: Context,
    signal: Arc<CancelSignal>,
}

impl CancelScope {
    pub fn parent(&self) -> &Context {
        &self.parent
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

pub struct DeadlineScope {
    parent: Context,
    deadline: Instant,
    signal: Arc<CancelSignal>,
}

impl DeadlineScope {
    pub fn parent(&self) -> &Context {
        &self.parent
    }

    /// Deadline set by this scope alone (ancestors may set an earlier one)
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

pub struct ValueScope {
    parent: Context,
    binding: Binding,
}

impl ValueScope {
    pub fn parent(&self) -> &Context {
        &self.parent
    }

    pub fn key(&self) -> &Opaque {
        &self.binding.key
    }

    pub fn value(&self) -> &Opaque {
        &self.binding.value
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }
}

pub struct FlattenedValueScope {
    parent: Context,
    bindings: Bindings,
}

impl FlattenedValueScope {
    pub fn parent(&self) -> &Context {
        &self.parent
    }

    /// Bindings ordered nearest-first; the first match for a key wins
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

/// One node of a context chain
pub enum ScopeNode {
    Root,
    Cancel(CancelScope),
    Deadline(DeadlineScope),
    Value(ValueScope),
    FlattenedValue(FlattenedValueScope),
    /// Node bridged in from an implementation outside the closed kind set
    Foreign(Arc<dyn ForeignScope>),
}

impl ScopeNode {
    /// Classify the node; `None` for foreign nodes
    pub fn kind(&self) -> Option<ScopeKind> {
        match self {
            ScopeNode::Root => Some(ScopeKind::Root),
            ScopeNode::Cancel(_) => Some(ScopeKind::Cancel),
            ScopeNode::Deadline(_) => Some(ScopeKind::Deadline),
            ScopeNode::Value(_) => Some(ScopeKind::Value),
            ScopeNode::FlattenedValue(_) => Some(ScopeKind::FlattenedValue),
            ScopeNode::Foreign(_) => None,
        }
    }

    /// Next node toward the root; `None` for the root and for foreign nodes
    pub fn parent(&self) -> Option<&Context> {
        match self {
            ScopeNode::Root | ScopeNode::Foreign(_) => None,
            ScopeNode::Cancel(scope) => Some(&scope.parent),
            ScopeNode::Deadline(scope) => Some(&scope.parent),
            ScopeNode::Value(scope) => Some(&scope.parent),
            ScopeNode::FlattenedValue(scope) => Some(&scope.parent),
        }
    }

    /// Number of bindings this node carries
    pub fn binding_count(&self) -> usize {
        match self {
            ScopeNode::Value(_) => 1,
            ScopeNode::FlattenedValue(scope) => scope.bindings.len(),
            _ => 0,
        }
    }
}

// Parents are omitted so that printing a node never recurses through the chain.
impl fmt::Debug for ScopeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeNode::Root => f.write_str("RootScope"),
            ScopeNode::Cancel(scope) => f
                .debug_struct("CancelScope")
                .field("cancelled", &scope.is_cancelled())
                .finish_non_exhaustive(),
            ScopeNode::Deadline(scope) => f
                .debug_struct("DeadlineScope")
                .field("deadline", &scope.deadline)
                .field("cancelled", &scope.is_cancelled())
                .finish_non_exhaustive(),
            ScopeNode::Value(scope) => f
                .debug_struct("ValueScope")
                .field("key", scope.key())
                .field("value", scope.value())
                .finish_non_exhaustive(),
            ScopeNode::FlattenedValue(scope) => f
                .debug_struct("FlattenedValueScope")
                .field("bindings", &scope.bindings)
                .finish_non_exhaustive(),
            ScopeNode::Foreign(scope) => fmt::Debug::fmt(scope, f),
        }
    }
}

// Stands in for a parent link while a node is being torn down.
static DETACHED: LazyLock<Context> = LazyLock::new(Context::background);

impl ScopeNode {
    fn take_parent(&mut self) -> Option<Context> {
        let slot = match self {
            ScopeNode::Root | ScopeNode::Foreign(_) => return None,
            ScopeNode::Cancel(scope) => &mut scope.parent,
            ScopeNode::Deadline(scope) => &mut scope.parent,
            ScopeNode::Value(scope) => &mut scope.parent,
            ScopeNode::FlattenedValue(scope) => &mut scope.parent,
        };
        if slot.ptr_eq(&DETACHED) {
            return None;
        }
        Some(std::mem::replace(slot, DETACHED.clone()))
    }
}

// Unlinks uniquely owned ancestors one at a time; the default recursive drop
// needs one stack frame per scope and overflows on deep chains.
impl Drop for ScopeNode {
    fn drop(&mut self) {
        let mut next = self.take_parent();
        while let Some(parent) = next {
            next = Arc::into_inner(parent.node).and_then(|mut node| node.take_parent());
        }
    }
}

/// Shared handle to the head of a context chain
///
/// Cloning is a reference count bump; the chain itself is never copied.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use ctxchain::{Context, Opaque};
///
/// let (ctx, _cancel) = Context::background()
///     .with_value("Hello", "World!")
///     .with_timeout(Duration::from_secs(60));
///
/// let value = ctx.value("Hello").unwrap();
/// assert_eq!(value, Some(Opaque::from("World!")));
/// ```
#[derive(Clone)]
pub struct Context {
    node: Arc<ScopeNode>,
}

impl Context {
    fn from_node(node: ScopeNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Create a new chain origin
    pub fn background() -> Self {
        Self::from_node(ScopeNode::Root)
    }

    /// Bridge a third-party scope into a chain
    pub fn from_foreign(scope: Arc<dyn ForeignScope>) -> Self {
        Self::from_node(ScopeNode::Foreign(scope))
    }

    /// Wrap with a single key/value binding
    pub fn with_value(&self, key: impl Into<Opaque>, value: impl Into<Opaque>) -> Context {
        Self::from_node(ScopeNode::Value(ValueScope {
            parent: self.clone(),
            binding: Binding::new(key, value),
        }))
    }

    /// Wrap with a cancellation capability
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let (handle, signal) = CancelHandle::new();
        let ctx = Self::from_node(ScopeNode::Cancel(CancelScope {
            parent: self.clone(),
            signal,
        }));
        (ctx, handle)
    }

    /// Wrap with a deadline capability
    pub fn with_deadline(&self, deadline: Instant) -> (Context, CancelHandle) {
        let (handle, signal) = CancelHandle::new();
        let ctx = Self::from_node(ScopeNode::Deadline(DeadlineScope {
            parent: self.clone(),
            deadline,
            signal,
        }));
        (ctx, handle)
    }

    /// Wrap with a deadline `timeout` from now
    ///
    /// A timeout past the representable range of [`Instant`] never expires and
    /// produces a plain cancel scope.
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.with_cancel(),
        }
    }

    pub(crate) fn with_bindings(parent: Context, bindings: Bindings) -> Context {
        Self::from_node(ScopeNode::FlattenedValue(FlattenedValueScope {
            parent,
            bindings,
        }))
    }

    pub fn node(&self) -> &ScopeNode {
        &self.node
    }

    pub fn kind(&self) -> Option<ScopeKind> {
        self.node.kind()
    }

    pub fn parent(&self) -> Option<Context> {
        self.node.parent().cloned()
    }

    /// Whether both handles point at the same node
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Earliest deadline among the reachable scopes
    pub fn deadline(&self) -> Option<Instant> {
        self.reachable()
            .filter_map(|ctx| match ctx.node() {
                ScopeNode::Deadline(scope) => Some(scope.deadline),
                _ => None,
            })
            .min()
    }

    /// Why this context is done, if it is
    ///
    /// Explicit cancellation anywhere on the reachable chain wins over an
    /// expired deadline.
    pub fn done_reason(&self) -> Option<DoneReason> {
        let mut expired = false;
        let now = Instant::now();
        for ctx in self.reachable() {
            match ctx.node() {
                ScopeNode::Cancel(scope) if scope.is_cancelled() => {
                    return Some(DoneReason::Cancelled);
                }
                ScopeNode::Deadline(scope) => {
                    if scope.is_cancelled() {
                        return Some(DoneReason::Cancelled);
                    }
                    expired |= scope.deadline <= now;
                }
                _ => {}
            }
        }
        expired.then_some(DoneReason::DeadlineExceeded)
    }

    pub fn is_done(&self) -> bool {
        self.done_reason().is_some()
    }

    // Capability queries stop quietly at a foreign scope: its capabilities are
    // not observable from here.
    fn reachable(&self) -> impl Iterator<Item = Context> {
        self.ancestors().map_while(Result::ok)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.node(), f)
    }
}
