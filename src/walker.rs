//! Root-ward traversal over context chains
//!
//! Every other chain operation is built on [`Ancestors`]: it yields each node
//! from the leaf to the root exactly once, and a node is always yielded
//! *before* it is classified. A foreign node is therefore still visited, and
//! the traversal fails with [`ScopeError::UnknownScopeKind`] on the following
//! step instead of guessing at its parent.
//!
//! Chains built through [`Context`] are acyclic by construction. Cycles can
//! only come from a foreign bridge and are not detected.

use crate::core::{Opaque, Result, ScopeError};
use crate::scope::{Context, ScopeKind, ScopeNode};

/// Visitor decision after seeing a node or binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    Stop,
}

enum Cursor {
    Next(Context),
    Failed(ScopeError),
    Done,
}

/// Iterator over a chain from leaf to root
///
/// Fused: after the root, or after reporting an error, it yields nothing.
pub struct Ancestors {
    cursor: Cursor,
}

impl Ancestors {
    pub fn new(start: &Context) -> Self {
        Self {
            cursor: Cursor::Next(start.clone()),
        }
    }
}

impl Iterator for Ancestors {
    type Item = Result<Context>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => None,
            Cursor::Failed(err) => Some(Err(err)),
            Cursor::Next(current) => {
                self.cursor = match (current.kind(), current.parent()) {
                    (Some(ScopeKind::Root), _) => Cursor::Done,
                    (Some(_), Some(parent)) => Cursor::Next(parent),
                    _ => Cursor::Failed(unknown_scope_kind(&current)),
                };
                Some(Ok(current))
            }
        }
    }
}

impl std::iter::FusedIterator for Ancestors {}

fn unknown_scope_kind(ctx: &Context) -> ScopeError {
    let type_name = match ctx.node() {
        ScopeNode::Foreign(scope) => scope.type_name(),
        _ => std::any::type_name::<ScopeNode>(),
    };
    let err = ScopeError::unknown_scope_kind(type_name, format!("{ctx:?}"));
    log::debug!("{err}; help: {}", err.help());
    err
}

impl Context {
    /// Iterate this chain from the leaf to the root
    pub fn ancestors(&self) -> Ancestors {
        Ancestors::new(self)
    }
}

/// Visit every node from `start` to the root
///
/// Stops early when `visit` returns [`WalkControl::Stop`] or an error; the
/// error is returned unchanged. Reaching a node outside the known kinds fails
/// with [`ScopeError::UnknownScopeKind`] after that node has been visited.
pub fn walk<E, F>(start: &Context, mut visit: F) -> std::result::Result<(), E>
where
    E: From<ScopeError>,
    F: FnMut(&Context) -> std::result::Result<WalkControl, E>,
{
    for node in start.ancestors() {
        let node = node?;
        log::trace!("walk visiting {node:?}");
        if visit(&node)? == WalkControl::Stop {
            break;
        }
    }
    Ok(())
}

/// Visit every binding carried by value scopes, nearest first
///
/// A flattened scope's bindings are expanded in their stored order before the
/// walk continues to its parent.
pub fn walk_values<E, F>(start: &Context, mut visit: F) -> std::result::Result<(), E>
where
    E: From<ScopeError>,
    F: FnMut(&Opaque, &Opaque) -> std::result::Result<WalkControl, E>,
{
    walk(start, |node| match node.node() {
        ScopeNode::Value(scope) => visit(scope.key(), scope.value()),
        ScopeNode::FlattenedValue(scope) => {
            for binding in scope.bindings() {
                if visit(&binding.key, &binding.value)? == WalkControl::Stop {
                    return Ok(WalkControl::Stop);
                }
            }
            Ok(WalkControl::Continue)
        }
        _ => Ok(WalkControl::Continue),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::scope::ForeignScope;

    #[derive(Debug)]
    struct Bridged;

    impl ForeignScope for Bridged {}

    fn kinds(ctx: &Context) -> Result<Vec<Option<ScopeKind>>> {
        let mut seen = Vec::new();
        walk(ctx, |node| {
            seen.push(node.kind());
            Ok::<_, ScopeError>(WalkControl::Continue)
        })?;
        Ok(seen)
    }

    #[test]
    fn test_walk_visits_leaf_to_root() {
        let (cancel, _c) = Context::background().with_cancel();
        let (deadline, _d) = cancel.with_timeout(Duration::from_secs(60));
        let leaf = deadline.with_value("Hello", "World!");

        assert_eq!(
            kinds(&leaf).unwrap(),
            vec![
                Some(ScopeKind::Value),
                Some(ScopeKind::Deadline),
                Some(ScopeKind::Cancel),
                Some(ScopeKind::Root),
            ]
        );
    }

    #[test]
    fn test_walk_stops_on_request() {
        let leaf = Context::background().with_value(1, 1).with_value(2, 2);
        let mut visits = 0;
        walk(&leaf, |_| {
            visits += 1;
            Ok::<_, ScopeError>(WalkControl::Stop)
        })
        .unwrap();
        assert_eq!(visits, 1);
    }

    #[test]
    fn test_visitor_error_is_propagated() {
        #[derive(Debug, PartialEq)]
        enum VisitError {
            Scope,
            Rejected(usize),
        }

        impl From<ScopeError> for VisitError {
            fn from(_: ScopeError) -> Self {
                VisitError::Scope
            }
        }

        let leaf = Context::background().with_value(1, 1).with_value(2, 2);
        let mut visits = 0;
        let result = walk(&leaf, |_| {
            visits += 1;
            if visits == 2 {
                return Err(VisitError::Rejected(visits));
            }
            Ok(WalkControl::Continue)
        });
        assert_eq!(result, Err(VisitError::Rejected(2)));
    }

    #[test]
    fn test_foreign_node_is_visited_then_rejected() {
        let leaf = Context::from_foreign(Arc::new(Bridged)).with_value("k", "v");
        let mut visited = Vec::new();
        let err = walk(&leaf, |node| {
            visited.push(node.kind());
            Ok::<_, ScopeError>(WalkControl::Continue)
        })
        .unwrap_err();

        assert_eq!(visited, vec![Some(ScopeKind::Value), None]);
        match err {
            ScopeError::UnknownScopeKind {
                type_name,
                description,
                ..
            } => {
                assert!(type_name.ends_with("Bridged"));
                assert_eq!(description, "Bridged");
            }
        }
    }

    #[test]
    fn test_ancestors_is_fused_after_error() {
        let mut ancestors = Context::from_foreign(Arc::new(Bridged)).ancestors();
        assert!(matches!(ancestors.next(), Some(Ok(_))));
        assert!(matches!(ancestors.next(), Some(Err(_))));
        assert!(ancestors.next().is_none());
        assert!(ancestors.next().is_none());
    }

    #[test]
    fn test_walk_values_expands_flattened_bindings_in_order() {
        let parent = Context::background().with_value("outer", 0);
        let flattened = Context::with_bindings(
            parent,
            smallvec::smallvec![
                crate::scope::Binding::new("a", 1),
                crate::scope::Binding::new("b", 2),
            ],
        );
        let leaf = flattened.with_value("c", 3);

        let mut keys = Vec::new();
        walk_values(&leaf, |key, _| {
            keys.push(key.downcast_ref::<String>().cloned().unwrap());
            Ok::<_, ScopeError>(WalkControl::Continue)
        })
        .unwrap();
        assert_eq!(keys, vec!["c", "a", "b", "outer"]);
    }
}
