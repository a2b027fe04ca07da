//! Chain introspection summaries for debugging and diagnostics

use serde::{Deserialize, Serialize};

use crate::core::{Result, ScopeError};
use crate::scope::{Binding, Context, ScopeKind};
use crate::walker::{WalkControl, walk, walk_values};

/// Summary of one scope in a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeInfo {
    /// Distance from the leaf (0 for the leaf itself)
    pub depth: usize,
    pub kind: ScopeKind,
    pub binding_count: usize,
}

/// Describe every scope from the leaf to the root
pub fn chain_info(ctx: &Context) -> Result<Vec<ScopeInfo>> {
    let mut infos = Vec::new();
    walk(ctx, |node| {
        // Unclassified nodes fail the walk on the next step.
        if let Some(kind) = node.kind() {
            let depth = infos.len();
            infos.push(ScopeInfo {
                depth,
                kind,
                binding_count: node.node().binding_count(),
            });
        }
        Ok::<_, ScopeError>(WalkControl::Continue)
    })?;
    Ok(infos)
}

/// Every binding on the chain, nearest first, shadowed ones included
pub fn bindings(ctx: &Context) -> Result<Vec<Binding>> {
    let mut out = Vec::new();
    walk_values(ctx, |key, value| {
        out.push(Binding {
            key: key.clone(),
            value: value.clone(),
        });
        Ok::<_, ScopeError>(WalkControl::Continue)
    })?;
    Ok(out)
}

impl Context {
    /// Number of scopes from this node to the root, both included
    pub fn depth(&self) -> Result<usize> {
        let mut depth = 0;
        walk(self, |_| {
            depth += 1;
            Ok::<_, ScopeError>(WalkControl::Continue)
        })?;
        Ok(depth)
    }
}
