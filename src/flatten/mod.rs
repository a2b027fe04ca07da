//! Chain flattening
//!
//! A chain of `n` value scopes costs `n` dependent pointer loads per lookup.
//! Flattening copies the bindings (not the values, which are shared handles)
//! into one contiguous array, nearest binding first, so a lookup becomes a
//! linear scan. For every key, resolving against the flattened chain returns
//! exactly what resolving against the original returns.

pub mod config;

pub use config::{FlattenConfig, FlattenMode};

use crate::scope::{Bindings, Context, ScopeKind, ScopeNode};

/// Collapse every binding on `ctx` into a single flattened scope
///
/// The result is attached to the chain's own root, so cancel and deadline
/// scopes on the original chain are not reachable from it. See
/// [`FlattenMode::ValuePrefix`] to keep them.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use ctxchain::{Context, ScopeKind, flatten};
///
/// let (ctx, _cancel) = Context::background()
///     .with_value("user", "ada")
///     .with_timeout(Duration::from_secs(60));
/// let ctx = ctx.with_value("tenant", "acme");
///
/// let flat = flatten(&ctx);
/// assert_eq!(flat.kind(), Some(ScopeKind::FlattenedValue));
/// assert_eq!(flat.value("user").unwrap(), ctx.value("user").unwrap());
/// assert_eq!(flat.depth().unwrap(), 2);
/// ```
pub fn flatten(ctx: &Context) -> Context {
    flatten_with(ctx, &FlattenConfig::default())
}

/// Flatten `ctx` according to `config`
///
/// Never fails. A foreign scope ends collection and becomes the parent of the
/// flattened scope, so lookups that miss every collected binding fail on it
/// exactly as they would have on the original chain.
pub fn flatten_with(ctx: &Context, config: &FlattenConfig) -> Context {
    let mut bindings = Bindings::with_capacity(config.initial_capacity);
    let mut boundary = None;

    for node in ctx.ancestors() {
        // Foreign scopes are yielded before the walk can fail on them and
        // always end the loop, so no error is ever observed here.
        let Ok(node) = node else { break };
        match node.kind() {
            Some(kind) if kind.carries_values() => match node.node() {
                ScopeNode::Value(scope) => bindings.push(scope.binding().clone()),
                ScopeNode::FlattenedValue(scope) => {
                    bindings.extend(scope.bindings().iter().cloned());
                }
                _ => {}
            },
            Some(ScopeKind::Cancel | ScopeKind::Deadline)
                if config.mode == FlattenMode::Detached => {}
            _ => {
                boundary = Some(node);
                break;
            }
        }
    }

    if config.mode == FlattenMode::ValuePrefix && bindings.is_empty() {
        return ctx.clone();
    }

    let parent = boundary.unwrap_or_else(Context::background);
    log::debug!(
        "flattened {} bindings ({} mode) over {:?}",
        bindings.len(),
        config.mode,
        parent.kind()
    );
    Context::with_bindings(parent, bindings)
}

impl Context {
    /// Shorthand for [`flatten`]
    pub fn flatten(&self) -> Context {
        flatten(self)
    }
}
