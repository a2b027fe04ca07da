//! Shared chain fixtures for integration tests

#![allow(dead_code)]

use std::time::Duration;

use ctxchain::{CancelHandle, Context, Opaque, ScopeError, WalkControl, walk_values};

/// Chain with its cancel handles kept alive for the duration of a test
pub struct Fixture {
    pub leaf: Context,
    pub handles: Vec<CancelHandle>,
}

/// origin -> cancel -> deadline(1m) -> bind(Hello, World!) (leaf)
///
/// Walking the leaf yields value, deadline, cancel, root.
pub fn value_over_capabilities_chain() -> Fixture {
    let (ctx, cancel) = Context::background().with_cancel();
    let (ctx, deadline) = ctx.with_timeout(Duration::from_secs(60));
    Fixture {
        leaf: ctx.with_value("Hello", "World!"),
        handles: vec![cancel, deadline],
    }
}

/// origin -> bind(p1, p2) -> timeout -> bind(Hello, World!) -> timeout
/// -> bind(123, 456) -> timeout (leaf)
pub fn interleaved_chain(p1: &Opaque, p2: &Opaque) -> Fixture {
    let pairs: [(Opaque, Opaque); 3] = [
        (p1.clone(), p2.clone()),
        (Opaque::from("Hello"), Opaque::from("World!")),
        (Opaque::from(123), Opaque::from(456)),
    ];
    let mut ctx = Context::background();
    let mut handles = Vec::new();
    for (key, value) in pairs {
        let (next, handle) = ctx
            .with_value(key, value)
            .with_timeout(Duration::from_secs(60));
        ctx = next;
        handles.push(handle);
    }
    Fixture {
        leaf: ctx,
        handles,
    }
}

/// Chain of `depth` value scopes binding `i -> i * 10`, with a cancel scope
/// every `cancel_every` levels; key 0 is bound nearest the root
pub fn deep_chain(depth: usize, cancel_every: usize) -> Fixture {
    let mut ctx = Context::background();
    let mut handles = Vec::new();
    for i in 0..depth {
        ctx = ctx.with_value(i, i * 10);
        if cancel_every > 0 && i % cancel_every == 0 {
            let (next, handle) = ctx.with_cancel();
            ctx = next;
            handles.push(handle);
        }
    }
    Fixture {
        leaf: ctx,
        handles,
    }
}

/// All `(key, value)` pairs in walk order
pub fn pairs(ctx: &Context) -> Vec<(Opaque, Opaque)> {
    let mut out = Vec::new();
    walk_values(ctx, |k, v| {
        out.push((k.clone(), v.clone()));
        Ok::<_, ScopeError>(WalkControl::Continue)
    })
    .expect("chain built from wrap operations");
    out
}
