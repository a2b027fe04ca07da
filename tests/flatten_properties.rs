//! Flattening must be observationally indistinguishable for lookups

mod common;

use ctxchain::{
    Context, FlattenConfig, FlattenMode, Opaque, ScopeKind, chain_info, flatten, flatten_with,
    resolve,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use common::{deep_chain, interleaved_chain, pairs};

fn probe_keys(depth: usize) -> Vec<Opaque> {
    let mut keys: Vec<Opaque> = (0..depth + 3).map(Opaque::from).collect();
    keys.push(Opaque::from("Hello"));
    keys.push(Opaque::from("nonexistent"));
    keys.push(Opaque::from(123));
    keys
}

fn assert_same_resolution(original: &Context, flattened: &Context, keys: &[Opaque]) {
    for key in keys {
        assert_eq!(
            resolve(original, key).unwrap(),
            resolve(flattened, key).unwrap(),
            "resolution differs for {key:?}"
        );
    }
}

#[test]
fn flatten_keeps_walk_order_and_lookups() {
    let p1 = Opaque::handle(Box::new(1_u8));
    let p2 = Opaque::handle(Box::new(2_u8));
    let fixture = interleaved_chain(&p1, &p2);

    let flat = flatten(&fixture.leaf);

    assert_eq!(flat.kind(), Some(ScopeKind::FlattenedValue));
    assert_eq!(flat.parent().and_then(|p| p.kind()), Some(ScopeKind::Root));
    assert_eq!(pairs(&flat), pairs(&fixture.leaf));
    assert_eq!(flat.value(123).unwrap(), Some(Opaque::from(456)));
    assert_eq!(flat.value("nonexistent").unwrap(), None);
    assert!(flat.value(&p1).unwrap().is_some_and(|v| v.ptr_eq(&p2)));
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(3, 0)]
#[case(16, 4)]
#[case(100, 7)]
fn flatten_preserves_resolution(#[case] depth: usize, #[case] cancel_every: usize) {
    let fixture = deep_chain(depth, cancel_every);
    let keys = probe_keys(depth);

    let flat = flatten(&fixture.leaf);
    assert_same_resolution(&fixture.leaf, &flat, &keys);

    let twice = flatten(&flat);
    assert_same_resolution(&flat, &twice, &keys);
    assert_eq!(pairs(&twice), pairs(&flat));
}

#[test]
fn flatten_preserves_shadowing_across_flattened_segments() {
    let inner = Context::background()
        .with_value("user", "root-user")
        .with_value("trace", 1);
    let flattened_segment = flatten(&inner);
    let (leaf, _cancel) = flattened_segment
        .with_value("user", "request-user")
        .with_cancel();
    let leaf = leaf.with_value("trace", 2);

    let flat = flatten(&leaf);
    let keys = [Opaque::from("user"), Opaque::from("trace"), Opaque::from("x")];
    assert_same_resolution(&leaf, &flat, &keys);
    assert_eq!(
        flat.value_as::<String>("user").unwrap().as_deref(),
        Some("request-user")
    );
    assert_eq!(flat.value_as::<i32>("trace").unwrap(), Some(2));
}

#[rstest]
#[case(FlattenMode::Detached)]
#[case(FlattenMode::ValuePrefix)]
fn every_mode_preserves_resolution(#[case] mode: FlattenMode) {
    let fixture = deep_chain(24, 5);
    let config = FlattenConfig::default().with_mode(mode);

    let flat = flatten_with(&fixture.leaf, &config);
    assert_same_resolution(&fixture.leaf, &flat, &probe_keys(24));
}

#[test]
fn value_prefix_only_collapses_leading_values() {
    let (ctx, handle) = Context::background().with_value("a", 1).with_cancel();
    let leaf = ctx.with_value("b", 2).with_value("c", 3);

    let flat = flatten_with(&leaf, &FlattenConfig::preserve_capabilities());
    let summary: Vec<_> = chain_info(&flat)
        .unwrap()
        .into_iter()
        .map(|info| (info.kind, info.binding_count))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ScopeKind::FlattenedValue, 2),
            (ScopeKind::Cancel, 0),
            (ScopeKind::Value, 1),
            (ScopeKind::Root, 0),
        ]
    );

    assert!(!flat.is_done());
    handle.cancel();
    assert!(flat.is_done());
    assert!(!flatten(&leaf).is_done());
}

#[test]
fn flatten_shares_values_instead_of_copying_them() {
    let payload = Opaque::handle(vec![0_u8; 1024]);
    let leaf = Context::background()
        .with_value("payload", &payload)
        .with_value("other", 1);

    let flat = flatten(&leaf);
    let resolved = flat.value("payload").unwrap().unwrap();
    assert!(resolved.ptr_eq(&payload));
}
