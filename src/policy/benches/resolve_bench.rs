//! Resolution benchmarks
//!
//! Measures first-match resolution as the rule sequence grows, with the
//! matching rule placed last (worst case) and first (best case).

use cretoai_policy::{Entity, EntityKind, EntityMatcher, PolicyType, SealedPolicy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::Value;

static USER: EntityKind = EntityKind::root("User");

// Filler kinds that never match the benchmarked entity
const FILLER_KIND: EntityKind = EntityKind::root("Filler");

static FILLER: [EntityKind; 64] = {
    let mut kinds = [FILLER_KIND; 64];
    let mut i = 0;
    while i < 64 {
        kinds[i] = EntityKind::root(FILLER_NAMES[i]);
        i += 1;
    }
    kinds
};

const FILLER_NAMES: [&str; 64] = [
    "F00", "F01", "F02", "F03", "F04", "F05", "F06", "F07", "F08", "F09", "F10", "F11", "F12",
    "F13", "F14", "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24", "F25",
    "F26", "F27", "F28", "F29", "F30", "F31", "F32", "F33", "F34", "F35", "F36", "F37", "F38",
    "F39", "F40", "F41", "F42", "F43", "F44", "F45", "F46", "F47", "F48", "F49", "F50", "F51",
    "F52", "F53", "F54", "F55", "F56", "F57", "F58", "F59", "F60", "F61", "F62", "F63",
];

struct User;

impl Entity for User {
    fn kind(&self) -> &'static EntityKind {
        &USER
    }
}

fn create_policy(filler: usize, user_first: bool) -> SealedPolicy<User, ()> {
    let mut policy = PolicyType::new("BenchPolicy");

    if user_first {
        policy
            .permission("view")
            .entity(&USER)
            .check(|_| Ok(Value::Bool(true)))
            .register()
            .unwrap();
    }
    for kind in FILLER.iter().take(filler) {
        policy
            .permission("view")
            .matcher(EntityMatcher::Kind(kind))
            .check(|_| Ok(Value::Bool(false)))
            .register()
            .unwrap();
    }
    if !user_first {
        policy
            .permission("view")
            .entity(&USER)
            .check(|_| Ok(Value::Bool(true)))
            .register()
            .unwrap();
    }

    policy.seal()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for filler in [0usize, 8, 64] {
        for (label, user_first) in [("match_last", false), ("match_first", true)] {
            let policy = create_policy(filler, user_first);

            group.bench_with_input(BenchmarkId::new(label, filler), &filler, |b, _| {
                b.iter(|| {
                    let instance = policy.instance(User, ());
                    black_box(instance.authorize(black_box("view")).unwrap())
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
