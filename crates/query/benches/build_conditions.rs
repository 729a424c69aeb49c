use criterion::{Criterion, black_box, criterion_group, criterion_main};

use storefront_core::UserId;
use storefront_query::{ConditionBuilder, Filter, Scalar};

fn bench_build(c: &mut Criterion) {
    let builder = ConditionBuilder::new("product");
    let owner = UserId::new();

    let filter = Filter::new()
        .with_eq("name", "widget")
        .with_range("price_subunit", Some(Scalar::Int(100)), Some(Scalar::Int(500)))
        .with_eq("active", true)
        .with_range("created_batch", Some(Scalar::Int(0)), None);

    c.bench_function("build_conditions/mixed_filter", |b| {
        b.iter(|| builder.build(black_box(owner), black_box(&filter)))
    });

    let empty = Filter::new();
    c.bench_function("build_conditions/owner_scope_only", |b| {
        b.iter(|| builder.build(black_box(owner), black_box(&empty)))
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
