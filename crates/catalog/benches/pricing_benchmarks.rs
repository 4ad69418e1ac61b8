use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use chrono::Utc;
use storefront_catalog::{
    BeforeSave, NewProduct, PriceInput, Product, ReconcileMode, SaveContext, reconcile,
};
use storefront_core::ProductId;

fn inputs() -> Vec<(&'static str, PriceInput)> {
    vec![
        (
            "discount",
            PriceInput {
                price: 1_250_000,
                discount: Some(12.5),
                discounted_price: None,
            },
        ),
        (
            "discounted_price",
            PriceInput {
                price: 1_250_000,
                discount: None,
                discounted_price: Some(990_000),
            },
        ),
        (
            "neither",
            PriceInput {
                price: 1_250_000,
                discount: None,
                discounted_price: None,
            },
        ),
    ]
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for mode in [ReconcileMode::Faithful, ReconcileMode::Corrected] {
        for (name, input) in inputs() {
            group.bench_with_input(
                BenchmarkId::new(mode.as_str(), name),
                &input,
                |b, input| b.iter(|| reconcile(black_box(*input), black_box(mode))),
            );
        }
    }
    group.finish();
}

fn bench_before_save(c: &mut Criterion) {
    let mut new = NewProduct::new("Ceramic mug", "350ml", 1_250_000);
    new.discount = Some(12.5);
    let product = match Product::create(ProductId::new(), new, Utc::now()) {
        Ok(p) => p,
        Err(e) => panic!("fixture product is invalid: {e}"),
    };
    let ctx = SaveContext::default();

    c.bench_function("product_before_save", |b| {
        b.iter(|| {
            let mut p = product.clone();
            p.before_save(black_box(&ctx));
            p
        })
    });
}

criterion_group!(benches, bench_reconcile, bench_before_save);
criterion_main!(benches);
