use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use matchbook_core::{OrderBook, Side, TimeInForce, Trade};

fn bench_add_and_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book");

    group.bench_function("rest_and_cancel", |b| {
        let mut book = OrderBook::new(0, Arc::from("BENCH"));
        let mut sink = |_: &Trade<'_>| {};
        b.iter(|| {
            let id = book.add_limit(
                black_box(Side::Buy),
                black_box(100),
                black_box(10),
                TimeInForce::Gfd,
                &mut sink,
            );
            book.cancel(black_box(id));
        });
    });

    group.bench_function("cross_single_level", |b| {
        let mut book = OrderBook::new(0, Arc::from("BENCH"));
        let mut sink = |_: &Trade<'_>| {};
        b.iter(|| {
            book.add_limit(Side::Sell, 100, 10, TimeInForce::Gfd, &mut sink);
            book.add_limit(black_box(Side::Buy), 100, 10, TimeInForce::Ioc, &mut sink);
        });
    });

    group.bench_function("sweep_ten_levels", |b| {
        let mut sink = |_: &Trade<'_>| {};
        b.iter_batched(
            || {
                let mut book = OrderBook::new(0, Arc::from("BENCH"));
                for i in 0..10 {
                    book.add_limit(Side::Sell, 100 + i, 10, TimeInForce::Gfd, &mut |_: &Trade<'_>| {});
                }
                book
            },
            |mut book| {
                book.add_market(black_box(Side::Buy), 100, &mut sink);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_add_and_cancel);
criterion_main!(benches);
