use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tokio::runtime::Runtime;

use storefront_auth::Caller;
use storefront_core::ShopId;
use storefront_infra::{CatalogConfig, CatalogService, InMemoryCatalogStore};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("tokio runtime")
}

fn caller() -> Caller {
    Caller::trusted(ShopId::new("bench-shop").expect("shop id"))
}

fn service() -> CatalogService {
    let store = Arc::new(InMemoryCatalogStore::new());
    CatalogService::with_default_kinds(store, CatalogConfig::default()).expect("service")
}

fn payload(i: usize) -> JsonValue {
    json!({
        "name": format!("Cotton tee {i}"),
        "thumbnail": "https://img.example/tee.png",
        "description": "Everyday shirt in organic cotton",
        "price": 10.0 + (i % 50) as f64,
        "quantity": 10,
        "attributes": { "size": "M", "material": "cotton" }
    })
}

/// Benchmark: transactional creation (attribute + base + inventory) latency.
fn bench_create_product(c: &mut Criterion) {
    let rt = runtime();
    let service = service();
    let caller = caller();
    let mut i = 0usize;

    c.bench_function("create_product_clothing", |b| {
        b.iter(|| {
            i += 1;
            let record = rt
                .block_on(service.create_product(&caller, "Clothing", payload(i)))
                .expect("create");
            black_box(record);
        })
    });
}

/// Benchmark: keyword search over catalogs of increasing size.
fn bench_search(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("search_products");

    for size in [100usize, 1_000, 5_000] {
        let service = service();
        let caller = caller();
        rt.block_on(async {
            for i in 0..size {
                service
                    .create_product(&caller, "Clothing", payload(i))
                    .await
                    .expect("seed");
            }
        });

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let hits = rt.block_on(service.search("cotton")).expect("search");
                black_box(hits.count());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create_product, bench_search);
criterion_main!(benches);
