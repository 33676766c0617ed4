use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use stockroom_infra::ledger::{LedgerService, RecordMovement};
use stockroom_infra::store::memory::InMemoryStore;
use stockroom_infra::store::InventoryStore;
use stockroom_ledger::MovementType;
use stockroom_products::NewProduct;

fn seeded_service(rt: &tokio::runtime::Runtime, opening_quantity: i64) -> (LedgerService, stockroom_core::ProductId) {
    let store = Arc::new(InMemoryStore::new());
    let product = rt
        .block_on(store.insert_product(NewProduct {
            name: "Benchmark widget".to_string(),
            description: None,
            category_id: None,
            opening_quantity,
            price_cents: 1_000,
        }))
        .unwrap();
    (LedgerService::new(store), product.id)
}

fn bench_record_movement(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("record_movement");
    for batch in [1u64, 10, 100] {
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            let (service, product_id) = seeded_service(&rt, i64::MAX / 2);
            b.iter(|| {
                rt.block_on(async {
                    for _ in 0..batch {
                        service
                            .record_movement(RecordMovement {
                                product_id,
                                quantity: 1,
                                movement_type: MovementType::Sale,
                                remarks: None,
                            })
                            .await
                            .unwrap();
                    }
                })
            });
        });
    }
    group.finish();
}

fn bench_record_and_void_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("record_and_void_cycle", |b| {
        let (service, product_id) = seeded_service(&rt, 1_000_000);
        b.iter(|| {
            rt.block_on(async {
                let sale = service
                    .record_movement(RecordMovement {
                        product_id,
                        quantity: 3,
                        movement_type: MovementType::Sale,
                        remarks: None,
                    })
                    .await
                    .unwrap();
                service
                    .void_movement(sale.movement.id, "benchmark rollback")
                    .await
                    .unwrap();
            })
        });
    });
}

criterion_group!(benches, bench_record_movement, bench_record_and_void_cycle);
criterion_main!(benches);
