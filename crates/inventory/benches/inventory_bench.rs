use std::time::Duration;

use common::GoodsId;
use criterion::{Criterion, criterion_group, criterion_main};
use dist_lock::{DistributedMutex, InMemoryLockStore, MutexConfig};
use inventory::{InventoryCoordinator, ReservationRequest};
use stock_ledger::{InMemoryStockLedger, StockLedger};

fn bench_config() -> MutexConfig {
    MutexConfig {
        lease_duration: Duration::from_secs(10),
        max_retries: 3,
        retry_delay: Duration::from_millis(1),
    }
}

fn make_coordinator() -> InventoryCoordinator<InMemoryStockLedger, InMemoryLockStore> {
    let ledger = InMemoryStockLedger::new();
    let mutex = DistributedMutex::new(InMemoryLockStore::new(), bench_config());
    InventoryCoordinator::new(ledger, mutex)
}

fn bench_reserve_single(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("inventory/reserve_single", |b| {
        b.iter(|| {
            rt.block_on(async {
                let coordinator = make_coordinator();
                coordinator.ledger().put(GoodsId::new(1), 1000).await.unwrap();
                coordinator
                    .reserve(&[ReservationRequest::new(GoodsId::new(1), 1)])
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_reserve_release_roundtrip(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("inventory/reserve_release_roundtrip", |b| {
        b.iter(|| {
            rt.block_on(async {
                let coordinator = make_coordinator();
                let batch: Vec<ReservationRequest> = (1..=5)
                    .map(|id| ReservationRequest::new(GoodsId::new(id), 2))
                    .collect();
                for request in &batch {
                    coordinator
                        .ledger()
                        .put(request.goods_id, 100)
                        .await
                        .unwrap();
                }
                coordinator.reserve(&batch).await.unwrap();
                coordinator.release(&batch).await;
            });
        });
    });
}

criterion_group!(benches, bench_reserve_single, bench_reserve_release_roundtrip);
criterion_main!(benches);
