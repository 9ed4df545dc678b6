use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use expense_core::{chain::MemoryStore, verify_chain, Category, Ledger, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_tx(rng: &mut StdRng, i: usize) -> Transaction {
    let categories = expense_core::constants::CATEGORIES;
    Transaction::new(
        format!("student-{}", i % 7),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        categories[rng.gen_range(0..categories.len())],
        rng.gen_range(0.0..250.0),
        "bench",
    )
}

fn bench_seal_verify(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let ledger = Ledger::open(MemoryStore::new()).unwrap();
    for i in 0..500 {
        ledger.stage_transaction(random_tx(&mut rng, i)).unwrap();
        ledger.commit().unwrap();
    }
    let chain = ledger.all_blocks();

    c.bench_function("verify_chain_500_blocks", |b| {
        b.iter(|| verify_chain(&chain).unwrap());
    });

    c.bench_function("commit_single_expense", |b| {
        let ledger = Ledger::open(MemoryStore::new()).unwrap();
        let mut i = 0;
        b.iter(|| {
            ledger.stage_transaction(random_tx(&mut rng, i)).unwrap();
            ledger.commit().unwrap();
            i += 1;
        });
    });
}

criterion_group!(benches, bench_seal_verify);
criterion_main!(benches);
