//! Benchmarks for tree building and proof verification.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use session_notary::{verify_proof, HashAlgorithm, MerkleHasher, MerkleTree};

fn session_log(len: usize) -> Vec<Value> {
    (0..len)
        .map(|i| json!({"seq": i, "type": "bet", "amount": (i * 7) % 500, "player": "p1"}))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");
    for alg in HashAlgorithm::ALL {
        let hasher = MerkleHasher::new(alg);
        for &len in &[16usize, 256, 4096] {
            let log = session_log(len);
            group.throughput(Throughput::Elements(len as u64));
            group.bench_with_input(
                BenchmarkId::new(alg.name(), len),
                &log,
                |b, log| b.iter(|| MerkleTree::from_entries(&hasher, log)),
            );
        }
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let hasher = MerkleHasher::default();
    let log = session_log(4096);
    let tree = MerkleTree::from_entries(&hasher, &log).expect("non-empty log");
    let root = tree.root();
    let proof = tree.proof(1234).expect("index in range");

    c.bench_function("verify_proof_4096", |b| {
        b.iter(|| verify_proof(&hasher, &log[1234], proof, &root))
    });
}

criterion_group!(benches, bench_build, bench_verify);
criterion_main!(benches);
