use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use multiway_tree::{BPlusTree, BTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const SEED: u64 = 42;
const SIZE: usize = 10_000;
const DEGREES: [usize; 3] = [2, 8, 32];

fn random_keys(count: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen_range(0..(count as u64 * 4))).collect()
}

fn bench_insert(c: &mut Criterion) {
    let keys = random_keys(SIZE, SEED);
    let mut group = c.benchmark_group("insert");

    group.bench_function("std_btreemap", |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            black_box(map)
        })
    });

    for t in DEGREES {
        group.bench_with_input(BenchmarkId::new("btree", t), &t, |b, &t| {
            b.iter(|| {
                let mut tree = BTree::new(t);
                for &k in &keys {
                    tree.insert(k, k);
                }
                black_box(tree)
            })
        });
        group.bench_with_input(BenchmarkId::new("bplus", t), &t, |b, &t| {
            b.iter(|| {
                let mut tree = BPlusTree::new(t);
                for &k in &keys {
                    tree.insert(k, k);
                }
                black_box(tree)
            })
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let keys = random_keys(SIZE, SEED);
    let probes = random_keys(1_000, SEED + 1);
    let mut group = c.benchmark_group("lookup");

    let map: BTreeMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
    group.bench_function("std_btreemap", |b| {
        b.iter(|| probes.iter().filter(|k| map.contains_key(*k)).count())
    });

    for t in DEGREES {
        let mut btree = BTree::new(t);
        let mut bplus = BPlusTree::new(t);
        for &k in &keys {
            btree.insert(k, k);
            bplus.insert(k, k);
        }
        group.bench_with_input(BenchmarkId::new("btree", t), &btree, |b, tree| {
            b.iter(|| probes.iter().filter(|k| tree.contains_key(k)).count())
        });
        group.bench_with_input(BenchmarkId::new("bplus", t), &bplus, |b, tree| {
            b.iter(|| probes.iter().filter(|k| tree.contains_key(k)).count())
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let keys = random_keys(SIZE, SEED);
    let mut group = c.benchmark_group("remove");

    for t in DEGREES {
        let mut btree = BTree::new(t);
        let mut bplus = BPlusTree::new(t);
        for &k in &keys {
            btree.insert(k, k);
            bplus.insert(k, k);
        }
        group.bench_with_input(BenchmarkId::new("btree", t), &t, |b, _| {
            b.iter_batched(
                || (btree_clone(&btree), keys.clone()),
                |(mut tree, keys)| {
                    for k in keys {
                        tree.remove(&k);
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("bplus", t), &t, |b, _| {
            b.iter_batched(
                || (bplus_clone(&bplus), keys.clone()),
                |(mut tree, keys)| {
                    for k in keys {
                        tree.remove(&k);
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn btree_clone(tree: &BTree<u64, u64>) -> BTree<u64, u64> {
    let mut copy = BTree::new(tree.min_degree());
    copy.extend(tree.items().map(|(k, v)| (*k, *v)));
    copy
}

fn bplus_clone(tree: &BPlusTree<u64, u64>) -> BPlusTree<u64, u64> {
    let mut copy = BPlusTree::new(tree.min_degree());
    copy.extend(tree.items().map(|(k, v)| (*k, *v)));
    copy
}

fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    let map: BTreeMap<u64, u64> = (0..SIZE as u64).map(|k| (k, k)).collect();
    let btree: BTree<u64, u64> = map.iter().map(|(k, v)| (*k, *v)).collect();
    let mut bplus = BPlusTree::new(16);
    bplus.extend(map.iter().map(|(k, v)| (*k, *v)));

    for (low, high) in [(4_990u64, 5_010u64), (1_000, 9_000)] {
        let label = format!("{}..={}", low, high);
        group.bench_function(BenchmarkId::new("std_btreemap", &label), |b| {
            b.iter(|| map.range(black_box(low)..=black_box(high)).count())
        });
        group.bench_function(BenchmarkId::new("btree", &label), |b| {
            b.iter(|| btree.range(black_box(&low), black_box(&high)).count())
        });
        group.bench_function(BenchmarkId::new("bplus", &label), |b| {
            b.iter(|| bplus.range(black_box(&low), black_box(&high)).count())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_remove, bench_range);
criterion_main!(benches);
