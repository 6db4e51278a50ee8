use avl_ordered_map::OrderedHashMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("ordered_map_insert_10k_from_default_capacity", |b| {
        let keys: Vec<String> = lcg(1).take(10_000).map(key).collect();
        b.iter_batched(
            || (OrderedHashMap::<String, u64>::new(), keys.clone()),
            |(mut m, keys)| {
                for (i, k) in keys.into_iter().enumerate() {
                    m.insert(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("ordered_map_overwrite_existing", |b| {
        let mut m = OrderedHashMap::new();
        let keys: Vec<String> = lcg(5).take(1_000).map(key).collect();
        for k in &keys {
            m.insert(k.clone(), 0u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.insert(k.clone(), 1));
        })
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("ordered_map_get_hit", |b| {
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        let m: OrderedHashMap<String, u64> = keys
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, k)| (k, i as u64))
            .collect();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("ordered_map_get_miss", |b| {
        let m: OrderedHashMap<String, u64> = lcg(11)
            .take(10_000)
            .enumerate()
            .map(|(i, x)| (key(x), i as u64))
            .collect();
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.contains_key(&k));
        })
    });
}

fn bench_iterate(c: &mut Criterion) {
    c.bench_function("ordered_map_iterate_10k", |b| {
        let m: OrderedHashMap<u64, u64> = lcg(13).take(10_000).map(|x| (x, x)).collect();
        b.iter(|| black_box(m.values().fold(0u64, |a, v| a.wrapping_add(*v))))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_iterate
}
criterion_main!(benches);
