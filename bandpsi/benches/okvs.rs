//! Band OKVS benchmarks using `criterion`.

use bandkit::Gf128;
use bandpsi::{utils, BandOkvs, OkvsParams};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::Duration;

const BAND_WIDTH: usize = 512;
const EXPANSION: f64 = 1.01;

fn bench_okvs(c: &mut Criterion) {
    let mut group = c.benchmark_group("okvs");
    let mut rng = ChaCha12Rng::from_seed([0; 32]);
    for log_n in [12, 16, 20] {
        let n = 1 << log_n;
        let params = OkvsParams::new(n, BAND_WIDTH, EXPANSION).unwrap();
        let keys = utils::rand_items(n, &mut rng);
        let values = utils::rand_items(n, &mut rng);

        group.bench_with_input(BenchmarkId::new("encode", n), &n, |bench, _| {
            let mut okvs = BandOkvs::new(params);
            bench.iter(|| criterion::black_box(okvs.encode(&keys, &values).unwrap()))
        });

        let mut okvs = BandOkvs::new(params);
        okvs.encode(&keys, &values).unwrap();
        group.bench_with_input(BenchmarkId::new("decode", n), &n, |bench, _| {
            bench.iter(|| criterion::black_box(okvs.decode(&keys)))
        });
        group.bench_with_input(BenchmarkId::new("mul", n), &n, |bench, _| {
            let scalar = Gf128(0x1234);
            bench.iter(|| okvs.mul(criterion::black_box(scalar)))
        });
    }
    group.finish();
}

criterion_group! {
    name = okvs;
    config = Criterion::default().warm_up_time(Duration::from_millis(100)).sample_size(10);
    targets = bench_okvs
}

criterion_main!(okvs);
