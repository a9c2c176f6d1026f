use ark_ff::UniformRand;
use criterion::{criterion_group, criterion_main, Criterion};
use goldilocks_field::{Fq, Fq2};
use goldilocks_poseidon2::{constants::WIDTH, hash_no_pad, permute, permute_extension};
use rand::{rngs::StdRng, SeedableRng};

pub fn bench_poseidon2_goldilocks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let state: [Fq; WIDTH] = std::array::from_fn(|_| Fq::rand(&mut rng));
    let ext_state: [Fq2; WIDTH] = std::array::from_fn(|_| Fq2::rand(&mut rng));
    let inputs: Vec<Fq> = (0..64).map(|_| Fq::rand(&mut rng)).collect();

    let mut group = c.benchmark_group("Poseidon2");
    group.sample_size(100);

    group.bench_function("permute", |b| b.iter(|| permute(state)));
    group.bench_function("permute extension", |b| {
        b.iter(|| permute_extension(ext_state))
    });
    group.bench_function("hash_no_pad 64 elements", |b| {
        b.iter(|| hash_no_pad(&inputs))
    });

    group.finish();
}

criterion_group!(benches, bench_poseidon2_goldilocks);
criterion_main!(benches);
