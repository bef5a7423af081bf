mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec3, UVec3, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use volume_sampler::prelude::*;

use crate::common::unit;

const FIELD_COUNTS: [usize; 4] = [1, 8, 64, 256];
const RAYS: usize = 1024;

fn scattered_session(fields: usize) -> VolumeSession {
    let mut rng = StdRng::seed_from_u64(0xB0C5 ^ fields as u64);
    let mut source = MemorySource::new();
    for _ in 0..fields {
        let mut point = || DVec3::new(unit(&mut rng), unit(&mut rng), unit(&mut rng));
        let min = point() * 20.0 - 10.0;
        let size = point() * 4.0 + 0.5;
        let mapping = FieldMapping::from_bounds(min, min + size, UVec3::splat(8));
        source.add_field(
            "scatter",
            "density",
            false,
            RawField::new(DenseField::<f32>::new(UVec3::splat(8)), mapping),
        );
    }
    common::open_session(source)
}

fn extents_ray_benches(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5AD);
    let rays: Vec<(Vec3, Vec3)> = (0..RAYS)
        .map(|_| {
            let o = DVec3::new(unit(&mut rng), unit(&mut rng), 1.0) * 20.0 - 10.0;
            let d = DVec3::new(unit(&mut rng) - 0.5, unit(&mut rng) - 0.5, -1.0);
            let d = d.normalize();
            (o.as_vec3() + Vec3::Z * 15.0, d.as_vec3())
        })
        .collect();

    let mut group = c.benchmark_group("extents/ray");
    group.throughput(common::elements_throughput(rays.len()));

    for &fields in &FIELD_COUNTS {
        let session = scattered_session(fields);
        group.bench_with_input(BenchmarkId::from_parameter(fields), &fields, |b, _| {
            b.iter(|| {
                for &(o, d) in &rays {
                    black_box(session.ray_extents(o, d, 0.0, 100.0).len());
                }
            });
        });
    }

    group.finish();
}

fn extents_merge_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("extents/merge_in");

    for &n in &[16usize, 128, 1024] {
        let mut rng = StdRng::seed_from_u64(0xE7 ^ n as u64);
        let input: Vec<Extent> = (0..n)
            .filter_map(|_| {
                let a = (unit(&mut rng) * 1000.0) as f32;
                Extent::new(a, a + (unit(&mut rng) * 10.0) as f32 + 0.1)
            })
            .collect();
        group.throughput(common::elements_throughput(input.len()));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let set: ExtentSet = input.iter().copied().collect();
                black_box(set.len());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = extents_ray_benches, extents_merge_benches
}
criterion_main!(benches);
