use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::RngCore;
use volume_sampler::prelude::*;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

const BENCH_PATH: &str = "bench.f3d";

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Uniform value in `[0, 1]`.
pub fn unit(rng: &mut StdRng) -> f64 {
    rng.next_u32() as f64 / u32::MAX as f64
}

/// Session over an in-memory source with default configuration.
pub fn open_session(source: MemorySource) -> VolumeSession {
    let opener = MemoryOpener::new().with_source(BENCH_PATH, source);
    match VolumeSession::create(VolumeConfig::new(BENCH_PATH), &opener) {
        Ok(session) => session,
        Err(e) => panic!("bench session: {e}"),
    }
}
