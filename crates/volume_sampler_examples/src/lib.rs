#![forbid(unsafe_code)]

use glam::{DVec3, UVec3};
use tracing_subscriber::EnvFilter;
use volume_sampler::prelude::*;

/// Installs a formatting subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Maps the unit cube onto the world box `[-half, half]^3`.
pub fn centered_cube(half: f64, resolution: UVec3) -> FieldMapping {
    FieldMapping::from_bounds(DVec3::splat(-half), DVec3::splat(half), resolution)
}

/// Dense density ball, densest at the center and zero at the cube faces.
pub fn density_ball(resolution: UVec3) -> DenseField<f32> {
    let res = resolution.as_vec3();
    DenseField::from_fn(resolution, |c| {
        let p = (c.as_vec3() + 0.5) / res * 2.0 - 1.0;
        (1.0 - p.length()).max(0.0)
    })
}

/// Sparse heat field with a hot block in the lower corner.
pub fn heat_block(resolution: UVec3, hot: u32) -> SparseField<f32> {
    let mut field = SparseField::new(resolution);
    for k in 0..hot.min(resolution.z) {
        for j in 0..hot.min(resolution.y) {
            for i in 0..hot.min(resolution.x) {
                field.set(i, j, k, 1.0);
            }
        }
    }
    field
}

/// A two-partition plume: `smoke` holds density and a uniform wind, `fire` holds density and
/// heat.
pub fn plume_source(resolution: u32, wind: DVec3) -> MemorySource {
    let res = UVec3::splat(resolution);
    MemorySource::new()
        .with_scalar_layer("smoke", "density", density_ball(res), centered_cube(1.0, res))
        .with_vector_layer(
            "smoke",
            "vel",
            MacField::<f32>::uniform(res, wind),
            centered_cube(1.0, res),
        )
        .with_scalar_layer(
            "fire",
            "density",
            DenseField::filled(res, half::f16::from_f32(0.5)),
            centered_cube(0.5, res),
        )
        .with_scalar_layer("fire", "heat", heat_block(res, resolution / 2), centered_cube(0.5, res))
}

/// Opener serving a single in-memory volume at `path`.
pub fn single_volume(path: &str, source: MemorySource) -> MemoryOpener {
    MemoryOpener::new().with_source(path, source)
}
