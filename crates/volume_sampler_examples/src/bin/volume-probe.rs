use glam::{DVec3, Vec3};
use tracing::info;
use volume_sampler::prelude::*;
use volume_sampler_examples::{init_tracing, plume_source, single_volume};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path = "/cache/plume.0001.f3d";
    let opener = single_volume(path, plume_source(16, DVec3::ZERO));
    let config = VolumeConfig::parse("-file /cache/plume.####.f3d -verbose", 1.0)?;
    let session = VolumeSession::create(config, &opener)?;

    let bounds = session.bounds();
    info!(
        "{} fields, bounds {:?}..{:?}, auto step {}",
        session.catalog().len(),
        bounds.min,
        bounds.max,
        bounds.auto_step
    );
    for name in session.catalog().aliases().names() {
        println!("  channel {}", name);
    }

    // Cast a ray down the z axis and march every extent it reports.
    let origin = Vec3::new(0.0, 0.0, 2.0);
    let direction = Vec3::new(0.0, 0.0, -1.0);
    for extent in session.ray_extents(origin, direction, 0.0, 10.0) {
        println!("extent [{:.3}, {:.3}]", extent.t_min, extent.t_max);
        let mut t = extent.t_min;
        while t <= extent.t_max {
            let p = origin + direction * t;
            let s = session.sample("density", p, Interpolation::Closest);
            println!(
                "  t={:.3} density={:?} hits={}",
                t,
                s.scalar(),
                s.hit_count
            );
            t += bounds.auto_step * 4.0;
        }
    }

    Ok(())
}
