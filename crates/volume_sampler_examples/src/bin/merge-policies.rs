use glam::{DVec3, Vec3};
use volume_sampler::prelude::*;
use volume_sampler_examples::{init_tracing, plume_source, single_volume};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let opener = single_volume("plume.f3d", plume_source(16, DVec3::ZERO));
    // The center lies in both the smoke and the fire density fields.
    let p = Vec3::new(0.1, 0.0, 0.0);

    for policy in ["add", "max", "min", "avg"] {
        let flags = format!("-file plume.f3d -merge density={}", policy);
        let session = VolumeSession::create(VolumeConfig::parse(&flags, 1.0)?, &opener)?;
        for interp in [
            Interpolation::Closest,
            Interpolation::Trilinear,
            Interpolation::Tricubic,
        ] {
            let s = session.sample("density", p, interp);
            println!(
                "{:>4} {:<10} value={:?} hits={}",
                policy,
                format!("{:?}", interp),
                s.scalar(),
                s.hit_count
            );
        }
    }

    // Partition-qualified aliases only see one field.
    let session = VolumeSession::create(VolumeConfig::new("plume.f3d"), &opener)?;
    for alias in ["smoke.density", "fire.density[0]", "heat", "vel"] {
        let s = session.sample(alias, p, Interpolation::Trilinear);
        println!("{:<16} {:?} ({:?})", alias, s.value, s.value_type());
    }

    Ok(())
}
