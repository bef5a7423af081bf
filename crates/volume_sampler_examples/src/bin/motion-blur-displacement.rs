use glam::{DVec3, Vec3};
use volume_sampler::prelude::*;
use volume_sampler_examples::{init_tracing, plume_source, single_volume};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Wind of 12 world units per second along +x.
    let opener = single_volume("plume.f3d", plume_source(32, DVec3::new(12.0, 0.0, 0.0)));
    let flags = "-file plume.f3d -partition smoke -velocity vel -velocityWorld \
                 -shutter normalized -motionStart -0.5 -motionEnd 0.5 -fps 24";
    let session = VolumeSession::create(VolumeConfig::parse(flags, 1.0)?, &opener)?;

    let p = ShadingPoint::new(Vec3::new(0.25, 0.0, 0.0));
    for step in 0..=8 {
        let time = step as f32 / 8.0;
        let s = session.sample("density", p.with_time(time), Interpolation::Trilinear);
        println!("shutter {:.3}: density {:?}", time, s.scalar());
    }

    Ok(())
}
