use glam::{DVec3, UVec3, Vec3};
use half::f16;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use volume_sampler::prelude::*;

const PATH: &str = "volume.f3d";

fn approx_eq(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-5, "{a} != {b}");
}

fn open(source: MemorySource, config: VolumeConfig) -> VolumeSession {
    let opener = MemoryOpener::new().with_source(PATH, source);
    VolumeSession::create(config, &opener).expect("session")
}

fn world_cube(res: u32) -> FieldMapping {
    FieldMapping::from_bounds(DVec3::splat(-1.0), DVec3::splat(1.0), UVec3::splat(res))
}

#[test]
fn ray_through_world_cube_yields_single_extent() {
    let source = MemorySource::new().with_scalar_layer(
        "smoke",
        "density",
        DenseField::filled(UVec3::splat(4), 1.0f32),
        world_cube(4),
    );
    let session = open(source, VolumeConfig::new(PATH));

    let extents = session.ray_extents([0.0f32, 0.0, 2.0], [0.0f32, 0.0, -1.0], 0.0, 10.0);
    assert_eq!(extents.len(), 1);
    approx_eq(extents[0].t_min, 1.0);
    approx_eq(extents[0].t_max, 3.0);
}

#[test]
fn ray_through_identity_cube_yields_unit_extent() {
    let source = MemorySource::new().with_scalar_layer(
        "smoke",
        "density",
        DenseField::filled(UVec3::ONE, 1.0f32),
        FieldMapping::identity(UVec3::ONE),
    );
    let session = open(source, VolumeConfig::new(PATH));

    let extents = session.ray_extents([0.5f32, 0.5, 2.0], [0.0f32, 0.0, -1.0], 0.0, 10.0);
    assert_eq!(extents.len(), 1);
    approx_eq(extents[0].t_min, 1.0);
    approx_eq(extents[0].t_max, 2.0);
}

#[test]
fn overlapping_fields_merge_into_disjoint_extents() {
    let a = FieldMapping::from_bounds(DVec3::new(-1.0, -1.0, 0.0), DVec3::new(1.0, 1.0, 2.0), UVec3::ONE);
    let b = FieldMapping::from_bounds(DVec3::new(-1.0, -1.0, 1.0), DVec3::new(1.0, 1.0, 3.0), UVec3::ONE);
    let c = FieldMapping::from_bounds(DVec3::new(-1.0, -1.0, 5.0), DVec3::new(1.0, 1.0, 6.0), UVec3::ONE);
    let source = MemorySource::new()
        .with_scalar_layer("p", "density", DenseField::<f32>::new(UVec3::ONE), c)
        .with_scalar_layer("p", "density", DenseField::<f32>::new(UVec3::ONE), a)
        .with_scalar_layer("q", "heat", DenseField::<f32>::new(UVec3::ONE), b);
    let session = open(source, VolumeConfig::new(PATH));

    let extents = session.ray_extents(Vec3::ZERO, Vec3::Z, 0.5, 10.0);
    assert_eq!(extents.len(), 2);
    approx_eq(extents[0].t_min, 0.5);
    approx_eq(extents[0].t_max, 3.0);
    approx_eq(extents[1].t_min, 5.0);
    approx_eq(extents[1].t_max, 6.0);
}

#[test]
fn closest_sample_of_single_voxel_field() {
    let source = MemorySource::new().with_scalar_layer(
        "smoke",
        "density",
        DenseField::filled(UVec3::ONE, 0.75f32),
        FieldMapping::identity(UVec3::ONE),
    );
    let session = open(source, VolumeConfig::new(PATH));

    let result = session.sample("density", Vec3::splat(0.5), Interpolation::Closest);
    assert!(result.hit());
    assert_eq!(result.value_type(), ValueType::Scalar);
    assert_eq!(result.value, Some(SampleValue::Scalar(0.75)));
}

#[test]
fn average_of_two_fields() {
    let m = FieldMapping::identity(UVec3::ONE);
    let source = MemorySource::new()
        .with_scalar_layer("a", "density", DenseField::filled(UVec3::ONE, 2.0f32), m.clone())
        .with_scalar_layer("b", "density", DenseField::filled(UVec3::ONE, f16::from_f32(4.0)), m);
    let config = VolumeConfig::parse("-file volume.f3d -merge density=avg", 1.0).unwrap();
    let session = open(source, config);

    let result = session.sample("density", Vec3::splat(0.5), Interpolation::Trilinear);
    assert_eq!(result.hit_count, 2);
    approx_eq(result.scalar().unwrap(), 3.0);

    // A single contributor is never divided.
    let single = session.sample("a.density", Vec3::splat(0.5), Interpolation::Trilinear);
    assert_eq!(single.hit_count, 1);
    approx_eq(single.scalar().unwrap(), 2.0);
}

#[test]
fn all_four_aliases_sample_identically() {
    let source = MemorySource::new().with_scalar_layer(
        "smoke",
        "density",
        DenseField::from_fn(UVec3::splat(4), |c| (c.x + 2 * c.y + 3 * c.z) as f32),
        world_cube(4),
    );
    let session = open(source, VolumeConfig::new(PATH));
    let catalog = session.catalog();

    let aliases = ["smoke.density[0]", "smoke.density", "density[0]", "density"];
    for alias in aliases {
        assert_eq!(catalog.lookup(alias), &[0]);
    }

    let p = Vec3::new(0.1, -0.3, 0.6);
    for interp in [
        Interpolation::Closest,
        Interpolation::Trilinear,
        Interpolation::Tricubic,
    ] {
        let reference = session.sample(aliases[0], p, interp);
        assert!(reference.hit());
        for alias in &aliases[1..] {
            assert_eq!(session.sample(alias, p, interp), reference);
        }
    }
}

#[test]
fn scalar_and_vector_contributions_do_not_mix() {
    let m = FieldMapping::identity(UVec3::ONE);
    let source = MemorySource::new()
        .with_scalar_layer("a", "data", DenseField::filled(UVec3::ONE, 1.0f32), m.clone())
        .with_vector_layer("b", "data", DenseField::filled(UVec3::ONE, [1.0f32, 2.0, 3.0]), m);
    let session = open(source, VolumeConfig::new(PATH));

    let result = session.sample("data", Vec3::splat(0.5), Interpolation::Closest);
    assert_eq!(result.hit_count, 1);
    assert_eq!(result.value, Some(SampleValue::Scalar(1.0)));

    let vector = session.sample("b.data", Vec3::splat(0.5), Interpolation::Closest);
    assert_eq!(vector.value_type(), ValueType::Vector);
    assert_eq!(vector.vector(), Some(Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn unknown_channels_and_outside_points_miss() {
    let source = MemorySource::new().with_scalar_layer(
        "smoke",
        "density",
        DenseField::filled(UVec3::ONE, 1.0f32),
        FieldMapping::identity(UVec3::ONE),
    );
    let session = open(source, VolumeConfig::new(PATH));

    let unknown = session.sample("temperature", Vec3::splat(0.5), Interpolation::Closest);
    assert!(!unknown.hit());
    assert_eq!(unknown.value_type(), ValueType::Undefined);

    let outside = session.sample("density", Vec3::splat(1.5), Interpolation::Closest);
    assert!(!outside.hit());
}

#[test]
fn merge_result_is_independent_of_field_order() {
    let mut rng = StdRng::seed_from_u64(0x0DE5);
    let values: Vec<f32> = (0..6).map(|_| (rng.next_u32() % 1000) as f32).collect();
    let m = FieldMapping::identity(UVec3::ONE);

    let build = |order: &[f32]| {
        let mut source = MemorySource::new();
        for (i, v) in order.iter().enumerate() {
            source.add_field(
                format!("p{i}"),
                "density",
                false,
                RawField::new(DenseField::filled(UVec3::ONE, *v), m.clone()),
            );
        }
        source
    };

    let mut reversed = values.clone();
    reversed.reverse();

    for policy in [
        MergePolicy::Add,
        MergePolicy::Max,
        MergePolicy::Min,
        MergePolicy::Average,
    ] {
        let config = VolumeConfig::new(PATH).with_merge("density", policy);
        let a = open(build(&values), config.clone());
        let b = open(build(&reversed), config);
        let sa = a.sample("density", Vec3::splat(0.5), Interpolation::Closest);
        let sb = b.sample("density", Vec3::splat(0.5), Interpolation::Closest);
        assert_eq!(sa.hit_count, 6);
        approx_eq(sa.scalar().unwrap(), sb.scalar().unwrap());
    }
}

#[test]
fn bounds_cover_all_fields() {
    let source = MemorySource::new()
        .with_scalar_layer("a", "density", DenseField::<f32>::new(UVec3::splat(4)), world_cube(4))
        .with_vector_layer(
            "b",
            "vel",
            MacField::<f32>::new(UVec3::splat(2)),
            FieldMapping::from_bounds(DVec3::ZERO, DVec3::splat(3.0), UVec3::splat(2)),
        );
    let session = open(source, VolumeConfig::new(PATH));
    let bounds = session.bounds();
    assert!(!bounds.is_empty());
    assert_eq!(bounds.min, Vec3::splat(-1.0));
    assert_eq!(bounds.max, Vec3::splat(3.0));
    // Mean half-voxel step: 2/4/2 = 0.25 and 3/2/2 = 0.75.
    approx_eq(bounds.auto_step, 0.5);
}

#[test]
fn motion_blur_shifts_the_sample_point() {
    let res = UVec3::new(8, 1, 1);
    let mapping = FieldMapping::identity(res);
    let source = MemorySource::new()
        .with_scalar_layer(
            "fluid",
            "density",
            DenseField::from_fn(res, |c| c.x as f32),
            mapping.clone(),
        )
        .with_vector_layer(
            "fluid",
            "vel",
            MacField::<f32>::uniform(res, DVec3::new(24.0 * 0.25, 0.0, 0.0)),
            mapping,
        );
    let config = VolumeConfig::parse(
        "-file volume.f3d -velocity vel -shutter relative -fps 24",
        1.0,
    )
    .unwrap();
    let session = open(source, config);

    let p = ShadingPoint::new([0.3125f32, 0.5, 0.5]);
    let still = session.sample("density", p, Interpolation::Trilinear);
    let moved = session.sample("density", p.with_time(1.0), Interpolation::Trilinear);
    // Velocity 0.25 local units per frame moves the point two voxels along x.
    approx_eq(still.scalar().unwrap(), 2.0);
    approx_eq(moved.scalar().unwrap(), 4.0);
}

#[test]
fn extreme_velocity_samples_the_edge_voxel() {
    let res = UVec3::new(8, 1, 1);
    let mapping = FieldMapping::identity(res);
    let source = MemorySource::new()
        .with_scalar_layer(
            "fluid",
            "density",
            DenseField::from_fn(res, |c| c.x as f32),
            mapping.clone(),
        )
        .with_vector_layer(
            "fluid",
            "vel",
            MacField::<f32>::uniform(res, DVec3::new(1e30, 0.0, 0.0)),
            mapping,
        );
    let config = VolumeConfig::parse("-file volume.f3d -velocity vel -shutter relative", 1.0).unwrap();
    let session = open(source, config);

    let p = ShadingPoint::new([0.3125f32, 0.5, 0.5]);
    for interp in [
        Interpolation::Closest,
        Interpolation::Trilinear,
        Interpolation::Tricubic,
    ] {
        let ahead = session.sample("density", p.with_time(1.0), interp);
        let behind = session.sample("density", p.with_time(-1.0), interp);
        approx_eq(ahead.scalar().unwrap(), 7.0);
        approx_eq(behind.scalar().unwrap(), 0.0);
    }
}
