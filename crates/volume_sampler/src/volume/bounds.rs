//! World bounds and auto step size over all valid fields.
use glam::{DVec3, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::FieldCatalog;
use crate::field::FieldMapping;

/// World bounding box of all fields plus the suggested ray-march step.
///
/// An empty catalog yields a zero box with `auto_step == f32::MAX`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub auto_step: f32,
}

impl VolumeBounds {
    pub const EMPTY: VolumeBounds = VolumeBounds {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
        auto_step: f32::MAX,
    };

    /// True when no field contributed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.auto_step == f32::MAX
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for VolumeBounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

const UNIT_CUBE_CORNERS: [DVec3; 8] = [
    DVec3::new(0.0, 0.0, 0.0),
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(0.0, 1.0, 0.0),
    DVec3::new(1.0, 1.0, 0.0),
    DVec3::new(0.0, 0.0, 1.0),
    DVec3::new(1.0, 0.0, 1.0),
    DVec3::new(0.0, 1.0, 1.0),
    DVec3::new(1.0, 1.0, 1.0),
];

/// World box of one field's unit cube.
pub fn field_world_box(mapping: &FieldMapping, ignore_transform: bool) -> (DVec3, DVec3) {
    if ignore_transform {
        return (DVec3::ZERO, DVec3::ONE);
    }
    UNIT_CUBE_CORNERS.iter().fold(
        (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
        |(lo, hi), &c| {
            let w = mapping.local_to_world(c);
            (lo.min(w), hi.max(w))
        },
    )
}

/// Smallest world-space half-voxel extent over the three axes.
pub fn field_step(mapping: &FieldMapping, ignore_transform: bool) -> f64 {
    let half_voxel = 0.5 / mapping.resolution().as_dvec3();
    if ignore_transform {
        return half_voxel.min_element();
    }
    let origin = mapping.local_to_world(DVec3::ZERO);
    let axis_step = |axis: DVec3| (mapping.local_to_world(axis) - origin).length();
    axis_step(DVec3::X * half_voxel.x)
        .min(axis_step(DVec3::Y * half_voxel.y))
        .min(axis_step(DVec3::Z * half_voxel.z))
}

/// Aggregates world bounds and average step over every valid entry of `catalog`.
pub fn compute_bounds(catalog: &FieldCatalog, ignore_transform: bool) -> VolumeBounds {
    let mut lo = DVec3::splat(f64::INFINITY);
    let mut hi = DVec3::splat(f64::NEG_INFINITY);
    let mut step_sum = 0.0;
    let mut count = 0usize;

    for (_, entry) in catalog.valid_entries() {
        let (min, max) = field_world_box(entry.mapping(), ignore_transform);
        lo = lo.min(min);
        hi = hi.max(max);
        step_sum += field_step(entry.mapping(), ignore_transform);
        count += 1;
    }

    if count == 0 {
        return VolumeBounds::EMPTY;
    }

    VolumeBounds {
        min: lo.as_vec3(),
        max: hi.as_vec3(),
        auto_step: (step_sum / count as f64) as f32,
    }
}
