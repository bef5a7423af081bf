//! Coordinate mapping between world, local and voxel space.
//!
//! A field's local space is the unit cube `[0, 1]^3`. Voxel space scales local space by the data
//! resolution so voxel `(i, j, k)` covers `[i, i + 1)` and its center sits at `i + 0.5`. World
//! space is reached from local space through an affine matrix.
use glam::{DMat4, DVec3, UVec3};

const IDENTICAL_TOLERANCE: f64 = 1e-9;

/// Affine local-to-world mapping together with the data resolution of the field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldMapping {
    local_to_world: DMat4,
    world_to_local: DMat4,
    resolution: UVec3,
}

impl FieldMapping {
    /// Local space equals world space.
    pub fn identity(resolution: UVec3) -> Self {
        Self::from_matrix(DMat4::IDENTITY, resolution)
    }

    /// Maps local space through `local_to_world`. A singular matrix falls back to identity.
    pub fn from_matrix(local_to_world: DMat4, resolution: UVec3) -> Self {
        let det = local_to_world.determinant();
        let (local_to_world, world_to_local) = if det.is_finite() && det.abs() > f64::EPSILON {
            (local_to_world, local_to_world.inverse())
        } else {
            tracing::warn!("Singular field mapping; using identity.");
            (DMat4::IDENTITY, DMat4::IDENTITY)
        };
        Self {
            local_to_world,
            world_to_local,
            resolution: resolution.max(UVec3::ONE),
        }
    }

    /// Maps the unit cube onto the axis-aligned world box `[min, max]`.
    pub fn from_bounds(min: DVec3, max: DVec3, resolution: UVec3) -> Self {
        let m = DMat4::from_translation(min) * DMat4::from_scale(max - min);
        Self::from_matrix(m, resolution)
    }

    #[inline]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    #[inline]
    pub fn local_to_world_matrix(&self) -> &DMat4 {
        &self.local_to_world
    }

    #[inline]
    pub fn local_to_world(&self, p: DVec3) -> DVec3 {
        self.local_to_world.transform_point3(p)
    }

    #[inline]
    pub fn world_to_local(&self, p: DVec3) -> DVec3 {
        self.world_to_local.transform_point3(p)
    }

    #[inline]
    pub fn local_to_voxel(&self, p: DVec3) -> DVec3 {
        p * self.resolution.as_dvec3()
    }

    #[inline]
    pub fn voxel_to_local(&self, p: DVec3) -> DVec3 {
        p / self.resolution.as_dvec3()
    }

    #[inline]
    pub fn world_to_voxel(&self, p: DVec3) -> DVec3 {
        self.local_to_voxel(self.world_to_local(p))
    }

    /// Same resolution and the same matrix up to a small tolerance.
    pub fn is_identical(&self, other: &FieldMapping) -> bool {
        self.resolution == other.resolution
            && self
                .local_to_world
                .abs_diff_eq(other.local_to_world, IDENTICAL_TOLERANCE)
    }
}

/// True when `p` lies inside the closed local unit cube.
#[inline]
pub fn in_unit_cube(p: DVec3) -> bool {
    p.cmpge(DVec3::ZERO).all() && p.cmple(DVec3::ONE).all()
}
