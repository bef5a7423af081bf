//! Staggered (MAC) vector storage.
//!
//! Component `u` lives on the x-faces of each cell, `v` on the y-faces and `w` on the z-faces.
//! For a cell resolution `res` the component grids have resolution `res + x̂`, `res + ŷ` and
//! `res + ẑ` respectively.
use glam::{DVec3, UVec3};

use crate::field::dense::DenseField;
use crate::field::interp::{fetch, trilinear, tricubic, GridRead};
use crate::field::value::Scalar;

/// Face-centered vector field with per-component precision `T`.
#[derive(Clone, Debug)]
pub struct MacField<T> {
    resolution: UVec3,
    u: DenseField<T>,
    v: DenseField<T>,
    w: DenseField<T>,
}

/// Axis selector for MAC components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacComponent {
    U,
    V,
    W,
}

impl MacComponent {
    fn offset(self) -> UVec3 {
        match self {
            MacComponent::U => UVec3::X,
            MacComponent::V => UVec3::Y,
            MacComponent::W => UVec3::Z,
        }
    }

    /// Shift from cell-centered voxel space into the component's own grid.
    fn stagger(self) -> DVec3 {
        self.offset().as_dvec3() * 0.5
    }
}

impl<T: Scalar> MacField<T> {
    pub fn new(resolution: UVec3) -> Self {
        let resolution = resolution.max(UVec3::ONE);
        Self {
            resolution,
            u: DenseField::new(resolution + UVec3::X),
            v: DenseField::new(resolution + UVec3::Y),
            w: DenseField::new(resolution + UVec3::Z),
        }
    }

    /// Creates a field whose every face holds the matching component of `velocity`.
    pub fn uniform(resolution: UVec3, velocity: DVec3) -> Self {
        let resolution = resolution.max(UVec3::ONE);
        Self {
            resolution,
            u: DenseField::filled(resolution + UVec3::X, T::from_f64(velocity.x)),
            v: DenseField::filled(resolution + UVec3::Y, T::from_f64(velocity.y)),
            w: DenseField::filled(resolution + UVec3::Z, T::from_f64(velocity.z)),
        }
    }

    #[inline]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    pub fn component(&self, c: MacComponent) -> &DenseField<T> {
        match c {
            MacComponent::U => &self.u,
            MacComponent::V => &self.v,
            MacComponent::W => &self.w,
        }
    }

    pub fn component_mut(&mut self, c: MacComponent) -> &mut DenseField<T> {
        match c {
            MacComponent::U => &mut self.u,
            MacComponent::V => &mut self.v,
            MacComponent::W => &mut self.w,
        }
    }

    fn face_average(&self, c: MacComponent, i: i64, j: i64, k: i64) -> f64 {
        let grid = self.component(c);
        let o = c.offset();
        let a = fetch(grid, i, j, k);
        let b = fetch(grid, i + o.x as i64, j + o.y as i64, k + o.z as i64);
        0.5 * (a + b)
    }

    pub fn u_center(&self, i: i64, j: i64, k: i64) -> f64 {
        self.face_average(MacComponent::U, i, j, k)
    }

    pub fn v_center(&self, i: i64, j: i64, k: i64) -> f64 {
        self.face_average(MacComponent::V, i, j, k)
    }

    pub fn w_center(&self, i: i64, j: i64, k: i64) -> f64 {
        self.face_average(MacComponent::W, i, j, k)
    }

    /// Cell-centered velocity of cell `(i, j, k)`.
    pub fn center(&self, i: i64, j: i64, k: i64) -> DVec3 {
        DVec3::new(
            self.u_center(i, j, k),
            self.v_center(i, j, k),
            self.w_center(i, j, k),
        )
    }

    pub fn trilinear(&self, p: DVec3) -> DVec3 {
        self.per_component(p, trilinear)
    }

    pub fn tricubic(&self, p: DVec3) -> DVec3 {
        self.per_component(p, tricubic)
    }

    fn per_component(&self, p: DVec3, kernel: fn(&DenseField<T>, DVec3) -> f64) -> DVec3 {
        let sample = |c: MacComponent| kernel(self.component(c), p + c.stagger());
        DVec3::new(
            sample(MacComponent::U),
            sample(MacComponent::V),
            sample(MacComponent::W),
        )
    }

    /// Number of stored face values across all three components.
    pub fn face_count(&self) -> usize {
        [MacComponent::U, MacComponent::V, MacComponent::W]
            .iter()
            .map(|&c| {
                let d = self.component(c).dims();
                d.x as usize * d.y as usize * d.z as usize
            })
            .sum()
    }
}
