//! Reconstruction kernels over voxel grids.
//!
//! Kernels operate in voxel space where sample `(i, j, k)` sits at `(i, j, k) + 0.5`. Reads
//! outside the data window clamp to the nearest edge voxel, so points beyond the grid see the
//! boundary value instead of panicking.
use glam::{DVec3, IVec3, UVec3};

use crate::field::value::{Interpolant, Voxel};

/// Read access to a regular grid of voxels.
pub trait GridRead {
    type Value: Voxel;

    /// Data resolution; every axis is at least one.
    fn dims(&self) -> UVec3;

    /// Reads an in-range voxel.
    fn read(&self, i: u32, j: u32, k: u32) -> Self::Value;
}

#[inline]
fn clamp_axis(c: i64, dim: u32) -> u32 {
    c.clamp(0, dim as i64 - 1) as u32
}

/// Reads the voxel nearest to `(i, j, k)` inside the data window.
#[inline]
pub fn fetch<G: GridRead>(grid: &G, i: i64, j: i64, k: i64) -> <G::Value as Voxel>::Sample {
    let d = grid.dims();
    grid.read(clamp_axis(i, d.x), clamp_axis(j, d.y), clamp_axis(k, d.z))
        .to_sample()
}

/// Index of the cell containing voxel-space point `p`, with the half-voxel shift applied
/// after clamping below at 0.5 so points near the origin never wrap to negative indices.
#[inline]
pub fn closest_cell(p: DVec3) -> IVec3 {
    let c = (p.max(DVec3::splat(0.5)) - 0.5).floor();
    IVec3::new(c.x as i32, c.y as i32, c.z as i32)
}

/// Raw stored value at the cell containing `p`.
pub fn closest<G: GridRead>(grid: &G, p: DVec3) -> <G::Value as Voxel>::Sample {
    let c = closest_cell(p);
    fetch(grid, c.x as i64, c.y as i64, c.z as i64)
}

/// Integer base and fractional offset of `p` for a stencil read. Points far outside the grid
/// are pulled in to one voxel past the clamped stencil, which reads the same edge values.
fn split(p: DVec3, dims: UVec3) -> ([i64; 3], DVec3) {
    let q = (p - 0.5).clamp(DVec3::splat(-2.0), dims.as_dvec3() + 1.0);
    let base = q.floor();
    ([base.x as i64, base.y as i64, base.z as i64], q - base)
}

/// Trilinear reconstruction at voxel-space point `p`.
pub fn trilinear<G: GridRead>(grid: &G, p: DVec3) -> <G::Value as Voxel>::Sample {
    let ([x, y, z], t) = split(p, grid.dims());
    let v = |dx: i64, dy: i64, dz: i64| fetch(grid, x + dx, y + dy, z + dz);
    let lerp = <<G::Value as Voxel>::Sample as Interpolant>::lerp;

    let x00 = lerp(v(0, 0, 0), v(1, 0, 0), t.x);
    let x10 = lerp(v(0, 1, 0), v(1, 1, 0), t.x);
    let x01 = lerp(v(0, 0, 1), v(1, 0, 1), t.x);
    let x11 = lerp(v(0, 1, 1), v(1, 1, 1), t.x);

    let y0 = lerp(x00, x10, t.y);
    let y1 = lerp(x01, x11, t.y);
    lerp(y0, y1, t.z)
}

/// Monotonic tricubic reconstruction over the 4x4x4 stencil around `p`.
pub fn tricubic<G: GridRead>(grid: &G, p: DVec3) -> <G::Value as Voxel>::Sample {
    let ([x, y, z], t) = split(p, grid.dims());
    let cubic = <<G::Value as Voxel>::Sample as Interpolant>::monotonic_cubic;

    let planes = std::array::from_fn(|dz| {
        let rows = std::array::from_fn(|dy| {
            let row = std::array::from_fn(|dx| {
                fetch(grid, x + dx as i64 - 1, y + dy as i64 - 1, z + dz as i64 - 1)
            });
            cubic(row, t.x)
        });
        cubic(rows, t.y)
    });
    cubic(planes, t.z)
}
