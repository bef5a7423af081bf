//! Dense voxel storage.
use glam::UVec3;

use crate::field::interp::GridRead;
use crate::field::value::Voxel;

/// Contiguous voxel array, x varying fastest.
#[derive(Clone, Debug)]
pub struct DenseField<V> {
    resolution: UVec3,
    data: Vec<V>,
}

impl<V: Voxel> DenseField<V> {
    /// Creates a field filled with `V::default()`.
    pub fn new(resolution: UVec3) -> Self {
        Self::filled(resolution, V::default())
    }

    pub fn filled(resolution: UVec3, value: V) -> Self {
        let resolution = resolution.max(UVec3::ONE);
        let len = resolution.x as usize * resolution.y as usize * resolution.z as usize;
        Self {
            resolution,
            data: vec![value; len],
        }
    }

    /// Creates a field by evaluating `f` at every voxel index.
    pub fn from_fn(resolution: UVec3, mut f: impl FnMut(UVec3) -> V) -> Self {
        let mut field = Self::new(resolution);
        let r = field.resolution;
        for k in 0..r.z {
            for j in 0..r.y {
                for i in 0..r.x {
                    let idx = field.linear_index(i, j, k);
                    field.data[idx] = f(UVec3::new(i, j, k));
                }
            }
        }
        field
    }

    #[inline]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    #[inline]
    fn linear_index(&self, i: u32, j: u32, k: u32) -> usize {
        let r = self.resolution;
        (k as usize * r.y as usize + j as usize) * r.x as usize + i as usize
    }

    #[inline]
    fn contains(&self, i: u32, j: u32, k: u32) -> bool {
        i < self.resolution.x && j < self.resolution.y && k < self.resolution.z
    }

    /// Stored value, or `None` outside the data window.
    pub fn get(&self, i: u32, j: u32, k: u32) -> Option<V> {
        self.contains(i, j, k)
            .then(|| self.data[self.linear_index(i, j, k)])
    }

    /// Writes a voxel. Writes outside the data window are ignored and return `false`.
    pub fn set(&mut self, i: u32, j: u32, k: u32, value: V) -> bool {
        if !self.contains(i, j, k) {
            return false;
        }
        let idx = self.linear_index(i, j, k);
        self.data[idx] = value;
        true
    }
}

impl<V: Voxel> GridRead for DenseField<V> {
    type Value = V;

    #[inline]
    fn dims(&self) -> UVec3 {
        self.resolution
    }

    #[inline]
    fn read(&self, i: u32, j: u32, k: u32) -> V {
        self.data[self.linear_index(i, j, k)]
    }
}
