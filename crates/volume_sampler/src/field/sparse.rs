//! Block-sparse voxel storage.
//!
//! The grid is tiled into cubic blocks of edge `2^block_order`. A block is allocated on first
//! write; reads from unallocated blocks return the field's empty value.
use glam::UVec3;

use crate::field::interp::GridRead;
use crate::field::value::Voxel;

pub const DEFAULT_BLOCK_ORDER: u32 = 4;
const MAX_BLOCK_ORDER: u32 = 8;

#[derive(Clone, Debug)]
pub struct SparseField<V> {
    resolution: UVec3,
    block_order: u32,
    block_res: UVec3,
    blocks: Vec<Option<Box<[V]>>>,
    empty_value: V,
}

impl<V: Voxel> SparseField<V> {
    /// Creates an empty field with the default block size and `V::default()` as empty value.
    pub fn new(resolution: UVec3) -> Self {
        Self::with_block_order(resolution, DEFAULT_BLOCK_ORDER, V::default())
    }

    pub fn with_block_order(resolution: UVec3, block_order: u32, empty_value: V) -> Self {
        let resolution = resolution.max(UVec3::ONE);
        let block_order = block_order.min(MAX_BLOCK_ORDER);
        let edge = 1u32 << block_order;
        let block_res = (resolution + UVec3::splat(edge - 1)) / edge;
        let count = block_res.x as usize * block_res.y as usize * block_res.z as usize;
        Self {
            resolution,
            block_order,
            block_res,
            blocks: vec![None; count],
            empty_value,
        }
    }

    #[inline]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    #[inline]
    pub fn empty_value(&self) -> V {
        self.empty_value
    }

    /// Number of blocks holding explicit voxel data.
    pub fn allocated_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    #[inline]
    fn block_edge(&self) -> u32 {
        1 << self.block_order
    }

    #[inline]
    fn locate(&self, i: u32, j: u32, k: u32) -> (usize, usize) {
        let o = self.block_order;
        let (bi, bj, bk) = (i >> o, j >> o, k >> o);
        let block = (bk as usize * self.block_res.y as usize + bj as usize)
            * self.block_res.x as usize
            + bi as usize;
        let mask = self.block_edge() - 1;
        let edge = self.block_edge() as usize;
        let voxel = ((k & mask) as usize * edge + (j & mask) as usize) * edge + (i & mask) as usize;
        (block, voxel)
    }

    #[inline]
    fn contains(&self, i: u32, j: u32, k: u32) -> bool {
        i < self.resolution.x && j < self.resolution.y && k < self.resolution.z
    }

    pub fn get(&self, i: u32, j: u32, k: u32) -> Option<V> {
        self.contains(i, j, k).then(|| self.read(i, j, k))
    }

    /// Writes a voxel, allocating its block. Writes outside the data window return `false`.
    pub fn set(&mut self, i: u32, j: u32, k: u32, value: V) -> bool {
        if !self.contains(i, j, k) {
            return false;
        }
        let (block, voxel) = self.locate(i, j, k);
        let edge = self.block_edge() as usize;
        let empty = self.empty_value;
        let data = self.blocks[block].get_or_insert_with(|| vec![empty; edge * edge * edge].into());
        data[voxel] = value;
        true
    }
}

impl<V: Voxel> GridRead for SparseField<V> {
    type Value = V;

    #[inline]
    fn dims(&self) -> UVec3 {
        self.resolution
    }

    #[inline]
    fn read(&self, i: u32, j: u32, k: u32) -> V {
        let (block, voxel) = self.locate(i, j, k);
        match &self.blocks[block] {
            Some(data) => data[voxel],
            None => self.empty_value,
        }
    }
}
