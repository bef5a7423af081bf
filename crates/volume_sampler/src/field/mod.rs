//! Voxel field representations and reconstruction kernels.
//!
//! This module groups the concrete storage layouts (dense, block-sparse, staggered MAC), the
//! local/world/voxel space mapping attached to each field, and the tagged [`FieldStorage`] that
//! the catalog holds once a data-source handle has been resolved.
pub mod dense;
pub mod interp;
pub mod mac;
pub mod mapping;
pub mod sparse;
pub mod storage;
pub mod value;

pub use dense::DenseField;
pub use mac::{MacComponent, MacField};
pub use mapping::FieldMapping;
pub use sparse::SparseField;
pub use storage::{resolve, resolve_any, FieldHandle, FieldShape, FieldStorage, VoxelField};
pub use value::{Precision, SampleValue, Scalar, ValueKind, Voxel};
