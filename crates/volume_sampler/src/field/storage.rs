//! Tagged storage over every concrete field representation, and handle resolution.
//!
//! A data source hands out opaque [`FieldHandle`]s. [`resolve`] runs an ordered chain of
//! capability probes (sparse, then dense, then MAC for vectors) against a handle and returns the
//! first representation that matches. Sampling and bounds go through the single
//! [`FieldStorage::as_field`] dispatch.
use std::any::Any;
use std::sync::Arc;

use glam::{DVec3, IVec3, UVec3};
use half::f16;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field::dense::DenseField;
use crate::field::interp::{closest, trilinear, tricubic};
use crate::field::mac::MacField;
use crate::field::sparse::SparseField;
use crate::field::value::{Interpolant, Precision, SampleValue, Scalar, ValueKind, Voxel};

/// Opaque, reference-counted field as produced by a data source.
pub type FieldHandle = Arc<dyn Any + Send + Sync>;

/// Physical storage layout.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldShape {
    Dense,
    Sparse,
    Mac,
}

/// Uniform read interface over every representation.
pub trait VoxelField: Send + Sync {
    fn kind(&self) -> ValueKind;

    fn resolution(&self) -> UVec3;

    /// Raw value of cell `cell`, clamped to the data window. MAC fields return the cell-centered
    /// average of each component's faces.
    fn cell_value(&self, cell: IVec3) -> SampleValue;

    fn trilinear(&self, p: DVec3) -> SampleValue;

    fn tricubic(&self, p: DVec3) -> SampleValue;
}

macro_rules! impl_voxel_field_for_grid {
    ($($grid:ident),*) => {
        $(
            impl<V: Voxel> VoxelField for $grid<V> {
                fn kind(&self) -> ValueKind {
                    V::KIND
                }

                fn resolution(&self) -> UVec3 {
                    $grid::resolution(self)
                }

                fn cell_value(&self, cell: IVec3) -> SampleValue {
                    // Cell centers are at index + 0.5, so sampling there returns the raw cell.
                    closest(self, cell.as_dvec3() + 0.5).into_sample()
                }

                fn trilinear(&self, p: DVec3) -> SampleValue {
                    trilinear(self, p).into_sample()
                }

                fn tricubic(&self, p: DVec3) -> SampleValue {
                    tricubic(self, p).into_sample()
                }
            }
        )*
    };
}

impl_voxel_field_for_grid!(DenseField, SparseField);

impl<T: Scalar> VoxelField for MacField<T> {
    fn kind(&self) -> ValueKind {
        ValueKind::Vector
    }

    fn resolution(&self) -> UVec3 {
        MacField::resolution(self)
    }

    fn cell_value(&self, cell: IVec3) -> SampleValue {
        self.center(cell.x as i64, cell.y as i64, cell.z as i64)
            .into_sample()
    }

    fn trilinear(&self, p: DVec3) -> SampleValue {
        MacField::trilinear(self, p).into_sample()
    }

    fn tricubic(&self, p: DVec3) -> SampleValue {
        MacField::tricubic(self, p).into_sample()
    }
}

/// One resolved representation. Exactly one concrete field is held.
#[derive(Clone, Debug)]
pub enum FieldStorage {
    DenseHalf(Arc<DenseField<f16>>),
    DenseFloat(Arc<DenseField<f32>>),
    DenseDouble(Arc<DenseField<f64>>),
    SparseHalf(Arc<SparseField<f16>>),
    SparseFloat(Arc<SparseField<f32>>),
    SparseDouble(Arc<SparseField<f64>>),
    DenseVectorHalf(Arc<DenseField<[f16; 3]>>),
    DenseVectorFloat(Arc<DenseField<[f32; 3]>>),
    DenseVectorDouble(Arc<DenseField<[f64; 3]>>),
    SparseVectorHalf(Arc<SparseField<[f16; 3]>>),
    SparseVectorFloat(Arc<SparseField<[f32; 3]>>),
    SparseVectorDouble(Arc<SparseField<[f64; 3]>>),
    MacHalf(Arc<MacField<f16>>),
    MacFloat(Arc<MacField<f32>>),
    MacDouble(Arc<MacField<f64>>),
}

impl FieldStorage {
    /// The single dispatch point used by sampling and bounds.
    pub fn as_field(&self) -> &dyn VoxelField {
        match self {
            FieldStorage::DenseHalf(f) => f.as_ref(),
            FieldStorage::DenseFloat(f) => f.as_ref(),
            FieldStorage::DenseDouble(f) => f.as_ref(),
            FieldStorage::SparseHalf(f) => f.as_ref(),
            FieldStorage::SparseFloat(f) => f.as_ref(),
            FieldStorage::SparseDouble(f) => f.as_ref(),
            FieldStorage::DenseVectorHalf(f) => f.as_ref(),
            FieldStorage::DenseVectorFloat(f) => f.as_ref(),
            FieldStorage::DenseVectorDouble(f) => f.as_ref(),
            FieldStorage::SparseVectorHalf(f) => f.as_ref(),
            FieldStorage::SparseVectorFloat(f) => f.as_ref(),
            FieldStorage::SparseVectorDouble(f) => f.as_ref(),
            FieldStorage::MacHalf(f) => f.as_ref(),
            FieldStorage::MacFloat(f) => f.as_ref(),
            FieldStorage::MacDouble(f) => f.as_ref(),
        }
    }

    pub fn shape(&self) -> FieldShape {
        match self {
            FieldStorage::DenseHalf(_)
            | FieldStorage::DenseFloat(_)
            | FieldStorage::DenseDouble(_)
            | FieldStorage::DenseVectorHalf(_)
            | FieldStorage::DenseVectorFloat(_)
            | FieldStorage::DenseVectorDouble(_) => FieldShape::Dense,
            FieldStorage::SparseHalf(_)
            | FieldStorage::SparseFloat(_)
            | FieldStorage::SparseDouble(_)
            | FieldStorage::SparseVectorHalf(_)
            | FieldStorage::SparseVectorFloat(_)
            | FieldStorage::SparseVectorDouble(_) => FieldShape::Sparse,
            FieldStorage::MacHalf(_) | FieldStorage::MacFloat(_) | FieldStorage::MacDouble(_) => {
                FieldShape::Mac
            }
        }
    }

    pub fn precision(&self) -> Precision {
        match self {
            FieldStorage::DenseHalf(_)
            | FieldStorage::SparseHalf(_)
            | FieldStorage::DenseVectorHalf(_)
            | FieldStorage::SparseVectorHalf(_)
            | FieldStorage::MacHalf(_) => Precision::Half,
            FieldStorage::DenseFloat(_)
            | FieldStorage::SparseFloat(_)
            | FieldStorage::DenseVectorFloat(_)
            | FieldStorage::SparseVectorFloat(_)
            | FieldStorage::MacFloat(_) => Precision::Float,
            FieldStorage::DenseDouble(_)
            | FieldStorage::SparseDouble(_)
            | FieldStorage::DenseVectorDouble(_)
            | FieldStorage::SparseVectorDouble(_)
            | FieldStorage::MacDouble(_) => Precision::Double,
        }
    }

    #[inline]
    pub fn is_vector(&self) -> bool {
        self.as_field().kind() == ValueKind::Vector
    }
}

/// Wraps typed fields of one precision into [`FieldStorage`].
pub trait StorageScalar: Scalar {
    fn dense(field: Arc<DenseField<Self>>) -> FieldStorage;
    fn sparse(field: Arc<SparseField<Self>>) -> FieldStorage;
    fn dense_vector(field: Arc<DenseField<[Self; 3]>>) -> FieldStorage;
    fn sparse_vector(field: Arc<SparseField<[Self; 3]>>) -> FieldStorage;
    fn mac(field: Arc<MacField<Self>>) -> FieldStorage;
}

macro_rules! impl_storage_scalar {
    ($t:ty, $d:ident, $s:ident, $dv:ident, $sv:ident, $m:ident) => {
        impl StorageScalar for $t {
            fn dense(field: Arc<DenseField<Self>>) -> FieldStorage {
                FieldStorage::$d(field)
            }
            fn sparse(field: Arc<SparseField<Self>>) -> FieldStorage {
                FieldStorage::$s(field)
            }
            fn dense_vector(field: Arc<DenseField<[Self; 3]>>) -> FieldStorage {
                FieldStorage::$dv(field)
            }
            fn sparse_vector(field: Arc<SparseField<[Self; 3]>>) -> FieldStorage {
                FieldStorage::$sv(field)
            }
            fn mac(field: Arc<MacField<Self>>) -> FieldStorage {
                FieldStorage::$m(field)
            }
        }
    };
}

impl_storage_scalar!(f16, DenseHalf, SparseHalf, DenseVectorHalf, SparseVectorHalf, MacHalf);
impl_storage_scalar!(f32, DenseFloat, SparseFloat, DenseVectorFloat, SparseVectorFloat, MacFloat);
impl_storage_scalar!(
    f64,
    DenseDouble,
    SparseDouble,
    DenseVectorDouble,
    SparseVectorDouble,
    MacDouble
);

fn downcast<F: Any + Send + Sync>(handle: &FieldHandle) -> Option<Arc<F>> {
    Arc::clone(handle).downcast::<F>().ok()
}

fn probe_sparse<T: StorageScalar>(h: &FieldHandle) -> Option<FieldStorage> {
    downcast::<SparseField<T>>(h).map(T::sparse)
}

fn probe_dense<T: StorageScalar>(h: &FieldHandle) -> Option<FieldStorage> {
    downcast::<DenseField<T>>(h).map(T::dense)
}

fn probe_sparse_vector<T: StorageScalar>(h: &FieldHandle) -> Option<FieldStorage> {
    downcast::<SparseField<[T; 3]>>(h).map(T::sparse_vector)
}

fn probe_dense_vector<T: StorageScalar>(h: &FieldHandle) -> Option<FieldStorage> {
    downcast::<DenseField<[T; 3]>>(h).map(T::dense_vector)
}

fn probe_mac<T: StorageScalar>(h: &FieldHandle) -> Option<FieldStorage> {
    downcast::<MacField<T>>(h).map(T::mac)
}

/// Probe chain for one precision, in priority order.
fn probe_chain<T: StorageScalar>(h: &FieldHandle, is_vector: bool) -> Option<FieldStorage> {
    if is_vector {
        probe_sparse_vector::<T>(h)
            .or_else(|| probe_dense_vector::<T>(h))
            .or_else(|| probe_mac::<T>(h))
    } else {
        probe_sparse::<T>(h).or_else(|| probe_dense::<T>(h))
    }
}

/// Resolves `handle` as a field of the given precision and vector-ness.
pub fn resolve(handle: &FieldHandle, precision: Precision, is_vector: bool) -> Option<FieldStorage> {
    match precision {
        Precision::Half => probe_chain::<f16>(handle, is_vector),
        Precision::Float => probe_chain::<f32>(handle, is_vector),
        Precision::Double => probe_chain::<f64>(handle, is_vector),
    }
}

/// Resolves `handle` trying each precision in [`Precision::PROBE_ORDER`].
pub fn resolve_any(handle: &FieldHandle, is_vector: bool) -> Option<FieldStorage> {
    Precision::PROBE_ORDER
        .iter()
        .find_map(|&p| resolve(handle, p, is_vector))
}
