//! Value types stored in voxel fields and produced by sampling.
//!
//! Storage precision is modelled by [`Scalar`] (implemented for `f16`, `f32`, `f64`) and the
//! stored voxel type by [`Voxel`] (the three scalars plus `[T; 3]` vectors of them). All
//! reconstruction happens in double precision through [`Interpolant`] and is narrowed to a
//! renderer-facing [`SampleValue`] at the end.
use std::fmt::Debug;

use glam::{DVec3, Vec3};
use half::f16;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Storage precision of a field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    Half,
    Float,
    Double,
}

impl Precision {
    /// Precisions in the order a data source is probed.
    pub const PROBE_ORDER: [Precision; 3] = [Precision::Half, Precision::Float, Precision::Double];
}

/// Output kind of a stored value type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Vector,
}

/// A sampled value, narrowed to single precision for the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleValue {
    Scalar(f32),
    Vector(Vec3),
}

impl SampleValue {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            SampleValue::Scalar(_) => ValueKind::Scalar,
            SampleValue::Vector(_) => ValueKind::Vector,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            SampleValue::Scalar(v) => Some(*v),
            SampleValue::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            SampleValue::Vector(v) => Some(*v),
            SampleValue::Scalar(_) => None,
        }
    }
}

/// Double-precision value that interpolation kernels operate on.
pub trait Interpolant: Copy + Send + Sync + 'static {
    fn lerp(a: Self, b: Self, t: f64) -> Self;

    /// Monotonic cubic through `f[1]` (t = 0) and `f[2]` (t = 1).
    fn monotonic_cubic(f: [Self; 4], t: f64) -> Self;

    fn into_sample(self) -> SampleValue;
}

impl Interpolant for f64 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a + (b - a) * t
    }

    fn monotonic_cubic(f: [Self; 4], t: f64) -> Self {
        let [f1, f2, f3, f4] = f;
        let delta = f3 - f2;
        let mut d_k = 0.5 * (f3 - f1);
        let mut d_k1 = 0.5 * (f4 - f2);

        // Slopes that disagree with the secant would overshoot.
        if delta == 0.0 {
            d_k = 0.0;
            d_k1 = 0.0;
        } else {
            if d_k.signum() != delta.signum() {
                d_k = 0.0;
            }
            if d_k1.signum() != delta.signum() {
                d_k1 = 0.0;
            }
        }

        let a1 = d_k;
        let a2 = 3.0 * delta - 2.0 * d_k - d_k1;
        let a3 = d_k + d_k1 - 2.0 * delta;
        ((a3 * t + a2) * t + a1) * t + f2
    }

    #[inline]
    fn into_sample(self) -> SampleValue {
        SampleValue::Scalar(self as f32)
    }
}

impl Interpolant for DVec3 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a.lerp(b, t)
    }

    fn monotonic_cubic(f: [Self; 4], t: f64) -> Self {
        DVec3::new(
            f64::monotonic_cubic([f[0].x, f[1].x, f[2].x, f[3].x], t),
            f64::monotonic_cubic([f[0].y, f[1].y, f[2].y, f[3].y], t),
            f64::monotonic_cubic([f[0].z, f[1].z, f[2].z, f[3].z], t),
        )
    }

    #[inline]
    fn into_sample(self) -> SampleValue {
        SampleValue::Vector(self.as_vec3())
    }
}

/// Scalar storage precision.
pub trait Scalar: Voxel<Sample = f64> + PartialEq {
    const PRECISION: Precision;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;
}

impl Scalar for f16 {
    const PRECISION: Precision = Precision::Half;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }
}

impl Scalar for f32 {
    const PRECISION: Precision = Precision::Float;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Scalar for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

/// Value type stored per voxel.
pub trait Voxel: Copy + Default + Debug + Send + Sync + 'static {
    type Sample: Interpolant;
    const KIND: ValueKind;

    fn to_sample(self) -> Self::Sample;
}

macro_rules! impl_scalar_voxel {
    ($($t:ty),*) => {
        $(
            impl Voxel for $t {
                type Sample = f64;
                const KIND: ValueKind = ValueKind::Scalar;

                #[inline]
                fn to_sample(self) -> f64 {
                    Scalar::to_f64(self)
                }
            }
        )*
    };
}

impl_scalar_voxel!(f16, f32, f64);

impl<T: Scalar> Voxel for [T; 3] {
    type Sample = DVec3;
    const KIND: ValueKind = ValueKind::Vector;

    #[inline]
    fn to_sample(self) -> DVec3 {
        DVec3::new(self[0].to_f64(), self[1].to_f64(), self[2].to_f64())
    }
}

/// Builds a stored vector from double-precision components.
pub fn vector_from<T: Scalar>(v: DVec3) -> [T; 3] {
    [T::from_f64(v.x), T::from_f64(v.y), T::from_f64(v.z)]
}
