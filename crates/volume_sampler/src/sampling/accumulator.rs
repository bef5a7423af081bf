//! Fold state for merging several field samples under one channel.
use glam::Vec3;

use crate::field::SampleValue;
use crate::sampling::{MergePolicy, ValueType};

/// Running merge of field samples.
///
/// The first contribution fixes the value type and is stored as is. Later contributions of the
/// other type are rejected without touching the state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    kind: ValueType,
    scalar: f32,
    vector: Vec3,
    hit_count: u32,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn kind(&self) -> ValueType {
        self.kind
    }

    #[inline]
    pub fn scalar(&self) -> f32 {
        self.scalar
    }

    #[inline]
    pub fn vector(&self) -> Vec3 {
        self.vector
    }

    #[inline]
    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    /// Current value, `None` before the first contribution.
    pub fn value(&self) -> Option<SampleValue> {
        match self.kind {
            ValueType::Undefined => None,
            ValueType::Scalar => Some(SampleValue::Scalar(self.scalar)),
            ValueType::Vector => Some(SampleValue::Vector(self.vector)),
        }
    }

    /// Folds `value` in with `policy`. Returns `None` on a scalar/vector mismatch.
    ///
    /// `Average` accumulates like `Add`; the division happens once in [`Accumulator::finish`].
    pub fn combine(self, value: SampleValue, policy: MergePolicy) -> Option<Self> {
        let mut next = self;
        match (self.kind, value) {
            (ValueType::Undefined, SampleValue::Scalar(v)) => {
                next.kind = ValueType::Scalar;
                next.scalar = v;
            }
            (ValueType::Undefined, SampleValue::Vector(v)) => {
                next.kind = ValueType::Vector;
                next.vector = v;
            }
            (ValueType::Scalar, SampleValue::Scalar(v)) => {
                next.scalar = match policy {
                    MergePolicy::Max => self.scalar.max(v),
                    MergePolicy::Min => self.scalar.min(v),
                    MergePolicy::Add | MergePolicy::Average => self.scalar + v,
                };
            }
            (ValueType::Vector, SampleValue::Vector(v)) => {
                next.vector = match policy {
                    MergePolicy::Max => self.vector.max(v),
                    MergePolicy::Min => self.vector.min(v),
                    MergePolicy::Add | MergePolicy::Average => self.vector + v,
                };
            }
            _ => return None,
        }
        next.hit_count += 1;
        Some(next)
    }

    /// Final channel result, normalizing once when `policy` is `Average`.
    pub fn finish(self, policy: MergePolicy) -> ChannelSample {
        let mut acc = self;
        if acc.hit_count > 1 && policy == MergePolicy::Average {
            let scale = 1.0 / acc.hit_count as f32;
            acc.scalar *= scale;
            acc.vector *= scale;
        }
        ChannelSample {
            value: acc.value(),
            hit_count: acc.hit_count,
        }
    }
}

/// Result of sampling one channel at one point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelSample {
    pub value: Option<SampleValue>,
    pub hit_count: u32,
}

impl ChannelSample {
    /// No field contributed.
    pub fn miss() -> Self {
        Self::default()
    }

    #[inline]
    pub fn hit(&self) -> bool {
        self.hit_count > 0
    }

    pub fn value_type(&self) -> ValueType {
        self.value
            .map(|v| ValueType::from(v.kind()))
            .unwrap_or_default()
    }

    pub fn scalar(&self) -> Option<f32> {
        self.value.and_then(|v| v.as_scalar())
    }

    pub fn vector(&self) -> Option<Vec3> {
        self.value.and_then(|v| v.as_vector())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    fn fold(values: &[f32], policy: MergePolicy) -> ChannelSample {
        values
            .iter()
            .try_fold(Accumulator::new(), |acc, &v| {
                acc.combine(SampleValue::Scalar(v), policy)
            })
            .map(|acc| acc.finish(policy))
            .unwrap_or_default()
    }

    #[test]
    fn first_contribution_is_stored_directly() {
        let acc = Accumulator::new()
            .combine(SampleValue::Scalar(-5.0), MergePolicy::Max)
            .unwrap();
        assert_eq!(acc.kind(), ValueType::Scalar);
        approx_eq(acc.scalar(), -5.0);
        assert_eq!(acc.hit_count(), 1);
    }

    #[test]
    fn policies_combine_scalars() {
        approx_eq(fold(&[1.0, 4.0, 2.0], MergePolicy::Add).scalar().unwrap(), 7.0);
        approx_eq(fold(&[1.0, 4.0, 2.0], MergePolicy::Max).scalar().unwrap(), 4.0);
        approx_eq(fold(&[1.0, 4.0, 2.0], MergePolicy::Min).scalar().unwrap(), 1.0);
        let avg = fold(&[2.0, 4.0], MergePolicy::Average);
        approx_eq(avg.scalar().unwrap(), 3.0);
        assert_eq!(avg.hit_count, 2);
    }

    #[test]
    fn vectors_merge_per_component() {
        let acc = Accumulator::new()
            .combine(SampleValue::Vector(Vec3::new(1.0, 5.0, -1.0)), MergePolicy::Max)
            .and_then(|a| a.combine(SampleValue::Vector(Vec3::new(3.0, 2.0, 0.0)), MergePolicy::Max))
            .unwrap();
        assert_eq!(acc.vector(), Vec3::new(3.0, 5.0, 0.0));
    }

    #[test]
    fn mismatched_kind_is_rejected() {
        let acc = Accumulator::new()
            .combine(SampleValue::Scalar(1.5), MergePolicy::Add)
            .unwrap();
        assert!(acc
            .combine(SampleValue::Vector(Vec3::ONE), MergePolicy::Add)
            .is_none());
        let done = acc.finish(MergePolicy::Add);
        assert_eq!(done.value, Some(SampleValue::Scalar(1.5)));
        assert_eq!(done.value_type(), ValueType::Scalar);
    }

    #[test]
    fn empty_fold_is_a_miss() {
        let done = Accumulator::new().finish(MergePolicy::Average);
        assert!(!done.hit());
        assert_eq!(done.value_type(), ValueType::Undefined);
        assert_eq!(done, ChannelSample::miss());
    }
}
