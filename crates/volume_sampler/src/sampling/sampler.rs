//! Per-entry sampling.
use glam::DVec3;
use tracing::trace;

use crate::catalog::FieldEntry;
use crate::field::interp::closest_cell;
use crate::field::{FieldStorage, SampleValue};
use crate::sampling::{Accumulator, Interpolation, MergePolicy};

/// Stateless sampling over catalog entries.
pub struct FieldSampler;

impl FieldSampler {
    /// Reconstructs `storage` at voxel-space point `p`.
    pub fn evaluate(storage: &FieldStorage, p: DVec3, interpolation: Interpolation) -> SampleValue {
        let field = storage.as_field();
        match interpolation {
            Interpolation::Closest => field.cell_value(closest_cell(p)),
            Interpolation::Trilinear => field.trilinear(p),
            Interpolation::Tricubic => field.tricubic(p),
        }
    }

    /// Samples `entry` at `p` and folds the value into `acc`.
    ///
    /// Returns `None` when the entry is unresolved or its value type conflicts with what `acc`
    /// already holds; `acc` itself is never modified.
    pub fn sample(
        entry: &FieldEntry,
        p: DVec3,
        interpolation: Interpolation,
        policy: MergePolicy,
        acc: Accumulator,
    ) -> Option<Accumulator> {
        let storage = entry.storage()?;
        let value = Self::evaluate(storage, p, interpolation);
        let merged = acc.combine(value, policy);
        if merged.is_none() {
            trace!(
                "Type mismatch merging {} into {:?} accumulator.",
                entry.display_name(),
                acc.kind()
            );
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use glam::{UVec3, Vec3};

    use super::*;
    use crate::catalog::RawField;
    use crate::field::{DenseField, FieldMapping, MacComponent, MacField, SparseField};
    use crate::sampling::ValueType;

    fn entry<F: std::any::Any + Send + Sync>(field: F, res: UVec3, is_vector: bool) -> FieldEntry {
        let raw = RawField::new(field, FieldMapping::identity(res));
        FieldEntry::new("p", "f", 0, 0, is_vector, &raw)
    }

    #[test]
    fn closest_returns_the_stored_cell() {
        let e = entry(DenseField::filled(UVec3::ONE, 7.25f32), UVec3::ONE, false);
        let acc = FieldSampler::sample(
            &e,
            DVec3::splat(0.5),
            Interpolation::Closest,
            MergePolicy::Add,
            Accumulator::new(),
        )
        .unwrap();
        assert_eq!(acc.kind(), ValueType::Scalar);
        assert_eq!(acc.scalar(), 7.25);
    }

    #[test]
    fn closest_on_mac_averages_faces() {
        let mut mac = MacField::<f32>::new(UVec3::new(2, 1, 1));
        let u = mac.component_mut(MacComponent::U);
        u.set(0, 0, 0, 1.0);
        u.set(1, 0, 0, 3.0);
        let e = entry(mac, UVec3::new(2, 1, 1), true);
        let v = FieldSampler::evaluate(
            e.storage().unwrap(),
            DVec3::new(0.7, 0.5, 0.5),
            Interpolation::Closest,
        );
        assert_eq!(v, SampleValue::Vector(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn trilinear_on_sparse_matches_midpoint() {
        let mut field = SparseField::<f64>::new(UVec3::new(2, 1, 1));
        field.set(0, 0, 0, 2.0);
        field.set(1, 0, 0, 4.0);
        let e = entry(field, UVec3::new(2, 1, 1), false);
        let v = FieldSampler::evaluate(
            e.storage().unwrap(),
            DVec3::new(1.0, 0.5, 0.5),
            Interpolation::Trilinear,
        );
        assert_eq!(v, SampleValue::Scalar(3.0));
    }

    #[test]
    fn unresolved_entry_does_not_contribute() {
        let e = entry(String::from("opaque"), UVec3::ONE, false);
        assert!(FieldSampler::sample(
            &e,
            DVec3::splat(0.5),
            Interpolation::Tricubic,
            MergePolicy::Add,
            Accumulator::new(),
        )
        .is_none());
    }
}
