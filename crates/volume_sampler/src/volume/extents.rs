//! Ray intervals over the union of all field volumes.
//!
//! [`ExtentSet`] keeps a list of [`Extent`]s sorted by `t_min` and pairwise disjoint; extents that
//! overlap or touch are coalesced as they are merged in.
use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field::FieldMapping;

/// Smallest local-space direction length a ray may have.
pub const MIN_DIRECTION_LENGTH: f64 = 1e-6;

/// Ray-parameter interval with `t_min < t_max`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub t_min: f32,
    pub t_max: f32,
}

impl Extent {
    /// `None` unless `t_min < t_max`.
    pub fn new(t_min: f32, t_max: f32) -> Option<Self> {
        (t_min < t_max).then_some(Self { t_min, t_max })
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.t_max - self.t_min
    }

    /// Overlapping or touching.
    #[inline]
    pub fn meets(&self, other: &Extent) -> bool {
        self.t_min <= other.t_max && other.t_min <= self.t_max
    }

    #[inline]
    pub fn contains(&self, t: f32) -> bool {
        t >= self.t_min && t <= self.t_max
    }

    fn union(&self, other: &Extent) -> Extent {
        Extent {
            t_min: self.t_min.min(other.t_min),
            t_max: self.t_max.max(other.t_max),
        }
    }
}

/// Sorted, disjoint set of extents maintained by incremental merging.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtentSet {
    extents: Vec<Extent>,
}

impl ExtentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `extent`, coalescing it with every extent it overlaps or touches.
    pub fn merge_in(&mut self, extent: Extent) {
        if extent.t_min >= extent.t_max {
            return;
        }

        for i in 0..self.extents.len() {
            let candidate = self.extents[i];
            if extent.t_max < candidate.t_min {
                self.extents.insert(i, extent);
                return;
            }
            if extent.t_min > candidate.t_max {
                continue;
            }

            self.extents[i] = candidate.union(&extent);
            self.coalesce_around(i);
            return;
        }

        self.extents.push(extent);
    }

    /// Absorbs predecessors and successors of `i` that now meet it.
    fn coalesce_around(&mut self, mut i: usize) {
        while i > 0 && self.extents[i - 1].meets(&self.extents[i]) {
            let prev = self.extents.remove(i - 1);
            i -= 1;
            self.extents[i] = self.extents[i].union(&prev);
        }
        while i + 1 < self.extents.len() && self.extents[i + 1].meets(&self.extents[i]) {
            let next = self.extents.remove(i + 1);
            self.extents[i] = self.extents[i].union(&next);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extent> {
        self.extents.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Extent] {
        &self.extents
    }

    pub fn into_vec(self) -> Vec<Extent> {
        self.extents
    }

    pub fn clear(&mut self) {
        self.extents.clear();
    }
}

impl Extend<Extent> for ExtentSet {
    fn extend<I: IntoIterator<Item = Extent>>(&mut self, iter: I) {
        for extent in iter {
            self.merge_in(extent);
        }
    }
}

impl FromIterator<Extent> for ExtentSet {
    fn from_iter<I: IntoIterator<Item = Extent>>(iter: I) -> Self {
        let mut set = ExtentSet::new();
        set.extend(iter);
        set
    }
}

/// Signed ray parameters where `origin + t * dir` enters and leaves the unit cube.
pub fn unit_cube_hit(origin: DVec3, dir: DVec3) -> Option<(f64, f64)> {
    let mut near = f64::NEG_INFINITY;
    let mut far = f64::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d == 0.0 {
            if !(0.0..=1.0).contains(&o) {
                return None;
            }
            continue;
        }
        let a = -o / d;
        let b = (1.0 - o) / d;
        near = near.max(a.min(b));
        far = far.min(a.max(b));
        if near > far {
            return None;
        }
    }

    Some((near, far))
}

/// The interval of `[t0, t1]` over which a world-space ray crosses the field's unit cube.
///
/// Returns `None` for degenerate local directions, misses, intersections entirely behind the
/// origin and intersections outside `[t0, t1]`.
pub fn field_extent(
    mapping: &FieldMapping,
    ignore_transform: bool,
    origin: DVec3,
    dir: DVec3,
    t0: f32,
    t1: f32,
) -> Option<Extent> {
    let (local_origin, local_dir) = if ignore_transform {
        (origin, dir)
    } else {
        let o = mapping.world_to_local(origin);
        (o, mapping.world_to_local(origin + dir) - o)
    };

    // The local direction is left unnormalized so hit parameters stay in world units.
    if local_dir.length() < MIN_DIRECTION_LENGTH {
        return None;
    }

    let (near, far) = unit_cube_hit(local_origin, local_dir)?;
    if far < 0.0 {
        return None;
    }

    Extent::new((near as f32).max(t0), (far as f32).min(t1))
}

#[cfg(test)]
mod tests {
    use glam::UVec3;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    fn e(a: f32, b: f32) -> Extent {
        Extent { t_min: a, t_max: b }
    }

    fn assert_sorted_disjoint(set: &ExtentSet) {
        for w in set.as_slice().windows(2) {
            assert!(w[0].t_max < w[1].t_min, "{:?} meets {:?}", w[0], w[1]);
        }
        for x in set.iter() {
            assert!(x.t_min < x.t_max);
        }
    }

    #[test]
    fn inserts_before_and_appends_after() {
        let mut set = ExtentSet::new();
        set.merge_in(e(5.0, 6.0));
        set.merge_in(e(1.0, 2.0));
        set.merge_in(e(8.0, 9.0));
        assert_eq!(set.into_vec(), vec![e(1.0, 2.0), e(5.0, 6.0), e(8.0, 9.0)]);
    }

    #[test]
    fn bridging_extent_collapses_neighbors() {
        let mut set: ExtentSet = [e(1.0, 2.0), e(3.0, 4.0), e(5.0, 6.0)].into_iter().collect();
        set.merge_in(e(1.5, 5.5));
        assert_eq!(set.into_vec(), vec![e(1.0, 6.0)]);
    }

    #[test]
    fn touching_extents_coalesce() {
        let set: ExtentSet = [e(1.0, 2.0), e(2.0, 3.0)].into_iter().collect();
        assert_eq!(set.into_vec(), vec![e(1.0, 3.0)]);
    }

    #[test]
    fn contained_extent_leaves_set_unchanged() {
        let mut set: ExtentSet = [e(0.0, 10.0)].into_iter().collect();
        set.merge_in(e(2.0, 3.0));
        assert_eq!(set.as_slice(), &[e(0.0, 10.0)]);
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let mut once: ExtentSet = [e(0.0, 1.0), e(4.0, 5.0)].into_iter().collect();
        once.merge_in(e(0.5, 2.0));
        let mut twice = once.clone();
        twice.merge_in(e(0.5, 2.0));
        assert_eq!(once, twice);
    }

    #[test]
    fn degenerate_extents_are_ignored() {
        let mut set = ExtentSet::new();
        set.merge_in(e(2.0, 2.0));
        set.merge_in(e(3.0, 1.0));
        assert!(set.is_empty());
        assert!(Extent::new(1.0, 1.0).is_none());
    }

    #[test]
    fn random_inserts_stay_sorted_disjoint_and_cover_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut set = ExtentSet::new();
            let mut inserted = Vec::new();
            for _ in 0..20 {
                let a = (rng.next_u32() % 100) as f32;
                let len = (rng.next_u32() % 10 + 1) as f32;
                let x = e(a, a + len);
                inserted.push(x);
                set.merge_in(x);
                assert_sorted_disjoint(&set);
            }
            // Probe at half-integers: covered by the set iff covered by some inserted extent.
            for k in 0..220 {
                let t = k as f32 * 0.5 + 0.25;
                let in_set = set.iter().any(|x| x.contains(t));
                let in_inputs = inserted.iter().any(|x| x.contains(t));
                assert_eq!(in_set, in_inputs, "coverage differs at t={t}");
            }
        }
    }

    #[test]
    fn sorted_disjoint_input_passes_through() {
        let input: Vec<Extent> = (0..10).map(|i| e(i as f32 * 3.0, i as f32 * 3.0 + 1.0)).collect();
        let set: ExtentSet = input.iter().copied().collect();
        assert_eq!(set.into_vec(), input);
    }

    #[test]
    fn unit_cube_hit_handles_axis_parallel_rays() {
        let (near, far) = unit_cube_hit(DVec3::new(0.5, 0.5, 2.0), DVec3::NEG_Z).unwrap();
        assert!((near - 1.0).abs() < 1e-12 && (far - 2.0).abs() < 1e-12);
        assert!(unit_cube_hit(DVec3::new(2.0, 0.5, 2.0), DVec3::NEG_Z).is_none());
        let (near, far) = unit_cube_hit(DVec3::new(0.0, 0.5, 2.0), DVec3::NEG_Z).unwrap();
        assert!((near - 1.0).abs() < 1e-12 && (far - 2.0).abs() < 1e-12);
    }

    #[test]
    fn field_extent_maps_back_to_world_units() {
        let mapping =
            FieldMapping::from_bounds(DVec3::splat(-1.0), DVec3::splat(1.0), UVec3::splat(8));
        let x = field_extent(&mapping, false, DVec3::new(0.0, 0.0, 2.0), DVec3::NEG_Z, 0.0, 10.0)
            .unwrap();
        assert!((x.t_min - 1.0).abs() < 1e-5 && (x.t_max - 3.0).abs() < 1e-5);

        let clipped =
            field_extent(&mapping, false, DVec3::new(0.0, 0.0, 2.0), DVec3::NEG_Z, 1.5, 2.0)
                .unwrap();
        assert_eq!(clipped, e(1.5, 2.0));
    }

    #[test]
    fn field_extent_discards_hits_behind_origin() {
        let mapping = FieldMapping::identity(UVec3::ONE);
        assert!(field_extent(
            &mapping,
            false,
            DVec3::new(0.5, 0.5, 2.0),
            DVec3::Z,
            0.0,
            10.0
        )
        .is_none());
        assert!(field_extent(&mapping, false, DVec3::splat(0.5), DVec3::ZERO, 0.0, 1.0).is_none());
    }

    #[test]
    fn origin_inside_the_cube_starts_at_t0() {
        let mapping = FieldMapping::identity(UVec3::ONE);
        let x = field_extent(&mapping, true, DVec3::splat(0.5), DVec3::X, 0.0, 10.0).unwrap();
        assert_eq!(x, e(0.0, 0.5));
    }
}
