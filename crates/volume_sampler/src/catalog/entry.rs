//! Catalog entries: one resolved handle over one physical field.
use tracing::{debug, warn};

use crate::catalog::source::RawField;
use crate::field::{resolve, FieldMapping, FieldShape, FieldStorage, Precision};

/// A field discovered in a data source.
///
/// Entries that no representation matched keep their slot so indices stay stable, but report
/// `is_valid() == false` and are skipped by sampling, bounds and ray extents.
#[derive(Clone, Debug)]
pub struct FieldEntry {
    partition: String,
    name: String,
    global_index: usize,
    partition_index: usize,
    is_vector: bool,
    storage: Option<FieldStorage>,
    mapping: FieldMapping,
    velocity_refs: Vec<usize>,
}

impl FieldEntry {
    /// Creates an entry and resolves `raw`, trying each precision in [`Precision::PROBE_ORDER`].
    pub fn new(
        partition: impl Into<String>,
        name: impl Into<String>,
        global_index: usize,
        partition_index: usize,
        is_vector: bool,
        raw: &RawField,
    ) -> Self {
        let mut entry = Self {
            partition: partition.into(),
            name: name.into(),
            global_index,
            partition_index,
            is_vector,
            storage: None,
            mapping: raw.mapping.clone(),
            velocity_refs: Vec::new(),
        };
        entry.setup(raw);
        entry
    }

    fn setup(&mut self, raw: &RawField) {
        for precision in Precision::PROBE_ORDER {
            if let Some(storage) = resolve(&raw.handle, precision, self.is_vector) {
                let data_res = storage.as_field().resolution();
                if data_res != self.mapping.resolution() {
                    warn!(
                        "Field {} holds {:?} voxels but its mapping expects {:?}; skipped.",
                        self.display_name(),
                        data_res,
                        self.mapping.resolution()
                    );
                    return;
                }
                debug!(
                    "Resolved {}: {:?} {:?}",
                    self.display_name(),
                    storage.shape(),
                    precision
                );
                self.storage = Some(storage);
                return;
            }
        }
        warn!(
            "Could not resolve field {} as {} data.",
            self.display_name(),
            if self.is_vector { "vector" } else { "scalar" }
        );
    }

    #[inline]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn global_index(&self) -> usize {
        self.global_index
    }

    #[inline]
    pub fn partition_index(&self) -> usize {
        self.partition_index
    }

    #[inline]
    pub fn is_vector(&self) -> bool {
        self.is_vector
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.storage.is_some()
    }

    #[inline]
    pub fn storage(&self) -> Option<&FieldStorage> {
        self.storage.as_ref()
    }

    pub fn shape(&self) -> Option<FieldShape> {
        self.storage.as_ref().map(FieldStorage::shape)
    }

    pub fn precision(&self) -> Option<Precision> {
        self.storage.as_ref().map(FieldStorage::precision)
    }

    #[inline]
    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// Catalog indices of the fields supplying this entry's velocity.
    #[inline]
    pub fn velocity_refs(&self) -> &[usize] {
        &self.velocity_refs
    }

    pub(crate) fn set_velocity_refs(&mut self, refs: Vec<usize>) {
        self.velocity_refs = refs;
    }

    /// `partition.name[partition_index]`, as used in log messages.
    pub fn display_name(&self) -> String {
        format!("{}.{}[{}]", self.partition, self.name, self.partition_index)
    }

    /// True when both entries would read the same data the same way.
    pub fn is_identical(&self, other: &FieldEntry) -> bool {
        self.partition == other.partition
            && self.name == other.name
            && self.global_index == other.global_index
            && self.partition_index == other.partition_index
            && self.is_vector == other.is_vector
            && self.shape() == other.shape()
            && self.precision() == other.precision()
            && self.mapping.is_identical(&other.mapping)
            && self.velocity_refs == other.velocity_refs
    }
}
