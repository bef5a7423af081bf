//! Field catalog: every field discovered in one data source plus the alias index over them.
//!
//! Discovery order is partitions in enumeration order, then within each partition its scalar
//! layers followed by its vector layers. Positions in that order are the stable indices used by
//! the alias index and by velocity references between entries.
pub mod alias;
pub mod entry;
pub mod source;

use std::collections::HashMap;

use tracing::{debug, info, warn};

pub use alias::{base_name, AliasIndex};
pub use entry::FieldEntry;
pub use source::{MemoryOpener, MemorySource, RawField, SourceOpener, VolumeSource};

use crate::volume::motion::VelocitySpec;

/// Ordered, immutable collection of [`FieldEntry`] with alias lookup.
#[derive(Clone, Debug, Default)]
pub struct FieldCatalog {
    entries: Vec<FieldEntry>,
    aliases: AliasIndex,
}

impl FieldCatalog {
    /// Catalog with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Enumerates and resolves every field of `source`.
    ///
    /// With `partition` set only that partition is read. With `velocity` set, every entry that is
    /// not itself a velocity field gets its velocity references resolved.
    pub fn build(
        source: &dyn VolumeSource,
        partition: Option<&str>,
        velocity: Option<&VelocitySpec>,
    ) -> Self {
        let partitions = match partition {
            Some(p) => {
                if !source.partition_names().iter().any(|n| n == p) {
                    warn!("Partition '{}' not found in source.", p);
                }
                vec![p.to_string()]
            }
            None => source.partition_names(),
        };

        let mut catalog = Self::empty();
        let mut global_counters: HashMap<String, usize> = HashMap::new();

        for partition in &partitions {
            debug!("Found partition \"{}\"", partition);
            let mut partition_counters: HashMap<String, usize> = HashMap::new();

            for is_vector in [false, true] {
                let layers = if is_vector {
                    source.vector_layer_names(partition)
                } else {
                    source.scalar_layer_names(partition)
                };

                for layer in layers {
                    for raw in source.read_layers(partition, &layer, is_vector) {
                        let g = global_counters.entry(layer.clone()).or_insert(0);
                        let p = partition_counters.entry(layer.clone()).or_insert(0);
                        let entry = FieldEntry::new(partition, &layer, *g, *p, is_vector, &raw);
                        *g += 1;
                        *p += 1;
                        catalog.push(entry);
                    }
                }
            }
        }

        if let Some(spec) = velocity {
            catalog.resolve_velocity_refs(spec);
        }

        info!(
            "Field catalog built: {} fields ({} valid) in {} partitions.",
            catalog.len(),
            catalog.valid_entries().count(),
            partitions.len()
        );
        catalog
    }

    fn push(&mut self, entry: FieldEntry) {
        let index = self.entries.len();
        debug!("Add channel {}", entry.display_name());
        self.aliases.insert(&entry, index);
        self.entries.push(entry);
    }

    fn resolve_velocity_refs(&mut self, spec: &VelocitySpec) {
        for i in 0..self.entries.len() {
            let entry = &self.entries[i];
            if !entry.is_valid() || spec.names().contains(&entry.name()) {
                continue;
            }

            let refs: Option<Vec<usize>> = match spec {
                VelocitySpec::Vector(name) => self
                    .find_velocity(entry.partition(), name, true)
                    .map(|v| vec![v]),
                VelocitySpec::Components(names) => names
                    .iter()
                    .map(|n| self.find_velocity(entry.partition(), n, false))
                    .collect(),
            };

            match refs {
                Some(refs) => self.entries[i].set_velocity_refs(refs),
                None => warn!(
                    "No velocity field {} for {}; motion blur disabled for it.",
                    spec,
                    entry.display_name()
                ),
            }
        }
    }

    /// First valid entry named `name`, preferring `partition`.
    fn find_velocity(&self, partition: &str, name: &str, is_vector: bool) -> Option<usize> {
        let qualified = format!("{}.{}", partition, name);
        for alias in [qualified.as_str(), name] {
            let found = self.lookup(alias).iter().copied().find(|&i| {
                let e = &self.entries[i];
                e.is_valid() && e.is_vector() == is_vector
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&FieldEntry> {
        self.entries.get(index)
    }

    /// Entries with resolved storage, paired with their catalog index.
    pub fn valid_entries(&self) -> impl Iterator<Item = (usize, &FieldEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.is_valid())
    }

    /// Catalog indices for any of the four alias forms; empty for unknown names.
    #[inline]
    pub fn lookup(&self, alias: &str) -> &[usize] {
        self.aliases.lookup(alias)
    }

    #[inline]
    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    /// True when both catalogs hold the same fields in the same order.
    pub fn is_identical(&self, other: &FieldCatalog) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.is_identical(b))
    }
}
