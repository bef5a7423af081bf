//! Data-source boundary.
//!
//! A [`VolumeSource`] enumerates partitions and layers and hands out opaque field handles. The
//! on-disk reader lives outside this crate; [`MemorySource`] is the in-memory implementation used
//! by tests, benches and demos.
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::field::{FieldHandle, FieldMapping};

/// One field as produced by a source, before resolution.
#[derive(Clone, Debug)]
pub struct RawField {
    pub handle: FieldHandle,
    pub mapping: FieldMapping,
}

impl RawField {
    pub fn new<F: Any + Send + Sync>(field: F, mapping: FieldMapping) -> Self {
        Self {
            handle: Arc::new(field),
            mapping,
        }
    }
}

/// Enumerates partitions and layers of one opened data source.
pub trait VolumeSource {
    fn partition_names(&self) -> Vec<String>;

    fn scalar_layer_names(&self, partition: &str) -> Vec<String>;

    fn vector_layer_names(&self, partition: &str) -> Vec<String>;

    /// All fields stored under `partition`/`layer`, in storage order.
    fn read_layers(&self, partition: &str, layer: &str, is_vector: bool) -> Vec<RawField>;
}

/// Opens a data source by path.
pub trait SourceOpener {
    fn open(&self, path: &str) -> Result<Box<dyn VolumeSource>>;
}

#[derive(Clone, Debug, Default)]
struct MemoryLayer {
    name: String,
    fields: Vec<RawField>,
}

#[derive(Clone, Debug, Default)]
struct MemoryPartition {
    name: String,
    scalar: Vec<MemoryLayer>,
    vector: Vec<MemoryLayer>,
}

impl MemoryPartition {
    fn layers(&self, is_vector: bool) -> &[MemoryLayer] {
        if is_vector {
            &self.vector
        } else {
            &self.scalar
        }
    }
}

/// In-memory source. Partitions and layers keep their insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    partitions: Vec<MemoryPartition>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `field` to the layer, creating the partition and layer on first use.
    pub fn add_field(
        &mut self,
        partition: impl Into<String>,
        layer: impl Into<String>,
        is_vector: bool,
        field: RawField,
    ) {
        let partition = partition.into();
        let layer = layer.into();

        let pidx = match self.partitions.iter().position(|p| p.name == partition) {
            Some(i) => i,
            None => {
                self.partitions.push(MemoryPartition {
                    name: partition,
                    ..Default::default()
                });
                self.partitions.len() - 1
            }
        };

        let p = &mut self.partitions[pidx];
        let layers = if is_vector { &mut p.vector } else { &mut p.scalar };
        match layers.iter_mut().find(|l| l.name == layer) {
            Some(l) => l.fields.push(field),
            None => layers.push(MemoryLayer {
                name: layer,
                fields: vec![field],
            }),
        }
    }

    pub fn with_scalar_layer<F: Any + Send + Sync>(
        mut self,
        partition: impl Into<String>,
        layer: impl Into<String>,
        field: F,
        mapping: FieldMapping,
    ) -> Self {
        self.add_field(partition, layer, false, RawField::new(field, mapping));
        self
    }

    pub fn with_vector_layer<F: Any + Send + Sync>(
        mut self,
        partition: impl Into<String>,
        layer: impl Into<String>,
        field: F,
        mapping: FieldMapping,
    ) -> Self {
        self.add_field(partition, layer, true, RawField::new(field, mapping));
        self
    }

    fn partition(&self, name: &str) -> Option<&MemoryPartition> {
        self.partitions.iter().find(|p| p.name == name)
    }

    fn layer_names(&self, partition: &str, is_vector: bool) -> Vec<String> {
        self.partition(partition)
            .map(|p| p.layers(is_vector).iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default()
    }
}

impl VolumeSource for MemorySource {
    fn partition_names(&self) -> Vec<String> {
        self.partitions.iter().map(|p| p.name.clone()).collect()
    }

    fn scalar_layer_names(&self, partition: &str) -> Vec<String> {
        self.layer_names(partition, false)
    }

    fn vector_layer_names(&self, partition: &str) -> Vec<String> {
        self.layer_names(partition, true)
    }

    fn read_layers(&self, partition: &str, layer: &str, is_vector: bool) -> Vec<RawField> {
        self.partition(partition)
            .and_then(|p| p.layers(is_vector).iter().find(|l| l.name == layer))
            .map(|l| l.fields.clone())
            .unwrap_or_default()
    }
}

/// Opener over a fixed set of in-memory sources keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryOpener {
    sources: HashMap<String, MemorySource>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<String>, source: MemorySource) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, source: MemorySource) {
        self.sources.insert(path.into(), source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SourceOpener for MemoryOpener {
    fn open(&self, path: &str) -> Result<Box<dyn VolumeSource>> {
        debug!("Open volume source: {}", path);
        match self.sources.get(path) {
            Some(source) => Ok(Box::new(source.clone())),
            None => Err(Error::Open {
                path: path.to_string(),
                reason: "no such volume".to_string(),
            }),
        }
    }
}
