#![forbid(unsafe_code)]
//! volume_sampler: Channel sampling and ray intervals over multi-representation voxel volumes.
//!
//! Modules:
//! - field: dense, sparse and MAC voxel storage, space mappings and reconstruction kernels
//! - catalog: data-source boundary, field entries and the channel alias index
//! - sampling: interpolation, merge policies and the per-entry sampler
//! - volume: ray extents, bounds, motion blur displacement and the session orchestrator
//! - config: session configuration and the renderer flag-string parser
pub mod catalog;
pub mod config;
pub mod error;
pub mod field;
pub mod sampling;
pub mod volume;

/// Convenient re-exports for common types. Import with `use volume_sampler::prelude::*;`.
pub mod prelude {
    pub use crate::catalog::{
        FieldCatalog, FieldEntry, MemoryOpener, MemorySource, RawField, SourceOpener,
        VolumeSource,
    };
    pub use crate::config::VolumeConfig;
    pub use crate::error::{Error, Result};
    pub use crate::field::{
        DenseField, FieldHandle, FieldMapping, FieldShape, MacComponent, MacField, Precision,
        SampleValue, SparseField, ValueKind,
    };
    pub use crate::sampling::{
        Accumulator, ChannelSample, FieldSampler, Interpolation, MergePolicy, ValueType,
    };
    pub use crate::volume::{
        compute_bounds, Extent, ExtentSet, MotionBlurConfig, ShadingPoint, ShutterMode,
        UpdateOutcome, VelocitySpec, VolumeBounds, VolumeSession,
    };
}
