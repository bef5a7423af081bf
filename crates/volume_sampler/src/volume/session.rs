//! Volume session: channel sampling and ray extents over one opened data source.
//!
//! Typical usage:
//! - Create a session with [`VolumeSession::create`] from a [`VolumeConfig`] and a
//!   [`SourceOpener`].
//! - Query [`VolumeSession::bounds`] once, then call [`VolumeSession::ray_extents`] and
//!   [`VolumeSession::sample`] from any number of threads.
//! - Call [`VolumeSession::update`] when the configuration changes.
use std::fmt;
use std::sync::Arc;

use glam::{DVec3, Vec3};
use tracing::{debug, error, info, trace, warn};

use crate::catalog::{FieldCatalog, SourceOpener};
use crate::config::VolumeConfig;
use crate::error::Result;
use crate::field::mapping::in_unit_cube;
use crate::sampling::{Accumulator, ChannelSample, FieldSampler, Interpolation};
use crate::volume::bounds::{compute_bounds, VolumeBounds};
use crate::volume::extents::{field_extent, Extent, ExtentSet};
use crate::volume::motion::MotionBlurDisplacer;

/// World-space point at which a channel is sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShadingPoint {
    pub position: Vec3,
    /// Shutter time, interpreted per [`crate::volume::motion::ShutterMode`].
    pub time: f32,
}

impl ShadingPoint {
    pub fn new(position: impl Into<mint::Vector3<f32>>) -> Self {
        let p: mint::Vector3<f32> = position.into();
        Self {
            position: Vec3::from(p),
            time: 0.0,
        }
    }

    pub fn with_time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }
}

impl From<Vec3> for ShadingPoint {
    fn from(position: Vec3) -> Self {
        Self::new(position)
    }
}

/// What [`VolumeSession::update`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Same source and fields; only render parameters changed.
    ParametersOnly,
    /// A new catalog was built and swapped in.
    Rebuilt,
}

/// Sampling and ray-interval queries over one catalog.
///
/// The catalog is immutable once built and shared through an [`Arc`], so sampling takes `&self`
/// and may run concurrently. A session whose source failed to open is inert: every sample
/// misses, extents are empty and bounds are [`VolumeBounds::EMPTY`].
#[derive(Clone)]
pub struct VolumeSession {
    config: VolumeConfig,
    resolved_path: Option<String>,
    catalog: Arc<FieldCatalog>,
    bounds: VolumeBounds,
}

impl fmt::Debug for VolumeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeSession")
            .field("resolved_path", &self.resolved_path)
            .field("fields", &self.catalog.len())
            .field("bounds", &self.bounds)
            .finish()
    }
}

impl Default for VolumeSession {
    fn default() -> Self {
        Self::inert()
    }
}

macro_rules! diag {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            debug!($($arg)+);
        } else {
            trace!($($arg)+);
        }
    };
}

impl VolumeSession {
    /// Session with no data.
    pub fn inert() -> Self {
        Self {
            config: VolumeConfig::default(),
            resolved_path: None,
            catalog: Arc::new(FieldCatalog::empty()),
            bounds: VolumeBounds::EMPTY,
        }
    }

    /// Opens the configured source and builds its catalog and bounds.
    pub fn create(config: VolumeConfig, opener: &dyn SourceOpener) -> Result<Self> {
        config.validate()?;
        let path = config.resolved_path();
        let source = opener.open(&path).map_err(|e| {
            error!("Failed to open '{}': {}", path, e);
            e
        })?;

        let catalog = FieldCatalog::build(
            source.as_ref(),
            config.partition.as_deref(),
            config.motion.velocity.as_ref(),
        );
        let bounds = compute_bounds(&catalog, config.ignore_transform);
        info!(
            "Volume session for '{}': {} fields, auto step {}.",
            path,
            catalog.len(),
            bounds.auto_step
        );

        Ok(Self {
            config,
            resolved_path: Some(path),
            catalog: Arc::new(catalog),
            bounds,
        })
    }

    /// Applies a new configuration.
    ///
    /// When `config` reads the same fields as the current one, only parameters are updated.
    /// Otherwise a candidate session is built completely; if its catalog turns out identical the
    /// current catalog is kept, else the candidate replaces this session. On failure the session
    /// becomes inert and the error is returned.
    pub fn update(
        &mut self,
        config: VolumeConfig,
        opener: &dyn SourceOpener,
    ) -> Result<UpdateOutcome> {
        if !self.is_inert() && self.config.is_identical(&config) {
            if let Err(e) = config.validate() {
                *self = Self::inert();
                return Err(e);
            }
            self.apply_parameters(config);
            return Ok(UpdateOutcome::ParametersOnly);
        }

        match Self::create(config, opener) {
            Ok(candidate) => {
                if !self.is_inert()
                    && self.resolved_path == candidate.resolved_path
                    && self.catalog.is_identical(&candidate.catalog)
                {
                    debug!("Rebuilt catalog is identical; keeping the current one.");
                    self.apply_parameters(candidate.config);
                    Ok(UpdateOutcome::ParametersOnly)
                } else {
                    *self = candidate;
                    Ok(UpdateOutcome::Rebuilt)
                }
            }
            Err(e) => {
                warn!("Volume session update failed; session is now inert.");
                *self = Self::inert();
                Err(e)
            }
        }
    }

    fn apply_parameters(&mut self, config: VolumeConfig) {
        if config.ignore_transform != self.config.ignore_transform {
            self.bounds = compute_bounds(&self.catalog, config.ignore_transform);
        }
        self.config = config;
    }

    /// True when no source is open.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.resolved_path.is_none()
    }

    #[inline]
    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    /// Path the source was opened from, after frame substitution.
    pub fn resolved_path(&self) -> Option<&str> {
        self.resolved_path.as_deref()
    }

    pub fn catalog(&self) -> Arc<FieldCatalog> {
        Arc::clone(&self.catalog)
    }

    #[inline]
    pub fn bounds(&self) -> VolumeBounds {
        self.bounds
    }

    /// Samples `channel` at `point`, merging every field registered under that alias.
    ///
    /// Unknown channels and points outside every field miss; they never fail.
    pub fn sample(
        &self,
        channel: &str,
        point: impl Into<ShadingPoint>,
        interpolation: Interpolation,
    ) -> ChannelSample {
        let point = point.into();
        let verbose = self.config.verbose;
        let indices = self.catalog.lookup(channel);
        if indices.is_empty() {
            if !self.is_inert() {
                warn!("Unknown channel '{}'.", channel);
            }
            return ChannelSample::miss();
        }

        let policy = self.config.merge_policy(channel);
        let p_world = point.position.as_dvec3();
        let displacer = self.config.motion.is_enabled().then(|| {
            MotionBlurDisplacer::new(
                &self.catalog,
                &self.config.motion,
                self.config.frame,
                self.config.ignore_transform,
            )
        });

        let acc = indices.iter().fold(Accumulator::new(), |acc, &index| {
            let Some(entry) = self.catalog.get(index).filter(|e| e.is_valid()) else {
                return acc;
            };
            diag!(verbose, "Process field {}", entry.display_name());

            let p_local = if self.config.ignore_transform {
                p_world
            } else {
                entry.mapping().world_to_local(p_world)
            };
            if !in_unit_cube(p_local) {
                diag!(verbose, "Not in volume");
                return acc;
            }

            let p_voxel = match &displacer {
                Some(d) => d.displace(entry, p_world, p_local, point.time as f64, interpolation),
                None => entry.mapping().local_to_voxel(p_local),
            };

            match FieldSampler::sample(entry, p_voxel, interpolation, policy, acc) {
                Some(next) => next,
                None => {
                    diag!(verbose, "Rejected contribution of {}", entry.display_name());
                    acc
                }
            }
        });

        let result = acc.finish(policy);
        diag!(
            verbose,
            "Sample '{}': {} hits, {:?}",
            channel,
            result.hit_count,
            result.value
        );
        result
    }

    /// Sorted, disjoint sub-intervals of `[t0, t1]` where the ray crosses any field.
    pub fn ray_extents(
        &self,
        origin: impl Into<mint::Vector3<f32>>,
        direction: impl Into<mint::Vector3<f32>>,
        t0: f32,
        t1: f32,
    ) -> Vec<Extent> {
        let origin = Vec3::from(origin.into()).as_dvec3();
        let direction = Vec3::from(direction.into()).as_dvec3();
        self.extent_set(origin, direction, t0, t1).into_vec()
    }

    /// Same as [`VolumeSession::ray_extents`] in double precision, returning the merged set.
    pub fn extent_set(&self, origin: DVec3, direction: DVec3, t0: f32, t1: f32) -> ExtentSet {
        let verbose = self.config.verbose;
        let mut extents = ExtentSet::new();
        if t0 >= t1 {
            return extents;
        }

        for (_, entry) in self.catalog.valid_entries() {
            match field_extent(
                entry.mapping(),
                self.config.ignore_transform,
                origin,
                direction,
                t0,
                t1,
            ) {
                Some(extent) => {
                    diag!(
                        verbose,
                        "Extent of {}: {} -> {}",
                        entry.display_name(),
                        extent.t_min,
                        extent.t_max
                    );
                    extents.merge_in(extent);
                }
                None => diag!(verbose, "{} doesn't intersect", entry.display_name()),
            }
        }
        extents
    }
}
