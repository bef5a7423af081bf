//! Velocity-based motion blur displacement.
//!
//! A sample point is pushed along the velocity stored in one vector field, or three scalar
//! component fields, by the time elapsed between the base frame and the frame the shutter time
//! maps to.
use std::fmt;
use std::str::FromStr;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::{FieldCatalog, FieldEntry};
use crate::error::Error;
use crate::field::SampleValue;
use crate::sampling::{Accumulator, FieldSampler, Interpolation, MergePolicy};

/// Lower bound for frames per second when converting frames to seconds.
pub const MIN_FPS: f64 = 1e-6;

/// How a shading point's time maps to an absolute frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShutterMode {
    /// Time in `[0, 1]` spans `[motion_start, motion_end]` around the base frame.
    #[default]
    Normalized,
    /// Time is an offset in frames from the base frame.
    FrameRelative,
    /// Time is the absolute frame.
    AbsoluteFrame,
}

impl FromStr for ShutterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normalized" => Ok(ShutterMode::Normalized),
            "relative" | "framerelative" => Ok(ShutterMode::FrameRelative),
            "absolute" | "absoluteframe" => Ok(ShutterMode::AbsoluteFrame),
            other => Err(Error::InvalidConfig(format!(
                "unknown shutter mode '{}'",
                other
            ))),
        }
    }
}

/// Names of the field(s) supplying velocity.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VelocitySpec {
    Vector(String),
    Components([String; 3]),
}

impl VelocitySpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            VelocitySpec::Vector(name) => vec![name.as_str()],
            VelocitySpec::Components(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Number of fields an entry must reference for displacement to apply.
    pub fn field_count(&self) -> usize {
        match self {
            VelocitySpec::Vector(_) => 1,
            VelocitySpec::Components(_) => 3,
        }
    }
}

impl fmt::Display for VelocitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocitySpec::Vector(name) => write!(f, "'{}'", name),
            VelocitySpec::Components([x, y, z]) => write!(f, "'{},{},{}'", x, y, z),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct MotionBlurConfig {
    pub velocity: Option<VelocitySpec>,
    pub velocity_scale: f64,
    pub shutter: ShutterMode,
    pub motion_start: f64,
    pub motion_end: f64,
    pub fps: f64,
    /// Velocities are stored in world orientation rather than field-local units.
    pub velocity_in_world_space: bool,
}

impl Default for MotionBlurConfig {
    fn default() -> Self {
        Self {
            velocity: None,
            velocity_scale: 1.0,
            shutter: ShutterMode::Normalized,
            motion_start: -0.25,
            motion_end: 0.25,
            fps: 24.0,
            velocity_in_world_space: false,
        }
    }
}

impl MotionBlurConfig {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.velocity.is_some()
    }

    /// Absolute frame for shutter time `time` around `frame`.
    pub fn shutter_frame(&self, frame: f64, time: f64) -> f64 {
        match self.shutter {
            ShutterMode::Normalized if self.motion_end > self.motion_start => {
                frame + self.motion_start + time * (self.motion_end - self.motion_start)
            }
            ShutterMode::Normalized => frame,
            ShutterMode::FrameRelative => frame + time,
            ShutterMode::AbsoluteFrame => time,
        }
    }

    /// Seconds between `frame` and the frame `time` maps to.
    pub fn shutter_seconds(&self, frame: f64, time: f64) -> f64 {
        (self.shutter_frame(frame, time) - frame) / self.fps.max(MIN_FPS)
    }
}

/// Displaces sample points of one catalog.
#[derive(Clone, Copy, Debug)]
pub struct MotionBlurDisplacer<'a> {
    catalog: &'a FieldCatalog,
    config: &'a MotionBlurConfig,
    frame: f64,
    ignore_transform: bool,
}

impl<'a> MotionBlurDisplacer<'a> {
    pub fn new(
        catalog: &'a FieldCatalog,
        config: &'a MotionBlurConfig,
        frame: f64,
        ignore_transform: bool,
    ) -> Self {
        Self {
            catalog,
            config,
            frame,
            ignore_transform,
        }
    }

    /// Displaced voxel-space point for `entry`.
    ///
    /// `p_world` is the undisplaced shading point and `p_local` its image in `entry`'s local
    /// space. When no usable velocity is referenced the point is returned unchanged. The
    /// displaced point is not re-checked against the unit cube.
    pub fn displace(
        &self,
        entry: &FieldEntry,
        p_world: DVec3,
        p_local: DVec3,
        time: f64,
        interpolation: Interpolation,
    ) -> DVec3 {
        let p_voxel = entry.mapping().local_to_voxel(p_local);
        let Some(spec) = self.config.velocity.as_ref() else {
            return p_voxel;
        };
        if entry.velocity_refs().len() != spec.field_count() {
            return p_voxel;
        }

        let Some(velocity) = self.velocity_at(entry.velocity_refs(), p_world, interpolation)
        else {
            return p_voxel;
        };

        let velocity = if self.config.velocity_in_world_space && !self.ignore_transform {
            let m = entry.mapping();
            m.world_to_local(velocity) - m.world_to_local(DVec3::ZERO)
        } else {
            velocity
        };

        let seconds = self.config.shutter_seconds(self.frame, time);
        let displaced = p_local + velocity * self.config.velocity_scale * seconds;
        trace!(
            "Displace {} by {:?} ({} s).",
            entry.display_name(),
            displaced - p_local,
            seconds
        );
        entry.mapping().local_to_voxel(displaced)
    }

    /// Velocity read from the referenced field(s) at world point `p_world`.
    fn velocity_at(
        &self,
        refs: &[usize],
        p_world: DVec3,
        interpolation: Interpolation,
    ) -> Option<DVec3> {
        let read = |index: usize| -> Option<SampleValue> {
            let field = self.catalog.get(index)?;
            let p = if self.ignore_transform {
                field.mapping().local_to_voxel(p_world)
            } else {
                field.mapping().world_to_voxel(p_world)
            };
            FieldSampler::sample(
                field,
                p,
                interpolation,
                MergePolicy::Average,
                Accumulator::new(),
            )?
            .value()
        };

        match refs {
            [v] => read(*v)?.as_vector().map(|v| v.as_dvec3()),
            [x, y, z] => Some(DVec3::new(
                read(*x)?.as_scalar()? as f64,
                read(*y)?.as_scalar()? as f64,
                read(*z)?.as_scalar()? as f64,
            )),
            _ => None,
        }
    }
}
