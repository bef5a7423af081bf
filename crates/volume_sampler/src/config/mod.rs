//! Session configuration.
//!
//! A [`VolumeConfig`] is usually parsed from the renderer's flag string with
//! [`VolumeConfig::parse`], or built with the `with_*` setters. With the `ron` feature it can
//! also be loaded from RON text.
pub mod frame;
pub mod params;

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use frame::substitute_frame;

use crate::catalog::base_name;
use crate::error::{Error, Result};
use crate::sampling::MergePolicy;
use crate::volume::motion::MotionBlurConfig;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeConfig {
    /// Data source path, possibly containing a frame pattern.
    pub path: String,
    /// Restricts discovery to one partition.
    pub partition: Option<String>,
    pub frame: f64,
    /// Treat world space as every field's local space.
    pub ignore_transform: bool,
    pub verbose: bool,
    /// Merge policy per channel alias or layer name.
    pub merge: HashMap<String, MergePolicy>,
    pub motion: MotionBlurConfig,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            partition: None,
            frame: 1.0,
            ignore_transform: false,
            verbose: false,
            merge: HashMap::new(),
            motion: MotionBlurConfig::default(),
        }
    }
}

impl VolumeConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Parses the renderer's flag string; see [`params::parse`].
    pub fn parse(user_string: &str, frame: f64) -> Result<Self> {
        params::parse(user_string, frame)
    }

    #[cfg(feature = "ron")]
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    pub fn with_frame(mut self, frame: f64) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_ignore_transform(mut self, ignore: bool) -> Self {
        self.ignore_transform = ignore;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_merge(mut self, channel: impl Into<String>, policy: MergePolicy) -> Self {
        self.merge.insert(channel.into(), policy);
        self
    }

    pub fn with_motion(mut self, motion: MotionBlurConfig) -> Self {
        self.motion = motion;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::InvalidConfig("no file path given".into()));
        }
        if !self.frame.is_finite() {
            return Err(Error::InvalidConfig(format!("invalid frame {}", self.frame)));
        }
        if self.partition.as_deref().is_some_and(|p| p.is_empty()) {
            return Err(Error::InvalidConfig("empty partition name".into()));
        }
        let m = &self.motion;
        for (name, v) in [
            ("velocity scale", m.velocity_scale),
            ("motion start", m.motion_start),
            ("motion end", m.motion_end),
            ("fps", m.fps),
        ] {
            if !v.is_finite() {
                return Err(Error::InvalidConfig(format!("invalid {} {}", name, v)));
            }
        }
        if let Some(spec) = &m.velocity {
            if spec.names().iter().any(|n| n.is_empty()) {
                return Err(Error::InvalidConfig("empty velocity field name".into()));
            }
        }
        Ok(())
    }

    /// Path with the frame pattern in its basename replaced by `floor(frame)`.
    pub fn resolved_path(&self) -> String {
        substitute_frame(&self.path, self.frame)
    }

    /// Policy for `channel`: exact alias first, then its bare layer name, else `Add`.
    pub fn merge_policy(&self, channel: &str) -> MergePolicy {
        self.merge
            .get(channel)
            .or_else(|| self.merge.get(base_name(channel)))
            .copied()
            .unwrap_or_default()
    }

    /// True when `other` reads the same fields from the same source, so the catalog built for
    /// one is valid for the other.
    pub fn is_identical(&self, other: &VolumeConfig) -> bool {
        self.resolved_path() == other.resolved_path()
            && self.partition == other.partition
            && self.motion.velocity == other.motion.velocity
    }
}
