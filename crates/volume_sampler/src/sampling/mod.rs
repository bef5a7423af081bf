//! Point sampling of catalog entries and channel-level merging.
//!
//! - [`Interpolation`] selects the reconstruction kernel.
//! - [`MergePolicy`] decides how contributions of several fields under one channel combine.
//! - [`Accumulator`] is the fold state threaded through the contributing entries.
//! - [`FieldSampler`] samples one entry and folds the result into an accumulator.
pub mod accumulator;
pub mod sampler;

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use accumulator::{Accumulator, ChannelSample};
pub use sampler::FieldSampler;

use crate::error::Error;
use crate::field::ValueKind;

/// Reconstruction kernel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    #[default]
    Closest,
    Trilinear,
    Tricubic,
}

/// How contributions of several fields under one channel combine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MergePolicy {
    #[default]
    Add,
    Max,
    Min,
    Average,
}

impl FromStr for MergePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(MergePolicy::Add),
            "max" => Ok(MergePolicy::Max),
            "min" => Ok(MergePolicy::Min),
            "avg" | "average" => Ok(MergePolicy::Average),
            other => Err(Error::InvalidConfig(format!(
                "unknown merge policy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MergePolicy::Add => "add",
            MergePolicy::Max => "max",
            MergePolicy::Min => "min",
            MergePolicy::Average => "avg",
        };
        f.write_str(s)
    }
}

/// Type tag of a sample result.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    #[default]
    Undefined,
    Scalar,
    Vector,
}

impl From<ValueKind> for ValueType {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Scalar => ValueType::Scalar,
            ValueKind::Vector => ValueType::Vector,
        }
    }
}
