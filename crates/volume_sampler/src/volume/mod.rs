//! Volume-level operations composed from the catalog and the sampler.
//!
//! - extents: ray/unit-cube intersection and the sorted disjoint interval set
//! - bounds: world bounding box and auto step over all fields
//! - motion: shutter-time velocity displacement
//! - session: the orchestrating [`VolumeSession`]
pub mod bounds;
pub mod extents;
pub mod motion;
pub mod session;

pub use bounds::{compute_bounds, VolumeBounds};
pub use extents::{Extent, ExtentSet};
pub use motion::{MotionBlurConfig, MotionBlurDisplacer, ShutterMode, VelocitySpec};
pub use session::{ShadingPoint, UpdateOutcome, VolumeSession};
