//! Navigation and lane configuration.
//!
//! Typically loaded by the application alongside the map and passed to the
//! world builder.  All distances are in world units.

use crate::{CoreError, CoreResult};

/// Tunables shared by grid construction, pathfinding, and lane movement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavConfig {
    /// Edge length of one grid cell.  Default: 8.
    pub cell_size: f32,

    /// Spacing between consecutive lane nodes on a bridge.  Default: 6.
    pub bridge_step: f32,

    /// Half-width, in cells, of the square swept by the spiral range search
    /// when the caller does not pass its own radius.  Default: 6.
    pub range_rings: u32,

    /// A unit closer than this to its lane node counts as settled on it.
    /// Default: 0.5.
    pub settle_radius: f32,

    /// Weight of the normalized squared distance-to-target term in the
    /// pathfinder's step cost.  Default: 1.0.
    pub distance_weight: f32,

    /// Weight of the heading-deviation term in the pathfinder's step cost.
    /// Default: 0.25.
    pub heading_weight: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            cell_size:       8.0,
            bridge_step:     6.0,
            range_rings:     6,
            settle_radius:   0.5,
            distance_weight: 1.0,
            heading_weight:  0.25,
        }
    }
}

impl NavConfig {
    /// Reject values that would make grid or bridge construction meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(CoreError::Config(format!("cell_size must be positive, got {}", self.cell_size)));
        }
        if !(self.bridge_step.is_finite() && self.bridge_step > 0.0) {
            return Err(CoreError::Config(format!("bridge_step must be positive, got {}", self.bridge_step)));
        }
        if !(self.settle_radius >= 0.0) {
            return Err(CoreError::Config(format!("settle_radius must be non-negative, got {}", self.settle_radius)));
        }
        if !(self.distance_weight >= 0.0 && self.heading_weight >= 0.0) {
            return Err(CoreError::Config("cost weights must be non-negative".into()));
        }
        Ok(())
    }
}
