//! Navigation-subsystem error type.
//!
//! Variants fall in two groups.  Construction failures (`Degenerate*`,
//! `Empty*`, `Malformed*`, `*Capacity`, `Duplicate*`) abort the structure
//! being built and should abort the map load.  Search failures (`NoPath`,
//! `NothingInRange`) are ordinary outcomes; [`NavError::is_recoverable`]
//! tells them apart.

use thiserror::Error;

use ln_core::{CoreError, GraphId, PathId, RegionId, WaypointId};

use crate::NavTarget;

/// Errors produced by `ln-nav`.
#[derive(Debug, Error)]
pub enum NavError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("grid of {width}x{height} cells is empty or exceeds the waypoint index space")]
    DegenerateGrid { width: u64, height: u64 },

    #[error("region {0} has no traversable cells")]
    EmptyRegionGraph(RegionId),

    #[error("path {0} has no traversable cells")]
    EmptyPathGraph(PathId),

    #[error("region {region} has a malformed boundary: {reason}")]
    MalformedPolygon { region: RegionId, reason: &'static str },

    #[error("path {path} has a malformed centerline: {reason}")]
    MalformedCenterline { path: PathId, reason: &'static str },

    #[error("too many waypoints or sub-graphs for the id space")]
    GraphCapacity,

    #[error("region {0} already has a navigation graph")]
    DuplicateRegion(RegionId),

    #[error("path {0} already has a navigation graph")]
    DuplicatePath(PathId),

    #[error("region {0} has no navigation graph")]
    UnknownRegion(RegionId),

    #[error("path {0} has no navigation graph")]
    UnknownPath(PathId),

    #[error("graph {0} not found")]
    UnknownGraph(GraphId),

    #[error("waypoint {0} not found")]
    UnknownWaypoint(WaypointId),

    #[error("no path from {start} to {target}")]
    NoPath { start: WaypointId, target: NavTarget },

    #[error("nothing matched within {radius} rings of {start}")]
    NothingInRange { start: WaypointId, radius: u32 },

    #[error("heap is empty")]
    HeapEmpty,

    #[error("heap index {index} out of bounds (len {len})")]
    HeapIndex { index: usize, len: usize },
}

impl NavError {
    /// `true` for expected search misses the caller should simply retry or
    /// route around; `false` for construction and programming errors.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NavError::NoPath { .. } | NavError::NothingInRange { .. })
    }
}

pub type NavResult<T> = Result<T, NavError>;
