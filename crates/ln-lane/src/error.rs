//! Lane-subsystem error type.
//!
//! Construction errors abort the bridge being built (and with it the map
//! load).  Movement errors (`LaneEnd`, `InvalidDirection`, `NodeOccupied`)
//! are ordinary: the unit stays put this tick.

use thiserror::Error;

use ln_core::{BridgeId, BuildingId, CoreError, NodeId, PathId, RegionId, UnitId, Vec2};

#[derive(Debug, Error)]
pub enum LaneError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("bridge step must be positive and finite, got {0}")]
    InvalidStep(f32),

    #[error("cannot build a bridge from {a} to {b}")]
    DegenerateBridge { a: Vec2, b: Vec2 },

    #[error("too many lane nodes or bridges for the id space")]
    NodeCapacity,

    #[error("path {0} already has a lane")]
    DuplicatePathLane(PathId),

    #[error("path {0} has no lane; build path lanes before region bridges")]
    MissingPathLane(PathId),

    #[error("region {0} already has bridges")]
    DuplicateRegion(RegionId),

    #[error("node {0} not found")]
    UnknownNode(NodeId),

    #[error("bridge {0} not found")]
    UnknownBridge(BridgeId),

    #[error("building {0} has no anchor node")]
    UnknownBuilding(BuildingId),

    #[error("unit {0} not found")]
    UnknownUnit(UnitId),

    #[error("unit {0} is not on a lane")]
    NotPlaced(UnitId),

    #[error("node {node} is not an end of bridge {bridge}")]
    NotAnEndpoint { node: NodeId, bridge: BridgeId },

    #[error("node {0} is occupied")]
    NodeOccupied(NodeId),

    #[error("unit {unit} reached the end of its lane at {node}")]
    LaneEnd { unit: UnitId, node: NodeId },

    #[error("unit {0} has no valid direction")]
    InvalidDirection(UnitId),
}

impl LaneError {
    /// `true` when the unit simply cannot move right now; `false` for
    /// construction and lookup failures.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LaneError::LaneEnd { .. } | LaneError::InvalidDirection(_) | LaneError::NodeOccupied(_)
        )
    }
}

pub type LaneResult<T> = Result<T, LaneError>;
