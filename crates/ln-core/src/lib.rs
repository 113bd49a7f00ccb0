//! `ln-core` — foundational types for the lane navigation workspace.
//!
//! This crate is a dependency of every other `ln-*` crate.  It has no
//! `ln-*` dependencies and minimal external ones (`thiserror` and
//! `rustc-hash`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `WaypointId`, `GraphId`, `RegionId`, `PathId`, `NodeId`, … |
//! | [`geo`]     | `Vec2`, `Rect`, segment and polyline helpers               |
//! | [`map`]     | `MapSpec` — the immutable geometry handed over by a loader |
//! | [`config`]  | `NavConfig`                                                |
//! | [`owner`]   | `OwnerLookup`, `Side` — occupant allegiance queries        |
//! | [`error`]   | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod map;
pub mod owner;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::NavConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{Rect, Vec2};
pub use ids::{BridgeId, BuildingId, GraphId, NodeId, PathId, PlayerId, RegionId, UnitId, WaypointId};
pub use map::{BuildingSpec, MapSpec, PathSpec, RegionSpec};
pub use owner::{OwnerLookup, Side};
