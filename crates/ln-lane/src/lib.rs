//! `ln-lane` — lanes ("bridges") and the units walking them.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`bridge`]   | `BridgeNetwork`, `BridgeNetworkBuilder`, `LaneNode`, `Direction` |
//! | [`unit`]     | `UnitStore` (SoA), `Stance`, `UnitParams`                       |
//! | [`movement`] | `advance_unit_step`, `enter_bridge`, `StepOutcome`              |
//! | [`error`]    | `LaneError`, `LaneResult<T>`                                    |
//!
//! # Build order
//!
//! ```text
//! BridgeNetworkBuilder::new(step)
//!   └─ add_path_lane(path)                for every path
//!   └─ build_region_bridges(map, region)  for every region
//!   └─ build()                            junction table + R-tree
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public enums.  |

pub mod bridge;
pub mod error;
pub mod movement;
pub mod unit;


pub use bridge::{interior_layout, Bridge, BridgeKind, BridgeNetwork, BridgeNetworkBuilder, Direction, LaneNode};
pub use error::{LaneError, LaneResult};
pub use movement::{advance_unit_step, enter_bridge, StepOutcome};
pub use unit::{Stance, UnitParams, UnitStore};
