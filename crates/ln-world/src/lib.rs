//! `ln-world` — assembles a map's navigation grid and lane network and
//! drives units across it tick by tick.
//!
//! # Crate layout
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`builder`]  | `WorldBuilder` — validates input, builds everything  |
//! | [`world`]    | `World` — spawning, queries, the tick loop           |
//! | [`observer`] | `WorldObserver` trait, `NoopObserver`, `TickSummary` |
//! | [`error`]    | `WorldError`, `WorldResult<T>`                       |
//!
//! # Tick loop
//!
//! ```text
//! World::tick(observer)
//!   ├─ observer.on_tick_start(tick)
//!   ├─ UnitStore::settle                     positions trail lane nodes
//!   ├─ for unit in live units (ascending id):
//!   │    ├─ range_search(range_rings)       Moving ⇄ Fighting
//!   │    ├─ advance_unit_step               conflict rules apply here
//!   │    ├─ lane end → enter_bridge         exit lane / castle approach
//!   │    ├─ observer.on_step(tick, unit, result)
//!   │    └─ mirror lane node onto waypoint
//!   └─ observer.on_tick_end(tick, summary)
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                               |
//! |------------|------------------------------------------------------|
//! | `parallel` | Forwards to `ln-nav/parallel` for batch routing.     |
//! | `serde`    | Propagates serde derives to the lower crates.        |

pub mod builder;
pub mod error;
pub mod observer;
pub mod world;


pub use builder::WorldBuilder;
pub use error::{WorldError, WorldResult};
pub use observer::{NoopObserver, TickSummary, WorldObserver};
pub use world::World;
