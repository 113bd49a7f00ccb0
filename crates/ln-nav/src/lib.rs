//! `ln-nav` — navigation grid, sub-graphs, pathfinding, and proximity search.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`heap`]      | `MinHeap` — indexable binary min-heap with decrease-key     |
//! | [`grid`]      | `NavGrid`, `Waypoint`, `Cell`, `build_global_grid`          |
//! | [`graph`]     | `NavGraph`, `GraphKind`, `build_region_graph`, `build_path_graph` |
//! | [`search`]    | `PathFinder` trait, `HeadingSearch`, `SearchScratch`, `find_paths` |
//! | [`proximity`] | `range_search`, `scan_hostiles`, `collect_hostiles`         |
//! | [`error`]     | `NavError`, `NavResult<T>`                                  |
//!
//! # Build order
//!
//! ```text
//! build_global_grid(map)             empty slots
//!   └─ build_region_graph(region)    for every region   (claims cells first)
//!   └─ build_path_graph(path)        for every path     (gets what is left)
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | `find_paths` runs on Rayon, one scratch per worker.        |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.         |

pub mod error;
pub mod graph;
pub mod grid;
pub mod heap;
pub mod proximity;
pub mod search;

#[cfg(test)]
mod tests;

pub use error::{NavError, NavResult};
pub use graph::{build_path_graph, build_region_graph, GraphKind, NavGraph};
pub use grid::{build_global_grid, Cell, NavGrid, Waypoint};
pub use heap::{HeapCost, HeapEntry, MinHeap};
pub use proximity::{collect_hostiles, range_search, scan_hostiles, OccupantFilter, RangeHits, RangeMode};
pub use search::{
    find_path, find_paths, HeadingSearch, NavPath, NavTarget, PathFinder, PathRequest, SearchRecord,
    SearchScratch,
};
