//! Heading-biased best-first search over the stitched grid.
//!
//! # Cost model
//!
//! Expanding neighbour `n` from cell `c` towards target position `t` costs
//!
//! ```text
//! g(n) = g(c) + distance_weight * |n - t|² / diag²
//!             + heading_weight  * (1 - cos∠(t - c, n - c)) / 2
//! ```
//!
//! where `diag` is the map diagonal.  Both terms are in `[0, 1]`; the first
//! pulls the frontier towards the goal, the second prefers neighbours that
//! point at it.  This is not an admissible A* heuristic, so the result is a
//! good path rather than a shortest one.
//!
//! # Sub-graph boundaries
//!
//! A step between two sub-graphs is allowed only path ↔ region, only into or
//! out of one of the path's own end regions, and only when that region is
//! the search's start region or its target region.  Paths that merely brush
//! past an unrelated region are never used as shortcuts.
//!
//! # Scratch
//!
//! All per-search state lives in a caller-owned [`SearchScratch`] that is
//! bulk-cleared at the start of every search.  One scratch per concurrent
//! search; see [`find_paths`] for the batched form.

use std::fmt;

use tracing::trace;

use ln_core::{NavConfig, RegionId, Vec2, WaypointId};

use crate::graph::GraphKind;
use crate::grid::NavGrid;
use crate::heap::MinHeap;
use crate::{NavError, NavResult};

/// The 8 grid-adjacent directions as `(dx, dy)`.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Sentinel for "no predecessor" in [`SearchRecord::prev`].
const NO_PREV: u32 = u32::MAX;

// ── Requests and results ──────────────────────────────────────────────────────

/// Where a search should end.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavTarget {
    /// Any waypoint of this region's graph.
    Region(RegionId),
    /// Exactly this waypoint.
    Waypoint(WaypointId),
}

impl fmt::Display for NavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavTarget::Region(r)   => write!(f, "{r}"),
            NavTarget::Waypoint(w) => write!(f, "{w}"),
        }
    }
}

/// One pathfinding query.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PathRequest {
    pub start: WaypointId,
    pub target: NavTarget,
    /// Stop next to the target instead of on it.  For destinations that may
    /// legitimately be occupied, such as a castle guard point.
    pub approach_only: bool,
}

impl PathRequest {
    pub fn to_region(start: WaypointId, region: RegionId) -> Self {
        Self { start, target: NavTarget::Region(region), approach_only: false }
    }

    pub fn to_waypoint(start: WaypointId, waypoint: WaypointId) -> Self {
        Self { start, target: NavTarget::Waypoint(waypoint), approach_only: false }
    }

    pub fn approach(mut self) -> Self {
        self.approach_only = true;
        self
    }
}

/// A found path, start first.
#[derive(Clone, Debug, PartialEq)]
pub struct NavPath {
    /// Waypoints from the start (inclusive) to the goal (inclusive).  In
    /// approach-only mode the last entry is the cell next to the target.
    pub waypoints: Vec<WaypointId>,
    /// Accumulated search cost of the final waypoint.
    pub cost: f32,
}

impl NavPath {
    /// `true` if the start already satisfied the target.
    pub fn is_trivial(&self) -> bool {
        self.waypoints.len() <= 1
    }

    /// First waypoint after the start, i.e. the direction to move in.
    pub fn first_step(&self) -> Option<WaypointId> {
        self.waypoints.get(1).copied()
    }
}

// ── Scratch ───────────────────────────────────────────────────────────────────

/// Per-cell search bookkeeping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchRecord {
    pub cost: f32,
    /// Flat index of the predecessor, `u32::MAX` at the start.
    pub prev: u32,
    pub visited: bool,
    pub queued: bool,
}

impl Default for SearchRecord {
    fn default() -> Self {
        Self { cost: 0.0, prev: NO_PREV, visited: false, queued: false }
    }
}

/// Reusable search buffers: one record per grid slot plus the open heap.
///
/// Sized once for a grid; every search clears it in bulk instead of
/// reallocating.
#[derive(Clone, Debug, Default)]
pub struct SearchScratch {
    records: Vec<SearchRecord>,
    open: MinHeap<f32, u32>,
}

impl SearchScratch {
    pub fn for_grid(grid: &NavGrid) -> Self {
        Self {
            records: vec![SearchRecord::default(); grid.slot_count()],
            open:    MinHeap::with_capacity(64),
        }
    }

    /// Record for flat index `flat` as left by the last search.
    pub fn record(&self, flat: usize) -> Option<&SearchRecord> {
        self.records.get(flat)
    }

    fn reset(&mut self, slots: usize) {
        if self.records.len() == slots {
            self.records.fill(SearchRecord::default());
        } else {
            self.records.clear();
            self.records.resize(slots, SearchRecord::default());
        }
        self.open.clear();
    }
}

// ── PathFinder trait ──────────────────────────────────────────────────────────

/// Pluggable pathfinding strategy.
///
/// Implementations must be `Send + Sync` so one finder can serve a Rayon
/// batch (`parallel` feature), each worker passing its own scratch.
pub trait PathFinder: Send + Sync {
    fn find_path(
        &self,
        grid: &NavGrid,
        scratch: &mut SearchScratch,
        request: &PathRequest,
    ) -> NavResult<NavPath>;
}

/// The default strategy: best-first search with the heading-biased cost
/// described in the module docs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeadingSearch {
    pub distance_weight: f32,
    pub heading_weight: f32,
}

impl HeadingSearch {
    pub fn from_config(config: &NavConfig) -> Self {
        Self {
            distance_weight: config.distance_weight,
            heading_weight:  config.heading_weight,
        }
    }
}

impl Default for HeadingSearch {
    fn default() -> Self {
        Self::from_config(&NavConfig::default())
    }
}

impl PathFinder for HeadingSearch {
    fn find_path(
        &self,
        grid: &NavGrid,
        scratch: &mut SearchScratch,
        request: &PathRequest,
    ) -> NavResult<NavPath> {
        heading_search(self, grid, scratch, request)
    }
}

/// Convenience wrapper: [`HeadingSearch`] with the given weights.
pub fn find_path(
    grid: &NavGrid,
    scratch: &mut SearchScratch,
    request: &PathRequest,
    config: &NavConfig,
) -> NavResult<NavPath> {
    HeadingSearch::from_config(config).find_path(grid, scratch, request)
}

/// Solve many requests against one grid.
///
/// With the `parallel` feature each Rayon worker gets its own
/// [`SearchScratch`]; without it a single scratch is reused in order.
/// Results are in request order either way.
pub fn find_paths<P: PathFinder>(
    finder: &P,
    grid: &NavGrid,
    requests: &[PathRequest],
) -> Vec<NavResult<NavPath>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        requests
            .par_iter()
            .map_init(
                || SearchScratch::for_grid(grid),
                |scratch, req| finder.find_path(grid, scratch, req),
            )
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        let mut scratch = SearchScratch::for_grid(grid);
        requests
            .iter()
            .map(|req| finder.find_path(grid, &mut scratch, req))
            .collect()
    }
}

// ── Search internals ──────────────────────────────────────────────────────────

/// Resolved target: what to test popped cells against and where to aim.
struct Goal {
    target: NavTarget,
    region: Option<RegionId>,
    pos: Vec2,
}

impl Goal {
    #[inline]
    fn reached(&self, id: WaypointId, kind: GraphKind) -> bool {
        match self.target {
            NavTarget::Region(r)   => kind == GraphKind::Region(r),
            NavTarget::Waypoint(w) => id == w,
        }
    }
}

/// May the search step from a cell of graph kind `from` into `to`?
#[inline]
fn crossing_allowed(from: GraphKind, to: GraphKind, start: Option<RegionId>, goal: Option<RegionId>) -> bool {
    if from == to {
        return true;
    }
    let (region, ends) = match (from, to) {
        (GraphKind::Region(r), GraphKind::Path { ends, .. })
        | (GraphKind::Path { ends, .. }, GraphKind::Region(r)) => (r, ends),
        _ => return false,
    };
    ends.contains(&region) && (Some(region) == start || Some(region) == goal)
}

fn step_cost(weights: &HeadingSearch, current: Vec2, next: Vec2, goal: Vec2, diag_sq: f32) -> f32 {
    let distance = next.distance_sq(goal) / diag_sq;
    let heading = match ((goal - current).normalized(), (next - current).normalized()) {
        (Some(towards_goal), Some(towards_next)) => (1.0 - towards_goal.dot(towards_next)) * 0.5,
        _ => 0.0,
    };
    weights.distance_weight * distance + weights.heading_weight * heading
}

fn resolve_goal(grid: &NavGrid, target: NavTarget) -> NavResult<Goal> {
    match target {
        NavTarget::Region(r) => {
            let graph = grid.region_graph(r)?;
            Ok(Goal { target, region: Some(r), pos: graph.anchor })
        }
        NavTarget::Waypoint(w) => {
            let wp = grid.waypoint(w)?;
            let region = grid.graph(wp.graph)?.kind.region();
            Ok(Goal { target, region, pos: wp.pos })
        }
    }
}

fn heading_search(
    weights: &HeadingSearch,
    grid: &NavGrid,
    scratch: &mut SearchScratch,
    request: &PathRequest,
) -> NavResult<NavPath> {
    let start_wp = grid.waypoint(request.start)?;
    let start_kind = grid.graph(start_wp.graph)?.kind;
    let start_region = start_kind.region();
    let goal = resolve_goal(grid, request.target)?;

    if goal.reached(request.start, start_kind) {
        return Ok(NavPath { waypoints: vec![request.start], cost: 0.0 });
    }

    scratch.reset(grid.slot_count());
    let SearchScratch { records, open } = scratch;

    let world_w = grid.width() as f32 * grid.cell_size();
    let world_h = grid.height() as f32 * grid.cell_size();
    let diag_sq = world_w * world_w + world_h * world_h;

    let start_flat = grid.waypoint_flat(start_wp.cell);
    records[start_flat] = SearchRecord { cost: 0.0, prev: NO_PREV, visited: false, queued: true };
    open.insert(0.0, start_flat as u32);

    while let Ok(entry) = open.pop_min() {
        let cur = entry.item as usize;
        records[cur].queued = false;
        records[cur].visited = true;

        let cur_id = grid.slot(cur);
        let cur_wp = grid.waypoint(cur_id)?;
        let cur_kind = grid.graph(cur_wp.graph)?.kind;

        if goal.reached(cur_id, cur_kind) {
            return Ok(reconstruct(grid, records, cur));
        }

        for (dx, dy) in NEIGHBOURS {
            let Some(next) = grid.flat_index(cur_wp.cell.offset(dx, dy)) else {
                continue;
            };
            let next_id = grid.slot(next);
            if !next_id.is_valid() {
                continue;
            }
            let next_wp = grid.waypoint(next_id)?;
            let next_kind = grid.graph(next_wp.graph)?.kind;
            if !crossing_allowed(cur_kind, next_kind, start_region, goal.region) || next_wp.blocked {
                continue;
            }
            if request.approach_only && goal.reached(next_id, next_kind) {
                return Ok(reconstruct(grid, records, cur));
            }
            if next_wp.occupant.is_some() || records[next].visited {
                continue;
            }

            let cost = records[cur].cost + step_cost(weights, cur_wp.pos, next_wp.pos, goal.pos, diag_sq);
            let rec = &mut records[next];
            if rec.queued {
                if cost < rec.cost {
                    rec.cost = cost;
                    rec.prev = cur as u32;
                    match open.find(&(next as u32)) {
                        Some(index) => open.update(index, cost)?,
                        None => open.insert(cost, next as u32),
                    }
                }
            } else {
                *rec = SearchRecord { cost, prev: cur as u32, visited: false, queued: true };
                open.insert(cost, next as u32);
            }
        }
    }

    trace!(start = %request.start, goal = %request.target, "search exhausted");
    Err(NavError::NoPath { start: request.start, target: request.target })
}

/// Follow predecessors from `goal` back to the start and reverse.
fn reconstruct(grid: &NavGrid, records: &[SearchRecord], goal: usize) -> NavPath {
    let cost = records[goal].cost;
    let mut waypoints = Vec::new();
    let mut cur = goal as u32;
    while cur != NO_PREV {
        waypoints.push(grid.slot(cur as usize));
        cur = records[cur as usize].prev;
    }
    waypoints.reverse();
    NavPath { waypoints, cost }
}
