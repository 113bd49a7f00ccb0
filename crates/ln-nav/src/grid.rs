//! The global navigation grid and its waypoint arena.
//!
//! # Data layout
//!
//! One uniform grid covers the whole map.  `slots` is dense and indexed by
//! the flat cell index `y * width + x`; each slot holds the `WaypointId` of
//! the waypoint living in that cell, or `WaypointId::INVALID` when no
//! sub-graph claimed it.  Most slots stay empty on typical maps.
//!
//! Waypoints themselves live in the `waypoints` arena.  A waypoint is owned
//! by exactly one [`NavGraph`]; the grid slot is a second index to the same
//! arena entry, used for lookups by world position and for neighbour
//! expansion across sub-graph boundaries.
//!
//! ```text
//! world (x, y) ──floor(/cell_size)──▶ Cell ──y*width+x──▶ slot ──▶ WaypointId ──▶ Waypoint
//! ```

use tracing::debug;

use ln_core::{GraphId, MapSpec, NavConfig, PathId, RegionId, UnitId, Vec2, WaypointId};

use crate::graph::NavGraph;
use crate::{NavError, NavResult};

// ── Cell ──────────────────────────────────────────────────────────────────────

/// Integer grid coordinates in the global grid's space.
///
/// Signed so that neighbour and spiral arithmetic can step off the grid
/// edge and be rejected by a bounds check instead of wrapping.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Cell {
        Cell::new(self.x + dx, self.y + dy)
    }
}

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// One navigable cell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    /// World-space centre of `cell`.
    pub pos: Vec2,
    /// Coordinates in the global grid.
    pub cell: Cell,
    /// Sub-graph that owns this waypoint.
    pub graph: GraphId,
    /// Unit currently standing here.
    pub occupant: Option<UnitId>,
    /// Permanently unusable (e.g. collides with scenery).
    pub blocked: bool,
}

impl Waypoint {
    /// Free for a path to step onto.
    #[inline]
    pub fn is_passable(&self) -> bool {
        !self.blocked && self.occupant.is_none()
    }
}

// ── NavGrid ───────────────────────────────────────────────────────────────────

/// Global grid: slot array, waypoint arena, and every sub-graph built on it.
///
/// Construct with [`build_global_grid`] (or [`NavGrid::new`]), then add
/// sub-graphs with [`build_region_graph`](crate::build_region_graph) and
/// [`build_path_graph`](crate::build_path_graph).
#[derive(Clone, Debug)]
pub struct NavGrid {
    width:     u32,
    height:    u32,
    cell_size: f32,

    /// Flat cell index → waypoint.  Length = `width * height`.
    pub(crate) slots: Vec<WaypointId>,

    /// Waypoint arena, indexed by `WaypointId`.
    pub(crate) waypoints: Vec<Waypoint>,

    /// Sub-graphs, indexed by `GraphId`.
    pub(crate) graphs: Vec<NavGraph>,

    /// `RegionId` → its graph.  `GraphId::INVALID` until built.
    pub(crate) region_graphs: Vec<GraphId>,

    /// `PathId` → its graph.  `GraphId::INVALID` until built.
    pub(crate) path_graphs: Vec<GraphId>,
}

/// Build the empty global grid for `map`.
///
/// Dimensions are `map.width / cell_size` by `map.height / cell_size`
/// (truncated).  No sub-graphs exist yet; every slot is empty.
pub fn build_global_grid(map: &MapSpec, config: &NavConfig) -> NavResult<NavGrid> {
    config.validate()?;
    map.validate()?;
    let grid = NavGrid::new(map.width, map.height, config.cell_size)?;
    debug!(width = grid.width, height = grid.height, cell_size = grid.cell_size, "global grid allocated");
    Ok(grid)
}

impl NavGrid {
    /// Allocate a grid covering `map_width × map_height` world units.
    ///
    /// Fails when the grid would have no cells or more cells than
    /// `WaypointId` can address.
    pub fn new(map_width: f32, map_height: f32, cell_size: f32) -> NavResult<Self> {
        let w = (map_width / cell_size).floor();
        let h = (map_height / cell_size).floor();
        let width = if w.is_finite() && w >= 0.0 { w as u64 } else { 0 };
        let height = if h.is_finite() && h >= 0.0 { h as u64 } else { 0 };
        let count = match width.checked_mul(height) {
            Some(c) if c > 0 && c < u64::from(u32::MAX) => c,
            _ => return Err(NavError::DegenerateGrid { width, height }),
        };
        Ok(Self {
            width:         width as u32,
            height:        height as u32,
            cell_size,
            slots:         vec![WaypointId::INVALID; count as usize],
            waypoints:     Vec::new(),
            graphs:        Vec::new(),
            region_graphs: Vec::new(),
            path_graphs:   Vec::new(),
        })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of slots (`width * height`).  Search scratch buffers are sized
    /// to this.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    // ── Coordinate mapping ────────────────────────────────────────────────

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Cell containing world position `pos`, or `None` off the grid.
    pub fn world_to_cell(&self, pos: Vec2) -> Option<Cell> {
        let fx = (pos.x / self.cell_size).floor();
        let fy = (pos.y / self.cell_size).floor();
        if !(fx >= 0.0 && fy >= 0.0 && fx < self.width as f32 && fy < self.height as f32) {
            return None;
        }
        Some(Cell::new(fx as i32, fy as i32))
    }

    /// World-space centre of `cell`.  Defined for any cell, in bounds or not.
    #[inline]
    pub fn cell_to_world(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    #[inline]
    pub fn flat_index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.y as usize * self.width as usize + cell.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn cell_of(&self, flat: usize) -> Cell {
        let w = self.width as usize;
        Cell::new((flat % w) as i32, (flat / w) as i32)
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Waypoint stored at flat index `flat`; `INVALID` for an empty slot.
    /// `flat` must come from [`flat_index`](Self::flat_index) or
    /// [`waypoint_flat`](Self::waypoint_flat).
    #[inline]
    pub(crate) fn slot(&self, flat: usize) -> WaypointId {
        self.slots[flat]
    }

    /// Flat index of a waypoint's cell.  Waypoints only exist for in-bounds
    /// cells.
    #[inline]
    pub(crate) fn waypoint_flat(&self, cell: Cell) -> usize {
        debug_assert!(self.in_bounds(cell), "waypoint cell {cell:?} off the grid");
        cell.y as usize * self.width as usize + cell.x as usize
    }

    pub fn waypoint_at_cell(&self, cell: Cell) -> Option<WaypointId> {
        let id = self.slots[self.flat_index(cell)?];
        id.is_valid().then_some(id)
    }

    pub fn waypoint_at_world(&self, pos: Vec2) -> Option<WaypointId> {
        self.waypoint_at_cell(self.world_to_cell(pos)?)
    }

    #[inline]
    pub fn waypoint(&self, id: WaypointId) -> NavResult<&Waypoint> {
        self.waypoints.get(id.index()).ok_or(NavError::UnknownWaypoint(id))
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[inline]
    pub fn graph(&self, id: GraphId) -> NavResult<&NavGraph> {
        self.graphs.get(id.index()).ok_or(NavError::UnknownGraph(id))
    }

    pub fn graphs(&self) -> &[NavGraph] {
        &self.graphs
    }

    /// The graph owning waypoint `id`.
    pub fn graph_of(&self, id: WaypointId) -> NavResult<&NavGraph> {
        self.graph(self.waypoint(id)?.graph)
    }

    pub fn region_graph(&self, region: RegionId) -> NavResult<&NavGraph> {
        match self.region_graphs.get(region.index()) {
            Some(&g) if g.is_valid() => self.graph(g),
            _ => Err(NavError::UnknownRegion(region)),
        }
    }

    pub fn path_graph(&self, path: PathId) -> NavResult<&NavGraph> {
        match self.path_graphs.get(path.index()) {
            Some(&g) if g.is_valid() => self.graph(g),
            _ => Err(NavError::UnknownPath(path)),
        }
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Set (or clear, with `None`) the occupant of `id`; returns the previous
    /// occupant.
    pub fn set_occupant(&mut self, id: WaypointId, unit: Option<UnitId>) -> NavResult<Option<UnitId>> {
        let wp = self.waypoints.get_mut(id.index()).ok_or(NavError::UnknownWaypoint(id))?;
        Ok(std::mem::replace(&mut wp.occupant, unit))
    }

    /// Clear the occupant of `id` only if it is `unit`.  Returns `true` when
    /// something was cleared.
    pub fn release(&mut self, id: WaypointId, unit: UnitId) -> NavResult<bool> {
        let wp = self.waypoints.get_mut(id.index()).ok_or(NavError::UnknownWaypoint(id))?;
        if wp.occupant == Some(unit) {
            wp.occupant = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn set_blocked(&mut self, id: WaypointId, blocked: bool) -> NavResult<()> {
        let wp = self.waypoints.get_mut(id.index()).ok_or(NavError::UnknownWaypoint(id))?;
        wp.blocked = blocked;
        Ok(())
    }
}
