//! Region- and path-scoped navigation sub-graphs.
//!
//! A sub-graph is a rectangular window onto the global grid.  Construction
//! walks every cell of the window, keeps the ones that pass the geometric
//! test for its kind, and claims them in the global grid.  A cell already
//! claimed by an earlier sub-graph is skipped, so the order of construction
//! decides ownership of overlapping cells: regions are built before paths,
//! and a path corridor only gets the cells its end regions left over.
//!
//! Construction is two-phase.  Candidate cells are collected without
//! touching the grid; only a non-empty candidate set is committed.  A failed
//! build therefore leaves no waypoints and no claimed slots behind.

use tracing::{debug, warn};

use ln_core::geo::{polyline_distance_sq, segments_cross};
use ln_core::{GraphId, PathId, PathSpec, Rect, RegionId, RegionSpec, Vec2, WaypointId};

use crate::grid::{Cell, NavGrid, Waypoint};
use crate::{NavError, NavResult};

// ── GraphKind ─────────────────────────────────────────────────────────────────

/// What a sub-graph is bound to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphKind {
    /// The interior of one region.
    Region(RegionId),
    /// The corridor of one path, with the regions at either end.
    Path { path: PathId, ends: [RegionId; 2] },
}

impl GraphKind {
    #[inline]
    pub fn region(self) -> Option<RegionId> {
        match self {
            GraphKind::Region(r) => Some(r),
            GraphKind::Path { .. } => None,
        }
    }

    #[inline]
    pub fn is_region(self) -> bool {
        matches!(self, GraphKind::Region(_))
    }
}

// ── NavGraph ──────────────────────────────────────────────────────────────────

/// A rectangular view over the global grid.
///
/// `cells` is dense over the window (`width * height`, row-major) and holds
/// `WaypointId::INVALID` for cells outside the region polygon, too far from
/// the path centerline, or owned by another sub-graph.
#[derive(Clone, Debug)]
pub struct NavGraph {
    pub id: GraphId,
    pub kind: GraphKind,
    /// Global cell of the window's top-left corner.
    pub origin: Cell,
    pub width: u32,
    pub height: u32,
    cells: Vec<WaypointId>,
    live: usize,
    /// Mean position of the live waypoints; the pathfinder aims here when
    /// the target is this graph's region.
    pub anchor: Vec2,
}

impl NavGraph {
    /// Number of live waypoints.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn contains_cell(&self, cell: Cell) -> bool {
        let lx = cell.x - self.origin.x;
        let ly = cell.y - self.origin.y;
        lx >= 0 && ly >= 0 && (lx as u32) < self.width && (ly as u32) < self.height
    }

    /// Waypoint at global `cell`, if that cell belongs to this graph.
    pub fn waypoint_at(&self, cell: Cell) -> Option<WaypointId> {
        if !self.contains_cell(cell) {
            return None;
        }
        let local = (cell.y - self.origin.y) as usize * self.width as usize + (cell.x - self.origin.x) as usize;
        let id = self.cells[local];
        id.is_valid().then_some(id)
    }

    /// Live waypoints in row-major order.
    pub fn waypoints(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.cells.iter().copied().filter(|id| id.is_valid())
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

/// Cell window covering `rect`, clipped to the grid.  `None` if the
/// rectangle misses the grid entirely.
fn cell_window(grid: &NavGrid, rect: Rect) -> Option<(Cell, u32, u32)> {
    let cs = grid.cell_size();
    let x0 = (rect.min.x / cs).floor().max(0.0);
    let y0 = (rect.min.y / cs).floor().max(0.0);
    let x1 = (rect.max.x / cs).floor().min(grid.width() as f32 - 1.0);
    let y1 = (rect.max.y / cs).floor().min(grid.height() as f32 - 1.0);
    if !(x0 <= x1 && y0 <= y1) {
        return None;
    }
    let origin = Cell::new(x0 as i32, y0 as i32);
    Some((origin, (x1 - x0) as u32 + 1, (y1 - y0) as u32 + 1))
}

/// Even–odd test: cast a ray from `outside` to `p` and count boundary
/// crossings.
fn inside_polygon(p: Vec2, outside: Vec2, boundary: &[Vec2]) -> bool {
    let n = boundary.len();
    let mut crossings = 0u32;
    for i in 0..n {
        let a = boundary[i];
        let b = boundary[(i + 1) % n];
        if segments_cross(outside, p, a, b) {
            crossings += 1;
        }
    }
    crossings % 2 == 1
}

/// Collect cells of the window that are unclaimed and pass `accept`.
fn collect_cells(
    grid: &NavGrid,
    origin: Cell,
    width: u32,
    height: u32,
    mut accept: impl FnMut(Vec2) -> bool,
) -> Vec<Option<Cell>> {
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for ly in 0..height as i32 {
        for lx in 0..width as i32 {
            let cell = origin.offset(lx, ly);
            let claimed = grid.waypoint_at_cell(cell).is_some();
            if !claimed && accept(grid.cell_to_world(cell)) {
                out.push(Some(cell));
            } else {
                out.push(None);
            }
        }
    }
    out
}

/// Turn the candidate window into a graph: allocate waypoints, claim slots,
/// register the graph.  Fails before mutating anything if ids run out.
fn commit(
    grid: &mut NavGrid,
    kind: GraphKind,
    origin: Cell,
    width: u32,
    height: u32,
    candidates: Vec<Option<Cell>>,
) -> NavResult<GraphId> {
    let live = candidates.iter().filter(|c| c.is_some()).count();
    let id = GraphId::try_from(grid.graphs.len()).map_err(|_| NavError::GraphCapacity)?;
    if !id.is_valid() || WaypointId::try_from(grid.waypoints.len() + live).is_err() {
        return Err(NavError::GraphCapacity);
    }

    let mut cells = Vec::with_capacity(candidates.len());
    let mut sum = Vec2::ZERO;
    for candidate in candidates {
        let Some(cell) = candidate else {
            cells.push(WaypointId::INVALID);
            continue;
        };
        let wp_id = WaypointId(grid.waypoints.len() as u32);
        let pos = grid.cell_to_world(cell);
        sum = sum + pos;
        grid.waypoints.push(Waypoint { pos, cell, graph: id, occupant: None, blocked: false });
        if let Some(flat) = grid.flat_index(cell) {
            grid.slots[flat] = wp_id;
        }
        cells.push(wp_id);
    }

    grid.graphs.push(NavGraph {
        id,
        kind,
        origin,
        width,
        height,
        cells,
        live,
        anchor: sum * (1.0 / live as f32),
    });
    Ok(id)
}

fn register(table: &mut Vec<GraphId>, index: usize, graph: GraphId) {
    if table.len() <= index {
        table.resize(index + 1, GraphId::INVALID);
    }
    table[index] = graph;
}

/// Build the sub-graph covering the interior of `region`.
///
/// A cell is inside when the segment from a point left of the boundary's
/// bounding box to the cell centre crosses the boundary an odd number of
/// times.
pub fn build_region_graph(grid: &mut NavGrid, region: &RegionSpec) -> NavResult<GraphId> {
    if grid.region_graph(region.id).is_ok() {
        return Err(NavError::DuplicateRegion(region.id));
    }
    if region.boundary.len() < 3 {
        return Err(NavError::MalformedPolygon { region: region.id, reason: "fewer than 3 vertices" });
    }
    if region.boundary.iter().any(|p| !p.is_finite()) {
        return Err(NavError::MalformedPolygon { region: region.id, reason: "non-finite vertex" });
    }
    let bbox = Rect::bounding(&region.boundary)
        .ok_or(NavError::MalformedPolygon { region: region.id, reason: "empty boundary" })?;

    let Some((origin, width, height)) = cell_window(grid, bbox) else {
        warn!(region = %region.id, "region lies outside the grid");
        return Err(NavError::EmptyRegionGraph(region.id));
    };

    let outside_x = bbox.min.x - grid.cell_size();
    let candidates = collect_cells(grid, origin, width, height, |p| {
        inside_polygon(p, Vec2::new(outside_x, p.y), &region.boundary)
    });
    if candidates.iter().all(Option::is_none) {
        warn!(region = %region.id, "region graph has no traversable cells");
        return Err(NavError::EmptyRegionGraph(region.id));
    }

    let id = commit(grid, GraphKind::Region(region.id), origin, width, height, candidates)?;
    register(&mut grid.region_graphs, region.id.index(), id);
    debug!(region = %region.id, graph = %id, live = grid.graphs[id.index()].live, "region graph built");
    Ok(id)
}

/// Build the sub-graph covering the corridor of `path`.
///
/// The window is the centerline's bounding box grown by the full thickness;
/// a cell is kept when its centre lies within half the thickness of the
/// centerline and no earlier sub-graph owns it.
pub fn build_path_graph(grid: &mut NavGrid, path: &PathSpec) -> NavResult<GraphId> {
    if grid.path_graph(path.id).is_ok() {
        return Err(NavError::DuplicatePath(path.id));
    }
    if path.centerline.len() < 2 {
        return Err(NavError::MalformedCenterline { path: path.id, reason: "fewer than 2 points" });
    }
    if path.centerline.iter().any(|p| !p.is_finite()) || !(path.thickness > 0.0) {
        return Err(NavError::MalformedCenterline { path: path.id, reason: "non-finite point or thickness" });
    }
    let bbox = Rect::bounding(&path.centerline)
        .ok_or(NavError::MalformedCenterline { path: path.id, reason: "empty centerline" })?
        .expanded(path.thickness);

    let Some((origin, width, height)) = cell_window(grid, bbox) else {
        warn!(path = %path.id, "path lies outside the grid");
        return Err(NavError::EmptyPathGraph(path.id));
    };

    let half = path.thickness * 0.5;
    let limit_sq = half * half;
    let candidates = collect_cells(grid, origin, width, height, |p| {
        polyline_distance_sq(p, &path.centerline) <= limit_sq
    });
    if candidates.iter().all(Option::is_none) {
        warn!(path = %path.id, "path graph has no traversable cells");
        return Err(NavError::EmptyPathGraph(path.id));
    }

    let kind = GraphKind::Path { path: path.id, ends: path.regions };
    let id = commit(grid, kind, origin, width, height, candidates)?;
    register(&mut grid.path_graphs, path.id.index(), id);
    debug!(path = %path.id, graph = %id, live = grid.graphs[id.index()].live, "path graph built");
    Ok(id)
}
