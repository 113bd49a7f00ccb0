//! Occupant queries: spiral range search and per-graph hostile scans.

use ln_core::{GraphId, OwnerLookup, PlayerId, Side, UnitId, WaypointId};

use crate::grid::{Cell, NavGrid};
use crate::{NavError, NavResult};

/// Spiral arm directions in visiting order: right, down, left, up.
const SPIRAL: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Which occupants a range search accepts.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OccupantFilter {
    /// Player the filter is relative to, usually the searching unit's owner.
    pub player: PlayerId,
    pub side: Side,
}

impl OccupantFilter {
    pub fn hostile_to(player: PlayerId) -> Self {
        Self { player, side: Side::Hostile }
    }

    pub fn friendly_to(player: PlayerId) -> Self {
        Self { player, side: Side::Friendly }
    }

    #[inline]
    fn accepts<L: OwnerLookup>(&self, owners: &L, unit: UnitId) -> bool {
        owners
            .owner_of(unit)
            .is_some_and(|owner| self.side.matches(self.player, owner))
    }
}

/// Stop at the first match or sweep the whole square.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RangeMode {
    First,
    All,
}

/// Matches found by [`range_search`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeHits {
    One(UnitId),
    /// Non-empty, in spiral visiting order (nearest rings first).
    Many(Vec<UnitId>),
}

impl RangeHits {
    pub fn into_vec(self) -> Vec<UnitId> {
        match self {
            RangeHits::One(u)   => vec![u],
            RangeHits::Many(us) => us,
        }
    }
}

/// Sweep a square spiral of half-width `radius` cells centred on `start`,
/// testing every occupied cell against `filter`.
///
/// The start cell is visited first, then arms of length 1, 1, 2, 2, 3, 3, …
/// turning right, down, left, up, until `(2 * radius + 1)²` cells have been
/// visited.  Cells off the grid or without a waypoint are skipped.
/// A radius beyond the grid's longer side sweeps the same cells as that side.
///
/// Returns [`NavError::NothingInRange`] when no occupant matched.
pub fn range_search<L: OwnerLookup>(
    grid: &NavGrid,
    start: WaypointId,
    filter: OccupantFilter,
    owners: &L,
    radius: u32,
    mode: RangeMode,
) -> NavResult<RangeHits> {
    let origin = grid.waypoint(start)?.cell;
    // Rings past the grid's longer side only visit empty cells.
    let rings = u64::from(radius.min(grid.width().max(grid.height())));
    let side = 2 * rings + 1;
    let total = side.saturating_mul(side);

    let mut found = Vec::new();
    let mut probe = |cell: Cell| -> bool {
        let Some(id) = grid.waypoint_at_cell(cell) else {
            return false;
        };
        match grid.waypoints[id.index()].occupant {
            Some(unit) if filter.accepts(owners, unit) => {
                found.push(unit);
                mode == RangeMode::First
            }
            _ => false,
        }
    };

    let mut cell = origin;
    let mut visited = 1u64;
    let mut arm = 1i32;
    let mut dir = 0usize;
    if !probe(cell) {
        'sweep: loop {
            for _ in 0..2 {
                let (dx, dy) = SPIRAL[dir];
                for _ in 0..arm {
                    if visited >= total {
                        break 'sweep;
                    }
                    cell = cell.offset(dx, dy);
                    visited += 1;
                    if probe(cell) {
                        break 'sweep;
                    }
                }
                dir = (dir + 1) % 4;
            }
            arm += 1;
        }
    }

    match (mode, found.len()) {
        (_, 0) => Err(NavError::NothingInRange { start, radius }),
        (RangeMode::First, _) => Ok(RangeHits::One(found[0])),
        (RangeMode::All, _) => Ok(RangeHits::Many(found)),
    }
}

/// `true` if any waypoint of `graph` holds a unit not owned by `player`.
pub fn scan_hostiles<L: OwnerLookup>(
    grid: &NavGrid,
    graph: GraphId,
    player: PlayerId,
    owners: &L,
) -> NavResult<bool> {
    let filter = OccupantFilter::hostile_to(player);
    let graph = grid.graph(graph)?;
    Ok(graph.waypoints().any(|id| {
        grid.waypoints[id.index()]
            .occupant
            .is_some_and(|unit| filter.accepts(owners, unit))
    }))
}

/// Append every unit in `graph` not owned by `player` to `out`; returns how
/// many were appended.
pub fn collect_hostiles<L: OwnerLookup>(
    grid: &NavGrid,
    graph: GraphId,
    player: PlayerId,
    owners: &L,
    out: &mut Vec<UnitId>,
) -> NavResult<usize> {
    let filter = OccupantFilter::hostile_to(player);
    let graph = grid.graph(graph)?;
    let before = out.len();
    out.extend(
        graph
            .waypoints()
            .filter_map(|id| grid.waypoints[id.index()].occupant)
            .filter(|&unit| filter.accepts(owners, unit)),
    );
    Ok(out.len() - before)
}
