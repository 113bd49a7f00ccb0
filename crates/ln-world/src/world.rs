//! The `World`: grid, lanes, and units advanced one tick at a time.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use ln_core::{BridgeId, BuildingId, MapSpec, NavConfig, NodeId, PlayerId, RegionId, UnitId, WaypointId};
use ln_lane::{
    advance_unit_step, enter_bridge, BridgeKind, BridgeNetwork, LaneError, LaneResult, Stance, StepOutcome,
    UnitParams, UnitStore,
};
use ln_nav::{
    collect_hostiles, range_search, scan_hostiles, NavGrid, NavPath, OccupantFilter, PathFinder, PathRequest,
    RangeMode, SearchScratch,
};

use crate::observer::{TickSummary, WorldObserver};
use crate::{WorldError, WorldResult};

/// Navigation grid, lane network, and every unit on the map.
///
/// Build with [`WorldBuilder`][crate::WorldBuilder].  Lane occupancy is
/// authoritative; each unit is mirrored onto the waypoint under its lane
/// node so grid searches see it.  A waypoint holds one unit: when several
/// stand in one cell the first to arrive is mirrored and the rest queue for
/// the cell in arrival order.
pub struct World<P: PathFinder> {
    pub config: NavConfig,
    pub map: MapSpec,
    pub grid: NavGrid,
    pub lanes: BridgeNetwork,
    pub units: UnitStore,
    pub(crate) finder: P,
    pub(crate) scratch: SearchScratch,
    /// Waypoint under each unit's lane node, `WaypointId::INVALID` if none.
    /// The unit is either that waypoint's occupant or queued in `waiting`.
    pub(crate) mirrored: Vec<WaypointId>,
    /// Units standing in an already mirrored cell, oldest first.
    pub(crate) waiting: FxHashMap<WaypointId, Vec<UnitId>>,
    pub(crate) tick: u64,
}

impl<P: PathFinder> World<P> {
    /// Ticks completed so far.
    #[inline]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    // ── Units ─────────────────────────────────────────────────────────────

    /// Place a unit on any free lane node.
    pub fn spawn_unit(&mut self, owner: PlayerId, node: NodeId, params: UnitParams) -> WorldResult<UnitId> {
        let unit = self.units.spawn(&mut self.lanes, owner, node, params)?;
        self.mirrored.resize(self.units.len(), WaypointId::INVALID);
        self.sync_waypoint(unit)?;
        debug!(%unit, %owner, %node, "unit spawned");
        Ok(unit)
    }

    /// Place a unit on `building`'s door, owned by the building's owner.
    pub fn spawn_at_building(&mut self, building: BuildingId, params: UnitParams) -> WorldResult<UnitId> {
        let owner = self
            .map
            .buildings
            .get(building.index())
            .map(|b| b.owner)
            .ok_or(LaneError::UnknownBuilding(building))?;
        let door = self.lanes.building_node(building)?;
        self.spawn_unit(owner, door, params)
    }

    pub fn despawn(&mut self, unit: UnitId) -> WorldResult<()> {
        self.units.despawn(&mut self.lanes, unit)?;
        debug!(%unit, "unit despawned");
        if let Some(slot) = self.mirrored.get_mut(unit.index()) {
            let cell = std::mem::replace(slot, WaypointId::INVALID);
            self.leave_cell(unit, cell)?;
        }
        Ok(())
    }

    /// Waypoint under `unit`'s lane node.
    pub fn unit_waypoint(&self, unit: UnitId) -> WorldResult<WaypointId> {
        let node = self.units.placed_node(unit)?;
        let pos = self.lanes.node(node)?.pos;
        self.grid.waypoint_at_world(pos).ok_or(WorldError::UnmappedUnit(unit))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Grid route from `unit`'s position into `region`.
    pub fn route_for(&mut self, unit: UnitId, region: RegionId) -> WorldResult<NavPath> {
        let start = self.unit_waypoint(unit)?;
        let request = PathRequest::to_region(start, region);
        Ok(self.finder.find_path(&self.grid, &mut self.scratch, &request)?)
    }

    /// Nearest unit hostile to `unit` within `radius` rings of cells, in
    /// spiral order.  `None` when nothing is in range or `unit` stands
    /// outside the grid.
    pub fn nearest_hostile(&self, unit: UnitId, radius: u32) -> WorldResult<Option<UnitId>> {
        let start = match self.unit_waypoint(unit) {
            Ok(w) => w,
            Err(WorldError::UnmappedUnit(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let filter = OccupantFilter::hostile_to(self.units.owner[unit.index()]);
        match range_search(&self.grid, start, filter, &self.units, radius, RangeMode::First) {
            Ok(hits) => Ok(hits.into_vec().first().copied()),
            Err(e) if e.is_recoverable() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// `true` if any unit not owned by `player` stands in `region`.
    pub fn region_has_hostiles(&self, region: RegionId, player: PlayerId) -> WorldResult<bool> {
        let graph = self.grid.region_graph(region)?.id;
        Ok(scan_hostiles(&self.grid, graph, player, &self.units)?)
    }

    /// Every unit not owned by `player` standing in `region`, in waypoint
    /// order.
    pub fn hostiles_in_region(&self, region: RegionId, player: PlayerId) -> WorldResult<Vec<UnitId>> {
        let graph = self.grid.region_graph(region)?.id;
        let mut out = Vec::new();
        collect_hostiles(&self.grid, graph, player, &self.units, &mut out)?;
        Ok(out)
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Run `n` ticks.
    pub fn run_ticks<O: WorldObserver>(&mut self, n: u64, observer: &mut O) -> WorldResult<()> {
        for _ in 0..n {
            self.tick(observer)?;
        }
        Ok(())
    }

    /// Advance the world by one tick.
    ///
    /// 1. Every unit's position moves toward its node.
    /// 2. Live units act in ascending id order.  A `Moving` unit with a
    ///    hostile within `range_rings` switches to `Fighting` and stays put;
    ///    a `Fighting` unit with none left goes back to `Moving`.  Every
    ///    `Moving` unit then takes one lane step.
    /// 3. A unit at the end of its lane (or on an anchor) is redirected onto
    ///    the next bridge of its march: building door → exit lane, path
    ///    end → castle approach.  Where there is none it turns `Holding`.
    ///
    /// Recoverable lane failures are reported to the observer and counted;
    /// any other error aborts the tick.
    pub fn tick<O: WorldObserver>(&mut self, observer: &mut O) -> WorldResult<TickSummary> {
        let tick = self.tick;
        observer.on_tick_start(tick);
        self.units.settle(&self.lanes);

        let mut summary = TickSummary::default();
        let order: Vec<UnitId> = self.units.live_units().collect();
        for unit in order {
            if let Some(hostile) = self.engage(unit)? {
                summary.engaged += 1;
                observer.on_engage(tick, unit, hostile);
                continue;
            }
            if self.units.stance[unit.index()] != Stance::Moving {
                continue;
            }

            let here = self.units.placed_node(unit)?;
            let result = match advance_unit_step(&mut self.lanes, &mut self.units, unit, self.config.settle_radius) {
                Err(e @ (LaneError::LaneEnd { .. } | LaneError::InvalidDirection(_))) => self.redirect(unit, here, e),
                other => other,
            };
            observer.on_step(tick, unit, &result);

            match result {
                Ok(StepOutcome::Moved)   => summary.moved += 1,
                Ok(StepOutcome::Swapped) => summary.swapped += 1,
                Ok(StepOutcome::Blocked) => summary.blocked += 1,
                Err(e) if e.is_recoverable() => summary.stalled += 1,
                Err(e) => return Err(e.into()),
            }

            self.sync_waypoint(unit)?;
            if let Some(other) = self.lanes.occupant(here).filter(|&o| o != unit) {
                self.sync_waypoint(other)?;
            }
        }

        trace!(tick, ?summary, "tick complete");
        observer.on_tick_end(tick, &summary);
        self.tick += 1;
        Ok(summary)
    }

    /// Update `unit`'s stance from its surroundings.  Returns the hostile it
    /// is facing, if any.
    fn engage(&mut self, unit: UnitId) -> WorldResult<Option<UnitId>> {
        let stance = self.units.stance[unit.index()];
        if stance == Stance::Holding {
            return Ok(None);
        }
        let hostile = self.nearest_hostile(unit, self.config.range_rings)?;
        match (stance, hostile) {
            (Stance::Moving, Some(h)) => {
                debug!(%unit, hostile = %h, "engaging");
                self.units.set_stance(unit, Stance::Fighting)?;
            }
            (Stance::Fighting, None) => self.units.set_stance(unit, Stance::Moving)?,
            _ => {}
        }
        Ok(hostile)
    }

    /// Move `unit`, stuck at `here` with `stuck`, onto its next bridge.
    fn redirect(&mut self, unit: UnitId, here: NodeId, stuck: LaneError) -> LaneResult<StepOutcome> {
        match self.next_bridge(here) {
            Some(bridge) => enter_bridge(&mut self.lanes, &mut self.units, unit, bridge, self.config.settle_radius),
            None => {
                debug!(%unit, node = %here, "nowhere left to march; holding");
                self.units.set_stance(unit, Stance::Holding)?;
                Err(stuck)
            }
        }
    }

    /// Outbound bridge a marching unit takes from `node`.
    fn next_bridge(&self, node: NodeId) -> Option<BridgeId> {
        self.lanes.junction(node).iter().copied().find(|&b| {
            self.lanes.bridge(b).is_ok_and(|bridge| {
                bridge.start == node
                    && matches!(bridge.kind, BridgeKind::BuildingExit { .. } | BridgeKind::CastleApproach { .. })
            })
        })
    }

    /// Point the grid mirror of `unit` at the waypoint under its lane node.
    fn sync_waypoint(&mut self, unit: UnitId) -> WorldResult<()> {
        let i = unit.index();
        if self.mirrored.len() < self.units.len() {
            self.mirrored.resize(self.units.len(), WaypointId::INVALID);
        }
        let target = self
            .lanes
            .nodes
            .get(self.units.node[i].index())
            .and_then(|n| self.grid.waypoint_at_world(n.pos))
            .unwrap_or(WaypointId::INVALID);
        let current = self.mirrored[i];
        if current == target {
            return Ok(());
        }
        self.leave_cell(unit, current)?;
        self.mirrored[i] = target;
        if !target.is_valid() {
            return Ok(());
        }
        if self.grid.waypoint(target)?.occupant.is_none() {
            self.grid.set_occupant(target, Some(unit))?;
        } else {
            self.waiting.entry(target).or_default().push(unit);
        }
        Ok(())
    }

    /// Take `unit` off `cell`: release the waypoint and hand it to the next
    /// queued unit, or drop `unit` from the queue.
    fn leave_cell(&mut self, unit: UnitId, cell: WaypointId) -> WorldResult<()> {
        if !cell.is_valid() {
            return Ok(());
        }
        let released = self.grid.release(cell, unit)?;
        let Some(queue) = self.waiting.get_mut(&cell) else {
            return Ok(());
        };
        if released {
            if !queue.is_empty() {
                let next = queue.remove(0);
                self.grid.set_occupant(cell, Some(next))?;
                trace!(unit = %next, waypoint = %cell, "queued unit takes over cell");
            }
        } else {
            queue.retain(|&u| u != unit);
        }
        if queue.is_empty() {
            self.waiting.remove(&cell);
        }
        Ok(())
    }
}
