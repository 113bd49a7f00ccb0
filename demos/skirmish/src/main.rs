//! skirmish — two barracks on opposite sides of a small map send units
//! down the lanes at each other.
//!
//! Run with `RUST_LOG=debug` to see lane construction and engagements.

mod map;

use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ln_core::{BuildingId, NavConfig, RegionId, UnitId};
use ln_lane::{LaneResult, Stance, StepOutcome, UnitParams};
use ln_nav::{find_paths, HeadingSearch, PathRequest};
use ln_world::{TickSummary, WorldBuilder, WorldObserver};

use map::{build_map, EAST, WEST};

// ── Constants ─────────────────────────────────────────────────────────────────

const WAVES:          u64 = 4;
const UNITS_PER_WAVE: u32 = 3;
const TICKS_PER_WAVE: u64 = 10;
const SETTLE_TICKS:   u64 = 60;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    moves:       usize,
    swaps:       usize,
    blocks:      usize,
    engagements: usize,
}

impl WorldObserver for Tally {
    fn on_step(&mut self, _tick: u64, _unit: UnitId, result: &LaneResult<StepOutcome>) {
        match result {
            Ok(StepOutcome::Moved)   => self.moves += 1,
            Ok(StepOutcome::Swapped) => self.swaps += 1,
            Ok(StepOutcome::Blocked) => self.blocks += 1,
            Err(_) => {}
        }
    }

    fn on_engage(&mut self, _tick: u64, _unit: UnitId, _hostile: UnitId) {
        self.engagements += 1;
    }

    fn on_tick_end(&mut self, tick: u64, summary: &TickSummary) {
        if tick % 10 == 0 {
            info!(tick, ?summary, "progress");
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = NavConfig { cell_size: 8.0, bridge_step: 6.0, ..NavConfig::default() };
    let finder = HeadingSearch::from_config(&config);
    let mut world = WorldBuilder::new(build_map(), finder).config(config).build()?;
    info!(
        waypoints = world.grid.waypoint_count(),
        nodes     = world.lanes.node_count(),
        bridges   = world.lanes.bridge_count(),
        "map ready"
    );

    // Grid routes from each castle to every other region, solved as a batch.
    let requests: Vec<PathRequest> = world
        .map
        .regions
        .iter()
        .flat_map(|from| world.map.regions.iter().map(move |to| (from, to)))
        .filter(|(from, to)| from.id != to.id)
        .filter_map(|(from, to)| {
            let start = world.grid.waypoint_at_world(from.castle)?;
            Some(PathRequest::to_region(start, to.id))
        })
        .collect();
    for (request, result) in requests.iter().zip(find_paths(&finder, &world.grid, &requests)) {
        match result {
            Ok(path) => info!(start = %request.start, goal = %request.target, cells = path.waypoints.len(), "route"),
            Err(e)   => info!(start = %request.start, goal = %request.target, error = %e, "no route"),
        }
    }

    let started = Instant::now();
    let mut tally = Tally::default();
    let params = UnitParams { engagement_range: 2, speed: 3.0 };
    for wave in 0..WAVES {
        for _ in 0..UNITS_PER_WAVE {
            for building in [BuildingId(0), BuildingId(1)] {
                // The door holds one unit; a wave waits for it to clear.
                if world.lanes.building_node(building).is_ok_and(|door| world.lanes.is_free(door)) {
                    world.spawn_at_building(building, params)?;
                }
            }
            world.tick(&mut tally)?;
        }
        info!(wave, live = world.units.live_count(), "wave sent");
        world.run_ticks(TICKS_PER_WAVE, &mut tally)?;
    }
    world.run_ticks(SETTLE_TICKS, &mut tally)?;

    let fighting = world
        .units
        .live_units()
        .filter(|&u| world.units.stance[u.index()] == Stance::Fighting)
        .count();
    info!(
        ticks       = world.current_tick(),
        live        = world.units.live_count(),
        fighting,
        moves       = tally.moves,
        swaps       = tally.swaps,
        blocks      = tally.blocks,
        engagements = tally.engagements,
        elapsed_ms  = started.elapsed().as_millis() as u64,
        "skirmish over"
    );
    for (player, home) in [(WEST, RegionId(0)), (EAST, RegionId(1))] {
        let intruders = world.hostiles_in_region(home, player)?;
        info!(%player, region = %home, intruders = intruders.len(), "home region");
    }
    Ok(())
}
