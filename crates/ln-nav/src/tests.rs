//! Unit tests for ln-nav.
//!
//! All tests use a hand-crafted map on a 20 × 8 grid of 10-unit cells:
//!
//! ```text
//!  col  0    5 6          13 14   19
//! row 0 ┌────┐ ............  ┌────┐
//!       │ R0 │               │ R1 │
//!     3 │    ├───── P0 ──────┤    │
//!     4 │    ├───────────────┤    │
//!     5 │    │┌──── R2 ─────┐│    │
//!     7 └────┘└─────────────┘└────┘
//! ```
//!
//! R2 touches the corridor and R0 but no path leads into it.

#[cfg(test)]
mod helpers {
    use ln_core::{MapSpec, NavConfig, PathId, PathSpec, RegionId, RegionSpec, Vec2};

    use crate::{build_global_grid, build_path_graph, build_region_graph, Cell, NavGrid};

    pub fn rect_region(id: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> RegionSpec {
        RegionSpec {
            id:       RegionId(id),
            boundary: vec![Vec2::new(x0, y0), Vec2::new(x1, y0), Vec2::new(x1, y1), Vec2::new(x0, y1)],
            castle:   Vec2::new((x0 + x1) * 0.5, (y0 + y1) * 0.5),
            owner:    None,
        }
    }

    pub fn map() -> MapSpec {
        MapSpec {
            width:     200.0,
            height:    80.0,
            regions:   vec![
                rect_region(0, 0.0, 0.0, 60.0, 80.0),
                rect_region(1, 140.0, 0.0, 200.0, 80.0),
                rect_region(2, 60.0, 50.0, 140.0, 80.0),
            ],
            paths:     vec![PathSpec {
                id:         PathId(0),
                centerline: vec![Vec2::new(50.0, 40.0), Vec2::new(150.0, 40.0)],
                thickness:  12.0,
                regions:    [RegionId(0), RegionId(1)],
            }],
            buildings: vec![],
        }
    }

    pub fn config() -> NavConfig {
        NavConfig { cell_size: 10.0, ..NavConfig::default() }
    }

    pub fn grid() -> NavGrid {
        let map = map();
        let mut grid = build_global_grid(&map, &config()).unwrap();
        for region in &map.regions {
            build_region_graph(&mut grid, region).unwrap();
        }
        for path in &map.paths {
            build_path_graph(&mut grid, path).unwrap();
        }
        grid
    }

    pub fn wp(grid: &NavGrid, x: i32, y: i32) -> ln_core::WaypointId {
        grid.waypoint_at_cell(Cell::new(x, y)).unwrap()
    }
}

// ── MinHeap ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod heap {
    use crate::{MinHeap, NavError};

    fn assert_heap_order(heap: &MinHeap<f32, u32>) {
        let root = heap.peek_min().unwrap().cost;
        assert!(heap.entries().iter().all(|e| root <= e.cost));
        for (i, e) in heap.entries().iter().enumerate().skip(1) {
            assert!(heap.entries()[(i - 1) / 2].cost <= e.cost, "parent above child at {i}");
        }
    }

    #[test]
    fn pops_in_cost_order() {
        let mut heap = MinHeap::new();
        for (i, c) in [5.0, 1.0, 4.0, 2.0, 3.0, 0.5].iter().enumerate() {
            heap.insert(*c, i as u32);
        }
        let mut costs = Vec::new();
        while let Ok(e) = heap.pop_min() {
            costs.push(e.cost);
        }
        assert_eq!(costs, vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn find_matches_identity_not_cost() {
        let mut heap = MinHeap::new();
        heap.insert(1.0_f32, 10u32);
        heap.insert(1.0, 11);
        heap.insert(1.0, 12);
        let i = heap.find(&11).unwrap();
        assert_eq!(heap.entries()[i].item, 11);
        assert!(heap.find(&99).is_none());
    }

    #[test]
    fn update_resifts_both_ways() {
        let mut heap = MinHeap::new();
        for i in 0..10u32 {
            heap.insert(10.0 + i as f32, i);
        }
        let i = heap.find(&9).unwrap();
        heap.update(i, 0.0).unwrap();
        assert_heap_order(&heap);
        assert_eq!(heap.peek_min().unwrap().item, 9);

        let root = heap.find(&9).unwrap();
        heap.update(root, 100.0).unwrap();
        assert_heap_order(&heap);
        assert_eq!(heap.peek_min().unwrap().item, 0);
    }

    #[test]
    fn invariant_holds_through_mixed_operations() {
        let mut heap = MinHeap::new();
        let mut x = 17u32;
        for step in 0..200u32 {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let cost = (x % 1_000) as f32;
            match step % 4 {
                0 | 1 => heap.insert(cost, step),
                2 if !heap.is_empty() => {
                    let idx = (x as usize) % heap.len();
                    heap.update(idx, cost).unwrap();
                }
                _ => {
                    let _ = heap.pop_min();
                }
            }
            if !heap.is_empty() {
                assert_heap_order(&heap);
            }
        }
    }

    #[test]
    fn empty_and_bad_index_fail_explicitly() {
        let mut heap: MinHeap<f32, u32> = MinHeap::new();
        assert!(matches!(heap.pop_min(), Err(NavError::HeapEmpty)));
        assert!(matches!(heap.peek_min(), Err(NavError::HeapEmpty)));
        heap.insert(1.0, 1);
        assert!(matches!(heap.update(3, 0.0), Err(NavError::HeapIndex { index: 3, len: 1 })));
    }
}

// ── Global grid ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use ln_core::Vec2;

    use crate::{Cell, NavError, NavGrid};

    #[test]
    fn dimensions_truncate() {
        let grid = NavGrid::new(205.0, 79.0, 10.0).unwrap();
        assert_eq!((grid.width(), grid.height()), (20, 7));
        assert_eq!(grid.slot_count(), 140);
        assert_eq!(grid.waypoint_count(), 0);
    }

    #[test]
    fn cell_world_left_inverse() {
        let grid = NavGrid::new(200.0, 80.0, 10.0).unwrap();
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let c = Cell::new(x, y);
                assert_eq!(grid.world_to_cell(grid.cell_to_world(c)), Some(c));
            }
        }
    }

    #[test]
    fn off_grid_positions_rejected() {
        let grid = NavGrid::new(200.0, 80.0, 10.0).unwrap();
        assert_eq!(grid.world_to_cell(Vec2::new(-0.1, 5.0)), None);
        assert_eq!(grid.world_to_cell(Vec2::new(200.0, 5.0)), None);
        assert_eq!(grid.world_to_cell(Vec2::new(5.0, 80.0)), None);
        assert_eq!(grid.world_to_cell(Vec2::new(199.9, 79.9)), Some(Cell::new(19, 7)));
        assert!(grid.flat_index(Cell::new(20, 0)).is_none());
    }

    #[test]
    fn empty_grid_rejected() {
        assert!(matches!(NavGrid::new(5.0, 5.0, 10.0), Err(NavError::DegenerateGrid { .. })));
    }

    #[test]
    fn oversized_grid_rejected() {
        assert!(matches!(NavGrid::new(1e20, 1e20, 1.0), Err(NavError::DegenerateGrid { .. })));
        // 70 000² cells no longer fit the waypoint index space.
        assert!(matches!(NavGrid::new(70_000.0, 70_000.0, 1.0), Err(NavError::DegenerateGrid { .. })));
    }

    #[test]
    fn waypoint_cells_map_back_to_their_slot() {
        let grid = super::helpers::grid();
        for (i, wp) in grid.waypoints().iter().enumerate() {
            let flat = grid.waypoint_flat(wp.cell);
            assert_eq!(grid.flat_index(wp.cell), Some(flat));
            assert_eq!(grid.slot(flat).index(), i);
        }
    }
}

// ── Sub-graph construction ────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use ln_core::{PathId, RegionId, UnitId, Vec2};

    use super::helpers::{grid, rect_region, wp};
    use crate::{build_region_graph, Cell, GraphKind, NavError};

    #[test]
    fn live_counts() {
        let grid = grid();
        assert_eq!(grid.region_graph(RegionId(0)).unwrap().live_count(), 48);
        assert_eq!(grid.region_graph(RegionId(1)).unwrap().live_count(), 48);
        assert_eq!(grid.region_graph(RegionId(2)).unwrap().live_count(), 24);
        // Columns 6..=13 on rows 3 and 4; columns 5 and 14 belong to the regions.
        assert_eq!(grid.path_graph(PathId(0)).unwrap().live_count(), 16);
        assert_eq!(grid.waypoint_count(), 48 + 48 + 24 + 16);
    }

    #[test]
    fn claimed_cells_alias_the_same_waypoint() {
        let grid = grid();
        for graph in grid.graphs() {
            for id in graph.waypoints() {
                let wp = grid.waypoint(id).unwrap();
                assert_eq!(grid.waypoint_at_cell(wp.cell), Some(id));
                assert_eq!(graph.waypoint_at(wp.cell), Some(id));
                assert_eq!(wp.graph, graph.id);
                assert_eq!(grid.world_to_cell(wp.pos), Some(wp.cell));
            }
        }
    }

    #[test]
    fn path_skips_cells_owned_by_regions() {
        let grid = grid();
        let path = grid.path_graph(PathId(0)).unwrap();
        assert!(path.waypoint_at(Cell::new(5, 3)).is_none());
        let owner = grid.graph_of(wp(&grid, 5, 3)).unwrap();
        assert_eq!(owner.kind, GraphKind::Region(RegionId(0)));
        assert!(path.waypoint_at(Cell::new(6, 3)).is_some());
        assert_eq!(path.kind, GraphKind::Path { path: PathId(0), ends: [RegionId(0), RegionId(1)] });
    }

    #[test]
    fn region_anchor_is_centroid() {
        let grid = grid();
        let anchor = grid.region_graph(RegionId(0)).unwrap().anchor;
        assert!((anchor.x - 30.0).abs() < 1e-3 && (anchor.y - 40.0).abs() < 1e-3, "{anchor}");
    }

    #[test]
    fn empty_region_leaves_no_state() {
        let mut grid = grid();
        let before = (grid.waypoint_count(), grid.graphs().len());
        let mut sliver = rect_region(3, 0.0, 0.0, 0.0, 0.0);
        sliver.boundary = vec![Vec2::new(101.0, 11.0), Vec2::new(103.0, 11.0), Vec2::new(102.0, 13.0)];
        assert!(matches!(build_region_graph(&mut grid, &sliver), Err(NavError::EmptyRegionGraph(_))));
        assert_eq!((grid.waypoint_count(), grid.graphs().len()), before);
        assert!(grid.waypoint_at_cell(Cell::new(10, 1)).is_none());
        assert!(grid.region_graph(RegionId(3)).is_err());
    }

    #[test]
    fn region_fully_covered_by_others_is_empty() {
        let mut grid = grid();
        let overlap = rect_region(3, 0.0, 0.0, 60.0, 80.0);
        assert!(matches!(build_region_graph(&mut grid, &overlap), Err(NavError::EmptyRegionGraph(_))));
    }

    #[test]
    fn malformed_and_duplicate_regions_rejected() {
        let mut grid = grid();
        let mut line = rect_region(4, 0.0, 0.0, 10.0, 10.0);
        line.boundary.truncate(2);
        assert!(matches!(build_region_graph(&mut grid, &line), Err(NavError::MalformedPolygon { .. })));
        let again = rect_region(0, 0.0, 0.0, 60.0, 80.0);
        assert!(matches!(build_region_graph(&mut grid, &again), Err(NavError::DuplicateRegion(_))));
    }

    #[test]
    fn occupancy_and_blocking() {
        let mut grid = grid();
        let id = wp(&grid, 2, 2);
        assert!(grid.waypoint(id).unwrap().is_passable());
        assert_eq!(grid.set_occupant(id, Some(UnitId(4))).unwrap(), None);
        assert!(!grid.release(id, UnitId(5)).unwrap());
        assert!(grid.release(id, UnitId(4)).unwrap());
        grid.set_blocked(id, true).unwrap();
        assert!(!grid.waypoint(id).unwrap().is_passable());
    }
}

// ── Pathfinding ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use ln_core::{RegionId, UnitId};

    use super::helpers::{config, grid, wp};
    use crate::{
        find_path, find_paths, GraphKind, HeadingSearch, NavError, NavGrid, NavPath, PathRequest,
        SearchScratch,
    };

    fn assert_contiguous(grid: &NavGrid, path: &NavPath) {
        for pair in path.waypoints.windows(2) {
            let a = grid.waypoint(pair[0]).unwrap().cell;
            let b = grid.waypoint(pair[1]).unwrap().cell;
            assert!((a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1, "{a:?} -> {b:?}");
            assert_ne!(a, b);
        }
    }

    #[test]
    fn own_region_is_trivial() {
        let grid = grid();
        let mut scratch = SearchScratch::for_grid(&grid);
        let start = wp(&grid, 2, 2);
        let path = find_path(&grid, &mut scratch, &PathRequest::to_region(start, RegionId(0)), &config()).unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.waypoints, vec![start]);
    }

    #[test]
    fn crosses_corridor_to_target_region() {
        let grid = grid();
        let mut scratch = SearchScratch::for_grid(&grid);
        let start = wp(&grid, 1, 1);
        let path = find_path(&grid, &mut scratch, &PathRequest::to_region(start, RegionId(1)), &config()).unwrap();

        assert_eq!(path.waypoints[0], start);
        let last = grid.graph_of(*path.waypoints.last().unwrap()).unwrap();
        assert_eq!(last.kind, GraphKind::Region(RegionId(1)));
        assert_contiguous(&grid, &path);
        for &id in &path.waypoints {
            let kind = grid.graph_of(id).unwrap().kind;
            assert_ne!(kind, GraphKind::Region(RegionId(2)), "search cut through an unrelated region");
        }
        // Only the last waypoint lies in the target region.
        let in_target = path
            .waypoints
            .iter()
            .filter(|&&id| grid.graph_of(id).unwrap().kind == GraphKind::Region(RegionId(1)))
            .count();
        assert_eq!(in_target, 1);
    }

    #[test]
    fn unrelated_adjacent_region_has_no_route() {
        let grid = grid();
        let mut scratch = SearchScratch::for_grid(&grid);
        let start = wp(&grid, 9, 6); // inside R2, touching the corridor and R0
        let err = find_path(&grid, &mut scratch, &PathRequest::to_region(start, RegionId(1)), &config()).unwrap_err();
        assert!(matches!(err, NavError::NoPath { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn never_steps_on_blocked_or_occupied_cells() {
        let mut grid = grid();
        grid.set_blocked(wp(&grid, 8, 3), true).unwrap();
        grid.set_occupant(wp(&grid, 10, 4), Some(UnitId(1))).unwrap();
        grid.set_blocked(wp(&grid, 12, 3), true).unwrap();

        let mut scratch = SearchScratch::for_grid(&grid);
        let start = wp(&grid, 2, 3);
        let path = find_path(&grid, &mut scratch, &PathRequest::to_region(start, RegionId(1)), &config()).unwrap();
        assert_contiguous(&grid, &path);
        for &id in &path.waypoints[1..] {
            assert!(grid.waypoint(id).unwrap().is_passable());
        }
    }

    #[test]
    fn walled_corridor_fails() {
        let mut grid = grid();
        grid.set_blocked(wp(&grid, 10, 3), true).unwrap();
        grid.set_occupant(wp(&grid, 10, 4), Some(UnitId(1))).unwrap();
        let mut scratch = SearchScratch::for_grid(&grid);
        let start = wp(&grid, 2, 3);
        let result = find_path(&grid, &mut scratch, &PathRequest::to_region(start, RegionId(1)), &config());
        assert!(matches!(result, Err(NavError::NoPath { .. })));
    }

    #[test]
    fn exact_waypoint_target() {
        let grid = grid();
        let mut scratch = SearchScratch::for_grid(&grid);
        let start = wp(&grid, 0, 0);
        let goal = wp(&grid, 5, 7);
        let path = find_path(&grid, &mut scratch, &PathRequest::to_waypoint(start, goal), &config()).unwrap();
        assert_eq!(path.waypoints.first(), Some(&start));
        assert_eq!(path.waypoints.last(), Some(&goal));
        assert_contiguous(&grid, &path);
    }

    #[test]
    fn approach_only_stops_next_to_an_occupied_goal() {
        let mut grid = grid();
        let goal = wp(&grid, 17, 3);
        grid.set_occupant(goal, Some(UnitId(9))).unwrap();
        let mut scratch = SearchScratch::for_grid(&grid);
        let start = wp(&grid, 2, 3);

        let direct = find_path(&grid, &mut scratch, &PathRequest::to_waypoint(start, goal), &config());
        assert!(matches!(direct, Err(NavError::NoPath { .. })));

        let path = find_path(&grid, &mut scratch, &PathRequest::to_waypoint(start, goal).approach(), &config())
            .unwrap();
        let last = *path.waypoints.last().unwrap();
        assert_ne!(last, goal);
        let (a, b) = (grid.waypoint(last).unwrap().cell, grid.waypoint(goal).unwrap().cell);
        assert!((a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1);
    }

    #[test]
    fn scratch_reuse_is_deterministic() {
        let grid = grid();
        let mut scratch = SearchScratch::for_grid(&grid);
        let req = PathRequest::to_region(wp(&grid, 1, 6), RegionId(1));
        let first = find_path(&grid, &mut scratch, &req, &config()).unwrap();
        let _ = find_path(&grid, &mut scratch, &PathRequest::to_region(wp(&grid, 15, 1), RegionId(0)), &config());
        let again = find_path(&grid, &mut scratch, &req, &config()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn batch_results_in_request_order() {
        let grid = grid();
        let requests = [
            PathRequest::to_region(wp(&grid, 1, 1), RegionId(1)),
            PathRequest::to_region(wp(&grid, 9, 6), RegionId(1)),
            PathRequest::to_region(wp(&grid, 16, 2), RegionId(0)),
        ];
        let results = find_paths(&HeadingSearch::default(), &grid, &requests);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        let back = results[2].as_ref().unwrap();
        assert_eq!(back.waypoints[0], requests[2].start);
    }

    #[test]
    fn unknown_region_target_is_not_recoverable() {
        let grid = grid();
        let mut scratch = SearchScratch::for_grid(&grid);
        let err = find_path(&grid, &mut scratch, &PathRequest::to_region(wp(&grid, 1, 1), RegionId(7)), &config())
            .unwrap_err();
        assert!(matches!(err, NavError::UnknownRegion(_)));
        assert!(!err.is_recoverable());
    }
}

// ── Proximity ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod proximity {
    use rustc_hash::FxHashMap;

    use ln_core::{PlayerId, RegionId, UnitId};

    use super::helpers::{grid, wp};
    use crate::{collect_hostiles, range_search, scan_hostiles, NavError, NavGrid, OccupantFilter, RangeHits, RangeMode};

    const ME: PlayerId = PlayerId(0);
    const THEM: PlayerId = PlayerId(1);

    /// Three hostiles around (2, 3) at rings 2, 3 and 4, one friendly at
    /// ring 1, and one hostile far away in R1.
    fn populated() -> (NavGrid, FxHashMap<UnitId, PlayerId>) {
        let mut grid = grid();
        let mut owners = FxHashMap::default();
        for (unit, (x, y), owner) in [
            (1, (4, 3), THEM),
            (2, (0, 0), THEM),
            (3, (5, 7), THEM),
            (4, (2, 4), ME),
            (5, (17, 3), THEM),
        ] {
            grid.set_occupant(wp(&grid, x, y), Some(UnitId(unit))).unwrap();
            owners.insert(UnitId(unit), owner);
        }
        (grid, owners)
    }

    #[test]
    fn list_mode_finds_all_hostiles_in_range() {
        let (grid, owners) = populated();
        let hits = range_search(&grid, wp(&grid, 2, 3), OccupantFilter::hostile_to(ME), &owners, 4, RangeMode::All)
            .unwrap()
            .into_vec();
        let mut sorted = hits.clone();
        sorted.sort();
        assert_eq!(sorted, vec![UnitId(1), UnitId(2), UnitId(3)]);
    }

    #[test]
    fn first_mode_returns_nearest_ring() {
        let (grid, owners) = populated();
        let hit = range_search(&grid, wp(&grid, 2, 3), OccupantFilter::hostile_to(ME), &owners, 4, RangeMode::First)
            .unwrap();
        assert_eq!(hit, RangeHits::One(UnitId(1)));
    }

    #[test]
    fn friendly_filter() {
        let (grid, owners) = populated();
        let hit = range_search(&grid, wp(&grid, 2, 3), OccupantFilter::friendly_to(ME), &owners, 1, RangeMode::First)
            .unwrap();
        assert_eq!(hit, RangeHits::One(UnitId(4)));
    }

    #[test]
    fn radius_bounds_the_sweep() {
        let (grid, owners) = populated();
        let hits = range_search(&grid, wp(&grid, 2, 3), OccupantFilter::hostile_to(ME), &owners, 2, RangeMode::All)
            .unwrap();
        assert_eq!(hits, RangeHits::Many(vec![UnitId(1)]));
        let none = range_search(&grid, wp(&grid, 2, 3), OccupantFilter::hostile_to(ME), &owners, 0, RangeMode::All);
        assert!(matches!(none, Err(NavError::NothingInRange { radius: 0, .. })));
    }

    #[test]
    fn sweeping_off_the_grid_edge_is_harmless() {
        let (grid, owners) = populated();
        let hits = range_search(&grid, wp(&grid, 0, 7), OccupantFilter::hostile_to(ME), &owners, 9, RangeMode::All)
            .unwrap()
            .into_vec();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn huge_radius_is_clamped_to_the_grid() {
        let (grid, owners) = populated();
        let mut hits =
            range_search(&grid, wp(&grid, 2, 3), OccupantFilter::hostile_to(ME), &owners, u32::MAX, RangeMode::All)
                .unwrap()
                .into_vec();
        hits.sort();
        assert_eq!(hits, vec![UnitId(1), UnitId(2), UnitId(3), UnitId(5)]);
    }

    #[test]
    fn unknown_owners_never_match() {
        let (grid, _) = populated();
        let empty: FxHashMap<UnitId, PlayerId> = FxHashMap::default();
        let result = range_search(&grid, wp(&grid, 2, 3), OccupantFilter::hostile_to(ME), &empty, 9, RangeMode::All);
        assert!(result.is_err());
    }

    #[test]
    fn hostile_scan_per_graph() {
        let (grid, owners) = populated();
        let r0 = grid.region_graph(RegionId(0)).unwrap().id;
        let r1 = grid.region_graph(RegionId(1)).unwrap().id;
        let r2 = grid.region_graph(RegionId(2)).unwrap().id;

        assert!(scan_hostiles(&grid, r0, ME, &owners).unwrap());
        assert!(scan_hostiles(&grid, r0, THEM, &owners).unwrap());
        assert!(!scan_hostiles(&grid, r2, ME, &owners).unwrap());

        let mut out = Vec::new();
        assert_eq!(collect_hostiles(&grid, r0, ME, &owners, &mut out).unwrap(), 3);
        assert_eq!(collect_hostiles(&grid, r1, ME, &owners, &mut out).unwrap(), 1);
        assert_eq!(out.len(), 4);
    }
}
