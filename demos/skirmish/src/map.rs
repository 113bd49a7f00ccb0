//! Synthetic three-region map.
//!
//! ```text
//!   West ──── north road ──── East
//!     \                      /
//!      \__ south road ──────/ ── Hill
//!                                  (east ↔ hill ford)
//! ```
//!
//! West and East each hold one barracks; Hill is unowned.

use ln_core::{BuildingId, BuildingSpec, MapSpec, PathId, PathSpec, PlayerId, RegionId, RegionSpec, Vec2};

pub const WEST: PlayerId = PlayerId(0);
pub const EAST: PlayerId = PlayerId(1);

fn rect(id: u32, x0: f32, y0: f32, x1: f32, y1: f32, owner: Option<PlayerId>) -> RegionSpec {
    RegionSpec {
        id:       RegionId(id),
        boundary: vec![Vec2::new(x0, y0), Vec2::new(x1, y0), Vec2::new(x1, y1), Vec2::new(x0, y1)],
        castle:   Vec2::new((x0 + x1) * 0.5, (y0 + y1) * 0.5),
        owner,
    }
}

fn road(id: u32, points: &[(f32, f32)], from: u32, to: u32) -> PathSpec {
    PathSpec {
        id:         PathId(id),
        centerline: points.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
        thickness:  12.0,
        regions:    [RegionId(from), RegionId(to)],
    }
}

pub fn build_map() -> MapSpec {
    MapSpec {
        width:   512.0,
        height:  256.0,
        regions: vec![
            rect(0, 8.0, 40.0, 104.0, 216.0, Some(WEST)),
            rect(1, 408.0, 40.0, 504.0, 216.0, Some(EAST)),
            rect(2, 408.0, 224.0, 504.0, 248.0, None),
        ],
        paths: vec![
            road(0, &[(90.0, 80.0), (256.0, 60.0), (420.0, 80.0)], 0, 1),
            road(1, &[(90.0, 180.0), (256.0, 200.0), (420.0, 180.0)], 0, 1),
            road(2, &[(456.0, 200.0), (456.0, 236.0)], 1, 2),
        ],
        buildings: vec![
            BuildingSpec {
                id:       BuildingId(0),
                region:   RegionId(0),
                position: Vec2::new(30.0, 100.0),
                owner:    WEST,
            },
            BuildingSpec {
                id:       BuildingId(1),
                region:   RegionId(1),
                position: Vec2::new(482.0, 100.0),
                owner:    EAST,
            },
        ],
    }
}
