//! Unit tests for ln-core primitives.

#[cfg(test)]
mod ids {
    use crate::{NodeId, PlayerId, UnitId, WaypointId};

    #[test]
    fn index_roundtrip() {
        let id = WaypointId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(WaypointId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(PlayerId::INVALID.0, u16::MAX);
        assert!(!UnitId::default().is_valid());
        assert!(UnitId(0).is_valid());
    }

    #[test]
    fn player_id_rejects_overflow() {
        assert!(PlayerId::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(UnitId(7).to_string(), "UnitId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{polyline_distance_sq, polyline_length, polyline_point_at, segment_distance_sq, segments_cross};
    use crate::{Rect, Vec2};

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(segment_distance_sq(Vec2::new(5.0, 3.0), a, b), 9.0);
        assert_eq!(segment_distance_sq(Vec2::new(-4.0, 3.0), a, b), 25.0);
    }

    #[test]
    fn crossing_segments() {
        let cross = segments_cross(
            Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0),
        );
        assert!(cross);
        let parallel = segments_cross(
            Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0), Vec2::new(10.0, 1.0),
        );
        assert!(!parallel);
    }

    #[test]
    fn polyline_sampling() {
        let line = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        assert_eq!(polyline_length(&line), 20.0);
        assert_eq!(polyline_point_at(&line, 15.0), Some(Vec2::new(10.0, 5.0)));
        assert_eq!(polyline_point_at(&line, 99.0), Some(Vec2::new(10.0, 10.0)));
        assert_eq!(polyline_point_at(&[], 1.0), None);
        assert_eq!(polyline_distance_sq(Vec2::new(12.0, 5.0), &line), 4.0);
    }

    #[test]
    fn bounding_rect() {
        let r = Rect::bounding(&[Vec2::new(3.0, 1.0), Vec2::new(-1.0, 4.0)]).unwrap();
        assert_eq!(r.min, Vec2::new(-1.0, 1.0));
        assert_eq!(r.max, Vec2::new(3.0, 4.0));
        assert!(r.expanded(1.0).contains(Vec2::new(4.0, 0.0)));
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn move_towards_stops_on_target() {
        let p = Vec2::new(0.0, 0.0).move_towards(Vec2::new(3.0, 4.0), 10.0);
        assert_eq!(p, Vec2::new(3.0, 4.0));
        let q = Vec2::new(0.0, 0.0).move_towards(Vec2::new(3.0, 4.0), 2.5);
        assert!((q.length() - 2.5).abs() < 1e-5);
    }
}

#[cfg(test)]
mod map {
    use crate::{BuildingId, BuildingSpec, CoreError, MapSpec, PathId, PathSpec, PlayerId, RegionId, RegionSpec, Vec2};

    fn square(id: u32, x0: f32) -> RegionSpec {
        RegionSpec {
            id:       RegionId(id),
            boundary: vec![
                Vec2::new(x0, 0.0),
                Vec2::new(x0 + 40.0, 0.0),
                Vec2::new(x0 + 40.0, 40.0),
                Vec2::new(x0, 40.0),
            ],
            castle:   Vec2::new(x0 + 20.0, 20.0),
            owner:    None,
        }
    }

    fn two_region_map() -> MapSpec {
        MapSpec {
            width:     120.0,
            height:    40.0,
            regions:   vec![square(0, 0.0), square(1, 80.0)],
            paths:     vec![PathSpec {
                id:         PathId(0),
                centerline: vec![Vec2::new(30.0, 20.0), Vec2::new(90.0, 20.0)],
                thickness:  8.0,
                regions:    [RegionId(0), RegionId(1)],
            }],
            buildings: vec![BuildingSpec {
                id:       BuildingId(0),
                region:   RegionId(0),
                position: Vec2::new(10.0, 10.0),
                owner:    PlayerId(1),
            }],
        }
    }

    #[test]
    fn valid_map_passes() {
        two_region_map().validate().unwrap();
    }

    #[test]
    fn dangling_path_region_rejected() {
        let mut map = two_region_map();
        map.paths[0].regions[1] = RegionId(9);
        assert!(matches!(map.validate(), Err(CoreError::DanglingPath { .. })));
    }

    #[test]
    fn out_of_order_ids_rejected() {
        let mut map = two_region_map();
        map.regions.swap(0, 1);
        assert!(matches!(map.validate(), Err(CoreError::InvalidMap(_))));
    }

    #[test]
    fn path_queries() {
        let map = two_region_map();
        assert_eq!(map.paths_touching(RegionId(1)).count(), 1);
        assert_eq!(map.paths[0].end_in(RegionId(1)), Some(1));
        assert_eq!(map.paths[0].end_in(RegionId(5)), None);
        assert_eq!(map.buildings_in(RegionId(0)).count(), 1);
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, NavConfig};

    #[test]
    fn default_is_valid() {
        NavConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_cell_size_rejected() {
        let cfg = NavConfig { cell_size: 0.0, ..NavConfig::default() };
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }
}

#[cfg(test)]
mod owner {
    use rustc_hash::FxHashMap;

    use crate::{OwnerLookup, PlayerId, Side, UnitId};

    #[test]
    fn side_matching() {
        assert!(Side::Hostile.matches(PlayerId(0), PlayerId(1)));
        assert!(!Side::Hostile.matches(PlayerId(0), PlayerId(0)));
        assert!(Side::Friendly.matches(PlayerId(2), PlayerId(2)));
    }

    #[test]
    fn map_lookup() {
        let mut owners = FxHashMap::default();
        owners.insert(UnitId(3), PlayerId(1));
        assert_eq!(owners.owner_of(UnitId(3)), Some(PlayerId(1)));
        assert_eq!(owners.owner_of(UnitId(4)), None);
    }
}
