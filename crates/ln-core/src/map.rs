//! Immutable map geometry handed over by the map loader.
//!
//! Parsing map files is the loader's job; this module only fixes the shape
//! of what it produces.  Every id equals its position in the owning `Vec`
//! (`regions[r.index()].id == r`), which [`MapSpec::validate`] checks.

use crate::{BuildingId, CoreError, CoreResult, PathId, PlayerId, RegionId, Vec2};

/// A region: a closed polygon with a castle guard point inside it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionSpec {
    pub id: RegionId,
    /// Boundary vertices in order.  The closing edge (last → first) is
    /// implicit.
    pub boundary: Vec<Vec2>,
    /// Point defended by the region's owner; castle approach and defend
    /// lanes end here.
    pub castle: Vec2,
    pub owner: Option<PlayerId>,
}

/// A path: a centerline corridor joining two regions.
///
/// `centerline[0]` lies in `regions[0]`, the last point in `regions[1]`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathSpec {
    pub id: PathId,
    pub centerline: Vec<Vec2>,
    /// Full visual width of the corridor in world units.
    pub thickness: f32,
    pub regions: [RegionId; 2],
}

impl PathSpec {
    /// `true` if `region` is one of the two endpoints.
    #[inline]
    pub fn touches(&self, region: RegionId) -> bool {
        self.regions[0] == region || self.regions[1] == region
    }

    /// The centerline end lying in `region`: `Some(0)` for the first point,
    /// `Some(1)` for the last.
    pub fn end_in(&self, region: RegionId) -> Option<usize> {
        self.regions.iter().position(|&r| r == region)
    }
}

/// A building that spawns units into its region.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingSpec {
    pub id: BuildingId,
    pub region: RegionId,
    pub position: Vec2,
    pub owner: PlayerId,
}

/// Complete static geometry of one map.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapSpec {
    pub width: f32,
    pub height: f32,
    pub regions: Vec<RegionSpec>,
    pub paths: Vec<PathSpec>,
    pub buildings: Vec<BuildingSpec>,
}

impl MapSpec {
    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&RegionSpec> {
        self.regions.get(id.index())
    }

    #[inline]
    pub fn path(&self, id: PathId) -> Option<&PathSpec> {
        self.paths.get(id.index())
    }

    /// Paths with one end in `region`, in ascending `PathId` order.
    pub fn paths_touching(&self, region: RegionId) -> impl Iterator<Item = &PathSpec> + '_ {
        self.paths.iter().filter(move |p| p.touches(region))
    }

    /// Buildings standing in `region`.
    pub fn buildings_in(&self, region: RegionId) -> impl Iterator<Item = &BuildingSpec> + '_ {
        self.buildings.iter().filter(move |b| b.region == region)
    }

    /// Structural checks: positive extent, sequential ids, dangling region
    /// references.  Geometry quality (self-intersecting polygons etc.) is
    /// caught later by graph construction.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(CoreError::InvalidMap(format!(
                "map extent must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        for (i, r) in self.regions.iter().enumerate() {
            if r.id.index() != i {
                return Err(CoreError::InvalidMap(format!("{} stored at slot {i}", r.id)));
            }
        }
        for (i, p) in self.paths.iter().enumerate() {
            if p.id.index() != i {
                return Err(CoreError::InvalidMap(format!("{} stored at slot {i}", p.id)));
            }
            for &region in &p.regions {
                if self.region(region).is_none() {
                    return Err(CoreError::DanglingPath { path: p.id, region });
                }
            }
            if p.centerline.len() < 2 {
                return Err(CoreError::InvalidMap(format!("{} has fewer than 2 centerline points", p.id)));
            }
        }
        for (i, b) in self.buildings.iter().enumerate() {
            if b.id.index() != i {
                return Err(CoreError::InvalidMap(format!("{} stored at slot {i}", b.id)));
            }
            if self.region(b.region).is_none() {
                return Err(CoreError::InvalidMap(format!("{} stands in unknown {}", b.id, b.region)));
            }
        }
        Ok(())
    }
}
