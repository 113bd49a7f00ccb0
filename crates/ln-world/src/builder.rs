//! World builder: validates input and assembles grid and lane network.

use rustc_hash::FxHashMap;
use tracing::info;

use ln_core::{MapSpec, NavConfig};
use ln_lane::{BridgeNetworkBuilder, UnitStore};
use ln_nav::{build_global_grid, build_path_graph, build_region_graph, PathFinder, SearchScratch};

use crate::world::World;
use crate::WorldResult;

/// Fluent builder for [`World`].
///
/// # Example
///
/// ```rust,ignore
/// let world = WorldBuilder::new(map, HeadingSearch::default())
///     .config(NavConfig { cell_size: 4.0, ..NavConfig::default() })
///     .build()?;
/// ```
pub struct WorldBuilder<P: PathFinder> {
    map: MapSpec,
    config: NavConfig,
    finder: P,
}

impl<P: PathFinder> WorldBuilder<P> {
    /// Start a builder with the default [`NavConfig`].
    pub fn new(map: MapSpec, finder: P) -> Self {
        Self { map, config: NavConfig::default(), finder }
    }

    pub fn config(mut self, config: NavConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate and build.
    ///
    /// Construction order: global grid, one graph per region, one graph per
    /// path (regions claim shared cells first), then the lane network: every
    /// path lane before any region's bridges, since region bridges hang off
    /// path ends.
    pub fn build(self) -> WorldResult<World<P>> {
        self.config.validate()?;
        self.map.validate()?;

        let mut grid = build_global_grid(&self.map, &self.config)?;
        for region in &self.map.regions {
            build_region_graph(&mut grid, region)?;
        }
        for path in &self.map.paths {
            build_path_graph(&mut grid, path)?;
        }

        let mut lanes = BridgeNetworkBuilder::new(self.config.bridge_step)?;
        for path in &self.map.paths {
            lanes.add_path_lane(path)?;
        }
        for region in &self.map.regions {
            lanes.build_region_bridges(&self.map, region)?;
        }
        let lanes = lanes.build();

        info!(
            cells     = grid.slot_count(),
            waypoints = grid.waypoint_count(),
            graphs    = grid.graphs().len(),
            nodes     = lanes.node_count(),
            bridges   = lanes.bridge_count(),
            "world built"
        );

        let scratch = SearchScratch::for_grid(&grid);
        Ok(World {
            config:   self.config,
            map:      self.map,
            grid,
            lanes,
            units:    UnitStore::new(),
            finder:   self.finder,
            scratch,
            mirrored: Vec::new(),
            waiting:  FxHashMap::default(),
            tick:     0,
        })
    }
}
