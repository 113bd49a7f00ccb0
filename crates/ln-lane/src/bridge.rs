//! Bridge network: lane nodes, bridges, junctions, and spatial lookup.
//!
//! # Data layout
//!
//! Every lane node lives in one arena indexed by `NodeId`.  A bridge is a
//! chain `start → interior… → end` linked through the nodes' `prev`/`next`
//! fields.  Path lanes own their two endpoint nodes; every other bridge is
//! strung between nodes that already exist (path ends, castle and building
//! anchors) and owns only its interior nodes:
//!
//! ```text
//!   path A ──●  ← shared endpoint, owned by A
//!             ╲
//!              ○ ○ ○   crossing interior (owned by the crossing)
//!                    ╲
//!                     ●── path B
//! ```
//!
//! The interior's first `prev` and last `next` point into the foreign
//! endpoints, while those endpoints keep their own links.  A unit walking a
//! crossing therefore flows onto path B by following `next`, but a unit
//! standing at the end of path A has to be redirected onto the crossing
//! explicitly (see `movement::enter_bridge`).  The junction table lists,
//! for every endpoint, the bridges attached to it.
//!
//! Anchor nodes (castle guard points and building doors) belong to no
//! bridge.  Stepping onto one leaves the unit without a direction.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps a world position to the nearest lane node.
//! During construction a second R-tree over path endpoints finds the path
//! entry closest to each building.

use std::iter;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use ln_core::geo::{polyline_length, polyline_point_at};
use ln_core::{BridgeId, BuildingId, MapSpec, NodeId, PathId, PathSpec, RegionId, RegionSpec, UnitId, Vec2};

use crate::{LaneError, LaneResult};

// ── Direction ─────────────────────────────────────────────────────────────────

/// Which link a unit follows: `next` (forward) or `prev` (backward).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Backward,
    /// Standing on an anchor node; any forced step fails.
    #[default]
    Invalid,
}

impl Direction {
    #[inline]
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Forward  => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Invalid  => Direction::Invalid,
        }
    }
}

// ── Nodes and bridges ─────────────────────────────────────────────────────────

/// One position slot on a lane.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneNode {
    pub pos: Vec2,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    /// Owning bridge; `None` for anchor nodes.
    pub bridge: Option<BridgeId>,
    pub occupant: Option<UnitId>,
}

impl LaneNode {
    #[inline]
    pub fn link(&self, dir: Direction) -> Option<NodeId> {
        match dir {
            Direction::Forward  => self.next,
            Direction::Backward => self.prev,
            Direction::Invalid  => None,
        }
    }
}

/// What a bridge connects.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BridgeKind {
    /// The lane along a path's centerline.
    Path(PathId),
    /// Cross-link between the ends of two paths meeting in `region`.
    Crossing { region: RegionId, from: PathId, to: PathId },
    /// From a building's door to the nearest path end in its region.
    BuildingExit { building: BuildingId, path: PathId },
    /// From a building's door to its region's castle.
    Defend { building: BuildingId },
    /// From a path end to the castle of the region it enters.
    CastleApproach { region: RegionId, path: PathId },
    /// Built directly between two points.
    Free,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bridge {
    pub id: BridgeId,
    pub kind: BridgeKind,
    pub start: NodeId,
    pub end: NodeId,
    /// Nodes strictly between `start` and `end`, in forward order.
    pub interior: Vec<NodeId>,
}

impl Bridge {
    /// Node count including both endpoints.
    #[inline]
    pub fn len(&self) -> usize {
        self.interior.len() + 2
    }

    #[inline]
    pub fn is_endpoint(&self, node: NodeId) -> bool {
        node == self.start || node == self.end
    }

    /// All nodes from `start` to `end`.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        iter::once(self.start)
            .chain(self.interior.iter().copied())
            .chain(iter::once(self.end))
    }
}

/// Interior node count and first-gap offset for a chain of length
/// `distance` sampled every `step`.
///
/// The count is `round(distance / step) - 1` (never negative).  Interior
/// node `i` (1-based) sits at `offset + i * step`; the leftover length is
/// split evenly between the two end gaps, so two chains sampled over the
/// same stretch line up.
pub fn interior_layout(distance: f32, step: f32) -> (usize, f32) {
    let count = ((distance / step).round() - 1.0).max(0.0) as usize;
    let offset = (distance - (count as f32 + 1.0) * step) * 0.5;
    (count, offset)
}

// ── R-tree entries ────────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// A path endpoint and the region it lies in.
#[derive(Clone)]
struct EndpointEntry {
    point: [f32; 2],
    node: NodeId,
    path: PathId,
    region: RegionId,
}

impl RTreeObject for EndpointEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for EndpointEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── BridgeNetwork ─────────────────────────────────────────────────────────────

/// All lanes of a map.
///
/// `nodes` and `bridges` are `pub` for direct indexed reads on hot paths.
/// Occupancy is written only by the movement step and unit lifecycle in
/// this crate.  Build one with [`BridgeNetworkBuilder`].
pub struct BridgeNetwork {
    pub nodes: Vec<LaneNode>,
    pub bridges: Vec<Bridge>,
    junctions: FxHashMap<NodeId, Vec<BridgeId>>,
    path_lanes: Vec<BridgeId>,
    castles: FxHashMap<RegionId, NodeId>,
    building_doors: FxHashMap<BuildingId, NodeId>,
    spatial_idx: RTree<NodeEntry>,
}

impl BridgeNetwork {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }

    pub fn node(&self, id: NodeId) -> LaneResult<&LaneNode> {
        self.nodes.get(id.index()).ok_or(LaneError::UnknownNode(id))
    }

    pub fn bridge(&self, id: BridgeId) -> LaneResult<&Bridge> {
        self.bridges.get(id.index()).ok_or(LaneError::UnknownBridge(id))
    }

    /// The lane running along `path`.
    pub fn path_lane(&self, path: PathId) -> LaneResult<&Bridge> {
        match self.path_lanes.get(path.index()) {
            Some(&id) if id.is_valid() => self.bridge(id),
            _ => Err(LaneError::MissingPathLane(path)),
        }
    }

    pub fn castle_node(&self, region: RegionId) -> Option<NodeId> {
        self.castles.get(&region).copied()
    }

    pub fn building_node(&self, building: BuildingId) -> LaneResult<NodeId> {
        self.building_doors
            .get(&building)
            .copied()
            .ok_or(LaneError::UnknownBuilding(building))
    }

    /// Bridges starting or ending at `node`, in ascending id order.
    pub fn junction(&self, node: NodeId) -> &[BridgeId] {
        self.junctions.get(&node).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn occupant(&self, node: NodeId) -> Option<UnitId> {
        self.nodes.get(node.index()).and_then(|n| n.occupant)
    }

    #[inline]
    pub fn is_free(&self, node: NodeId) -> bool {
        self.nodes.get(node.index()).is_some_and(|n| n.occupant.is_none())
    }

    /// Direction a unit has after moving from `from` onto `to` when `to`
    /// belongs to a different bridge.
    ///
    /// Entering at the new bridge's end gives `Backward`, at its start
    /// `Forward`.  Entering an interior node from the node its `next` points
    /// to gives `Backward`, anything else `Forward`.  A node with no bridge
    /// gives `Invalid`.
    pub fn entry_direction(&self, from: NodeId, to: NodeId) -> Direction {
        let Some(node) = self.nodes.get(to.index()) else {
            return Direction::Invalid;
        };
        let Some(bridge) = node.bridge.and_then(|b| self.bridges.get(b.index())) else {
            return Direction::Invalid;
        };
        if to == bridge.end {
            Direction::Backward
        } else if to == bridge.start {
            Direction::Forward
        } else if node.next == Some(from) {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// One hop from `node` in `dir`: the next node and the direction the
    /// walker has on arrival.  `None` at a lane end or for `Invalid`.
    pub fn step(&self, node: NodeId, dir: Direction) -> Option<(NodeId, Direction)> {
        let here = self.nodes.get(node.index())?;
        let next = here.link(dir)?;
        let there = self.nodes.get(next.index())?;
        let dir = if there.bridge.is_some() && there.bridge == here.bridge {
            dir
        } else {
            self.entry_direction(node, next)
        };
        Some((next, dir))
    }

    /// First hop onto `bridge` for a walker standing on one of its
    /// endpoints.
    pub fn first_hop(&self, from: NodeId, bridge: BridgeId) -> LaneResult<(NodeId, Direction)> {
        let b = self.bridge(bridge)?;
        let to = if from == b.start {
            b.interior.first().copied().unwrap_or(b.end)
        } else if from == b.end {
            b.interior.last().copied().unwrap_or(b.start)
        } else {
            return Err(LaneError::NotAnEndpoint { node: from, bridge });
        };
        Ok((to, self.entry_direction(from, to)))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest lane node to `pos`.  `None` only for an empty network.
    pub fn snap_to_node(&self, pos: Vec2) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, closest first.
    pub fn k_nearest_nodes(&self, pos: Vec2, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    // ── Occupancy (crate-internal) ────────────────────────────────────────

    #[inline]
    pub(crate) fn set_occupant(&mut self, node: NodeId, unit: Option<UnitId>) {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.occupant = unit;
        }
    }
}

// ── BridgeNetworkBuilder ──────────────────────────────────────────────────────

/// Construct a [`BridgeNetwork`] lane by lane, then call
/// [`build`](Self::build).
///
/// Path lanes must exist before the bridges of the regions they enter.
/// Every construction call is all-or-nothing: on error the nodes and
/// bridges it allocated are released.
pub struct BridgeNetworkBuilder {
    step: f32,
    nodes: Vec<LaneNode>,
    bridges: Vec<Bridge>,
    path_lanes: Vec<BridgeId>,
    castles: FxHashMap<RegionId, NodeId>,
    building_doors: FxHashMap<BuildingId, NodeId>,
    path_ends: RTree<EndpointEntry>,
}

impl BridgeNetworkBuilder {
    /// `step` is the spacing between consecutive lane nodes.
    pub fn new(step: f32) -> LaneResult<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(LaneError::InvalidStep(step));
        }
        Ok(Self {
            step,
            nodes:          Vec::new(),
            bridges:        Vec::new(),
            path_lanes:     Vec::new(),
            castles:        FxHashMap::default(),
            building_doors: FxHashMap::default(),
            path_ends:      RTree::new(),
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }

    fn alloc_node(&mut self, pos: Vec2, bridge: Option<BridgeId>) -> LaneResult<NodeId> {
        let id = NodeId::try_from(self.nodes.len()).map_err(|_| LaneError::NodeCapacity)?;
        if !id.is_valid() {
            return Err(LaneError::NodeCapacity);
        }
        self.nodes.push(LaneNode { pos, prev: None, next: None, bridge, occupant: None });
        Ok(id)
    }

    fn next_bridge_id(&self) -> LaneResult<BridgeId> {
        let id = BridgeId::try_from(self.bridges.len()).map_err(|_| LaneError::NodeCapacity)?;
        if id.is_valid() { Ok(id) } else { Err(LaneError::NodeCapacity) }
    }

    /// Release everything allocated after `mark`.
    fn unwind(&mut self, mark: (usize, usize)) {
        self.nodes.truncate(mark.0);
        self.bridges.truncate(mark.1);
    }

    /// Sample the interior of a chain from `start` to `end`, link it, and
    /// register the bridge.  `sample(d)` gives the point at arc length `d`.
    /// With `owns_ends` the endpoints' own links are pointed into the chain.
    fn chain(
        &mut self,
        kind: BridgeKind,
        start: NodeId,
        end: NodeId,
        distance: f32,
        owns_ends: bool,
        sample: impl Fn(f32) -> Option<Vec2>,
    ) -> LaneResult<BridgeId> {
        let id = self.next_bridge_id()?;
        let (count, offset) = interior_layout(distance, self.step);

        let mut interior = Vec::with_capacity(count);
        for i in 1..=count {
            let d = offset + i as f32 * self.step;
            let pos = sample(d).ok_or_else(|| LaneError::DegenerateBridge {
                a: self.nodes[start.index()].pos,
                b: self.nodes[end.index()].pos,
            })?;
            interior.push(self.alloc_node(pos, Some(id))?);
        }

        let mut prev = start;
        for &node in &interior {
            self.nodes[node.index()].prev = Some(prev);
            if prev != start || owns_ends {
                self.nodes[prev.index()].next = Some(node);
            }
            prev = node;
        }
        if prev != start {
            self.nodes[prev.index()].next = Some(end);
            if owns_ends {
                self.nodes[end.index()].prev = Some(prev);
            }
        } else if owns_ends {
            self.nodes[start.index()].next = Some(end);
            self.nodes[end.index()].prev = Some(start);
        }

        self.bridges.push(Bridge { id, kind, start, end, interior });
        Ok(id)
    }

    /// Build a free-standing bridge from `a` to `b`.
    ///
    /// The endpoints are new nodes owned by the bridge.  Points that
    /// coincide or are not finite are rejected.
    pub fn build_bridge(&mut self, a: Vec2, b: Vec2) -> LaneResult<BridgeId> {
        if !(a.is_finite() && b.is_finite()) || a.distance_sq(b) == 0.0 {
            warn!(%a, %b, "degenerate bridge");
            return Err(LaneError::DegenerateBridge { a, b });
        }
        let mark = (self.nodes.len(), self.bridges.len());
        let result = self.endpoints_and_chain(BridgeKind::Free, a, b, a.distance(b), |d| {
            Some(a.move_towards(b, d))
        });
        if result.is_err() {
            self.unwind(mark);
        }
        result
    }

    fn endpoints_and_chain(
        &mut self,
        kind: BridgeKind,
        a: Vec2,
        b: Vec2,
        distance: f32,
        sample: impl Fn(f32) -> Option<Vec2>,
    ) -> LaneResult<BridgeId> {
        let id = self.next_bridge_id()?;
        let start = self.alloc_node(a, Some(id))?;
        let end = self.alloc_node(b, Some(id))?;
        let built = self.chain(kind, start, end, distance, true, sample)?;
        debug!(bridge = %built, ?kind, nodes = self.bridges[built.index()].len(), "bridge built");
        Ok(built)
    }

    /// Build the lane along `path`'s centerline.
    pub fn add_path_lane(&mut self, path: &PathSpec) -> LaneResult<BridgeId> {
        if self.path_lanes.get(path.id.index()).is_some_and(|b| b.is_valid()) {
            return Err(LaneError::DuplicatePathLane(path.id));
        }
        let (Some(&a), Some(&b)) = (path.centerline.first(), path.centerline.last()) else {
            return Err(LaneError::DegenerateBridge { a: Vec2::ZERO, b: Vec2::ZERO });
        };
        let length = polyline_length(&path.centerline);
        if !(length.is_finite() && length > 0.0) {
            warn!(path = %path.id, "path lane has no length");
            return Err(LaneError::DegenerateBridge { a, b });
        }

        let mark = (self.nodes.len(), self.bridges.len());
        let line = &path.centerline;
        let result = self.endpoints_and_chain(BridgeKind::Path(path.id), a, b, length, |d| polyline_point_at(line, d));
        let id = match result {
            Ok(id) => id,
            Err(e) => {
                self.unwind(mark);
                return Err(e);
            }
        };

        if self.path_lanes.len() <= path.id.index() {
            self.path_lanes.resize(path.id.index() + 1, BridgeId::INVALID);
        }
        self.path_lanes[path.id.index()] = id;
        let lane = &self.bridges[id.index()];
        for (node, region) in [(lane.start, path.regions[0]), (lane.end, path.regions[1])] {
            let p = self.nodes[node.index()].pos;
            self.path_ends.insert(EndpointEntry { point: [p.x, p.y], node, path: path.id, region });
        }
        Ok(id)
    }

    /// Endpoint of `path`'s lane lying in `region`.
    fn path_end(&self, path: &PathSpec, region: RegionId) -> LaneResult<NodeId> {
        let id = match self.path_lanes.get(path.id.index()) {
            Some(&id) if id.is_valid() => id,
            _ => return Err(LaneError::MissingPathLane(path.id)),
        };
        let lane = &self.bridges[id.index()];
        Ok(if path.end_in(region) == Some(1) { lane.end } else { lane.start })
    }

    /// String a bridge between two existing nodes.
    fn link(&mut self, kind: BridgeKind, from: NodeId, to: NodeId) -> LaneResult<BridgeId> {
        let a = self.nodes[from.index()].pos;
        let b = self.nodes[to.index()].pos;
        if !(a.is_finite() && b.is_finite()) || from == to {
            return Err(LaneError::DegenerateBridge { a, b });
        }
        let id = self.chain(kind, from, to, a.distance(b), false, |d| Some(a.move_towards(b, d)))?;
        debug!(bridge = %id, ?kind, nodes = self.bridges[id.index()].len(), "bridge linked");
        Ok(id)
    }

    /// Build every bridge inside `region`: crossings between each pair of
    /// path ends, a castle approach from each path end, and for each
    /// building an exit lane to the nearest path end plus a defend lane to
    /// the castle.  Returns the number of bridges built.
    ///
    /// All path lanes touching `region` must already exist.
    pub fn build_region_bridges(&mut self, map: &MapSpec, region: &RegionSpec) -> LaneResult<usize> {
        if self.castles.contains_key(&region.id) {
            return Err(LaneError::DuplicateRegion(region.id));
        }
        let mark = (self.nodes.len(), self.bridges.len());
        match self.region_bridges(map, region) {
            Ok((castle, doors)) => {
                self.castles.insert(region.id, castle);
                self.building_doors.extend(doors);
                let built = self.bridges.len() - mark.1;
                debug!(region = %region.id, bridges = built, nodes = self.nodes.len() - mark.0, "region bridges built");
                Ok(built)
            }
            Err(e) => {
                warn!(region = %region.id, error = %e, "region bridge construction failed");
                self.unwind(mark);
                Err(e)
            }
        }
    }

    fn region_bridges(
        &mut self,
        map: &MapSpec,
        region: &RegionSpec,
    ) -> LaneResult<(NodeId, Vec<(BuildingId, NodeId)>)> {
        let ends = map
            .paths_touching(region.id)
            .map(|p| Ok((p.id, self.path_end(p, region.id)?)))
            .collect::<LaneResult<Vec<(PathId, NodeId)>>>()?;

        let castle = self.alloc_node(region.castle, None)?;

        for (i, &(from, a)) in ends.iter().enumerate() {
            for &(to, b) in &ends[i + 1..] {
                if a != b {
                    self.link(BridgeKind::Crossing { region: region.id, from, to }, a, b)?;
                }
            }
        }
        for &(path, end) in &ends {
            self.link(BridgeKind::CastleApproach { region: region.id, path }, end, castle)?;
        }

        let mut doors = Vec::new();
        for building in map.buildings_in(region.id) {
            let p = building.position;
            if !p.is_finite() {
                return Err(LaneError::DegenerateBridge { a: p, b: region.castle });
            }
            let door = self.alloc_node(p, None)?;
            let nearest = self
                .path_ends
                .nearest_neighbor_iter(&[p.x, p.y])
                .find(|e| e.region == region.id)
                .map(|e| (e.node, e.path));
            match nearest {
                Some((entry, path)) => {
                    self.link(BridgeKind::BuildingExit { building: building.id, path }, door, entry)?;
                }
                None => debug!(building = %building.id, "no path end in region; exit lane skipped"),
            }
            self.link(BridgeKind::Defend { building: building.id }, door, castle)?;
            doors.push((building.id, door));
        }
        Ok((castle, doors))
    }

    /// Freeze the network: build the junction table and bulk-load the node
    /// R-tree.
    pub fn build(self) -> BridgeNetwork {
        let mut junctions: FxHashMap<NodeId, Vec<BridgeId>> = FxHashMap::default();
        for b in &self.bridges {
            junctions.entry(b.start).or_default().push(b.id);
            if b.end != b.start {
                junctions.entry(b.end).or_default().push(b.id);
            }
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry { point: [n.pos.x, n.pos.y], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        BridgeNetwork {
            nodes:          self.nodes,
            bridges:        self.bridges,
            junctions,
            path_lanes:     self.path_lanes,
            castles:        self.castles,
            building_doors: self.building_doors,
            spatial_idx,
        }
    }
}
