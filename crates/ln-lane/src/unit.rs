//! Unit storage: `UnitStore` (SoA lane state for every unit).

use ln_core::{NodeId, OwnerLookup, PlayerId, UnitId, Vec2};

use crate::bridge::{BridgeNetwork, Direction};
use crate::{LaneError, LaneResult};

/// What a unit is doing with its lane slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stance {
    /// Walking its lane; the world steps it every tick.
    #[default]
    Moving,
    /// Standing its ground.  Units behind it may step over.
    Holding,
    /// Engaged in combat; blocks step-over chains.
    Fighting,
}

/// Per-unit parameters fixed at spawn time.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct UnitParams {
    /// How many occupied nodes a unit behind this one may step over.
    pub engagement_range: u32,
    /// Distance the continuous position moves toward the unit's node per
    /// settle call.
    pub speed: f32,
}

impl Default for UnitParams {
    fn default() -> Self {
        Self { engagement_range: 3, speed: 2.0 }
    }
}

/// Structure-of-Arrays storage for all units.
///
/// Every `Vec` has one element per unit ever spawned; the `UnitId` is the
/// index.  Despawned units keep their slot with `alive = false` and
/// `node = NodeId::INVALID`, so ids stay stable for the lifetime of a
/// store.
#[derive(Clone, Debug, Default)]
pub struct UnitStore {
    /// Lane node the unit occupies.  `NodeId::INVALID` when not placed.
    pub node: Vec<NodeId>,
    pub direction: Vec<Direction>,
    pub owner: Vec<PlayerId>,
    pub stance: Vec<Stance>,
    /// Continuous position, trailing `node`'s position until settled.
    pub pos: Vec<Vec2>,
    pub engagement_range: Vec<u32>,
    pub speed: Vec<f32>,
    pub alive: Vec<bool>,
}

impl UnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots ever allocated, live or not.
    pub fn len(&self) -> usize {
        self.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    #[inline]
    pub fn is_alive(&self, unit: UnitId) -> bool {
        self.alive.get(unit.index()).copied().unwrap_or(false)
    }

    /// Live unit ids in ascending order.
    pub fn live_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(i, _)| UnitId(i as u32))
    }

    pub(crate) fn check(&self, unit: UnitId) -> LaneResult<usize> {
        if self.is_alive(unit) { Ok(unit.index()) } else { Err(LaneError::UnknownUnit(unit)) }
    }

    /// Node `unit` stands on.
    pub fn placed_node(&self, unit: UnitId) -> LaneResult<NodeId> {
        let i = self.check(unit)?;
        let node = self.node[i];
        if node.is_valid() { Ok(node) } else { Err(LaneError::NotPlaced(unit)) }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Place a new unit on `node`.
    ///
    /// The unit starts `Moving`, settled on the node, facing `Forward` on a
    /// bridge node (`Backward` on a bridge's end node) and `Invalid` on an
    /// anchor.  Fails with [`LaneError::NodeOccupied`] if the node is taken.
    pub fn spawn(
        &mut self,
        net: &mut BridgeNetwork,
        owner: PlayerId,
        node: NodeId,
        params: UnitParams,
    ) -> LaneResult<UnitId> {
        let lane_node = net.node(node)?;
        if lane_node.occupant.is_some() {
            return Err(LaneError::NodeOccupied(node));
        }
        let pos = lane_node.pos;
        let direction = match lane_node.bridge.and_then(|b| net.bridges.get(b.index())) {
            Some(b) if b.end == node => Direction::Backward,
            Some(_) => Direction::Forward,
            None => Direction::Invalid,
        };
        let id = UnitId::try_from(self.node.len()).map_err(|_| LaneError::NodeCapacity)?;
        if !id.is_valid() {
            return Err(LaneError::NodeCapacity);
        }

        self.node.push(node);
        self.direction.push(direction);
        self.owner.push(owner);
        self.stance.push(Stance::Moving);
        self.pos.push(pos);
        self.engagement_range.push(params.engagement_range);
        self.speed.push(params.speed);
        self.alive.push(true);
        net.set_occupant(node, Some(id));
        Ok(id)
    }

    /// Remove `unit` from its node and retire its id.
    pub fn despawn(&mut self, net: &mut BridgeNetwork, unit: UnitId) -> LaneResult<()> {
        let i = self.check(unit)?;
        let node = self.node[i];
        if node.is_valid() && net.occupant(node) == Some(unit) {
            net.set_occupant(node, None);
        }
        self.node[i] = NodeId::INVALID;
        self.direction[i] = Direction::Invalid;
        self.alive[i] = false;
        Ok(())
    }

    pub fn set_stance(&mut self, unit: UnitId, stance: Stance) -> LaneResult<()> {
        let i = self.check(unit)?;
        self.stance[i] = stance;
        Ok(())
    }

    pub fn set_direction(&mut self, unit: UnitId, direction: Direction) -> LaneResult<()> {
        let i = self.check(unit)?;
        self.direction[i] = direction;
        Ok(())
    }

    // ── Continuous position ───────────────────────────────────────────────

    /// `true` once `unit`'s position is within `radius` of its node.
    pub fn is_settled(&self, unit: UnitId, net: &BridgeNetwork, radius: f32) -> bool {
        let i = unit.index();
        match (self.node.get(i), self.pos.get(i)) {
            (Some(&node), Some(&pos)) => net
                .nodes
                .get(node.index())
                .is_some_and(|n| n.pos.distance_sq(pos) <= radius * radius),
            _ => false,
        }
    }

    /// Move every live unit's position toward its node by its speed.
    pub fn settle(&mut self, net: &BridgeNetwork) {
        for i in 0..self.node.len() {
            if !self.alive[i] {
                continue;
            }
            if let Some(n) = net.nodes.get(self.node[i].index()) {
                self.pos[i] = self.pos[i].move_towards(n.pos, self.speed[i]);
            }
        }
    }
}

impl OwnerLookup for UnitStore {
    #[inline]
    fn owner_of(&self, unit: UnitId) -> Option<PlayerId> {
        self.is_alive(unit).then(|| self.owner[unit.index()])
    }
}
