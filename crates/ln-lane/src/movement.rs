//! Single-step lane movement and lane conflict resolution.
//!
//! # Step
//!
//! A unit follows `next` (forward) or `prev` (backward) from its node.  A
//! missing link is [`LaneError::LaneEnd`]; a unit with no direction fails
//! with [`LaneError::InvalidDirection`].  Moving onto another bridge
//! re-derives the direction from the end it was entered at (see
//! [`BridgeNetwork::entry_direction`]).
//!
//! # Conflicts
//!
//! When the next node holds unit B, in order:
//!
//! 1. B has not settled on its node yet and the node beyond is free:
//!    overtake B onto that node.
//! 2. Same bridge, same direction: step-over chain.
//! 3. Same bridge, opposite directions: swap.
//! 4. Different bridges: swap when B's next hop is the mover's node (B's
//!    direction is re-derived for its new node), otherwise step-over chain.
//!
//! The step-over chain walks the occupied nodes ahead, at most B's
//! engagement range of hops, and lands on the first free node.  Every unit
//! passed, B included, must be `Holding`; otherwise the mover stays put.
//!
//! Each relocation rewrites both nodes' occupants and the unit's node and
//! direction within one call.

use tracing::trace;

use ln_core::{BridgeId, NodeId, UnitId};

use crate::bridge::{BridgeNetwork, Direction};
use crate::unit::{Stance, UnitStore};
use crate::{LaneError, LaneResult};

/// Result of a step that did not fail.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum StepOutcome {
    /// The unit moved to a free node (possibly overtaking or stepping over).
    Moved,
    /// The unit traded places with the unit ahead.
    Swapped,
    /// The next node is taken and no conflict rule applied.
    Blocked,
}

/// Advance `unit` one node along its lane.
///
/// `settle_radius` is how close a blocking unit must be to its own node to
/// count as settled (rule 1).
pub fn advance_unit_step(
    net: &mut BridgeNetwork,
    units: &mut UnitStore,
    unit: UnitId,
    settle_radius: f32,
) -> LaneResult<StepOutcome> {
    let here = units.placed_node(unit)?;
    let dir = units.direction[unit.index()];
    if dir == Direction::Invalid {
        return Err(LaneError::InvalidDirection(unit));
    }
    let Some((next, next_dir)) = net.step(here, dir) else {
        trace!(%unit, node = %here, "lane end");
        return Err(LaneError::LaneEnd { unit, node: here });
    };

    match net.occupant(next) {
        None => {
            relocate(net, units, unit, here, next, next_dir);
            trace!(%unit, from = %here, to = %next, "moved");
            Ok(StepOutcome::Moved)
        }
        Some(blocker) => resolve_conflict(net, units, unit, here, dir, next, next_dir, blocker, settle_radius),
    }
}

/// Redirect `unit`, standing on an end of `bridge`, onto that bridge and
/// take the first step along it.
///
/// Used at junctions, where the unit's own lane has ended.  An occupied
/// first node goes through the same conflict rules as a regular step; this
/// is where two units meeting from different bridges swap.
pub fn enter_bridge(
    net: &mut BridgeNetwork,
    units: &mut UnitStore,
    unit: UnitId,
    bridge: BridgeId,
    settle_radius: f32,
) -> LaneResult<StepOutcome> {
    let here = units.placed_node(unit)?;
    let (to, dir) = net.first_hop(here, bridge)?;
    match net.occupant(to) {
        None => {
            relocate(net, units, unit, here, to, dir);
            trace!(%unit, %bridge, to = %to, "entered bridge");
            Ok(StepOutcome::Moved)
        }
        Some(blocker) => resolve_conflict(net, units, unit, here, dir, to, dir, blocker, settle_radius),
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_conflict(
    net: &mut BridgeNetwork,
    units: &mut UnitStore,
    unit: UnitId,
    here: NodeId,
    dir: Direction,
    next: NodeId,
    next_dir: Direction,
    blocker: UnitId,
    settle_radius: f32,
) -> LaneResult<StepOutcome> {
    // Rule 1: overtake a blocker still moving onto its node.
    if !units.is_settled(blocker, net, settle_radius) {
        if let Some((beyond, beyond_dir)) = net.step(next, next_dir) {
            if net.is_free(beyond) {
                relocate(net, units, unit, here, beyond, beyond_dir);
                trace!(%unit, over = %blocker, to = %beyond, "overtook unsettled unit");
                return Ok(StepOutcome::Moved);
            }
        }
    }

    let blocker_dir = units.direction.get(blocker.index()).copied().unwrap_or_default();
    let here_bridge = net.nodes[here.index()].bridge;
    let same_bridge = here_bridge.is_some() && here_bridge == net.nodes[next.index()].bridge;

    if same_bridge {
        // Rule 3: head-on on one bridge.
        if dir != Direction::Invalid && blocker_dir == dir.reversed() {
            swap(net, units, unit, here, next_dir, blocker, next, blocker_dir);
            trace!(%unit, with = %blocker, "swapped head-on");
            return Ok(StepOutcome::Swapped);
        }
        // Rule 2.
        return Ok(step_over(net, units, unit, here, next, next_dir, blocker));
    }

    // Rule 4: junction.  Swap only when the two are crossing each other.
    match net.step(next, blocker_dir) {
        Some((target, new_dir)) if target == here => {
            swap(net, units, unit, here, next_dir, blocker, next, new_dir);
            trace!(%unit, with = %blocker, "swapped at junction");
            Ok(StepOutcome::Swapped)
        }
        _ => Ok(step_over(net, units, unit, here, next, next_dir, blocker)),
    }
}

/// Walk the chain of occupied nodes starting at `next` (occupied by
/// `blocker`) and move `unit` to the first free node behind it.
fn step_over(
    net: &mut BridgeNetwork,
    units: &mut UnitStore,
    unit: UnitId,
    here: NodeId,
    next: NodeId,
    next_dir: Direction,
    blocker: UnitId,
) -> StepOutcome {
    let range = units.engagement_range.get(blocker.index()).copied().unwrap_or(0);
    let (mut node, mut dir) = (next, next_dir);
    for _ in 0..range {
        let holding = net
            .occupant(node)
            .is_some_and(|u| units.stance.get(u.index()) == Some(&Stance::Holding));
        if !holding {
            trace!(%unit, at = %node, "step-over chain broken by a unit not holding");
            return StepOutcome::Blocked;
        }
        let Some((after, after_dir)) = net.step(node, dir) else {
            break;
        };
        if net.is_free(after) {
            relocate(net, units, unit, here, after, after_dir);
            trace!(%unit, over = %blocker, to = %after, "stepped over");
            return StepOutcome::Moved;
        }
        (node, dir) = (after, after_dir);
    }
    trace!(%unit, over = %blocker, "step-over chain exhausted");
    StepOutcome::Blocked
}

fn relocate(net: &mut BridgeNetwork, units: &mut UnitStore, unit: UnitId, from: NodeId, to: NodeId, dir: Direction) {
    net.set_occupant(from, None);
    net.set_occupant(to, Some(unit));
    units.node[unit.index()] = to;
    units.direction[unit.index()] = dir;
}

/// `a` at `a_from` and `b` at `b_from` trade nodes.
#[allow(clippy::too_many_arguments)]
fn swap(
    net: &mut BridgeNetwork,
    units: &mut UnitStore,
    a: UnitId,
    a_from: NodeId,
    a_dir: Direction,
    b: UnitId,
    b_from: NodeId,
    b_dir: Direction,
) {
    net.set_occupant(a_from, Some(b));
    net.set_occupant(b_from, Some(a));
    units.node[a.index()] = b_from;
    units.direction[a.index()] = a_dir;
    units.node[b.index()] = a_from;
    units.direction[b.index()] = b_dir;
}
