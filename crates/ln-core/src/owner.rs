//! Allegiance queries consumed by proximity search.
//!
//! The navigation core never owns unit identity; it asks the unit store who
//! owns an occupant and filters on that.

use rustc_hash::FxHashMap;

use crate::{PlayerId, UnitId};

/// Answers "who owns this unit".  `None` for units the lookup does not know
/// (despawned, or never registered); such occupants never match a filter.
pub trait OwnerLookup {
    fn owner_of(&self, unit: UnitId) -> Option<PlayerId>;
}

impl OwnerLookup for FxHashMap<UnitId, PlayerId> {
    #[inline]
    fn owner_of(&self, unit: UnitId) -> Option<PlayerId> {
        self.get(&unit).copied()
    }
}

impl<T: OwnerLookup + ?Sized> OwnerLookup for &T {
    #[inline]
    fn owner_of(&self, unit: UnitId) -> Option<PlayerId> {
        (**self).owner_of(unit)
    }
}

/// Which side of `player` an occupant must be on to match.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Friendly,
    Hostile,
}

impl Side {
    /// `true` if a unit owned by `owner` is on this side relative to `player`.
    #[inline]
    pub fn matches(self, player: PlayerId, owner: PlayerId) -> bool {
        match self {
            Side::Friendly => owner == player,
            Side::Hostile  => owner != player,
        }
    }
}
