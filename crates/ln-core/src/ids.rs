//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every arena in the workspace (waypoints, sub-graphs, lane nodes, bridges,
//! units) is a `Vec` indexed by one of these ids.  Structures that refer to
//! each other store ids instead of references, which keeps the
//! grid ↔ graph ↔ waypoint ↔ unit cycle free of lifetimes.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a navigable cell in the waypoint arena owned by the global grid.
    pub struct WaypointId(u32);
}

typed_id! {
    /// Index of a navigation sub-graph (region or path scoped).
    pub struct GraphId(u32);
}

typed_id! {
    /// Index of a map region, as numbered by the map loader.
    pub struct RegionId(u32);
}

typed_id! {
    /// Index of a connecting path between two regions.
    pub struct PathId(u32);
}

typed_id! {
    /// Index of a building (unit spawn point).
    pub struct BuildingId(u32);
}

typed_id! {
    /// Index of a lane node in the bridge network's node arena.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a bridge (one walkable lane).
    pub struct BridgeId(u32);
}

typed_id! {
    /// Index of a mobile unit.
    pub struct UnitId(u32);
}

typed_id! {
    /// Owning player.  `u16` keeps per-unit arrays compact.
    pub struct PlayerId(u16);
}
