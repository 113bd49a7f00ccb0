//! World observer trait for progress reporting and data collection.

use ln_core::UnitId;
use ln_lane::{LaneResult, StepOutcome};

/// Per-tick movement counts returned by [`World::tick`][crate::World::tick].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub moved: usize,
    pub swapped: usize,
    pub blocked: usize,
    /// Units whose step failed recoverably (lane end with nowhere to go,
    /// no direction).
    pub stalled: usize,
    /// Units that held their node because a hostile was in range.
    pub engaged: usize,
}

/// Callbacks invoked by [`World::tick`][crate::World::tick].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait WorldObserver {
    /// Called at the very start of each tick, before any unit moves.
    fn on_tick_start(&mut self, _tick: u64) {}

    /// Called after every attempted step, including failed ones.
    fn on_step(&mut self, _tick: u64, _unit: UnitId, _result: &LaneResult<StepOutcome>) {}

    /// Called when `unit` stops to face `hostile`.
    fn on_engage(&mut self, _tick: u64, _unit: UnitId, _hostile: UnitId) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: u64, _summary: &TickSummary) {}
}

/// A [`WorldObserver`] that does nothing.
pub struct NoopObserver;

impl WorldObserver for NoopObserver {}
