// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ways to run an engine slice by slice.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use graft_core::commit::CommitReport;
use graft_core::component::{ComponentType, InstanceId};
use graft_core::host::Renderer;
use graft_core::scheduler::{Deadline, UnitBudget};
use graft_core::time::{Duration, HostTime};
use graft_core::work_loop::Engine;

/// Slices after which [`drive_in_slices`] gives up.
pub const MAX_SLICES: u32 = 100_000;

/// Runs `engine` until idle, granting each slice the next unit budget from
/// `budgets` (cycling). Returns the number of slices used.
///
/// # Panics
///
/// Panics if `budgets` is empty or the engine is still busy after
/// [`MAX_SLICES`] slices.
pub fn drive_in_slices<R: Renderer>(engine: &mut Engine<R>, budgets: &[u32]) -> u32 {
    assert!(!budgets.is_empty(), "need at least one slice budget");
    let mut slices = 0;
    while !engine.is_idle() {
        assert!(slices < MAX_SLICES, "engine still busy after {slices} slices");
        let units = budgets[slices as usize % budgets.len()];
        engine.perform_work(&mut UnitBudget::new(units));
        slices += 1;
    }
    slices
}

/// Instances of `ty` mounted by any of `reports`, in commit order.
#[must_use]
pub fn mounted_instances<H>(reports: &[CommitReport<H>], ty: ComponentType) -> Vec<InstanceId> {
    reports.iter().flat_map(|r| r.instances_of(ty)).collect()
}

/// A shared tick counter that only moves when told to.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    /// A clock at tick zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reading.
    #[must_use]
    pub fn now(&self) -> HostTime {
        HostTime(self.0.get())
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get().saturating_add(by.ticks()));
    }

    /// A closure reading this clock, for [`graft_core::scheduler::ClockDeadline`].
    #[must_use]
    pub fn reader(&self) -> impl Fn() -> HostTime + use<> {
        let cell = self.0.clone();
        move || HostTime(cell.get())
    }
}

/// A slice on a [`ManualClock`] where every unit of work costs a fixed
/// number of ticks.
///
/// Each budget check charges the cost up front, as if the unit it admits
/// had already run.
#[derive(Debug)]
pub struct SimulatedSlice {
    clock: ManualClock,
    end: HostTime,
    cost_per_unit: Duration,
}

impl SimulatedSlice {
    /// A slice of `length` ticks starting now.
    #[must_use]
    pub fn new(clock: &ManualClock, length: Duration, cost_per_unit: Duration) -> Self {
        Self {
            clock: clock.clone(),
            end: clock.now() + length,
            cost_per_unit,
        }
    }
}

impl Deadline for SimulatedSlice {
    fn time_remaining(&mut self) -> Duration {
        let remaining = self.end.saturating_duration_since(self.clock.now());
        self.clock.advance(self.cost_per_unit);
        remaining
    }

    fn now(&self) -> HostTime {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_slice_runs_out() {
        let clock = ManualClock::new();
        let mut slice = SimulatedSlice::new(&clock, Duration(10), Duration(4));
        assert_eq!(slice.time_remaining(), Duration(10));
        assert_eq!(slice.time_remaining(), Duration(6));
        assert_eq!(slice.time_remaining(), Duration(2));
        assert_eq!(slice.time_remaining(), Duration::ZERO);
        assert_eq!(slice.now(), HostTime(16));
    }

    #[test]
    fn reader_tracks_the_clock() {
        let clock = ManualClock::new();
        let read = clock.reader();
        clock.advance(Duration(7));
        assert_eq!(read(), HostTime(7));
    }
}
