// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative time slicing.
//!
//! The host decides when the engine may run (an idle callback, a frame
//! callback, a test loop) and hands it a [`Deadline`] for the slice. The
//! engine keeps starting units of work while the deadline reports more than
//! [`WorkLoopConfig::min_remaining`] and yields as soon as it does not.
//! Between units it never holds borrowed state, so a slice can end after any
//! unit.
//!
//! Several deadline sources are provided:
//!
//! - [`Unbounded`] never runs out; it drains all work in one slice.
//! - [`UnitBudget`] allows an exact number of units, for deterministic tests.
//! - [`ClockDeadline`] reads any monotonic clock closure.
//! - `InstantDeadline` (with the `std` feature) reads [`std::time::Instant`].

use crate::time::{Duration, HostTime};

/// The remaining budget of the current slice.
pub trait Deadline {
    /// Time left in the slice. Called once before each unit of work.
    fn time_remaining(&mut self) -> Duration;

    /// Current host time, for trace timestamps.
    fn now(&self) -> HostTime;
}

/// Tuning knobs for the work loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkLoopConfig {
    /// A unit of work is started only while the deadline reports strictly
    /// more than this.
    pub min_remaining: Duration,
    /// After a commit, start the next queued request in the same slice
    /// instead of yielding first.
    pub chain_requests: bool,
}

impl WorkLoopConfig {
    /// Browser idle callbacks: microsecond ticks, a 1 ms floor, and one
    /// request per slice.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            min_remaining: Duration(1_000),
            chain_requests: false,
        }
    }

    /// Native hosts on nanosecond clocks: a 1 ms floor, requests chained.
    #[must_use]
    pub const fn native() -> Self {
        Self {
            min_remaining: Duration(1_000_000),
            chain_requests: true,
        }
    }

    /// No floor and requests chained; every granted unit is used.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            min_remaining: Duration::ZERO,
            chain_requests: true,
        }
    }
}

impl Default for WorkLoopConfig {
    fn default() -> Self {
        Self::immediate()
    }
}

/// Outcome of one slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkStatus {
    /// A cycle is suspended or requests are queued; request another slice.
    Pending,
    /// Nothing left to do until a new request arrives.
    Idle,
}

impl WorkStatus {
    /// Returns `true` for [`Pending`](Self::Pending).
    #[must_use]
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

/// A deadline that never expires.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&mut self) -> Duration {
        Duration::MAX
    }

    fn now(&self) -> HostTime {
        HostTime(0)
    }
}

/// A deadline that grants a fixed number of units of work.
///
/// Each grant advances a logical clock by one tick, so trace timestamps
/// count units.
#[derive(Clone, Copy, Debug)]
pub struct UnitBudget {
    remaining: u32,
    clock: u64,
}

impl UnitBudget {
    /// Allows exactly `units` units of work.
    #[must_use]
    pub const fn new(units: u32) -> Self {
        Self {
            remaining: units,
            clock: 0,
        }
    }

    /// Starts the logical clock at `start` instead of zero.
    #[must_use]
    pub const fn starting_at(units: u32, start: HostTime) -> Self {
        Self {
            remaining: units,
            clock: start.0,
        }
    }

    /// Units not yet granted.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&mut self) -> Duration {
        if self.remaining == 0 {
            return Duration::ZERO;
        }
        self.remaining -= 1;
        self.clock += 1;
        Duration::MAX
    }

    fn now(&self) -> HostTime {
        HostTime(self.clock)
    }
}

/// A deadline at a fixed point on a caller-supplied clock.
pub struct ClockDeadline<F> {
    clock: F,
    end: HostTime,
}

impl<F: Fn() -> HostTime> ClockDeadline<F> {
    /// A deadline `budget` ticks after the clock's current reading.
    pub fn new(clock: F, budget: Duration) -> Self {
        let end = clock().saturating_add(budget);
        Self { clock, end }
    }

    /// A deadline at an absolute time.
    pub fn until(clock: F, end: HostTime) -> Self {
        Self { clock, end }
    }

    /// When the slice ends.
    pub fn end(&self) -> HostTime {
        self.end
    }
}

impl<F: Fn() -> HostTime> Deadline for ClockDeadline<F> {
    fn time_remaining(&mut self) -> Duration {
        self.end.saturating_duration_since((self.clock)())
    }

    fn now(&self) -> HostTime {
        (self.clock)()
    }
}

impl<F> core::fmt::Debug for ClockDeadline<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClockDeadline")
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "std")]
pub use instant::InstantDeadline;

#[cfg(feature = "std")]
mod instant {
    use std::sync::OnceLock;
    use std::time::Instant;

    use super::Deadline;
    use crate::time::{Duration, HostTime};

    static ORIGIN: OnceLock<Instant> = OnceLock::new();

    fn origin() -> Instant {
        *ORIGIN.get_or_init(Instant::now)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "u64 nanoseconds cover centuries of uptime"
    )]
    fn to_ticks(d: std::time::Duration) -> u64 {
        d.as_nanos() as u64
    }

    /// A slice measured with [`Instant`], in nanosecond ticks.
    ///
    /// Timestamps share a process-wide origin, so they are comparable across
    /// slices; use [`Timebase::NANOS`](crate::time::Timebase::NANOS).
    #[derive(Clone, Copy, Debug)]
    pub struct InstantDeadline {
        end: Instant,
    }

    impl InstantDeadline {
        /// A slice lasting `budget` from now.
        #[must_use]
        pub fn new(budget: std::time::Duration) -> Self {
            let _ = origin();
            Self {
                end: Instant::now() + budget,
            }
        }
    }

    impl Deadline for InstantDeadline {
        fn time_remaining(&mut self) -> Duration {
            Duration(to_ticks(
                self.end.saturating_duration_since(Instant::now()),
            ))
        }

        fn now(&self) -> HostTime {
            HostTime(to_ticks(Instant::now().saturating_duration_since(origin())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn unit_budget_grants_exactly_n() {
        let mut budget = UnitBudget::new(3);
        let min = WorkLoopConfig::web().min_remaining;
        let mut granted = 0;
        while budget.time_remaining() > min {
            granted += 1;
        }
        assert_eq!(granted, 3);
        assert_eq!(budget.now(), HostTime(3));
        assert_eq!(budget.time_remaining(), Duration::ZERO, "stays exhausted");
    }

    #[test]
    fn clock_deadline_tracks_clock() {
        let now = Cell::new(100_u64);
        let mut deadline = ClockDeadline::new(|| HostTime(now.get()), Duration(50));
        assert_eq!(deadline.end(), HostTime(150));
        assert_eq!(deadline.time_remaining(), Duration(50));
        now.set(140);
        assert_eq!(deadline.time_remaining(), Duration(10));
        assert_eq!(deadline.now(), HostTime(140));
        now.set(200);
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn presets() {
        assert_eq!(WorkLoopConfig::default(), WorkLoopConfig::immediate());
        assert!(!WorkLoopConfig::web().chain_requests);
        assert_eq!(WorkLoopConfig::native().min_remaining, Duration(1_000_000));
        assert!(Unbounded.time_remaining() > WorkLoopConfig::native().min_remaining);
    }

    #[cfg(feature = "std")]
    #[test]
    fn instant_deadline_expires() {
        let mut deadline = InstantDeadline::new(std::time::Duration::ZERO);
        assert_eq!(deadline.time_remaining(), Duration::ZERO);
        let a = deadline.now();
        let b = deadline.now();
        assert!(b >= a, "clock is monotonic");
    }
}
