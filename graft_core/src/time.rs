// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host clock ticks and their conversion to nanoseconds.
//!
//! Slice deadlines and trace timestamps are expressed as [`HostTime`] ticks
//! read from whatever monotonic clock the host provides. The web backend
//! reports microseconds (`performance.now() * 1000`); the `std` deadline
//! reports nanoseconds. A [`Timebase`] records the ratio so debug tooling
//! can put everything on a common scale.

use core::fmt;
use core::ops::{Add, Sub};

/// A monotonic instant, in host clock ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Raw tick count.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// This instant in nanoseconds under `timebase`.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Time elapsed since `earlier`, clamped at zero.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Adds `duration`, saturating at the end of the clock.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Ticks-to-nanoseconds ratio: `nanos = ticks * numer / denom`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ratio.
    pub numer: u32,
    /// Denominator of the ratio.
    pub denom: u32,
}

impl Timebase {
    /// Ticks are nanoseconds.
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Ticks are microseconds.
    pub const MICROS: Self = Self {
        numer: 1000,
        denom: 1,
    };

    /// Creates a timebase.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts ticks to nanoseconds through a `u128` intermediate.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "tick spans used by the engine fit in u64 nanoseconds"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        (ticks as u128 * self.numer as u128 / self.denom as u128) as u64
    }

    /// Converts nanoseconds to ticks through a `u128` intermediate.
    ///
    /// # Panics
    ///
    /// Panics if `numer` is zero.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "tick spans used by the engine fit in u64"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        (nanos as u128 * self.denom as u128 / self.numer as u128) as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A span of host clock ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// No time at all.
    pub const ZERO: Self = Self(0);

    /// Longer than any slice will ever run.
    pub const MAX: Self = Self(u64::MAX);

    /// Raw tick count.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Builds a duration from nanoseconds under `timebase`.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(nanos))
    }

    /// This duration in nanoseconds under `timebase`.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Subtraction clamped at zero.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micros_timebase_scales_to_nanos() {
        let t = HostTime(1_500);
        assert_eq!(t.to_nanos(Timebase::MICROS), 1_500_000);
        assert_eq!(Duration::from_nanos(2_000_000, Timebase::MICROS), Duration(2_000));
    }

    #[test]
    fn duration_since_clamps() {
        let early = HostTime(100);
        let late = HostTime(160);
        assert_eq!(late.saturating_duration_since(early), Duration(60));
        assert_eq!(early.saturating_duration_since(late), Duration::ZERO);
        assert_eq!(late - early, Duration(60));
    }

    #[test]
    fn saturating_add_stops_at_end_of_clock() {
        assert_eq!(HostTime(u64::MAX - 1).saturating_add(Duration(10)), HostTime(u64::MAX));
        assert_eq!(HostTime(5) + Duration(5), HostTime(10));
    }

    #[test]
    fn wide_intermediate_does_not_overflow() {
        let tb = Timebase::new(125, 3);
        let _ = HostTime(u64::MAX / 4).to_nanos(tb);
    }

    #[test]
    #[should_panic(expected = "denominator must not be zero")]
    fn zero_denominator_panics() {
        let _ = Timebase::new(1, 0);
    }
}
