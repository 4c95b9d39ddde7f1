// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for Graft.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomRenderer`]: a [`Renderer`] over real DOM nodes
//! - [`IdleLoop`]: drives an [`Engine`] from `requestIdleCallback`
//! - [`IdleSlice`]: a [`Deadline`] backed by an `IdleDeadline`
//!
//! [`Engine`]: graft_core::work_loop::Engine
//! [`Deadline`]: graft_core::scheduler::Deadline

#![no_std]

extern crate alloc;

mod dom;
mod idle;

pub use dom::DomRenderer;
pub use graft_core::host::Renderer;
pub use idle::{IdleLoop, IdleSlice};

use graft_core::time::{HostTime, Timebase};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    HostTime(ms_to_ticks(idle::performance_now()))
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

/// Converts browser milliseconds to microsecond ticks, clamping negatives
/// to zero.
#[must_use]
pub fn ms_to_ticks(ms: f64) -> u64 {
    if ms <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "positive browser timestamps in µs fit in u64"
    )]
    let us = (ms * 1000.0) as u64;
    us
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }

    #[test]
    fn milliseconds_become_microsecond_ticks() {
        assert_eq!(ms_to_ticks(16.5), 16_500);
        assert_eq!(ms_to_ticks(0.0), 0);
        assert_eq!(ms_to_ticks(-3.0), 0);
    }
}
