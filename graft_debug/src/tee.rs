// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.

use graft_core::trace::{
    CommitEvent, CycleBeginEvent, CycleSummary, EffectEvent, PhaseBeginEvent, PhaseEndEvent,
    SliceBeginEvent, SliceEndEvent, StaleUpdateEvent, TraceSink, UnitOfWorkEvent,
};

/// Forwards every event to `first`, then to `second`.
///
/// Nest tees to reach more sinks.
#[derive(Debug, Default)]
pub struct TeeSink<A, B> {
    /// Receives each event first.
    pub first: A,
    /// Receives each event second.
    pub second: B,
}

impl<A: TraceSink, B: TraceSink> TeeSink<A, B> {
    /// Creates a tee over two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Returns both sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

macro_rules! tee {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(&mut self, e: &$ty) {
                self.first.$method(e);
                self.second.$method(e);
            }
        )*
    };
}

impl<A: TraceSink, B: TraceSink> TraceSink for TeeSink<A, B> {
    tee!(
        on_slice_begin(SliceBeginEvent),
        on_slice_end(SliceEndEvent),
        on_cycle_begin(CycleBeginEvent),
        on_phase_begin(PhaseBeginEvent),
        on_phase_end(PhaseEndEvent),
        on_commit(CommitEvent),
        on_stale_update(StaleUpdateEvent),
        on_cycle_summary(CycleSummary),
        on_unit_of_work(UnitOfWorkEvent),
        on_effect(EffectEvent),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pretty::PrettyPrintSink;
    use crate::recorder::{RecorderSink, decode};
    use graft_core::time::{HostTime, Timebase};

    #[test]
    fn both_sinks_see_every_event() {
        let mut tee = TeeSink::new(
            RecorderSink::new(),
            PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS),
        );
        tee.on_stale_update(&StaleUpdateEvent {
            instance_index: 2,
            instance_generation: 1,
            timestamp: HostTime(10),
        });
        tee.on_slice_begin(&SliceBeginEvent {
            slice_index: 0,
            timestamp: HostTime(20),
        });

        let (recorder, pretty) = tee.into_inner();
        assert_eq!(decode(recorder.as_bytes()).count(), 2);
        let text = String::from_utf8(pretty.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2, "got: {text}");
        assert!(text.starts_with("[stale] instance=2@gen1"), "got: {text}");
    }
}
