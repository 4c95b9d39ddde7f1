// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the work loop.
//!
//! The engine reports what it does through a [`TraceSink`]: slices starting
//! and stopping, render cycles beginning, the render and commit phases, and
//! commits with their effect counts. All sink methods default to no-ops.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. Without the `trace`
//! feature every `Tracer` method is empty and the instrumentation costs
//! nothing; with it, each call is one `Option` branch.
//!
//! [`CycleSummaryBuilder`] folds the events of one render cycle, which may
//! span many slices, into a [`CycleSummary`].
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`) adds per-unit and per-effect events.

use crate::container::ContainerId;
use crate::queue::UpdateOrigin;
use crate::time::HostTime;

#[cfg(feature = "trace-rich")]
use crate::node::{EffectKind, NodeRole};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a render cycle is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Building the work-in-progress tree. Interruptible.
    Render,
    /// Applying effects to the host. Never interrupted.
    Commit,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the host grants the engine a slice.
#[derive(Clone, Copy, Debug)]
pub struct SliceBeginEvent {
    /// Monotonic slice counter.
    pub slice_index: u64,
    /// Host time at the start of the slice.
    pub timestamp: HostTime,
}

/// Emitted when the engine yields back to the host.
#[derive(Clone, Copy, Debug)]
pub struct SliceEndEvent {
    /// Slice counter.
    pub slice_index: u64,
    /// Host time at the end of the slice.
    pub timestamp: HostTime,
    /// Units of work performed during the slice.
    pub units: u32,
    /// Whether work remains for a later slice.
    pub pending: bool,
}

/// Emitted when a request is taken off the queue and a cycle starts.
#[derive(Clone, Copy, Debug)]
pub struct CycleBeginEvent {
    /// Monotonic cycle counter.
    pub cycle: u64,
    /// Source of the request.
    pub origin: UpdateOrigin,
    /// Container being rendered.
    pub container: ContainerId,
    /// Host time when the cycle started.
    pub timestamp: HostTime,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after a commit has been applied to the host.
#[derive(Clone, Copy, Debug)]
pub struct CommitEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Container that was committed.
    pub container: ContainerId,
    /// Host time when the commit finished.
    pub timestamp: HostTime,
    /// Number of placements.
    pub placements: u32,
    /// Number of updates.
    pub updates: u32,
    /// Number of deletions.
    pub deletions: u32,
}

/// Emitted when an instance update is dropped because the instance is gone.
#[derive(Clone, Copy, Debug)]
pub struct StaleUpdateEvent {
    /// Slot index of the released instance.
    pub instance_index: u32,
    /// Generation the request was issued against.
    pub instance_generation: u32,
    /// Host time when the request was dropped.
    pub timestamp: HostTime,
}

/// Per-cycle summary produced by [`CycleSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct CycleSummary {
    /// Cycle counter.
    pub cycle: u64,
    /// Source of the request.
    pub origin: UpdateOrigin,
    /// Container that was rendered.
    pub container: ContainerId,
    /// Slices the cycle was spread over.
    pub slices: u32,
    /// Units of work performed.
    pub units: u32,
    /// Render phase duration in ticks, from cycle start to tree completion.
    pub render_ticks: u64,
    /// Commit phase duration in ticks.
    pub commit_ticks: u64,
    /// Effects applied by the commit.
    pub effects: u32,
}

/// One unit of work (requires `trace-rich`).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct UnitOfWorkEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Slot index of the node begun.
    pub node_index: u32,
    /// The node's role.
    pub role: NodeRole,
}

/// One applied effect (requires `trace-rich`).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct EffectEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Effect kind.
    pub kind: EffectKind,
    /// Slot index of the affected node.
    pub node_index: u32,
    /// The node's role.
    pub role: NodeRole,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the work loop.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a slice starts.
    fn on_slice_begin(&mut self, e: &SliceBeginEvent) {
        _ = e;
    }

    /// Called when a slice ends.
    fn on_slice_end(&mut self, e: &SliceEndEvent) {
        _ = e;
    }

    /// Called when a render cycle starts.
    fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after a commit.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }

    /// Called when a stale instance update is dropped.
    fn on_stale_update(&mut self, e: &StaleUpdateEvent) {
        _ = e;
    }

    /// Called with the summary of a finished cycle.
    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        _ = s;
    }

    /// Called for every unit of work (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        _ = e;
    }

    /// Called for every applied effect (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_effect(&mut self, e: &EffectEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

// Generates a forwarding method whose body disappears without `trace`.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Whether events reach a sink. Always `false` without `trace`.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    forward!(
        /// Emits a [`SliceBeginEvent`].
        slice_begin => on_slice_begin(SliceBeginEvent)
    );
    forward!(
        /// Emits a [`SliceEndEvent`].
        slice_end => on_slice_end(SliceEndEvent)
    );
    forward!(
        /// Emits a [`CycleBeginEvent`].
        cycle_begin => on_cycle_begin(CycleBeginEvent)
    );
    forward!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin => on_phase_begin(PhaseBeginEvent)
    );
    forward!(
        /// Emits a [`PhaseEndEvent`].
        phase_end => on_phase_end(PhaseEndEvent)
    );
    forward!(
        /// Emits a [`CommitEvent`].
        commit => on_commit(CommitEvent)
    );
    forward!(
        /// Emits a [`StaleUpdateEvent`].
        stale_update => on_stale_update(StaleUpdateEvent)
    );
    forward!(
        /// Emits a [`CycleSummary`].
        cycle_summary => on_cycle_summary(CycleSummary)
    );

    /// Emits a [`UnitOfWorkEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        if let Some(s) = &mut self.sink {
            s.on_unit_of_work(e);
        }
    }

    /// Emits an [`EffectEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn effect(&mut self, e: &EffectEvent) {
        if let Some(s) = &mut self.sink {
            s.on_effect(e);
        }
    }
}

// ---------------------------------------------------------------------------
// CycleSummaryBuilder
// ---------------------------------------------------------------------------

/// Accumulates the measurements of one render cycle across slices.
#[derive(Clone, Copy, Debug)]
pub struct CycleSummaryBuilder {
    begin: CycleBeginEvent,
    slices: u32,
    units: u32,
    render_end: Option<HostTime>,
    commit_begin: Option<HostTime>,
    commit_end: Option<HostTime>,
    effects: u32,
}

impl CycleSummaryBuilder {
    /// Starts a summary for the cycle announced by `begin`.
    #[must_use]
    pub fn new(begin: &CycleBeginEvent) -> Self {
        Self {
            begin: *begin,
            slices: 1,
            units: 0,
            render_end: None,
            commit_begin: None,
            commit_end: None,
            effects: 0,
        }
    }

    /// Counts another slice the cycle continued into.
    pub fn add_slice(&mut self) {
        self.slices += 1;
    }

    /// Counts units of work.
    pub fn add_units(&mut self, units: u32) {
        self.units += units;
    }

    /// Records when the tree was completed.
    pub fn render_end(&mut self, t: HostTime) {
        self.render_end = Some(t);
    }

    /// Records the commit window and how many effects it applied.
    pub fn commit(&mut self, begin: HostTime, end: HostTime, effects: u32) {
        self.commit_begin = Some(begin);
        self.commit_end = Some(end);
        self.effects = effects;
    }

    /// Produces the summary.
    #[must_use]
    pub fn finish(self) -> CycleSummary {
        let span = |a: Option<HostTime>, b: Option<HostTime>| match (a, b) {
            (Some(a), Some(b)) => b.saturating_duration_since(a).ticks(),
            _ => 0,
        };
        CycleSummary {
            cycle: self.begin.cycle,
            origin: self.begin.origin,
            container: self.begin.container,
            slices: self.slices,
            units: self.units,
            render_ticks: span(Some(self.begin.timestamp), self.render_end),
            commit_ticks: span(self.commit_begin, self.commit_end),
            effects: self.effects,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
