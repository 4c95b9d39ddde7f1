// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use graft_core::node::{EffectKind, NodeRole};
use graft_core::queue::UpdateOrigin;
use graft_core::time::{HostTime, Timebase};
use graft_core::trace::{
    CommitEvent, CycleBeginEvent, CycleSummary, EffectEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, SliceBeginEvent, SliceEndEvent, StaleUpdateEvent, TraceSink, UnitOfWorkEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Render => "render",
        PhaseKind::Commit => "commit",
    }
}

fn origin_name(origin: UpdateOrigin) -> &'static str {
    match origin {
        UpdateOrigin::Root => "root",
        UpdateOrigin::Instance => "instance",
    }
}

fn role_name(role: NodeRole) -> &'static str {
    match role {
        NodeRole::HostLeaf => "host",
        NodeRole::Component => "component",
        NodeRole::Root => "root",
    }
}

fn effect_name(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::Place => "place",
        EffectKind::Update => "update",
        EffectKind::Delete => "delete",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_slice_begin(&mut self, e: &SliceBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[slice:begin] #{} at {:.1}µs",
            e.slice_index,
            self.host_us(e.timestamp),
        );
    }

    fn on_slice_end(&mut self, e: &SliceEndEvent) {
        let state = if e.pending { "pending" } else { "idle" };
        let _ = writeln!(
            self.writer,
            "[slice:end] #{} at {:.1}µs units={} {state}",
            e.slice_index,
            self.host_us(e.timestamp),
            e.units,
        );
    }

    fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[cycle] #{} origin={} container={} at {:.1}µs",
            e.cycle,
            origin_name(e.origin),
            e.container.0,
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] cycle={} {} at {:.1}µs",
            e.cycle,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] cycle={} {} at {:.1}µs",
            e.cycle,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let _ = writeln!(
            self.writer,
            "[commit] cycle={} container={} place={} update={} delete={} at {:.1}µs",
            e.cycle,
            e.container.0,
            e.placements,
            e.updates,
            e.deletions,
            self.host_us(e.timestamp),
        );
    }

    fn on_stale_update(&mut self, e: &StaleUpdateEvent) {
        let _ = writeln!(
            self.writer,
            "[stale] instance={}@gen{} dropped at {:.1}µs",
            e.instance_index,
            e.instance_generation,
            self.host_us(e.timestamp),
        );
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] cycle={} origin={} slices={} units={} \
             render={:.1}µs commit={:.1}µs effects={}",
            s.cycle,
            origin_name(s.origin),
            s.slices,
            s.units,
            self.ticks_to_us(s.render_ticks),
            self.ticks_to_us(s.commit_ticks),
            s.effects,
        );
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        let _ = writeln!(
            self.writer,
            "[unit] cycle={} node={} {}",
            e.cycle,
            e.node_index,
            role_name(e.role),
        );
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        let _ = writeln!(
            self.writer,
            "[effect] cycle={} {} node={} {}",
            e.cycle,
            effect_name(e.kind),
            e.node_index,
            role_name(e.role),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::container::ContainerId;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_slice() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MICROS);
        sink.on_slice_end(&SliceEndEvent {
            slice_index: 4,
            timestamp: HostTime(250),
            units: 7,
            pending: true,
        });
        let output = output(sink);
        assert!(output.starts_with("[slice:end] #4"), "got: {output}");
        assert!(output.contains("at 250.0µs"), "got: {output}");
        assert!(output.contains("units=7 pending"), "got: {output}");
    }

    #[test]
    fn pretty_print_commit() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_commit(&CommitEvent {
            cycle: 2,
            container: ContainerId(1),
            timestamp: HostTime(1_500),
            placements: 3,
            updates: 1,
            deletions: 0,
        });
        let output = output(sink);
        assert!(
            output.contains("cycle=2 container=1 place=3 update=1 delete=0 at 1.5µs"),
            "got: {output}"
        );
    }
}
