// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Slices are drawn on thread 0 and render cycles on thread 1, so a render
//! phase that spans several slices shows up as one bar above the slices it
//! ran in. Events without a timestamp of their own (summaries, units,
//! effects) are placed at the most recent timestamp seen.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use graft_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

const SLICE_TID: u32 = 0;
const CYCLE_TID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// The process id is the container id where one is known.
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_us = 0.0;

    for recorded in decode(bytes) {
        if let Some(t) = recorded.timestamp() {
            last_us = ticks_to_us(t.ticks(), timebase);
        }
        match recorded {
            RecordedEvent::SliceBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Slice",
                    "cat": "Scheduler",
                    "ts": last_us,
                    "pid": 0,
                    "tid": SLICE_TID,
                    "args": { "slice_index": e.slice_index }
                }));
            }
            RecordedEvent::SliceEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Slice",
                    "cat": "Scheduler",
                    "ts": last_us,
                    "pid": 0,
                    "tid": SLICE_TID,
                    "args": {
                        "slice_index": e.slice_index,
                        "units": e.units,
                        "pending": e.pending,
                    }
                }));
            }
            RecordedEvent::CycleBegin(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CycleBegin",
                    "cat": "Cycle",
                    "ts": last_us,
                    "pid": 0,
                    "tid": CYCLE_TID,
                    "s": "t",
                    "args": {
                        "cycle": e.cycle,
                        "origin": format!("{:?}", e.origin),
                        "container": e.container.0,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Cycle",
                    "ts": last_us,
                    "pid": 0,
                    "tid": CYCLE_TID,
                    "args": { "cycle": e.cycle }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Cycle",
                    "ts": last_us,
                    "pid": 0,
                    "tid": CYCLE_TID,
                    "args": { "cycle": e.cycle }
                }));
            }
            RecordedEvent::Commit(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Commit",
                    "cat": "Cycle",
                    "ts": last_us,
                    "pid": 0,
                    "tid": CYCLE_TID,
                    "s": "t",
                    "args": {
                        "cycle": e.cycle,
                        "container": e.container.0,
                        "placements": e.placements,
                        "updates": e.updates,
                        "deletions": e.deletions,
                    }
                }));
            }
            RecordedEvent::StaleUpdate(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "StaleUpdate",
                    "cat": "Scheduler",
                    "ts": last_us,
                    "pid": 0,
                    "tid": SLICE_TID,
                    "s": "t",
                    "args": {
                        "instance": e.instance_index,
                        "generation": e.instance_generation,
                    }
                }));
            }
            RecordedEvent::CycleSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CycleSummary",
                    "cat": "Summary",
                    "ts": last_us,
                    "pid": 0,
                    "tid": CYCLE_TID,
                    "s": "g",
                    "args": {
                        "cycle": s.cycle,
                        "origin": format!("{:?}", s.origin),
                        "container": s.container.0,
                        "slices": s.slices,
                        "units": s.units,
                        "render_us": ticks_to_us(s.render_ticks, timebase),
                        "commit_us": ticks_to_us(s.commit_ticks, timebase),
                        "effects": s.effects,
                    }
                }));
            }
            RecordedEvent::UnitOfWork(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "UnitOfWork",
                    "cat": "Rich",
                    "ts": last_us,
                    "pid": 0,
                    "tid": CYCLE_TID,
                    "s": "t",
                    "args": {
                        "cycle": e.cycle,
                        "node": e.node_index,
                        "role": format!("{:?}", e.role),
                    }
                }));
            }
            RecordedEvent::Effect(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Rich",
                    "ts": last_us,
                    "pid": 0,
                    "tid": CYCLE_TID,
                    "s": "t",
                    "args": {
                        "cycle": e.cycle,
                        "node": e.node_index,
                        "role": format!("{:?}", e.role),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
