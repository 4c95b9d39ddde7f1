// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated idle-slice rendering that exercises the tracing pipeline.
//!
//! Mounts a small app into an in-memory host, clicks its counter, trims its
//! list, and fires an update at an unmounted instance. Every slice is traced
//! to both a [`PrettyPrintSink`](graft_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](graft_debug::recorder::RecorderSink) through a
//! [`TeeSink`](graft_debug::tee::TeeSink); the recording is then exported
//! as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use graft_core::component::ComponentType;
use graft_core::element::Element;
use graft_core::props::{State, Value};
use graft_core::scheduler::WorkLoopConfig;
use graft_core::time::{Duration, Timebase};
use graft_core::trace::{TraceSink, Tracer};
use graft_core::work_loop::Engine;
use graft_harness::components::{Counter, Panel};
use graft_harness::{HostId, ManualClock, MemoryRenderer, SimulatedSlice, mounted_instances};

use graft_debug::pretty::PrettyPrintSink;
use graft_debug::recorder::RecorderSink;
use graft_debug::tee::TeeSink;

/// Length of each idle period, 4 ms in nanoseconds.
const SLICE_NS: u64 = 4_000_000;
/// Simulated cost of one unit of work.
const UNIT_NS: u64 = 150_000;
/// Busy time between idle periods.
const GAP_NS: u64 = 12_000_000;

fn app(items: u32, title: &str) -> Element {
    Element::host("main")
        .child(
            Element::component::<Panel>()
                .attr("title", title)
                .child(Element::component::<Counter>().attr("id", "clicks")),
        )
        .child(Element::host("ol").children(
            (0..items).map(|i| Element::host("li").attr("data-i", i).child(format!("row {i}"))),
        ))
}

/// Drains the engine in simulated idle periods, tracing every slice.
fn run(
    engine: &mut Engine<MemoryRenderer>,
    clock: &ManualClock,
    sink: &mut dyn TraceSink,
) -> u32 {
    let mut slices = 0;
    while !engine.is_idle() {
        let mut slice = SimulatedSlice::new(clock, Duration(SLICE_NS), Duration(UNIT_NS));
        engine.perform_work_traced(&mut slice, &mut Tracer::new(sink));
        clock.advance(Duration(GAP_NS));
        slices += 1;
    }
    slices
}

fn button(engine: &Engine<MemoryRenderer>, root: HostId) -> HostId {
    engine
        .renderer()
        .find_by_tag(root, "button")
        .expect("counter is mounted")
}

fn main() {
    let timebase = Timebase::NANOS;
    let clock = ManualClock::new();
    clock.advance(Duration(1_000_000_000));

    let mut renderer = MemoryRenderer::new();
    let root = renderer.create_container();
    let mut engine = Engine::with_config(renderer, WorkLoopConfig::native());
    engine.set_record_commits(true);
    let mut sink = TeeSink::new(
        PrettyPrintSink::new(Box::new(std::io::stdout()), timebase),
        RecorderSink::new(),
    );

    // 1. Mount.
    engine.render_tree(app(40, "Demo"), root);
    let slices = run(&mut engine, &clock, &mut sink);
    println!("mounted in {slices} slices");
    let counter = mounted_instances(&engine.take_commits(), ComponentType::of::<Counter>())[0];

    // 2. Click three times; each click is its own cycle.
    for _ in 0..3 {
        engine.renderer().dispatch(button(&engine, root), "click");
        run(&mut engine, &clock, &mut sink);
    }
    println!("count is now {}", Counter::count(engine.instances().state(counter)));

    // 3. Shrink the list and retitle the panel.
    engine.render_tree(app(25, "Trimmed"), root);
    run(&mut engine, &clock, &mut sink);

    // 4. Unmount everything, then poke the released counter.
    engine.render_tree((), root);
    run(&mut engine, &clock, &mut sink);
    engine.schedule_instance_update(counter, State::from_iter([("count".into(), Value::Int(0))]));
    run(&mut engine, &clock, &mut sink);

    for report in engine.take_commits() {
        println!("cycle {}: {} effects", report.cycle, report.effects.len());
    }

    let (_, recorder) = sink.into_inner();

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    graft_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} cycles)", engine.cycle());
}
