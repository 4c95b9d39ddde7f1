// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-engine guarantees, checked against the in-memory renderer.

use graft_core::commit::CommitReport;
use graft_core::component::ComponentType;
use graft_core::element::{Element, ElementType};
use graft_core::node::EffectKind;
use graft_core::props::{State, Value};
use graft_core::scheduler::WorkLoopConfig;
use graft_core::time::Duration;
use graft_core::work_loop::Engine;
use graft_harness::components::{Counter, Panel};
use graft_harness::{
    HostId, HostOp, HostSnapshot, ManualClock, MemoryRenderer, SimulatedSlice, drive_in_slices,
    mounted_instances,
};

fn mount() -> (Engine<MemoryRenderer>, HostId) {
    let mut renderer = MemoryRenderer::new();
    let root = renderer.create_container();
    let mut engine = Engine::new(renderer);
    engine.set_record_commits(true);
    (engine, root)
}

fn page() -> Element {
    Element::host("div")
        .attr("id", "app")
        .style("margin", "0")
        .child(Element::host("h1").child("Title"))
        .child(
            Element::host("ul").children((0..3).map(|i| {
                Element::host("li")
                    .attr("data-index", i)
                    .child(format!("item {i}"))
            })),
        )
        .child(Element::host("button").on("click", || {}).child("go"))
}

fn app(label: &str) -> Element {
    Element::host("main")
        .child(
            Element::component::<Panel>()
                .attr("title", label)
                .child(Element::component::<Counter>().attr("start", 3))
                .child(Element::host("em").child(label)),
        )
        .child(page())
}

fn single(engine: &mut Engine<MemoryRenderer>) -> CommitReport<HostId> {
    let mut commits = engine.take_commits();
    assert_eq!(commits.len(), 1, "expected exactly one commit");
    commits.remove(0)
}

#[test]
fn first_render_matches_the_description() {
    let (mut engine, root) = mount();
    engine.render_tree(page(), root);
    engine.flush_sync();

    assert_eq!(engine.renderer().content(root), HostSnapshot::expected(page()));
    let report = single(&mut engine);
    assert_eq!(report.count(EffectKind::Place), 12);
    assert_eq!(report.count(EffectKind::Update), 0);
}

#[test]
fn rendering_the_same_description_again_only_updates() {
    let (mut engine, root) = mount();
    engine.render_tree(page(), root);
    engine.flush_sync();
    engine.take_commits();
    engine.renderer_mut().take_ops();

    engine.render_tree(page(), root);
    engine.flush_sync();
    let report = single(&mut engine);
    assert_eq!(report.count(EffectKind::Place), 0);
    assert_eq!(report.count(EffectKind::Delete), 0);
    assert_eq!(report.count(EffectKind::Update), 12);
    assert!(
        engine
            .renderer()
            .ops()
            .iter()
            .all(|op| matches!(op, HostOp::Update { .. })),
        "only updates reach the host: {:?}",
        engine.renderer().ops()
    );
    // Only the button's fresh click listener differs.
    let changed: usize = engine
        .renderer()
        .ops()
        .iter()
        .map(|op| match op {
            HostOp::Update { changes, .. } => *changes,
            _ => 0,
        })
        .sum();
    assert_eq!(changed, 2);
    assert_eq!(engine.renderer().content(root), HostSnapshot::expected(page()));
}

#[test]
fn rendering_the_same_element_again_does_nothing() {
    let (mut engine, root) = mount();
    let tree = page();
    engine.render_tree(tree.clone(), root);
    engine.flush_sync();
    engine.take_commits();
    engine.renderer_mut().take_ops();

    engine.render_tree(tree, root);
    engine.flush_sync();
    assert!(single(&mut engine).is_empty(), "identical element was re-applied");
    assert!(engine.renderer().ops().is_empty(), "host was touched");
}

/// Runs two renders of `app` and returns every commit with the final host
/// tree.
fn run_app(budgets: &[u32]) -> (Vec<CommitReport<HostId>>, Vec<HostSnapshot>) {
    let (mut engine, root) = mount();
    engine.render_tree(app("one"), root);
    drive_in_slices(&mut engine, budgets);
    engine.render_tree(app("two"), root);
    drive_in_slices(&mut engine, budgets);
    let content = engine.renderer().content(root);
    (engine.take_commits(), content)
}

#[test]
fn slicing_does_not_change_the_outcome() {
    let (reference_commits, reference_content) = run_app(&[u32::MAX]);
    assert_eq!(reference_commits.len(), 2);

    for budgets in [&[1][..], &[2], &[3, 1], &[5, 0, 2], &[7]] {
        let (commits, content) = run_app(budgets);
        assert_eq!(commits, reference_commits, "effects differ for {budgets:?}");
        assert_eq!(content, reference_content, "host differs for {budgets:?}");
    }
}

#[test]
fn host_is_only_appended_to_at_commit() {
    let (mut engine, root) = mount();
    engine.render_tree(page(), root);
    let mut slices = 0;
    while !engine.is_idle() {
        engine.perform_work(&mut graft_core::scheduler::UnitBudget::new(2));
        slices += 1;
        if engine.is_rendering() {
            assert!(
                engine
                    .renderer()
                    .ops()
                    .iter()
                    .all(|op| matches!(op, HostOp::Create { .. })),
                "host tree changed mid-render after slice {slices}"
            );
            assert!(engine.renderer().children(root).is_empty(), "content visible early");
        }
    }
    assert!(slices > 1, "page should take several slices");
    assert_eq!(engine.renderer().content(root), HostSnapshot::expected(page()));
}

#[test]
fn clocked_slices_reach_the_same_tree() {
    let mut renderer = MemoryRenderer::new();
    let root = renderer.create_container();
    let mut engine = Engine::with_config(
        renderer,
        WorkLoopConfig {
            min_remaining: Duration(2),
            chain_requests: true,
        },
    );
    let clock = ManualClock::new();
    engine.render_tree(page(), root);
    let mut slices = 0;
    while !engine.is_idle() {
        engine.perform_work(&mut SimulatedSlice::new(&clock, Duration(10), Duration(1)));
        slices += 1;
        assert!(slices < 100, "clocked slices made no progress");
    }
    assert!(slices > 1, "a ten tick slice cannot hold the whole page");
    assert_eq!(engine.renderer().content(root), HostSnapshot::expected(page()));
}

#[test]
fn instant_deadline_drains_small_trees() {
    let (mut engine, root) = mount();
    engine.render_tree(page(), root);
    let mut deadline = graft_core::scheduler::InstantDeadline::new(std::time::Duration::from_secs(60));
    assert!(!engine.perform_work(&mut deadline).is_pending(), "work left over");
    assert_eq!(engine.renderer().content(root), HostSnapshot::expected(page()));
}

#[test]
fn positional_replacement_deletes_and_places_once() {
    let (mut engine, root) = mount();
    let a = Element::host("hr");
    let c = Element::host("br");
    engine.render_tree(vec![a.clone(), Element::host("img"), c.clone()], root);
    engine.flush_sync();
    engine.take_commits();

    let container = engine.render_tree(
        vec![Element::host("hr"), Element::host("input"), Element::host("br")],
        root,
    );
    engine.flush_sync();
    let report = single(&mut engine);
    assert_eq!(report.count(EffectKind::Delete), 1);
    assert_eq!(report.count(EffectKind::Place), 1);
    assert_eq!(report.count(EffectKind::Update), 2);
    let ty_of = |kind: EffectKind| {
        report
            .effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.ty)
    };
    assert_eq!(ty_of(EffectKind::Delete), Some(ElementType::Host("img")));
    assert_eq!(ty_of(EffectKind::Place), Some(ElementType::Host("input")));

    let current = engine.current_root(container).expect("committed");
    let order: Vec<_> = engine
        .nodes()
        .children(current)
        .filter_map(|n| engine.nodes().kind(n).element_type())
        .collect();
    assert_eq!(
        order,
        [
            ElementType::Host("hr"),
            ElementType::Host("input"),
            ElementType::Host("br")
        ]
    );
    // Placement appends, so the replacement lands after its old siblings.
    assert_eq!(
        engine.renderer().content(root),
        HostSnapshot::expected(vec![a, c, Element::host("input")])
    );
}

#[test]
fn queued_state_changes_merge() {
    let (mut engine, root) = mount();
    engine.render_tree(Element::component::<Counter>(), root);
    engine.flush_sync();
    let counter = mounted_instances(&engine.take_commits(), ComponentType::of::<Counter>())[0];
    assert_eq!(
        engine.instances().state(counter),
        &State::from_iter([("count".into(), Value::Int(0))])
    );

    engine.schedule_instance_update(counter, State::from_iter([("count".into(), Value::Int(1))]));
    engine.schedule_instance_update(
        counter,
        State::from_iter([("extra".into(), Value::Bool(true))]),
    );
    engine.flush_sync();
    assert_eq!(
        engine.instances().state(counter),
        &State::from_iter([
            ("count".into(), Value::Int(1)),
            ("extra".into(), Value::Bool(true)),
        ])
    );
    assert_eq!(engine.take_commits().len(), 2, "each request is its own cycle");
    let button = engine.renderer().children(root)[0];
    let text = engine.renderer().children(button)[0];
    assert_eq!(engine.renderer().text(text), Some("1"));
}

#[test]
fn divergent_trees_stay_consistent_over_many_renders() {
    let (mut engine, root) = mount();
    let shapes: [fn(i32) -> Element; 3] = [
        |i| Element::host("ul").children((0..i).map(|n| Element::host("li").child(n))),
        |i| Element::host("ol").child(Element::component::<Counter>().attr("start", i)),
        |i| Element::host("ul").child(format!("{i}")).child(Element::host("b")),
    ];
    for round in 0..12 {
        let build = shapes[round as usize % shapes.len()];
        engine.render_tree(build(round % 4), root);
        drive_in_slices(&mut engine, &[3]);
        let content = engine.renderer().content(root);
        assert_eq!(content.len(), 1, "round {round}");
        if round % 3 != 1 {
            assert_eq!(content, HostSnapshot::expected(build(round % 4)), "round {round}");
        }
    }
    // Only the current generation stays allocated.
    let container = engine.container_id(&root).expect("registered");
    let current = engine.current_root(container).expect("committed");
    assert_eq!(engine.nodes().len(), engine.nodes().subtree(current).count());
}
