// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit phase.
//!
//! Commit walks the root's effect list once, in order, and turns each entry
//! into renderer calls:
//!
//! - **Place** appends the node's host node to its mount parent, the host
//!   node of the nearest ancestor that is not a component (the container
//!   for top-level nodes). Component placements touch nothing; their host
//!   descendants carry their own placements.
//! - **Update** hands the old and new props to the renderer.
//! - **Delete** removes the host nodes at the top of the deleted subtree from
//!   the mount parent, descending through components, and releases every
//!   instance inside it.
//!
//! Afterwards the new root becomes the container's current tree, the
//! previous generation is freed, and the per-cycle marks on the new tree are
//! cleared. Commit is never interrupted.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::component::{ComponentType, InstanceId};
use crate::container::ContainerId;
use crate::element::ElementType;
use crate::host::Renderer;
use crate::node::{Effect, EffectKind, NodeId, NodeKind};
use crate::scheduler::Deadline;
use crate::trace::{CommitEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};
use crate::work_loop::Engine;

/// One applied effect, as recorded in a [`CommitReport`].
#[derive(Clone, Debug, PartialEq)]
pub struct EffectRecord<H> {
    /// What was done.
    pub kind: EffectKind,
    /// The node it was done for. Handles of deleted nodes are stale once the
    /// commit returns.
    pub node: NodeId,
    /// The node's element type.
    pub ty: ElementType,
    /// The node's host handle, for host nodes.
    pub host: Option<H>,
    /// The node's instance, for component nodes.
    pub instance: Option<InstanceId>,
}

/// Everything one commit did, in application order.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitReport<H> {
    /// Cycle counter of the committed render.
    pub cycle: u64,
    /// Container that was committed.
    pub container: ContainerId,
    /// Applied effects.
    pub effects: Vec<EffectRecord<H>>,
}

impl<H> CommitReport<H> {
    /// Number of effects of the given kind.
    #[must_use]
    pub fn count(&self, kind: EffectKind) -> usize {
        self.effects.iter().filter(|e| e.kind == kind).count()
    }

    /// Returns `true` if the commit changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Instances of component type `ty` mentioned by this commit.
    pub fn instances_of(&self, ty: ComponentType) -> impl Iterator<Item = InstanceId> + '_ {
        self.effects
            .iter()
            .filter(move |e| e.ty == ElementType::Component(ty))
            .filter_map(|e| e.instance)
    }
}

impl<R: Renderer> Engine<R> {
    /// Applies the effects collected on `root` and makes it current.
    pub(crate) fn commit_root(
        &mut self,
        root: NodeId,
        deadline: &dyn Deadline,
        tracer: &mut Tracer<'_>,
    ) {
        let begin = deadline.now();
        tracer.phase_end(&PhaseEndEvent {
            cycle: self.cycle,
            phase: PhaseKind::Render,
            timestamp: begin,
        });
        tracer.phase_begin(&PhaseBeginEvent {
            cycle: self.cycle,
            phase: PhaseKind::Commit,
            timestamp: begin,
        });

        let NodeKind::Root { container } = *self.nodes.kind(root) else {
            panic!("commit started from non-root node {root:?}");
        };
        let effects = self.nodes.take_effects(root);
        let mut counts = [0_u32; 3];
        let mut records = Vec::new();
        for effect in &effects {
            let record = self.commit_effect(*effect);
            counts[effect_index(effect.kind)] += 1;
            #[cfg(feature = "trace-rich")]
            tracer.effect(&crate::trace::EffectEvent {
                cycle: self.cycle,
                kind: effect.kind,
                node_index: effect.node.index(),
                role: self.nodes.role(effect.node),
            });
            if self.record_commits {
                records.push(record);
            }
        }

        let previous = self.nodes.alternate(root);
        self.containers[container.0 as usize].current = Some(root);
        if let Some(previous) = previous {
            self.nodes.free_subtree(previous);
        }
        let settled: Vec<NodeId> = self.nodes.subtree(root).collect();
        for node in settled {
            self.nodes.settle(node);
        }

        let end = deadline.now();
        tracer.phase_end(&PhaseEndEvent {
            cycle: self.cycle,
            phase: PhaseKind::Commit,
            timestamp: end,
        });
        tracer.commit(&CommitEvent {
            cycle: self.cycle,
            container,
            timestamp: end,
            placements: counts[0],
            updates: counts[1],
            deletions: counts[2],
        });
        if let Some(mut summary) = self.summary.take() {
            summary.render_end(begin);
            summary.commit(begin, end, counts.iter().sum());
            tracer.cycle_summary(&summary.finish());
        }
        if self.record_commits {
            self.commits.push(CommitReport {
                cycle: self.cycle,
                container,
                effects: records,
            });
        }
    }

    fn commit_effect(&mut self, effect: Effect) -> EffectRecord<R::HostRef> {
        let node = effect.node;
        let kind = self.nodes.kind(node);
        let Some(ty) = kind.element_type() else {
            panic!("root {node:?} found in an effect list");
        };
        let host = kind.host().cloned();
        let instance = kind.instance();

        match effect.kind {
            EffectKind::Place => {
                if let Some(child) = &host {
                    let parent = self.mount_parent(node);
                    self.renderer.append_host_node(&parent, child);
                }
            }
            EffectKind::Update => {
                if let Some(target) = &host {
                    let Some(alternate) = self.nodes.alternate(node) else {
                        panic!("update of {node:?} without an alternate");
                    };
                    let old_props = Rc::clone(self.nodes.props(alternate));
                    let new_props = Rc::clone(self.nodes.props(node));
                    self.renderer
                        .update_host_node(target, &old_props, &new_props);
                }
            }
            EffectKind::Delete => {
                let parent = self.mount_parent(node);
                self.commit_deletion(node, &parent);
            }
        }

        EffectRecord {
            kind: effect.kind,
            node,
            ty,
            host,
            instance,
        }
    }

    /// The host node that `node`'s host nodes hang from.
    fn mount_parent(&self, node: NodeId) -> R::HostRef {
        let mut parent = self.nodes.parent(node);
        while let Some(p) = parent {
            match self.nodes.kind(p) {
                NodeKind::Component { .. } => parent = self.nodes.parent(p),
                NodeKind::Host { host: Some(h), .. } => return h.clone(),
                NodeKind::Host { host: None, .. } => {
                    panic!("host ancestor {p:?} has no host node");
                }
                NodeKind::Root { container } => {
                    return self.containers[container.0 as usize].host.clone();
                }
            }
        }
        panic!("{node:?} is not mounted under a root");
    }

    /// Removes the topmost host nodes of `target`'s subtree from `parent`
    /// and releases the instances inside it.
    fn commit_deletion(&mut self, target: NodeId, parent: &R::HostRef) {
        let mut node = target;
        'walk: loop {
            match self.nodes.kind(node) {
                NodeKind::Component { .. } => {
                    if let Some(child) = self.nodes.first_child(node) {
                        node = child;
                        continue 'walk;
                    }
                }
                NodeKind::Host { host: Some(h), .. } => {
                    let h = h.clone();
                    self.renderer.remove_host_node(parent, &h);
                }
                NodeKind::Host { host: None, .. } => {
                    panic!("deleted host node {node:?} was never created");
                }
                NodeKind::Root { .. } => panic!("root {node:?} scheduled for deletion"),
            }
            loop {
                if node == target {
                    break 'walk;
                }
                if let Some(sibling) = self.nodes.next_sibling(node) {
                    node = sibling;
                    break;
                }
                let Some(up) = self.nodes.parent(node) else {
                    break 'walk;
                };
                node = up;
            }
        }

        let released: Vec<InstanceId> = self
            .nodes
            .subtree(target)
            .filter_map(|n| self.nodes.instance(n))
            .collect();
        for instance in released {
            self.instances.release(instance);
        }
    }
}

const fn effect_index(kind: EffectKind) -> usize {
    match kind {
        EffectKind::Place => 0,
        EffectKind::Update => 1,
        EffectKind::Delete => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::scheduler::UnitBudget;
    use crate::testing::{Counter, Label, LogRenderer};

    fn engine() -> (Engine<LogRenderer>, u32) {
        let (renderer, root) = LogRenderer::with_container();
        let mut engine = Engine::new(renderer);
        engine.set_record_commits(true);
        (engine, root)
    }

    #[test]
    fn report_lists_effects_in_application_order() {
        let (mut engine, root) = engine();
        engine.render_tree(
            Element::host("ul")
                .child(Element::host("li").child("a"))
                .child(Element::component::<Counter>()),
            root,
        );
        engine.flush_sync();
        let reports = engine.take_commits();
        assert_eq!(reports.len(), 1);
        let kinds: Vec<_> = reports[0].effects.iter().map(|e| e.ty).collect();
        let counter = ComponentType::of::<Counter>();
        assert_eq!(
            kinds,
            [
                ElementType::Text,
                ElementType::Host("li"),
                ElementType::Text,
                ElementType::Host("span"),
                ElementType::Component(counter),
                ElementType::Host("ul"),
            ]
        );
        assert_eq!(reports[0].count(EffectKind::Place), 6);
        assert!(reports[0].effects[0].host.is_some());
        assert_eq!(reports[0].instances_of(counter).count(), 1);
    }

    #[test]
    fn components_are_transparent_for_mounting() {
        let (mut engine, root) = engine();
        engine.render_tree(
            Element::component::<Label>().attr("label", "top"),
            root,
        );
        engine.flush_sync();
        assert_eq!(engine.renderer().dump(root), "root('top')");

        engine.render_tree(Element::host("p"), root);
        engine.flush_sync();
        assert_eq!(engine.renderer().dump(root), "root(p)");
    }

    #[test]
    fn commit_marks_are_cleared() {
        let (mut engine, root) = engine();
        engine.render_tree(Element::host("div").child("a"), root);
        engine.flush_sync();
        let container = engine.container_id(&root).unwrap();
        let current = engine.current_root(container).unwrap();
        for node in engine.nodes().subtree(current) {
            assert_eq!(engine.nodes().alternate(node), None);
            assert_eq!(engine.nodes().effect(node), None);
            assert!(engine.nodes().effects(node).is_empty());
        }
    }

    #[test]
    fn commit_is_all_or_nothing_across_slices() {
        let (mut engine, root) = engine();
        engine.render_tree(Element::host("div").child("a"), root);
        engine.flush_sync();
        engine.renderer_mut().clear_log();

        engine.render_tree(Element::host("div").child("b").child(Element::host("i")), root);
        while engine.perform_work(&mut UnitBudget::new(1)).is_pending() {
            let log = &engine.renderer().log;
            assert!(
                log.iter().all(|line| line.starts_with("create")),
                "host mutated before commit: {log:?}"
            );
        }
        assert_eq!(engine.renderer().dump(root), "root(div('b',i))");
    }
}
