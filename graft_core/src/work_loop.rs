// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine and its interruptible work loop.
//!
//! A render cycle starts by taking one request off the [`UpdateQueue`] and
//! creating a fresh root linked to the container's current root. The tree
//! is then walked depth-first, one *unit of work* per node:
//!
//! ```text
//!   begin(node) ──► first child? ──yes──► next unit
//!                        │no
//!                        ▼
//!   complete(node) ──► next sibling? ──yes──► next unit
//!        ▲                   │no
//!        └──── parent ◄──────┘   (root completed ──► commit)
//! ```
//!
//! *Begin* creates host nodes, instantiates and renders components, and
//! reconciles children. *Complete* binds instances to their node and moves
//! the node's collected effects, followed by the node itself when tagged, to
//! its parent. When the root completes, its list holds every effect of the
//! cycle in child-before-parent order and the commit runs to completion.
//!
//! The loop yields between units whenever the slice [`Deadline`] runs low.
//! All cursor state lives in the engine, so the next call to
//! [`Engine::perform_work`] resumes exactly where the last one stopped.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::commit::CommitReport;
use crate::component::{InstanceId, InstanceStore};
use crate::container::ContainerId;
use crate::element::Node;
use crate::host::{HostDescriptor, Renderer};
use crate::node::{Effect, NodeId, NodeKind, NodeRole, NodeStore};
use crate::props::{Props, State};
use crate::queue::{UpdateQueue, UpdateRequest};
use crate::reconcile::{clone_child_nodes, reconcile_children};
use crate::scheduler::{Deadline, Unbounded, WorkLoopConfig, WorkStatus};
use crate::trace::{
    CycleBeginEvent, CycleSummaryBuilder, PhaseBeginEvent, PhaseKind, SliceBeginEvent,
    SliceEndEvent, StaleUpdateEvent, Tracer,
};

#[derive(Debug)]
pub(crate) struct Container<H> {
    pub(crate) host: H,
    pub(crate) current: Option<NodeId>,
}

/// Reconciles element trees into a host through a [`Renderer`].
pub struct Engine<R: Renderer> {
    pub(crate) renderer: R,
    pub(crate) config: WorkLoopConfig,
    pub(crate) nodes: NodeStore<R::HostRef>,
    pub(crate) instances: InstanceStore,
    pub(crate) queue: UpdateQueue,
    pub(crate) containers: Vec<Container<R::HostRef>>,
    pub(crate) next_unit: Option<NodeId>,
    pub(crate) pending_commit: Option<NodeId>,
    pub(crate) cycle: u64,
    pub(crate) summary: Option<CycleSummaryBuilder>,
    pub(crate) record_commits: bool,
    pub(crate) commits: Vec<CommitReport<R::HostRef>>,
    slice_index: u64,
}

impl<R: Renderer> Engine<R> {
    /// Creates an engine with [`WorkLoopConfig::default`].
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, WorkLoopConfig::default())
    }

    /// Creates an engine with the given loop configuration.
    #[must_use]
    pub fn with_config(renderer: R, config: WorkLoopConfig) -> Self {
        Self {
            renderer,
            config,
            nodes: NodeStore::new(),
            instances: InstanceStore::new(),
            queue: UpdateQueue::new(),
            containers: Vec::new(),
            next_unit: None,
            pending_commit: None,
            cycle: 0,
            summary: None,
            record_commits: false,
            commits: Vec::new(),
            slice_index: 0,
        }
    }

    // -- Requests --

    /// Requests that `tree` become the content of `container`.
    ///
    /// The first call for a container registers it. Nothing happens to the
    /// host until the request is worked off by [`perform_work`](Self::perform_work).
    pub fn render_tree(&mut self, tree: impl Into<Node>, container: R::HostRef) -> ContainerId {
        let container = self.register_container(container);
        let props = Props {
            children: tree.into().into_elements(),
            ..Props::default()
        };
        self.queue.enqueue(UpdateRequest::RootRender {
            container,
            props: Rc::new(props),
        });
        container
    }

    /// Requests a state merge for `instance`, as its [`Updater`] would.
    ///
    /// [`Updater`]: crate::queue::Updater
    pub fn schedule_instance_update(&self, instance: InstanceId, partial_state: State) {
        self.queue.enqueue(UpdateRequest::InstanceUpdate {
            instance,
            partial_state,
        });
    }

    // -- Work loop --

    /// Runs units of work until `deadline` runs low, committing any cycle
    /// that completes.
    pub fn perform_work(&mut self, deadline: &mut dyn Deadline) -> WorkStatus {
        self.perform_work_traced(deadline, &mut Tracer::none())
    }

    /// [`perform_work`](Self::perform_work) with instrumentation.
    pub fn perform_work_traced(
        &mut self,
        deadline: &mut dyn Deadline,
        tracer: &mut Tracer<'_>,
    ) -> WorkStatus {
        let slice_index = self.slice_index;
        self.slice_index += 1;
        tracer.slice_begin(&SliceBeginEvent {
            slice_index,
            timestamp: deadline.now(),
        });
        if let Some(summary) = &mut self.summary {
            summary.add_slice();
        }

        let mut units = 0_u32;
        loop {
            if self.next_unit.is_none() && !self.begin_cycle(deadline, tracer) {
                break;
            }

            let mut cycle_units = 0_u32;
            while let Some(unit) = self.next_unit {
                if deadline.time_remaining() <= self.config.min_remaining {
                    break;
                }
                self.next_unit = self.perform_unit_of_work(unit, tracer);
                cycle_units += 1;
            }
            units += cycle_units;
            if let Some(summary) = &mut self.summary {
                summary.add_units(cycle_units);
            }

            let Some(root) = self.pending_commit.take() else {
                break;
            };
            self.commit_root(root, deadline, tracer);
            if !self.config.chain_requests || self.queue.is_empty() {
                break;
            }
        }

        let status = if self.next_unit.is_some() || !self.queue.is_empty() {
            WorkStatus::Pending
        } else {
            WorkStatus::Idle
        };
        tracer.slice_end(&SliceEndEvent {
            slice_index,
            timestamp: deadline.now(),
            units,
            pending: status.is_pending(),
        });
        status
    }

    /// Works until idle without yielding.
    pub fn flush_sync(&mut self) {
        while self.perform_work(&mut Unbounded).is_pending() {}
    }

    /// Takes the next request and sets up its root. Returns `false` when the
    /// queue holds nothing workable.
    fn begin_cycle(&mut self, deadline: &dyn Deadline, tracer: &mut Tracer<'_>) -> bool {
        loop {
            let Some(request) = self.queue.dequeue() else {
                return false;
            };
            let origin = request.origin();
            let (container, props, alternate) = match request {
                UpdateRequest::RootRender { container, props } => {
                    let current = self.containers[container.0 as usize].current;
                    (container, props, current)
                }
                UpdateRequest::InstanceUpdate {
                    instance,
                    partial_state,
                } => {
                    let Some(node) = self.instances.bound_node(instance) else {
                        tracer.stale_update(&StaleUpdateEvent {
                            instance_index: instance.index(),
                            instance_generation: instance.generation(),
                            timestamp: deadline.now(),
                        });
                        continue;
                    };
                    self.nodes.merge_pending_state(node, partial_state);
                    let current = self.nodes.root_of(node);
                    let NodeKind::Root { container } = self.nodes.kind(current) else {
                        panic!("instance {instance:?} is not mounted under a root");
                    };
                    (*container, Rc::clone(self.nodes.props(current)), Some(current))
                }
            };

            let root = self.nodes.create(NodeKind::Root { container }, props);
            self.nodes.set_alternate(root, alternate);
            self.next_unit = Some(root);
            self.cycle += 1;

            let begin = CycleBeginEvent {
                cycle: self.cycle,
                origin,
                container,
                timestamp: deadline.now(),
            };
            tracer.cycle_begin(&begin);
            tracer.phase_begin(&PhaseBeginEvent {
                cycle: self.cycle,
                phase: PhaseKind::Render,
                timestamp: begin.timestamp,
            });
            self.summary = Some(CycleSummaryBuilder::new(&begin));
            return true;
        }
    }

    /// Begins `unit` and returns the next node to begin, completing nodes on
    /// the way up when the subtree below `unit` is exhausted.
    fn perform_unit_of_work(&mut self, unit: NodeId, tracer: &mut Tracer<'_>) -> Option<NodeId> {
        #[cfg(feature = "trace-rich")]
        tracer.unit_of_work(&crate::trace::UnitOfWorkEvent {
            cycle: self.cycle,
            node_index: unit.index(),
            role: self.nodes.role(unit),
        });
        #[cfg(not(feature = "trace-rich"))]
        let _ = tracer;

        self.begin_work(unit);
        if let Some(child) = self.nodes.first_child(unit) {
            return Some(child);
        }
        let mut node = unit;
        loop {
            self.complete_work(node);
            if let Some(sibling) = self.nodes.next_sibling(node) {
                return Some(sibling);
            }
            node = self.nodes.parent(node)?;
        }
    }

    fn begin_work(&mut self, node: NodeId) {
        match self.nodes.role(node) {
            NodeRole::Component => self.update_component(node),
            NodeRole::HostLeaf | NodeRole::Root => self.update_host(node),
        }
    }

    fn update_host(&mut self, node: NodeId) {
        if let NodeKind::Host { tag, host: None } = self.nodes.kind(node) {
            let tag = *tag;
            let props = Rc::clone(self.nodes.props(node));
            let handle = self.renderer.create_host_node(&HostDescriptor {
                tag,
                props: &props,
            });
            if let NodeKind::Host { host, .. } = self.nodes.kind_mut(node) {
                *host = Some(handle);
            }
        }

        let props = Rc::clone(self.nodes.props(node));
        let unchanged = self
            .nodes
            .alternate(node)
            .is_some_and(|alt| Rc::ptr_eq(self.nodes.props(alt), &props));
        if unchanged {
            clone_child_nodes(&mut self.nodes, node);
        } else {
            reconcile_children(&mut self.nodes, node, &props.children);
        }
    }

    fn update_component(&mut self, node: NodeId) {
        let (instance, fresh) = self
            .instances
            .get_or_create(&mut self.nodes, node, &self.queue);
        let unchanged = !fresh
            && self.nodes.pending_state(node).is_none()
            && Rc::ptr_eq(self.instances.props(instance), self.nodes.props(node));
        if unchanged {
            clone_child_nodes(&mut self.nodes, node);
            return;
        }
        let rendered = self
            .instances
            .apply_pending_state(&mut self.nodes, instance, node);
        reconcile_children(&mut self.nodes, node, &rendered.into_elements());
    }

    fn complete_work(&mut self, node: NodeId) {
        if let Some(instance) = self.nodes.instance(node) {
            self.instances.bind(instance, node);
        }
        match self.nodes.parent(node) {
            Some(parent) => {
                let mut effects = self.nodes.take_effects(node);
                if let Some(kind) = self.nodes.effect(node) {
                    effects.push(Effect { kind, node });
                }
                self.nodes.extend_effects(parent, effects);
            }
            None => self.pending_commit = Some(node),
        }
    }

    // -- Containers --

    fn register_container(&mut self, host: R::HostRef) -> ContainerId {
        if let Some(id) = self.container_id(&host) {
            return id;
        }
        let Ok(idx) = u32::try_from(self.containers.len()) else {
            panic!("too many containers");
        };
        self.containers.push(Container {
            host,
            current: None,
        });
        ContainerId(idx)
    }

    /// The id under which `host` was registered as a container.
    #[must_use]
    pub fn container_id(&self, host: &R::HostRef) -> Option<ContainerId> {
        self.containers
            .iter()
            .position(|c| c.host == *host)
            .and_then(|idx| u32::try_from(idx).ok())
            .map(ContainerId)
    }

    /// The host node of a registered container.
    #[must_use]
    pub fn container_host(&self, container: ContainerId) -> &R::HostRef {
        &self.containers[container.0 as usize].host
    }

    /// The committed root of `container`, if it has been rendered.
    #[must_use]
    pub fn current_root(&self, container: ContainerId) -> Option<NodeId> {
        self.containers
            .get(container.0 as usize)
            .and_then(|c| c.current)
    }

    // -- Inspection --

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably. Changing host nodes the engine owns behind its
    /// back leads to undefined reconciliation results.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The shared update queue, for installing a waker.
    #[must_use]
    pub fn queue(&self) -> &UpdateQueue {
        &self.queue
    }

    /// All work nodes, current and in progress.
    #[must_use]
    pub fn nodes(&self) -> &NodeStore<R::HostRef> {
        &self.nodes
    }

    /// Live component instances.
    #[must_use]
    pub fn instances(&self) -> &InstanceStore {
        &self.instances
    }

    /// The loop configuration.
    #[must_use]
    pub fn config(&self) -> WorkLoopConfig {
        self.config
    }

    /// Number of cycles started so far.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether a cycle is suspended mid-render.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.next_unit.is_some()
    }

    /// Whether there is nothing to do.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.next_unit.is_none() && self.queue.is_empty()
    }

    /// Enables or disables [`CommitReport`] collection. Off by default.
    pub fn set_record_commits(&mut self, record: bool) {
        self.record_commits = record;
        if !record {
            self.commits.clear();
        }
    }

    /// Drains the commit reports collected since the last call.
    pub fn take_commits(&mut self) -> Vec<CommitReport<R::HostRef>> {
        core::mem::take(&mut self.commits)
    }
}

impl<R: Renderer + fmt::Debug> fmt::Debug for Engine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("renderer", &self.renderer)
            .field("config", &self.config)
            .field("nodes", &self.nodes.len())
            .field("instances", &self.instances.len())
            .field("queued", &self.queue.len())
            .field("containers", &self.containers)
            .field("next_unit", &self.next_unit)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}
