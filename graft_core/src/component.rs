// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User components and their instances.
//!
//! A [`Component`] is constructed once per mounted position, keeps private
//! state, and renders a [`Node`] from its props and state. Instances live in
//! an [`InstanceStore`] owned by the engine and are addressed by generational
//! [`InstanceId`] handles, so an [`Updater`] held by an unmounted instance can
//! be recognized and its requests dropped.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::element::Node;
use crate::node::{NodeId, NodeKind, NodeStore};
use crate::props::{Props, State};
use crate::queue::{UpdateQueue, Updater};

/// A stateful, user-defined element type.
///
/// ```
/// use std::rc::Rc;
/// use graft_core::component::Component;
/// use graft_core::element::{Element, Node};
/// use graft_core::props::{Props, State, Value};
/// use graft_core::queue::Updater;
///
/// struct Counter {
///     updater: Updater,
/// }
///
/// impl Component for Counter {
///     fn create(_props: &Rc<Props>, updater: Updater) -> Self {
///         Self { updater }
///     }
///
///     fn initial_state(&self) -> State {
///         State::from_iter([("count".into(), Value::Int(0))])
///     }
///
///     fn render(&self, _props: &Props, state: &State) -> Node {
///         let count = state.get("count").and_then(Value::as_int).unwrap_or(0);
///         let updater = self.updater.clone();
///         Element::host("button")
///             .on("click", move || updater.set("count", count + 1))
///             .child(count)
///             .into()
///     }
/// }
/// ```
pub trait Component: 'static {
    /// Builds the instance. `updater` may be stored and used at any time.
    fn create(props: &Rc<Props>, updater: Updater) -> Self
    where
        Self: Sized;

    /// State the instance starts with.
    fn initial_state(&self) -> State {
        State::new()
    }

    /// Produces the subtree for the given props and state.
    fn render(&self, props: &Props, state: &State) -> Node;
}

/// Runtime identity of a [`Component`] implementation.
///
/// Two component elements have the same type exactly when they name the same
/// Rust type.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    construct: fn(&Rc<Props>, Updater) -> Box<dyn Component>,
}

impl ComponentType {
    /// The type of `C`.
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
            construct: construct::<C>,
        }
    }

    /// Rust type name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

fn construct<C: Component>(props: &Rc<Props>, updater: Updater) -> Box<dyn Component> {
    Box::new(C::create(props, updater))
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

/// A handle to a component instance in an [`InstanceStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId {
    idx: u32,
    generation: u32,
}

impl InstanceId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Raw slot index, for diagnostics and trace payloads.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Generation counter of the slot when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({}@gen{})", self.idx, self.generation)
    }
}

struct Slot {
    ty: ComponentType,
    component: Box<dyn Component>,
    props: Rc<Props>,
    state: State,
    node: Option<NodeId>,
}

/// Storage for live component instances.
#[derive(Default)]
pub struct InstanceStore {
    slots: Vec<Option<Slot>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    live: usize,
}

impl InstanceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `id` refers to a live instance.
    #[must_use]
    pub fn is_alive(&self, id: InstanceId) -> bool {
        let i = id.idx as usize;
        i < self.slots.len() && self.generation[i] == id.generation && self.slots[i].is_some()
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no instance is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The instance's component type.
    #[must_use]
    pub fn component_type(&self, id: InstanceId) -> ComponentType {
        self.slot(id).ty
    }

    /// Props of the instance's last render.
    #[must_use]
    pub fn props(&self, id: InstanceId) -> &Rc<Props> {
        &self.slot(id).props
    }

    /// The instance's current state.
    #[must_use]
    pub fn state(&self, id: InstanceId) -> &State {
        &self.slot(id).state
    }

    /// The work node the instance was last completed on, or `None` if the
    /// handle is stale.
    #[must_use]
    pub fn bound_node(&self, id: InstanceId) -> Option<NodeId> {
        if self.is_alive(id) {
            self.slot(id).node
        } else {
            None
        }
    }

    pub(crate) fn bind(&mut self, id: InstanceId, node: NodeId) {
        self.slot_mut(id).node = Some(node);
    }

    /// Returns the instance of a component node, constructing it on first
    /// use. The flag is `true` when the instance was just created.
    pub(crate) fn get_or_create<H>(
        &mut self,
        nodes: &mut NodeStore<H>,
        node: NodeId,
        queue: &UpdateQueue,
    ) -> (InstanceId, bool) {
        let NodeKind::Component { ty, instance } = nodes.kind(node) else {
            panic!("instance requested for non-component node {node:?}");
        };
        if let Some(instance) = *instance {
            return (instance, false);
        }
        let ty = *ty;
        let props = Rc::clone(nodes.props(node));
        let id = self.create(ty, props, queue, node);
        if let NodeKind::Component { instance, .. } = nodes.kind_mut(node) {
            *instance = Some(id);
        }
        (id, true)
    }

    /// Moves the node's props and pending state into the instance and
    /// renders it.
    pub(crate) fn apply_pending_state<H>(
        &mut self,
        nodes: &mut NodeStore<H>,
        id: InstanceId,
        node: NodeId,
    ) -> Node {
        let props = Rc::clone(nodes.props(node));
        let pending = nodes.take_pending_state(node);
        let slot = self.slot_mut(id);
        slot.props = props;
        if let Some(pending) = pending {
            slot.state.extend(pending);
        }
        slot.component.render(&slot.props, &slot.state)
    }

    /// Drops an instance. Its handle becomes stale.
    pub(crate) fn release(&mut self, id: InstanceId) {
        let i = id.idx as usize;
        assert!(self.is_alive(id), "stale InstanceId: {id:?}");
        self.slots[i] = None;
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(id.idx);
        self.live -= 1;
    }

    fn create(
        &mut self,
        ty: ComponentType,
        props: Rc<Props>,
        queue: &UpdateQueue,
        node: NodeId,
    ) -> InstanceId {
        let idx = match self.free_list.pop() {
            Some(idx) => idx,
            None => {
                let Ok(idx) = u32::try_from(self.slots.len()) else {
                    panic!("instance store exhausted");
                };
                self.slots.push(None);
                self.generation.push(0);
                idx
            }
        };
        let id = InstanceId::new(idx, self.generation[idx as usize]);
        let component = (ty.construct)(&props, Updater::new(queue.clone(), id));
        let state = component.initial_state();
        self.slots[idx as usize] = Some(Slot {
            ty,
            component,
            props,
            state,
            node: Some(node),
        });
        self.live += 1;
        id
    }

    fn slot(&self, id: InstanceId) -> &Slot {
        match self.slots.get(id.idx as usize) {
            Some(Some(slot)) if self.generation[id.idx as usize] == id.generation => slot,
            _ => panic!("stale InstanceId: {id:?}"),
        }
    }

    fn slot_mut(&mut self, id: InstanceId) -> &mut Slot {
        let current = self.generation.get(id.idx as usize).copied();
        match self.slots.get_mut(id.idx as usize) {
            Some(Some(slot)) if current == Some(id.generation) => slot,
            _ => panic!("stale InstanceId: {id:?}"),
        }
    }
}

impl fmt::Debug for InstanceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceStore")
            .field("live", &self.live)
            .field("capacity", &self.slots.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::props::Value;

    struct Echo;

    impl Component for Echo {
        fn create(_props: &Rc<Props>, _updater: Updater) -> Self {
            Self
        }

        fn initial_state(&self) -> State {
            State::from_iter([("count".into(), Value::Int(0))])
        }

        fn render(&self, props: &Props, state: &State) -> Node {
            let count = state.get("count").and_then(Value::as_int).unwrap_or(-1);
            let label = props.attr("label").and_then(Value::as_str).unwrap_or("");
            Element::host("span").attr("label", label).child(count).into()
        }
    }

    struct Other;

    impl Component for Other {
        fn create(_props: &Rc<Props>, _updater: Updater) -> Self {
            Self
        }

        fn render(&self, _props: &Props, _state: &State) -> Node {
            Node::Empty
        }
    }

    fn component_node(nodes: &mut NodeStore<()>) -> NodeId {
        nodes.create(
            NodeKind::for_element(Element::component::<Echo>().ty()),
            Rc::default(),
        )
    }

    #[test]
    fn component_types_compare_by_rust_type() {
        assert_eq!(ComponentType::of::<Echo>(), ComponentType::of::<Echo>());
        assert_ne!(ComponentType::of::<Echo>(), ComponentType::of::<Other>());
        assert!(ComponentType::of::<Echo>().name().ends_with("Echo"));
    }

    #[test]
    fn get_or_create_is_stable() {
        let mut nodes = NodeStore::new();
        let mut instances = InstanceStore::new();
        let queue = UpdateQueue::new();
        let node = component_node(&mut nodes);

        let (first, fresh) = instances.get_or_create(&mut nodes, node, &queue);
        assert!(fresh);
        let (second, fresh) = instances.get_or_create(&mut nodes, node, &queue);
        assert!(!fresh);
        assert_eq!(first, second);
        assert_eq!(nodes.instance(node), Some(first));
        assert_eq!(instances.bound_node(first), Some(node));
        assert_eq!(instances.state(first).get("count"), Some(&Value::Int(0)));
    }

    #[test]
    fn apply_pending_state_merges_shallowly() {
        let mut nodes = NodeStore::new();
        let mut instances = InstanceStore::new();
        let queue = UpdateQueue::new();
        let node = component_node(&mut nodes);
        let (id, _) = instances.get_or_create(&mut nodes, node, &queue);

        nodes.merge_pending_state(node, State::from_iter([("extra".into(), Value::Bool(true))]));
        nodes.merge_pending_state(node, State::from_iter([("count".into(), Value::Int(1))]));
        let out = instances.apply_pending_state(&mut nodes, id, node);

        let state = instances.state(id);
        assert_eq!(state.get("count"), Some(&Value::Int(1)));
        assert_eq!(state.get("extra"), Some(&Value::Bool(true)));
        assert!(nodes.pending_state(node).is_none(), "pending state is consumed");
        let rendered = out.into_elements();
        assert_eq!(rendered[0].props().children[0].text_value(), Some("1"));
    }

    #[test]
    fn released_handle_reports_no_node() {
        let mut nodes = NodeStore::new();
        let mut instances = InstanceStore::new();
        let queue = UpdateQueue::new();
        let node = component_node(&mut nodes);
        let (id, _) = instances.get_or_create(&mut nodes, node, &queue);
        instances.release(id);
        assert!(!instances.is_alive(id));
        assert_eq!(instances.bound_node(id), None);
        assert!(instances.is_empty());
    }

    #[test]
    #[should_panic(expected = "stale InstanceId")]
    fn releasing_twice_panics() {
        let mut nodes = NodeStore::new();
        let mut instances = InstanceStore::new();
        let queue = UpdateQueue::new();
        let node = component_node(&mut nodes);
        let (id, _) = instances.get_or_create(&mut nodes, node, &queue);
        instances.release(id);
        instances.release(id);
    }
}
