// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays storage for work nodes of every tree generation.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::component::InstanceId;
use crate::props::{Props, State};

use super::id::{INVALID, NodeId};
use super::kind::{Effect, EffectKind, NodeKind, NodeRole};
use super::traverse::{Children, Subtree};

/// Per-node payload that is not topology.
#[derive(Debug)]
struct NodeData<H> {
    kind: NodeKind<H>,
    props: Rc<Props>,
    pending_state: Option<State>,
    effect: Option<EffectKind>,
    effects: Vec<Effect>,
}

/// Struct-of-arrays storage for work nodes.
///
/// Both the committed tree and the tree under construction live here. Links
/// are first-child / next-sibling / parent indices, plus an `alternate` index
/// from each new node to the node it replaces. After a commit the previous
/// generation is freed and its slots are recycled; stale handles are caught
/// by the generation counter.
#[derive(Debug)]
pub struct NodeStore<H> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) alternate: Vec<u32>,

    // -- Payload --
    data: Vec<Option<NodeData<H>>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    free_list: Vec<u32>,
    live: usize,
}

impl<H> Default for NodeStore<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> NodeStore<H> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            alternate: Vec::new(),
            data: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    // -- Allocation --

    /// Allocates an unlinked node.
    pub(crate) fn create(&mut self, kind: NodeKind<H>, props: Rc<Props>) -> NodeId {
        let data = NodeData {
            kind,
            props,
            pending_state: None,
            effect: None,
            effects: Vec::new(),
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.alternate[i] = INVALID;
            self.data[i] = Some(data);
            idx
        } else {
            let idx = u32::try_from(self.data.len())
                .ok()
                .filter(|&idx| idx != INVALID);
            let Some(idx) = idx else {
                panic!("node store exhausted");
            };
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.alternate.push(INVALID);
            self.data.push(Some(data));
            self.generation.push(0);
            idx
        };
        self.live += 1;
        self.handle(idx)
    }

    /// Frees a single node. Links of other nodes pointing at it are left as
    /// they are; callers free whole generations at once.
    pub(crate) fn free(&mut self, id: NodeId) {
        self.validate(id);
        let i = id.idx as usize;
        self.data[i] = None;
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(id.idx);
        self.live -= 1;
    }

    /// Frees `root` and every node below it.
    pub(crate) fn free_subtree(&mut self, root: NodeId) {
        let doomed: Vec<NodeId> = self.subtree(root).collect();
        for id in doomed {
            self.free(id);
        }
    }

    /// Returns whether `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        let i = id.idx as usize;
        i < self.data.len() && self.generation[i] == id.generation && self.data[i].is_some()
    }

    /// Number of live nodes across all generations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no node is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    // -- Topology --

    /// Parent of `id`, or `None` for a root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.link(self.parent[id.idx as usize])
    }

    /// First child of `id`.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.link(self.first_child[id.idx as usize])
    }

    /// Next sibling of `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.link(self.next_sibling[id.idx as usize])
    }

    /// The node `id` replaces in the previous generation, until commit.
    #[must_use]
    pub fn alternate(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.link(self.alternate[id.idx as usize])
    }

    /// Iterates the direct children of `id` in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_, H> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Iterates `id` and its descendants in pre-order.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Subtree<'_, H> {
        self.validate(id);
        Subtree::new(self, id.idx)
    }

    /// Walks parent links up to the root of the tree containing `id`.
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            node = parent;
        }
        node
    }

    /// Links `child` under `parent`, after `prev` or as the first child.
    pub(crate) fn attach(&mut self, parent: NodeId, prev: Option<NodeId>, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        self.parent[child.idx as usize] = parent.idx;
        match prev {
            Some(prev) => {
                self.validate(prev);
                self.next_sibling[prev.idx as usize] = child.idx;
            }
            None => self.first_child[parent.idx as usize] = child.idx,
        }
    }

    pub(crate) fn set_alternate(&mut self, id: NodeId, alternate: Option<NodeId>) {
        self.validate(id);
        self.alternate[id.idx as usize] = alternate.map_or(INVALID, |a| a.idx);
    }

    // -- Payload --

    /// The node's type-specific payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind<H> {
        &self.data(id).kind
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind<H> {
        &mut self.data_mut(id).kind
    }

    /// The node's role.
    #[must_use]
    pub fn role(&self, id: NodeId) -> NodeRole {
        self.kind(id).role()
    }

    /// The host handle of a host node, once created.
    #[must_use]
    pub fn host(&self, id: NodeId) -> Option<&H> {
        self.kind(id).host()
    }

    /// The instance of a component node, once created.
    #[must_use]
    pub fn instance(&self, id: NodeId) -> Option<InstanceId> {
        self.kind(id).instance()
    }

    /// The props this node was built from.
    #[must_use]
    pub fn props(&self, id: NodeId) -> &Rc<Props> {
        &self.data(id).props
    }

    /// State updates waiting to be merged into the node's instance.
    #[must_use]
    pub fn pending_state(&self, id: NodeId) -> Option<&State> {
        self.data(id).pending_state.as_ref()
    }

    /// Merges `partial` into the node's pending state; later keys win.
    pub(crate) fn merge_pending_state(&mut self, id: NodeId, partial: State) {
        let data = self.data_mut(id);
        match &mut data.pending_state {
            Some(pending) => pending.extend(partial),
            None => data.pending_state = Some(partial),
        }
    }

    pub(crate) fn set_pending_state(&mut self, id: NodeId, pending: Option<State>) {
        self.data_mut(id).pending_state = pending;
    }

    pub(crate) fn take_pending_state(&mut self, id: NodeId) -> Option<State> {
        self.data_mut(id).pending_state.take()
    }

    /// The effect tag set on this node by the reconciler.
    #[must_use]
    pub fn effect(&self, id: NodeId) -> Option<EffectKind> {
        self.data(id).effect
    }

    pub(crate) fn set_effect(&mut self, id: NodeId, effect: Option<EffectKind>) {
        self.data_mut(id).effect = effect;
    }

    /// Effects collected so far from this node's subtree.
    #[must_use]
    pub fn effects(&self, id: NodeId) -> &[Effect] {
        &self.data(id).effects
    }

    pub(crate) fn push_effect(&mut self, id: NodeId, effect: Effect) {
        self.data_mut(id).effects.push(effect);
    }

    pub(crate) fn take_effects(&mut self, id: NodeId) -> Vec<Effect> {
        core::mem::take(&mut self.data_mut(id).effects)
    }

    pub(crate) fn extend_effects(&mut self, id: NodeId, effects: Vec<Effect>) {
        let list = &mut self.data_mut(id).effects;
        if list.is_empty() {
            *list = effects;
        } else {
            list.extend(effects);
        }
    }

    /// Drops the per-cycle marks of a committed node.
    pub(crate) fn settle(&mut self, id: NodeId) {
        self.alternate[id.idx as usize] = INVALID;
        let data = self.data_mut(id);
        data.effect = None;
        data.effects.clear();
    }

    // -- Internal helpers --

    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn link(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| self.handle(idx))
    }

    fn data(&self, id: NodeId) -> &NodeData<H> {
        self.validate(id);
        match &self.data[id.idx as usize] {
            Some(data) => data,
            None => unreachable!("validated node has data"),
        }
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData<H> {
        self.validate(id);
        match &mut self.data[id.idx as usize] {
            Some(data) => data,
            None => unreachable!("validated node has data"),
        }
    }

    /// Panics if `id` is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            self.generation
                .get(id.idx as usize)
                .copied()
                .unwrap_or(INVALID)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerId;
    use crate::host::HostTag;
    use alloc::vec;

    fn host(store: &mut NodeStore<u32>, tag: &'static str) -> NodeId {
        store.create(
            NodeKind::Host {
                tag: HostTag::Element(tag),
                host: None,
            },
            Rc::default(),
        )
    }

    fn root(store: &mut NodeStore<u32>) -> NodeId {
        store.create(
            NodeKind::Root {
                container: ContainerId(0),
            },
            Rc::default(),
        )
    }

    #[test]
    fn create_and_link() {
        let mut store = NodeStore::new();
        let r = root(&mut store);
        let a = host(&mut store, "a");
        let b = host(&mut store, "b");
        store.attach(r, None, a);
        store.attach(r, Some(a), b);

        assert_eq!(store.first_child(r), Some(a));
        assert_eq!(store.next_sibling(a), Some(b));
        assert_eq!(store.next_sibling(b), None);
        assert_eq!(store.parent(b), Some(r));
        assert_eq!(store.children(r).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(store.role(r), NodeRole::Root);
        assert_eq!(store.role(a), NodeRole::HostLeaf);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn subtree_is_preorder_and_bounded() {
        let mut store = NodeStore::new();
        let r = root(&mut store);
        let a = host(&mut store, "a");
        let a1 = host(&mut store, "a1");
        let a2 = host(&mut store, "a2");
        let b = host(&mut store, "b");
        store.attach(r, None, a);
        store.attach(a, None, a1);
        store.attach(a, Some(a1), a2);
        store.attach(r, Some(a), b);

        assert_eq!(store.subtree(r).collect::<Vec<_>>(), vec![r, a, a1, a2, b]);
        // Starting mid-tree must not wander into `b`.
        assert_eq!(store.subtree(a).collect::<Vec<_>>(), vec![a, a1, a2]);
        assert_eq!(store.subtree(a2).collect::<Vec<_>>(), vec![a2]);
        assert_eq!(store.root_of(a2), r);
    }

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut store = NodeStore::new();
        let a = host(&mut store, "a");
        store.free(a);
        assert!(!store.is_alive(a));
        let b = host(&mut store, "b");
        assert_eq!(a.index(), b.index(), "slot is recycled");
        assert_ne!(a.generation(), b.generation());
        assert!(store.is_alive(b));
        assert_eq!(store.first_child(b), None, "links are reset");
    }

    #[test]
    fn free_subtree_frees_everything_below() {
        let mut store = NodeStore::new();
        let r = root(&mut store);
        let a = host(&mut store, "a");
        let b = host(&mut store, "b");
        store.attach(r, None, a);
        store.attach(a, None, b);
        let other = host(&mut store, "other");
        store.free_subtree(r);
        assert_eq!(store.len(), 1);
        assert!(store.is_alive(other));
        assert!(!store.is_alive(b));
    }

    #[test]
    fn pending_state_merges_later_keys_win() {
        let mut store = NodeStore::new();
        let a = host(&mut store, "a");
        let mut first = State::new();
        first.insert("count".into(), 1.into());
        first.insert("keep".into(), true.into());
        let mut second = State::new();
        second.insert("count".into(), 2.into());
        store.merge_pending_state(a, first);
        store.merge_pending_state(a, second);
        let pending = store.pending_state(a).cloned().unwrap_or_default();
        assert_eq!(pending.get("count"), Some(&2.into()));
        assert_eq!(pending.get("keep"), Some(&true.into()));
        assert!(store.take_pending_state(a).is_some());
        assert!(store.pending_state(a).is_none());
    }

    #[test]
    fn settle_clears_cycle_marks() {
        let mut store = NodeStore::new();
        let a = host(&mut store, "a");
        let b = host(&mut store, "b");
        store.set_alternate(a, Some(b));
        store.set_effect(a, Some(EffectKind::Update));
        store.push_effect(
            a,
            Effect {
                kind: EffectKind::Place,
                node: b,
            },
        );
        store.settle(a);
        assert_eq!(store.alternate(a), None);
        assert_eq!(store.effect(a), None);
        assert!(store.effects(a).is_empty());
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn freed_handle_panics_on_access() {
        let mut store = NodeStore::new();
        let a = host(&mut store, "a");
        store.free(a);
        let _ = store.props(a);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn double_free_panics() {
        let mut store = NodeStore::new();
        let a = host(&mut store, "a");
        store.free(a);
        store.free(a);
    }
}
