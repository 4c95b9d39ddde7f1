// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional child reconciliation.
//!
//! Children are matched strictly by position: the i-th new element is
//! compared with the i-th child of the node's alternate. A match of the same
//! type reuses the old node's payload; anything else places a fresh node and
//! deletes the old one. Keys and moves are not recognized, so inserting at
//! the front of a list rebuilds every position after it.
//!
//! The old tree is only read. Deletions are recorded as effects on the
//! work-in-progress parent because the old node has no place in the new
//! tree to carry its own tag.

use alloc::rc::Rc;

use crate::element::Element;
use crate::node::{Effect, EffectKind, NodeId, NodeKind, NodeStore};

/// Rebuilds the children of `wip` from `elements`.
///
/// For each position:
///
/// - same type: a new node sharing the old payload, tagged
///   [`Update`](EffectKind::Update) unless the props bag is the very same
///   allocation;
/// - different type or no old child: a fresh node tagged
///   [`Place`](EffectKind::Place), and the old child (if any) recorded as a
///   [`Delete`](EffectKind::Delete) on `wip`;
/// - no new element: the old child is recorded as a deletion.
///
/// Pending state travels from each old child to its replacement.
pub(crate) fn reconcile_children<H: Clone>(
    nodes: &mut NodeStore<H>,
    wip: NodeId,
    elements: &[Element],
) {
    let mut old = nodes.alternate(wip).and_then(|alt| nodes.first_child(alt));
    let mut prev: Option<NodeId> = None;
    let mut index = 0;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let reused = match (old, element) {
            (Some(old), Some(element)) if nodes.kind(old).matches(element.ty()) => {
                Some(reuse(nodes, old, element))
            }
            _ => None,
        };

        let new_node = match reused {
            Some(node) => Some(node),
            None => {
                if let Some(old) = old {
                    nodes.push_effect(
                        wip,
                        Effect {
                            kind: EffectKind::Delete,
                            node: old,
                        },
                    );
                }
                element.map(|element| place(nodes, element))
            }
        };

        if let Some(node) = new_node {
            nodes.attach(wip, prev, node);
            prev = Some(node);
        }

        old = old.and_then(|old| nodes.next_sibling(old));
        index += 1;
    }
}

/// Copies the children of `wip`'s alternate without reconciling them.
///
/// Used when a node's input is unchanged. The copies carry no effect tag;
/// their own subtrees are visited normally, so pending state further down
/// still gets rendered.
pub(crate) fn clone_child_nodes<H: Clone>(nodes: &mut NodeStore<H>, wip: NodeId) {
    let Some(alternate) = nodes.alternate(wip) else {
        return;
    };
    let mut old = nodes.first_child(alternate);
    let mut prev = None;
    while let Some(old_child) = old {
        let copy = nodes.create(
            nodes.kind(old_child).clone(),
            Rc::clone(nodes.props(old_child)),
        );
        nodes.set_alternate(copy, Some(old_child));
        nodes.set_pending_state(copy, nodes.pending_state(old_child).cloned());
        nodes.attach(wip, prev, copy);
        prev = Some(copy);
        old = nodes.next_sibling(old_child);
    }
}

fn reuse<H: Clone>(nodes: &mut NodeStore<H>, old: NodeId, element: &Element) -> NodeId {
    let node = nodes.create(nodes.kind(old).clone(), Rc::clone(element.props()));
    nodes.set_alternate(node, Some(old));
    nodes.set_pending_state(node, nodes.pending_state(old).cloned());
    if !Rc::ptr_eq(nodes.props(old), element.props()) {
        nodes.set_effect(node, Some(EffectKind::Update));
    }
    node
}

fn place<H>(nodes: &mut NodeStore<H>, element: &Element) -> NodeId {
    let node = nodes.create(
        NodeKind::for_element(element.ty()),
        Rc::clone(element.props()),
    );
    nodes.set_effect(node, Some(EffectKind::Place));
    node
}
