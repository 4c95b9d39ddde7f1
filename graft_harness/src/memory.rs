// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host tree that lives in plain vectors.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use graft_core::element::TEXT_VALUE;
use graft_core::host::{HostDescriptor, HostTag, Renderer};
use graft_core::props::{Listener, PropChange, Props, PropsDiff, Value};

use crate::snapshot::HostSnapshot;

/// Handle to a node of a [`MemoryRenderer`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId(pub u32);

impl fmt::Debug for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostId({})", self.0)
    }
}

/// One renderer call, as logged by [`MemoryRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOp {
    /// A node was created.
    Create {
        /// New node.
        id: HostId,
        /// Its tag.
        tag: HostTag,
    },
    /// A node's properties were patched.
    Update {
        /// Patched node.
        id: HostId,
        /// Number of property changes applied.
        changes: usize,
    },
    /// A node was appended.
    Append {
        /// Parent node.
        parent: HostId,
        /// Appended node.
        child: HostId,
    },
    /// A node was removed.
    Remove {
        /// Parent node.
        parent: HostId,
        /// Removed node.
        child: HostId,
    },
}

#[derive(Debug)]
struct HostNode {
    tag: HostTag,
    attributes: BTreeMap<String, Value>,
    listeners: BTreeMap<String, Listener>,
    style: BTreeMap<String, String>,
    parent: Option<HostId>,
    children: Vec<HostId>,
}

impl HostNode {
    fn new(tag: HostTag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            listeners: BTreeMap::new(),
            style: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn apply(&mut self, diff: PropsDiff<'_>) {
        for change in diff {
            match change {
                PropChange::RemoveListener { event, .. } => {
                    self.listeners.remove(event);
                }
                PropChange::RemoveAttribute(name) => {
                    self.attributes.remove(name);
                }
                PropChange::SetAttribute(name, value) => {
                    self.attributes.insert(name.into(), value.clone());
                }
                PropChange::AddListener { event, listener } => {
                    self.listeners.insert(event.into(), listener.clone());
                }
                PropChange::SetStyle(key, value) => {
                    self.style.insert(key.into(), value.into());
                }
                PropChange::RemoveStyle(key) => {
                    self.style.remove(key);
                }
            }
        }
    }
}

/// A [`Renderer`] over an in-memory tree, with a log of every call.
///
/// Appending a node that already has a parent, or removing a node from a
/// parent it is not attached to, panics.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    nodes: Vec<HostNode>,
    ops: Vec<HostOp>,
}

impl MemoryRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element to render into. Not logged.
    pub fn create_container(&mut self) -> HostId {
        self.push(HostNode::new(HostTag::Element("container")))
    }

    /// Every logged call since the last [`take_ops`](Self::take_ops).
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Drains the call log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        core::mem::take(&mut self.ops)
    }

    /// Number of host nodes ever created, containers included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node's tag.
    #[must_use]
    pub fn tag(&self, id: HostId) -> HostTag {
        self.node(id).tag
    }

    /// An attribute value.
    #[must_use]
    pub fn attribute(&self, id: HostId, name: &str) -> Option<&Value> {
        self.node(id).attributes.get(name)
    }

    /// A style declaration.
    #[must_use]
    pub fn style(&self, id: HostId, key: &str) -> Option<&str> {
        self.node(id).style.get(key).map(String::as_str)
    }

    /// The text of a text node.
    #[must_use]
    pub fn text(&self, id: HostId) -> Option<&str> {
        match self.node(id).tag {
            HostTag::Text => self.attribute(id, TEXT_VALUE).and_then(Value::as_str),
            HostTag::Element(_) => None,
        }
    }

    /// Attached children, in order.
    #[must_use]
    pub fn children(&self, id: HostId) -> &[HostId] {
        &self.node(id).children
    }

    /// The node's parent, if attached.
    #[must_use]
    pub fn parent(&self, id: HostId) -> Option<HostId> {
        self.node(id).parent
    }

    /// Calls the listener registered for `event` on `id`. Returns `false` if
    /// there is none.
    pub fn dispatch(&self, id: HostId, event: &str) -> bool {
        let listener = self.node(id).listeners.get(event).cloned();
        match listener {
            Some(listener) => {
                listener.call();
                true
            }
            None => false,
        }
    }

    /// First node in pre-order under `root` (excluding it) with the tag `tag`.
    #[must_use]
    pub fn find_by_tag(&self, root: HostId, tag: &str) -> Option<HostId> {
        let mut stack: Vec<HostId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if matches!(self.node(id).tag, HostTag::Element(t) if t == tag) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        None
    }

    /// Snapshot of a node and its attached descendants.
    #[must_use]
    pub fn snapshot(&self, id: HostId) -> HostSnapshot {
        let node = self.node(id);
        match node.tag {
            HostTag::Text => HostSnapshot::Text(
                node.attributes
                    .get(TEXT_VALUE)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ),
            HostTag::Element(tag) => HostSnapshot::Element {
                tag: tag.into(),
                attributes: node
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
                style: node
                    .style
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                listeners: node.listeners.keys().cloned().collect(),
                children: node.children.iter().map(|c| self.snapshot(*c)).collect(),
            },
        }
    }

    /// Snapshots of the children of a container.
    #[must_use]
    pub fn content(&self, container: HostId) -> Vec<HostSnapshot> {
        self.children(container)
            .iter()
            .map(|c| self.snapshot(*c))
            .collect()
    }

    fn push(&mut self, node: HostNode) -> HostId {
        let Ok(idx) = u32::try_from(self.nodes.len()) else {
            panic!("memory renderer exhausted");
        };
        self.nodes.push(node);
        HostId(idx)
    }

    fn node(&self, id: HostId) -> &HostNode {
        match self.nodes.get(id.0 as usize) {
            Some(node) => node,
            None => panic!("unknown {id:?}"),
        }
    }

    fn node_mut(&mut self, id: HostId) -> &mut HostNode {
        match self.nodes.get_mut(id.0 as usize) {
            Some(node) => node,
            None => panic!("unknown {id:?}"),
        }
    }
}

impl Renderer for MemoryRenderer {
    type HostRef = HostId;

    fn create_host_node(&mut self, descriptor: &HostDescriptor<'_>) -> HostId {
        let mut node = HostNode::new(descriptor.tag);
        node.apply(PropsDiff::initial(descriptor.props));
        let id = self.push(node);
        self.ops.push(HostOp::Create {
            id,
            tag: descriptor.tag,
        });
        id
    }

    fn update_host_node(&mut self, host: &HostId, old_props: &Props, new_props: &Props) {
        let diff = PropsDiff::between(old_props, new_props);
        let changes = diff.len();
        self.node_mut(*host).apply(diff);
        self.ops.push(HostOp::Update { id: *host, changes });
    }

    fn append_host_node(&mut self, parent: &HostId, child: &HostId) {
        assert!(
            self.node(*child).parent.is_none(),
            "host node {child:?} already attached"
        );
        self.node_mut(*parent).children.push(*child);
        self.node_mut(*child).parent = Some(*parent);
        self.ops.push(HostOp::Append {
            parent: *parent,
            child: *child,
        });
    }

    fn remove_host_node(&mut self, parent: &HostId, child: &HostId) {
        let siblings = &mut self.node_mut(*parent).children;
        let Some(pos) = siblings.iter().position(|c| c == child) else {
            panic!("host node already detached: {child:?} is not a child of {parent:?}");
        };
        siblings.remove(pos);
        self.node_mut(*child).parent = None;
        self.ops.push(HostOp::Remove {
            parent: *parent,
            child: *child,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;
    use graft_core::element::Element;

    fn create(renderer: &mut MemoryRenderer, element: &Element) -> HostId {
        let tag = match element.ty() {
            graft_core::element::ElementType::Host(tag) => HostTag::Element(tag),
            _ => HostTag::Text,
        };
        renderer.create_host_node(&HostDescriptor {
            tag,
            props: element.props(),
        })
    }

    #[test]
    fn create_applies_initial_props() {
        let mut r = MemoryRenderer::new();
        let el = Element::host("div").attr("id", "a").style("color", "red");
        let id = create(&mut r, &el);
        assert_eq!(r.attribute(id, "id"), Some(&Value::from("a")));
        assert_eq!(r.style(id, "color"), Some("red"));
        assert_eq!(r.ops(), [HostOp::Create { id, tag: HostTag::Element("div") }]);
    }

    #[test]
    fn update_swaps_listeners() {
        let mut r = MemoryRenderer::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let old = Element::host("button").on("click", || {});
        let new = Element::host("button").on("click", move || h.set(h.get() + 1));
        let id = create(&mut r, &old);
        r.update_host_node(&id, old.props(), new.props());
        assert!(r.dispatch(id, "click"));
        assert_eq!(hits.get(), 1);
        assert!(!r.dispatch(id, "focus"));
    }

    #[test]
    fn text_nodes_expose_their_text() {
        let mut r = MemoryRenderer::new();
        let id = create(&mut r, &Element::text("hi"));
        assert_eq!(r.text(id), Some("hi"));
        assert_eq!(r.snapshot(id), HostSnapshot::Text("hi".into()));
    }

    #[test]
    fn find_by_tag_is_preorder() {
        let mut r = MemoryRenderer::new();
        let root = r.create_container();
        let a = create(&mut r, &Element::host("a"));
        let b1 = create(&mut r, &Element::host("b"));
        let b2 = create(&mut r, &Element::host("b"));
        r.append_host_node(&root, &a);
        r.append_host_node(&a, &b1);
        r.append_host_node(&root, &b2);
        assert_eq!(r.find_by_tag(root, "b"), Some(b1));
        assert_eq!(r.find_by_tag(root, "c"), None);
        assert_eq!(r.parent(b1), Some(a));
    }

    #[test]
    #[should_panic(expected = "host node already detached")]
    fn removing_twice_panics() {
        let mut r = MemoryRenderer::new();
        let root = r.create_container();
        let a = create(&mut r, &Element::host("a"));
        r.append_host_node(&root, &a);
        r.remove_host_node(&root, &a);
        r.remove_host_node(&root, &a);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn appending_twice_panics() {
        let mut r = MemoryRenderer::new();
        let root = r.create_container();
        let a = create(&mut r, &Element::host("a"));
        r.append_host_node(&root, &a);
        r.append_host_node(&root, &a);
    }
}
