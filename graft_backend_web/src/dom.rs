// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM node management.
//!
//! [`DomRenderer`] creates elements and text nodes through a [`Document`],
//! applies [`PropsDiff`] changes to them, and keeps the JS closures behind
//! event listeners alive for as long as the node stays in the document.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use graft_core::element::TEXT_VALUE;
use graft_core::host::{HostDescriptor, HostTag, Renderer};
use graft_core::props::{Listener, PropChange, Props, PropsDiff, Value};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement, Node};

/// A listener registered on a DOM node.
struct Binding {
    node: Node,
    event: String,
    listener: Listener,
    closure: Closure<dyn FnMut()>,
}

impl Binding {
    fn detach(&self) {
        let _ = self
            .node
            .remove_event_listener_with_callback(&self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// A [`Renderer`] whose host nodes are live DOM nodes.
pub struct DomRenderer {
    document: Document,
    bindings: Vec<Binding>,
}

impl core::fmt::Debug for DomRenderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomRenderer")
            .field("document", &"Document")
            .field("bindings_len", &self.bindings.len())
            .finish()
    }
}

impl DomRenderer {
    /// Creates a renderer that builds nodes in `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            bindings: Vec::new(),
        }
    }

    /// Returns the document nodes are created in.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of listeners currently installed.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.bindings.len()
    }

    fn apply(&mut self, node: &Node, diff: PropsDiff<'_>) {
        for change in diff {
            match change {
                PropChange::RemoveListener { event, listener } => {
                    let found = self.bindings.iter().position(|b| {
                        b.node == *node && b.event == *event && b.listener == *listener
                    });
                    if let Some(pos) = found {
                        self.bindings.swap_remove(pos).detach();
                    }
                }
                PropChange::RemoveAttribute(name) => {
                    if name == TEXT_VALUE {
                        node.set_node_value(None);
                    } else if let Some(el) = node.dyn_ref::<Element>() {
                        let _ = el.remove_attribute(name);
                    }
                }
                PropChange::SetAttribute(name, value) => set_attribute(node, name, value),
                PropChange::AddListener { event, listener } => {
                    let callback = listener.clone();
                    let closure =
                        Closure::wrap(Box::new(move || callback.call()) as Box<dyn FnMut()>);
                    let _ = node
                        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
                    self.bindings.push(Binding {
                        node: node.clone(),
                        event: event.into(),
                        listener: listener.clone(),
                        closure,
                    });
                }
                PropChange::SetStyle(key, value) => {
                    if let Some(el) = node.dyn_ref::<HtmlElement>() {
                        let _ = el.style().set_property(key, value);
                    }
                }
                PropChange::RemoveStyle(key) => {
                    if let Some(el) = node.dyn_ref::<HtmlElement>() {
                        let _ = el.style().remove_property(key);
                    }
                }
            }
        }
    }
}

fn set_attribute(node: &Node, name: &str, value: &Value) {
    if name == TEXT_VALUE {
        node.set_node_value(Some(&value.to_string()));
        return;
    }
    let Some(el) = node.dyn_ref::<Element>() else {
        return;
    };
    // Boolean attributes are present or absent.
    let _ = match value {
        Value::Null | Value::Bool(false) => el.remove_attribute(name),
        Value::Bool(true) => el.set_attribute(name, ""),
        other => el.set_attribute(name, &other.to_string()),
    };
}

impl Renderer for DomRenderer {
    type HostRef = Node;

    fn create_host_node(&mut self, descriptor: &HostDescriptor<'_>) -> Node {
        let node: Node = match descriptor.tag {
            HostTag::Element(tag) => match self.document.create_element(tag) {
                Ok(el) => el.unchecked_into(),
                Err(err) => panic!("cannot create <{tag}>: {err:?}"),
            },
            HostTag::Text => self.document.create_text_node("").unchecked_into(),
        };
        self.apply(&node, PropsDiff::initial(descriptor.props));
        node
    }

    fn update_host_node(&mut self, host: &Node, old_props: &Props, new_props: &Props) {
        self.apply(host, PropsDiff::between(old_props, new_props));
    }

    fn append_host_node(&mut self, parent: &Node, child: &Node) {
        if let Err(err) = parent.append_child(child) {
            panic!("cannot append host node: {err:?}");
        }
    }

    fn remove_host_node(&mut self, parent: &Node, child: &Node) {
        if parent.remove_child(child).is_err() {
            panic!("host node already detached");
        }
        // Listeners inside the removed subtree die with it.
        self.bindings.retain(|b| {
            let gone = child.contains(Some(&b.node));
            if gone {
                b.detach();
            }
            !gone
        });
    }
}
