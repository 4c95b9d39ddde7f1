// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative elements and child normalization.
//!
//! An [`Element`] is an immutable description of one node of the desired
//! tree: a type (host tag, text, or component) plus shared [`Props`].
//! Children are normalized when they are attached, so every element stored
//! in `Props::children` is a real element:
//!
//! - `Node::Empty` and `false` produce nothing.
//! - Strings, numbers, and `true` become text elements whose text lives in
//!   the [`TEXT_VALUE`] attribute.
//! - Lists are flattened in order.
//!
//! ```
//! use graft_core::element::Element;
//!
//! let tree = Element::host("div")
//!     .attr("id", "greeting")
//!     .child("hello ")
//!     .child(Element::host("b").child("world"))
//!     .child(false);
//! assert_eq!(tree.props().children.len(), 2);
//! ```

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::component::{Component, ComponentType};
use crate::props::{Listener, Props, Value};

/// Attribute holding the text of a text element.
pub const TEXT_VALUE: &str = "nodeValue";

/// What kind of thing an element describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// A host element with the given tag.
    Host(&'static str),
    /// A host text node.
    Text,
    /// A user component.
    Component(ComponentType),
}

/// An immutable description of one node in the desired tree.
#[derive(Clone)]
pub struct Element {
    ty: ElementType,
    props: Rc<Props>,
}

impl Element {
    /// Creates an element from a type and an existing props bag.
    #[must_use]
    pub fn new(ty: ElementType, props: Rc<Props>) -> Self {
        Self { ty, props }
    }

    /// A host element with no attributes or children.
    #[must_use]
    pub fn host(tag: &'static str) -> Self {
        Self::new(ElementType::Host(tag), Rc::default())
    }

    /// A text element.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        let mut props = Props::default();
        props
            .attributes
            .insert(TEXT_VALUE.into(), Value::Str(value.into()));
        Self::new(ElementType::Text, Rc::new(props))
    }

    /// A component element with empty props.
    #[must_use]
    pub fn component<C: Component>() -> Self {
        Self::new(ElementType::Component(ComponentType::of::<C>()), Rc::default())
    }

    /// The element type.
    #[must_use]
    pub fn ty(&self) -> ElementType {
        self.ty
    }

    /// The shared props bag.
    #[must_use]
    pub fn props(&self) -> &Rc<Props> {
        &self.props
    }

    /// The text of a text element.
    #[must_use]
    pub fn text_value(&self) -> Option<&str> {
        match self.ty {
            ElementType::Text => self.props.attr(TEXT_VALUE).and_then(Value::as_str),
            _ => None,
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Rc::make_mut(&mut self.props)
            .attributes
            .insert(name.into(), value.into());
        self
    }

    /// Attaches an event listener.
    #[must_use]
    pub fn on(mut self, event: impl Into<String>, callback: impl Fn() + 'static) -> Self {
        Rc::make_mut(&mut self.props)
            .listeners
            .insert(event.into(), Listener::new(callback));
        self
    }

    /// Sets an inline style declaration.
    #[must_use]
    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Rc::make_mut(&mut self.props)
            .style
            .insert(key.into(), value.into());
        self
    }

    /// Appends a child after normalizing it.
    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        normalize_into(child.into(), &mut Rc::make_mut(&mut self.props).children);
        self
    }

    /// Appends several children after normalizing them.
    #[must_use]
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        let out = &mut Rc::make_mut(&mut self.props).children;
        for child in children {
            normalize_into(child.into(), out);
        }
        self
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            ElementType::Text => write!(f, "Text({:?})", self.text_value().unwrap_or("")),
            _ => f
                .debug_struct("Element")
                .field("ty", &self.ty)
                .field("props", &self.props)
                .finish(),
        }
    }
}

/// Anything that can appear as a child or as a render result.
#[derive(Clone, Debug, Default)]
pub enum Node {
    /// Produces nothing.
    #[default]
    Empty,
    /// A single element.
    Element(Element),
    /// Text that becomes a text element.
    Text(String),
    /// Several children, flattened in order.
    List(Vec<Node>),
}

impl Node {
    /// Normalizes this node into a flat list of elements.
    #[must_use]
    pub fn into_elements(self) -> Vec<Element> {
        let mut out = Vec::new();
        normalize_into(self, &mut out);
        out
    }
}

/// Appends the normalized form of `node` to `out`.
pub fn normalize_into(node: Node, out: &mut Vec<Element>) {
    match node {
        Node::Empty => {}
        Node::Element(element) => out.push(element),
        Node::Text(text) => out.push(Element::text(text)),
        Node::List(nodes) => {
            for node in nodes {
                normalize_into(node, out);
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// `false` is dropped; `true` renders as the text `"true"`.
impl From<bool> for Node {
    fn from(value: bool) -> Self {
        if value { Self::Text("true".into()) } else { Self::Empty }
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Self::Text(format!("{value}"))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Text(format!("{value}"))
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Self::Text(format!("{value}"))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Text(format!("{value}"))
    }
}

impl From<()> for Node {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl<T: Into<Self>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Node {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn primitives_become_text_elements() {
        let el = Element::host("p").child("a").child(3).child(true).child(1.5);
        let texts: Vec<_> = el
            .props()
            .children
            .iter()
            .map(|c| c.text_value().unwrap_or("?"))
            .collect();
        assert_eq!(texts, ["a", "3", "true", "1.5"]);
    }

    #[test]
    fn empty_and_false_are_dropped() {
        let el = Element::host("p")
            .child(false)
            .child(Node::Empty)
            .child(None::<Element>)
            .child(());
        assert!(el.props().children.is_empty());
    }

    #[test]
    fn nested_lists_flatten_in_order() {
        let node = Node::List(vec![
            "a".into(),
            Node::List(vec!["b".into(), Node::Empty, "c".into()]),
            Element::host("i").into(),
        ]);
        let out = node.into_elements();
        assert_eq!(out.len(), 4);
        assert_eq!(out[1].text_value(), Some("b"));
        assert_eq!(out[3].ty(), ElementType::Host("i"));
    }

    #[test]
    fn builder_does_not_touch_shared_props() {
        let base = Element::host("div").attr("id", "a");
        let shared = base.props().clone();
        let changed = base.clone().attr("id", "b");
        assert_eq!(shared.attr("id"), Some(&Value::from("a")));
        assert_eq!(changed.props().attr("id"), Some(&Value::from("b")));
        assert!(Rc::ptr_eq(base.props(), &shared), "original keeps its bag");
    }

    #[test]
    fn children_accepts_iterators() {
        let el = Element::host("ul").children((0..3).map(|i| Element::host("li").child(i)));
        assert_eq!(el.props().children.len(), 3);
        assert_eq!(el.props().children[2].props().children[0].text_value(), Some("2"));
    }
}
