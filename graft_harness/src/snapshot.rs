// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned, comparable pictures of host trees.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use graft_core::element::{Element, ElementType, Node, TEXT_VALUE};

/// A host node and everything attached below it.
///
/// Attribute values are stored in their display form. Listeners are recorded
/// by event name only, since callbacks have no meaningful equality across
/// renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostSnapshot {
    /// An element node.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes, sorted by name.
        attributes: Vec<(String, String)>,
        /// Style declarations, sorted by key.
        style: Vec<(String, String)>,
        /// Event names with a listener, sorted.
        listeners: Vec<String>,
        /// Children in order.
        children: Vec<HostSnapshot>,
    },
    /// A text node.
    Text(String),
}

impl HostSnapshot {
    /// The host tree a description would produce, if it contains no
    /// components.
    ///
    /// # Panics
    ///
    /// Panics on a component element, whose output depends on an instance.
    #[must_use]
    pub fn expected(tree: impl Into<Node>) -> Vec<Self> {
        tree.into().into_elements().iter().map(Self::of_element).collect()
    }

    fn of_element(element: &Element) -> Self {
        let props = element.props();
        match element.ty() {
            ElementType::Text => Self::Text(
                props
                    .attr(TEXT_VALUE)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ),
            ElementType::Host(tag) => Self::Element {
                tag: tag.into(),
                attributes: props
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
                style: props
                    .style
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                listeners: props.listeners.keys().cloned().collect(),
                children: props.children.iter().map(Self::of_element).collect(),
            },
            ElementType::Component(ty) => {
                panic!("cannot predict host output of component {}", ty.name())
            }
        }
    }

    /// Children of an element, or nothing for text.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }
}

impl fmt::Display for HostSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Element {
                tag,
                attributes,
                style,
                listeners,
                children,
            } => {
                write!(f, "<{tag}")?;
                for (name, value) in attributes {
                    write!(f, " {name}=\"{value}\"")?;
                }
                if !style.is_empty() {
                    f.write_str(" style=\"")?;
                    for (key, value) in style {
                        write!(f, "{key}:{value};")?;
                    }
                    f.write_str("\"")?;
                }
                for event in listeners {
                    write!(f, " on{event}")?;
                }
                if children.is_empty() {
                    return f.write_str("/>");
                }
                f.write_str(">")?;
                for child in children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{tag}>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn display_is_markup_like() {
        let tree = Element::host("div")
            .attr("id", "a")
            .style("color", "red")
            .on("click", || {})
            .child("hi")
            .child(Element::host("br"));
        let snap = HostSnapshot::expected(tree);
        assert_eq!(
            format!("{}", snap[0]),
            "<div id=\"a\" style=\"color:red;\" onclick>hi<br/></div>"
        );
    }

    #[test]
    fn expected_flattens_lists() {
        let snap = HostSnapshot::expected(alloc::vec!["a", "b"]);
        assert_eq!(
            snap,
            [HostSnapshot::Text("a".into()), HostSnapshot::Text("b".into())]
        );
        assert!(snap[0].children().is_empty(), "text has no children");
    }
}
