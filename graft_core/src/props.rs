// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element properties, component state, and property diffs.
//!
//! [`Props`] is the immutable bag an element carries: attributes, event
//! listeners, inline style, and already-normalized children. Elements share
//! their props through an `Rc`, so "the props did not change" is answered by
//! pointer identity rather than deep comparison.
//!
//! [`PropsDiff`] lists the host mutations needed to move a host node from one
//! props bag to another. Renderers apply it in order.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::element::Element;

/// Component state: a string-keyed map merged shallowly by updates.
pub type State = hashbrown::HashMap<String, Value>;

/// Scalar attribute or state value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Explicit absence.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String.
    Str(String),
}

impl Value {
    /// Returns the integer payload, if this is an [`Int`](Self::Int).
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a [`Str`](Self::Str).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a [`Bool`](Self::Bool).
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Host-facing text form. `Null` renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// An event callback.
///
/// Two listeners are equal only if they are the same allocation, matching how
/// hosts decide whether a handler must be swapped.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn()>);

impl Listener {
    /// Wraps a callback.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invokes the callback.
    pub fn call(&self) {
        (self.0)();
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// The property bag of an element.
#[derive(Clone, Default)]
pub struct Props {
    /// Plain attributes, keyed by name.
    pub attributes: BTreeMap<String, Value>,
    /// Event listeners, keyed by event type (`"click"`, not `"onClick"`).
    pub listeners: BTreeMap<String, Listener>,
    /// Inline style declarations.
    pub style: BTreeMap<String, String>,
    /// Normalized children.
    pub children: Vec<Element>,
}

impl Props {
    /// Shorthand for an attribute lookup.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("attributes", &self.attributes)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .field("style", &self.style)
            .field("children", &self.children)
            .finish()
    }
}

/// One host mutation produced by [`PropsDiff`].
#[derive(Clone, Debug, PartialEq)]
pub enum PropChange<'a> {
    /// Detach a listener that was removed or replaced.
    RemoveListener {
        /// Event type.
        event: &'a str,
        /// The listener previously attached.
        listener: &'a Listener,
    },
    /// Clear an attribute absent from the new props.
    RemoveAttribute(&'a str),
    /// Set an attribute that is new or changed.
    SetAttribute(&'a str, &'a Value),
    /// Attach a listener that is new or replaced.
    AddListener {
        /// Event type.
        event: &'a str,
        /// The listener to attach.
        listener: &'a Listener,
    },
    /// Set a style declaration that is new or changed.
    SetStyle(&'a str, &'a str),
    /// Clear a style declaration absent from the new props.
    RemoveStyle(&'a str),
}

/// Ordered host mutations between two props bags.
///
/// The order is fixed: stale listeners are detached first, then removed
/// attributes are cleared, new and changed attributes are set, new listeners
/// are attached, and finally style keys are set and cleared. Children are not
/// part of the diff; the reconciler handles them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropsDiff<'a> {
    changes: Vec<PropChange<'a>>,
}

impl<'a> PropsDiff<'a> {
    /// Computes the changes that turn `old` into `new`.
    #[must_use]
    pub fn between(old: &'a Props, new: &'a Props) -> Self {
        let mut changes = Vec::new();

        for (event, listener) in &old.listeners {
            if new.listeners.get(event) != Some(listener) {
                changes.push(PropChange::RemoveListener { event, listener });
            }
        }
        for name in old.attributes.keys() {
            if !new.attributes.contains_key(name) {
                changes.push(PropChange::RemoveAttribute(name));
            }
        }
        for (name, value) in &new.attributes {
            if old.attributes.get(name) != Some(value) {
                changes.push(PropChange::SetAttribute(name, value));
            }
        }
        for (event, listener) in &new.listeners {
            if old.listeners.get(event) != Some(listener) {
                changes.push(PropChange::AddListener { event, listener });
            }
        }
        for (key, value) in &new.style {
            if old.style.get(key) != Some(value) {
                changes.push(PropChange::SetStyle(key, value));
            }
        }
        for key in old.style.keys() {
            if !new.style.contains_key(key) {
                changes.push(PropChange::RemoveStyle(key));
            }
        }

        Self { changes }
    }

    /// Changes needed to initialize a fresh host node from `props`.
    #[must_use]
    pub fn initial(props: &'a Props) -> Self {
        let mut changes = Vec::with_capacity(
            props.attributes.len() + props.listeners.len() + props.style.len(),
        );
        changes.extend(
            props
                .attributes
                .iter()
                .map(|(name, value)| PropChange::SetAttribute(name, value)),
        );
        changes.extend(
            props
                .listeners
                .iter()
                .map(|(event, listener)| PropChange::AddListener { event, listener }),
        );
        changes.extend(
            props
                .style
                .iter()
                .map(|(key, value)| PropChange::SetStyle(key, value)),
        );
        Self { changes }
    }

    /// Returns `true` if nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterates the changes in application order.
    pub fn iter(&self) -> core::slice::Iter<'_, PropChange<'a>> {
        self.changes.iter()
    }
}

impl<'a> IntoIterator for PropsDiff<'a> {
    type Item = PropChange<'a>;
    type IntoIter = alloc::vec::IntoIter<PropChange<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn props(attrs: &[(&str, Value)]) -> Props {
        let mut p = Props::default();
        for (k, v) in attrs {
            p.attributes.insert(k.to_string(), v.clone());
        }
        p
    }

    #[test]
    fn identical_props_produce_no_changes() {
        let listener = Listener::new(|| {});
        let mut a = props(&[("id", "x".into())]);
        a.listeners.insert("click".into(), listener.clone());
        a.style.insert("color".into(), "red".into());
        let b = a.clone();
        assert!(PropsDiff::between(&a, &b).is_empty());
    }

    #[test]
    fn diff_follows_fixed_order() {
        let keep = Listener::new(|| {});
        let old_click = Listener::new(|| {});
        let new_click = Listener::new(|| {});

        let mut old = props(&[("id", "a".into()), ("title", "t".into())]);
        old.listeners.insert("click".into(), old_click.clone());
        old.listeners.insert("focus".into(), keep.clone());
        old.style.insert("color".into(), "red".into());
        old.style.insert("margin".into(), "0".into());

        let mut new = props(&[("id", "b".into())]);
        new.listeners.insert("click".into(), new_click.clone());
        new.listeners.insert("focus".into(), keep);
        new.style.insert("color".into(), "blue".into());

        let diff = PropsDiff::between(&old, &new);
        let changes: Vec<_> = diff.iter().cloned().collect();
        assert_eq!(
            changes,
            [
                PropChange::RemoveListener {
                    event: "click",
                    listener: &old_click
                },
                PropChange::RemoveAttribute("title"),
                PropChange::SetAttribute("id", &Value::Str("b".into())),
                PropChange::AddListener {
                    event: "click",
                    listener: &new_click
                },
                PropChange::SetStyle("color", "blue"),
                PropChange::RemoveStyle("margin"),
            ]
        );
    }

    #[test]
    fn initial_sets_everything() {
        let mut p = props(&[("id", "x".into()), ("n", 3.into())]);
        p.style.insert("color".into(), "red".into());
        p.listeners.insert("click".into(), Listener::new(|| {}));
        let diff = PropsDiff::initial(&p);
        assert_eq!(diff.len(), 4);
        assert!(
            diff.iter()
                .all(|c| !matches!(c, PropChange::RemoveAttribute(_) | PropChange::RemoveListener { .. } | PropChange::RemoveStyle(_))),
            "a fresh node has nothing to remove"
        );
    }

    #[test]
    fn listener_equality_is_identity() {
        let a = Listener::new(|| {});
        let b = Listener::new(|| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn value_display_is_host_text() {
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
    }
}
