// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Components shared by engine tests.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::ToString;

use graft_core::component::Component;
use graft_core::element::{Element, Node};
use graft_core::props::{Props, State, Value};
use graft_core::queue::Updater;

/// A clickable counter.
///
/// Renders `<button id=..>{count}</button>`, or nothing while the state key
/// `hidden` is `true`. The `start` prop sets the initial count and the `id`
/// prop is forwarded to the button.
#[derive(Debug)]
pub struct Counter {
    updater: Updater,
    start: i64,
}

impl Counter {
    /// Reads the count out of a state map.
    #[must_use]
    pub fn count(state: &State) -> i64 {
        state.get("count").and_then(Value::as_int).unwrap_or(0)
    }
}

impl Component for Counter {
    fn create(props: &Rc<Props>, updater: Updater) -> Self {
        let start = props.attr("start").and_then(Value::as_int).unwrap_or(0);
        Self { updater, start }
    }

    fn initial_state(&self) -> State {
        State::from_iter([("count".into(), Value::Int(self.start))])
    }

    fn render(&self, props: &Props, state: &State) -> Node {
        if state.get("hidden").and_then(Value::as_bool) == Some(true) {
            return Node::Empty;
        }
        let count = Self::count(state);
        let updater = self.updater.clone();
        let mut button = Element::host("button")
            .on("click", move || updater.set("count", count + 1))
            .child(count);
        if let Some(id) = props.attr("id") {
            button = button.attr("id", id.clone());
        }
        button.into()
    }
}

/// Renders `Hello, {name}` inside a `p`.
#[derive(Debug)]
pub struct Greeting;

impl Component for Greeting {
    fn create(_props: &Rc<Props>, _updater: Updater) -> Self {
        Self
    }

    fn render(&self, props: &Props, _state: &State) -> Node {
        let name = props.attr("name").and_then(Value::as_str).unwrap_or("world");
        Element::host("p").child(format!("Hello, {name}")).into()
    }
}

/// Renders its own children unchanged, calling its `render` listener each
/// time it renders.
///
/// Wrapping a subtree in a probe makes it observable whether the component
/// was rendered again.
#[derive(Debug)]
pub struct Probe;

impl Component for Probe {
    fn create(_props: &Rc<Props>, _updater: Updater) -> Self {
        Self
    }

    fn render(&self, props: &Props, _state: &State) -> Node {
        if let Some(listener) = props.listeners.get("render") {
            listener.call();
        }
        Node::List(props.children.iter().cloned().map(Node::Element).collect())
    }
}

/// Wraps its children in a `section` titled by its `title` prop.
#[derive(Debug)]
pub struct Panel;

impl Component for Panel {
    fn create(_props: &Rc<Props>, _updater: Updater) -> Self {
        Self
    }

    fn render(&self, props: &Props, _state: &State) -> Node {
        let title = props.attr("title").cloned().unwrap_or(Value::Null);
        Element::host("section")
            .child(Element::host("h1").child(title.to_string()))
            .children(props.children.iter().cloned())
            .into()
    }
}
