// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small logging renderer for in-crate engine tests.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::component::Component;
use crate::element::{Element, Node, TEXT_VALUE};
use crate::host::{HostDescriptor, HostTag, Renderer};
use crate::props::{PropChange, Props, PropsDiff, State, Value};
use crate::queue::Updater;

pub(crate) struct Host {
    pub(crate) label: String,
    pub(crate) children: Vec<u32>,
    pub(crate) parent: Option<u32>,
}

/// Keeps a tree of labels and a log of every call.
#[derive(Default)]
pub(crate) struct LogRenderer {
    pub(crate) hosts: Vec<Host>,
    pub(crate) log: Vec<String>,
}

impl LogRenderer {
    pub(crate) fn with_container() -> (Self, u32) {
        let mut renderer = Self::default();
        renderer.hosts.push(Host {
            label: "root".into(),
            children: Vec::new(),
            parent: None,
        });
        (renderer, 0)
    }

    /// Serializes the subtree under `id` as `label(child,child)`.
    pub(crate) fn dump(&self, id: u32) -> String {
        let host = &self.hosts[id as usize];
        if host.children.is_empty() {
            return host.label.clone();
        }
        let children: Vec<String> = host.children.iter().map(|c| self.dump(*c)).collect();
        format!("{}({})", host.label, children.join(","))
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
    }
}

fn label(tag: HostTag, props: &Props) -> String {
    match tag {
        HostTag::Text => format!(
            "'{}'",
            props.attr(TEXT_VALUE).map(ToString::to_string).unwrap_or_default()
        ),
        HostTag::Element(tag) => match props.attr("id") {
            Some(id) => format!("{tag}#{id}"),
            None => tag.to_string(),
        },
    }
}

impl Renderer for LogRenderer {
    type HostRef = u32;

    fn create_host_node(&mut self, descriptor: &HostDescriptor<'_>) -> u32 {
        let id = u32::try_from(self.hosts.len()).unwrap();
        let label = label(descriptor.tag, descriptor.props);
        self.log.push(format!("create {label}"));
        self.hosts.push(Host {
            label,
            children: Vec::new(),
            parent: None,
        });
        id
    }

    fn update_host_node(&mut self, host: &u32, old_props: &Props, new_props: &Props) {
        let diff = PropsDiff::between(old_props, new_props);
        for change in diff.iter() {
            if let PropChange::SetAttribute(name, value) = change {
                let h = &mut self.hosts[*host as usize];
                if *name == TEXT_VALUE {
                    h.label = format!("'{value}'");
                } else if *name == "id" {
                    let tag = h.label.split('#').next().unwrap_or("").to_string();
                    h.label = format!("{tag}#{value}");
                }
            }
        }
        self.log.push(format!("update {}", self.hosts[*host as usize].label));
    }

    fn append_host_node(&mut self, parent: &u32, child: &u32) {
        assert!(
            self.hosts[*child as usize].parent.is_none(),
            "host node already attached"
        );
        self.hosts[*parent as usize].children.push(*child);
        self.hosts[*child as usize].parent = Some(*parent);
        let line = format!(
            "append {} > {}",
            self.hosts[*parent as usize].label, self.hosts[*child as usize].label
        );
        self.log.push(line);
    }

    fn remove_host_node(&mut self, parent: &u32, child: &u32) {
        let siblings = &mut self.hosts[*parent as usize].children;
        let Some(pos) = siblings.iter().position(|c| c == child) else {
            panic!("host node already detached");
        };
        siblings.remove(pos);
        self.hosts[*child as usize].parent = None;
        let line = format!(
            "remove {} > {}",
            self.hosts[*parent as usize].label, self.hosts[*child as usize].label
        );
        self.log.push(line);
    }
}

/// Renders `<span>{count}</span>`, or nothing while `hidden` is set.
pub(crate) struct Counter;

impl Component for Counter {
    fn create(_props: &Rc<Props>, _updater: Updater) -> Self {
        Self
    }

    fn initial_state(&self) -> State {
        State::from_iter([("count".into(), Value::Int(0))])
    }

    fn render(&self, _props: &Props, state: &State) -> Node {
        if state.get("hidden") == Some(&Value::Bool(true)) {
            return Node::Empty;
        }
        let count = state.get("count").and_then(Value::as_int).unwrap_or(0);
        Element::host("span").child(count).into()
    }
}

/// Renders its `label` attribute as text with no wrapper element.
pub(crate) struct Label;

impl Component for Label {
    fn create(_props: &Rc<Props>, _updater: Updater) -> Self {
        Self
    }

    fn render(&self, props: &Props, _state: &State) -> Node {
        props
            .attr("label")
            .map(ToString::to_string)
            .unwrap_or_default()
            .into()
    }
}
