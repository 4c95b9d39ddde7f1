// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What a work node stands for, and the effect tags it can carry.

use crate::component::{ComponentType, InstanceId};
use crate::container::ContainerId;
use crate::element::ElementType;
use crate::host::HostTag;

use super::NodeId;

/// The three roles a work node can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Owns one host node (an element or a text node).
    HostLeaf,
    /// Owns a component instance and has no host node of its own.
    Component,
    /// The top of a tree; its host node is the container.
    Root,
}

/// Type-specific payload of a work node.
///
/// `H` is the renderer's host handle. Reused nodes clone the payload of their
/// alternate, so the host handle or instance is shared across generations.
#[derive(Clone, Debug)]
pub enum NodeKind<H> {
    /// Tree root for a container.
    Root {
        /// The container this tree renders into.
        container: ContainerId,
    },
    /// Host element or text node.
    Host {
        /// Element tag or text.
        tag: HostTag,
        /// Host handle, created during the render phase and mounted at commit.
        host: Option<H>,
    },
    /// User component.
    Component {
        /// Component type.
        ty: ComponentType,
        /// Instance, created the first time the node is worked on.
        instance: Option<InstanceId>,
    },
}

impl<H> NodeKind<H> {
    /// A fresh payload for an element of type `ty`.
    #[must_use]
    pub fn for_element(ty: ElementType) -> Self {
        match ty {
            ElementType::Host(tag) => Self::Host {
                tag: HostTag::Element(tag),
                host: None,
            },
            ElementType::Text => Self::Host {
                tag: HostTag::Text,
                host: None,
            },
            ElementType::Component(ty) => Self::Component { ty, instance: None },
        }
    }

    /// The node's role.
    #[must_use]
    pub fn role(&self) -> NodeRole {
        match self {
            Self::Root { .. } => NodeRole::Root,
            Self::Host { .. } => NodeRole::HostLeaf,
            Self::Component { .. } => NodeRole::Component,
        }
    }

    /// The element type this node was built from. Roots have none.
    #[must_use]
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            Self::Root { .. } => None,
            Self::Host {
                tag: HostTag::Element(tag),
                ..
            } => Some(ElementType::Host(tag)),
            Self::Host {
                tag: HostTag::Text, ..
            } => Some(ElementType::Text),
            Self::Component { ty, .. } => Some(ElementType::Component(*ty)),
        }
    }

    /// Whether an element of type `ty` can reuse this node.
    #[must_use]
    pub fn matches(&self, ty: ElementType) -> bool {
        self.element_type() == Some(ty)
    }

    /// The host handle, if this is a host node that has one.
    #[must_use]
    pub fn host(&self) -> Option<&H> {
        match self {
            Self::Host { host, .. } => host.as_ref(),
            _ => None,
        }
    }

    /// The component instance, if this is a component node that has one.
    #[must_use]
    pub fn instance(&self) -> Option<InstanceId> {
        match self {
            Self::Component { instance, .. } => *instance,
            _ => None,
        }
    }
}

/// Host-tree mutation scheduled for the commit phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Attach a new host node under its mount parent.
    Place,
    /// Patch an existing host node's properties.
    Update,
    /// Detach an old subtree from the host tree.
    Delete,
}

/// One entry of a node's collected effect list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Effect {
    /// What to do.
    pub kind: EffectKind,
    /// The node it applies to. Deletions point into the old tree.
    pub node: NodeId,
}
