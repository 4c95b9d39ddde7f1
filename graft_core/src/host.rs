// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The engine never touches a host tree directly. A *renderer* owns the
//! platform side and exposes four primitives through [`Renderer`]:
//!
//! - **Create** a detached host node for an element. The engine calls this
//!   during the render phase, so the node must not be visible until it is
//!   appended.
//!
//! - **Update** a host node from an old props bag to a new one. Renderers
//!   usually apply a [`PropsDiff`](crate::props::PropsDiff) in order.
//!
//! - **Append** a child host node under a parent host node.
//!
//! - **Remove** a child host node from its parent.
//!
//! Append, update, and remove only happen during commit, which runs to
//! completion within a single slice. A renderer therefore sees either none
//! or all of a cycle's visible mutations.
//!
//! # Crate boundaries
//!
//! `graft_core` owns elements, work nodes, reconciliation, scheduling, and
//! this contract. Backend crates (the DOM renderer in `graft_backend_web`,
//! the in-memory renderer in `graft_harness`) implement it. Application code
//! wires an [`Engine`](crate::work_loop::Engine) to a renderer and to a
//! slice source such as an idle callback.

use core::fmt;

use crate::props::Props;

/// The host-side flavour of a host node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostTag {
    /// An element with a tag name.
    Element(&'static str),
    /// A text node; its text is the
    /// [`TEXT_VALUE`](crate::element::TEXT_VALUE) attribute.
    Text,
}

/// What a renderer needs to build a host node.
#[derive(Clone, Copy, Debug)]
pub struct HostDescriptor<'a> {
    /// Element tag or text.
    pub tag: HostTag,
    /// Initial props. Children are ignored; the engine appends them itself.
    pub props: &'a Props,
}

/// Applies engine decisions to a platform-native host tree.
///
/// DOM renderers and in-memory test doubles both implement this trait, so
/// the engine can be driven identically in a browser and in unit tests.
pub trait Renderer {
    /// Owned handle to a host node. Cloning must not copy the node itself.
    type HostRef: Clone + PartialEq + fmt::Debug;

    /// Creates a detached host node initialized from `descriptor`.
    fn create_host_node(&mut self, descriptor: &HostDescriptor<'_>) -> Self::HostRef;

    /// Moves `host` from `old_props` to `new_props`.
    fn update_host_node(&mut self, host: &Self::HostRef, old_props: &Props, new_props: &Props);

    /// Appends `child` as the last child of `parent`.
    fn append_host_node(&mut self, parent: &Self::HostRef, child: &Self::HostRef);

    /// Removes `child` from `parent`.
    ///
    /// Removing a node that is not attached to `parent` is an engine bug;
    /// implementations should fail loudly, at least in debug builds.
    fn remove_host_node(&mut self, parent: &Self::HostRef, child: &Self::HostRef);
}
