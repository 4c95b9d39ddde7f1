// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Work nodes: the engine's mutable shadow of the element tree.
//!
//! Every container has a *current* tree that mirrors what the host shows.
//! A render cycle builds a *work-in-progress* tree next to it, linking each
//! new node to the node it replaces through `alternate`. The commit phase
//! swaps the two and frees the old generation.
//!
//! Nodes are stored struct-of-arrays in a [`NodeStore`] and addressed by
//! generational [`NodeId`] handles.

mod id;
mod kind;
mod store;
mod traverse;

pub use id::{INVALID, NodeId};
pub use kind::{Effect, EffectKind, NodeKind, NodeRole};
pub use store::NodeStore;
pub use traverse::{Children, Subtree};
