// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental tree reconciliation with interruptible render and atomic commit.
//!
//! `graft_core` keeps a host tree (DOM nodes, an in-memory tree, anything a
//! [`Renderer`](host::Renderer) can drive) in sync with a declarative element
//! tree. It is `no_std` compatible (with `alloc`) and stores its work nodes
//! struct-of-arrays behind generational handles.
//!
//! # Architecture
//!
//! ```text
//!   render_tree / Updater::set_state
//!       │
//!       ▼
//!   UpdateQueue ──► begin cycle ──► units of work ──► completed root
//!                        ▲          (yield between      │
//!                        │           any two units)     ▼
//!                   Deadline ◄──── perform_work     commit ──► Renderer
//! ```
//!
//! **[`element`]**: Elements, child normalization, and the [`Node`] render
//! result type.
//!
//! **[`props`]**: Props bags, component state, and the ordered
//! [`PropsDiff`](props::PropsDiff) renderers apply.
//!
//! **[`node`]**: Work nodes in a [`NodeStore`](node::NodeStore), with the
//! current and work-in-progress trees linked through `alternate`.
//!
//! **[`queue`]**: The shared FIFO of update requests and the per-instance
//! [`Updater`](queue::Updater).
//!
//! **[`component`]**: The [`Component`](component::Component) trait and the
//! instance store.
//!
//! **[`work_loop`]**: The [`Engine`](work_loop::Engine): request intake,
//! resumable depth-first traversal, and child reconciliation.
//!
//! **[`commit`]**: Effect application and commit reports.
//!
//! **[`scheduler`]**: Slice deadlines and loop configuration.
//!
//! **[`host`]**: The renderer contract backends implement.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) and event types, with a
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Adds `InstantDeadline`, a slice deadline
//!   on `std::time::Instant`.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Adds per-unit and
//!   per-effect events.
//!
//! [`Node`]: element::Node

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod commit;
pub mod component;
pub mod container;
pub mod element;
pub mod host;
pub mod node;
pub mod props;
pub mod queue;
mod reconcile;
pub mod scheduler;
pub mod time;
pub mod trace;
pub mod work_loop;

#[cfg(test)]
mod testing;
