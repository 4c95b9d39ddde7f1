// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test support for Graft engines.
//!
//! - [`MemoryRenderer`] keeps the host tree in memory and logs every call.
//! - [`HostSnapshot`] captures a host tree (or the tree a description should
//!   produce) for comparison.
//! - [`drive_in_slices`], [`ManualClock`], and [`SimulatedSlice`] run an
//!   engine under controlled budgets.
//! - [`components`] holds small components used across tests.
//!
//! ```
//! use graft_core::element::Element;
//! use graft_core::work_loop::Engine;
//! use graft_harness::{HostSnapshot, MemoryRenderer, drive_in_slices};
//!
//! let mut renderer = MemoryRenderer::new();
//! let root = renderer.create_container();
//! let mut engine = Engine::new(renderer);
//! let tree = Element::host("div").child("hi");
//! engine.render_tree(tree.clone(), root);
//! drive_in_slices(&mut engine, &[1]);
//! assert_eq!(engine.renderer().content(root), HostSnapshot::expected(tree));
//! ```

#![no_std]

extern crate alloc;

pub mod components;
mod drive;
mod memory;
mod snapshot;

pub use drive::{MAX_SLICES, ManualClock, SimulatedSlice, drive_in_slices, mounted_instances};
pub use memory::{HostId, HostOp, MemoryRenderer};
pub use snapshot::HostSnapshot;
