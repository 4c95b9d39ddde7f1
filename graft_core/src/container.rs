// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render target identification.
//!
//! A container is a host node handed to [`Engine::render_tree`] as the
//! parent for a tree. The engine registers each distinct container once and
//! refers to it by [`ContainerId`] afterwards.
//!
//! [`Engine::render_tree`]: crate::work_loop::Engine::render_tree

use core::fmt;

/// Identifies a registered container.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContainerId(pub u32);

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}
