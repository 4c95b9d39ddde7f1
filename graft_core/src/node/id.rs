// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Work node identity.

use core::fmt;

/// Sentinel for "no node" in the link arrays.
pub const INVALID: u32 = u32::MAX;

/// A handle to a work node in a [`NodeStore`](super::NodeStore).
///
/// Slots are recycled once a tree generation has been committed away; the
/// generation counter makes handles into the freed generation fail loudly
/// instead of aliasing a newer node.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Raw slot index, for diagnostics and trace payloads.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Generation counter of the slot when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}
