// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over the direct children of a node.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a, H> {
    store: &'a NodeStore<H>,
    current: u32,
}

impl<'a, H> Children<'a, H> {
    pub(crate) fn new(store: &'a NodeStore<H>, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl<H> Iterator for Children<'_, H> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.handle(idx))
    }
}

/// Pre-order iterator over a node and all of its descendants.
///
/// Walks the child/sibling/parent links without an explicit stack and never
/// leaves the subtree it started in. Created by [`NodeStore::subtree`].
#[derive(Debug)]
pub struct Subtree<'a, H> {
    store: &'a NodeStore<H>,
    root: u32,
    next: u32,
}

impl<'a, H> Subtree<'a, H> {
    pub(crate) fn new(store: &'a NodeStore<H>, root: u32) -> Self {
        Self {
            store,
            root,
            next: root,
        }
    }

    fn advance(&self, from: u32) -> u32 {
        let first = self.store.first_child[from as usize];
        if first != INVALID {
            return first;
        }
        let mut node = from;
        loop {
            if node == self.root {
                return INVALID;
            }
            let sibling = self.store.next_sibling[node as usize];
            if sibling != INVALID {
                return sibling;
            }
            node = self.store.parent[node as usize];
            if node == INVALID {
                return INVALID;
            }
        }
    }
}

impl<H> Iterator for Subtree<'_, H> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next == INVALID {
            return None;
        }
        let idx = self.next;
        self.next = self.advance(idx);
        Some(self.store.handle(idx))
    }
}
