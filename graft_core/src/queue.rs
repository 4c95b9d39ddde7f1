// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The FIFO of pending update requests.
//!
//! Requests come from two places: the application calling
//! [`Engine::render_tree`](crate::work_loop::Engine::render_tree), and
//! component instances calling [`Updater::set_state`]. Both may happen at any
//! time, including from inside an event listener while a render cycle is
//! suspended, so the queue is a shared handle rather than a field behind
//! `&mut Engine`.
//!
//! The engine drains one request per render cycle. A request enqueued while a
//! cycle is in progress waits for the next cycle.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::component::InstanceId;
use crate::container::ContainerId;
use crate::props::{Props, State, Value};

/// A request for a render cycle.
#[derive(Clone, Debug)]
pub enum UpdateRequest {
    /// Render a new element tree into a container.
    RootRender {
        /// Target container.
        container: ContainerId,
        /// Root props; `children` holds the normalized tree.
        props: Rc<Props>,
    },
    /// Merge partial state into a component instance and re-render it.
    InstanceUpdate {
        /// Target instance.
        instance: InstanceId,
        /// Keys to overwrite in the instance state.
        partial_state: State,
    },
}

impl UpdateRequest {
    /// Where the request came from.
    #[must_use]
    pub fn origin(&self) -> UpdateOrigin {
        match self {
            Self::RootRender { .. } => UpdateOrigin::Root,
            Self::InstanceUpdate { .. } => UpdateOrigin::Instance,
        }
    }
}

/// The source of an [`UpdateRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateOrigin {
    /// [`Engine::render_tree`](crate::work_loop::Engine::render_tree).
    Root,
    /// [`Updater::set_state`].
    Instance,
}

#[derive(Default)]
struct QueueInner {
    requests: RefCell<VecDeque<UpdateRequest>>,
    waker: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Shared handle to the update FIFO.
///
/// Clones refer to the same queue. An optional waker is invoked after every
/// enqueue so a host loop can schedule a slice when work arrives.
#[derive(Clone, Default)]
pub struct UpdateQueue {
    inner: Rc<QueueInner>,
}

impl UpdateQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request and wakes the host loop.
    pub fn enqueue(&self, request: UpdateRequest) {
        self.inner.requests.borrow_mut().push_back(request);
        let waker = self.inner.waker.borrow().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    /// Removes the oldest request.
    pub fn dequeue(&self) -> Option<UpdateRequest> {
        self.inner.requests.borrow_mut().pop_front()
    }

    /// Number of waiting requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.requests.borrow().len()
    }

    /// Returns `true` if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.requests.borrow().is_empty()
    }

    /// Installs the callback run after each enqueue, replacing any previous one.
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        *self.inner.waker.borrow_mut() = Some(Rc::new(waker));
    }

    /// Removes the waker.
    pub fn clear_waker(&self) {
        self.inner.waker.borrow_mut().take();
    }
}

impl fmt::Debug for UpdateQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("requests", &self.inner.requests.borrow())
            .field("waker", &self.inner.waker.borrow().is_some())
            .finish()
    }
}

/// A component's handle for requesting state changes.
///
/// Each instance receives one at construction time. It stays valid after the
/// instance is unmounted, but requests for a released instance are dropped
/// when they reach the front of the queue.
#[derive(Clone, Debug)]
pub struct Updater {
    queue: UpdateQueue,
    instance: InstanceId,
}

impl Updater {
    pub(crate) fn new(queue: UpdateQueue, instance: InstanceId) -> Self {
        Self { queue, instance }
    }

    /// The instance this updater belongs to.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Requests that `partial` be merged into the instance state.
    pub fn set_state(&self, partial: State) {
        self.queue.enqueue(UpdateRequest::InstanceUpdate {
            instance: self.instance,
            partial_state: partial,
        });
    }

    /// Requests a single-key state change.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let mut partial = State::new();
        partial.insert(key.into(), value.into());
        self.set_state(partial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn fifo_order() {
        let queue = UpdateQueue::new();
        for i in 0..3 {
            queue.enqueue(UpdateRequest::RootRender {
                container: ContainerId(i),
                props: Rc::default(),
            });
        }
        assert_eq!(queue.len(), 3);
        for i in 0..3 {
            match queue.dequeue() {
                Some(UpdateRequest::RootRender { container, .. }) => {
                    assert_eq!(container, ContainerId(i));
                }
                other => panic!("unexpected request: {other:?}"),
            }
        }
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn clones_share_the_queue_and_wake() {
        let queue = UpdateQueue::new();
        let woken = Rc::new(Cell::new(0));
        let w = woken.clone();
        queue.set_waker(move || w.set(w.get() + 1));

        let updater = Updater::new(queue.clone(), InstanceId::new(4, 0));
        updater.set("count", 1);
        updater.set("count", 2);

        assert_eq!(woken.get(), 2);
        assert_eq!(queue.len(), 2);
        match queue.dequeue() {
            Some(UpdateRequest::InstanceUpdate {
                instance,
                partial_state,
            }) => {
                assert_eq!(instance, updater.instance());
                assert_eq!(partial_state.get("count"), Some(&Value::Int(1)));
            }
            other => panic!("unexpected request: {other:?}"),
        }

        queue.clear_waker();
        updater.set("count", 3);
        assert_eq!(woken.get(), 2, "cleared waker is not called");
    }

    #[test]
    fn waker_may_enqueue() {
        let queue = UpdateQueue::new();
        let inner = queue.clone();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        queue.set_waker(move || {
            if !f.replace(true) {
                inner.enqueue(UpdateRequest::RootRender {
                    container: ContainerId(9),
                    props: Rc::default(),
                });
            }
        });
        queue.enqueue(UpdateRequest::RootRender {
            container: ContainerId(1),
            props: Rc::default(),
        });
        assert_eq!(queue.len(), 2);
    }
}
