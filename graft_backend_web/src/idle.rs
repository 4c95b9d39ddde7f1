// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestIdleCallback` work loop.
//!
//! [`IdleLoop`] owns an [`Engine`] and runs it in browser idle periods. Each
//! callback receives an [`IdleDeadline`], wrapped as an [`IdleSlice`], and
//! the loop asks for another idle period while work remains. Enqueuing a
//! request through the engine's queue (a `render_tree` call or a component
//! `Updater`) wakes the loop when it is asleep.
//!
//! [`IdleDeadline`]: web_sys::IdleDeadline

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use graft_core::container::ContainerId;
use graft_core::element::Node;
use graft_core::host::Renderer;
use graft_core::scheduler::Deadline;
use graft_core::time::{Duration, HostTime};
use graft_core::work_loop::Engine;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::IdleDeadline;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestIdleCallback")]
    fn request_idle_callback(callback: &JsValue) -> u32;

    #[wasm_bindgen(js_name = "cancelIdleCallback")]
    fn cancel_idle_callback(handle: u32);
}

/// A [`Deadline`] backed by the browser's idle period.
#[derive(Debug)]
pub struct IdleSlice<'a> {
    deadline: &'a IdleDeadline,
}

impl<'a> IdleSlice<'a> {
    /// Wraps the deadline handed to an idle callback.
    #[must_use]
    pub fn new(deadline: &'a IdleDeadline) -> Self {
        Self { deadline }
    }
}

impl Deadline for IdleSlice<'_> {
    fn time_remaining(&mut self) -> Duration {
        Duration(crate::ms_to_ticks(self.deadline.time_remaining()))
    }

    fn now(&self) -> HostTime {
        crate::now()
    }
}

type IdleClosure = Closure<dyn FnMut(IdleDeadline)>;

struct IdleInner<R: Renderer> {
    engine: RefCell<Engine<R>>,
    /// The JS closure registered with `requestIdleCallback`.
    closure: RefCell<Option<IdleClosure>>,
    /// Whether a callback is currently requested.
    scheduled: Cell<bool>,
    /// Handle of the most recent request, for cancellation.
    handle: Cell<u32>,
}

impl<R: Renderer> IdleInner<R> {
    fn schedule(&self) {
        if self.scheduled.get() {
            return;
        }
        if let Some(closure) = &*self.closure.borrow() {
            self.scheduled.set(true);
            self.handle
                .set(request_idle_callback(closure.as_ref().unchecked_ref()));
        }
    }
}

/// Runs an [`Engine`] in browser idle periods.
///
/// Pair it with [`WorkLoopConfig::web`] so that each idle period keeps a
/// millisecond in reserve and handles one request.
///
/// [`WorkLoopConfig::web`]: graft_core::scheduler::WorkLoopConfig::web
pub struct IdleLoop<R: Renderer + 'static> {
    inner: Rc<IdleInner<R>>,
}

impl<R: Renderer + 'static> IdleLoop<R> {
    /// Takes over `engine` and installs a waker on its queue.
    pub fn new(engine: Engine<R>) -> Self {
        let inner = Rc::new(IdleInner {
            engine: RefCell::new(engine),
            closure: RefCell::new(None),
            scheduled: Cell::new(false),
            handle: Cell::new(0),
        });

        let weak: Weak<IdleInner<R>> = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |deadline: IdleDeadline| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.scheduled.set(false);
            let status = inner
                .engine
                .borrow_mut()
                .perform_work(&mut IdleSlice::new(&deadline));
            if status.is_pending() {
                inner.schedule();
            }
        }) as Box<dyn FnMut(IdleDeadline)>);
        *inner.closure.borrow_mut() = Some(closure);

        let weak = Rc::downgrade(&inner);
        inner.engine.borrow().queue().set_waker(move || {
            if let Some(inner) = weak.upgrade() {
                inner.schedule();
            }
        });
        if !inner.engine.borrow().is_idle() {
            inner.schedule();
        }

        Self { inner }
    }

    /// Requests that `tree` become the content of `container`. The work
    /// happens in later idle periods.
    pub fn render_tree(&self, tree: impl Into<Node>, container: R::HostRef) -> ContainerId {
        self.inner.engine.borrow_mut().render_tree(tree, container)
    }

    /// Runs `f` with the engine.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a component render.
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut Engine<R>) -> T) -> T {
        f(&mut self.inner.engine.borrow_mut())
    }

    /// Returns `true` while an idle callback is requested.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.inner.scheduled.get()
    }
}

impl<R: Renderer + 'static> Drop for IdleLoop<R> {
    fn drop(&mut self) {
        if self.inner.scheduled.replace(false) {
            cancel_idle_callback(self.inner.handle.get());
        }
        if let Ok(engine) = self.inner.engine.try_borrow() {
            engine.queue().clear_waker();
        }
        self.inner.closure.borrow_mut().take();
    }
}

impl<R: Renderer + 'static> core::fmt::Debug for IdleLoop<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdleLoop")
            .field("scheduled", &self.inner.scheduled.get())
            .field("handle", &self.inner.handle.get())
            .finish_non_exhaustive()
    }
}
