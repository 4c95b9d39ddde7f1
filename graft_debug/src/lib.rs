// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for Graft work-loop
//! diagnostics.
//!
//! This crate provides [`TraceSink`](graft_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] writes one human-readable line per event.
//! - [`recorder::RecorderSink`] keeps a compact binary recording, read back
//!   with [`recorder::decode`] or fed to another sink with
//!   [`recorder::replay`].
//! - [`chrome::export`] turns a recording into Chrome Trace Event Format
//!   JSON.
//! - [`tee::TeeSink`] forwards events to two sinks at once.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod tee;
