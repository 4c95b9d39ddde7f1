// Copyright 2026 the Graft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`], and [`replay`] feeds them to another
//! sink.

use graft_core::container::ContainerId;
use graft_core::node::{EffectKind, NodeRole};
use graft_core::queue::UpdateOrigin;
use graft_core::time::HostTime;
use graft_core::trace::{
    CommitEvent, CycleBeginEvent, CycleSummary, EffectEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, SliceBeginEvent, SliceEndEvent, StaleUpdateEvent, TraceSink, UnitOfWorkEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SLICE_BEGIN: u8 = 1;
const TAG_SLICE_END: u8 = 2;
const TAG_CYCLE_BEGIN: u8 = 3;
const TAG_PHASE_BEGIN: u8 = 4;
const TAG_PHASE_END: u8 = 5;
const TAG_COMMIT: u8 = 6;
const TAG_STALE_UPDATE: u8 = 7;
const TAG_CYCLE_SUMMARY: u8 = 8;
const TAG_UNIT_OF_WORK: u8 = 9;
const TAG_EFFECT: u8 = 10;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Render => 0,
            PhaseKind::Commit => 1,
        });
    }

    fn write_origin(&mut self, o: UpdateOrigin) {
        self.write_u8(match o {
            UpdateOrigin::Root => 0,
            UpdateOrigin::Instance => 1,
        });
    }

    fn write_role(&mut self, r: NodeRole) {
        self.write_u8(match r {
            NodeRole::HostLeaf => 0,
            NodeRole::Component => 1,
            NodeRole::Root => 2,
        });
    }

    fn write_effect_kind(&mut self, k: EffectKind) {
        self.write_u8(match k {
            EffectKind::Place => 0,
            EffectKind::Update => 1,
            EffectKind::Delete => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_slice_begin(&mut self, e: &SliceBeginEvent) {
        self.write_u8(TAG_SLICE_BEGIN);
        self.write_u64(e.slice_index);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_slice_end(&mut self, e: &SliceEndEvent) {
        self.write_u8(TAG_SLICE_END);
        self.write_u64(e.slice_index);
        self.write_u64(e.timestamp.ticks());
        self.write_u32(e.units);
        self.write_u8(u8::from(e.pending));
    }

    fn on_cycle_begin(&mut self, e: &CycleBeginEvent) {
        self.write_u8(TAG_CYCLE_BEGIN);
        self.write_u64(e.cycle);
        self.write_origin(e.origin);
        self.write_u32(e.container.0);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.write_u8(TAG_COMMIT);
        self.write_u64(e.cycle);
        self.write_u32(e.container.0);
        self.write_u64(e.timestamp.ticks());
        self.write_u32(e.placements);
        self.write_u32(e.updates);
        self.write_u32(e.deletions);
    }

    fn on_stale_update(&mut self, e: &StaleUpdateEvent) {
        self.write_u8(TAG_STALE_UPDATE);
        self.write_u32(e.instance_index);
        self.write_u32(e.instance_generation);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        self.write_u8(TAG_CYCLE_SUMMARY);
        self.write_u64(s.cycle);
        self.write_origin(s.origin);
        self.write_u32(s.container.0);
        self.write_u32(s.slices);
        self.write_u32(s.units);
        self.write_u64(s.render_ticks);
        self.write_u64(s.commit_ticks);
        self.write_u32(s.effects);
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        self.write_u8(TAG_UNIT_OF_WORK);
        self.write_u64(e.cycle);
        self.write_u32(e.node_index);
        self.write_role(e.role);
    }

    fn on_effect(&mut self, e: &EffectEvent) {
        self.write_u8(TAG_EFFECT);
        self.write_u64(e.cycle);
        self.write_effect_kind(e.kind);
        self.write_u32(e.node_index);
        self.write_role(e.role);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`SliceBeginEvent`].
    SliceBegin(SliceBeginEvent),
    /// A [`SliceEndEvent`].
    SliceEnd(SliceEndEvent),
    /// A [`CycleBeginEvent`].
    CycleBegin(CycleBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`CommitEvent`].
    Commit(CommitEvent),
    /// A [`StaleUpdateEvent`].
    StaleUpdate(StaleUpdateEvent),
    /// A [`CycleSummary`].
    CycleSummary(CycleSummary),
    /// A [`UnitOfWorkEvent`].
    UnitOfWork(UnitOfWorkEvent),
    /// An [`EffectEvent`].
    Effect(EffectEvent),
}

impl RecordedEvent {
    /// The host time carried by the event, if it has one.
    #[must_use]
    pub fn timestamp(&self) -> Option<HostTime> {
        match self {
            Self::SliceBegin(e) => Some(e.timestamp),
            Self::SliceEnd(e) => Some(e.timestamp),
            Self::CycleBegin(e) => Some(e.timestamp),
            Self::PhaseBegin(e) => Some(e.timestamp),
            Self::PhaseEnd(e) => Some(e.timestamp),
            Self::Commit(e) => Some(e.timestamp),
            Self::StaleUpdate(e) => Some(e.timestamp),
            Self::CycleSummary(_) | Self::UnitOfWork(_) | Self::Effect(_) => None,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Feeds every event in a recording to `sink`, in recorded order.
pub fn replay(bytes: &[u8], sink: &mut dyn TraceSink) {
    for event in decode(bytes) {
        match event {
            RecordedEvent::SliceBegin(e) => sink.on_slice_begin(&e),
            RecordedEvent::SliceEnd(e) => sink.on_slice_end(&e),
            RecordedEvent::CycleBegin(e) => sink.on_cycle_begin(&e),
            RecordedEvent::PhaseBegin(e) => sink.on_phase_begin(&e),
            RecordedEvent::PhaseEnd(e) => sink.on_phase_end(&e),
            RecordedEvent::Commit(e) => sink.on_commit(&e),
            RecordedEvent::StaleUpdate(e) => sink.on_stale_update(&e),
            RecordedEvent::CycleSummary(s) => sink.on_cycle_summary(&s),
            RecordedEvent::UnitOfWork(e) => sink.on_unit_of_work(&e),
            RecordedEvent::Effect(e) => sink.on_effect(&e),
        }
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Render,
            _ => PhaseKind::Commit,
        })
    }

    fn read_origin(&mut self) -> Option<UpdateOrigin> {
        Some(match self.read_u8()? {
            0 => UpdateOrigin::Root,
            _ => UpdateOrigin::Instance,
        })
    }

    fn read_role(&mut self) -> Option<NodeRole> {
        Some(match self.read_u8()? {
            0 => NodeRole::HostLeaf,
            1 => NodeRole::Component,
            _ => NodeRole::Root,
        })
    }

    fn read_effect_kind(&mut self) -> Option<EffectKind> {
        Some(match self.read_u8()? {
            0 => EffectKind::Place,
            1 => EffectKind::Update,
            _ => EffectKind::Delete,
        })
    }

    fn decode_slice_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SliceBegin(SliceBeginEvent {
            slice_index: self.read_u64()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_slice_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SliceEnd(SliceEndEvent {
            slice_index: self.read_u64()?,
            timestamp: self.read_time()?,
            units: self.read_u32()?,
            pending: self.read_u8()? != 0,
        }))
    }

    fn decode_cycle_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CycleBegin(CycleBeginEvent {
            cycle: self.read_u64()?,
            origin: self.read_origin()?,
            container: ContainerId(self.read_u32()?),
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_commit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Commit(CommitEvent {
            cycle: self.read_u64()?,
            container: ContainerId(self.read_u32()?),
            timestamp: self.read_time()?,
            placements: self.read_u32()?,
            updates: self.read_u32()?,
            deletions: self.read_u32()?,
        }))
    }

    fn decode_stale_update(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StaleUpdate(StaleUpdateEvent {
            instance_index: self.read_u32()?,
            instance_generation: self.read_u32()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_cycle_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CycleSummary(CycleSummary {
            cycle: self.read_u64()?,
            origin: self.read_origin()?,
            container: ContainerId(self.read_u32()?),
            slices: self.read_u32()?,
            units: self.read_u32()?,
            render_ticks: self.read_u64()?,
            commit_ticks: self.read_u64()?,
            effects: self.read_u32()?,
        }))
    }

    fn decode_unit_of_work(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::UnitOfWork(UnitOfWorkEvent {
            cycle: self.read_u64()?,
            node_index: self.read_u32()?,
            role: self.read_role()?,
        }))
    }

    fn decode_effect(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Effect(EffectEvent {
            cycle: self.read_u64()?,
            kind: self.read_effect_kind()?,
            node_index: self.read_u32()?,
            role: self.read_role()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SLICE_BEGIN => self.decode_slice_begin(),
            TAG_SLICE_END => self.decode_slice_end(),
            TAG_CYCLE_BEGIN => self.decode_cycle_begin(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_COMMIT => self.decode_commit(),
            TAG_STALE_UPDATE => self.decode_stale_update(),
            TAG_CYCLE_SUMMARY => self.decode_cycle_summary(),
            TAG_UNIT_OF_WORK => self.decode_unit_of_work(),
            TAG_EFFECT => self.decode_effect(),
            // Unknown tag: the rest of the buffer cannot be framed.
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
