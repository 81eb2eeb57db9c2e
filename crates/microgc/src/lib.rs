// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # microgc
//!
//! An incremental mark-compact garbage collector for a small-footprint,
//! stack-based, word-addressable runtime (spec §1).
//!
//! Handle indirection is the core trick: every inter-object reference is
//! a [`microgc_abi::HandleId`], never a raw address into an object
//! body, so sliding compaction only ever has to rewrite one word per
//! relocated object (its handle's `data_ptr`) rather than every pointer
//! that happened to point into it.
//!
//! [`Collector`] is the single owning structure a host embeds: it holds
//! the handle table, the heap frontiers, the phase state machine, and
//! the configuration, behind one mutex (spec §5 "a single global mutex
//! suffices given the small step sizes"). A host drives it through
//! [`Collector::new_object`], [`Collector::new_array`],
//! [`Collector::write_barrier`], and [`Collector::gc`], letting
//! allocation calls interleave bounded increments of marking, and a host
//! drive further increments directly between allocations via
//! [`Collector::try_gc_increment`]. A new allocation arriving while a
//! cycle is mid-`Compact` drains that compaction to completion first,
//! since the freshly bumped address would otherwise fall inside the very
//! region compaction is reclaiming.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod barrier;
pub mod compactor;
pub mod config;
pub mod handle;
pub mod heap;
pub mod host;
pub mod marker;
pub mod mem;
pub mod mock;
pub mod roots;
pub mod stats;
mod sync;


pub use config::Config;
pub use handle::{Handle, HandleTable};
pub use heap::Heap;
pub use host::{Host, StackRegion};
pub use mem::Memory;
pub use microgc_abi::{Addr, ClassDescriptor, ElemKind, GcError, HandleId, ObjectKind, RefBitmap, Word};
pub use stats::Stats;

use compactor::CompactorState;
use sync::GcMutex;

/// Current position in the collector's phase state machine (spec §4.8).
pub enum Phase {
    /// No collector state is live; allocation proceeds unimpeded.
    Idle,
    /// Marking the graph reachable from the gray list, one bounded
    /// `mark_step` per increment.
    Mark,
    /// Sliding the address-sorted snapshot of survivors upward, one
    /// bounded `compact_step` per increment.
    Compact { state: CompactorState },
}

/// The mutable state protected by the collector's single global mutex
/// (spec §5): both heap frontiers, the handle table (and through it the
/// free/use/gray lists), the current epoch, the phase, and cumulative
/// stats.
struct Inner {
    handles: HandleTable,
    heap: Heap,
    phase: Phase,
    live_epoch: u8,
    stats: Stats,
}

/// The incremental mark-compact collector (spec §4.8).
///
/// Owns no process-wide static state: `Collector::init` fully
/// constructs it, and dropping it is a plain deallocation (spec §9
/// "`init` fully constructs the state at startup; teardown is a simple
/// drop"). Generic over the host `H` so a test can plug in
/// [`mock::MockHost`] while an embedding VM plugs in its own memory and
/// scheduler glue.
pub struct Collector<H: Host> {
    inner: GcMutex<Inner>,
    config: Config,
    _host: core::marker::PhantomData<H>,
}

impl<H: Host> Collector<H> {
    /// Construct a collector over `[heap_base, heap_base + heap_words)`
    /// with a handle table of `config.handle_cap` entries, all free
    /// (spec §6.1 `init`).
    ///
    /// # Errors
    ///
    /// Returns [`GcError::OutOfMemory`] if `config`'s step sizes or
    /// free-space denominator are not positive (spec §4.8).
    pub fn init(heap_base: Addr, heap_words: u64, config: Config) -> Result<Self, GcError> {
        let config = config.validate()?;
        Ok(Self {
            inner: GcMutex::new(Inner {
                handles: HandleTable::new(config.handle_cap),
                heap: Heap::new(heap_base, heap_words),
                phase: Phase::Idle,
                live_epoch: 1,
                stats: Stats::default(),
            }),
            config,
            _host: core::marker::PhantomData,
        })
    }

    /// Allocate a plain object instance of `class` (spec §6.1
    /// `new_object`). May advance the collector state machine or, under
    /// allocation pressure, run a full stop-the-world cycle.
    ///
    /// # Errors
    ///
    /// [`GcError::OutOfMemory`] if no space remains even after a full
    /// collection; [`GcError::HandleExhausted`] if the handle table is
    /// full even though heap words remain (spec §7).
    pub fn new_object(&self, host: &mut H, class: Addr) -> Result<HandleId, GcError> {
        let instance_size = host.class_descriptor(class).instance_size;
        self.allocate(host, instance_size, ObjectKind::Object { class })
    }

    /// Allocate a reference array of `length` elements (spec §6.1
    /// `new_array`).
    ///
    /// # Errors
    ///
    /// [`GcError::NegativeArraySize`] if `length < 0`; otherwise as
    /// [`Collector::new_object`].
    pub fn new_ref_array(&self, host: &mut H, length: i64) -> Result<HandleId, GcError> {
        let length = non_negative_length(length)?;
        self.allocate(host, u64::from(length), ObjectKind::RefArray { length })
    }

    /// Allocate a primitive array of `length` elements of `elem_kind`
    /// (spec §6.1 `new_array`).
    ///
    /// # Errors
    ///
    /// Same as [`Collector::new_ref_array`].
    pub fn new_prim_array(
        &self,
        host: &mut H,
        length: i64,
        elem_kind: ElemKind,
    ) -> Result<HandleId, GcError> {
        let length = non_negative_length(length)?;
        let size = u64::from(length) * elem_kind.words_per_element();
        self.allocate(host, size, ObjectKind::PrimArray { elem_kind, length })
    }

    /// Inspect and, if warranted, graysify the value about to be
    /// overwritten (spec §4.7, §6.1 `write_barrier`). Must be called by
    /// the mutator immediately before performing the actual store; the
    /// new value must not be installed until this returns.
    ///
    /// # Errors
    ///
    /// [`GcError::NullDereference`] if `handle` is `None`.
    pub fn write_barrier(
        &self,
        host: &mut H,
        handle: Option<HandleId>,
        field_index: u32,
    ) -> Result<(), GcError> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;
        barrier::write_barrier(&mut inner.handles, host, inner.live_epoch, handle, field_index)
    }

    /// Run a full, synchronous stop-the-world collection (spec §4.8
    /// "STW escape", §6.1 `gc`): halt mutators, discard any in-progress
    /// gray list, toggle the epoch, mark to fixpoint, compact, finish,
    /// resume.
    ///
    /// In `use_scopes` mode this is a no-op that mirrors the allocator's
    /// immediate `OutOfMemory` (spec §6.4, §9): there is no heap to
    /// collect.
    ///
    /// # Errors
    ///
    /// [`GcError::OutOfMemory`] if `use_scopes` is enabled.
    pub fn gc(&self, host: &mut H) -> Result<(), GcError> {
        if self.config.use_scopes {
            return Err(GcError::OutOfMemory);
        }
        let mut inner = self.inner.lock();
        self.run_full_cycle(&mut inner, host);
        Ok(())
    }

    /// Advance the collector by one step if a cycle is in progress, or
    /// start one proactively if free space has dropped below
    /// `config.free_threshold_fraction` (spec §4.8 "Scheduling hook").
    /// Called from the allocation path; a no-op in `use_scopes` mode and
    /// whenever neither condition holds.
    pub fn try_gc_increment(&self, host: &mut H) {
        if self.config.use_scopes {
            return;
        }
        let mut inner = self.inner.lock();
        if !matches!(inner.phase, Phase::Idle) {
            self.gc_increment(&mut inner, host);
            return;
        }
        let threshold = inner.heap.total_words() / u64::from(self.config.free_threshold_fraction);
        if inner.heap.free_words() < threshold {
            self.start_cycle(&mut inner, host);
            self.gc_increment(&mut inner, host);
        }
    }

    /// Current free heap words (spec §6.1 `free_memory`, as words rather
    /// than bytes; the host scales by its own word size).
    pub fn free_memory(&self) -> u64 {
        self.inner.lock().heap.free_words()
    }

    /// Total heap words (spec §6.1 `total_memory`).
    pub fn total_memory(&self) -> u64 {
        self.inner.lock().heap.total_words()
    }

    /// Whether `h` currently denotes a live object on the use list
    /// (spec §6.1 `is_valid_object_handle`).
    pub fn is_valid_object_handle(&self, h: HandleId) -> bool {
        self.inner.lock().handles.is_valid_use_handle(h)
    }

    /// Cumulative collection statistics (see [`Stats`]).
    pub fn stats(&self) -> Stats {
        self.inner.lock().stats
    }

    /// Current phase, for hosts that want to expose collector state
    /// (e.g. to a diagnostics channel) without reaching into internals.
    pub fn phase_name(&self) -> &'static str {
        match self.inner.lock().phase {
            Phase::Idle => "idle",
            Phase::Mark => "mark",
            Phase::Compact { .. } => "compact",
        }
    }

    /// Read one word of a live object's body through its handle,
    /// convenience wrapper a host's bytecode interpreter uses for field
    /// loads. Panics if `h` is not a currently live handle — callers are
    /// expected to have already validated it via the bytecode's own
    /// typing, mirroring the donor VM's trusted-bytecode assumption.
    pub fn read_field(&self, host: &H, h: HandleId, field_index: u32) -> Word {
        let inner = self.inner.lock();
        let data_ptr = inner.handles.get(h).data_ptr;
        drop(inner);
        host.read_word(data_ptr.add(u64::from(field_index)))
    }

    /// Write one word of a live object's body through its handle. The
    /// caller is responsible for having already called
    /// [`Collector::write_barrier`] for this slot before overwriting it
    /// (spec §4.7 "placement").
    pub fn write_field(&self, host: &mut H, h: HandleId, field_index: u32, word: Word) {
        let inner = self.inner.lock();
        let data_ptr = inner.handles.get(h).data_ptr;
        drop(inner);
        host.write_word(data_ptr.add(u64::from(field_index)), word);
    }

    fn allocate(&self, host: &mut H, size: u64, kind: ObjectKind) -> Result<HandleId, GcError> {
        let mut inner = self.inner.lock();

        if self.config.use_scopes {
            let addr = inner.heap.allocate(size).ok_or(GcError::OutOfMemory)?;
            return inner.handles.acquire_free(addr, kind, inner.live_epoch);
        }

        self.advance_before_allocation(&mut inner, host);

        if let Some(addr) = inner.heap.allocate(size) {
            return inner.handles.acquire_free(addr, kind, inner.live_epoch);
        }

        // STW escape hatch (spec §4.8): drain any in-flight cycle, then
        // fall back to a full collection, before giving up.
        if !matches!(inner.phase, Phase::Idle) {
            self.drain_cycle(&mut inner, host);
        }
        if let Some(addr) = inner.heap.allocate(size) {
            return inner.handles.acquire_free(addr, kind, inner.live_epoch);
        }

        self.run_full_cycle(&mut inner, host);
        let addr = inner.heap.allocate(size).ok_or(GcError::OutOfMemory)?;
        inner.handles.acquire_free(addr, kind, inner.live_epoch)
    }

    /// Same scheduling policy as [`Collector::try_gc_increment`], except
    /// that it never leaves a cycle mid-`Compact` before handing control
    /// back to `allocate`.
    ///
    /// A bump allocation lands in `[alloc_bottom, heap_top)`, the region
    /// sliding compaction is actively relocating survivors into. While
    /// marking, that region is untouched free space the heap already
    /// accounts for, so interleaving one bounded mark step per
    /// allocation is safe. Once a cycle reaches `Compact`, though, a new
    /// allocation there is never part of the address-sorted snapshot
    /// `prepare` took — it would sit in the very words `finish_cycle`
    /// later zeros when it reclaims the allocation region, silently
    /// destroying a live, still-rooted object. So instead of taking a
    /// single bounded `compact_step`, this drains compaction to
    /// completion first (spec §4.8 "do not allocate into the body region
    /// during Compact"), then the caller's bump allocation proceeds into
    /// a freshly reset region.
    fn advance_before_allocation(&self, inner: &mut Inner, host: &mut H) {
        match inner.phase {
            Phase::Idle => {
                let threshold =
                    inner.heap.total_words() / u64::from(self.config.free_threshold_fraction);
                if inner.heap.free_words() < threshold {
                    self.start_cycle(inner, host);
                    self.gc_increment(inner, host);
                }
            }
            Phase::Mark => self.gc_increment(inner, host),
            Phase::Compact { .. } => self.drain_cycle(inner, host),
        }
    }

    /// Begin a new cycle: the brief STW RootScan (spec §4.8 "RootScan"):
    /// halt mutators, toggle `live_epoch`, seed the gray list from every
    /// root, resume, then move to `Mark`.
    fn start_cycle(&self, inner: &mut Inner, host: &mut H) {
        host.assert_stw();
        inner.live_epoch = toggle_epoch(inner.live_epoch);
        roots::scan_all(&mut inner.handles, host, inner.live_epoch);
        host.release_stw();
        inner.phase = Phase::Mark;
    }

    /// One bounded increment of whichever phase is active (spec §4.8
    /// "Mark"/"Compact"). A no-op when idle.
    fn gc_increment(&self, inner: &mut Inner, host: &mut H) {
        match inner.phase {
            Phase::Idle => {}
            Phase::Mark => {
                let done = marker::mark_step(
                    &mut inner.handles,
                    host,
                    inner.live_epoch,
                    self.config.mark_step,
                );
                if done {
                    let state = compactor::prepare(&mut inner.handles, inner.heap.base());
                    inner.phase = Phase::Compact { state };
                }
            }
            Phase::Compact { ref mut state } => {
                let done = compactor::compact_step(
                    state,
                    &mut inner.handles,
                    host,
                    inner.live_epoch,
                    self.config.compact_step,
                );
                if done {
                    self.finish_cycle(inner, host);
                }
            }
        }
    }

    /// Drain whatever phase is in progress synchronously, under a
    /// single STW halt (spec §4.8 STW escape step 1). Used both by the
    /// allocation path's escape hatch and by `gc()`'s "finish the
    /// current cycle first" step.
    fn drain_cycle(&self, inner: &mut Inner, host: &mut H) {
        host.assert_stw();
        loop {
            match inner.phase {
                Phase::Idle => break,
                Phase::Mark => {
                    let done = marker::mark_step(&mut inner.handles, host, inner.live_epoch, u32::MAX);
                    if done {
                        let state = compactor::prepare(&mut inner.handles, inner.heap.base());
                        inner.phase = Phase::Compact { state };
                    }
                }
                Phase::Compact { ref mut state } => {
                    let done =
                        compactor::compact_step(state, &mut inner.handles, host, inner.live_epoch, u32::MAX);
                    if done {
                        self.finish_cycle_no_stw(inner, host);
                        break;
                    }
                }
            }
        }
        host.release_stw();
    }

    /// Finish compaction: splice survivors, reset `compact_top`,
    /// reclaim the allocation region, zero it, and invalidate caches
    /// (spec §4.6 "Finish"). Updates [`Stats`] and returns to `Idle`.
    fn finish_cycle(&self, inner: &mut Inner, host: &mut H) {
        host.assert_stw();
        self.finish_cycle_no_stw(inner, host);
        host.release_stw();
    }

    /// As [`Collector::finish_cycle`], but without asserting its own
    /// STW region — used when the caller (`drain_cycle`, `run_full_cycle`)
    /// already holds one.
    fn finish_cycle_no_stw(&self, inner: &mut Inner, host: &mut H) {
        let Phase::Compact { state } = core::mem::replace(&mut inner.phase, Phase::Idle) else {
            return;
        };
        inner.heap.set_compact_top(state.dst());
        inner.heap.reset_alloc_region();
        zero_range(host, state.dst(), inner.heap.alloc_bottom());
        host.invalidate_caches();

        inner.stats.cycles_completed += 1;
        inner.stats.bytes_reclaimed += state.words_freed();
        inner.stats.last_cycle_handles_freed = state.handles_freed();
    }

    /// A full, synchronous STW cycle (spec §4.8 "STW escape" step 2,
    /// and `gc()`): drain whatever is in progress, discard the gray
    /// list, toggle the epoch, seed fresh roots, mark to fixpoint,
    /// compact to fixpoint, finish.
    fn run_full_cycle(&self, inner: &mut Inner, host: &mut H) {
        host.assert_stw();
        // Drain any in-flight cycle first so compaction never straddles
        // two different epochs' worth of marks.
        loop {
            match inner.phase {
                Phase::Idle => break,
                Phase::Mark => {
                    let done = marker::mark_step(&mut inner.handles, host, inner.live_epoch, u32::MAX);
                    if done {
                        let state = compactor::prepare(&mut inner.handles, inner.heap.base());
                        inner.phase = Phase::Compact { state };
                    }
                }
                Phase::Compact { ref mut state } => {
                    let done =
                        compactor::compact_step(state, &mut inner.handles, host, inner.live_epoch, u32::MAX);
                    if done {
                        self.finish_cycle_no_stw(inner, host);
                        break;
                    }
                }
            }
        }

        inner.live_epoch = toggle_epoch(inner.live_epoch);
        roots::scan_all(&mut inner.handles, host, inner.live_epoch);
        while !marker::mark_step(&mut inner.handles, host, inner.live_epoch, u32::MAX) {}
        let mut state = compactor::prepare(&mut inner.handles, inner.heap.base());
        while !compactor::compact_step(&mut state, &mut inner.handles, host, inner.live_epoch, u32::MAX) {}
        inner.phase = Phase::Compact { state };
        self.finish_cycle_no_stw(inner, host);

        host.release_stw();
    }
}

/// Toggle `live_epoch` between its two non-zero values (spec §4.8
/// "Epoch toggle"): zero is reserved so a handle's uninitialized mark
/// field is never mistaken for "already marked this cycle".
const fn toggle_epoch(current: u8) -> u8 {
    if current == 1 { 2 } else { 1 }
}

/// Validate a mutator-supplied array length (spec §6.1 `new_array`:
/// `NegativeArraySize` if `length < 0`).
fn non_negative_length(length: i64) -> Result<u32, GcError> {
    u32::try_from(length).map_err(|_| GcError::NegativeArraySize)
}

/// Zero `[start, end)` so newly allocated fields default to zero/null
/// (spec §4.3 `reset_alloc_region`).
fn zero_range<H: Host>(host: &mut H, start: Addr, end: Addr) {
    let mut addr = start;
    while addr < end {
        host.write_word(addr, 0);
        addr = addr.add(1);
    }
}
