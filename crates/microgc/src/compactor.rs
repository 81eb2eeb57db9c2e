// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Sliding compaction over an address-sorted snapshot of the use list
//! (spec §4.6).
//!
//! Handle indirection is what makes this cheap: relocating an object
//! body only ever requires rewriting its handle's `data_ptr`, never any
//! pointer stored inside another object's body.

#[cfg(test)]
mod compactor_test;

use crate::handle::HandleTable;
use crate::host::Host;
use microgc_abi::{Addr, ObjectKind};

/// Per-cycle compaction state: the detached, address-sorted snapshot
/// still to be processed, and the next destination word.
///
/// The spec additionally names a `new_use_list` accumulator, spliced
/// onto the live use list only at `finish`. This implementation pushes
/// each survivor directly onto the live use list as it is visited
/// (`HandleTable::use_push_raw`) instead of holding it in a second
/// list until the end — equivalent under the use-list invariants
/// (membership, not position, is all that matters) and one fewer list
/// to thread through increments where the mutator may also be pushing
/// newly allocated handles onto the same live list concurrently.
pub struct CompactorState {
    remaining: u32,
    dst: Addr,
    handles_freed: u32,
    words_freed: u64,
}

/// Sort the use list and detach it into the compaction snapshot,
/// resetting the live use list to empty and the destination pointer to
/// `heap_base` (spec §4.6 "Prepare").
pub fn prepare(handles: &mut HandleTable, heap_base: Addr) -> CompactorState {
    let remaining = handles.take_sorted_use_list();
    CompactorState {
        remaining,
        dst: heap_base,
        handles_freed: 0,
        words_freed: 0,
    }
}

/// Process up to `n` snapshot entries (spec §4.6 "Step"). Returns
/// `true` once the snapshot is fully drained.
pub fn compact_step<H: Host>(
    state: &mut CompactorState,
    handles: &mut HandleTable,
    host: &mut H,
    live_epoch: u8,
    n: u32,
) -> bool {
    for _ in 0..n {
        if state.remaining == HandleTable::list_end() {
            break;
        }
        let idx = state.remaining;
        state.remaining = handles.raw_next(idx);

        let id = microgc_abi::HandleId::from_index(idx);
        let handle = *handles.get(id);

        if handle.is_black(live_epoch) {
            let size = handle
                .kind
                .size_words(|class| host.class_descriptor(class).instance_size);
            if size > 0 && handle.data_ptr != state.dst {
                copy_forward(host, handle.data_ptr, state.dst, size);
            }
            handles.get_mut(id).data_ptr = state.dst;
            state.dst = state.dst.add(size);
            handles.use_push_raw(idx);
        } else {
            let size = handle
                .kind
                .size_words(|class| host.class_descriptor(class).instance_size);
            handles.release_raw(idx);
            state.handles_freed += 1;
            state.words_freed += size;
        }
    }
    state.remaining == HandleTable::list_end()
}

/// Copy `size` words from `src` to `dst`, forward (ascending address)
/// order. Safe here specifically because the address-sorted processing
/// order guarantees `dst <= src` at every step (spec §4.6: "proved by
/// induction on the address-sorted order").
fn copy_forward<H: Host>(host: &mut H, src: Addr, dst: Addr, size: u64) {
    for i in 0..size {
        let word = host.read_word(src.add(i));
        host.write_word(dst.add(i), word);
    }
}

/// Final object size in words, computed the same way `compact_step`
/// does, exposed for callers (e.g. `Collector::stats`) that need it
/// without re-deriving the match.
#[must_use]
pub fn object_size<H: Host>(host: &H, kind: ObjectKind) -> u64 {
    kind.size_words(|class| host.class_descriptor(class).instance_size)
}

impl CompactorState {
    /// The destination pointer reached so far; becomes the cycle's
    /// `compact_top` once the snapshot is fully drained (spec §4.6
    /// "Finish").
    #[must_use]
    pub const fn dst(&self) -> Addr {
        self.dst
    }

    /// Handles released to the free list so far this cycle.
    #[must_use]
    pub const fn handles_freed(&self) -> u32 {
        self.handles_freed
    }

    /// Words reclaimed (dead objects' body sizes) so far this cycle.
    #[must_use]
    pub const fn words_freed(&self) -> u64 {
        self.words_freed
    }
}
