// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The tri-color mark engine (spec §4.5).
//!
//! Marking works purely in terms of [`HandleTable`] and [`Host`]: it
//! never touches the heap's frontiers directly, so it can be exercised
//! against a [`crate::mock::MockHost`] without a full collector.

#[cfg(test)]
mod marker_test;

use crate::handle::HandleTable;
use crate::host::Host;
use microgc_abi::{HandleId, ObjectKind};

/// Push `id` onto the gray list unless it is already black or already
/// queued (spec §4.5 "Push"). Idempotent: pushing a handle that is
/// already on the gray list is a no-op.
pub fn push(handles: &mut HandleTable, live_epoch: u8, id: HandleId) {
    if handles.get(id).is_black(live_epoch) {
        return;
    }
    handles.gray_push(id);
}

/// Pop one gray handle and trace it (spec §4.5 "Trace step"): blacken
/// it, then push each child reference it holds. A no-op if the gray
/// list is empty.
pub fn trace_one<H: Host>(handles: &mut HandleTable, host: &H, live_epoch: u8) {
    let Some(id) = handles.gray_pop() else {
        return;
    };
    if handles.get(id).is_black(live_epoch) {
        return;
    }
    handles.get_mut(id).mark = live_epoch;

    let handle = *handles.get(id);
    match handle.kind {
        ObjectKind::Object { class } => {
            let desc = host.class_descriptor(class);
            for i in 0..64u32 {
                if i as u64 >= desc.instance_size {
                    break;
                }
                if desc.ref_bitmap.is_ref(i) {
                    let word = host.read_word(handle.data_ptr.add(u64::from(i)));
                    push_candidate(handles, host, live_epoch, word);
                }
            }
        }
        ObjectKind::RefArray { length } => {
            for i in 0..length {
                let word = host.read_word(handle.data_ptr.add(u64::from(i)));
                push_candidate(handles, host, live_epoch, word);
            }
        }
        ObjectKind::PrimArray { .. } => {}
    }
}

/// Push a reference field's value if it denotes a live, non-black
/// handle. Reference fields hold handle identifiers by construction
/// (spec §3.1: "all mutator-visible references are handle
/// identifiers"), so unlike conservative stack scanning this does not
/// need the alignment/range filter — only the liveness and color
/// checks that make a push idempotent.
fn push_candidate<H: Host>(handles: &mut HandleTable, _host: &H, live_epoch: u8, word: u64) {
    let Ok(index) = u32::try_from(word) else {
        return;
    };
    if index >= handles.capacity() {
        return;
    }
    let id = HandleId::from_index(index);
    if handles.get(id).is_free() {
        return;
    }
    push(handles, live_epoch, id);
}

/// Process up to `n` gray entries (spec §4.8 "Mark" calls
/// `mark_step(MARK_STEP)`). Returns `true` once the gray list is empty.
pub fn mark_step<H: Host>(handles: &mut HandleTable, host: &H, live_epoch: u8, n: u32) -> bool {
    for _ in 0..n {
        if handles.gray_is_empty() {
            break;
        }
        trace_one(handles, host, live_epoch);
    }
    handles.gray_is_empty()
}
