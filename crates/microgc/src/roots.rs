// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Root scanning (spec §4.4): exact scan of static references, plus a
//! conservative scan of every mutator's stack.

#[cfg(test)]
mod roots_test;

use crate::handle::HandleTable;
use crate::host::Host;
use crate::marker;
use microgc_abi::HandleId;

/// Seed the gray list from every root source, as the brief STW RootScan
/// phase does at the start of a cycle (spec §4.8). The host is
/// expected to already be halted (`assert_stw`) by the caller.
pub fn scan_all<H: Host>(handles: &mut HandleTable, host: &H, live_epoch: u8) {
    scan_static(handles, host, live_epoch);
    scan_stacks(handles, host, live_epoch);
}

/// Exact scan of the static reference range: every word in
/// `[base, base + count)` is a handle identifier, pushed unconditionally
/// (spec §4.4 "Static references").
pub fn scan_static<H: Host>(handles: &mut HandleTable, host: &H, live_epoch: u8) {
    let (base, count) = host.static_refs_range();
    for i in 0..u64::from(count) {
        let word = host.read_word(base.add(i));
        if let Ok(index) = u32::try_from(word) {
            if index < handles.capacity() && !handles.get(HandleId::from_index(index)).is_free() {
                marker::push(handles, live_epoch, HandleId::from_index(index));
            }
        }
    }
}

/// Conservative scan of every mutator's stack region (spec §4.4
/// "Mutator stacks"). A word is pushed only if it passes all of:
/// 1. in range of the handle table, 2. (trivially aligned under the
/// index encoding — see [`HandleId::from_candidate_word`]),
/// 3. the handle it names is live (not `FREE`), 4. it is not already
/// black. This can produce false positives, never false negatives.
pub fn scan_stacks<H: Host>(handles: &mut HandleTable, host: &H, live_epoch: u8) {
    for region in host.mutator_stacks() {
        let start = if region.active {
            host.current_stack_pointer()
        } else {
            region.base
        };
        let mut addr = start;
        while addr < region.top {
            let word = host.read_word(addr);
            if let Some(id) = HandleId::from_candidate_word(word, handles.capacity()) {
                let h = handles.get(id);
                if !h.is_free() && !h.is_black(live_epoch) {
                    marker::push(handles, live_epoch, id);
                }
            }
            addr = addr.add(1);
        }
    }
}
