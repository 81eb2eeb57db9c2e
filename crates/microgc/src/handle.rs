// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The handle table: the sole externally visible reference to a heap
//! object (spec §3.1, §4.2).
//!
//! Handles are stored in a flat, pre-allocated `Vec<Handle>` indexed by
//! [`HandleId`]; every "pointer" between handles (`next`, `gray_link`)
//! is a `HandleId`, not a language-level reference, the arena-plus-index
//! design spec §9 calls for to side-step the cyclic-ownership problem.

#[cfg(test)]
mod handle_test;

use microgc_abi::{Addr, GcError, HandleId, ObjectKind};

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Sentinel `next`/`gray_link` value meaning "end of list" for the
/// free and use lists. Distinct from [`GRAY_END`], which terminates
/// the gray list specifically (spec §3.4).
const LIST_END: u32 = u32::MAX;

/// Sentinel `gray_link` meaning "not currently on the gray list"
/// (spec §3.1).
const NOT_IN_LIST: u32 = u32::MAX - 1;

/// Sentinel `gray_link` value terminating the gray list (spec §3.4):
/// distinguished from [`NOT_IN_LIST`] so membership is a single
/// comparison.
const GRAY_END: u32 = u32::MAX - 2;

/// One slot in the handle table (spec §3.1).
///
/// The spec's `data_ptr == FREE (0)` sentinel assumes body address `0`
/// is never a live object's address. This implementation does not
/// assume that — `heap_base` may legitimately be `0`, and sliding
/// compaction always places the lowest surviving object at
/// `heap_base` — so freeness is tracked by an explicit `free` flag
/// instead of overloading `data_ptr`.
#[derive(Clone, Copy, Debug)]
pub struct Handle {
    /// Address of the object body. Meaningless while `free` is set.
    pub data_ptr: Addr,
    /// What the handle denotes and, for objects, its class.
    pub kind: ObjectKind,
    /// Epoch tag; black iff `mark == live_epoch`.
    pub mark: u8,
    free: bool,
    next: u32,
    gray_link: u32,
}

impl Handle {
    const fn free() -> Self {
        Self {
            data_ptr: Addr::null(),
            kind: ObjectKind::PrimArray {
                elem_kind: microgc_abi::ElemKind::Byte,
                length: 0,
            },
            mark: 0,
            free: true,
            next: LIST_END,
            gray_link: NOT_IN_LIST,
        }
    }

    /// Whether this handle is free (spec §3.1), i.e. on the free list
    /// rather than the use list.
    #[inline]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.free
    }

    /// Whether this handle is black in the given epoch.
    #[inline]
    #[must_use]
    pub const fn is_black(&self, live_epoch: u8) -> bool {
        self.mark == live_epoch
    }

    /// Whether this handle is currently linked into the gray list.
    #[inline]
    #[must_use]
    pub const fn on_gray_list(&self) -> bool {
        self.gray_link != NOT_IN_LIST
    }
}

/// A fixed-capacity arena of [`Handle`]s, partitioned into a free list
/// and a use list, with a gray list threaded through both (spec §4.2).
pub struct HandleTable {
    slots: Vec<Handle>,
    free_head: u32,
    use_head: u32,
    gray_head: u32,
    live_count: u32,
}

impl HandleTable {
    /// Build a table of `capacity` handles, all initially free-listed
    /// (spec §3.1: "born free"), except slot 0: it is permanently
    /// reserved and never handed out by `acquire_free`, so the zero
    /// word a zeroed reference field defaults to (spec §4.3
    /// `reset_alloc_region`) always decodes to a handle that reads as
    /// free — the null sentinel, for free, with no separate tag.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let mut slots = Vec::with_capacity(capacity as usize);
        for i in 0..capacity {
            let mut h = Handle::free();
            h.next = if i + 1 == capacity { LIST_END } else { i + 1 };
            slots.push(h);
        }
        Self {
            slots,
            free_head: if capacity <= 1 { LIST_END } else { 1 },
            use_head: LIST_END,
            gray_head: GRAY_END,
            live_count: 0,
        }
    }

    /// Total number of slots in the table.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of handles currently on the use list.
    #[must_use]
    pub const fn live_count(&self) -> u32 {
        self.live_count
    }

    /// Borrow a handle's record.
    #[must_use]
    pub fn get(&self, id: HandleId) -> &Handle {
        &self.slots[id.index() as usize]
    }

    /// Mutably borrow a handle's record. Callers must not reach through
    /// this to change list membership directly; use the table's list
    /// operations so the free/use/gray invariants stay consistent.
    pub fn get_mut(&mut self, id: HandleId) -> &mut Handle {
        &mut self.slots[id.index() as usize]
    }

    /// Pop the free list head and move it to the use list, or report
    /// exhaustion (spec §4.2 `acquire_free`).
    pub fn acquire_free(
        &mut self,
        data_ptr: Addr,
        kind: ObjectKind,
        live_epoch: u8,
    ) -> Result<HandleId, GcError> {
        if self.free_head == LIST_END {
            return Err(GcError::HandleExhausted);
        }
        let idx = self.free_head;
        let h = &mut self.slots[idx as usize];
        self.free_head = h.next;

        h.data_ptr = data_ptr;
        h.kind = kind;
        h.mark = live_epoch;
        h.free = false;
        h.gray_link = NOT_IN_LIST;
        h.next = self.use_head;
        self.use_head = idx;
        self.live_count += 1;

        Ok(HandleId::from_index(idx))
    }

    /// Release a handle back to the free list, clearing it (spec §4.2
    /// `release`). The caller is responsible for having already
    /// unlinked it from the use list.
    fn release(&mut self, idx: u32) {
        let h = &mut self.slots[idx as usize];
        h.data_ptr = Addr::null();
        h.free = true;
        h.gray_link = NOT_IN_LIST;
        h.next = self.free_head;
        self.free_head = idx;
    }

    /// Iterate the use list's handle ids in their current link order.
    pub fn use_list_ids(&self) -> UseListIter<'_> {
        UseListIter {
            table: self,
            cur: self.use_head,
        }
    }

    /// Check whether `id` is a valid, currently live handle (spec §6.1
    /// `is_valid_object_handle`): traverses the use list, as the spec
    /// requires, rather than trusting the index bound alone.
    #[must_use]
    pub fn is_valid_use_handle(&self, id: HandleId) -> bool {
        self.use_list_ids().any(|h| h == id)
    }

    /// Push `id` onto the gray list if it is not already on it (spec
    /// §4.2 `gray_push`). No-op if already linked.
    pub fn gray_push(&mut self, id: HandleId) {
        let idx = id.index();
        if self.slots[idx as usize].gray_link != NOT_IN_LIST {
            return;
        }
        let prior = self.gray_head;
        self.slots[idx as usize].gray_link = prior;
        self.gray_head = idx;
    }

    /// Pop the gray list head, unlinking it and resetting its
    /// `gray_link` (spec §4.2 `gray_pop`).
    pub fn gray_pop(&mut self) -> Option<HandleId> {
        if self.gray_head == GRAY_END {
            return None;
        }
        let idx = self.gray_head;
        let h = &mut self.slots[idx as usize];
        self.gray_head = h.gray_link;
        h.gray_link = NOT_IN_LIST;
        Some(HandleId::from_index(idx))
    }

    /// Whether the gray list currently has no entries.
    #[must_use]
    pub const fn gray_is_empty(&self) -> bool {
        self.gray_head == GRAY_END
    }

    /// Detach the entire use list, sorted ascending by `data_ptr`, for
    /// the compactor's snapshot (spec §4.2 `sort_use_list_by_data_ptr`,
    /// §4.6 `prepare`).
    ///
    /// Insertion sort: the spec explicitly permits it ("dozens-to-
    /// hundreds of live handles at typical workloads"). Returns the
    /// sorted list's head; the live use list is left empty.
    pub fn take_sorted_use_list(&mut self) -> u32 {
        let mut sorted_head = LIST_END;
        let mut cur = self.use_head;
        self.use_head = LIST_END;

        while cur != LIST_END {
            let next = self.slots[cur as usize].next;
            self.insert_sorted(&mut sorted_head, cur);
            cur = next;
        }
        sorted_head
    }

    fn insert_sorted(&mut self, head: &mut u32, idx: u32) {
        let key = self.slots[idx as usize].data_ptr;
        if *head == LIST_END || key <= self.slots[*head as usize].data_ptr {
            self.slots[idx as usize].next = *head;
            *head = idx;
            return;
        }
        let mut prev = *head;
        while self.slots[prev as usize].next != LIST_END
            && self.slots[self.slots[prev as usize].next as usize].data_ptr < key
        {
            prev = self.slots[prev as usize].next;
        }
        self.slots[idx as usize].next = self.slots[prev as usize].next;
        self.slots[prev as usize].next = idx;
    }

    /// Push `idx` onto the live use list (used by the compactor to
    /// rebuild the survivors' list).
    pub fn use_push_raw(&mut self, idx: u32) {
        self.slots[idx as usize].next = self.use_head;
        self.use_head = idx;
    }

    /// Release a handle that did not survive compaction (spec §4.6
    /// step, white case).
    pub fn release_raw(&mut self, idx: u32) {
        self.release(idx);
        self.live_count -= 1;
    }

    /// Next link of a detached-list node, exposed for the compactor's
    /// manual walk while it is deciding each handle's fate.
    #[must_use]
    pub fn raw_next(&self, idx: u32) -> u32 {
        self.slots[idx as usize].next
    }

    /// End-of-list sentinel for detached/raw list walks.
    #[must_use]
    pub const fn list_end() -> u32 {
        LIST_END
    }
}

/// Iterator over the live use list.
pub struct UseListIter<'a> {
    table: &'a HandleTable,
    cur: u32,
}

impl Iterator for UseListIter<'_> {
    type Item = HandleId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == LIST_END {
            return None;
        }
        let idx = self.cur;
        self.cur = self.table.slots[idx as usize].next;
        Some(HandleId::from_index(idx))
    }
}
