// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The mutator-visible object reference (spec §3.1).
//!
//! "All mutator-visible 'references' are handle identifiers (table
//! indices or equivalently aligned addresses)." This collector uses
//! the table-index encoding the spec explicitly allows: a `HandleId`
//! is the index of a slot in the collector's handle table, stable for
//! the entire lifetime of the object it denotes. Compaction moves
//! object bodies but never renumbers handles.

use core::fmt;

/// A stable, mutator-visible reference to a heap object.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct HandleId(u32);

impl HandleId {
    /// The reserved null reference: table index 0.
    ///
    /// `HandleTable` never hands this slot out via `acquire_free`, so
    /// the zero word a zeroed reference field defaults to (spec §4.3)
    /// always decodes to a handle reading as free — a null reference
    /// needs no separate tag from a real, live one.
    pub const NULL: Self = Self(0);

    /// Construct a handle id from a raw table index.
    ///
    /// Only the collector's `HandleTable` should call this; host code
    /// receives `HandleId`s back from `new_object`/`new_array` and
    /// treats them as opaque.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// The raw table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Check whether a raw word, found on a conservatively scanned
    /// stack, could plausibly denote a handle in a table of the given
    /// capacity (spec §4.4, precondition 1: "lies within the handle
    /// table's address range").
    ///
    /// Under the index encoding this collapses to a bounds check;
    /// precondition 2 ("aligned to the handle record size") is
    /// trivially satisfied since every `u32` index is a valid index.
    #[inline]
    #[must_use]
    pub fn from_candidate_word(word: u64, handle_cap: u32) -> Option<Self> {
        let index = u32::try_from(word).ok()?;
        if index < handle_cap {
            Some(Self(index))
        } else {
            None
        }
    }
}

impl fmt::Debug for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleId({})", self.0)
    }
}
