// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Word-addressable memory contract.
//!
//! Unlike a byte-addressed virtual-memory host, the collector's backing
//! store is specified as "an array of machine words" (spec §4.1): reads
//! and writes operate on whole [`Word`]s at a given [`Addr`], never on
//! sub-word slices. [`Addr`] is a newtype so that word offsets are never
//! accidentally mixed with raw table indices or byte counts.

use core::fmt;
use core::ops::{Add, Sub};

/// A single machine word as seen by the collector.
///
/// The collector never interprets the bits of a word itself except when
/// conservatively testing whether it could be a [`HandleId`](crate::HandleId)
/// (spec §4.4); object field contents are otherwise opaque to it.
pub type Word = u64;

/// An address into the host's word-addressable memory.
///
/// One unit of [`Addr`] is one [`Word`], not one byte: `addr.add(1)`
/// moves to the next word, matching `Memory::read`/`Memory::write`
/// in the collector's host contract (spec §6.2).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Addr(u64);

impl Addr {
    /// Create a new address from a raw word offset.
    #[inline]
    #[must_use]
    pub const fn new(words: u64) -> Self {
        Self(words)
    }

    /// The null address (word offset zero).
    ///
    /// Not reserved: `heap_base` may legitimately be `0`, and sliding
    /// compaction always places the lowest surviving object there, so
    /// this is a plain zero address rather than a sentinel value. The
    /// handle table tracks freeness with its own flag instead of
    /// overloading this address.
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self(0)
    }

    /// Check if this is the null address.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Get the raw word offset.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Add a word offset to this address.
    #[inline]
    #[must_use]
    pub const fn add(self, offset: u64) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Subtract a word offset from this address.
    #[inline]
    #[must_use]
    pub const fn sub(self, offset: u64) -> Self {
        Self(self.0.wrapping_sub(offset))
    }

    /// Calculate the word distance between two addresses (`self - other`).
    #[inline]
    #[must_use]
    pub const fn diff(self, other: Self) -> u64 {
        self.0.wrapping_sub(other.0)
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({:#x})", self.0)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for Addr {
    fn from(words: u64) -> Self {
        Self(words)
    }
}

impl Add<u64> for Addr {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        self.add(rhs)
    }
}

impl Sub<u64> for Addr {
    type Output = Self;

    fn sub(self, rhs: u64) -> Self::Output {
        self.sub(rhs)
    }
}
