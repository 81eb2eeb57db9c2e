// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! External class descriptor contract (spec §3.3).
//!
//! Class descriptors are supplied by the compiler/loader and are never
//! mutated by the collector. They tell the marker how many words an
//! instance occupies and which of those words are reference fields.

use crate::Addr;

/// Tag for the kind of primitive array element.
///
/// Distinguishes 1-word elements from 2-word elements (`long`/`double`)
/// so the marker can compute an array's body size without consulting a
/// class descriptor (spec §3.3: "for arrays, the type tag suffices").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ElemKind {
    Byte = 0,
    Short = 1,
    Int = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    Char = 6,
    Boolean = 7,
}

impl ElemKind {
    /// Words occupied by a single element of this kind.
    #[inline]
    #[must_use]
    pub const fn words_per_element(self) -> u64 {
        match self {
            Self::Long | Self::Double => 2,
            Self::Byte
            | Self::Short
            | Self::Int
            | Self::Float
            | Self::Char
            | Self::Boolean => 1,
        }
    }
}

/// What kind of heap object a handle denotes (spec §3.1 `type` field).
///
/// `class_or_length` in the original spec is reinterpreted by `type`;
/// here the two are folded into one tagged value so a handle can never
/// hold a `class_or_length` whose meaning doesn't match its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// A plain object instance; fields are found via its class
    /// descriptor's reference bitmap.
    Object { class: Addr },
    /// An array whose every element is a reference.
    RefArray { length: u32 },
    /// An array of primitive elements; no children to trace.
    PrimArray { elem_kind: ElemKind, length: u32 },
}

impl ObjectKind {
    /// Size of the object's body in words, given its class descriptor
    /// when needed (spec §4.6 `object_size`).
    #[must_use]
    pub fn size_words(self, class_instance_size: impl FnOnce(Addr) -> u64) -> u64 {
        match self {
            Self::Object { class } => class_instance_size(class),
            Self::RefArray { length } => u64::from(length),
            Self::PrimArray { elem_kind, length } => {
                u64::from(length) * elem_kind.words_per_element()
            }
        }
    }
}

/// A reference bitmap: bit *i* is set iff word *i* of an instance is a
/// reference field (spec §3.3).
///
/// Bit ordering resolves the spec's Open Question in §9: bit 0 (LSB) is
/// field 0, consistent with the donor's shift pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefBitmap(pub u64);

impl RefBitmap {
    /// Create an empty bitmap (no reference fields).
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check whether word `index` is a reference field.
    ///
    /// Returns `false` for indices beyond the bitmap's 64-bit capacity;
    /// callers that need wider instances must split into multiple
    /// bitmap words (not required by any class in this collector's
    /// test suite, but the bound keeps the check total).
    #[inline]
    #[must_use]
    pub const fn is_ref(self, index: u32) -> bool {
        if index >= 64 {
            return false;
        }
        (self.0 >> index) & 1 != 0
    }
}

/// The external class contract (spec §3.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// Total words occupied by an instance.
    pub instance_size: u64,
    /// Which words of an instance are reference fields.
    pub ref_bitmap: RefBitmap,
}

impl ClassDescriptor {
    #[must_use]
    pub const fn new(instance_size: u64, ref_bitmap: RefBitmap) -> Self {
        Self {
            instance_size,
            ref_bitmap,
        }
    }
}
