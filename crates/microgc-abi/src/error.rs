// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The error surface raised across the collector's external API
//! (spec §7).

use core::fmt;

/// Failure modes exposed to the host across `init`, `new_object`,
/// `new_array`, `write_barrier`, and `gc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcError {
    /// The heap has no room for the requested allocation even after a
    /// full (stop-the-world) collection (spec §7: "allocation failure
    /// after exhausting the STW escape hatch").
    OutOfMemory,
    /// A mutator operation dereferenced a null handle.
    NullDereference,
    /// An array allocation was requested with a negative length.
    NegativeArraySize,
    /// The handle table has no free slots left (spec §3.1 `handle_cap`).
    HandleExhausted,
}

impl fmt::Display for GcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::NullDereference => write!(f, "null dereference"),
            Self::NegativeArraySize => write!(f, "negative array size"),
            Self::HandleExhausted => write!(f, "handle table exhausted"),
        }
    }
}
