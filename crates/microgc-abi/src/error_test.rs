// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

#[test]
fn display_messages() {
    assert_eq!(GcError::OutOfMemory.to_string(), "out of memory");
    assert_eq!(GcError::NullDereference.to_string(), "null dereference");
    assert_eq!(
        GcError::NegativeArraySize.to_string(),
        "negative array size"
    );
    assert_eq!(GcError::HandleExhausted.to_string(), "handle table exhausted");
}

#[test]
fn variants_are_copy_and_comparable() {
    let a = GcError::OutOfMemory;
    let b = a;
    assert_eq!(a, b);
}
