// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use crate::mock::MockMemory;

#[test]
fn round_trip_through_trait_object() {
    let mut mem = MockMemory::new(16);
    let a = Addr::new(4);
    mem.write(a, 0xDEAD_BEEF);
    assert_eq!(mem.read(a), 0xDEAD_BEEF);
}

#[test]
fn reports_its_length() {
    let mem = MockMemory::new(32);
    assert_eq!(mem.len_words(), 32);
}
