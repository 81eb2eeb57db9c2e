// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

#[test]
fn basic() {
    let a = Addr::new(0x100);
    assert_eq!(a.as_u64(), 0x100);
    assert!(!a.is_null());
    assert!(Addr::null().is_null());
}

#[test]
fn arithmetic() {
    let a = Addr::new(0x100);
    assert_eq!(a.add(4).as_u64(), 0x104);
    assert_eq!(a.sub(4).as_u64(), 0xFC);
    assert_eq!((a + 4).as_u64(), 0x104);
    assert_eq!((a - 4).as_u64(), 0xFC);
}

#[test]
fn diff() {
    let a = Addr::new(100);
    let b = Addr::new(40);
    assert_eq!(a.diff(b), 60);
}

#[test]
fn debug_format() {
    assert_eq!(format!("{:?}", Addr::new(0x10)), "Addr(0x10)");
}
