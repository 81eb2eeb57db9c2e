// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

#[test]
fn stack_region_equality_considers_all_fields() {
    let a = StackRegion {
        base: Addr::new(0),
        top: Addr::new(16),
        active: true,
    };
    let b = a;
    assert_eq!(a, b);

    let c = StackRegion { active: false, ..a };
    assert_ne!(a, c);
}
