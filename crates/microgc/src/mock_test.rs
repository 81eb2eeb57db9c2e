// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use microgc_abi::RefBitmap;

#[test]
fn memory_round_trips_through_the_host_trait() {
    let mut host = MockHost::new(64);
    host.write_word(Addr::new(4), 0xABCD);
    assert_eq!(host.read_word(Addr::new(4)), 0xABCD);
}

#[test]
fn class_descriptor_resolves_a_registered_class() {
    let mut host = MockHost::new(16);
    let class = Addr::new(1);
    let desc = ClassDescriptor::new(3, RefBitmap(0b101));
    host.register_class(class, desc);
    assert_eq!(host.class_descriptor(class), desc);
}

#[test]
#[should_panic(expected = "unregistered class")]
fn class_descriptor_panics_on_an_unregistered_class() {
    let host = MockHost::new(16);
    host.class_descriptor(Addr::new(99));
}

#[test]
fn static_refs_range_round_trips() {
    let mut host = MockHost::new(16);
    host.set_static_refs(Addr::new(2), 3);
    assert_eq!(host.static_refs_range(), (Addr::new(2), 3));
}

#[test]
fn active_stack_replaces_any_prior_active_entry() {
    let mut host = MockHost::new(16);
    host.set_active_stack(Addr::new(4), Addr::new(8));
    host.add_inactive_stack(Addr::new(0), Addr::new(2));
    host.set_active_stack(Addr::new(5), Addr::new(9));

    let actives: Vec<_> = host.mutator_stacks().iter().filter(|r| r.active).collect();
    assert_eq!(actives.len(), 1);
    assert_eq!(actives[0].base, Addr::new(5));
    assert_eq!(host.mutator_stacks().len(), 2);
}

#[test]
fn stw_assert_and_release_toggle_the_flag_and_count() {
    let mut host = MockHost::new(16);
    assert!(!host.stw_active());
    host.assert_stw();
    assert!(host.stw_active());
    assert_eq!(host.stw_asserts(), 1);
    host.release_stw();
    assert!(!host.stw_active());
}

#[test]
fn cache_invalidations_are_counted() {
    let mut host = MockHost::new(16);
    host.invalidate_caches();
    host.invalidate_caches();
    assert_eq!(host.cache_invalidations(), 2);
}
