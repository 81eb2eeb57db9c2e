// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;

#[test]
fn fresh_heap_has_no_compacted_data_and_full_free_space() {
    let heap = Heap::new(Addr::new(0), 1024);
    assert_eq!(heap.base(), Addr::new(0));
    assert_eq!(heap.top(), Addr::new(1024));
    assert_eq!(heap.compact_top(), Addr::new(0));
    assert_eq!(heap.alloc_bottom(), Addr::new(1024));
    assert_eq!(heap.free_words(), 1024);
}

#[test]
fn allocate_decrements_alloc_bottom_and_returns_the_new_value() {
    let mut heap = Heap::new(Addr::new(0), 1024);
    let addr = heap.allocate(10).unwrap();
    assert_eq!(addr, Addr::new(1014));
    assert_eq!(heap.alloc_bottom(), Addr::new(1014));
    assert_eq!(heap.free_words(), 1014);
}

#[test]
fn allocating_exactly_free_words_succeeds_one_more_fails() {
    let mut heap = Heap::new(Addr::new(0), 16);
    assert!(heap.allocate(16).is_some());
    assert_eq!(heap.free_words(), 0);

    let mut heap2 = Heap::new(Addr::new(0), 16);
    assert!(heap2.allocate(17).is_none());
    assert_eq!(heap2.alloc_bottom(), Addr::new(16));
}

#[test]
fn reset_alloc_region_restores_the_top_frontier() {
    let mut heap = Heap::new(Addr::new(0), 100);
    heap.allocate(40).unwrap();
    heap.set_compact_top(Addr::new(20));
    heap.reset_alloc_region();
    assert_eq!(heap.alloc_bottom(), Addr::new(100));
    assert_eq!(heap.free_words(), 80);
}

#[test]
fn set_compact_top_updates_the_low_frontier() {
    let mut heap = Heap::new(Addr::new(0), 64);
    heap.set_compact_top(Addr::new(12));
    assert_eq!(heap.compact_top(), Addr::new(12));
}
