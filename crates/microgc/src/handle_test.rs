// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use microgc_abi::ElemKind;

fn prim(length: u32) -> ObjectKind {
    ObjectKind::PrimArray {
        elem_kind: ElemKind::Byte,
        length,
    }
}

#[test]
fn new_table_is_all_free() {
    let table = HandleTable::new(4);
    assert_eq!(table.capacity(), 4);
    assert_eq!(table.live_count(), 0);
}

#[test]
fn acquire_moves_a_handle_off_the_free_list_onto_the_use_list() {
    let mut table = HandleTable::new(4);
    let h = table.acquire_free(Addr::new(10), prim(0), 1).unwrap();
    assert_eq!(table.live_count(), 1);
    assert!(table.is_valid_use_handle(h));
    assert!(!table.get(h).is_free());
    assert_eq!(table.get(h).mark, 1);
}

#[test]
fn exhaustion_reports_handle_exhausted() {
    let mut table = HandleTable::new(1);
    // slot 0 is permanently reserved, so capacity-1 handles are acquirable.
    let err = table.acquire_free(Addr::new(1), prim(0), 1).unwrap_err();
    assert_eq!(err, GcError::HandleExhausted);
}

#[test]
fn slot_zero_is_never_handed_out() {
    let mut table = HandleTable::new(8);
    for _ in 0..7 {
        let h = table.acquire_free(Addr::new(1), prim(0), 1).unwrap();
        assert_ne!(h, HandleId::NULL);
    }
    assert!(table.acquire_free(Addr::new(1), prim(0), 1).is_err());
}

#[test]
fn release_raw_returns_a_handle_to_the_free_list_and_clears_data_ptr() {
    let mut table = HandleTable::new(4);
    let h = table.acquire_free(Addr::new(10), prim(0), 1).unwrap();
    table.use_list_ids().for_each(drop);
    // Detach via the raw compactor path, mirroring how compact_step frees dead handles.
    table.release_raw(h.index());
    assert!(table.get(h).is_free());
    assert_eq!(table.live_count(), 0);
}

#[test]
fn gray_push_is_idempotent() {
    let mut table = HandleTable::new(4);
    let h = table.acquire_free(Addr::new(10), prim(0), 1).unwrap();
    assert!(!table.get(h).on_gray_list());
    table.gray_push(h);
    assert!(table.get(h).on_gray_list());
    table.gray_push(h);
    assert_eq!(table.gray_pop(), Some(h));
    assert_eq!(table.gray_pop(), None);
}

#[test]
fn gray_list_is_lifo() {
    let mut table = HandleTable::new(4);
    let a = table.acquire_free(Addr::new(1), prim(0), 1).unwrap();
    let b = table.acquire_free(Addr::new(2), prim(0), 1).unwrap();
    table.gray_push(a);
    table.gray_push(b);
    assert_eq!(table.gray_pop(), Some(b));
    assert_eq!(table.gray_pop(), Some(a));
    assert!(table.gray_is_empty());
}

#[test]
fn sorted_snapshot_is_ascending_by_data_ptr() {
    let mut table = HandleTable::new(8);
    table.acquire_free(Addr::new(30), prim(0), 1).unwrap();
    table.acquire_free(Addr::new(10), prim(0), 1).unwrap();
    table.acquire_free(Addr::new(20), prim(0), 1).unwrap();

    let mut head = table.take_sorted_use_list();
    let mut seen = Vec::new();
    while head != HandleTable::list_end() {
        let id = HandleId::from_index(head);
        seen.push(table.get(id).data_ptr.as_u64());
        head = table.raw_next(head);
    }
    assert_eq!(seen, vec![10, 20, 30]);
}

#[test]
fn use_list_is_empty_after_taking_the_sorted_snapshot() {
    let mut table = HandleTable::new(4);
    table.acquire_free(Addr::new(1), prim(0), 1).unwrap();
    table.take_sorted_use_list();
    assert_eq!(table.use_list_ids().count(), 0);
}

#[test]
fn is_valid_use_handle_is_false_for_a_freed_handle() {
    let mut table = HandleTable::new(4);
    let h = table.acquire_free(Addr::new(1), prim(0), 1).unwrap();
    table.release_raw(h.index());
    assert!(!table.is_valid_use_handle(h));
}
