// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use crate::mock::MockHost;
use microgc_abi::{Addr, ClassDescriptor, RefBitmap};

fn obj(class: Addr) -> ObjectKind {
    ObjectKind::Object { class }
}

#[test]
fn push_ignores_an_already_black_handle() {
    let mut handles = HandleTable::new(4);
    let h = handles.acquire_free(Addr::new(1), obj(Addr::new(0)), 1).unwrap();
    handles.get_mut(h).mark = 1; // already black in epoch 1
    push(&mut handles, 1, h);
    assert!(!handles.get(h).on_gray_list());
}

#[test]
fn push_is_idempotent() {
    let mut handles = HandleTable::new(4);
    let h = handles.acquire_free(Addr::new(1), obj(Addr::new(0)), 2).unwrap();
    push(&mut handles, 1, h);
    push(&mut handles, 1, h);
    assert!(handles.get(h).on_gray_list());
    assert_eq!(handles.gray_pop(), Some(h));
    assert_eq!(handles.gray_pop(), None);
}

#[test]
fn trace_one_blackens_and_pushes_children_via_the_ref_bitmap() {
    let mut host = MockHost::new(32);
    let class = Addr::new(0);
    // Two reference fields, at word offsets 0 and 1.
    host.register_class(class, ClassDescriptor::new(2, RefBitmap(0b11)));

    let mut handles = HandleTable::new(8);
    let child_a = handles.acquire_free(Addr::new(20), obj(class), 2).unwrap();
    let child_b = handles.acquire_free(Addr::new(22), obj(class), 2).unwrap();
    let parent = handles.acquire_free(Addr::new(10), obj(class), 2).unwrap();

    host.write_word(Addr::new(10), u64::from(child_a.index()));
    host.write_word(Addr::new(11), u64::from(child_b.index()));

    handles.gray_push(parent);
    trace_one(&mut handles, &host, 1);

    assert!(handles.get(parent).is_black(1));
    assert!(handles.get(child_a).on_gray_list());
    assert!(handles.get(child_b).on_gray_list());
}

#[test]
fn trace_one_does_not_descend_into_non_reference_fields() {
    let mut host = MockHost::new(32);
    let class = Addr::new(0);
    // Only field 0 is a reference; field 1 is primitive garbage.
    host.register_class(class, ClassDescriptor::new(2, RefBitmap(0b01)));

    let mut handles = HandleTable::new(8);
    let parent = handles.acquire_free(Addr::new(10), obj(class), 2).unwrap();
    host.write_word(Addr::new(10), 0); // null-ish
    host.write_word(Addr::new(11), 0xFFFF_FFFF); // would look like a huge handle index

    handles.gray_push(parent);
    trace_one(&mut handles, &host, 1);
    assert!(handles.gray_is_empty());
}

#[test]
fn prim_array_has_no_children() {
    let host = MockHost::new(32);
    let mut handles = HandleTable::new(8);
    let id = handles
        .acquire_free(
            Addr::new(10),
            ObjectKind::PrimArray {
                elem_kind: microgc_abi::ElemKind::Int,
                length: 4,
            },
            2,
        )
        .unwrap();
    handles.gray_push(id);
    trace_one(&mut handles, &host, 1);
    assert!(handles.get(id).is_black(1));
    assert!(handles.gray_is_empty());
}

#[test]
fn ref_array_pushes_every_element() {
    let mut host = MockHost::new(32);
    let class = Addr::new(0);
    host.register_class(class, ClassDescriptor::new(1, RefBitmap(0b1)));

    let mut handles = HandleTable::new(8);
    let elem = handles.acquire_free(Addr::new(20), obj(class), 2).unwrap();
    let arr = handles
        .acquire_free(Addr::new(10), ObjectKind::RefArray { length: 1 }, 2)
        .unwrap();
    host.write_word(Addr::new(10), u64::from(elem.index()));

    handles.gray_push(arr);
    trace_one(&mut handles, &host, 1);
    assert!(handles.get(elem).on_gray_list());
}

#[test]
fn mark_step_is_bounded_by_n_and_reports_emptiness() {
    let host = MockHost::new(32);
    let mut handles = HandleTable::new(8);
    let a = handles.acquire_free(Addr::new(1), ObjectKind::PrimArray { elem_kind: microgc_abi::ElemKind::Byte, length: 0 }, 2).unwrap();
    let b = handles.acquire_free(Addr::new(2), ObjectKind::PrimArray { elem_kind: microgc_abi::ElemKind::Byte, length: 0 }, 2).unwrap();
    handles.gray_push(a);
    handles.gray_push(b);

    let done = mark_step(&mut handles, &host, 1, 1);
    assert!(!done);
    let done = mark_step(&mut handles, &host, 1, 1);
    assert!(done);
}
