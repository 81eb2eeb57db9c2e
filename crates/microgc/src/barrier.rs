// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The snapshot-at-beginning (Yuasa) write barrier (spec §4.7).
//!
//! Graysifies the value a mutator is about to overwrite, not the value
//! being installed: incremental marking may already have passed the
//! writer's object, so a deleted edge is the only way the collector
//! would otherwise learn the old referent was once reachable.

#[cfg(test)]
mod barrier_test;

use crate::handle::HandleTable;
use crate::host::Host;
use crate::marker;
use microgc_abi::{GcError, HandleId, ObjectKind};

/// Inspect and, if warranted, graysify the value about to be
/// overwritten at `field_index` of `handle` (spec §4.7 "Algorithm").
/// Must be called *before* the mutator performs the actual store.
///
/// # Errors
///
/// Returns [`GcError::NullDereference`] if `handle` is `None`.
pub fn write_barrier<H: Host>(
    handles: &mut HandleTable,
    host: &H,
    live_epoch: u8,
    handle: Option<HandleId>,
    field_index: u32,
) -> Result<(), GcError> {
    let Some(handle) = handle else {
        return Err(GcError::NullDereference);
    };

    let is_ref_slot = match handles.get(handle).kind {
        ObjectKind::Object { class } => host.class_descriptor(class).ref_bitmap.is_ref(field_index),
        ObjectKind::RefArray { .. } => true,
        ObjectKind::PrimArray { .. } => false,
    };
    if !is_ref_slot {
        return Ok(());
    }

    let data_ptr = handles.get(handle).data_ptr;
    let old = host.read_word(data_ptr.add(u64::from(field_index)));
    let Ok(old_index) = u32::try_from(old) else {
        return Ok(());
    };
    if old_index >= handles.capacity() {
        return Ok(());
    }
    let old_id = HandleId::from_index(old_index);
    let old_handle = handles.get(old_id);
    if old_handle.is_free() || old_handle.is_black(live_epoch) {
        return Ok(());
    }
    marker::push(handles, live_epoch, old_id);
    Ok(())
}
