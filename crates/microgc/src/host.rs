// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Host services consumed by the collector (spec §6.2).
//!
//! The collector never touches a real stack pointer, a real cache
//! controller, or a real scheduler: it only calls through [`Host`]. A
//! host implementation owns the actual mutator threads and the actual
//! machine; the collector owns none of that, mirroring the split
//! between `Platform`/`MemorySpace` and the VM in the donor codebase.

#[cfg(test)]
mod host_test;

use microgc_abi::{Addr, ClassDescriptor};

/// One mutator thread's stack, as seen by a conservative root scan
/// (spec §4.4).
///
/// `base` is the low address and `top` the high address of the region
/// (the collector scans `[base, top)` word by word); `active` marks
/// the thread that called into the collector directly, whose live
/// range starts at [`Host::current_stack_pointer`] rather than at
/// `base` (see [`Host::mutator_stacks`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackRegion {
    /// Low address of the stack region.
    pub base: Addr,
    /// High address (exclusive) of the stack region.
    pub top: Addr,
    /// Whether this is the mutator thread that invoked the collector.
    pub active: bool,
}

/// Services the collector requires from its embedding host (spec §6.2).
pub trait Host {
    /// Read the word at `addr`.
    fn read_word(&self, addr: Addr) -> u64;

    /// Write `word` at `addr`.
    fn write_word(&mut self, addr: Addr, word: u64);

    /// The active mutator's current stack pointer, the start bound for
    /// its own stack scan (spec §6.2).
    fn current_stack_pointer(&self) -> Addr;

    /// Every mutator thread's stack region, including the active one.
    ///
    /// The active thread (`active == true`) is scanned from
    /// [`Host::current_stack_pointer`] to its `top`; every other thread
    /// is halted at a safe point and scanned in full, `[base, top)`.
    fn mutator_stacks(&self) -> &[StackRegion];

    /// Assert the stop-the-world signal: halt every mutator at its next
    /// safe point.
    fn assert_stw(&mut self);

    /// Release the stop-the-world signal, resuming halted mutators.
    fn release_stw(&mut self);

    /// Invalidate the underlying machine's caches, called once at the
    /// end of each compaction (spec §4.1, §4.6 `finish_cycle`).
    fn invalidate_caches(&mut self);

    /// The statically supplied root range: `(base, count)` words that
    /// hold handle identifiers (spec §4.4).
    fn static_refs_range(&self) -> (Addr, u32);

    /// Resolve a class descriptor address to its contract fields
    /// (spec §3.3).
    fn class_descriptor(&self, addr: Addr) -> ClassDescriptor;
}
