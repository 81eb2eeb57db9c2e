// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! A heap-allocated [`Memory`] implementation for tests and host
//! prototyping.
//!
//! Real hosts back the collector with whatever word-addressable store
//! their machine exposes (SRAM, a memory-mapped region, ...); `MockMemory`
//! stands in for that during development and in the crate's own test
//! suite, the same role `MockVSpace` plays for the donor VM's platform
//! layer.

#[cfg(test)]
mod mock_test;

use crate::host::{Host, StackRegion};
use crate::mem::Memory;
use microgc_abi::{Addr, ClassDescriptor, Word};

#[cfg(feature = "std")]
use std::{collections::BTreeMap, vec, vec::Vec};

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, vec, vec::Vec};

/// A flat `Vec<Word>`-backed memory.
pub struct MockMemory {
    words: Vec<Word>,
}

impl MockMemory {
    /// Create a zero-initialized memory of `len_words` words.
    #[must_use]
    pub fn new(len_words: u64) -> Self {
        Self {
            words: vec![0; usize_from(len_words)],
        }
    }
}

impl Memory for MockMemory {
    fn read(&self, addr: Addr) -> Word {
        self.words[usize_from(addr.as_u64())]
    }

    fn write(&mut self, addr: Addr, word: Word) {
        self.words[usize_from(addr.as_u64())] = word;
    }

    fn len_words(&self) -> u64 {
        self.words.len() as u64
    }
}

fn usize_from(words: u64) -> usize {
    usize::try_from(words).expect("word offset exceeds usize on this host")
}

/// A single-threaded [`Host`] for tests: one `MockMemory`, a registry
/// of class descriptors keyed by address, a configurable set of
/// mutator stack regions, and a counter tracking how many times
/// stop-the-world has been asserted (so tests can assert a cycle
/// actually halted mutators).
pub struct MockHost {
    memory: MockMemory,
    classes: BTreeMap<Addr, ClassDescriptor>,
    stacks: Vec<StackRegion>,
    active_sp: Addr,
    static_refs: (Addr, u32),
    stw_asserts: u64,
    stw_active: bool,
    cache_invalidations: u64,
}

impl MockHost {
    /// Create a host over a `len_words`-word memory with no static
    /// roots and no mutator stacks registered yet.
    #[must_use]
    pub fn new(len_words: u64) -> Self {
        Self {
            memory: MockMemory::new(len_words),
            classes: BTreeMap::new(),
            stacks: Vec::new(),
            active_sp: Addr::null(),
            static_refs: (Addr::null(), 0),
            stw_asserts: 0,
            stw_active: false,
            cache_invalidations: 0,
        }
    }

    /// Direct read access to the backing memory, for test assertions.
    #[must_use]
    pub fn memory(&self) -> &MockMemory {
        &self.memory
    }

    /// Direct write access to the backing memory, for test setup.
    pub fn memory_mut(&mut self) -> &mut MockMemory {
        &mut self.memory
    }

    /// Register a class descriptor so `new_object`/marking can resolve it.
    pub fn register_class(&mut self, addr: Addr, desc: ClassDescriptor) {
        self.classes.insert(addr, desc);
    }

    /// Declare the `(base, count)` static root range (spec §4.4).
    pub fn set_static_refs(&mut self, base: Addr, count: u32) {
        self.static_refs = (base, count);
    }

    /// Set the active mutator's current stack pointer and the top of
    /// its stack region, registering (or replacing) its entry in
    /// [`Host::mutator_stacks`].
    pub fn set_active_stack(&mut self, sp: Addr, top: Addr) {
        self.active_sp = sp;
        self.stacks.retain(|r| !r.active);
        self.stacks.push(StackRegion {
            base: sp,
            top,
            active: true,
        });
    }

    /// Register an additional, inactive mutator thread's stack region.
    pub fn add_inactive_stack(&mut self, base: Addr, top: Addr) {
        self.stacks.push(StackRegion {
            base,
            top,
            active: false,
        });
    }

    /// Number of times `assert_stw` has been called, for scheduling tests.
    #[must_use]
    pub fn stw_asserts(&self) -> u64 {
        self.stw_asserts
    }

    /// Whether the collector currently holds the stop-the-world signal.
    #[must_use]
    pub fn stw_active(&self) -> bool {
        self.stw_active
    }

    /// Number of times `invalidate_caches` has been called.
    #[must_use]
    pub fn cache_invalidations(&self) -> u64 {
        self.cache_invalidations
    }
}

impl Host for MockHost {
    fn read_word(&self, addr: Addr) -> u64 {
        self.memory.read(addr)
    }

    fn write_word(&mut self, addr: Addr, word: u64) {
        self.memory.write(addr, word);
    }

    fn current_stack_pointer(&self) -> Addr {
        self.active_sp
    }

    fn mutator_stacks(&self) -> &[StackRegion] {
        &self.stacks
    }

    fn assert_stw(&mut self) {
        self.stw_asserts += 1;
        self.stw_active = true;
    }

    fn release_stw(&mut self) {
        self.stw_active = false;
    }

    fn invalidate_caches(&mut self) {
        self.cache_invalidations += 1;
    }

    fn static_refs_range(&self) -> (Addr, u32) {
        self.static_refs
    }

    fn class_descriptor(&self, addr: Addr) -> ClassDescriptor {
        *self
            .classes
            .get(&addr)
            .expect("test host asked for an unregistered class descriptor")
    }
}
