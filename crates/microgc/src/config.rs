// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Collector configuration (spec §6.4).
//!
//! Built once at [`crate::Collector::init`] and immutable afterward, the
//! same shape as the donor's per-process constant modules
//! (`process::X_REG_COUNT`, `process::INITIAL_YOUNG_HEAP_SIZE`, ...)
//! except gathered into one struct so a host can tune several knobs
//! together and hand them to `init` as a single value.

#[cfg(test)]
mod config_test;

use microgc_abi::GcError;

/// Default handle table capacity (spec §4.2: "the repository uses
/// 65536 entries").
pub const DEFAULT_HANDLE_CAP: u32 = 65536;

/// Default gray entries processed per `gcIncrement` (spec §4.8).
pub const DEFAULT_MARK_STEP: u32 = 20;

/// Default handles compacted per `gcIncrement` (spec §4.8).
pub const DEFAULT_COMPACT_STEP: u32 = 10;

/// Default free-space denominator below which a cycle starts
/// proactively: `1 / DEFAULT_FREE_THRESHOLD_FRACTION` of heap capacity
/// (spec §4.8, §6.4).
pub const DEFAULT_FREE_THRESHOLD_FRACTION: u32 = 4;

/// Tunable collector parameters (spec §6.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum handle table size.
    pub handle_cap: u32,
    /// Gray entries processed per increment.
    pub mark_step: u32,
    /// Handles compacted per increment.
    pub compact_step: u32,
    /// Heap fraction (`1 / n`) below which a cycle is started
    /// proactively.
    pub free_threshold_fraction: u32,
    /// If `true`, disable mark-compact and use linear bump allocation
    /// within the current region; `gc()` then raises `OutOfMemory`
    /// immediately (spec §6.4, §9 "Scoped/immortal regions").
    pub use_scopes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handle_cap: DEFAULT_HANDLE_CAP,
            mark_step: DEFAULT_MARK_STEP,
            compact_step: DEFAULT_COMPACT_STEP,
            free_threshold_fraction: DEFAULT_FREE_THRESHOLD_FRACTION,
            use_scopes: false,
        }
    }
}

impl Config {
    /// Validate that `mark_step`, `compact_step`, and
    /// `free_threshold_fraction` are positive (spec §4.8: "Constants
    /// `MARK_STEP` and `COMPACT_STEP` must be positive").
    ///
    /// # Errors
    ///
    /// A zero step size can never make incremental progress, so it is
    /// reported as [`GcError::OutOfMemory`]: the collector would never
    /// keep pace with allocation.
    pub fn validate(self) -> Result<Self, GcError> {
        if self.mark_step == 0 || self.compact_step == 0 || self.free_threshold_fraction == 0 {
            return Err(GcError::OutOfMemory);
        }
        Ok(self)
    }
}
