// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The collector's single global mutex (spec §5).
//!
//! "A single global mutex suffices given the small step sizes" (spec
//! §9). With the `std` feature this is `std::sync::Mutex`; without it
//! (bare-metal, the processor this collector was designed for) it
//! falls back to a spinlock, the same `std`/`no_std` duality the donor
//! VM crate keeps between its hosted and seL4 platform layers.

#[cfg(feature = "std")]
pub(crate) struct GcMutex<T>(std::sync::Mutex<T>);

#[cfg(feature = "std")]
impl<T> GcMutex<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(std::sync::Mutex::new(value))
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(not(feature = "std"))]
pub(crate) struct GcMutex<T>(spin::Mutex<T>);

#[cfg(not(feature = "std"))]
impl<T> GcMutex<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(spin::Mutex::new(value))
    }

    pub(crate) fn lock(&self) -> spin::MutexGuard<'_, T> {
        self.0.lock()
    }
}
