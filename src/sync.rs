//! Poison recovery for the `RwLock`s that guard shared handles
//!
//! Poisoned guards are taken over and logged, never propagated.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Extension trait for `RwLock` with poison recovery
pub(crate) trait RwLockExt<T> {
    /// Acquire a read lock, recovering from poison errors
    fn read_recovered(&self) -> RwLockReadGuard<'_, T>;

    /// Acquire a write lock, recovering from poison errors
    fn write_recovered(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (read), recovering");
            poisoned.into_inner()
        })
    }

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (write), recovering");
            poisoned.into_inner()
        })
    }
}
