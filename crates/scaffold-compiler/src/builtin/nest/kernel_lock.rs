// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Exclusive access to a simulation kernel.

A kernel is either leased by one single-instance adapter, or shared by
several multi-instance adapters that each hold a distinct suffix. Leases are
released when dropped.
*/

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use crate::types::{CompileError, CompileResult};

#[derive(Debug)]
enum LockState {
    Single,
    Multi(BTreeSet<String>),
}

static KERNEL_LOCKS: Lazy<Mutex<HashMap<String, LockState>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// How an adapter wants to hold a kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockMode {
    Single,
    /// Shared with other multi-instance adapters; the suffix tells them apart
    Multi { suffix: String },
}

/// A held lease on a kernel
#[derive(Debug)]
pub struct KernelLease {
    kernel: String,
    mode: LockMode,
}

impl KernelLease {
    /// Lease `kernel`
    ///
    /// # Errors
    ///
    /// [`CompileError::KernelLocked`] if the kernel is held by a single-instance
    /// adapter, if a single lease is requested for a held kernel, or if the
    /// suffix is already in use.
    pub fn acquire(kernel: &str, mode: LockMode) -> CompileResult<Self> {
        let mut locks = KERNEL_LOCKS.lock();
        let locked = |message: &str| CompileError::KernelLocked {
            kernel: kernel.to_string(),
            message: message.to_string(),
        };

        match (&mode, locks.entry(kernel.to_string())) {
            (LockMode::Single, Entry::Vacant(slot)) => {
                slot.insert(LockState::Single);
            }
            (LockMode::Single, Entry::Occupied(_)) => {
                return Err(locked("the kernel is already locked by another adapter"));
            }
            (LockMode::Multi { suffix }, Entry::Vacant(slot)) => {
                slot.insert(LockState::Multi(BTreeSet::from([suffix.clone()])));
            }
            (LockMode::Multi { suffix }, Entry::Occupied(mut held)) => match held.get_mut() {
                LockState::Single => {
                    return Err(locked(
                        "the kernel is locked by a single-instance adapter and cannot be managed by multiple instances",
                    ));
                }
                LockState::Multi(suffixes) => {
                    if !suffixes.insert(suffix.clone()) {
                        return Err(locked("the kernel is already locked by an instance with the same suffix"));
                    }
                }
            },
        }

        debug!(target: "scaffold-compiler", "[KERNEL] Locked '{}' ({:?})", kernel, mode);
        Ok(Self {
            kernel: kernel.to_string(),
            mode,
        })
    }

    pub fn kernel(&self) -> &str {
        &self.kernel
    }

    pub fn mode(&self) -> &LockMode {
        &self.mode
    }

    /// Whether no other adapter shares the kernel
    pub fn in_full_control(&self) -> bool {
        match KERNEL_LOCKS.lock().get(&self.kernel) {
            Some(LockState::Single) => true,
            Some(LockState::Multi(suffixes)) => suffixes.len() == 1,
            None => false,
        }
    }
}

impl Drop for KernelLease {
    fn drop(&mut self) {
        let mut locks = KERNEL_LOCKS.lock();
        let remove = match (&self.mode, locks.get_mut(&self.kernel)) {
            (LockMode::Multi { suffix }, Some(LockState::Multi(suffixes))) => {
                suffixes.remove(suffix);
                suffixes.is_empty()
            }
            _ => true,
        };
        if remove {
            locks.remove(&self.kernel);
        }
        debug!(target: "scaffold-compiler", "[KERNEL] Released '{}'", self.kernel);
    }
}

/// Whether any adapter holds `kernel`
pub fn is_locked(kernel: &str) -> bool {
    KERNEL_LOCKS.lock().contains_key(kernel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi(suffix: &str) -> LockMode {
        LockMode::Multi {
            suffix: suffix.to_string(),
        }
    }

    #[test]
    fn test_single_lease_is_exclusive() {
        let lease = KernelLease::acquire("test-single", LockMode::Single).unwrap();
        assert!(lease.in_full_control());
        assert!(matches!(
            KernelLease::acquire("test-single", LockMode::Single),
            Err(CompileError::KernelLocked { .. })
        ));
        assert!(KernelLease::acquire("test-single", multi("a")).is_err());

        drop(lease);
        assert!(!is_locked("test-single"));
        assert!(KernelLease::acquire("test-single", LockMode::Single).is_ok());
    }

    #[test]
    fn test_multi_leases_share_by_suffix() {
        let first = KernelLease::acquire("test-multi", multi("a")).unwrap();
        assert!(first.in_full_control());

        let second = KernelLease::acquire("test-multi", multi("b")).unwrap();
        assert!(!first.in_full_control());
        assert!(KernelLease::acquire("test-multi", multi("b")).is_err());
        assert!(KernelLease::acquire("test-multi", LockMode::Single).is_err());

        drop(first);
        assert!(second.in_full_control());
        drop(second);
        assert!(!is_locked("test-multi"));
    }
}
