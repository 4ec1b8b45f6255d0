//! Non-reentrancy lock for mutating engine calls.
//!
//! Token callbacks run while an operation is in flight. A callback that
//! re-enters any mutating operation on the same thread is rejected with
//! [`Error::Reentrancy`]; read-only queries stay available. Calls from other
//! threads wait until the in-flight operation finishes.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use crate::error::{Error, Result};

/// One-at-a-time lock over mutating operations
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    owner: Mutex<Option<ThreadId>>,
    released: Condvar,
}

impl ReentrancyLock {
    /// Create an unlocked lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter, failing if the current thread already holds the lock
    pub fn enter(&self) -> Result<ReentrancyGuard<'_>> {
        let current = thread::current().id();
        let mut owner = self.owner.lock().map_err(|_| Error::Lock)?;
        loop {
            match *owner {
                None => break,
                Some(id) if id == current => {
                    tracing::warn!("Rejected reentrant engine call");
                    return Err(Error::Reentrancy);
                }
                Some(_) => {
                    owner = self.released.wait(owner).map_err(|_| Error::Lock)?;
                }
            }
        }
        *owner = Some(current);
        Ok(ReentrancyGuard { lock: self })
    }

    /// Whether an operation is currently in flight
    pub fn is_entered(&self) -> bool {
        self.owner().is_some()
    }

    fn owner(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.owner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the lock when dropped, including on early return
#[derive(Debug)]
pub struct ReentrancyGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        *self.lock.owner() = None;
        self.lock.released.notify_one();
    }
}
