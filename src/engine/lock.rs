//! Process-wide serialization of native engine calls.

use std::sync::{Mutex, MutexGuard, PoisonError};

static ENGINE_LOCK: Mutex<()> = Mutex::new(());

/// Entry point to the global engine lock.
#[derive(Debug)]
pub struct EngineLock;

/// Held while native calls are in progress; released on drop.
#[derive(Debug)]
pub struct EngineGuard {
    _guard: MutexGuard<'static, ()>,
}

impl EngineLock {
    /// Block until no other thread is inside the native engine.
    ///
    /// The lock protects no data, so a poisoned lock is simply taken over.
    pub fn acquire() -> EngineGuard {
        let guard = ENGINE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        log::trace!("Engine lock acquired");
        EngineGuard { _guard: guard }
    }
}
