//! Render lock
//!
//! One render at a time per backend instance. Callers never wait: a second
//! concurrent request is refused immediately.

use std::sync::{Mutex, MutexGuard, TryLockError};

/// Non-blocking mutual exclusion for renders
#[derive(Debug, Default)]
pub struct RenderLock {
    inner: Mutex<()>,
}

/// Held for the duration of one render; released on drop
pub struct RenderGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl RenderLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock, or returns `None` if a render is in progress
    pub fn try_acquire(&self) -> Option<RenderGuard<'_>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(RenderGuard { _guard: guard }),
            // The lock protects no data, a panicked render leaves nothing to repair
            Err(TryLockError::Poisoned(poisoned)) => Some(RenderGuard {
                _guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_second_acquire_is_refused() {
        let lock = RenderLock::new();
        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.try_acquire().is_none());

        drop(guard);
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let lock = Arc::new(RenderLock::new());
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.try_acquire();
            panic!("render panicked");
        })
        .join();

        assert!(lock.try_acquire().is_some());
    }
}
