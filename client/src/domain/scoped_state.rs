//! Store state tagged with the session epoch it belongs to.
//!
//! Reads compare the tag with the live session epoch and yield the default
//! (empty) value on mismatch, so data fetched for one identity is never
//! observable once the identity changes, even before the store has been told
//! to clear. Writes carry the epoch captured when their request was issued and
//! are discarded when the session has moved on.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{AuthToken, SessionWatch};

#[derive(Debug)]
struct Tagged<T> {
    epoch: u64,
    value: T,
}

/// Interior-mutable state scoped to one session epoch.
#[derive(Debug)]
pub(crate) struct ScopedState<T> {
    session: SessionWatch,
    inner: RwLock<Tagged<T>>,
}

impl<T: Default> ScopedState<T> {
    pub(crate) fn new(session: SessionWatch) -> Self {
        let epoch = session.epoch();
        Self {
            session,
            inner: RwLock::new(Tagged {
                epoch,
                value: T::default(),
            }),
        }
    }

    /// Read the state for the live epoch.
    pub(crate) fn read<R>(&self, view: impl FnOnce(&T) -> R) -> R {
        let live = self.session.epoch();
        let guard = self.read_guard();
        if guard.epoch == live {
            view(&guard.value)
        } else {
            drop(guard);
            view(&T::default())
        }
    }

    /// Apply `change` if `captured` is still the live epoch.
    ///
    /// State left over from an older epoch is reset to the default before
    /// `change` runs. Returns `None` when the write was discarded. The epoch
    /// is checked under the write lock, so a commit racing a logout can never
    /// move the tag behind a newer reset.
    pub(crate) fn commit<R>(&self, captured: u64, change: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.write_guard();
        if captured != self.session.epoch() || guard.epoch > captured {
            return None;
        }
        if guard.epoch != captured {
            guard.epoch = captured;
            guard.value = T::default();
        }
        Some(change(&mut guard.value))
    }

    /// Clear state left over from before `epoch`.
    ///
    /// State already tagged with `epoch` belongs to the live session and is
    /// kept. The tag never moves backwards.
    pub(crate) fn reset(&self, epoch: u64) {
        let mut guard = self.write_guard();
        if epoch > guard.epoch {
            guard.epoch = epoch;
            guard.value = T::default();
        }
    }

    /// Epoch the live session is in.
    pub(crate) fn live_epoch(&self) -> u64 {
        self.session.epoch()
    }

    /// Live epoch and bearer token, when a session is authenticated.
    pub(crate) fn credentials(&self) -> Option<(u64, AuthToken)> {
        self.session.credentials()
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Tagged<T>> {
        // Writers never panic mid-update, so a poisoned lock still holds a
        // consistent value.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Tagged<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
