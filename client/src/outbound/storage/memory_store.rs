//! Process-local credential storage for tests and ephemeral sessions.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::Identity;
use crate::domain::ports::{CredentialStore, CredentialStoreError};

/// Credential store that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    slot: Mutex<Option<Identity>>,
}

impl InMemoryCredentialStore {
    /// Store pre-populated with `identity`, as if saved by an earlier run.
    #[must_use]
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            slot: Mutex::new(Some(identity)),
        }
    }

    /// Identity currently held, if any.
    #[must_use]
    pub fn stored(&self) -> Option<Identity> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Identity>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Identity>, CredentialStoreError> {
        Ok(self.stored())
    }

    fn save(&self, identity: &Identity) -> Result<(), CredentialStoreError> {
        *self.slot() = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.slot() = None;
        Ok(())
    }
}
