//! Driven port for durable storage of the session identity.
//!
//! Storage is synchronous: it is written on login, cleared on logout, and read
//! once at startup, and the session manager is its only writer.

use super::define_port_error;
use crate::domain::Identity;

define_port_error! {
    /// Errors raised by credential storage backends.
    pub enum CredentialStoreError {
        /// The storage medium could not be read or written.
        Io { message: String } =>
            "credential storage unavailable: {message}",
        /// Stored data exists but cannot be interpreted.
        Corrupt { message: String } =>
            "stored credentials are unreadable: {message}",
    }
}

/// Port for persisting the token and username across restarts.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Read the stored identity. `Ok(None)` means nothing is stored.
    fn load(&self) -> Result<Option<Identity>, CredentialStoreError>;

    /// Persist the identity, replacing any previous one.
    fn save(&self, identity: &Identity) -> Result<(), CredentialStoreError>;

    /// Remove any stored identity. Clearing empty storage succeeds.
    fn clear(&self) -> Result<(), CredentialStoreError>;
}
