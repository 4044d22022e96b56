//! Durable storage for the session identity.

mod file_store;
mod memory_store;

pub use file_store::{FileCredentialStore, SESSION_FILE_NAME};
pub use memory_store::InMemoryCredentialStore;
