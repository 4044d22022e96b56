//! File-backed credential storage.
//!
//! The identity is kept as one small JSON document inside the configured
//! storage directory. Writes go to a staging file first and are renamed into
//! place, so a crash never leaves a half-written session behind.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{AuthToken, Identity};

/// File name of the stored session inside the storage directory.
pub const SESSION_FILE_NAME: &str = "session.json";
const STAGING_FILE_NAME: &str = "session.json.tmp";

#[derive(Serialize)]
struct StoredSessionRef<'a> {
    token: &'a str,
    username: &'a str,
}

#[derive(Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Credential store writing `session.json` under a directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    directory: PathBuf,
}

impl FileCredentialStore {
    /// Store credentials under `directory`, created on first save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory holding the session file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn open_existing(&self) -> Result<Option<Dir>, CredentialStoreError> {
        match Dir::open_ambient_dir(&self.directory, ambient_authority()) {
            Ok(directory) => Ok(Some(directory)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }

    fn io_error(&self, error: &io::Error) -> CredentialStoreError {
        CredentialStoreError::io(format!("{}: {error}", self.directory.display()))
    }
}

fn decode(raw: &str) -> Result<Identity, CredentialStoreError> {
    let stored: StoredSession = serde_json::from_str(raw)
        .map_err(|error| CredentialStoreError::corrupt(error.to_string()))?;
    let token = stored
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| CredentialStoreError::corrupt("stored session has no token"))?;
    let username = stored
        .username
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| CredentialStoreError::corrupt("stored session has no username"))?;
    Ok(Identity::new(username, AuthToken::new(token)))
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Identity>, CredentialStoreError> {
        let Some(directory) = self.open_existing()? else {
            return Ok(None);
        };
        let raw = match directory.read_to_string(SESSION_FILE_NAME) {
            Ok(raw) => Zeroizing::new(raw),
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(&error)),
        };
        decode(&raw).map(Some)
    }

    fn save(&self, identity: &Identity) -> Result<(), CredentialStoreError> {
        Dir::create_ambient_dir_all(&self.directory, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let directory = Dir::open_ambient_dir(&self.directory, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let document = Zeroizing::new(
            serde_json::to_vec(&StoredSessionRef {
                token: identity.token().expose(),
                username: identity.username(),
            })
            .map_err(|error| CredentialStoreError::io(error.to_string()))?,
        );
        directory
            .write(STAGING_FILE_NAME, document.as_slice())
            .map_err(|error| self.io_error(&error))?;
        directory
            .rename(STAGING_FILE_NAME, &directory, SESSION_FILE_NAME)
            .map_err(|error| self.io_error(&error))?;
        debug!(directory = %self.directory.display(), "session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        let Some(directory) = self.open_existing()? else {
            return Ok(());
        };
        match directory.remove_file(SESSION_FILE_NAME) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}
