//! Session manager: owns the identity and its durable-storage lifecycle.
//!
//! State machine:
//!
//! ```text
//! Restoring ──restore──▶ Authenticated | Anonymous
//! Anonymous ──login────▶ Authenticated
//! Authenticated ─logout▶ Anonymous
//! ```
//!
//! Every transition is published on a watch channel with a bumped epoch.
//! Authentication failures are returned to the caller; storage failures are
//! logged and absorbed.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ports::{AuthGateway, AuthGatewayError, CredentialStore};
use super::{
    Identity, LoginCredentials, LoginValidationError, SessionPhase, SessionSnapshot, SessionWatch,
};

/// Message used when the backend rejects a login without explanation.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Message used when the backend rejects a registration without explanation.
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed";

/// Errors returned by [`SessionManager::login`] and [`SessionManager::register`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The backend rejected the credentials or the registration.
    #[error("{message}")]
    Auth {
        /// Backend-provided text, or a generic fallback.
        message: String,
    },
    /// The backend could not be reached or answered unintelligibly.
    #[error("network error: {message}")]
    Network {
        /// Transport or decoding detail.
        message: String,
    },
    /// Input failed validation before any request was sent.
    #[error(transparent)]
    InvalidCredentials(#[from] LoginValidationError),
    /// A login was attempted while the session is not anonymous.
    #[error("cannot log in while the session is {state}")]
    NotAnonymous {
        /// Human-readable phase name.
        state: &'static str,
    },
}

impl SessionError {
    fn from_gateway(error: AuthGatewayError, fallback: &str) -> Self {
        match error {
            AuthGatewayError::Rejected { message } => {
                let trimmed = message.trim();
                Self::Auth {
                    message: if trimmed.is_empty() {
                        fallback.to_owned()
                    } else {
                        trimmed.to_owned()
                    },
                }
            }
            AuthGatewayError::Transport { message } | AuthGatewayError::Decode { message } => {
                Self::Network { message }
            }
        }
    }
}

const fn phase_name(phase: &SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Restoring => "restoring",
        SessionPhase::Authenticated(_) => "authenticated",
        SessionPhase::Anonymous => "anonymous",
    }
}

/// Owner of the process-wide session.
pub struct SessionManager<A, S> {
    auth: Arc<A>,
    storage: Arc<S>,
    state: watch::Sender<SessionSnapshot>,
}

impl<A, S> SessionManager<A, S> {
    /// Create a manager in the `Restoring` phase.
    pub fn new(auth: Arc<A>, storage: Arc<S>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::restoring());
        Self {
            auth,
            storage,
            state,
        }
    }

    /// Subscribe to session snapshots.
    #[must_use]
    pub fn watch(&self) -> SessionWatch {
        SessionWatch::new(self.state.subscribe())
    }

    /// Latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// True until [`Self::restore`] has run.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Username of the authenticated identity.
    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.state
            .borrow()
            .identity()
            .map(|identity| identity.username().to_owned())
    }
}

impl<A, S> SessionManager<A, S>
where
    A: AuthGateway,
    S: CredentialStore,
{
    /// Restore the identity from durable storage without contacting the
    /// backend.
    ///
    /// Runs once: calls after the first are ignored. Unreadable storage is
    /// cleared and the session becomes anonymous.
    pub fn restore(&self) -> SessionSnapshot {
        if !self.is_loading() {
            debug!("session already restored");
            return self.snapshot();
        }

        let phase = match self.storage.load() {
            Ok(Some(identity)) => {
                info!(username = identity.username(), "session restored from storage");
                SessionPhase::Authenticated(identity)
            }
            Ok(None) => {
                debug!("no stored session");
                SessionPhase::Anonymous
            }
            Err(error) => {
                warn!(%error, "stored session unreadable; clearing");
                if let Err(clear_error) = self.storage.clear() {
                    warn!(error = %clear_error, "failed to clear unreadable session");
                }
                SessionPhase::Anonymous
            }
        };

        self.state.send_if_modified(|snapshot| {
            if !snapshot.is_loading() {
                return false;
            }
            snapshot.advance(phase);
            true
        });
        self.snapshot()
    }

    /// Authenticate and persist the identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] with the backend message (or
    /// [`LOGIN_FAILED_MESSAGE`]) when credentials are rejected,
    /// [`SessionError::Network`] when the backend is unreachable, and
    /// [`SessionError::NotAnonymous`] when the session is not anonymous.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, SessionError> {
        let credentials = LoginCredentials::try_from_parts(username, password)?;
        self.ensure_anonymous()?;

        let identity = self
            .auth
            .login(&credentials)
            .await
            .map_err(|error| SessionError::from_gateway(error, LOGIN_FAILED_MESSAGE))?;

        let mut rejected_phase = None;
        let applied = self.state.send_if_modified(|snapshot| {
            if matches!(snapshot.phase(), SessionPhase::Anonymous) {
                snapshot.advance(SessionPhase::Authenticated(identity.clone()));
                true
            } else {
                rejected_phase = Some(phase_name(snapshot.phase()));
                false
            }
        });
        if !applied {
            let state = rejected_phase.unwrap_or("authenticated");
            warn!(state, "session changed during login; discarding new identity");
            return Err(SessionError::NotAnonymous { state });
        }

        if let Err(error) = self.storage.save(&identity) {
            warn!(%error, "failed to persist session; it will not survive a restart");
        }
        info!(username = identity.username(), "logged in");
        Ok(identity)
    }

    /// Create an account. The session is not changed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] with the backend message (or
    /// [`REGISTRATION_FAILED_MESSAGE`]) on rejection and
    /// [`SessionError::Network`] when the backend is unreachable.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let credentials = LoginCredentials::try_from_parts(username, password)?;
        self.auth
            .register(&credentials)
            .await
            .map_err(|error| SessionError::from_gateway(error, REGISTRATION_FAILED_MESSAGE))?;
        info!(username = credentials.username(), "registered");
        Ok(())
    }

    /// End the session.
    ///
    /// Synchronous: when this returns, durable storage is cleared and the new
    /// epoch is published, so store reads are already empty.
    pub fn logout(&self) {
        let ended = self.state.send_if_modified(|snapshot| {
            if snapshot.is_authenticated() {
                snapshot.advance(SessionPhase::Anonymous);
                true
            } else {
                false
            }
        });
        if !ended {
            debug!("logout ignored; no authenticated session");
            return;
        }
        if let Err(error) = self.storage.clear() {
            warn!(%error, "failed to clear stored session");
        }
        info!("logged out");
    }

    fn ensure_anonymous(&self) -> Result<(), SessionError> {
        let snapshot = self.state.borrow();
        match snapshot.phase() {
            SessionPhase::Anonymous => Ok(()),
            other => Err(SessionError::NotAnonymous {
                state: phase_name(other),
            }),
        }
    }
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
