//! Session snapshots and the subscription that keeps stores in step with them.
//!
//! The session manager publishes a [`SessionSnapshot`] on a `tokio::sync::watch`
//! channel. Every identity transition increments the snapshot `epoch`; stores
//! capture the epoch when they issue a request and drop the response if the
//! epoch has moved on by the time it arrives.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{AuthToken, Identity};

/// Lifecycle phase of the process-wide session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Durable storage has not been consulted yet.
    Restoring,
    /// A token and username are held.
    Authenticated(Identity),
    /// No identity is held.
    Anonymous,
}

/// Session state paired with its identity epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    epoch: u64,
    phase: SessionPhase,
}

impl SessionSnapshot {
    /// Initial snapshot before restore has run.
    #[must_use]
    pub const fn restoring() -> Self {
        Self {
            epoch: 0,
            phase: SessionPhase::Restoring,
        }
    }

    /// Monotonic counter bumped on every identity transition.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Authenticated identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match &self.phase {
            SessionPhase::Authenticated(identity) => Some(identity),
            SessionPhase::Restoring | SessionPhase::Anonymous => None,
        }
    }

    /// True until the restore step has completed. Stores must not fetch
    /// while this holds.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Restoring)
    }

    /// Whether a token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub(crate) fn advance(&mut self, phase: SessionPhase) {
        self.epoch = self.epoch.saturating_add(1);
        self.phase = phase;
    }
}

/// Read-only view of the published session.
#[derive(Debug, Clone)]
pub struct SessionWatch {
    receiver: watch::Receiver<SessionSnapshot>,
}

impl SessionWatch {
    pub(crate) const fn new(receiver: watch::Receiver<SessionSnapshot>) -> Self {
        Self { receiver }
    }

    /// Clone of the latest snapshot.
    #[must_use]
    pub fn current(&self) -> SessionSnapshot {
        self.receiver.borrow().clone()
    }

    /// Epoch of the latest snapshot.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.receiver.borrow().epoch
    }

    /// Epoch and token when authenticated.
    pub(crate) fn credentials(&self) -> Option<(u64, AuthToken)> {
        let snapshot = self.receiver.borrow();
        snapshot
            .identity()
            .map(|identity| (snapshot.epoch, identity.token().clone()))
    }

    /// Mark the latest snapshot as seen and return it.
    pub fn mark_seen(&mut self) -> SessionSnapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the session manager has been dropped.
    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.mark_seen())
    }
}

/// Component that reacts to identity changes.
///
/// Implementations either refetch their collections (authenticated) or clear
/// them (anonymous); a snapshot that is still restoring is ignored.
#[async_trait]
pub trait SessionObserver: Send + Sync {
    /// Handle a newly published snapshot.
    async fn on_session_change(&self, snapshot: &SessionSnapshot);
}

/// Drive `observer` from the session channel until the manager is dropped.
///
/// The observer first sees the snapshot current at spawn time, then every
/// subsequent change. Changes published while the observer is busy coalesce
/// into the latest snapshot.
pub fn spawn_session_subscription<O>(observer: Arc<O>, mut session: SessionWatch) -> JoinHandle<()>
where
    O: SessionObserver + ?Sized + 'static,
{
    tokio::spawn(async move {
        let initial = session.mark_seen();
        observer.on_session_change(&initial).await;
        while let Some(snapshot) = session.changed().await {
            observer.on_session_change(&snapshot).await;
        }
        debug!("session channel closed; subscription finished");
    })
}
