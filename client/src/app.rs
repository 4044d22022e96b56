//! Composition root wiring adapters into the session manager and stores.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{ClientSettings, SettingsError};
use crate::domain::ports::{AuthGateway, CredentialStore, HouseGateway, LedgerGateway};
use crate::domain::{
    LedgerController, ResourceStore, SessionManager, SessionObserver, SessionSnapshot,
    spawn_session_subscription,
};
use crate::outbound::http::{ApiClient, ApiClientError};
use crate::outbound::storage::FileCredentialStore;

/// Errors raised while assembling the production application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Settings could not be interpreted.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ApiClientError),
}

/// The session manager and both stores, sharing one session channel.
pub struct HouseholdApp<A, H, L, S> {
    session: SessionManager<A, S>,
    resources: Arc<ResourceStore<H>>,
    ledger: Arc<LedgerController<L>>,
}

/// Application backed by the HTTP adapter and on-disk credential storage.
pub type HttpHouseholdApp = HouseholdApp<ApiClient, ApiClient, ApiClient, FileCredentialStore>;

impl HttpHouseholdApp {
    /// Build the production application from settings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] for an invalid base URL or when the HTTP client
    /// cannot be constructed.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, AppError> {
        let client = Arc::new(ApiClient::new(
            settings.api_base_url()?,
            settings.request_timeout(),
        )?);
        let storage = Arc::new(FileCredentialStore::new(settings.storage_dir()));
        debug!(
            base_url = %client.base_url(),
            storage_dir = %storage.directory().display(),
            "household client configured"
        );
        Ok(Self::with_ports(
            Arc::clone(&client),
            Arc::clone(&client),
            client,
            storage,
        ))
    }
}

impl<A, H, L, S> HouseholdApp<A, H, L, S> {
    /// Wire explicit port implementations.
    pub fn with_ports(auth: Arc<A>, house: Arc<H>, ledger: Arc<L>, storage: Arc<S>) -> Self {
        let session = SessionManager::new(auth, storage);
        let resources = Arc::new(ResourceStore::new(house, session.watch()));
        let ledger = Arc::new(LedgerController::new(ledger, session.watch()));
        Self {
            session,
            resources,
            ledger,
        }
    }

    /// Session manager.
    #[must_use]
    pub const fn session(&self) -> &SessionManager<A, S> {
        &self.session
    }

    /// Room and color store.
    #[must_use]
    pub fn resources(&self) -> &ResourceStore<H> {
        &self.resources
    }

    /// Transaction controller.
    #[must_use]
    pub fn ledger(&self) -> &LedgerController<L> {
        &self.ledger
    }
}

impl<A, H, L, S> HouseholdApp<A, H, L, S>
where
    A: AuthGateway,
    H: HouseGateway + 'static,
    L: LedgerGateway + 'static,
    S: CredentialStore,
{
    /// Restore the persisted session and subscribe both stores to session
    /// changes. Must be called from within a Tokio runtime.
    ///
    /// The returned handles finish when the application is dropped.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.session.restore();
        vec![
            spawn_session_subscription(Arc::clone(&self.resources), self.session.watch()),
            spawn_session_subscription(Arc::clone(&self.ledger), self.session.watch()),
        ]
    }

    /// Run both stores' session handlers for the current snapshot inline,
    /// without background subscriptions.
    pub async fn sync_now(&self) -> SessionSnapshot {
        let snapshot = self.session.snapshot();
        tokio::join!(
            self.resources.on_session_change(&snapshot),
            self.ledger.on_session_change(&snapshot),
        );
        snapshot
    }
}
