//! Test utilities shared by unit and integration tests.
//!
//! Compiled for the crate's own tests and, for integration suites, behind the
//! `test-support` feature.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::ports::{
    AuthGateway, AuthGatewayError, DashboardStats, GatewayError, HouseGateway, LedgerGateway,
    UNAUTHORIZED_STATUS,
};
use crate::domain::{
    AuthToken, Color, ColorDraft, Identity, LoginCredentials, ResourceId, Room, RoomDraft,
    Transaction,
};

/// Backend calls that can be made to fail or held open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BackendOperation {
    /// `POST /auth/login`.
    Login,
    /// `POST /auth/register`.
    Register,
    /// `GET /RoomManager`.
    ListRooms,
    /// `POST /RoomManager`.
    CreateRoom,
    /// `DELETE /RoomManager/{id}`.
    DeleteRoom,
    /// `GET /ColorTracker`.
    ListColors,
    /// `POST /ColorTracker`.
    CreateColor,
    /// `DELETE /ColorTracker/{id}`.
    DeleteColor,
    /// `GET /Dashboard/stats`.
    Stats,
    /// `GET /BankImport`.
    ListTransactions,
    /// `PUT /BankImport/{id}`.
    UpdateTransaction,
    /// `POST /BankImport/import`.
    ImportTransactions,
}

#[derive(Debug, Default)]
struct Household {
    rooms: Vec<Room>,
    colors: Vec<Color>,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct BackendState {
    passwords: HashMap<String, String>,
    sessions: HashMap<String, String>,
    households: HashMap<String, Household>,
    failing: BTreeSet<BackendOperation>,
    held: BTreeSet<BackendOperation>,
    calls: Vec<BackendOperation>,
}

/// In-memory stand-in for the household backend.
///
/// Each user owns a separate household. Operations can be made to fail, and
/// can be held open until released, to exercise in-flight races.
#[derive(Debug)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
    next_id: AtomicU64,
    next_token: AtomicU64,
    gate: watch::Sender<u64>,
    pending: AtomicUsize,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        let (gate, _) = watch::channel(0);
        Self {
            state: Mutex::new(BackendState::default()),
            next_id: AtomicU64::new(1),
            next_token: AtomicU64::new(1),
            gate,
            pending: AtomicUsize::new(0),
        }
    }
}

impl InMemoryBackend {
    /// Register `username` with `password`.
    pub fn add_user(&self, username: &str, password: &str) {
        let mut state = self.lock();
        state
            .passwords
            .insert(username.to_owned(), password.to_owned());
        state.households.entry(username.to_owned()).or_default();
    }

    /// Insert a room for `username` with a fresh numeric id.
    #[must_use = "the seeded room carries the generated id"]
    pub fn seed_room(&self, username: &str, name: &str, floor: &str) -> Room {
        let room = Room {
            id: self.fresh_id(),
            name: name.to_owned(),
            function: crate::domain::DEFAULT_ROOM_FUNCTION.to_owned(),
            floor: floor.to_owned(),
            area: None,
        };
        self.household(username, |household| household.rooms.push(room.clone()));
        room
    }

    /// Insert a color for `username` referencing `room_id`.
    #[must_use = "the seeded color carries the generated id"]
    pub fn seed_color(&self, username: &str, ncs: &str, name: &str, room_id: &ResourceId) -> Color {
        let color = Color {
            id: self.fresh_id(),
            ncs: ncs.to_owned(),
            name: name.to_owned(),
            room_id: Some(room_id.clone()),
            room: None,
        };
        self.household(username, |household| household.colors.push(color.clone()));
        color
    }

    /// Insert transactions for `username` as given.
    pub fn seed_transactions(&self, username: &str, transactions: Vec<Transaction>) {
        self.household(username, |household| household.transactions.extend(transactions));
    }

    /// Transactions as the backend currently stores them for `username`.
    #[must_use]
    pub fn transactions_of(&self, username: &str) -> Vec<Transaction> {
        self.lock()
            .households
            .get(username)
            .map(|household| household.transactions.clone())
            .unwrap_or_default()
    }

    /// Rooms as the backend currently stores them for `username`.
    #[must_use]
    pub fn rooms_of(&self, username: &str) -> Vec<Room> {
        self.lock()
            .households
            .get(username)
            .map(|household| household.rooms.clone())
            .unwrap_or_default()
    }

    /// Make every subsequent `operation` fail with status 500.
    pub fn fail(&self, operation: BackendOperation) {
        self.lock().failing.insert(operation);
    }

    /// Let `operation` succeed again.
    pub fn recover(&self, operation: BackendOperation) {
        self.lock().failing.remove(&operation);
    }

    /// Hold every subsequent `operation` until [`Self::release`] is called.
    pub fn hold(&self, operation: BackendOperation) {
        self.lock().held.insert(operation);
    }

    /// Release every held call and stop holding new ones.
    pub fn release(&self) {
        self.lock().held.clear();
        self.gate.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Number of calls currently waiting on a hold.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` calls are held.
    pub async fn wait_for_pending(&self, count: usize) {
        while self.pending() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Every operation received, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendOperation> {
        self.lock().calls.clone()
    }

    /// How many times `operation` was received.
    #[must_use]
    pub fn call_count(&self, operation: BackendOperation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_id(&self) -> ResourceId {
        let next = self.next_id.fetch_add(1, Ordering::SeqCst);
        ResourceId::Number(i64::try_from(next).unwrap_or(i64::MAX))
    }

    fn household<R>(&self, username: &str, change: impl FnOnce(&mut Household) -> R) -> R {
        change(self.lock().households.entry(username.to_owned()).or_default())
    }

    /// Record the call, wait out any hold, then report whether it should fail.
    async fn enter(&self, operation: BackendOperation) -> bool {
        let (held, generation) = {
            let mut state = self.lock();
            state.calls.push(operation);
            (state.held.contains(&operation), *self.gate.borrow())
        };
        if held {
            let mut gate = self.gate.subscribe();
            self.pending.fetch_add(1, Ordering::SeqCst);
            let _released = gate.wait_for(|current| *current != generation).await;
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
        self.lock().failing.contains(&operation)
    }

    async fn authorize(
        &self,
        operation: BackendOperation,
        token: &AuthToken,
    ) -> Result<String, GatewayError> {
        let should_fail = self.enter(operation).await;
        let username = self
            .lock()
            .sessions
            .get(token.expose())
            .cloned()
            .ok_or_else(|| GatewayError::status(UNAUTHORIZED_STATUS, "Unauthorized"))?;
        if should_fail {
            return Err(GatewayError::status(500_u16, format!("{operation:?} failed")));
        }
        Ok(username)
    }
}

#[async_trait]
impl AuthGateway for InMemoryBackend {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, AuthGatewayError> {
        if self.enter(BackendOperation::Login).await {
            return Err(AuthGatewayError::transport("connection refused"));
        }
        let mut state = self.lock();
        let known = state.passwords.get(credentials.username()).map(String::as_str);
        if known != Some(credentials.password()) {
            return Err(AuthGatewayError::rejected("Invalid username or password"));
        }
        let serial = self.next_token.fetch_add(1, Ordering::SeqCst);
        let token = format!("token-{}-{serial}", credentials.username());
        state
            .sessions
            .insert(token.clone(), credentials.username().to_owned());
        Ok(Identity::new(credentials.username(), AuthToken::new(token)))
    }

    async fn register(&self, credentials: &LoginCredentials) -> Result<(), AuthGatewayError> {
        if self.enter(BackendOperation::Register).await {
            return Err(AuthGatewayError::transport("connection refused"));
        }
        if self.lock().passwords.contains_key(credentials.username()) {
            return Err(AuthGatewayError::rejected("Username already exists"));
        }
        self.add_user(credentials.username(), credentials.password());
        Ok(())
    }
}

#[async_trait]
impl HouseGateway for InMemoryBackend {
    async fn list_rooms(&self, token: &AuthToken) -> Result<Vec<Room>, GatewayError> {
        let username = self.authorize(BackendOperation::ListRooms, token).await?;
        Ok(self.household(&username, |household| household.rooms.clone()))
    }

    async fn create_room(&self, token: &AuthToken, draft: &RoomDraft) -> Result<Room, GatewayError> {
        let username = self.authorize(BackendOperation::CreateRoom, token).await?;
        let room = Room {
            id: self.fresh_id(),
            name: draft.name().to_owned(),
            function: draft.function().to_owned(),
            floor: draft.floor().to_owned(),
            area: draft.area(),
        };
        self.household(&username, |household| household.rooms.push(room.clone()));
        Ok(room)
    }

    async fn delete_room(&self, token: &AuthToken, id: &ResourceId) -> Result<(), GatewayError> {
        let username = self.authorize(BackendOperation::DeleteRoom, token).await?;
        self.household(&username, |household| {
            let before = household.rooms.len();
            household.rooms.retain(|room| &room.id != id);
            if household.rooms.len() == before {
                Err(GatewayError::status(404_u16, "Room not found"))
            } else {
                Ok(())
            }
        })
    }

    async fn list_colors(&self, token: &AuthToken) -> Result<Vec<Color>, GatewayError> {
        let username = self.authorize(BackendOperation::ListColors, token).await?;
        Ok(self.household(&username, |household| household.colors.clone()))
    }

    async fn create_color(
        &self,
        token: &AuthToken,
        draft: &ColorDraft,
    ) -> Result<Color, GatewayError> {
        let username = self.authorize(BackendOperation::CreateColor, token).await?;
        let color = Color {
            id: self.fresh_id(),
            ncs: draft.ncs().to_owned(),
            name: draft.name().to_owned(),
            room_id: Some(draft.room_id().clone()),
            room: None,
        };
        self.household(&username, |household| household.colors.push(color.clone()));
        Ok(color)
    }

    async fn delete_color(&self, token: &AuthToken, id: &ResourceId) -> Result<(), GatewayError> {
        let username = self.authorize(BackendOperation::DeleteColor, token).await?;
        self.household(&username, |household| {
            let before = household.colors.len();
            household.colors.retain(|color| &color.id != id);
            if household.colors.len() == before {
                Err(GatewayError::status(404_u16, "Color not found"))
            } else {
                Ok(())
            }
        })
    }

    async fn dashboard_stats(&self, token: &AuthToken) -> Result<DashboardStats, GatewayError> {
        let username = self.authorize(BackendOperation::Stats, token).await?;
        let total = self.household(&username, |household| household.colors.len());
        Ok(DashboardStats {
            total_colors: u64::try_from(total).unwrap_or(u64::MAX),
        })
    }
}

#[async_trait]
impl LedgerGateway for InMemoryBackend {
    async fn list_transactions(&self, token: &AuthToken) -> Result<Vec<Transaction>, GatewayError> {
        let username = self
            .authorize(BackendOperation::ListTransactions, token)
            .await?;
        Ok(self.household(&username, |household| household.transactions.clone()))
    }

    async fn update_transaction(
        &self,
        token: &AuthToken,
        transaction: &Transaction,
    ) -> Result<(), GatewayError> {
        let username = self
            .authorize(BackendOperation::UpdateTransaction, token)
            .await?;
        self.household(&username, |household| {
            let stored = household
                .transactions
                .iter_mut()
                .find(|existing| existing.id == transaction.id)
                .ok_or_else(|| GatewayError::status(404_u16, "Transaction not found"))?;
            stored.clone_from(transaction);
            Ok(())
        })
    }

    async fn import_transactions(
        &self,
        token: &AuthToken,
        batch: &[Transaction],
    ) -> Result<(), GatewayError> {
        let username = self
            .authorize(BackendOperation::ImportTransactions, token)
            .await?;
        self.household(&username, |household| {
            let clash = batch.iter().any(|incoming| {
                household
                    .transactions
                    .iter()
                    .any(|existing| existing.id == incoming.id)
            });
            if clash {
                return Err(GatewayError::status(409_u16, "Duplicate transaction id"));
            }
            household.transactions.extend_from_slice(batch);
            Ok(())
        })
    }
}

/// Temporary directory paired with a file credential store rooted in it.
///
/// # Errors
///
/// Returns the I/O error raised while creating the directory.
#[cfg(feature = "test-support")]
pub fn temp_credential_store()
-> std::io::Result<(tempfile::TempDir, crate::outbound::storage::FileCredentialStore)> {
    let directory = tempfile::tempdir()?;
    let store = crate::outbound::storage::FileCredentialStore::new(directory.path().join("session"));
    Ok((directory, store))
}
