//! Transaction collection with optimistic category updates, and the local
//! category taxonomy.
//!
//! `update_category` applies the change before the backend answers and
//! restores the full prior collection if the request fails. Concurrent
//! updates to the same transaction are not ordered: whichever response
//! arrives last determines the final local value, and a late rollback can
//! overwrite a change that another call already had confirmed.
//!
//! Imports are confirm-then-refetch: nothing is applied locally until the
//! backend accepts the batch, after which the collection is reloaded.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use super::ports::LedgerGateway;
use super::scoped_state::ScopedState;
use super::{
    CategoryTaxonomy, ResourceId, SessionObserver, SessionSnapshot, SessionWatch, Transaction,
    TransactionDate,
};

#[derive(Debug, Default)]
struct LedgerState {
    transactions: Vec<Transaction>,
    categories: CategoryTaxonomy,
}

/// Owner of the transaction collection and the session's category list.
pub struct LedgerController<G> {
    gateway: Arc<G>,
    state: ScopedState<LedgerState>,
}

impl<G> LedgerController<G> {
    /// Create an empty controller bound to `session`.
    pub fn new(gateway: Arc<G>, session: SessionWatch) -> Self {
        Self {
            gateway,
            state: ScopedState::new(session),
        }
    }

    /// Transactions for the live session.
    #[must_use]
    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.read(|state| state.transactions.clone())
    }

    /// Category names offered for the live session.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.state.read(|state| state.categories.names().to_vec())
    }

    /// Add a category locally. Returns `true` when the list changed.
    pub fn add_category(&self, name: &str) -> bool {
        self.state
            .commit(self.state.live_epoch(), |state| state.categories.add(name))
            .unwrap_or(false)
    }

    /// Remove a category locally. Transactions using it keep their value.
    pub fn remove_category(&self, name: &str) -> bool {
        self.state
            .commit(self.state.live_epoch(), |state| state.categories.remove(name))
            .unwrap_or(false)
    }
}

impl<G: LedgerGateway> LedgerController<G> {
    /// Replace the transaction collection with the server's.
    ///
    /// On failure the existing collection is kept.
    pub async fn fetch_transactions(&self) {
        let Some((epoch, token)) = self.state.credentials() else {
            debug!("skipping transaction fetch without an authenticated session");
            return;
        };
        match self.gateway.list_transactions(&token).await {
            Ok(transactions) => {
                let count = transactions.len();
                match self
                    .state
                    .commit(epoch, |state| state.transactions = transactions)
                {
                    Some(()) => debug!(epoch, count, "transactions loaded"),
                    None => debug!(epoch, "discarding transactions for a previous session"),
                }
            }
            Err(error) => {
                warn!(%error, status = error.http_status(), "failed to fetch transactions");
            }
        }
    }

    /// Re-categorise one transaction optimistically.
    ///
    /// The new category is visible immediately. If the backend rejects the
    /// update, the whole collection is restored to its state before the call.
    /// Unknown ids send nothing.
    pub async fn update_category(&self, id: &ResourceId, category: &str) {
        let Some((epoch, token)) = self.state.credentials() else {
            warn!(transaction_id = %id, "cannot update a transaction without an authenticated session");
            return;
        };
        let prepared = self
            .state
            .commit(epoch, |state| {
                let snapshot = state.transactions.clone();
                let target = state
                    .transactions
                    .iter_mut()
                    .find(|transaction| &transaction.id == id)?;
                category.clone_into(&mut target.category);
                Some((snapshot, target.clone()))
            })
            .flatten();
        let Some((snapshot, updated)) = prepared else {
            debug!(transaction_id = %id, "no such transaction; nothing sent");
            return;
        };

        match self.gateway.update_transaction(&token, &updated).await {
            Ok(()) => debug!(transaction_id = %id, category, "category update confirmed"),
            Err(error) => {
                warn!(%error, status = error.http_status(), transaction_id = %id, "category update failed; rolling back");
                if self
                    .state
                    .commit(epoch, |state| state.transactions = snapshot)
                    .is_none()
                {
                    debug!(epoch, "session changed; rollback skipped");
                }
            }
        }
    }

    /// Send `batch` as one import, then reload the collection on success.
    pub async fn import_transactions(&self, batch: Vec<Transaction>) {
        let Some((epoch, token)) = self.state.credentials() else {
            warn!("cannot import transactions without an authenticated session");
            return;
        };
        let size = batch.len();
        if let Err(error) = self.gateway.import_transactions(&token, &batch).await {
            warn!(%error, status = error.http_status(), size, "transaction import failed");
            return;
        }
        if self.state.live_epoch() != epoch {
            debug!(epoch, "session changed during import; skipping reload");
            return;
        }
        info!(size, "transactions imported");
        self.fetch_transactions().await;
    }

    /// Import the demonstration batch from [`demo_import_batch`].
    pub async fn simulate_import(&self) {
        self.import_transactions(demo_import_batch()).await;
    }
}

#[async_trait]
impl<G: LedgerGateway> SessionObserver for LedgerController<G> {
    async fn on_session_change(&self, snapshot: &SessionSnapshot) {
        if snapshot.is_loading() {
            return;
        }
        let epoch = snapshot.epoch();
        if epoch != self.state.live_epoch() {
            debug!(epoch, "skipping superseded session change");
            return;
        }
        self.state.reset(epoch);
        if snapshot.is_authenticated() {
            self.fetch_transactions().await;
        } else {
            debug!(epoch, "cleared transactions and categories");
        }
    }
}

/// Two bank transactions with fresh client-generated ids.
#[must_use]
pub fn demo_import_batch() -> Vec<Transaction> {
    [
        ((2023, 10, 25), "ICA SUPERMARKET", "Groceries", -450.0),
        ((2023, 10, 24), "SPOTIFY", "Entertainment", -119.0),
    ]
    .into_iter()
    .map(|((year, month, day), description, category, amount)| Transaction {
        id: ResourceId::random(),
        date: import_date(year, month, day),
        description: description.to_owned(),
        category: category.to_owned(),
        amount,
    })
    .collect()
}

fn import_date(year: i32, month: u32, day: u32) -> TransactionDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_or_else(
            || TransactionDate::new(format!("{year:04}-{month:02}-{day:02}")),
            |stamp| TransactionDate::new(stamp.format("%Y-%m-%dT%H:%M:%S").to_string()),
        )
}

#[cfg(test)]
#[path = "ledger_controller_tests.rs"]
mod tests;
