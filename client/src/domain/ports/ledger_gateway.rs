//! Driven port for the bank-import endpoints.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{AuthToken, Transaction};

/// Port for reading, re-categorising, and importing transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetch every transaction.
    async fn list_transactions(&self, token: &AuthToken) -> Result<Vec<Transaction>, GatewayError>;

    /// Replace one transaction with the full entity supplied.
    async fn update_transaction(
        &self,
        token: &AuthToken,
        transaction: &Transaction,
    ) -> Result<(), GatewayError>;

    /// Create a batch of transactions in one request.
    async fn import_transactions(
        &self,
        token: &AuthToken,
        batch: &[Transaction],
    ) -> Result<(), GatewayError>;
}

/// Fixture ledger with no transactions that accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLedgerGateway;

#[async_trait]
impl LedgerGateway for FixtureLedgerGateway {
    async fn list_transactions(
        &self,
        _token: &AuthToken,
    ) -> Result<Vec<Transaction>, GatewayError> {
        Ok(Vec::new())
    }

    async fn update_transaction(
        &self,
        _token: &AuthToken,
        _transaction: &Transaction,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn import_transactions(
        &self,
        _token: &AuthToken,
        _batch: &[Transaction],
    ) -> Result<(), GatewayError> {
        Ok(())
    }
}
