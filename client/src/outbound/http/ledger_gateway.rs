//! `LedgerGateway` over the `BankImport` endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::domain::ports::{GatewayError, LedgerGateway};
use crate::domain::{AuthToken, Transaction};

const TRANSACTIONS: &str = "BankImport";
const IMPORT_PATH: [&str; 2] = [TRANSACTIONS, "import"];

#[async_trait]
impl LedgerGateway for ApiClient {
    async fn list_transactions(&self, token: &AuthToken) -> Result<Vec<Transaction>, GatewayError> {
        self.execute_json(
            self.authorized(Method::GET, token, &[TRANSACTIONS]),
            "transaction list",
        )
        .await
    }

    async fn update_transaction(
        &self,
        token: &AuthToken,
        transaction: &Transaction,
    ) -> Result<(), GatewayError> {
        let segment = transaction.id.canonical();
        let request = self
            .authorized(Method::PUT, token, &[TRANSACTIONS, segment.as_ref()])
            .json(transaction);
        self.execute(request).await?;
        Ok(())
    }

    async fn import_transactions(
        &self,
        token: &AuthToken,
        batch: &[Transaction],
    ) -> Result<(), GatewayError> {
        let request = self.authorized(Method::POST, token, &IMPORT_PATH).json(batch);
        self.execute(request).await?;
        Ok(())
    }
}
