//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Every backend capability the stores depend on is a trait here; the reqwest
//! adapter in `outbound::http` implements them for production, and tests
//! substitute mocks or in-memory doubles.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod credential_store;
mod gateway_error;
mod house_gateway;
mod ledger_gateway;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::{AuthGateway, AuthGatewayError, FIXTURE_TOKEN, FixtureAuthGateway};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use gateway_error::{GatewayError, UNAUTHORIZED_STATUS};
#[cfg(test)]
pub use house_gateway::MockHouseGateway;
pub use house_gateway::{DashboardStats, FixtureHouseGateway, HouseGateway};
#[cfg(test)]
pub use ledger_gateway::MockLedgerGateway;
pub use ledger_gateway::{FixtureLedgerGateway, LedgerGateway};
