//! Reqwest adapter for the household backend REST API.
//!
//! One [`ApiClient`] implements every backend port. Paths are resolved under
//! the configured base URL; all calls except login and registration carry a
//! bearer token.

mod api_client;
mod auth_gateway;
mod dto;
mod house_gateway;
mod ledger_gateway;

pub use api_client::{ApiClient, ApiClientError};
