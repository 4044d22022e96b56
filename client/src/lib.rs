//! Client-side state synchronization for the household manager.
//!
//! A [`domain::SessionManager`] owns the authenticated identity. The
//! [`domain::ResourceStore`] (rooms and colors) and the
//! [`domain::LedgerController`] (transactions and categories) observe it and
//! clear or reload their collections whenever the identity changes.

pub mod app;
pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{AppError, HouseholdApp, HttpHouseholdApp};
pub use config::ClientSettings;
