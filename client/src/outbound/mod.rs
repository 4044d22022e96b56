//! Outbound adapters implementing the domain ports.
//!
//! - **http**: reqwest client for the backend REST API (auth, rooms, colors,
//!   transactions, dashboard).
//! - **storage**: credential persistence on disk or in memory.
//!
//! Adapters translate between domain types and wire formats. They contain no
//! session or store logic.

pub mod http;
pub mod storage;
