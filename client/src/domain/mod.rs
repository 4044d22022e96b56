//! Domain entities, session lifecycle, and the stores that synchronize
//! server-backed collections.
//!
//! Purpose: own the client's in-memory copies of rooms, colors, and
//! transactions, and keep them consistent with the authenticated session.
//!
//! Public surface:
//! - `SessionManager`: login, registration, logout, and startup restore.
//! - `ResourceStore`: rooms and colors, confirm-then-apply.
//! - `LedgerController`: transactions with optimistic category updates and
//!   the local category taxonomy.
//! - Entities (`Room`, `Color`, `Transaction`) and their creation drafts.
//!
//! Stores observe the session through `SessionWatch`. Every identity change
//! bumps the session epoch; reads never expose state tagged with an older
//! epoch, and responses to requests issued under an older epoch are dropped.

pub mod ports;

mod auth;
mod category;
mod color;
mod ids;
mod ledger_controller;
mod lenient;
mod resource_store;
mod room;
mod scoped_state;
mod session;
mod session_manager;
#[cfg(test)]
mod store_test_helpers;
mod transaction;

pub use self::auth::{AuthToken, Identity, LoginCredentials, LoginValidationError};
pub use self::category::{CategoryTaxonomy, DEFAULT_CATEGORIES};
pub use self::color::{Color, ColorDraft, ColorDraftError, resolve_room_name, room_label};
pub use self::ids::ResourceId;
pub use self::ledger_controller::{LedgerController, demo_import_batch};
pub use self::resource_store::{AddColorError, ResourceStore, RoomUpdateUnsupported};
pub use self::room::{
    DEFAULT_ROOM_FLOOR, DEFAULT_ROOM_FUNCTION, FloorGroup, Room, RoomDraft, RoomDraftError,
    UNASSIGNED_LABEL, UNKNOWN_ROOM_LABEL, group_by_floor,
};
pub use self::session::{
    SessionObserver, SessionPhase, SessionSnapshot, SessionWatch, spawn_session_subscription,
};
pub use self::session_manager::{
    LOGIN_FAILED_MESSAGE, REGISTRATION_FAILED_MESSAGE, SessionError, SessionManager,
};
pub use self::transaction::{Transaction, TransactionDate, format_kronor};
