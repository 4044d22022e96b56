//! Room and color collections with confirm-then-apply mutations.
//!
//! Local state changes only after the backend confirms a request. Failed
//! requests are logged and absorbed: the collections simply stay as they were.
//! Every state-writing response is applied only if the session epoch captured
//! when the request was issued is still live.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::color::{resolve_room_name, room_label};
use super::ports::{DashboardStats, HouseGateway};
use super::room::group_by_floor;
use super::scoped_state::ScopedState;
use super::{
    Color, ColorDraft, FloorGroup, ResourceId, Room, RoomDraft, SessionObserver, SessionSnapshot,
    SessionWatch,
};

/// Returned by [`ResourceStore::add_color`] when no rooms exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddColorError {
    /// Colors must reference a room, and the room collection is empty.
    #[error("add a room before adding colors")]
    NoRooms,
}

/// Returned by [`ResourceStore::update_room`]: the backend cannot edit rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rooms cannot be updated; delete and re-create the room instead")]
pub struct RoomUpdateUnsupported;

#[derive(Debug, Default)]
struct HouseState {
    rooms: Vec<Room>,
    colors: Vec<Color>,
}

/// Owner of the room and color collections.
pub struct ResourceStore<G> {
    gateway: Arc<G>,
    state: ScopedState<HouseState>,
}

impl<G> ResourceStore<G> {
    /// Create an empty store bound to `session`.
    pub fn new(gateway: Arc<G>, session: SessionWatch) -> Self {
        Self {
            gateway,
            state: ScopedState::new(session),
        }
    }

    /// Rooms for the live session.
    #[must_use]
    pub fn rooms(&self) -> Vec<Room> {
        self.state.read(|state| state.rooms.clone())
    }

    /// Colors for the live session.
    #[must_use]
    pub fn colors(&self) -> Vec<Color> {
        self.state.read(|state| state.colors.clone())
    }

    /// Name of the room `room_id` refers to, or `"Unknown Room"`.
    #[must_use]
    pub fn get_room_name(&self, room_id: Option<&ResourceId>) -> String {
        self.state
            .read(|state| resolve_room_name(&state.rooms, room_id))
    }

    /// Display label for the room a color belongs to.
    #[must_use]
    pub fn room_label(&self, color: &Color) -> String {
        self.state.read(|state| room_label(&state.rooms, color))
    }

    /// Colors whose room reference matches `room_id`.
    #[must_use]
    pub fn colors_for_room(&self, room_id: &ResourceId) -> Vec<Color> {
        self.state.read(|state| {
            state
                .colors
                .iter()
                .filter(|color| color.room_id.as_ref() == Some(room_id))
                .cloned()
                .collect()
        })
    }

    /// Rooms grouped by floor label.
    #[must_use]
    pub fn rooms_by_floor(&self) -> Vec<FloorGroup> {
        self.state.read(|state| group_by_floor(&state.rooms))
    }

    /// Refuse to edit a room.
    ///
    /// # Errors
    ///
    /// Always returns [`RoomUpdateUnsupported`]; nothing is sent and the
    /// collection is unchanged.
    pub fn update_room(
        &self,
        id: &ResourceId,
        _draft: &RoomDraft,
    ) -> Result<(), RoomUpdateUnsupported> {
        warn!(room_id = %id, "room update requested but not supported by the backend");
        Err(RoomUpdateUnsupported)
    }
}

impl<G: HouseGateway> ResourceStore<G> {
    /// Refetch both collections for the live session.
    pub async fn refresh(&self) {
        tokio::join!(self.fetch_rooms(), self.fetch_colors());
    }

    /// Replace the room collection with the server's.
    ///
    /// On failure the existing collection is kept.
    pub async fn fetch_rooms(&self) {
        let Some((epoch, token)) = self.state.credentials() else {
            debug!("skipping room fetch without an authenticated session");
            return;
        };
        match self.gateway.list_rooms(&token).await {
            Ok(rooms) => {
                let count = rooms.len();
                match self.state.commit(epoch, |state| state.rooms = rooms) {
                    Some(()) => debug!(epoch, count, "rooms loaded"),
                    None => debug!(epoch, "discarding room list for a previous session"),
                }
            }
            Err(error) => warn!(%error, status = error.http_status(), "failed to fetch rooms"),
        }
    }

    /// Replace the color collection with the server's.
    ///
    /// On failure the existing collection is kept.
    pub async fn fetch_colors(&self) {
        let Some((epoch, token)) = self.state.credentials() else {
            debug!("skipping color fetch without an authenticated session");
            return;
        };
        match self.gateway.list_colors(&token).await {
            Ok(colors) => {
                let count = colors.len();
                match self.state.commit(epoch, |state| state.colors = colors) {
                    Some(()) => debug!(epoch, count, "colors loaded"),
                    None => debug!(epoch, "discarding color list for a previous session"),
                }
            }
            Err(error) => warn!(%error, status = error.http_status(), "failed to fetch colors"),
        }
    }

    /// Create a room; the confirmed room is appended and returned.
    ///
    /// Returns `None` when the request failed or the session changed before
    /// the response arrived.
    pub async fn add_room(&self, draft: RoomDraft) -> Option<Room> {
        let Some((epoch, token)) = self.state.credentials() else {
            warn!("cannot add a room without an authenticated session");
            return None;
        };
        let room = match self.gateway.create_room(&token, &draft).await {
            Ok(room) => room,
            Err(error) => {
                warn!(%error, status = error.http_status(), name = draft.name(), "failed to add room");
                return None;
            }
        };
        let added = self.state.commit(epoch, |state| {
            state.rooms.push(room.clone());
            room
        });
        match &added {
            Some(created) => info!(room_id = %created.id, "room added"),
            None => debug!(epoch, "discarding created room for a previous session"),
        }
        added
    }

    /// Delete a room once the backend confirms.
    ///
    /// Colors referencing the room are kept; they resolve to the placeholder
    /// label afterwards.
    pub async fn delete_room(&self, id: &ResourceId) {
        let Some((epoch, token)) = self.state.credentials() else {
            warn!(room_id = %id, "cannot delete a room without an authenticated session");
            return;
        };
        if let Err(error) = self.gateway.delete_room(&token, id).await {
            warn!(%error, status = error.http_status(), room_id = %id, "failed to delete room");
            return;
        }
        match self
            .state
            .commit(epoch, |state| state.rooms.retain(|room| &room.id != id))
        {
            Some(()) => info!(room_id = %id, "room deleted"),
            None => debug!(epoch, room_id = %id, "discarding room deletion for a previous session"),
        }
    }

    /// Create a color; the confirmed color is appended and returned.
    ///
    /// # Errors
    ///
    /// Returns [`AddColorError::NoRooms`] without sending anything when the
    /// room collection is empty. Request failures yield `Ok(None)`.
    pub async fn add_color(&self, draft: ColorDraft) -> Result<Option<Color>, AddColorError> {
        if self.state.read(|state| state.rooms.is_empty()) {
            return Err(AddColorError::NoRooms);
        }
        let Some((epoch, token)) = self.state.credentials() else {
            warn!("cannot add a color without an authenticated session");
            return Ok(None);
        };
        let color = match self.gateway.create_color(&token, &draft).await {
            Ok(color) => color,
            Err(error) => {
                warn!(%error, status = error.http_status(), ncs = draft.ncs(), "failed to add color");
                return Ok(None);
            }
        };
        let added = self.state.commit(epoch, |state| {
            state.colors.push(color.clone());
            color
        });
        match &added {
            Some(created) => info!(color_id = %created.id, "color added"),
            None => debug!(epoch, "discarding created color for a previous session"),
        }
        Ok(added)
    }

    /// Delete a color once the backend confirms.
    pub async fn delete_color(&self, id: &ResourceId) {
        let Some((epoch, token)) = self.state.credentials() else {
            warn!(color_id = %id, "cannot delete a color without an authenticated session");
            return;
        };
        if let Err(error) = self.gateway.delete_color(&token, id).await {
            warn!(%error, status = error.http_status(), color_id = %id, "failed to delete color");
            return;
        }
        match self
            .state
            .commit(epoch, |state| state.colors.retain(|color| &color.id != id))
        {
            Some(()) => info!(color_id = %id, "color deleted"),
            None => debug!(epoch, color_id = %id, "discarding color deletion for a previous session"),
        }
    }

    /// Fetch dashboard aggregates. Never touches the collections.
    pub async fn fetch_stats(&self) -> Option<DashboardStats> {
        let Some((_, token)) = self.state.credentials() else {
            debug!("skipping stats fetch without an authenticated session");
            return None;
        };
        match self.gateway.dashboard_stats(&token).await {
            Ok(stats) => Some(stats),
            Err(error) => {
                warn!(%error, status = error.http_status(), "failed to fetch dashboard stats");
                None
            }
        }
    }
}

#[async_trait]
impl<G: HouseGateway> SessionObserver for ResourceStore<G> {
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
            self.refresh().await;
        } else {
            debug!(epoch, "cleared rooms and colors");
        }
    }
}

#[cfg(test)]
#[path = "resource_store_tests.rs"]
mod tests;
