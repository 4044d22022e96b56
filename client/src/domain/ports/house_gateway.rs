//! Driven port for the room, color, and dashboard endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GatewayError;
use crate::domain::{AuthToken, Color, ColorDraft, ResourceId, Room, RoomDraft};

/// Aggregate figures shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of colors recorded for the household.
    pub total_colors: u64,
}

/// Port for reading and mutating rooms and colors.
///
/// Every call carries the bearer token of the identity that issued it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HouseGateway: Send + Sync {
    /// Fetch every room.
    async fn list_rooms(&self, token: &AuthToken) -> Result<Vec<Room>, GatewayError>;

    /// Create a room and return it with its server-assigned id.
    async fn create_room(&self, token: &AuthToken, draft: &RoomDraft)
    -> Result<Room, GatewayError>;

    /// Delete a room. Colors referencing it are left untouched.
    async fn delete_room(&self, token: &AuthToken, id: &ResourceId) -> Result<(), GatewayError>;

    /// Fetch every color.
    async fn list_colors(&self, token: &AuthToken) -> Result<Vec<Color>, GatewayError>;

    /// Create a color and return it with its server-assigned id.
    async fn create_color(
        &self,
        token: &AuthToken,
        draft: &ColorDraft,
    ) -> Result<Color, GatewayError>;

    /// Delete a color.
    async fn delete_color(&self, token: &AuthToken, id: &ResourceId) -> Result<(), GatewayError>;

    /// Fetch dashboard aggregates.
    async fn dashboard_stats(&self, token: &AuthToken) -> Result<DashboardStats, GatewayError>;
}

/// Fixture gateway for an empty household that rejects writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureHouseGateway;

#[async_trait]
impl HouseGateway for FixtureHouseGateway {
    async fn list_rooms(&self, _token: &AuthToken) -> Result<Vec<Room>, GatewayError> {
        Ok(Vec::new())
    }

    async fn create_room(
        &self,
        _token: &AuthToken,
        _draft: &RoomDraft,
    ) -> Result<Room, GatewayError> {
        Err(GatewayError::status(503_u16, "fixture gateway is read-only"))
    }

    async fn delete_room(&self, _token: &AuthToken, _id: &ResourceId) -> Result<(), GatewayError> {
        Err(GatewayError::status(503_u16, "fixture gateway is read-only"))
    }

    async fn list_colors(&self, _token: &AuthToken) -> Result<Vec<Color>, GatewayError> {
        Ok(Vec::new())
    }

    async fn create_color(
        &self,
        _token: &AuthToken,
        _draft: &ColorDraft,
    ) -> Result<Color, GatewayError> {
        Err(GatewayError::status(503_u16, "fixture gateway is read-only"))
    }

    async fn delete_color(
        &self,
        _token: &AuthToken,
        _id: &ResourceId,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::status(503_u16, "fixture gateway is read-only"))
    }

    async fn dashboard_stats(&self, _token: &AuthToken) -> Result<DashboardStats, GatewayError> {
        Ok(DashboardStats::default())
    }
}
