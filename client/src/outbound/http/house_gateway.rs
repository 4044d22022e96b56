//! `HouseGateway` over the `RoomManager`, `ColorTracker`, and `Dashboard`
//! endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::domain::ports::{DashboardStats, GatewayError, HouseGateway};
use crate::domain::{AuthToken, Color, ColorDraft, ResourceId, Room, RoomDraft};

const ROOMS: &str = "RoomManager";
const COLORS: &str = "ColorTracker";
const STATS_PATH: [&str; 2] = ["Dashboard", "stats"];

#[async_trait]
impl HouseGateway for ApiClient {
    async fn list_rooms(&self, token: &AuthToken) -> Result<Vec<Room>, GatewayError> {
        self.execute_json(self.authorized(Method::GET, token, &[ROOMS]), "room list")
            .await
    }

    async fn create_room(&self, token: &AuthToken, draft: &RoomDraft) -> Result<Room, GatewayError> {
        let request = self.authorized(Method::POST, token, &[ROOMS]).json(draft);
        self.execute_json(request, "created room").await
    }

    async fn delete_room(&self, token: &AuthToken, id: &ResourceId) -> Result<(), GatewayError> {
        let segment = id.canonical();
        self.execute(self.authorized(Method::DELETE, token, &[ROOMS, segment.as_ref()]))
            .await?;
        Ok(())
    }

    async fn list_colors(&self, token: &AuthToken) -> Result<Vec<Color>, GatewayError> {
        self.execute_json(self.authorized(Method::GET, token, &[COLORS]), "color list")
            .await
    }

    async fn create_color(
        &self,
        token: &AuthToken,
        draft: &ColorDraft,
    ) -> Result<Color, GatewayError> {
        let request = self.authorized(Method::POST, token, &[COLORS]).json(draft);
        self.execute_json(request, "created color").await
    }

    async fn delete_color(&self, token: &AuthToken, id: &ResourceId) -> Result<(), GatewayError> {
        let segment = id.canonical();
        self.execute(self.authorized(Method::DELETE, token, &[COLORS, segment.as_ref()]))
            .await?;
        Ok(())
    }

    async fn dashboard_stats(&self, token: &AuthToken) -> Result<DashboardStats, GatewayError> {
        self.execute_json(
            self.authorized(Method::GET, token, &STATS_PATH),
            "dashboard stats",
        )
        .await
    }
}
