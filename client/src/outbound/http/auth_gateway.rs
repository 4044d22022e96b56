//! `AuthGateway` over `POST /auth/login` and `POST /auth/register`.
//!
//! Non-success responses carry plain-text error bodies; the text is passed
//! through unchanged so the session layer can show it or fall back to a
//! generic message when it is empty.

use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use super::api_client::map_transport_error;
use super::dto::{CredentialsDto, LoginResponseDto};
use crate::domain::ports::{AuthGateway, AuthGatewayError, GatewayError};
use crate::domain::{Identity, LoginCredentials};

const LOGIN_PATH: [&str; 2] = ["auth", "login"];
const REGISTER_PATH: [&str; 2] = ["auth", "register"];

impl ApiClient {
    async fn post_credentials(
        &self,
        path: &[&str],
        credentials: &LoginCredentials,
    ) -> Result<Vec<u8>, AuthGatewayError> {
        let response = self
            .request(Method::POST, path)
            .json(&CredentialsDto::from(credentials))
            .send()
            .await
            .map_err(|error| into_auth_error(map_transport_error(error)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| into_auth_error(map_transport_error(error)))?;
        if !status.is_success() {
            return Err(AuthGatewayError::rejected(
                String::from_utf8_lossy(&body).trim(),
            ));
        }
        Ok(body.to_vec())
    }
}

fn into_auth_error(error: GatewayError) -> AuthGatewayError {
    match error {
        GatewayError::Decode { message } => AuthGatewayError::decode(message),
        other => AuthGatewayError::transport(other.to_string()),
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, AuthGatewayError> {
        let body = self.post_credentials(&LOGIN_PATH, credentials).await?;
        let response: LoginResponseDto = super::api_client::decode(&body, "login response")
            .map_err(into_auth_error)?;
        response
            .into_identity(credentials.username())
            .map_err(AuthGatewayError::decode)
    }

    async fn register(&self, credentials: &LoginCredentials) -> Result<(), AuthGatewayError> {
        self.post_credentials(&REGISTER_PATH, credentials).await?;
        Ok(())
    }
}
