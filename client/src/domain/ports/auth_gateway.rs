//! Driven port for the unauthenticated login and registration endpoints.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{AuthToken, Identity, LoginCredentials};

define_port_error! {
    /// Errors surfaced by the authentication endpoints.
    pub enum AuthGatewayError {
        /// The backend refused the credentials; `message` is its response
        /// text and may be empty.
        Rejected { message: String } =>
            "authentication rejected: {message}",
        /// The request never produced a response.
        Transport { message: String } =>
            "authentication transport failed: {message}",
        /// A success response could not be decoded.
        Decode { message: String } =>
            "authentication response decode failed: {message}",
    }
}

/// Port for exchanging credentials with the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a token and the canonical username.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, AuthGatewayError>;

    /// Create an account. Success carries no payload.
    async fn register(&self, credentials: &LoginCredentials) -> Result<(), AuthGatewayError>;
}

/// Development authenticator: `admin` / `password` succeeds with a fixed
/// token, registration always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthGateway;

/// Token issued by [`FixtureAuthGateway`].
pub const FIXTURE_TOKEN: &str = "fixture-token";

#[async_trait]
impl AuthGateway for FixtureAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, AuthGatewayError> {
        if credentials.username() == "admin" && credentials.password() == "password" {
            Ok(Identity::new("admin", AuthToken::new(FIXTURE_TOKEN)))
        } else {
            Err(AuthGatewayError::rejected("Invalid username or password"))
        }
    }

    async fn register(&self, _credentials: &LoginCredentials) -> Result<(), AuthGatewayError> {
        Ok(())
    }
}
