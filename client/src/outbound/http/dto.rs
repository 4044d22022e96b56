//! Wire shapes for the authentication endpoints.
//!
//! Entity payloads (rooms, colors, transactions) serialize straight from the
//! domain types; only the auth exchange needs dedicated DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{AuthToken, Identity, LoginCredentials};

#[derive(Debug, Serialize)]
pub(super) struct CredentialsDto<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for CredentialsDto<'a> {
    fn from(credentials: &'a LoginCredentials) -> Self {
        Self {
            username: credentials.username(),
            password: credentials.password(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct LoginResponseDto {
    token: String,
    #[serde(default)]
    username: Option<String>,
}

impl LoginResponseDto {
    /// Pair the issued token with the canonical username, falling back to
    /// the submitted one when the backend omits it.
    pub(super) fn into_identity(self, submitted: &str) -> Result<Identity, String> {
        if self.token.trim().is_empty() {
            return Err("login response carried an empty token".to_owned());
        }
        let username = self
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| submitted.to_owned());
        Ok(Identity::new(username, AuthToken::new(self.token)))
    }
}
