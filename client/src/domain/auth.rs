//! Authentication primitives: credentials, bearer tokens, and identities.
//!
//! Secrets are held in `Zeroizing` buffers and never appear in `Debug`
//! output, so they cannot leak through structured log fields.

use std::fmt;

use zeroize::Zeroizing;

/// Reason a login or registration form was refused before any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated credentials sent to the login and registration endpoints.
///
/// # Examples
/// ```
/// use household_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "hunter2").unwrap();
/// assert_eq!(creds.username(), "ada");
/// assert!(!format!("{creds:?}").contains("hunter2"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate form input. The username is trimmed; the password is kept
    /// exactly as typed.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        match (username.trim(), password) {
            ("", _) => Err(LoginValidationError::EmptyUsername),
            (_, "") => Err(LoginValidationError::EmptyPassword),
            (name, secret) => Ok(Self {
                username: name.to_owned(),
                password: Zeroizing::new(secret.to_owned()),
            }),
        }
    }

    /// Username as submitted to the backend.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token value for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// The authenticated user together with their bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    token: AuthToken,
}

impl Identity {
    /// Pair a username with the token issued for it.
    pub fn new(username: impl Into<String>, token: AuthToken) -> Self {
        Self {
            username: username.into(),
            token,
        }
    }

    /// Username reported by the backend at login.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Bearer token for authenticated requests.
    #[must_use]
    pub const fn token(&self) -> &AuthToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    //! Form validation and secret redaction.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::missing_user("", "pw", LoginValidationError::EmptyUsername)]
    #[case::blank_user(" \t ", "pw", LoginValidationError::EmptyUsername)]
    #[case::both_blank(" ", "", LoginValidationError::EmptyUsername)]
    #[case::missing_password("ada", "", LoginValidationError::EmptyPassword)]
    fn blank_fields_are_refused(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(
            LoginCredentials::try_from_parts(username, password),
            Err(expected)
        );
    }

    #[rstest]
    fn username_is_trimmed_and_password_kept_verbatim() {
        let creds = LoginCredentials::try_from_parts("  ada\n", " two words ").expect("valid");
        assert_eq!(creds.username(), "ada");
        assert_eq!(creds.password(), " two words ");
    }

    #[rstest]
    fn whitespace_password_is_accepted() {
        let creds = LoginCredentials::try_from_parts("ada", "   ").expect("valid");
        assert_eq!(creds.password(), "   ");
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let identity = Identity::new("ada", AuthToken::new("very-secret-token"));
        let creds = LoginCredentials::try_from_parts("ada", "hunter2").expect("valid");
        let rendered = format!("{identity:?} {creds:?}");
        assert!(!rendered.contains("very-secret-token"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("ada"));
    }

    #[rstest]
    fn validation_messages_name_the_field() {
        assert_eq!(
            LoginValidationError::EmptyPassword.to_string(),
            "password must not be empty"
        );
    }
}
