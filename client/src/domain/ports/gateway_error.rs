//! Failure type shared by the authenticated backend ports.

use super::define_port_error;

/// HTTP status the backend uses for a rejected or expired token.
pub const UNAUTHORIZED_STATUS: u16 = 401;

define_port_error! {
    /// Errors surfaced while calling an authenticated backend endpoint.
    pub enum GatewayError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "backend transport failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "backend request timed out: {message}",
        /// The backend answered with a non-success status.
        Status { status: u16, message: String } =>
            "backend returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "backend response decode failed: {message}",
    }
}

impl GatewayError {
    /// Whether the backend rejected the bearer token.
    ///
    /// Stores treat this like any other failure; callers may use it to decide
    /// whether to end the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == UNAUTHORIZED_STATUS)
    }

    /// HTTP status when the backend produced one.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Timeout { .. } | Self::Decode { .. } => None,
        }
    }
}
