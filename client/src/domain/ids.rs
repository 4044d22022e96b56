//! Identifiers shared by rooms, colors, and transactions.
//!
//! The backend hands out numeric ids for some collections and textual (UUID)
//! ids for others, and form inputs always produce text. [`ResourceId`] keeps
//! the wire shape it was built from so request bodies echo the server's
//! representation, while equality and hashing use the canonical text form.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a server-backed entity.
///
/// ## Invariants
/// - `ResourceId::Number(5)` and `ResourceId::Text("5")` compare equal and hash
///   identically, because both render to the canonical text `"5"`.
/// - Serialisation preserves the variant: numbers stay JSON numbers.
///
/// # Examples
/// ```
/// use household_client::domain::ResourceId;
///
/// let from_server = ResourceId::Number(5);
/// let from_form = ResourceId::parse("5");
/// assert_eq!(from_server, from_form);
/// assert_eq!(serde_json::to_string(&from_server).unwrap(), "5");
/// ```
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// Integer identifier assigned by the backend.
    Number(i64),
    /// Textual identifier, typically a UUID.
    Text(String),
}

impl ResourceId {
    /// Parse user-supplied text, preferring the numeric shape when possible.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_owned()), Self::Number)
    }

    /// Generate a client-side identifier (random UUID v4).
    #[must_use]
    pub fn random() -> Self {
        Self::Text(Uuid::new_v4().to_string())
    }

    /// Canonical text used for comparisons and URL path segments.
    #[must_use]
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Self::Number(value) => Cow::Owned(value.to_string()),
            Self::Text(value) => Cow::Borrowed(value.as_str()),
        }
    }
}

impl PartialEq for ResourceId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::Text(left), Self::Text(right)) => left == right,
            _ => self.canonical() == other.canonical(),
        }
    }
}

impl Hash for ResourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}
