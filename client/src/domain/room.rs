//! Room entities and creation drafts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ResourceId;
use super::lenient;

/// Label returned when a soft room reference does not resolve.
pub const UNKNOWN_ROOM_LABEL: &str = "Unknown Room";

/// Label used when an entity carries no room reference at all, and for rooms
/// without a floor.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Function preselected for new rooms.
pub const DEFAULT_ROOM_FUNCTION: &str = "Bedroom";

/// Floor preselected for new rooms.
pub const DEFAULT_ROOM_FLOOR: &str = "1";

/// A room as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// Display name, e.g. "Guest Room".
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    /// What the room is used for, e.g. "Kitchen".
    #[serde(default, deserialize_with = "lenient::text")]
    pub function: String,
    /// Floor label; free text such as "1" or "Basement".
    #[serde(default, deserialize_with = "lenient::text")]
    pub floor: String,
    /// Floor area in square metres, when recorded.
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub area: Option<f64>,
}

/// Validation errors raised while building a [`RoomDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomDraftError {
    /// Name was missing or blank once trimmed.
    EmptyName,
}

impl fmt::Display for RoomDraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "room name must not be empty"),
        }
    }
}

impl std::error::Error for RoomDraftError {}

/// Creation payload for a room: every room field except the id.
///
/// # Examples
/// ```
/// use household_client::domain::RoomDraft;
///
/// let draft = RoomDraft::try_new("  Study ").unwrap().with_area(Some(9.5));
/// assert_eq!(draft.name(), "Study");
/// assert_eq!(draft.function(), "Bedroom");
/// assert_eq!(draft.floor(), "1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDraft {
    name: String,
    function: String,
    floor: String,
    area: Option<f64>,
}

impl RoomDraft {
    /// Start a draft with the form defaults for function and floor.
    pub fn try_new(name: &str) -> Result<Self, RoomDraftError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RoomDraftError::EmptyName);
        }
        Ok(Self {
            name: trimmed.to_owned(),
            function: DEFAULT_ROOM_FUNCTION.to_owned(),
            floor: DEFAULT_ROOM_FLOOR.to_owned(),
            area: None,
        })
    }

    /// Override the room function.
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// Override the floor label.
    #[must_use]
    pub fn with_floor(mut self, floor: impl Into<String>) -> Self {
        self.floor = floor.into();
        self
    }

    /// Set or clear the floor area.
    #[must_use]
    pub fn with_area(mut self, area: Option<f64>) -> Self {
        self.area = area;
        self
    }

    /// Room name, trimmed.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Room function.
    #[must_use]
    pub fn function(&self) -> &str {
        self.function.as_str()
    }

    /// Floor label.
    #[must_use]
    pub fn floor(&self) -> &str {
        self.floor.as_str()
    }

    /// Floor area in square metres.
    #[must_use]
    pub const fn area(&self) -> Option<f64> {
        self.area
    }
}

/// Rooms sharing one floor label.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorGroup {
    /// Floor label, or [`UNASSIGNED_LABEL`] for rooms with a blank floor.
    pub floor: String,
    /// Rooms on this floor in collection order.
    pub rooms: Vec<Room>,
}

/// Group rooms by floor label, floors sorted as plain strings.
///
/// Sorting is lexicographic, so "1", "10", "2", "Basement" sort in that order.
#[must_use]
pub fn group_by_floor(rooms: &[Room]) -> Vec<FloorGroup> {
    let mut floors: BTreeMap<String, Vec<Room>> = BTreeMap::new();
    for room in rooms {
        let floor = if room.floor.trim().is_empty() {
            UNASSIGNED_LABEL.to_owned()
        } else {
            room.floor.clone()
        };
        floors.entry(floor).or_default().push(room.clone());
    }
    floors
        .into_iter()
        .map(|(floor, grouped)| FloorGroup {
            floor,
            rooms: grouped,
        })
        .collect()
}
