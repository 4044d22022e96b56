//! Paint colors and their soft reference to rooms.
//!
//! `Color::room_id` points at `Room::id` without any integrity guarantee: the
//! room may be deleted while colors still reference it. Resolution always
//! degrades to a placeholder label instead of failing, and deleting a room
//! never cascades to its colors.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::room::{Room, UNASSIGNED_LABEL, UNKNOWN_ROOM_LABEL};
use super::ResourceId;

/// A paint color recorded for the household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    /// Server-assigned identifier.
    pub id: ResourceId,
    /// NCS notation, e.g. "S 0502-Y".
    pub ncs: String,
    /// Marketing name, e.g. "Eggshell White".
    pub name: String,
    /// Soft reference to the room the color is used in.
    #[serde(default, deserialize_with = "optional_room_id")]
    pub room_id: Option<ResourceId>,
    /// Free-text room name from records created before rooms had ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

fn optional_room_id<'de, D>(deserializer: D) -> Result<Option<ResourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<ResourceId>::deserialize(deserializer)?;
    Ok(raw.filter(|id| !id.canonical().trim().is_empty()))
}

/// Validation errors raised while building a [`ColorDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorDraftError {
    /// NCS code was blank.
    EmptyNcs,
    /// Color name was blank.
    EmptyName,
    /// No room was selected.
    MissingRoom,
}

impl fmt::Display for ColorDraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNcs => write!(f, "NCS code must not be empty"),
            Self::EmptyName => write!(f, "color name must not be empty"),
            Self::MissingRoom => write!(f, "a room must be selected"),
        }
    }
}

impl std::error::Error for ColorDraftError {}

/// Creation payload for a color: every color field except the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorDraft {
    ncs: String,
    name: String,
    room_id: ResourceId,
}

impl ColorDraft {
    /// Validate the three required fields.
    ///
    /// # Examples
    /// ```
    /// use household_client::domain::{ColorDraft, ColorDraftError, ResourceId};
    ///
    /// let draft = ColorDraft::try_new("S 0502-Y", "Eggshell", ResourceId::Number(1));
    /// assert!(draft.is_ok());
    ///
    /// let missing = ColorDraft::try_new("S 0502-Y", "Eggshell", ResourceId::parse(""));
    /// assert_eq!(missing, Err(ColorDraftError::MissingRoom));
    /// ```
    pub fn try_new(ncs: &str, name: &str, room_id: ResourceId) -> Result<Self, ColorDraftError> {
        let ncs_trimmed = ncs.trim();
        if ncs_trimmed.is_empty() {
            return Err(ColorDraftError::EmptyNcs);
        }
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(ColorDraftError::EmptyName);
        }
        if room_id.canonical().trim().is_empty() {
            return Err(ColorDraftError::MissingRoom);
        }
        Ok(Self {
            ncs: ncs_trimmed.to_owned(),
            name: name_trimmed.to_owned(),
            room_id,
        })
    }

    /// NCS code.
    #[must_use]
    pub fn ncs(&self) -> &str {
        self.ncs.as_str()
    }

    /// Color name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Referenced room.
    #[must_use]
    pub const fn room_id(&self) -> &ResourceId {
        &self.room_id
    }
}

/// Resolve a soft room reference to the room name.
///
/// Returns [`UNKNOWN_ROOM_LABEL`] for absent ids and ids with no matching room.
#[must_use]
pub fn resolve_room_name(rooms: &[Room], room_id: Option<&ResourceId>) -> String {
    room_id
        .and_then(|id| rooms.iter().find(|room| &room.id == id))
        .map_or_else(|| UNKNOWN_ROOM_LABEL.to_owned(), |room| room.name.clone())
}

/// Label for the room a color belongs to.
///
/// Colors with a room id resolve through [`resolve_room_name`]; older records
/// fall back to their free-text room, then to [`UNASSIGNED_LABEL`].
#[must_use]
pub fn room_label(rooms: &[Room], color: &Color) -> String {
    match (&color.room_id, &color.room) {
        (Some(room_id), _) => resolve_room_name(rooms, Some(room_id)),
        (None, Some(legacy)) if !legacy.trim().is_empty() => legacy.clone(),
        (None, _) => UNASSIGNED_LABEL.to_owned(),
    }
}
