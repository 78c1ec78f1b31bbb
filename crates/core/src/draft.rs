//! The single active report draft.
//!
//! A draft holds at most one media item. [`Media`] is a tagged union, so
//! setting a video necessarily drops any image and vice versa.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::location::{Coordinates, ResolvedLocation};
use crate::types::{MediaUri, Timestamp};

/// Kind of media a capture/pick operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// The draft's media slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uri", rename_all = "lowercase")]
pub enum Media {
    #[default]
    None,
    Image(MediaUri),
    Video(MediaUri),
}

impl Media {
    pub fn new(kind: MediaKind, uri: MediaUri) -> Self {
        match kind {
            MediaKind::Image => Media::Image(uri),
            MediaKind::Video => Media::Video(uri),
        }
    }

    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            Media::None => None,
            Media::Image(_) => Some(MediaKind::Image),
            Media::Video(_) => Some(MediaKind::Video),
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            Media::None => None,
            Media::Image(uri) | Media::Video(uri) => Some(uri),
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Media::Image(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn video(&self) -> Option<&str> {
        match self {
            Media::Video(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Media::None)
    }
}

/// An in-progress violation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub id: Uuid,
    pub media: Media,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub captured_at: Timestamp,
}

impl ReportDraft {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            media: Media::None,
            address: String::new(),
            coordinates: None,
            description: None,
            captured_at: chrono::Utc::now(),
        }
    }

    /// Replace the media slot. Any media of the other kind is dropped.
    pub fn set_media(&mut self, media: Media) {
        self.media = media;
    }

    pub fn clear_media(&mut self) {
        self.media = Media::None;
    }

    /// Manual address entry. Keeps previously resolved coordinates.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// Apply an auto-detected location.
    pub fn apply_location(&mut self, location: &ResolvedLocation) {
        self.coordinates = Some(location.coordinates);
        self.address = location.address.clone();
    }

    /// Set the free-text description; blank text clears it.
    pub fn set_description(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.description = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
    }

    /// A draft may only leave the capture screen with media attached.
    pub fn ensure_submittable(&self) -> Result<(), CoreError> {
        if self.media.is_none() {
            return Err(CoreError::MissingField {
                field: "media",
                message: "Please capture or select an image or video",
            });
        }
        Ok(())
    }
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self::new()
    }
}
