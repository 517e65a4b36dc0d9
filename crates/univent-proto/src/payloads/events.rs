//! Events service types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Backend identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Maximum number of participants.
    pub capacity: u32,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Name shown as the organizer.
    pub organizer_name: String,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event starts after `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date > now
    }
}

/// Body of `POST /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    /// Title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Maximum number of participants.
    pub capacity: u32,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Organizer name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_name: Option<String>,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Partial update for `PUT /events/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organizer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl EventUpdate {
    /// Empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the title.
    #[must_use]
    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    /// Replace the description.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    /// Move the event.
    #[must_use]
    pub fn date(mut self, value: DateTime<Utc>) -> Self {
        self.date = Some(value);
        self
    }

    /// Replace the venue.
    #[must_use]
    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    /// Replace the capacity.
    #[must_use]
    pub fn capacity(mut self, value: u32) -> Self {
        self.capacity = Some(value);
        self
    }

    /// Replace all tags.
    #[must_use]
    pub fn tags(mut self, value: Vec<String>) -> Self {
        self.tags = Some(value);
        self
    }

    /// Replace the organizer name.
    #[must_use]
    pub fn organizer_name(mut self, value: impl Into<String>) -> Self {
        self.organizer_name = Some(value.into());
        self
    }

    /// Replace the cover image URL.
    #[must_use]
    pub fn image(mut self, value: impl Into<String>) -> Self {
        self.image = Some(value.into());
        self
    }

    /// Whether no field was set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Optional details sent with `POST /events/{id}/register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDetails {
    /// Name to register under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Accessibility or dietary notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
}

impl RegistrationDetails {
    /// Whether no field was set. An empty registration is sent without a
    /// body.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.special_requirements.is_none()
    }
}

/// Entry of `GET /events/{id}/participants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipant {
    /// Backend identifier.
    pub id: String,
    /// Participant name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Accessibility or dietary notes.
    #[serde(default)]
    pub special_requirements: Option<String>,
    /// Registration time.
    pub registered_at: DateTime<Utc>,
}
