//! Announcements service types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Urgency of an announcement. Serialized lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementPriority {
    /// Informational.
    Low,
    /// Default.
    #[default]
    Medium,
    /// Needs attention.
    High,
}

impl AnnouncementPriority {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for AnnouncementPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published (or draft) announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Backend identifier.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Event the announcement is attached to.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Urgency.
    pub priority: AnnouncementPriority,
    /// Whether participants can see it.
    pub is_published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /announcements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Event to attach to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Urgency.
    pub priority: AnnouncementPriority,
    /// Publish immediately.
    pub is_published: bool,
}

impl NewAnnouncement {
    /// Published, medium priority announcement not tied to an event.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            event_id: None,
            priority: AnnouncementPriority::default(),
            is_published: true,
        }
    }
}

/// Partial update for `PUT /announcements/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<AnnouncementPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_published: Option<bool>,
}

impl AnnouncementUpdate {
    /// Empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the headline.
    #[must_use]
    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    /// Replace the body text.
    #[must_use]
    pub fn content(mut self, value: impl Into<String>) -> Self {
        self.content = Some(value.into());
        self
    }

    /// Change urgency.
    #[must_use]
    pub fn priority(mut self, value: AnnouncementPriority) -> Self {
        self.priority = Some(value);
        self
    }

    /// Publish or unpublish.
    #[must_use]
    pub fn published(mut self, value: bool) -> Self {
        self.is_published = Some(value);
        self
    }
}

/// Filter for `GET /announcements`.
///
/// Only published announcements are ever requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementQuery {
    /// Restrict to one event.
    pub event_id: Option<String>,
    /// Restrict to one priority.
    pub priority: Option<AnnouncementPriority>,
}

impl AnnouncementQuery {
    /// Query parameters in wire order, values not yet percent-encoded.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(event_id) = &self.event_id {
            pairs.push(("eventId", event_id.clone()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        pairs.push(("isPublished", "true".to_string()));
        pairs
    }
}
