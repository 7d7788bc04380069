//! Shared data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single calendar entry.
///
/// Events are immutable once stored; the only way to create one is
/// [`crate::EventStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub creator_id: String,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
}

/// The person talking to the bot, as resolved by the platform profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub display_name: String,
}

impl Caller {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
