//! In-memory event store.
//!
//! State lives only as long as the process. Every operation takes the lock
//! once, so readers never observe a half-applied insert.
//!
//! A poisoned lock fails the call that sees it and is then cleared, so one
//! internal fault does not take the store down for later commands. The only
//! mutation under the write lock is a single `push`.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Days, NaiveDate, Utc};
use tracing::{debug, error};

use crate::{Error, Event, Result};

/// Mapping of calendar date to the events on that date, in insertion order.
///
/// A date key only exists once at least one event was inserted for it.
#[derive(Debug, Default)]
pub struct EventStore {
    events: RwLock<BTreeMap<NaiveDate, Vec<Event>>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new event to `date` and return it.
    pub fn insert(
        &self,
        date: NaiveDate,
        title: &str,
        description: &str,
        creator_id: &str,
        creator_name: &str,
    ) -> Result<Event> {
        let event = Event {
            date,
            title: title.to_string(),
            description: description.to_string(),
            creator_id: creator_id.to_string(),
            creator_name: creator_name.to_string(),
            created_at: Utc::now(),
        };

        let mut events = self.write()?;
        events.entry(date).or_default().push(event.clone());

        debug!(date = %date, creator_id = %creator_id, "Stored event");
        Ok(event)
    }

    /// Events stored for a single date, oldest first.
    pub fn query_by_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
        Ok(self.read()?.get(&date).cloned().unwrap_or_default())
    }

    /// Events from `start` through `start + day_count - 1`, grouped by
    /// ascending date and in insertion order within each date.
    pub fn query_range(&self, start: NaiveDate, day_count: u32) -> Result<Vec<(NaiveDate, Event)>> {
        if day_count == 0 {
            return Ok(Vec::new());
        }

        let events = self.read()?;
        let days = events.range(start..);
        let end = start.checked_add_days(Days::new(u64::from(day_count)));

        let found = days
            .take_while(|(date, _)| end.map_or(true, |end| **date < end))
            .flat_map(|(date, list)| list.iter().map(move |event| (*date, event.clone())))
            .collect();
        Ok(found)
    }

    /// Number of stored events across all dates.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<NaiveDate, Vec<Event>>>> {
        self.events.read().map_err(|poisoned| {
            drop(poisoned);
            self.recover()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<NaiveDate, Vec<Event>>>> {
        self.events.write().map_err(|poisoned| {
            drop(poisoned);
            self.recover()
        })
    }

    fn recover(&self) -> Error {
        error!("Event store lock poisoned, clearing");
        self.events.clear_poison();
        Error::Internal("event store lock poisoned".to_string())
    }
}
