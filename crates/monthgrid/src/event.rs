//! Agenda events placed on the month grid.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde_json::Value;

/// Arbitrary caller data attached to an event. Keys are unique and keep
/// insertion order.
pub type Payload = IndexMap<String, Value>;

/// Identifier assigned by the owning [`crate::Calendar`], starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgendaId(u64);

impl AgendaId {
    pub(crate) const FIRST: AgendaId = AgendaId(1);

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> AgendaId {
        AgendaId(self.0 + 1)
    }
}

impl fmt::Display for AgendaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A titled span of wall-clock time. `end` is never before `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct AgendaEvent {
    id: AgendaId,
    title: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    payload: Payload,
}

impl AgendaEvent {
    pub(crate) fn new(
        id: AgendaId,
        title: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        payload: Payload,
    ) -> Self {
        Self {
            id,
            title,
            start,
            end,
            payload,
        }
    }

    pub fn id(&self) -> AgendaId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// The day the event starts on; time of day does not affect placement.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn data(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert_data(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.payload.insert(key.into(), value.into())
    }

    /// Text for a render segment. The leading segment carries the start
    /// time, the ones after it only the title.
    pub fn label(&self, leading: bool) -> String {
        if !leading {
            return self.title.clone();
        }

        let time = self.start.format("%l:%M %p").to_string();
        format!("({}) {}", time.trim(), self.title)
    }
}

impl fmt::Display for AgendaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Start Date: {}", self.start)?;
        writeln!(f, "End Date: {}", self.end)?;
        for (key, value) in &self.payload {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}
