use std::io;

use chrono::{NaiveDate, NaiveDateTime};

/// Calendar errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("event ends ({end}) before it starts ({start})")]
    InvalidEventRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A day index lookup missed. The layout engine clips every range to
    /// the visible grid first, so this points at a bug in monthgrid.
    #[error("date {0} is not in the current grid")]
    DateNotInGrid(NaiveDate),

    /// The month has no neighbour on one side within chrono's date range,
    /// so its spillover days cannot be built.
    #[error("month of {0} is at the edge of the supported date range")]
    DateOutOfRange(NaiveDate),

    #[error("invalid month {month0} for year {year}")]
    InvalidMonth { year: i32, month0: u32 },

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn invalid_range(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Error::InvalidEventRange { start, end }
    }
}
