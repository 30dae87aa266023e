//! Wall-clock date arithmetic used by the grid builder and layout engine.
//!
//! All values are local, midnight-aligned dates or naive date-times. There is
//! no timezone handling here; a "day" is always a calendar day.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Abbreviated day names, Sunday first.
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const FULL_DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Anything that can be placed on the wall clock.
///
/// Dates count as midnight of that day.
pub trait WallClock: Copy {
    fn instant(self) -> NaiveDateTime;
}

impl WallClock for NaiveDateTime {
    fn instant(self) -> NaiveDateTime {
        self
    }
}

impl WallClock for NaiveDate {
    fn instant(self) -> NaiveDateTime {
        self.and_time(NaiveTime::MIN)
    }
}

/// The weekday shown in the first grid column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Column of `date` within a week row, 0..=6.
    pub fn index_of(self, date: NaiveDate) -> u32 {
        match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        }
    }

    /// The last day of the week containing `date`. May be in the next month
    /// or year.
    pub fn last_day_of_week(self, date: NaiveDate) -> NaiveDate {
        advance(date, 6 - self.index_of(date))
    }

    /// The first day of the week after the one containing `date`.
    pub fn first_day_of_next_week(self, date: NaiveDate) -> NaiveDate {
        advance(date, 7 - self.index_of(date))
    }

    /// Day names in column order.
    pub fn day_names(self) -> [&'static str; 7] {
        let offset = self.weekday().num_days_from_sunday() as usize;
        std::array::from_fn(|col| DAY_NAMES[(col + offset) % 7])
    }

    /// Column for a day name, abbreviated or full, in any case.
    pub fn column_of(self, name: &str) -> Option<u32> {
        let sunday_based = week_index(name)?;
        let offset = self.weekday().num_days_from_sunday();
        Some((sunday_based + 7 - offset) % 7)
    }
}

/// Sunday-based index for a day name ("Sun" / "sunday" = 0 .. "Sat" = 6).
/// Matching ignores case and surrounding whitespace.
pub fn week_index(name: &str) -> Option<u32> {
    let lower = name.trim().to_ascii_lowercase();
    DAY_NAMES
        .iter()
        .zip(FULL_DAY_NAMES.iter())
        .position(|(short, full)| lower == short.to_ascii_lowercase() || lower == *full)
        .map(|idx| idx as u32)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("day 1 exists in every month")
}

/// Number of days in `date`'s month, found by walking day 1 forward until
/// the month changes.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let mut cursor = first_of_month(date);
    let month = cursor.month();
    let mut count = 0;
    while cursor.month() == month {
        count += 1;
        let Some(next) = cursor.succ_opt() else {
            break;
        };
        cursor = next;
    }
    count
}

/// Year and month (1-based) of the month after `year`/`month`.
pub fn month_after(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Year and month (1-based) of the month before `year`/`month`.
pub fn month_before(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Day 1 of the month after `date`'s, or `None` past chrono's last
/// representable month.
pub fn checked_first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = month_after(date.year(), date.month());
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Day 1 of the month before `date`'s, or `None` before chrono's first
/// representable month.
pub fn checked_first_of_previous_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = month_before(date.year(), date.month());
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// # Panics
///
/// When `date` falls in the last month chrono can represent.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    checked_first_of_next_month(date).expect("next month within chrono's range")
}

/// # Panics
///
/// When `date` falls in the first month chrono can represent.
pub fn first_of_previous_month(date: NaiveDate) -> NaiveDate {
    checked_first_of_previous_month(date).expect("previous month within chrono's range")
}

/// The following calendar day, rolling over month and year ends.
///
/// # Panics
///
/// On chrono's last representable day.
pub fn next_day(date: NaiveDate) -> NaiveDate {
    if date.day() < days_in_month(date) {
        return date
            .with_day(date.day() + 1)
            .expect("day below month length is valid");
    }

    first_of_next_month(date)
}

/// Saturday on or after `date`.
pub fn last_day_of_week(date: NaiveDate) -> NaiveDate {
    WeekStart::Sunday.last_day_of_week(date)
}

/// Sunday strictly after `date`'s week.
pub fn first_day_of_next_week(date: NaiveDate) -> NaiveDate {
    WeekStart::Sunday.first_day_of_next_week(date)
}

fn advance(mut date: NaiveDate, days: u32) -> NaiveDate {
    for _ in 0..days {
        date = next_day(date);
    }
    date
}

/// Round `millis / unit` to the nearest integer, halves toward positive
/// infinity.
fn round_millis(millis: i64, unit: i64) -> i64 {
    (2 * millis + unit).div_euclid(2 * unit)
}

fn millis_between(a: impl WallClock, b: impl WallClock) -> i64 {
    (b.instant() - a.instant()).num_milliseconds()
}

/// Whole days between `a` and `b`, ignoring direction.
pub fn day_delta(a: impl WallClock, b: impl WallClock) -> u64 {
    round_millis(millis_between(a, b).abs(), MILLIS_PER_DAY) as u64
}

/// Whole days from `a` to `b`; positive when `b` is later.
pub fn signed_day_delta(a: impl WallClock, b: impl WallClock) -> i64 {
    round_millis(millis_between(a, b), MILLIS_PER_DAY)
}

pub fn hour_delta(a: impl WallClock, b: impl WallClock) -> i64 {
    round_millis(millis_between(a, b), MILLIS_PER_HOUR)
}

pub fn minute_delta(a: impl WallClock, b: impl WallClock) -> i64 {
    round_millis(millis_between(a, b), MILLIS_PER_MINUTE)
}

pub fn second_delta(a: impl WallClock, b: impl WallClock) -> i64 {
    round_millis(millis_between(a, b), MILLIS_PER_SECOND)
}
