//! Agenda track occupancy.
//!
//! Every day cell owns a column of numbered tracks. An event segment claims
//! the same track on each day it covers, so tracks are searched and marked
//! across inclusive date ranges.

use chrono::NaiveDate;
use tracing::error;

use crate::dates::next_day;
use crate::error::Error;
use crate::grid::Grid;

/// Occupancy flags for one day, indexed by track. Tracks beyond the end of
/// the vector are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSlots {
    slots: Vec<bool>,
}

impl TrackSlots {
    pub fn is_open(&self, track: usize) -> bool {
        !self.slots.get(track).copied().unwrap_or(false)
    }

    pub fn set_occupied(&mut self, track: usize, occupied: bool) {
        if track >= self.slots.len() {
            if !occupied {
                return;
            }
            self.slots.resize(track + 1, false);
        }
        self.slots[track] = occupied;
    }

    /// Lowest open track on this day alone.
    pub fn first_open(&self) -> usize {
        self.slots
            .iter()
            .position(|occupied| !occupied)
            .unwrap_or(self.slots.len())
    }

    /// Indices of the occupied tracks, ascending.
    pub fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(track, occupied)| occupied.then_some(track))
    }

    /// One past the highest occupied track.
    pub fn depth(&self) -> usize {
        self.slots
            .iter()
            .rposition(|occupied| *occupied)
            .map_or(0, |track| track + 1)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

fn missing_day(date: NaiveDate) -> Error {
    error!("track lookup for {date} outside the visible grid");
    Error::DateNotInGrid(date)
}

impl Grid {
    /// Is `track` open on every day from `start` through `end`?
    pub fn is_track_open(
        &self,
        track: usize,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, Error> {
        let mut day = start;
        loop {
            let cell = self.lookup(day).ok_or_else(|| missing_day(day))?;
            if !cell.tracks.is_open(track) {
                return Ok(false);
            }
            if day >= end {
                return Ok(true);
            }
            day = next_day(day);
        }
    }

    /// The lowest track that is open on every day of the inclusive range.
    ///
    /// First fit: results depend on the order earlier segments were placed.
    pub fn first_common_open_track(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, Error> {
        let mut track = 0;
        while !self.is_track_open(track, start, end)? {
            track += 1;
        }
        Ok(track)
    }

    /// Marks `track` occupied (or frees it) on every day of the inclusive
    /// range.
    pub fn set_track(
        &mut self,
        track: usize,
        start: NaiveDate,
        end: NaiveDate,
        occupied: bool,
    ) -> Result<(), Error> {
        let mut day = start;
        loop {
            let cell = self.lookup_mut(day).ok_or_else(|| missing_day(day))?;
            cell.tracks.set_occupied(track, occupied);
            if day >= end {
                return Ok(());
            }
            day = next_day(day);
        }
    }

    /// Frees every track on every day.
    pub fn clear_tracks(&mut self) {
        for cell in self.cells_mut() {
            cell.tracks.clear();
        }
    }
}
