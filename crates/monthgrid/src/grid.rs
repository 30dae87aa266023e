//! Month grid construction.
//!
//! A [`Grid`] is the set of week rows shown for one month, including the
//! spillover days from the neighbouring months needed to fill the first and
//! last rows. Grids are rebuilt from scratch on every navigation; cells are
//! never reused between builds.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::dates::{
    checked_first_of_next_month, checked_first_of_previous_month, days_in_month, first_of_month,
    WeekStart,
};
use crate::error::Error;
use crate::tracks::TrackSlots;

pub const DAYS_PER_WEEK: usize = 7;

/// Which month a cell's date belongs to, relative to the displayed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthPlacement {
    Previous,
    Current,
    Next,
}

/// One day in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    date: NaiveDate,
    placement: MonthPlacement,
    pub(crate) tracks: TrackSlots,
}

impl DayCell {
    fn new(date: NaiveDate, placement: MonthPlacement) -> Self {
        Self {
            date,
            placement,
            tracks: TrackSlots::default(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn placement(&self) -> MonthPlacement {
        self.placement
    }

    /// True when the cell belongs to the displayed month rather than being
    /// spillover.
    pub fn is_current_month(&self) -> bool {
        self.placement == MonthPlacement::Current
    }

    /// Agenda track occupancy for this day.
    pub fn tracks(&self) -> &TrackSlots {
        &self.tracks
    }
}

/// A calendar row of exactly seven days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRow {
    cells: [DayCell; DAYS_PER_WEEK],
}

impl WeekRow {
    pub fn cells(&self) -> &[DayCell; DAYS_PER_WEEK] {
        &self.cells
    }

    pub fn first(&self) -> &DayCell {
        &self.cells[0]
    }

    pub fn last(&self) -> &DayCell {
        &self.cells[DAYS_PER_WEEK - 1]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first().date <= date && date <= self.last().date
    }
}

/// Position of a cell inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub week: usize,
    pub column: usize,
}

/// Date to cell lookup for the current grid.
///
/// Rebuilt in full with every grid; there are no incremental updates.
#[derive(Debug, Clone, Default)]
pub struct DayIndex {
    positions: HashMap<NaiveDate, CellPosition>,
}

impl DayIndex {
    fn insert(&mut self, date: NaiveDate, position: CellPosition) {
        self.positions.insert(date, position);
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, date: NaiveDate) {
        self.positions.remove(&date);
    }

    pub fn get(&self, date: NaiveDate) -> Option<CellPosition> {
        self.positions.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Month bookkeeping needed to place every cell of a grid.
struct MonthLayout {
    previous: NaiveDate,
    days_previous: u32,
    current: NaiveDate,
    days_current: u32,
    next: NaiveDate,
    leading: u32,
}

impl MonthLayout {
    fn new(reference: NaiveDate, week_start: WeekStart) -> Result<Self, Error> {
        let current = first_of_month(reference);
        let previous =
            checked_first_of_previous_month(current).ok_or(Error::DateOutOfRange(reference))?;
        let next = checked_first_of_next_month(current).ok_or(Error::DateOutOfRange(reference))?;

        Ok(MonthLayout {
            previous,
            days_previous: days_in_month(previous),
            current,
            days_current: days_in_month(current),
            next,
            leading: week_start.index_of(current),
        })
    }

    fn last_day(&self) -> NaiveDate {
        self.current
            .with_day(self.days_current)
            .expect("month length is a valid day")
    }

    /// The cell at `offset` counted from the top-left of the grid.
    fn cell(&self, offset: u32) -> DayCell {
        if offset < self.leading {
            let day = self.days_previous - self.leading + 1 + offset;
            let date = self
                .previous
                .with_day(day)
                .expect("spillover day within previous month");
            return DayCell::new(date, MonthPlacement::Previous);
        }

        let day = offset - self.leading + 1;
        if day <= self.days_current {
            let date = self
                .current
                .with_day(day)
                .expect("day within displayed month");
            return DayCell::new(date, MonthPlacement::Current);
        }

        let date = self
            .next
            .with_day(day - self.days_current)
            .expect("spillover day within next month");
        DayCell::new(date, MonthPlacement::Next)
    }
}

/// The weeks displayed for one month.
#[derive(Debug, Clone)]
pub struct Grid {
    reference: NaiveDate,
    week_start: WeekStart,
    weeks: Vec<WeekRow>,
    index: DayIndex,
    first_visible: NaiveDate,
    last_visible: NaiveDate,
}

impl Grid {
    /// Builds the grid for `reference`'s month.
    ///
    /// The row count is derived from the month length and the weekday of the
    /// first and last days; four, five and six row months all fall out of the
    /// same arithmetic.
    ///
    /// Fails with [`Error::DateOutOfRange`] for the first and last months
    /// chrono can represent, whose spillover days do not exist.
    pub fn build(reference: NaiveDate, week_start: WeekStart) -> Result<Self, Error> {
        let month = MonthLayout::new(reference, week_start)?;
        let trailing = 6 - week_start.index_of(month.last_day());
        let total_cells = month.days_current + month.leading + trailing;
        let rows = total_cells.div_ceil(DAYS_PER_WEEK as u32) as usize;

        let mut index = DayIndex::default();
        let mut weeks = Vec::with_capacity(rows);
        for week in 0..rows {
            let cells: [DayCell; DAYS_PER_WEEK] = std::array::from_fn(|column| {
                let cell = month.cell((week * DAYS_PER_WEEK + column) as u32);
                index.insert(cell.date, CellPosition { week, column });
                cell
            });
            weeks.push(WeekRow { cells });
        }

        let first_visible = weeks[0].first().date;
        let last_visible = weeks[rows - 1].last().date;

        debug!(
            "built grid for {}: {} weeks, {} .. {}",
            month.current.format("%Y-%m"),
            rows,
            first_visible,
            last_visible
        );

        Ok(Grid {
            reference,
            week_start,
            weeks,
            index,
            first_visible,
            last_visible,
        })
    }

    /// The date the grid was built for.
    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn year(&self) -> i32 {
        self.reference.year()
    }

    /// Zero-based month (0 = January).
    pub fn month0(&self) -> u32 {
        self.reference.month0()
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn weeks(&self) -> &[WeekRow] {
        &self.weeks
    }

    pub fn week(&self, idx: usize) -> Option<&WeekRow> {
        self.weeks.get(idx)
    }

    pub fn num_weeks(&self) -> usize {
        self.weeks.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|week| week.cells.iter())
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut DayCell> {
        self.weeks.iter_mut().flat_map(|week| week.cells.iter_mut())
    }

    pub fn first_visible(&self) -> NaiveDate {
        self.first_visible
    }

    pub fn last_visible(&self) -> NaiveDate {
        self.last_visible
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_visible <= date && date <= self.last_visible
    }

    pub fn day_index(&self) -> &DayIndex {
        &self.index
    }

    pub fn position(&self, date: NaiveDate) -> Option<CellPosition> {
        self.index.get(date)
    }

    /// Row index of the week containing `date`.
    pub fn week_of(&self, date: NaiveDate) -> Option<usize> {
        self.position(date).map(|pos| pos.week)
    }

    pub fn lookup(&self, date: NaiveDate) -> Option<&DayCell> {
        let pos = self.index.get(date)?;
        Some(&self.weeks[pos.week].cells[pos.column])
    }

    #[cfg(test)]
    pub(crate) fn day_index_mut(&mut self) -> &mut DayIndex {
        &mut self.index
    }

    pub(crate) fn lookup_mut(&mut self, date: NaiveDate) -> Option<&mut DayCell> {
        let pos = self.index.get(date)?;
        Some(&mut self.weeks[pos.week].cells[pos.column])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_june_2010_grid() {
        let grid = Grid::build(ymd(2010, 6, 15), WeekStart::Sunday).unwrap();

        assert_eq!(grid.num_weeks(), 5);
        assert_eq!(grid.first_visible(), ymd(2010, 5, 30));
        assert_eq!(grid.last_visible(), ymd(2010, 7, 3));

        let first = grid.week(0).unwrap();
        assert_eq!(first.cells()[0].placement(), MonthPlacement::Previous);
        assert_eq!(first.cells()[1].placement(), MonthPlacement::Previous);
        assert_eq!(first.cells()[2].date(), ymd(2010, 6, 1));
        assert!(first.cells()[2].is_current_month());

        let last = grid.week(4).unwrap();
        assert_eq!(last.cells()[3].date(), ymd(2010, 6, 30));
        assert_eq!(last.cells()[4].date(), ymd(2010, 7, 1));
        assert_eq!(last.cells()[4].placement(), MonthPlacement::Next);
    }

    #[test]
    fn test_four_row_month() {
        // February 2015 starts on a Sunday and ends on a Saturday
        let grid = Grid::build(ymd(2015, 2, 1), WeekStart::Sunday).unwrap();
        assert_eq!(grid.num_weeks(), 4);
        assert!(grid.cells().all(DayCell::is_current_month));
    }

    #[test]
    fn test_six_row_month() {
        // May 2010 starts on a Saturday and has 31 days
        let grid = Grid::build(ymd(2010, 5, 1), WeekStart::Sunday).unwrap();
        assert_eq!(grid.num_weeks(), 6);
        assert_eq!(grid.first_visible(), ymd(2010, 4, 25));
        assert_eq!(grid.last_visible(), ymd(2010, 6, 5));
    }

    #[test]
    fn test_month_ending_on_sunday_gets_full_trailing_week() {
        // October 2010 ends on a Sunday
        let grid = Grid::build(ymd(2010, 10, 1), WeekStart::Sunday).unwrap();
        assert_eq!(grid.last_visible(), ymd(2010, 11, 6));
        assert_eq!(grid.num_weeks(), 6);
    }

    #[test]
    fn test_monday_start() {
        let grid = Grid::build(ymd(2010, 6, 1), WeekStart::Monday).unwrap();
        assert_eq!(grid.first_visible(), ymd(2010, 5, 31));
        assert_eq!(grid.last_visible(), ymd(2010, 7, 4));
        assert_eq!(grid.num_weeks(), 5);
    }

    #[test]
    fn test_year_boundary_spillover() {
        let grid = Grid::build(ymd(2010, 12, 1), WeekStart::Sunday).unwrap();
        assert_eq!(grid.first_visible(), ymd(2010, 11, 28));
        assert_eq!(grid.last_visible(), ymd(2011, 1, 1));

        let grid = Grid::build(ymd(2011, 1, 1), WeekStart::Sunday).unwrap();
        assert_eq!(grid.first_visible(), ymd(2010, 12, 26));
    }

    #[test]
    fn test_last_representable_month_is_out_of_range() {
        let last = NaiveDate::MAX;
        let december = ymd(last.year(), 12, 1);
        let err = Grid::build(december, WeekStart::Sunday).unwrap_err();
        assert!(matches!(err, Error::DateOutOfRange(date) if date == december));

        let first = NaiveDate::MIN;
        let err = Grid::build(first, WeekStart::Monday).unwrap_err();
        assert!(matches!(err, Error::DateOutOfRange(date) if date == first));
    }

    #[test]
    fn test_day_index_lookup() {
        let grid = Grid::build(ymd(2010, 6, 1), WeekStart::Sunday).unwrap();

        assert_eq!(grid.day_index().len(), grid.num_weeks() * DAYS_PER_WEEK);
        assert_eq!(
            grid.position(ymd(2010, 6, 16)),
            Some(CellPosition { week: 2, column: 3 })
        );
        assert_eq!(grid.lookup(ymd(2010, 7, 3)).unwrap().date(), ymd(2010, 7, 3));
        assert!(grid.lookup(ymd(2010, 7, 4)).is_none());
        assert!(grid.lookup(ymd(2010, 5, 29)).is_none());
        assert_eq!(grid.week_of(ymd(2010, 5, 30)), Some(0));
    }
}
