//! The calendar facade: one grid, the events placed on it and their layout.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::dates::{checked_first_of_next_month, checked_first_of_previous_month};
use crate::error::Error;
use crate::event::{AgendaEvent, AgendaId, Payload};
use crate::grid::Grid;
use crate::layout::{layout, EventLayout, Overflow, RenderSegment};
use crate::settings::{CellMetrics, LayoutSettings};

/// A month view with agenda events laid out on it.
///
/// Segments handed out by the accessors are snapshots: any call to
/// [`Calendar::navigate`], [`Calendar::resize`] or [`Calendar::add_event`]
/// may replace them.
#[derive(Debug, Clone)]
pub struct Calendar {
    settings: LayoutSettings,
    grid: Grid,
    events: BTreeMap<AgendaId, AgendaEvent>,
    layouts: BTreeMap<AgendaId, EventLayout>,
    next_id: AgendaId,
    metrics: Option<CellMetrics>,
}

impl Calendar {
    /// A calendar showing `reference`'s month with default settings.
    ///
    /// Fails with [`Error::DateOutOfRange`] for the first and last months
    /// chrono can represent.
    pub fn initialize(reference: NaiveDate) -> Result<Self, Error> {
        Self::with_settings(reference, LayoutSettings::default())
    }

    pub fn with_settings(reference: NaiveDate, settings: LayoutSettings) -> Result<Self, Error> {
        let grid = Grid::build(reference, settings.week_start)?;
        Ok(Self {
            settings,
            grid,
            events: BTreeMap::new(),
            layouts: BTreeMap::new(),
            next_id: AgendaId::FIRST,
            metrics: None,
        })
    }

    /// Rebuilds the grid for `reference`'s month and lays out every event
    /// again. On error the current month stays on display.
    pub fn navigate(&mut self, reference: NaiveDate) -> Result<(), Error> {
        debug!("navigating to {reference}");
        self.grid = Grid::build(reference, self.settings.week_start)?;
        self.relayout()
    }

    pub fn next_month(&mut self) -> Result<(), Error> {
        let current = self.display_date();
        let next = checked_first_of_next_month(current).ok_or(Error::DateOutOfRange(current))?;
        self.navigate(next)
    }

    pub fn previous_month(&mut self) -> Result<(), Error> {
        let current = self.display_date();
        let previous =
            checked_first_of_previous_month(current).ok_or(Error::DateOutOfRange(current))?;
        self.navigate(previous)
    }

    /// Shows `month0` (0 = January) of `year`.
    pub fn show_month(&mut self, year: i32, month0: u32) -> Result<(), Error> {
        let date = (month0 < 12)
            .then(|| NaiveDate::from_ymd_opt(year, month0 + 1, 1))
            .flatten()
            .ok_or(Error::InvalidMonth { year, month0 })?;
        self.navigate(date)
    }

    /// The date the current grid was built for.
    pub fn display_date(&self) -> NaiveDate {
        self.grid.reference()
    }

    /// Stores a new event and lays it out on top of the existing ones.
    ///
    /// Events that end before they start are rejected and leave the
    /// calendar untouched.
    pub fn add_event(
        &mut self,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        payload: Payload,
    ) -> Result<AgendaId, Error> {
        let title = title.into();
        if end < start {
            warn!("rejecting event '{title}': ends {end} before it starts {start}");
            return Err(Error::invalid_range(start, end));
        }

        let event = AgendaEvent::new(self.next_id, title, start, end, payload);
        let event_layout =
            match layout(&event, &mut self.grid, &self.settings, self.metrics.as_ref()) {
                Ok(event_layout) => event_layout,
                Err(err) => {
                    // drop whatever tracks the partial layout claimed
                    self.relayout()?;
                    return Err(err);
                }
            };

        let id = event.id();
        self.next_id = id.next();
        self.events.insert(id, event);
        self.layouts.insert(id, event_layout);

        Ok(id)
    }

    /// Applies new cell dimensions and lays out every event again. The grid
    /// itself is kept.
    pub fn resize(&mut self, metrics: CellMetrics) -> Result<(), Error> {
        debug!("resizing cells to {}x{}", metrics.width, metrics.height);
        self.metrics = Some(metrics);
        self.relayout()
    }

    /// Resizes for a calendar `width` wide, deriving cell sizes from the
    /// settings.
    pub fn resize_to_width(&mut self, width: f32) -> Result<CellMetrics, Error> {
        let metrics = self.settings.cell_metrics_for_width(width);
        self.resize(metrics)?;
        Ok(metrics)
    }

    /// Clears all occupancy and places every event again in id order.
    #[profiling::function]
    fn relayout(&mut self) -> Result<(), Error> {
        self.grid.clear_tracks();
        self.layouts.clear();

        for (id, event) in &self.events {
            let event_layout =
                layout(event, &mut self.grid, &self.settings, self.metrics.as_ref())?;
            self.layouts.insert(*id, event_layout);
        }

        debug!(
            "relaid {} events on {} weeks",
            self.events.len(),
            self.grid.num_weeks()
        );

        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn metrics(&self) -> Option<&CellMetrics> {
        self.metrics.as_ref()
    }

    pub fn event(&self, id: AgendaId) -> Option<&AgendaEvent> {
        self.events.get(&id)
    }

    /// Mutable access for payload edits. Dates and title are fixed once an
    /// event is added.
    pub fn event_mut(&mut self, id: AgendaId) -> Option<&mut AgendaEvent> {
        self.events.get_mut(&id)
    }

    /// All events, ascending by id.
    pub fn events(&self) -> impl Iterator<Item = &AgendaEvent> {
        self.events.values()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Segments for one event, earliest first. Empty when the event is out
    /// of view or unknown.
    pub fn segments(&self, id: AgendaId) -> &[RenderSegment] {
        self.layouts
            .get(&id)
            .map(|layout| layout.segments.as_slice())
            .unwrap_or(&[])
    }

    /// Every segment, grouped by event id and then by date.
    pub fn all_segments(&self) -> impl Iterator<Item = &RenderSegment> {
        self.layouts.values().flat_map(|layout| layout.segments.iter())
    }

    /// Days whose cells ran out of room, sorted by date and track.
    pub fn overflows(&self) -> Vec<Overflow> {
        let mut overflows: Vec<Overflow> = self
            .layouts
            .values()
            .flat_map(|layout| layout.overflows.iter().copied())
            .collect();
        overflows.sort_unstable();
        overflows
    }

    /// Text to draw on `segment`: the first visible piece of an event
    /// carries its start time.
    pub fn segment_label(&self, segment: &RenderSegment) -> Option<String> {
        let event = self.events.get(&segment.event)?;
        let leading = self.segments(segment.event).first() == Some(segment);
        Some(event.label(leading))
    }
}
