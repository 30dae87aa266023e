//! Layout settings and cell geometry.
//!
//! The renderer owns the actual pixels; these numbers only let the layout
//! engine decide how many agenda tracks fit in a day cell.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dates::WeekStart;
use crate::error::Error;
use crate::grid::DAYS_PER_WEEK;

const DEFAULT_AGENDA_ITEM_HEIGHT: f32 = 15.0;
const DEFAULT_AGENDA_ITEM_SPACING: f32 = 1.0;
const DEFAULT_DAY_HEADER_HEIGHT: f32 = 17.0;
const DEFAULT_HEADER_CELL_HEIGHT: f32 = 17.0;
const DEFAULT_CELL_BORDER_WIDTH: f32 = 1.0;
const DEFAULT_CELL_PADDING: f32 = 0.0;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct LayoutSettings {
    /// Height of one agenda bar.
    pub agenda_item_height: f32,
    /// Vertical gap between stacked agenda bars.
    pub agenda_item_spacing: f32,
    /// Height of the day-number strip above each week row.
    pub day_header_height: f32,
    /// Height of the weekday-name header row.
    pub header_cell_height: f32,
    pub cell_border_width: f32,
    pub cell_padding: f32,
    pub week_start: WeekStart,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            agenda_item_height: DEFAULT_AGENDA_ITEM_HEIGHT,
            agenda_item_spacing: DEFAULT_AGENDA_ITEM_SPACING,
            day_header_height: DEFAULT_DAY_HEADER_HEIGHT,
            header_cell_height: DEFAULT_HEADER_CELL_HEIGHT,
            cell_border_width: DEFAULT_CELL_BORDER_WIDTH,
            cell_padding: DEFAULT_CELL_PADDING,
            week_start: WeekStart::default(),
        }
    }
}

/// Size of the day cells in the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMetrics {
    pub width: f32,
    /// The last column absorbs the rounding remainder of the calendar width.
    pub last_width: f32,
    pub height: f32,
}

impl CellMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            last_width: width,
            height,
        }
    }
}

impl LayoutSettings {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let settings = Self::from_json(&contents)?;
        info!("loaded layout settings from {}", path.display());
        Ok(settings)
    }

    /// Distance between the tops of two neighbouring tracks.
    pub fn track_pitch(&self) -> f32 {
        self.agenda_item_height + self.agenda_item_spacing
    }

    /// Offset of `track` from the top of the day cell.
    pub fn track_offset(&self, track: usize) -> f32 {
        track as f32 * self.track_pitch()
    }

    /// Does `track` fit in a cell, leaving a row free for an overflow
    /// indicator?
    pub fn track_fits(&self, track: usize, metrics: &CellMetrics) -> bool {
        self.track_offset(track) <= metrics.height - 2.0 * self.track_pitch()
    }

    /// Cell sizes for a calendar `width` wide. Cells are square apart from
    /// the day header strip.
    pub fn cell_metrics_for_width(&self, width: f32) -> CellMetrics {
        let columns = DAYS_PER_WEEK as f32;
        let border_total = self.cell_border_width * (columns + 1.0);
        let padding_total = self.cell_padding * 2.0 * columns;

        let cell_width =
            (width / columns).floor() - self.cell_border_width - self.cell_padding * 2.0;
        let last_width = cell_width + (width - cell_width * columns) - border_total - padding_total;
        let height = cell_width - self.day_header_height;

        CellMetrics {
            width: cell_width.max(0.0),
            last_width: last_width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Total calendar height for `weeks` rows of `metrics` sized cells,
    /// including headers and borders.
    pub fn calendar_height(&self, metrics: &CellMetrics, weeks: usize) -> f32 {
        let weeks = weeks as f32;
        weeks * (metrics.height + self.day_header_height + self.cell_border_width)
            + self.header_cell_height
            + self.cell_border_width * 2.0
    }
}
