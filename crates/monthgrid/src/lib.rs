mod calendar;
pub mod dates;
mod error;
mod event;
mod grid;
pub mod layout;
mod settings;
mod tracks;

pub use calendar::Calendar;
pub use dates::{WallClock, WeekStart};
pub use error::Error;
pub use event::{AgendaEvent, AgendaId, Payload};
pub use grid::{CellPosition, DayCell, DayIndex, Grid, MonthPlacement, WeekRow, DAYS_PER_WEEK};
pub use layout::{layout, EventLayout, Overflow, RenderSegment, WeekSpan, WeekSpans};
pub use settings::{CellMetrics, LayoutSettings};
pub use tracks::TrackSlots;
