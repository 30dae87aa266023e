//! Agenda layout: clips events to the visible grid, splits them at week
//! boundaries and gives every piece a track.

use chrono::NaiveDate;
use tracing::trace;

use crate::dates::{next_day, signed_day_delta, WeekStart};
use crate::error::Error;
use crate::event::{AgendaEvent, AgendaId};
use crate::grid::Grid;
use crate::settings::{CellMetrics, LayoutSettings};

/// A run of consecutive days of one event inside a single week row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// The span begins on the event's first day.
    pub left_cap: bool,
    /// The span finishes on the event's last day.
    pub right_cap: bool,
}

/// Iterator over the per-week pieces of a clipped event.
#[derive(Debug, Clone)]
pub struct WeekSpans {
    cursor: Option<NaiveDate>,
    render_end: NaiveDate,
    event_start: NaiveDate,
    event_end: NaiveDate,
    week_start: WeekStart,
}

impl WeekSpans {
    fn empty(week_start: WeekStart) -> Self {
        WeekSpans {
            cursor: None,
            render_end: NaiveDate::MIN,
            event_start: NaiveDate::MIN,
            event_end: NaiveDate::MIN,
            week_start,
        }
    }
}

impl Iterator for WeekSpans {
    type Item = WeekSpan;

    fn next(&mut self) -> Option<WeekSpan> {
        let start = self.cursor?;
        let left_cap = start == self.event_start;
        let column = self.week_start.index_of(start) as i64;

        if signed_day_delta(start, self.render_end) + column <= 6 {
            self.cursor = None;
            return Some(WeekSpan {
                start,
                end: self.render_end,
                left_cap,
                right_cap: self.render_end == self.event_end,
            });
        }

        let end = self.week_start.last_day_of_week(start);
        self.cursor = Some(self.week_start.first_day_of_next_week(end));
        Some(WeekSpan {
            start,
            end,
            left_cap,
            right_cap: false,
        })
    }
}

/// The visible part of `event` as an inclusive date range, or `None` when
/// the event is entirely outside the grid.
pub fn clip(event: &AgendaEvent, grid: &Grid) -> Option<(NaiveDate, NaiveDate)> {
    let first = grid.first_visible();
    let last = grid.last_visible();

    if event.end_date() < first || event.start_date() > last {
        return None;
    }

    Some((event.start_date().max(first), event.end_date().min(last)))
}

/// Splits the visible part of `event` into week-sized spans, earliest first.
pub fn week_spans(event: &AgendaEvent, grid: &Grid) -> WeekSpans {
    let Some((render_start, render_end)) = clip(event, grid) else {
        return WeekSpans::empty(grid.week_start());
    };

    WeekSpans {
        cursor: Some(render_start),
        render_end,
        event_start: event.start_date(),
        event_end: event.end_date(),
        week_start: grid.week_start(),
    }
}

/// One drawable bar of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSegment {
    pub event: AgendaId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Week row the segment sits in.
    pub week: usize,
    pub track: usize,
    pub left_cap: bool,
    pub right_cap: bool,
    /// The track sits below the cell's capacity; the renderer should show
    /// an overflow indicator instead of the bar.
    pub overflow: bool,
}

impl RenderSegment {
    /// Number of days covered.
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |day| {
            (*day < end).then(|| next_day(*day))
        })
    }
}

/// A day that has more segments than its cell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Overflow {
    pub date: NaiveDate,
    pub track: usize,
}

/// Segments and overflow markers produced for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLayout {
    pub segments: Vec<RenderSegment>,
    pub overflows: Vec<Overflow>,
}

impl EventLayout {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Lays out `event` on `grid`, claiming tracks as it goes.
///
/// Without `metrics` the cell capacity is unknown and nothing overflows.
#[profiling::function]
pub fn layout(
    event: &AgendaEvent,
    grid: &mut Grid,
    settings: &LayoutSettings,
    metrics: Option<&CellMetrics>,
) -> Result<EventLayout, Error> {
    let mut result = EventLayout::default();

    for span in week_spans(event, grid) {
        let track = grid.first_common_open_track(span.start, span.end)?;
        grid.set_track(track, span.start, span.end, true)?;

        let week = grid
            .week_of(span.start)
            .ok_or(Error::DateNotInGrid(span.start))?;
        let overflow = metrics.is_some_and(|metrics| !settings.track_fits(track, metrics));

        let segment = RenderSegment {
            event: event.id(),
            start: span.start,
            end: span.end,
            week,
            track,
            left_cap: span.left_cap,
            right_cap: span.right_cap,
            overflow,
        };

        if overflow {
            result
                .overflows
                .extend(segment.dates().map(|date| Overflow { date, track }));
        }

        result.segments.push(segment);
    }

    trace!(
        "event {} laid out in {} segments",
        event.id(),
        result.segments.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Payload;
    use chrono::NaiveDateTime;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(12, 0, 0).unwrap()
    }

    fn event(id: u64, start: NaiveDate, end: NaiveDate) -> AgendaEvent {
        let mut agenda_id = AgendaId::FIRST;
        for _ in 1..id {
            agenda_id = agenda_id.next();
        }
        AgendaEvent::new(
            agenda_id,
            format!("event {id}"),
            noon(start),
            noon(end),
            Payload::new(),
        )
    }

    fn june_2010() -> Grid {
        Grid::build(ymd(2010, 6, 1), WeekStart::Sunday).unwrap()
    }

    #[test]
    fn test_single_week_event() {
        let mut grid = june_2010();
        let ev = event(1, ymd(2010, 6, 8), ymd(2010, 6, 10));
        let result = layout(&ev, &mut grid, &LayoutSettings::default(), None).unwrap();

        assert_eq!(
            result.segments,
            vec![RenderSegment {
                event: ev.id(),
                start: ymd(2010, 6, 8),
                end: ymd(2010, 6, 10),
                week: 1,
                track: 0,
                left_cap: true,
                right_cap: true,
                overflow: false,
            }]
        );
        assert!(result.overflows.is_empty());
    }

    #[test]
    fn test_overlapping_events_stack() {
        let mut grid = june_2010();
        let settings = LayoutSettings::default();
        // Mon-Wed then Tue-Thu of the same week
        let a = event(1, ymd(2010, 6, 7), ymd(2010, 6, 9));
        let b = event(2, ymd(2010, 6, 8), ymd(2010, 6, 10));
        let c = event(3, ymd(2010, 6, 11), ymd(2010, 6, 11));

        let a = layout(&a, &mut grid, &settings, None).unwrap();
        let b = layout(&b, &mut grid, &settings, None).unwrap();
        let c = layout(&c, &mut grid, &settings, None).unwrap();

        assert_eq!(a.segments[0].track, 0);
        assert_eq!(b.segments[0].track, 1);
        assert_eq!(c.segments[0].track, 0);
    }

    #[test]
    fn test_split_across_weeks() {
        let mut grid = june_2010();
        // Friday June 11 through Tuesday June 15
        let ev = event(1, ymd(2010, 6, 11), ymd(2010, 6, 15));
        let spans: Vec<_> = week_spans(&ev, &grid).collect();

        assert_eq!(
            spans,
            vec![
                WeekSpan {
                    start: ymd(2010, 6, 11),
                    end: ymd(2010, 6, 12),
                    left_cap: true,
                    right_cap: false,
                },
                WeekSpan {
                    start: ymd(2010, 6, 13),
                    end: ymd(2010, 6, 15),
                    left_cap: false,
                    right_cap: true,
                },
            ]
        );

        let result = layout(&ev, &mut grid, &LayoutSettings::default(), None).unwrap();
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].week, 1);
        assert_eq!(result.segments[1].week, 2);
    }

    #[test]
    fn test_clipped_event_has_no_caps_at_the_edges() {
        let mut grid = june_2010();
        let ev = event(1, ymd(2010, 5, 1), ymd(2010, 8, 1));
        let result = layout(&ev, &mut grid, &LayoutSettings::default(), None).unwrap();

        assert_eq!(result.segments.len(), grid.num_weeks());
        assert!(result.segments.iter().all(|s| !s.left_cap && !s.right_cap));
        assert_eq!(result.segments[0].start, grid.first_visible());
        assert_eq!(result.segments.last().unwrap().end, grid.last_visible());
    }

    #[test]
    fn test_out_of_view_event_is_empty() {
        let mut grid = june_2010();
        let before = event(1, ymd(2010, 5, 1), ymd(2010, 5, 29));
        let after = event(2, ymd(2010, 7, 4), ymd(2010, 7, 10));
        let settings = LayoutSettings::default();

        assert!(clip(&before, &grid).is_none());
        assert!(layout(&before, &mut grid, &settings, None).unwrap().is_empty());
        assert!(layout(&after, &mut grid, &settings, None).unwrap().is_empty());
        assert!(grid.cells().all(|cell| cell.tracks().depth() == 0));
    }

    #[test]
    fn test_segments_of_one_event_can_use_different_tracks() {
        let mut grid = june_2010();
        let settings = LayoutSettings::default();
        let blocker = event(1, ymd(2010, 6, 14), ymd(2010, 6, 14));
        let long = event(2, ymd(2010, 6, 10), ymd(2010, 6, 16));

        layout(&blocker, &mut grid, &settings, None).unwrap();
        let result = layout(&long, &mut grid, &settings, None).unwrap();

        assert_eq!(result.segments[0].track, 0);
        assert_eq!(result.segments[1].track, 1);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut grid = june_2010();
        let settings = LayoutSettings::default();
        // room for tracks 0 and 1 only
        let metrics = CellMetrics::new(100.0, 48.0);

        let mut results = Vec::new();
        for id in 1..=3 {
            let ev = event(id, ymd(2010, 6, 8), ymd(2010, 6, 9));
            results.push(layout(&ev, &mut grid, &settings, Some(&metrics)).unwrap());
        }

        assert!(!results[0].segments[0].overflow);
        assert!(!results[1].segments[0].overflow);
        assert!(results[2].segments[0].overflow);
        assert_eq!(
            results[2].overflows,
            vec![
                Overflow {
                    date: ymd(2010, 6, 8),
                    track: 2,
                },
                Overflow {
                    date: ymd(2010, 6, 9),
                    track: 2,
                },
            ]
        );
    }

    #[test]
    fn test_monday_weeks_split_on_sunday() {
        let mut grid = Grid::build(ymd(2010, 6, 1), WeekStart::Monday).unwrap();
        // Saturday June 12 through Monday June 14
        let ev = event(1, ymd(2010, 6, 12), ymd(2010, 6, 14));
        let result = layout(&ev, &mut grid, &LayoutSettings::default(), None).unwrap();

        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].end, ymd(2010, 6, 13));
        assert_eq!(result.segments[1].start, ymd(2010, 6, 14));
    }

    #[test]
    fn test_segment_dates() {
        let segment = RenderSegment {
            event: AgendaId::FIRST,
            start: ymd(2010, 6, 29),
            end: ymd(2010, 7, 2),
            week: 4,
            track: 0,
            left_cap: true,
            right_cap: true,
            overflow: false,
        };

        assert_eq!(segment.days(), 4);
        assert_eq!(
            segment.dates().collect::<Vec<_>>(),
            vec![ymd(2010, 6, 29), ymd(2010, 6, 30), ymd(2010, 7, 1), ymd(2010, 7, 2)]
        );
    }
}
