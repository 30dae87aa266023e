#![warn(clippy::all, rust_2018_idioms)]

use std::process::ExitCode;

use chrono::{Local, NaiveDate, NaiveDateTime};
use monthgrid::{Calendar, Grid, LayoutSettings, Payload, WeekStart};
use tracing::error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: monthgrid [--month YYYY-MM] [--monday] [--width PX] \
                     [--settings FILE] [--event \"title|start|end\"]...";

struct Args {
    month: Option<NaiveDate>,
    monday: bool,
    width: Option<f32>,
    settings: Option<String>,
    events: Vec<(String, NaiveDateTime, NaiveDateTime)>,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut res = Args {
            month: None,
            monday: false,
            width: None,
            settings: None,
            events: vec![],
        };

        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];

            if arg == "--monday" {
                res.monday = true;
            } else if arg == "--month" {
                i += 1;
                let value = args.get(i).ok_or("month argument missing")?;
                let month = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
                    .map_err(|err| format!("month '{value}' failed to parse: {err}"))?;
                res.month = Some(month);
            } else if arg == "--width" {
                i += 1;
                let value = args.get(i).ok_or("width argument missing")?;
                let width = value
                    .parse()
                    .map_err(|err| format!("width '{value}' failed to parse: {err}"))?;
                res.width = Some(width);
            } else if arg == "--settings" {
                i += 1;
                let value = args.get(i).ok_or("settings argument missing")?;
                res.settings = Some(value.clone());
            } else if arg == "--event" {
                i += 1;
                let value = args.get(i).ok_or("event argument missing")?;
                res.events.push(parse_event(value)?);
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }

            i += 1;
        }

        Ok(res)
    }
}

/// `title|start|end`, where each instant is `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`.
fn parse_event(value: &str) -> Result<(String, NaiveDateTime, NaiveDateTime), String> {
    let mut parts = value.splitn(3, '|');
    let (Some(title), Some(start), Some(end)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("event '{value}' is not title|start|end"));
    };

    Ok((title.to_string(), parse_instant(start)?, parse_instant(end)?))
}

fn parse_instant(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    if let Ok(instant) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Ok(instant);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|err| format!("instant '{value}' failed to parse: {err}"))
}

fn print_grid(calendar: &Calendar) {
    let grid: &Grid = calendar.grid();
    println!("{}", calendar.display_date().format("%B %Y"));
    println!(
        "{}",
        grid.week_start()
            .day_names()
            .map(|name| format!("{name:>5}"))
            .join("")
    );

    for week in grid.weeks() {
        let row: String = week
            .cells()
            .iter()
            .map(|cell| {
                let marker = if cell.is_current_month() { ' ' } else { '.' };
                format!("{:>4}{marker}", cell.date().format("%-d").to_string())
            })
            .collect();
        println!("{row}");
    }
}

fn print_segments(calendar: &Calendar) {
    for segment in calendar.all_segments() {
        let Some(label) = calendar.segment_label(segment) else {
            continue;
        };
        let left = if segment.left_cap { '[' } else { '<' };
        let right = if segment.right_cap { ']' } else { '>' };
        let overflow = if segment.overflow { " (overflow)" } else { "" };
        println!(
            "week {} track {}: {left}{} .. {}{right} {label}{overflow}",
            segment.week, segment.track, segment.start, segment.end
        );
    }

    for overflow in calendar.overflows() {
        println!("+more on {} (track {})", overflow.date, overflow.track);
    }
}

fn run(args: Args) -> Result<(), monthgrid::Error> {
    let mut settings = match &args.settings {
        Some(path) => LayoutSettings::load(path)?,
        None => LayoutSettings::default(),
    };
    if args.monday {
        settings.week_start = WeekStart::Monday;
    }

    let reference = args.month.unwrap_or_else(|| Local::now().date_naive());
    let mut calendar = Calendar::with_settings(reference, settings)?;

    for (title, start, end) in args.events {
        if let Err(err) = calendar.add_event(title, start, end, Payload::new()) {
            error!("skipping event: {err}");
        }
    }

    if let Some(width) = args.width {
        calendar.resize_to_width(width)?;
    }

    print_grid(&calendar);
    println!();
    print_segments(&calendar);

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match Args::parse(&args) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
