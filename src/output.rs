//! Report formatting for statistics results.
//!
//! Supports plain text sections for the terminal and JSON serialization.

use std::fmt::{self, Write};
use std::time::Duration;

use anyhow::Result;

use crate::dataset::Preview;
use crate::lookup;
use crate::stats::{CityReport, StationStats, TimeStats, TripDurationStats, UserStats};

pub const SEPARATOR: &str = "----------------------------------------";

/// Whole seconds as `Xd Xh Xm Xs`, leaving out leading zero units.
pub fn seconds_formatter(seconds: f64) -> String {
    let total = seconds.abs().trunc() as u64;
    let (days, rest) = (total / 86_400, total % 86_400);
    let (hours, rest) = (rest / 3_600, rest % 3_600);
    let (minutes, seconds) = (rest / 60, rest % 60);

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {seconds}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Three decimals with thousands separators, e.g. `1,234.500`.
pub fn float_formatter(number: f64) -> String {
    let fixed = format!("{:.3}", number.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "000"));
    let sign = if number < 0.0 && fixed != "0.000" { "-" } else { "" };
    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

/// Integer with thousands separators, e.g. `1,234,567`.
pub fn int_formatter(number: usize) -> String {
    group_thousands(&number.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn cities_listing() -> String {
    lookup::cities()
        .iter()
        .map(|(code, name)| format!("{code} = {name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn months_listing() -> String {
    indexed_listing(lookup::months())
}

pub fn days_listing() -> String {
    indexed_listing(lookup::days_of_week())
}

fn indexed_listing(names: &[&str]) -> String {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{i} = {name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn took<W: Write>(out: &mut W, elapsed: Option<Duration>) -> fmt::Result {
    let seconds = elapsed.map(|d| d.as_secs_f64()).unwrap_or_default();
    writeln!(out, "\nThis took {} seconds.", float_formatter(seconds))?;
    writeln!(out, "{SEPARATOR}")
}

pub fn render_time_stats<W: Write>(
    out: &mut W,
    stats: &TimeStats,
    elapsed: Option<Duration>,
) -> fmt::Result {
    out.write_str("\nCalculating The Most Frequent Times of Travel...\n\n")?;
    writeln!(out, " * Most common month: {}", stats.most_common_month)?;
    writeln!(out, " * Most common day of week: {}", stats.most_common_day_of_week)?;
    writeln!(out, " * Most common start hour: {}", stats.most_common_start_hour)?;
    took(out, elapsed)
}

pub fn render_station_stats<W: Write>(
    out: &mut W,
    stats: &StationStats,
    elapsed: Option<Duration>,
) -> fmt::Result {
    out.write_str("\nCalculating The Most Popular Stations and Trip...\n\n")?;
    writeln!(
        out,
        " * Most commonly used start station: {}",
        stats.most_common_start_station
    )?;
    writeln!(
        out,
        " * Most commonly used end station: {}",
        stats.most_common_end_station
    )?;
    writeln!(
        out,
        " * Most frequent combination of start station and end station trip: {}",
        stats.most_common_start_end_stations
    )?;
    took(out, elapsed)
}

pub fn render_trip_duration_stats<W: Write>(
    out: &mut W,
    stats: &TripDurationStats,
    elapsed: Option<Duration>,
) -> fmt::Result {
    out.write_str("\nCalculating Trip Duration...\n\n")?;
    writeln!(
        out,
        " * Total trips duration: {}",
        seconds_formatter(stats.total_trips_duration)
    )?;
    writeln!(
        out,
        " * Average trip duration: {}",
        seconds_formatter(stats.avg_trip_duration)
    )?;
    took(out, elapsed)
}

/// Gender and birth year sections fall back to a notice when the data is absent.
pub fn render_user_stats<W: Write>(
    out: &mut W,
    stats: &UserStats,
    elapsed: Option<Duration>,
) -> fmt::Result {
    out.write_str("\nCalculating User Stats...\n\n")?;

    out.write_str("Number of users by type:\n")?;
    for (user_type, count) in &stats.users_by_type {
        writeln!(out, " * {user_type}: {}", int_formatter(*count))?;
    }

    out.write_str("\nNumber of users by gender:\n")?;
    match &stats.users_by_gender {
        Some(by_gender) => {
            for (gender, count) in by_gender {
                writeln!(out, " * {gender}: {}", int_formatter(*count))?;
            }
        }
        None => out.write_str("No user gender data available\n")?,
    }

    out.write_str("\nYear of birth stats:\n")?;
    match (
        stats.earliest_birth_year,
        stats.most_recent_birth_year,
        stats.most_common_birth_year,
    ) {
        (Some(earliest), Some(recent), Some(common)) => {
            writeln!(out, " * Earliest: {earliest}")?;
            writeln!(out, " * Most recent: {recent}")?;
            writeln!(out, " * Most common: {common}")?;
        }
        _ => out.write_str("No year of birth data available\n")?,
    }

    took(out, elapsed)
}

/// Column header line followed by one line per row, tab separated.
pub fn render_preview(preview: &Preview) -> String {
    let mut out = preview.columns.join("\t");
    out.push('\n');
    for row in &preview.rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// Serializes a full report as pretty-printed JSON.
pub fn report_json(report: &CityReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
