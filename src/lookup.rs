//! Static lookup tables for cities, months and days of week.

use chrono::Weekday;

use crate::error::FilterError;

/// Sentinel meaning "no filter" at index 0 of [`months`] and [`days_of_week`].
pub const ALL: &str = "All";

static CITIES: &[(&str, &str)] = &[
    ("CH", "Chicago"),
    ("NY", "New York City"),
    ("WA", "Washington"),
];

static MONTHS: [&str; 13] = [
    ALL,
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static DAYS_OF_WEEK: [&str; 8] = [
    ALL,
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// City codes paired with display names.
pub fn cities() -> &'static [(&'static str, &'static str)] {
    CITIES
}

/// Month names; index 0 is [`ALL`], 1 through 12 are January to December.
pub fn months() -> &'static [&'static str; 13] {
    &MONTHS
}

/// Day names, Sunday first; index 0 is [`ALL`].
pub fn days_of_week() -> &'static [&'static str; 8] {
    &DAYS_OF_WEEK
}

/// Resolves a two letter city code, ignoring case.
pub fn city_name(code: &str) -> Result<&'static str, FilterError> {
    let code = code.trim();
    CITIES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .ok_or_else(|| FilterError::InvalidCityCode(code.to_string()))
}

/// Reverse of [`city_name`]. Returns `None` for names not in the table.
pub fn city_code(name: &str) -> Option<&'static str> {
    CITIES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(code, _)| *code)
}

pub fn month_name(index: usize) -> Result<&'static str, FilterError> {
    MONTHS.get(index).copied().ok_or(FilterError::InvalidIndex {
        kind: "month",
        index,
        max: MONTHS.len() - 1,
    })
}

/// Index of a month name, ignoring case. `"All"` maps to 0.
pub fn month_by_name(name: &str) -> Result<usize, FilterError> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| FilterError::UnknownMonth(name.to_string()))
}

pub fn day_name(index: usize) -> Result<&'static str, FilterError> {
    DAYS_OF_WEEK
        .get(index)
        .copied()
        .ok_or(FilterError::InvalidIndex {
            kind: "day",
            index,
            max: DAYS_OF_WEEK.len() - 1,
        })
}

/// Index of a day name, ignoring case. `"All"` maps to 0.
pub fn day_by_name(name: &str) -> Result<usize, FilterError> {
    DAYS_OF_WEEK
        .iter()
        .position(|d| d.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| FilterError::UnknownWeekday(name.to_string()))
}

/// Full English name of a chrono weekday, as used in [`days_of_week`].
pub fn weekday_name(day: Weekday) -> &'static str {
    DAYS_OF_WEEK[day.num_days_from_sunday() as usize + 1]
}

/// Data file stem for a city: lower-cased, spaces replaced by underscores.
pub fn data_source_name(city: &str) -> Result<String, FilterError> {
    city_code(city).ok_or_else(|| FilterError::UnknownCity {
        city: city.to_string(),
        source_path: None,
    })?;
    Ok(city.trim().to_lowercase().replace(' ', "_"))
}
