//! Interactive prompts for the `explore` command.
//!
//! Every choice is a [`Select`] list built from the lookup tables, so the
//! only answers a user can give are valid table indices.

use anyhow::{Context, Result};
use bikeshare::dataset::FilterCriteria;
use bikeshare::error::FilterError;
use bikeshare::lookup;
use dialoguer::Select;
use std::fmt::Display;

/// What to do after a report has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    Restart,
    FirstRecords,
    NextPage,
}

impl MenuChoice {
    pub const ALL: &[Self] = &[
        Self::Exit,
        Self::Restart,
        Self::FirstRecords,
        Self::NextPage,
    ];

    pub fn label(&self, first_records: usize) -> String {
        match self {
            Self::Exit => "Exit".to_string(),
            Self::Restart => "Restart".to_string(),
            Self::FirstRecords => format!("View the {first_records} first records"),
            Self::NextPage => "View the next page of raw data".to_string(),
        }
    }
}

/// `"CH = Chicago"` style entries in table order.
pub fn city_labels() -> Vec<String> {
    lookup::cities()
        .iter()
        .map(|(code, name)| format!("{code} = {name}"))
        .collect()
}

pub fn month_labels() -> &'static [&'static str] {
    lookup::months()
}

pub fn day_labels() -> &'static [&'static str] {
    lookup::days_of_week()
}

pub fn menu_labels(first_records: usize) -> Vec<String> {
    MenuChoice::ALL
        .iter()
        .map(|choice| choice.label(first_records))
        .collect()
}

/// Turns the three list positions into filter criteria.
pub fn criteria_from_selection(
    city: usize,
    month: usize,
    day: usize,
) -> Result<FilterCriteria, FilterError> {
    let cities = lookup::cities();
    let (_, city) = cities.get(city).ok_or(FilterError::InvalidIndex {
        kind: "city",
        index: city,
        max: cities.len().saturating_sub(1),
    })?;

    Ok(FilterCriteria::new(*city)
        .with_month(lookup::month_name(month)?)
        .with_weekday(lookup::day_name(day)?))
}

/// Position in [`MenuChoice::ALL`] to a choice. Cancelling counts as exit.
pub fn menu_choice(selection: Option<usize>) -> MenuChoice {
    selection
        .and_then(|idx| MenuChoice::ALL.get(idx).copied())
        .unwrap_or(MenuChoice::Exit)
}

fn select<T: Display>(prompt: &str, items: &[T]) -> Result<Option<usize>> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()
        .context("Interactive prompts need a terminal")
}

/// Asks for a city, a month and a day of week. `None` if the user cancels.
pub fn get_filters() -> Result<Option<FilterCriteria>> {
    let Some(city) = select("Choose a city", &city_labels())? else {
        return Ok(None);
    };
    let Some(month) = select("Choose a month", month_labels())? else {
        return Ok(None);
    };
    let Some(day) = select("Choose a day of week", day_labels())? else {
        return Ok(None);
    };

    Ok(Some(criteria_from_selection(city, month, day)?))
}

/// Asks what to do next.
pub fn menu(first_records: usize) -> Result<MenuChoice> {
    let labels = menu_labels(first_records);
    Ok(menu_choice(select("What do you like to do?", &labels)?))
}
