use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::analyzers::utility::{mean, mode, value_counts};
use crate::dataset::{Dataset, Preview};
use crate::error::DataError;
use crate::lookup;
use crate::parser::{END_STATION, START_STATION, START_TIME, TRIP_DURATION, USER_TYPE};
use crate::stats::{StationStats, TimeStats, TripDurationStats, UserStats};

/// The four timed statistics operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Time,
    Station,
    TripDuration,
    User,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Time => "time",
            Operation::Station => "station",
            Operation::TripDuration => "trip_duration",
            Operation::User => "user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns one filtered [`Dataset`] and the elapsed time of the latest run of
/// each statistics operation.
#[derive(Debug)]
pub struct StatsSession {
    dataset: Dataset,
    operation_time: BTreeMap<Operation, Duration>,
}

impl StatsSession {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            operation_time: BTreeMap::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn row_count(&self) -> usize {
        self.dataset.row_count()
    }

    pub fn rows_from(&self, offset: usize, limit: usize) -> Preview {
        self.dataset.rows_from(offset, limit)
    }

    /// Last measured duration of `op`, if it has run.
    pub fn operation_time(&self, op: Operation) -> Option<Duration> {
        self.operation_time.get(&op).copied()
    }

    pub fn operation_times(&self) -> &BTreeMap<Operation, Duration> {
        &self.operation_time
    }

    /// Runs `f` and records its wall-clock time under `op`, replacing any
    /// earlier measurement.
    fn timed<T>(
        &mut self,
        op: Operation,
        f: impl FnOnce(&Dataset) -> Result<T, DataError>,
    ) -> Result<T, DataError> {
        let start = Instant::now();
        let result = f(&self.dataset);
        self.operation_time.insert(op, start.elapsed());
        result
    }

    /// Most common month, day of week and start hour.
    pub fn time_stats(&mut self) -> Result<TimeStats, DataError> {
        self.timed(Operation::Time, |ds| {
            let month = mode(ds.trips().map(|t| t.month())).ok_or(DataError::NoValues(START_TIME))?;
            let weekday =
                mode(ds.trips().map(|t| t.weekday())).ok_or(DataError::NoValues(START_TIME))?;
            let hour = mode(ds.hours().iter().copied()).ok_or(DataError::NoValues(START_TIME))?;

            Ok(TimeStats {
                most_common_month: month_label(month),
                most_common_day_of_week: lookup::weekday_name(weekday).to_string(),
                most_common_start_hour: hour,
            })
        })
    }

    /// Most common start station, end station and start/end pair.
    pub fn station_stats(&mut self) -> Result<StationStats, DataError> {
        self.timed(Operation::Station, |ds| {
            let start = mode(ds.trips().filter_map(|t| t.start_station.as_deref()))
                .ok_or(DataError::NoValues(START_STATION))?;
            let end = mode(ds.trips().filter_map(|t| t.end_station.as_deref()))
                .ok_or(DataError::NoValues(END_STATION))?;
            let route = mode(ds.trips().filter_map(|t| t.route()))
                .ok_or(DataError::NoValues(START_STATION))?;

            Ok(StationStats {
                most_common_start_station: start.to_string(),
                most_common_end_station: end.to_string(),
                most_common_start_end_stations: route,
            })
        })
    }

    /// Total and mean trip duration in seconds. Blank and NA cells are skipped.
    pub fn trip_duration_stats(&mut self) -> Result<TripDurationStats, DataError> {
        self.timed(Operation::TripDuration, |ds| {
            let durations: Vec<f64> = ds.trips().filter_map(|t| t.trip_duration).collect();
            if durations.is_empty() {
                return Err(DataError::NoValues(TRIP_DURATION));
            }

            Ok(TripDurationStats {
                total_trips_duration: durations.iter().sum(),
                avg_trip_duration: mean(&durations),
            })
        })
    }

    /// Counts by user type and gender, plus birth year range and mode.
    ///
    /// Gender counts are `None` without a gender column. Birth year figures
    /// are `None` without a birth year column or when every cell is blank.
    pub fn user_stats(&mut self) -> Result<UserStats, DataError> {
        self.timed(Operation::User, |ds| {
            let users_by_type = value_counts(ds.trips().filter_map(|t| t.user_type.clone()));
            if users_by_type.is_empty() {
                return Err(DataError::NoValues(USER_TYPE));
            }

            let users_by_gender = ds
                .has_gender()
                .then(|| value_counts(ds.trips().filter_map(|t| t.gender.clone())));

            let years: Vec<i32> = if ds.has_birth_year() {
                ds.trips().filter_map(|t| t.birth_year).collect()
            } else {
                Vec::new()
            };

            Ok(UserStats {
                users_by_type,
                users_by_gender,
                earliest_birth_year: years.iter().min().copied(),
                most_recent_birth_year: years.iter().max().copied(),
                most_common_birth_year: mode(years.iter().copied()),
            })
        })
    }
}

// chrono months are 1-12, matching indices of `lookup::months()`.
fn month_label(month: u32) -> String {
    lookup::months()[month as usize].to_string()
}
