//! Result records produced by [`crate::analyzers::engine::StatsSession`].

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    pub most_common_month: String,
    pub most_common_day_of_week: String,
    pub most_common_start_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub most_common_start_station: String,
    pub most_common_end_station: String,
    pub most_common_start_end_stations: String,
}

/// Durations in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDurationStats {
    pub total_trips_duration: f64,
    pub avg_trip_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub users_by_type: BTreeMap<String, usize>,
    /// `None` when the dataset has no gender column.
    pub users_by_gender: Option<BTreeMap<String, usize>>,
    pub earliest_birth_year: Option<i32>,
    pub most_recent_birth_year: Option<i32>,
    pub most_common_birth_year: Option<i32>,
}

impl UserStats {
    /// True only when all three birth year figures are present.
    pub fn has_birth_year_stats(&self) -> bool {
        self.earliest_birth_year.is_some()
            && self.most_recent_birth_year.is_some()
            && self.most_common_birth_year.is_some()
    }
}

/// All four reports together, for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct CityReport {
    pub city: String,
    pub month: String,
    pub day_of_week: String,
    pub trips: usize,
    pub time: TimeStats,
    pub station: StationStats,
    pub trip_duration: TripDurationStats,
    pub user: UserStats,
    pub operation_seconds: BTreeMap<String, f64>,
}
