//! CSV parser for bikeshare trip files.

use chrono::{Datelike, NaiveDateTime, Timelike};
use csv::StringRecord;

use crate::error::DataError;

pub const START_TIME: &str = "Start Time";
pub const START_STATION: &str = "Start Station";
pub const END_STATION: &str = "End Station";
pub const TRIP_DURATION: &str = "Trip Duration";
pub const USER_TYPE: &str = "User Type";
pub const GENDER: &str = "Gender";
pub const BIRTH_YEAR: &str = "Birth Year";

static TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Cell values read as missing, matching the default NA markers of the
/// pandas exports the trip files come from.
static NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True for blank cells and NA markers.
pub fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || NA_VALUES.contains(&value)
}

/// One ride. Empty and NA cells are kept as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    pub trip_duration: Option<f64>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

impl TripRecord {
    pub fn month(&self) -> u32 {
        self.start_time.month()
    }

    pub fn weekday(&self) -> chrono::Weekday {
        self.start_time.weekday()
    }

    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }

    /// `"<start> -> <end>"`, or `None` if either station is blank.
    pub fn route(&self) -> Option<String> {
        match (&self.start_station, &self.end_station) {
            (Some(start), Some(end)) => Some(format!("{start} -> {end}")),
            _ => None,
        }
    }
}

/// Positions of the known columns within a file's header row.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    start_time: usize,
    start_station: usize,
    end_station: usize,
    trip_duration: usize,
    user_type: usize,
    gender: Option<usize>,
    birth_year: Option<usize>,
}

impl Columns {
    /// Locates columns by name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingColumn`] if a required column is absent.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(DataError::MissingColumn(name));

        Ok(Self {
            start_time: require(START_TIME)?,
            start_station: require(START_STATION)?,
            end_station: require(END_STATION)?,
            trip_duration: require(TRIP_DURATION)?,
            user_type: require(USER_TYPE)?,
            gender: find(GENDER),
            birth_year: find(BIRTH_YEAR),
        })
    }

    pub fn has_gender(&self) -> bool {
        self.gender.is_some()
    }

    pub fn has_birth_year(&self) -> bool {
        self.birth_year.is_some()
    }
}

/// Parses a start time in any of the accepted layouts.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Converts one CSV record into a [`TripRecord`].
///
/// `row` is the 1-based data row number used in error messages.
///
/// # Errors
///
/// Returns [`DataError::InvalidTimestamp`] for an unreadable start time and
/// [`DataError::InvalidNumber`] for a numeric cell that is neither missing nor
/// a finite number.
pub fn parse_record(
    columns: &Columns,
    record: &StringRecord,
    row: usize,
) -> Result<TripRecord, DataError> {
    let raw_start = record.get(columns.start_time).unwrap_or("");
    let start_time = parse_timestamp(raw_start).ok_or_else(|| DataError::InvalidTimestamp {
        row,
        value: raw_start.to_string(),
    })?;

    let birth_year = match columns.birth_year {
        Some(idx) => parse_number(record, idx, BIRTH_YEAR, row)?.map(|year| year as i32),
        None => None,
    };

    Ok(TripRecord {
        start_time,
        start_station: text(record, columns.start_station),
        end_station: text(record, columns.end_station),
        trip_duration: parse_number(record, columns.trip_duration, TRIP_DURATION, row)?,
        user_type: text(record, columns.user_type),
        gender: columns.gender.and_then(|idx| text(record, idx)),
        birth_year,
    })
}

fn text(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|s| !is_missing(s))
        .map(|s| s.trim().to_string())
}

fn parse_number(
    record: &StringRecord,
    idx: usize,
    column: &'static str,
    row: usize,
) -> Result<Option<f64>, DataError> {
    match text(record, idx) {
        None => Ok(None),
        Some(value) => match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(DataError::InvalidNumber { row, column, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> StringRecord {
        StringRecord::from(vec![
            "",
            "Start Time",
            "End Time",
            "Trip Duration",
            "Start Station",
            "End Station",
            "User Type",
            "Gender",
            "Birth Year",
        ])
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDateTime::parse_from_str("2017-06-23 15:09:32", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(parse_timestamp("2017-06-23 15:09:32"), Some(expected));
        assert_eq!(parse_timestamp("2017-06-23T15:09:32"), Some(expected));
        assert_eq!(parse_timestamp("2017-06-23 15:09:32.000"), Some(expected));
        assert!(parse_timestamp("06/23/2017 15:09").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_missing_required_column() {
        let headers = StringRecord::from(vec!["Start Time", "Start Station", "End Station"]);
        let err = Columns::from_headers(&headers).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(TRIP_DURATION)));
    }

    #[test]
    fn test_optional_columns_detected() {
        let columns = Columns::from_headers(&headers()).unwrap();
        assert!(columns.has_gender());
        assert!(columns.has_birth_year());

        let without = StringRecord::from(vec![
            "Start Time",
            "Trip Duration",
            "Start Station",
            "End Station",
            "User Type",
        ]);
        let columns = Columns::from_headers(&without).unwrap();
        assert!(!columns.has_gender());
        assert!(!columns.has_birth_year());
    }

    #[test]
    fn test_parse_record() {
        let columns = Columns::from_headers(&headers()).unwrap();
        let record = StringRecord::from(vec![
            "1423854",
            "2017-06-23 15:09:32",
            "2017-06-23 15:14:53",
            "321",
            "Wood St & Hubbard St",
            "Damen Ave & Chicago Ave",
            "Subscriber",
            "Male",
            "1992.0",
        ]);

        let trip = parse_record(&columns, &record, 1).unwrap();
        assert_eq!(trip.month(), 6);
        assert_eq!(trip.weekday(), chrono::Weekday::Fri);
        assert_eq!(trip.hour(), 15);
        assert_eq!(trip.trip_duration, Some(321.0));
        assert_eq!(trip.birth_year, Some(1992));
        assert_eq!(
            trip.route().as_deref(),
            Some("Wood St & Hubbard St -> Damen Ave & Chicago Ave")
        );
    }

    #[test]
    fn test_parse_record_blank_cells() {
        let columns = Columns::from_headers(&headers()).unwrap();
        let record = StringRecord::from(vec![
            "1",
            "2017-01-01 00:07:57",
            "",
            "",
            "Canal St & Madison St",
            "",
            "Customer",
            "",
            "",
        ]);

        let trip = parse_record(&columns, &record, 1).unwrap();
        assert_eq!(trip.trip_duration, None);
        assert_eq!(trip.gender, None);
        assert_eq!(trip.birth_year, None);
        assert_eq!(trip.route(), None);
    }

    #[test]
    fn test_parse_record_bad_timestamp() {
        let columns = Columns::from_headers(&headers()).unwrap();
        let record = StringRecord::from(vec!["1", "not a date", "", "60", "A", "B", "Customer", "", ""]);
        let err = parse_record(&columns, &record, 7).unwrap_err();
        assert!(matches!(err, DataError::InvalidTimestamp { row: 7, .. }));
    }

    #[test]
    fn test_parse_record_bad_duration() {
        let columns = Columns::from_headers(&headers()).unwrap();
        let record = StringRecord::from(vec![
            "1",
            "2017-01-01 00:07:57",
            "",
            "ten minutes",
            "A",
            "B",
            "Customer",
            "",
            "",
        ]);
        let err = parse_record(&columns, &record, 3).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidNumber {
                row: 3,
                column: TRIP_DURATION,
                ..
            }
        ));
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(is_missing("NaN"));
        assert!(is_missing(" nan "));
        assert!(is_missing("NULL"));
        assert!(is_missing("#N/A"));
        assert!(!is_missing("0"));
        assert!(!is_missing("Nancy"));
    }

    #[test]
    fn test_parse_record_na_cells() {
        let columns = Columns::from_headers(&headers()).unwrap();
        let record = StringRecord::from(vec![
            "2",
            "2017-01-01 00:07:57",
            "",
            "NaN",
            "Canal St & Madison St",
            "NA",
            "Subscriber",
            "nan",
            "NaN",
        ]);

        let trip = parse_record(&columns, &record, 2).unwrap();
        assert_eq!(trip.trip_duration, None);
        assert_eq!(trip.birth_year, None);
        assert_eq!(trip.gender, None);
        assert_eq!(trip.end_station, None);
        assert_eq!(trip.user_type.as_deref(), Some("Subscriber"));
    }

    #[test]
    fn test_parse_record_rejects_infinite_numbers() {
        let columns = Columns::from_headers(&headers()).unwrap();
        for value in ["inf", "-infinity", "1e400"] {
            let record = StringRecord::from(vec![
                "3",
                "2017-01-01 00:07:57",
                "",
                value,
                "A",
                "B",
                "Customer",
                "",
                "",
            ]);
            let err = parse_record(&columns, &record, 4).unwrap_err();
            assert!(
                matches!(
                    err,
                    DataError::InvalidNumber {
                        row: 4,
                        column: TRIP_DURATION,
                        ..
                    }
                ),
                "{value} should be rejected"
            );
        }

        let record = StringRecord::from(vec![
            "3",
            "2017-01-01 00:07:57",
            "",
            "60",
            "A",
            "B",
            "Subscriber",
            "Female",
            "-inf",
        ]);
        let err = parse_record(&columns, &record, 5).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidNumber {
                column: BIRTH_YEAR,
                ..
            }
        ));
    }
}
