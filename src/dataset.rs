//! Loading a city's trips and narrowing them by month and day of week.

use std::cell::OnceCell;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use csv::StringRecord;
use serde::Serialize;

use crate::error::{DataError, FilterError, FilterStage, LoadError};
use crate::lookup::{self, ALL};
use crate::parser::{Columns, TripRecord, parse_record};

/// Columns appended to every preview row.
pub const DERIVED_COLUMNS: [&str; 2] = ["Month", "Weekday"];

/// City plus optional month and weekday names. `"All"` disables a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub city: String,
    pub month: String,
    pub weekday: String,
}

impl FilterCriteria {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            month: ALL.to_string(),
            weekday: ALL.to_string(),
        }
    }

    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month = month.into();
        self
    }

    pub fn with_weekday(mut self, weekday: impl Into<String>) -> Self {
        self.weekday = weekday.into();
        self
    }
}

/// Column names and a slice of rows for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
struct Row {
    raw: StringRecord,
    trip: TripRecord,
}

/// The trips of one session, after filtering.
#[derive(Debug)]
pub struct Dataset {
    city: String,
    headers: StringRecord,
    columns: Columns,
    rows: Vec<Row>,
    hours: OnceCell<Vec<u32>>,
}

impl Dataset {
    /// Reads every row of a CSV source. No filtering is applied.
    pub fn from_reader<R: Read>(city: &str, reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let columns = Columns::from_headers(&headers)?;

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let raw = result?;
            let trip = parse_record(&columns, &raw, i + 1)?;
            rows.push(Row { raw, trip });
        }

        Ok(Self {
            city: city.to_string(),
            headers,
            columns,
            rows,
            hours: OnceCell::new(),
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_gender(&self) -> bool {
        self.columns.has_gender()
    }

    pub fn has_birth_year(&self) -> bool {
        self.columns.has_birth_year()
    }

    pub fn trips(&self) -> impl Iterator<Item = &TripRecord> {
        self.rows.iter().map(|row| &row.trip)
    }

    /// Start hour of each trip, computed on first use.
    pub fn hours(&self) -> &[u32] {
        self.hours
            .get_or_init(|| self.trips().map(TripRecord::hour).collect())
    }

    /// Keeps trips that started in `month` (1-12).
    pub fn filter_month(self, month: u32) -> Result<Self, FilterError> {
        self.retain(|trip| trip.month() == month, FilterStage::Month)
    }

    /// Keeps trips that started on the named day, e.g. `"Monday"`.
    pub fn filter_weekday(self, weekday: &str) -> Result<Self, FilterError> {
        self.retain(
            |trip| lookup::weekday_name(trip.weekday()) == weekday,
            FilterStage::Weekday,
        )
    }

    fn retain<F>(mut self, keep: F, stage: FilterStage) -> Result<Self, FilterError>
    where
        F: Fn(&TripRecord) -> bool,
    {
        self.rows.retain(|row| keep(&row.trip));
        self.hours = OnceCell::new();

        if self.rows.is_empty() {
            return Err(FilterError::EmptyResult { stage });
        }
        Ok(self)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(str::to_string)
            .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }

    /// Up to `limit` rows starting at `offset`, in file order.
    pub fn rows_from(&self, offset: usize, limit: usize) -> Preview {
        let rows = self
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .map(|row| {
                let mut values: Vec<String> = row.raw.iter().map(str::to_string).collect();
                values.resize(self.headers.len(), String::new());
                values.push(row.trip.month().to_string());
                values.push(lookup::weekday_name(row.trip.weekday()).to_string());
                values
            })
            .collect();

        Preview {
            columns: self.column_names(),
            rows,
        }
    }

    pub fn take_first(&self, n: usize) -> Preview {
        self.rows_from(0, n)
    }

    /// One page of `slice_size` rows starting at `start`, plus the start of
    /// the following page if any rows remain.
    pub fn raw_data(&self, start: usize, slice_size: usize) -> (Preview, Option<usize>) {
        let preview = self.rows_from(start, slice_size);
        let end = start.saturating_add(preview.rows.len());
        let next = (!preview.rows.is_empty() && end < self.rows.len()).then_some(end);
        (preview, next)
    }
}

/// Resolves cities to CSV files under a data directory.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    data_dir: PathBuf,
}

impl DatasetLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the CSV file backing `city`.
    pub fn source_path(&self, city: &str) -> Result<PathBuf, FilterError> {
        let stem = lookup::data_source_name(city)?;
        Ok(self.data_dir.join(format!("{stem}.csv")))
    }

    /// Loads `criteria.city` and applies the month filter, then the weekday filter.
    ///
    /// # Errors
    ///
    /// [`FilterError`] for unknown names, a missing file, or an empty result;
    /// [`DataError`] if the file is malformed.
    pub fn load(&self, criteria: &FilterCriteria) -> Result<Dataset, LoadError> {
        let path = self.source_path(&criteria.city)?;
        let file = File::open(&path).map_err(|_| FilterError::UnknownCity {
            city: criteria.city.clone(),
            source_path: Some(path.display().to_string()),
        })?;

        let dataset = Dataset::from_reader(&criteria.city, file)?;
        Ok(apply_filters(dataset, criteria)?)
    }
}

/// Applies month then weekday filtering; `"All"` skips a stage.
pub fn apply_filters(dataset: Dataset, criteria: &FilterCriteria) -> Result<Dataset, FilterError> {
    let month = lookup::month_by_name(&criteria.month)?;
    let weekday = lookup::day_by_name(&criteria.weekday)?;

    let mut dataset = dataset;
    if dataset.is_empty() {
        return Err(FilterError::EmptyResult {
            stage: FilterStage::Month,
        });
    }
    if month != 0 {
        dataset = dataset.filter_month(month as u32)?;
    }
    if weekday != 0 {
        dataset = dataset.filter_weekday(lookup::days_of_week()[weekday])?;
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    const CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1,2017-01-01 09:07:57,2017-01-01 09:20:53,776,Canal St,Clark St,Subscriber
2,2017-01-02 10:00:00,2017-01-02 10:10:00,600,Canal St,State St,Customer
3,2017-02-06 18:30:00,2017-02-06 18:40:00,600,Clark St,Canal St,Subscriber
4,2017-02-07 08:15:00,2017-02-07 08:25:00,600,State St,Canal St,Subscriber
5,2017-03-05 12:00:00,2017-03-05 12:05:00,300,Clark St,State St,Customer
";

    fn dataset() -> Dataset {
        Dataset::from_reader("Chicago", CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_from_reader_counts_rows() {
        let ds = dataset();
        assert_eq!(ds.row_count(), 5);
        assert!(!ds.has_gender());
        assert!(!ds.has_birth_year());
    }

    #[test]
    fn test_all_filters_are_noop() {
        let criteria = FilterCriteria::new("Chicago")
            .with_month("All")
            .with_weekday("all");
        let filtered = apply_filters(dataset(), &criteria).unwrap();
        assert_eq!(filtered.row_count(), dataset().row_count());
    }

    #[test]
    fn test_month_filter() {
        let criteria = FilterCriteria::new("Chicago").with_month("february");
        let filtered = apply_filters(dataset(), &criteria).unwrap();
        assert_eq!(filtered.row_count(), 2);
        assert!(filtered.trips().all(|t| t.month() == 2));
    }

    #[test]
    fn test_month_then_weekday_filter() {
        // 2017-02-06 was a Monday
        let criteria = FilterCriteria::new("Chicago")
            .with_month("February")
            .with_weekday("Monday");
        let filtered = apply_filters(dataset(), &criteria).unwrap();
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.hours(), &[18]);
    }

    #[test]
    fn test_empty_month_filter() {
        let criteria = FilterCriteria::new("Chicago").with_month("June");
        let err = apply_filters(dataset(), &criteria).unwrap_err();
        assert_eq!(
            err,
            FilterError::EmptyResult {
                stage: FilterStage::Month
            }
        );
    }

    #[test]
    fn test_empty_weekday_filter() {
        let criteria = FilterCriteria::new("Chicago")
            .with_month("March")
            .with_weekday("Friday");
        let err = apply_filters(dataset(), &criteria).unwrap_err();
        assert_eq!(
            err,
            FilterError::EmptyResult {
                stage: FilterStage::Weekday
            }
        );
    }

    #[test]
    fn test_unknown_month_name() {
        let criteria = FilterCriteria::new("Chicago").with_month("Smarch");
        assert!(matches!(
            apply_filters(dataset(), &criteria),
            Err(FilterError::UnknownMonth(_))
        ));
    }

    #[test]
    fn test_rows_from_preview() {
        let preview = dataset().rows_from(0, 2);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[0][0], "1");
        assert_eq!(preview.rows[1][0], "2");
        assert_eq!(preview.columns.len(), 7 + DERIVED_COLUMNS.len());
        assert_eq!(preview.columns[1], "Start Time");
        assert_eq!(preview.rows[0][7], "1");
        assert_eq!(preview.rows[0][8], "Sunday");
    }

    #[test]
    fn test_rows_from_past_end() {
        let ds = dataset();
        assert_eq!(ds.rows_from(4, 10).rows.len(), 1);
        assert!(ds.rows_from(10, 10).rows.is_empty());
        assert_eq!(ds.take_first(3).rows.len(), 3);
    }

    #[test]
    fn test_raw_data_pages() {
        let ds = dataset();

        let (first, next) = ds.raw_data(0, 2);
        assert_eq!(first.rows.len(), 2);
        assert_eq!(next, Some(2));

        let (second, next) = ds.raw_data(2, 2);
        assert_eq!(second.rows[0][0], "3");
        assert_eq!(next, Some(4));

        let (last, next) = ds.raw_data(4, 2);
        assert_eq!(last.rows.len(), 1);
        assert_eq!(next, None);

        let (past_end, next) = ds.raw_data(9, 2);
        assert!(past_end.rows.is_empty());
        assert_eq!(next, None);
    }

    #[test]
    fn test_loader_unknown_city() {
        let loader = DatasetLoader::new(env::temp_dir());
        let err = loader.load(&FilterCriteria::new("Boston")).unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            LoadError::Filter(FilterError::UnknownCity { .. })
        ));
    }

    #[test]
    fn test_loader_missing_file_is_unknown_city() {
        let dir = env::temp_dir().join("bikeshare_test_missing_dir");
        let loader = DatasetLoader::new(&dir);
        let err = loader.load(&FilterCriteria::new("Washington")).unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            LoadError::Filter(FilterError::UnknownCity {
                source_path: Some(_),
                ..
            })
        ));

        let message = err.to_string();
        assert!(message.starts_with("No data file for Washington at "));
        assert!(message.ends_with("washington.csv"));
    }

    #[test]
    fn test_loader_reads_file() {
        let dir = env::temp_dir().join("bikeshare_test_loader");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("new_york_city.csv"), CSV).unwrap();

        let loader = DatasetLoader::new(&dir);
        assert_eq!(
            loader.source_path("New York City").unwrap(),
            dir.join("new_york_city.csv")
        );

        let ds = loader.load(&FilterCriteria::new("New York City")).unwrap();
        assert_eq!(ds.row_count(), 5);
        assert_eq!(ds.city(), "New York City");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_loader_structural_error() {
        let dir = env::temp_dir().join("bikeshare_test_structural");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("chicago.csv"), "Start Time,Start Station\n").unwrap();

        let loader = DatasetLoader::new(&dir);
        let err = loader.load(&FilterCriteria::new("Chicago")).unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(
            err,
            LoadError::Data(DataError::MissingColumn(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
