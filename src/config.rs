use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime settings.
///
/// Read from an optional JSON file; every field has a default:
/// ```json
/// {
///   "data_dir": "./data",
///   "slice_size": 10,
///   "first_records": 50
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Directory holding `<city>.csv` files.
    #[serde(default = "Settings::default_data_dir")]
    pub data_dir: PathBuf,
    /// Rows per page when paging through raw data.
    #[serde(default = "Settings::default_slice_size")]
    pub slice_size: usize,
    /// Rows shown by the "view first records" menu entry.
    #[serde(default = "Settings::default_first_records")]
    pub first_records: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            slice_size: Self::default_slice_size(),
            first_records: Self::default_first_records(),
        }
    }
}

impl Settings {
    pub const DATA_DIR_ENV: &'static str = "BIKESHARE_DATA_DIR";
    pub const CONFIG_ENV: &'static str = "BIKESHARE_CONFIG";

    fn default_data_dir() -> PathBuf {
        PathBuf::from(".")
    }
    fn default_slice_size() -> usize {
        10
    }
    fn default_first_records() -> usize {
        50
    }

    /// Loads settings from a JSON file at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file '{}'", path.display()))?;
        Ok(settings)
    }

    /// Resolves settings from, in increasing precedence: defaults, the file
    /// at `path` (or `BIKESHARE_CONFIG`), `BIKESHARE_DATA_DIR`, then
    /// `data_dir_override`.
    pub fn load(path: Option<&Path>, data_dir_override: Option<PathBuf>) -> Result<Self> {
        let env_path = std::env::var_os(Self::CONFIG_ENV).map(PathBuf::from);
        let mut settings = match path.map(Path::to_path_buf).or(env_path) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };

        if let Some(dir) = std::env::var_os(Self::DATA_DIR_ENV) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = data_dir_override {
            settings.data_dir = dir;
        }
        Ok(settings)
    }
}
