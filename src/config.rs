use std::env;
use std::str::FromStr;

use crate::errors::ConfigError;

pub const PORT: &str = "UPLOADER_PORT";
pub const ADMIN_PORT: &str = "UPLOADER_ADMIN_PORT";
pub const CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const REFRESH_TOKEN: &str = "GOOGLE_REFRESH_TOKEN";
pub const DRIVE_FOLDER_ID: &str = "DRIVE_FOLDER_ID";
pub const SHEET_ID: &str = "SHEET_ID";
pub const SHEET_RANGE: &str = "UPLOADER_SHEET_RANGE";
pub const METADATA_APPEND: &str = "UPLOADER_METADATA_APPEND";

const DEFAULT_SHEET_RANGE: &str = "Sheet1!A:G";

/// Returns the value of the named environment variable if it exists.
pub fn get_variable(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// Returns the named environment variable parsed as `T`.
pub fn parse_variable<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    let value = get_variable(name)?;

    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

/// What to do with the metadata row once the file is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendPolicy {
    /// Append the row and fail the request if that fails.
    Required,

    /// Append the row, but only log a failure.
    BestEffort,

    /// Never append a row.
    Disabled,
}

impl AppendPolicy {
    pub fn is_enabled(self) -> bool {
        self != AppendPolicy::Disabled
    }
}

impl Default for AppendPolicy {
    fn default() -> Self {
        AppendPolicy::Required
    }
}

impl FromStr for AppendPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(AppendPolicy::Required),
            "best-effort" => Ok(AppendPolicy::BestEffort),
            "disabled" => Ok(AppendPolicy::Disabled),
            _ => Err(()),
        }
    }
}

/// Destinations and policy for the upload pipeline. Read once at
/// startup and never changed afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    /// The storage folder new files are filed under.
    pub drive_folder_id: String,

    /// The spreadsheet metadata rows go to, if any.
    pub sheet_id: Option<String>,

    /// The range rows are appended after.
    pub sheet_range: String,

    pub append_policy: AppendPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any source of named values. Empty
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value_of = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let drive_folder_id = value_of(DRIVE_FOLDER_ID).ok_or(ConfigError::Missing(DRIVE_FOLDER_ID))?;

        let append_policy = match value_of(METADATA_APPEND) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: METADATA_APPEND,
                value,
            })?,
            None => AppendPolicy::default(),
        };

        Ok(Config {
            drive_folder_id,
            sheet_id: value_of(SHEET_ID),
            sheet_range: value_of(SHEET_RANGE).unwrap_or_else(|| DEFAULT_SHEET_RANGE.to_owned()),
            append_policy,
        })
    }
}
