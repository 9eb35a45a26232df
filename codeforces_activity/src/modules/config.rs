use crate::modules::clock;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use codeforces_activity_libs::api::client::DEFAULT_BASE_URL;
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_GROUP_CODE: &str = "AnBhEByjKm";
pub const DEFAULT_OFFICIAL_START_DATE: &str = "2026-01-14";
pub const DEFAULT_ROSTER_PATH: &str = "roster_with_codeforces.csv";
pub const DEFAULT_ROSTER_COLUMN: &str = "Codeforces Handle";
pub const DEFAULT_CREDENTIALS_FILE: &str = ".env";
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_base_url: String,
    pub group_code: String,
    pub official_start_date: NaiveDate,
    pub roster_path: PathBuf,
    pub roster_column: String,
    pub credentials_file: PathBuf,
    /// Pause between consecutive API calls.
    pub request_interval: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from(DEFAULT_BASE_URL),
            group_code: String::from(DEFAULT_GROUP_CODE),
            official_start_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap_or(NaiveDate::MIN),
            roster_path: PathBuf::from(DEFAULT_ROSTER_PATH),
            roster_column: String::from(DEFAULT_ROSTER_COLUMN),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            request_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::info!(
            "{} environment variable is not set. Default value `{}` will be used.",
            key,
            default
        );
        String::from(default)
    })
}

impl FetchConfig {
    pub fn from_env() -> Result<Self> {
        let official_start_date = var_or("CF_OFFICIAL_START_DATE", DEFAULT_OFFICIAL_START_DATE);
        let official_start_date = NaiveDate::parse_from_str(&official_start_date, "%Y-%m-%d")
            .with_context(|| {
                let message = format!(
                    "CF_OFFICIAL_START_DATE must be YYYY-MM-DD, got `{}`",
                    official_start_date
                );
                tracing::error!(message);
                message
            })?;

        let interval = var_or(
            "CF_REQUEST_INTERVAL_MS",
            &DEFAULT_REQUEST_INTERVAL_MS.to_string(),
        );
        let interval: u64 = interval.parse().with_context(|| {
            let message = format!("CF_REQUEST_INTERVAL_MS must be an integer, got `{}`", interval);
            tracing::error!(message);
            message
        })?;

        Ok(Self {
            api_base_url: var_or("CF_API_BASE_URL", DEFAULT_BASE_URL),
            group_code: var_or("CF_GROUP_CODE", DEFAULT_GROUP_CODE),
            official_start_date,
            roster_path: PathBuf::from(var_or("CF_ROSTER_PATH", DEFAULT_ROSTER_PATH)),
            roster_column: var_or("CF_ROSTER_COLUMN", DEFAULT_ROSTER_COLUMN),
            credentials_file: PathBuf::from(var_or("CF_CREDENTIALS_FILE", DEFAULT_CREDENTIALS_FILE)),
            request_interval: Duration::from_millis(interval),
        })
    }

    /// Official contests starting before this epoch second are ignored.
    pub fn official_cutoff(&self) -> i64 {
        clock::utc_day_start(self.official_start_date)
    }
}
