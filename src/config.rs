use std::fs;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::models::price_schedule::PriceSchedule;
use crate::tariff::{HolidaySet, MEXICO_CITY};

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    1
}

#[derive(Deserialize)]
pub struct Files {
    pub readings_file: String,
    pub report_file: Option<String>,
}

/// Billing window in Mexico City wall clock time, both ends inclusive
#[derive(Deserialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub sensor_column: Option<String>,
}

impl Period {
    /// Returns the window start and end as Mexico City timestamps
    pub fn window(&self) -> Result<(DateTime<Tz>, DateTime<Tz>), ConfigError> {
        let start = MEXICO_CITY.from_local_datetime(&self.start).earliest()
            .ok_or_else(|| ConfigError(format!("period start {} does not exist in Mexico City time", self.start)))?;
        let end = MEXICO_CITY.from_local_datetime(&self.end).latest()
            .ok_or_else(|| ConfigError(format!("period end {} does not exist in Mexico City time", self.end)))?;

        Ok((start, end))
    }
}

#[derive(Deserialize, Default)]
pub struct Holidays {
    #[serde(default)]
    pub extra: Vec<NaiveDate>,
}

impl Holidays {
    pub fn to_set(&self) -> HolidaySet {
        HolidaySet::with_extra(self.extra.iter().copied())
    }
}

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub files: Files,
    pub period: Period,
    #[serde(default)]
    pub holidays: Holidays,
    #[serde(default)]
    pub prices: PriceSchedule,
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    parse_config(&toml)
}

/// Parses and validates configuration
///
/// # Arguments
///
/// * 'toml' - the configuration document
fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.period.start > config.period.end {
        return Err(ConfigError::from("period start must not be after period end"));
    }
    if config.general.workers == 0 {
        return Err(ConfigError::from("workers must be at least 1"));
    }

    Ok(config)
}
