pub mod errors;

use std::fs;
use std::str::FromStr;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use rust_decimal::Decimal;
use crate::models::reading::Reading;
use crate::tariff::MEXICO_CITY;
pub use errors::ReadingsError;

/// Timestamp formats accepted in meter data exports, tried in order
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Header fragments identifying the timestamp column
const TIMESTAMP_HEADERS: [&str; 3] = ["fecha", "time", "timestamp"];

/// Largest absolute reading value accepted, keeps per bucket sums far from Decimal overflow
const MAX_READING_MAGNITUDE: i64 = 1_000_000_000_000_000;

struct MeterRow {
    timestamp: DateTime<Tz>,
    values: Vec<Option<Decimal>>,
}

/// Meter data as exported from an eGauge meter, one timestamp column and any number of
/// sensor columns
pub struct MeterData {
    columns: Vec<String>,
    rows: Vec<MeterRow>,
}

impl MeterData {
    /// Loads meter data from a csv file
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the csv file
    pub fn from_file(path: &str) -> Result<MeterData, ReadingsError> {
        let content = fs::read_to_string(path)?;
        let data = MeterData::from_csv(&content)?;
        info!("loaded {} rows with sensor columns {:?} from {}", data.rows.len(), data.columns, path);

        Ok(data)
    }

    /// Parses meter data from csv content.
    ///
    /// The separator is a comma if the header line has one, otherwise a semicolon. Timestamps
    /// are Mexico City wall clock times, rows with a timestamp that can't be parsed are skipped.
    /// Cells that are not numeric become readings without value, while a numeric cell beyond
    /// the accepted magnitude is an error. Sensor column names are cleaned with
    /// `clean_column_name`.
    ///
    /// # Arguments
    ///
    /// * 'content' - the csv document
    pub fn from_csv(content: &str) -> Result<MeterData, ReadingsError> {
        let header_line = content.lines().next().ok_or("meter data is empty")?;
        let separator = if header_line.contains(',') { b',' } else { b';' };

        let mut reader = ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?
            .iter()
            .map(|h| h.trim().replace('"', ""))
            .collect::<Vec<String>>();

        let ts_idx = headers.iter()
            .position(|h| {
                let h = h.to_lowercase();
                TIMESTAMP_HEADERS.iter().any(|t| h.contains(t))
            })
            .unwrap_or(0);

        let columns = headers.iter()
            .enumerate()
            .filter(|(i, _)| *i != ts_idx)
            .map(|(_, h)| clean_column_name(h))
            .collect::<Vec<String>>();

        let mut rows: Vec<MeterRow> = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let ts_cell = record.get(ts_idx).unwrap_or("").replace('"', "");

            let Some(timestamp) = parse_timestamp(&ts_cell) else {
                warn!("skipping row {}: unrecognized timestamp '{}'", line + 2, ts_cell);
                continue;
            };

            let mut values: Vec<Option<Decimal>> = Vec::with_capacity(columns.len());
            for i in (0..headers.len()).filter(|i| *i != ts_idx) {
                let value = match record.get(i) {
                    Some(cell) => parse_value(cell).map_err(|e| {
                        ReadingsError(format!("row {}, column '{}': {}", line + 2, headers[i], e.0))
                    })?,
                    None => None,
                };
                values.push(value);
            }

            rows.push(MeterRow { timestamp, values });
        }

        Ok(MeterData { columns, rows })
    }

    /// Returns the sensor column names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns number of rows with a valid timestamp
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of a sensor column, matched on its cleaned name
    ///
    /// # Arguments
    ///
    /// * 'column' - column name, raw or cleaned
    fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = clean_column_name(column);
        self.columns.iter().position(|h| *h == wanted)
    }

    /// Returns the readings of one sensor column together with the column name
    ///
    /// # Arguments
    ///
    /// * 'column' - name of the sensor column, or None for the first sensor column
    pub fn readings(&self, column: Option<&str>) -> Result<(String, Vec<Reading>), ReadingsError> {
        if self.columns.is_empty() {
            return Err(ReadingsError::from("no sensor columns found in meter data"));
        }

        let idx = match column.map(str::trim).filter(|c| !c.is_empty()) {
            None => 0,
            Some(c) => self.column_index(c)
                .ok_or_else(|| ReadingsError(format!("sensor column '{}' not found, available: {:?}", c, self.columns)))?,
        };

        let readings = self.rows.iter()
            .map(|r| Reading::new(r.timestamp, r.values.get(idx).copied().flatten()))
            .collect::<Vec<Reading>>();

        Ok((self.columns[idx].clone(), readings))
    }
}

/// Parses a Mexico City wall clock timestamp in any of the accepted formats
///
/// # Arguments
///
/// * 'cell' - the timestamp as text
fn parse_timestamp(cell: &str) -> Option<DateTime<Tz>> {
    let cell = cell.trim();
    let naive = TIMESTAMP_FORMATS.iter()
        .find_map(|f| NaiveDateTime::parse_from_str(cell, f).ok())?;

    MEXICO_CITY.from_local_datetime(&naive).earliest()
}

/// Parses a sensor cell, non-numeric cells have no value
///
/// # Arguments
///
/// * 'cell' - the cell as text
fn parse_value(cell: &str) -> Result<Option<Decimal>, ReadingsError> {
    let cell = cell.trim().trim_matches('"');
    let Ok(value) = Decimal::from_str(cell).or_else(|_| Decimal::from_scientific(cell)) else {
        return Ok(None);
    };

    if value.abs() > Decimal::from(MAX_READING_MAGNITUDE) {
        return Err(ReadingsError(format!("value {} out of range", cell)));
    }

    Ok(Some(value))
}

/// Cleans a sensor header into a column name: quotes are removed, whitespace runs and
/// parentheses become underscores, repeated underscores collapse into one and leading or
/// trailing underscores are dropped.
///
/// # Arguments
///
/// * 'header' - the header as found in the file
pub fn clean_column_name(header: &str) -> String {
    let mut name = String::with_capacity(header.len());
    for c in header.trim().chars() {
        match c {
            '"' | '\'' | '`' => {}
            c if c.is_whitespace() || c == '(' || c == ')' => {
                if !name.ends_with('_') {
                    name.push('_');
                }
            }
            '_' if name.ends_with('_') => {}
            c => name.push(c),
        }
    }

    name.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use rust_decimal_macros::dec;

    const EGAUGE: &str = "\
\"Date & Time\",\"Usage [kW]\",\"Generation [kW]\"
2024-01-15 19:00:00,12.5,0
2024-01-15 20:00:00,,1.25
not a date,3,3
2024-01-15 21:00:00,n/a,2E-1
";

    #[test]
    fn parses_comma_separated_export() {
        let data = MeterData::from_csv(EGAUGE).unwrap();
        assert_eq!(data.columns(), ["Usage_[kW]", "Generation_[kW]"]);
        assert_eq!(data.len(), 3);

        let (column, readings) = data.readings(None).unwrap();
        assert_eq!(column, "Usage_[kW]");
        assert_eq!(readings[0].value, Some(dec!(12.5)));
        assert_eq!(readings[1].value, None);
        assert_eq!(readings[2].value, None);
        assert_eq!(
            readings[0].timestamp,
            MEXICO_CITY.with_ymd_and_hms(2024, 1, 15, 19, 0, 0).single().unwrap()
        );

        let (_, generation) = data.readings(Some("Generation [kW]")).unwrap();
        assert_eq!(generation[1].value, Some(dec!(1.25)));
        assert_eq!(generation[2].value, Some(dec!(0.2)));
    }

    #[test]
    fn parses_semicolon_separated_export_with_named_timestamp() {
        let content = "kwh;Fecha\n1.5;15/01/2024 19:00:00\n2;2024/01/15 20:00:00\n";
        let data = MeterData::from_csv(content).unwrap();
        assert_eq!(data.columns(), ["kwh"]);

        let (_, readings) = data.readings(Some("kwh")).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].value, Some(dec!(2)));
        assert_eq!(
            readings[1].timestamp,
            MEXICO_CITY.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).single().unwrap()
        );
    }

    #[test]
    fn accepts_all_timestamp_formats() {
        for cell in [
            "2024-01-15 19:30:00",
            "15/01/2024 19:30:00",
            "01/15/2024 19:30:00",
            "2024-01-15T19:30:00",
            "15-01-2024 19:30",
            "2024/01/15 19:30:00",
        ] {
            let ts = parse_timestamp(cell).unwrap();
            assert_eq!(ts, MEXICO_CITY.with_ymd_and_hms(2024, 1, 15, 19, 30, 0).single().unwrap(), "{}", cell);
        }
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn column_names_are_cleaned() {
        assert_eq!(clean_column_name(" Usage  (kW) "), "Usage_kW");
        assert_eq!(clean_column_name("\"Grid\" __ 'L1'"), "Grid_L1");
        assert_eq!(clean_column_name("(Solar+)"), "Solar+");
        assert_eq!(clean_column_name("kwh"), "kwh");

        let data = MeterData::from_csv("timestamp,Total Usage (kW)\n2024-01-15 19:00:00,4\n").unwrap();
        assert_eq!(data.columns(), ["Total_Usage_kW"]);
        let (column, readings) = data.readings(Some("Total Usage (kW)")).unwrap();
        assert_eq!(column, "Total_Usage_kW");
        assert_eq!(readings[0].value, Some(dec!(4)));
        assert!(data.readings(Some("Total_Usage_kW")).is_ok());
    }

    #[test]
    fn huge_values_are_rejected() {
        let content = "timestamp,kwh\n2024-01-15 02:00:00,5E28\n2024-01-15 03:00:00,5E28\n";
        let err = MeterData::from_csv(content).err().unwrap();
        assert!(err.to_string().contains("out of range"));
        assert!(err.to_string().contains("row 2"));

        let data = MeterData::from_csv("timestamp,kwh\n2024-01-15 02:00:00,-1E15\n").unwrap();
        let (_, readings) = data.readings(None).unwrap();
        assert_eq!(readings[0].value, Some(dec!(-1000000000000000)));
    }

    #[test]
    fn unknown_column_is_an_error() {
        let data = MeterData::from_csv(EGAUGE).unwrap();
        let err = data.readings(Some("Voltage")).unwrap_err();
        assert!(err.to_string().contains("Voltage"));
    }

    #[test]
    fn missing_sensor_columns_is_an_error() {
        let data = MeterData::from_csv("timestamp\n2024-01-15 19:00:00\n").unwrap();
        assert!(data.readings(None).is_err());
        assert!(MeterData::from_csv("").is_err());
    }

    #[test]
    fn rows_without_valid_timestamp_leave_data_empty() {
        let data = MeterData::from_csv("Date & Time,Usage (kW)\nyesterday,1.5\n").unwrap();
        assert!(data.is_empty());
        assert_eq!(data.columns(), &["Usage_kW".to_string()]);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EGAUGE.as_bytes()).unwrap();

        let data = MeterData::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(data.len(), 3);
        assert!(MeterData::from_file("/nonexistent/meter.csv").is_err());
    }
}
