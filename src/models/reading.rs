use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

/// One interval reading from a meter sensor column
///
/// A reading without value represents an empty or non-numeric cell in the meter data and
/// is not counted by aggregation.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Tz>,
    pub value: Option<Decimal>,
}

impl Reading {
    pub fn new(timestamp: DateTime<Tz>, value: Option<Decimal>) -> Reading {
        Reading { timestamp, value }
    }
}
