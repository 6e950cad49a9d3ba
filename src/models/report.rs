use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use crate::aggregation::BucketStats;
use crate::models::invoice::Invoice;

/// Result of one billing run as written to the report file
#[derive(Serialize)]
pub struct BillingReport {
    pub sensor_column: String,
    pub window_start: DateTime<Tz>,
    pub window_end: DateTime<Tz>,
    pub stats: Vec<BucketStats>,
    pub invoice: Invoice,
}
