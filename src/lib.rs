pub mod aggregation;
pub mod billing;
pub mod config;
pub mod errors;
pub mod initialization;
pub mod logging;
pub mod manager_readings;
pub mod models;
pub mod tariff;

pub use aggregation::{aggregate, aggregate_parallel, aggregate_with_holidays, BucketStats, TariffStats};
pub use billing::{bill, round2};
pub use models::invoice::Invoice;
pub use models::price_schedule::PriceSchedule;
pub use models::reading::Reading;
pub use tariff::{classify, classify_local, HolidaySet, TariffBucket};
