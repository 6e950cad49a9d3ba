use std::collections::BTreeMap;
use std::panic;
use std::thread;
use chrono::DateTime;
use chrono_tz::Tz;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;
use crate::models::reading::Reading;
use crate::tariff::{classify, HolidaySet, TariffBucket};

/// Statistics for all readings falling into one tariff bucket
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct BucketStats {
    pub bucket: TariffBucket,
    pub count: u64,
    pub sum: Decimal,
    pub average: Decimal,
    pub max: Decimal,
}

/// Statistics per tariff bucket, a bucket missing from the map counts as all zero
pub type TariffStats = BTreeMap<TariffBucket, BucketStats>;

impl BucketStats {
    /// Returns statistics with no readings in them
    ///
    /// # Arguments
    ///
    /// * 'bucket' - the tariff bucket the statistics are for
    pub fn empty(bucket: TariffBucket) -> BucketStats {
        BucketStats {
            bucket,
            count: 0,
            sum: Decimal::ZERO,
            average: Decimal::ZERO,
            max: Decimal::ZERO,
        }
    }

    /// Adds one value to the statistics
    ///
    /// # Arguments
    ///
    /// * 'value' - the reading value
    pub fn push(&mut self, value: Decimal) {
        self.max = if self.count == 0 { value } else { self.max.max(value) };
        self.count += 1;
        self.sum += value;
        self.average = self.sum / Decimal::from(self.count);
    }

    /// Merges statistics computed over a disjoint set of readings into these
    ///
    /// # Arguments
    ///
    /// * 'other' - statistics for the same bucket
    pub fn merge(&mut self, other: &BucketStats) {
        if other.count == 0 {
            return;
        }
        self.max = if self.count == 0 { other.max } else { self.max.max(other.max) };
        self.count += other.count;
        self.sum += other.sum;
        self.average = self.sum / Decimal::from(self.count);
    }
}

/// Returns tariff statistics with all three buckets present and empty
pub fn empty_stats() -> TariffStats {
    TariffBucket::ALL.iter().map(|&b| (b, BucketStats::empty(b))).collect()
}

/// Merges two sets of tariff statistics computed over disjoint readings
///
/// # Arguments
///
/// * 'acc' - statistics to merge into
/// * 'other' - statistics to merge from
pub fn merge_stats(mut acc: TariffStats, other: &TariffStats) -> TariffStats {
    for (bucket, stats) in other {
        acc.entry(*bucket)
            .or_insert_with(|| BucketStats::empty(*bucket))
            .merge(stats);
    }
    acc
}

/// Aggregates readings per tariff bucket using built-in holidays only
///
/// # Arguments
///
/// * 'readings' - readings to aggregate
/// * 'window_start' - first timestamp to include
/// * 'window_end' - last timestamp to include
pub fn aggregate(readings: &[Reading], window_start: &DateTime<Tz>, window_end: &DateTime<Tz>) -> TariffStats {
    aggregate_with_holidays(readings, window_start, window_end, &HolidaySet::new())
}

/// Aggregates readings per tariff bucket.
///
/// Only readings with a value and a timestamp within the inclusive window are counted. All
/// three buckets are present in the result, empty ones with all zero statistics.
///
/// # Arguments
///
/// * 'readings' - readings to aggregate
/// * 'window_start' - first timestamp to include
/// * 'window_end' - last timestamp to include
/// * 'holidays' - holidays to classify with
pub fn aggregate_with_holidays(
    readings: &[Reading],
    window_start: &DateTime<Tz>,
    window_end: &DateTime<Tz>,
    holidays: &HolidaySet) -> TariffStats {

    let mut stats = empty_stats();

    readings.iter()
        .filter(|r| r.timestamp >= *window_start && r.timestamp <= *window_end)
        .filter_map(|r| r.value.map(|v| (classify(Some(&r.timestamp), Some(holidays)), v)))
        .for_each(|(bucket, value)| {
            stats.entry(bucket)
                .or_insert_with(|| BucketStats::empty(bucket))
                .push(value);
        });

    stats
}

/// Aggregates readings per tariff bucket by splitting them over a number of worker threads
/// and merging the partial results. Gives the same result as the sequential version.
///
/// # Arguments
///
/// * 'readings' - readings to aggregate
/// * 'window_start' - first timestamp to include
/// * 'window_end' - last timestamp to include
/// * 'holidays' - holidays to classify with
/// * 'workers' - number of threads to use
pub fn aggregate_parallel(
    readings: &[Reading],
    window_start: &DateTime<Tz>,
    window_end: &DateTime<Tz>,
    holidays: &HolidaySet,
    workers: usize) -> TariffStats {

    if workers <= 1 || readings.len() < 2 {
        return aggregate_with_holidays(readings, window_start, window_end, holidays);
    }

    let chunk_size = readings.len().div_ceil(workers);
    debug!("aggregating {} readings in chunks of {}", readings.len(), chunk_size);

    thread::scope(|s| {
        let handles = readings
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move || aggregate_with_holidays(chunk, window_start, window_end, holidays)))
            .collect::<Vec<_>>();

        handles.into_iter().fold(empty_stats(), |acc, handle| {
            match handle.join() {
                Ok(partial) => merge_stats(acc, &partial),
                Err(e) => panic::resume_unwind(e),
            }
        })
    })
}
