use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Formatter;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// All tariff rules are evaluated on Mexico City wall clock time
pub const MEXICO_CITY: Tz = chrono_tz::America::Mexico_City;

/// Minutes in one day, the end of every rule table
pub const MINUTES_PER_DAY: u32 = 1440;

/// Time-of-use tariff periods
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TariffBucket {
    Base,
    Intermediate,
    Peak,
}

impl TariffBucket {
    pub const ALL: [TariffBucket; 3] = [TariffBucket::Base, TariffBucket::Intermediate, TariffBucket::Peak];
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for TariffBucket {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TariffBucket::Base         => write!(f, "Base"),
            TariffBucket::Intermediate => write!(f, "Intermediate"),
            TariffBucket::Peak         => write!(f, "Peak"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Season {
    Summer,
    Winter,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for Season {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Season::Summer => write!(f, "Summer"),
            Season::Winter => write!(f, "Winter"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayType {
    Weekday,
    Saturday,
    SundayOrHoliday,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for DayType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DayType::Weekday         => write!(f, "Weekday"),
            DayType::Saturday        => write!(f, "Saturday"),
            DayType::SundayOrHoliday => write!(f, "Sunday/Holiday"),
        }
    }
}

/// Half open range of minutes of the day, [start, end), mapped to a tariff bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TariffWindow {
    pub start: u32,
    pub end: u32,
    pub bucket: TariffBucket,
}

impl TariffWindow {
    const fn new(start: u32, end: u32, bucket: TariffBucket) -> TariffWindow {
        TariffWindow { start, end, bucket }
    }

    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start && minute < self.end
    }
}

use TariffBucket::{Base, Intermediate, Peak};

const SUMMER_WEEKDAY: [TariffWindow; 4] = [
    TariffWindow::new(0, 360, Base),
    TariffWindow::new(360, 1200, Intermediate),
    TariffWindow::new(1200, 1320, Peak),
    TariffWindow::new(1320, 1440, Intermediate),
];

const SUMMER_SATURDAY: [TariffWindow; 2] = [
    TariffWindow::new(0, 420, Base),
    TariffWindow::new(420, 1440, Intermediate),
];

const SUMMER_SUNDAY_HOLIDAY: [TariffWindow; 2] = [
    TariffWindow::new(0, 1140, Base),
    TariffWindow::new(1140, 1440, Intermediate),
];

const WINTER_WEEKDAY: [TariffWindow; 4] = [
    TariffWindow::new(0, 360, Base),
    TariffWindow::new(360, 1080, Intermediate),
    TariffWindow::new(1080, 1320, Peak),
    TariffWindow::new(1320, 1440, Intermediate),
];

const WINTER_SATURDAY: [TariffWindow; 4] = [
    TariffWindow::new(0, 480, Base),
    TariffWindow::new(480, 1140, Intermediate),
    TariffWindow::new(1140, 1260, Peak),
    TariffWindow::new(1260, 1440, Intermediate),
];

const WINTER_SUNDAY_HOLIDAY: [TariffWindow; 2] = [
    TariffWindow::new(0, 1080, Base),
    TariffWindow::new(1080, 1440, Intermediate),
];

/// Returns the rule table applicable for a season and day type
///
/// # Arguments
///
/// * 'season' - summer or winter
/// * 'day_type' - weekday, saturday or sunday/holiday
pub fn rule_table(season: Season, day_type: DayType) -> &'static [TariffWindow] {
    match (season, day_type) {
        (Season::Summer, DayType::Weekday)         => &SUMMER_WEEKDAY,
        (Season::Summer, DayType::Saturday)        => &SUMMER_SATURDAY,
        (Season::Summer, DayType::SundayOrHoliday) => &SUMMER_SUNDAY_HOLIDAY,
        (Season::Winter, DayType::Weekday)         => &WINTER_WEEKDAY,
        (Season::Winter, DayType::Saturday)        => &WINTER_SATURDAY,
        (Season::Winter, DayType::SundayOrHoliday) => &WINTER_SUNDAY_HOLIDAY,
    }
}

/// Set of holiday dates.
///
/// Holidays only select the sunday rules on days not already covered by the weekday or
/// saturday rules, a holiday falling on Monday to Saturday keeps that day's rules.
/// New Year's Day, Labour Day, Independence Day and Christmas are always included for
/// whatever year is asked about, any other dates have to be given explicitly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HolidaySet {
    extra: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    /// Returns a holiday set with built-in holidays only
    pub fn new() -> HolidaySet {
        HolidaySet { extra: BTreeSet::new() }
    }

    /// Returns a holiday set with built-in holidays and the given extra dates
    ///
    /// # Arguments
    ///
    /// * 'extra' - additional holiday dates
    pub fn with_extra<I: IntoIterator<Item = NaiveDate>>(extra: I) -> HolidaySet {
        HolidaySet { extra: extra.into_iter().collect() }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        is_builtin_holiday(date) || self.extra.contains(&date)
    }
}

fn is_builtin_holiday(date: NaiveDate) -> bool {
    matches!((date.month(), date.day()), (1, 1) | (5, 1) | (9, 16) | (12, 25))
}

/// Returns the first sunday of april for the given year, i.e. first day of summer
///
/// # Arguments
///
/// * 'year' - the year to calculate for
pub fn summer_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, 4, Weekday::Sun, 1)
}

/// Returns the last sunday of october for the given year, which is the first day of winter
///
/// # Arguments
///
/// * 'year' - the year to calculate for
pub fn summer_end(year: i32) -> Option<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, 10, 31)?;
    let back = last.weekday().num_days_from_sunday();
    last.checked_sub_signed(TimeDelta::days(back as i64))
}

/// Returns the season a date belongs to
///
/// # Arguments
///
/// * 'date' - local date in Mexico City
pub fn season(date: NaiveDate) -> Season {
    match (summer_start(date.year()), summer_end(date.year())) {
        (Some(start), Some(end)) if date >= start && date < end => Season::Summer,
        _ => Season::Winter,
    }
}

/// Returns the day type of a date.
///
/// Monday to Friday are checked first, then saturday, and only then sunday or holiday.
/// A holiday on Monday to Saturday therefore keeps the rules of its weekday.
///
/// # Arguments
///
/// * 'date' - local date in Mexico City
/// * 'holidays' - holiday dates
pub fn day_type(date: NaiveDate, holidays: &HolidaySet) -> DayType {
    let weekday = date.weekday();
    if weekday.number_from_monday() <= 5 {
        if holidays.contains(date) {
            debug!("holiday {} falls on a weekday, keeping weekday rules", date);
        }
        DayType::Weekday
    } else if weekday == Weekday::Sat {
        if holidays.contains(date) {
            debug!("holiday {} falls on a saturday, keeping saturday rules", date);
        }
        DayType::Saturday
    } else {
        DayType::SundayOrHoliday
    }
}

/// Classifies a timestamp into a tariff bucket.
///
/// The timestamp is converted to Mexico City time before any rule is applied. A missing
/// timestamp is classified as Base.
///
/// # Arguments
///
/// * 'timestamp' - the timestamp to classify, in any time zone
/// * 'holidays' - extra holidays on top of the built-in ones
pub fn classify<Z: TimeZone>(timestamp: Option<&DateTime<Z>>, holidays: Option<&HolidaySet>) -> TariffBucket {
    let Some(timestamp) = timestamp else {
        return TariffBucket::Base;
    };
    let local = timestamp.with_timezone(&MEXICO_CITY).naive_local();

    match holidays {
        Some(h) => classify_local(local, h),
        None => classify_local(local, &HolidaySet::new()),
    }
}

/// Classifies a Mexico City wall clock time into a tariff bucket
///
/// # Arguments
///
/// * 'local' - local date and time in Mexico City
/// * 'holidays' - holidays to treat as sundays
pub fn classify_local(local: NaiveDateTime, holidays: &HolidaySet) -> TariffBucket {
    let date = local.date();
    let minute = local.hour() * 60 + local.minute();
    let season = season(date);
    let day_type = day_type(date, holidays);

    match rule_table(season, day_type).iter().find(|w| w.contains(minute)) {
        Some(window) => window.bucket,
        None => {
            warn!("no tariff window for minute {} ({} {}), falling back to Base", minute, season, day_type);
            TariffBucket::Base
        }
    }
}
