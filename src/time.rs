//! Conversion of CF time coordinates to decimal model years
//!
//! Climate models rarely use the real-world calendar, so the decoder supports
//! the CF calendars seen in model output: proleptic Gregorian (via `chrono`),
//! Julian, 365-day, 366-day and 360-day years. The result for each sample is
//! `year + fraction of that year elapsed`.

use crate::dataset::Dataset;
use crate::errors::{PoppyError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use std::str::FromStr;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// CF calendar systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// `standard`, `gregorian` and `proleptic_gregorian`
    Gregorian,
    Julian,
    /// `noleap` / `365_day`
    NoLeap,
    /// `all_leap` / `366_day`
    AllLeap,
    /// `360_day`
    Day360,
}

impl FromStr for Calendar {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::Gregorian),
            "julian" => Ok(Self::Julian),
            "noleap" | "no_leap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            other => Err(format!("unsupported calendar '{}'", other)),
        }
    }
}

impl Calendar {
    fn is_leap(self, year: i64) -> bool {
        match self {
            Self::Gregorian => (year % 4 == 0 && year % 100 != 0) || year % 400 == 0,
            Self::Julian => year % 4 == 0,
            Self::NoLeap | Self::Day360 => false,
            Self::AllLeap => true,
        }
    }

    fn days_in_year(self, year: i64) -> i64 {
        match self {
            Self::Day360 => 360,
            _ if self.is_leap(year) => 366,
            _ => 365,
        }
    }

    /// Years in one leap cycle and the days they span. Any run of that many
    /// consecutive years has the same length.
    fn leap_cycle(self) -> (i64, i64) {
        match self {
            Self::Gregorian => (400, 146_097),
            Self::Julian => (4, 1461),
            Self::NoLeap => (1, 365),
            Self::AllLeap => (1, 366),
            Self::Day360 => (1, 360),
        }
    }

    fn days_in_month(self, year: i64, month: u32) -> i64 {
        match self {
            Self::Day360 => 30,
            _ => match month {
                2 if self.is_leap(year) => 29,
                2 => 28,
                4 | 6 | 9 | 11 => 30,
                _ => 31,
            },
        }
    }
}

/// Unit of the elapsed-time values
#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn seconds(self) -> f64 {
        match self {
            Self::Days => SECONDS_PER_DAY,
            Self::Hours => 3_600.0,
            Self::Minutes => 60.0,
            Self::Seconds => 1.0,
        }
    }
}

/// Reference epoch of a `"<unit> since <date>"` string
#[derive(Debug, Clone, Copy, PartialEq)]
struct Epoch {
    year: i64,
    month: u32,
    day: u32,
    seconds: f64,
}

/// Parsed `units` attribute of a time coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    unit: TimeUnit,
    epoch: Epoch,
}

impl FromStr for TimeUnits {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (unit, reference) = s
            .split_once(" since ")
            .ok_or_else(|| format!("units '{}' are not of the form '<unit> since <date>'", s))?;
        let unit = match unit.trim().to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => TimeUnit::Days,
            "hours" | "hour" | "hrs" | "hr" | "h" => TimeUnit::Hours,
            "minutes" | "minute" | "mins" | "min" => TimeUnit::Minutes,
            "seconds" | "second" | "secs" | "sec" | "s" => TimeUnit::Seconds,
            other => return Err(format!("unsupported time unit '{}'", other)),
        };
        let epoch = parse_epoch(reference.trim())?;
        Ok(Self { unit, epoch })
    }
}

fn parse_epoch(s: &str) -> std::result::Result<Epoch, String> {
    let mut parts = s.splitn(2, |c: char| c == ' ' || c == 'T');
    let date = parts.next().unwrap_or_default();
    let clock = parts
        .next()
        .map(|c| c.trim().trim_end_matches('Z'))
        .unwrap_or_default();

    let bad = || format!("unparseable reference date '{}'", s);

    // A leading minus belongs to the year, not a separator.
    let (sign, date) = match date.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, date),
    };
    let fields: Vec<&str> = date.split('-').collect();
    if fields.len() != 3 {
        return Err(bad());
    }
    let year = sign * fields[0].parse::<i64>().map_err(|_| bad())?;
    let month = fields[1].parse::<u32>().map_err(|_| bad())?;
    let day = fields[2].parse::<u32>().map_err(|_| bad())?;
    if !(1..=12).contains(&month) || day == 0 || day > 31 {
        return Err(bad());
    }

    let mut seconds = 0.0;
    // Drop any time zone offset, model calendars have none.
    let clock = clock.split_whitespace().next().unwrap_or_default();
    if !clock.is_empty() {
        let factors = [3_600.0, 60.0, 1.0];
        for (field, factor) in clock.split(':').zip(factors) {
            seconds += field.parse::<f64>().map_err(|_| bad())? * factor;
        }
    }

    Ok(Epoch {
        year,
        month,
        day,
        seconds,
    })
}

/// Converts elapsed time values to decimal years.
pub fn decimal_year(values: &[f64], units: &str, calendar: &str) -> Result<Vec<f64>> {
    let metadata_error = |message: String| PoppyError::TimeMetadata {
        var: "time".to_string(),
        message,
    };
    let units: TimeUnits = units.parse().map_err(metadata_error)?;
    let calendar: Calendar = calendar.parse().map_err(metadata_error)?;
    values
        .iter()
        .map(|&v| decode_one(v, &units, calendar).map_err(metadata_error))
        .collect()
}

/// Reads `var_name` with its `units` and `calendar` attributes and decodes it.
pub fn decimal_year_from_dataset(ds: &Dataset, var_name: &str) -> Result<Vec<f64>> {
    let missing = |attr: &str| PoppyError::TimeMetadata {
        var: var_name.to_string(),
        message: format!("missing '{}' attribute in '{}'", attr, ds.path().display()),
    };
    let units = ds
        .attribute_string(var_name, "units")?
        .ok_or_else(|| missing("units"))?;
    let calendar = ds
        .attribute_string(var_name, "calendar")?
        .ok_or_else(|| missing("calendar"))?;

    let values = ds.read(var_name, &[crate::dataset::Slab::All])?;
    let values: Vec<f64> = values.iter().copied().collect();
    decimal_year(&values, &units, &calendar).map_err(|e| match e {
        PoppyError::TimeMetadata { message, .. } => PoppyError::TimeMetadata {
            var: var_name.to_string(),
            message,
        },
        other => other,
    })
}

fn decode_one(value: f64, units: &TimeUnits, calendar: Calendar) -> std::result::Result<f64, String> {
    if !value.is_finite() {
        return Err(format!("non-finite time value {}", value));
    }
    let elapsed = value * units.unit.seconds();
    match calendar {
        Calendar::Gregorian => decode_gregorian(elapsed, &units.epoch),
        _ => Ok(decode_model_calendar(elapsed, &units.epoch, calendar)),
    }
}

fn decode_gregorian(elapsed_seconds: f64, epoch: &Epoch) -> std::result::Result<f64, String> {
    let year = i32::try_from(epoch.year).map_err(|_| format!("year {} out of range", epoch.year))?;
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(year, epoch.month, epoch.day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            format!(
                "invalid Gregorian date {}-{}-{}",
                epoch.year, epoch.month, epoch.day
            )
        })?;

    let millis = ((elapsed_seconds + epoch.seconds) * 1e3).round();
    let offset = Duration::try_milliseconds(millis as i64)
        .ok_or_else(|| format!("time offset of {} s out of range", elapsed_seconds))?;
    let moment = start
        .checked_add_signed(offset)
        .ok_or_else(|| format!("time offset of {} s out of range", elapsed_seconds))?;

    let day_seconds = f64::from(moment.num_seconds_from_midnight())
        + f64::from(moment.nanosecond()) * 1e-9;
    let elapsed_days = f64::from(moment.ordinal0()) + day_seconds / SECONDS_PER_DAY;
    let year_length = Calendar::Gregorian.days_in_year(i64::from(moment.year())) as f64;
    Ok(f64::from(moment.year()) + elapsed_days / year_length)
}

fn decode_model_calendar(elapsed_seconds: f64, epoch: &Epoch, calendar: Calendar) -> f64 {
    let day_of_year: i64 = (1..epoch.month)
        .map(|m| calendar.days_in_month(epoch.year, m))
        .sum::<i64>()
        + i64::from(epoch.day)
        - 1;
    let days = day_of_year as f64 + (epoch.seconds + elapsed_seconds) / SECONDS_PER_DAY;

    // Jump whole leap cycles, then walk the few years left in the last one.
    let (cycle_years, cycle_days) = calendar.leap_cycle();
    let cycles = days.div_euclid(cycle_days as f64);
    let mut year = epoch.year + cycles as i64 * cycle_years;
    let mut days = days - cycles * cycle_days as f64;
    loop {
        let length = calendar.days_in_year(year) as f64;
        if days < length {
            return year as f64 + days / length;
        }
        days -= length;
        year += 1;
    }
}
