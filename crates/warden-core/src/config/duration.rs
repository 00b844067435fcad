//! Conversion of configured integer durations.

use chrono::TimeDelta;

use crate::error::AppError;

/// Longest duration any setting may express, in days.
pub const MAX_CONFIGURED_DAYS: i64 = 36_500;

/// Unit of a configured duration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Days.
    Days,
}

/// Converts `value` of `unit` for the setting `field`.
///
/// Values that do not fit in [`MAX_CONFIGURED_DAYS`] are a configuration
/// error, so no TTL arithmetic downstream can overflow.
pub fn bounded(field: &str, value: u64, unit: DurationUnit) -> Result<TimeDelta, AppError> {
    let delta = i64::try_from(value).ok().and_then(|v| match unit {
        DurationUnit::Seconds => TimeDelta::try_seconds(v),
        DurationUnit::Minutes => TimeDelta::try_minutes(v),
        DurationUnit::Days => TimeDelta::try_days(v),
    });
    let max = TimeDelta::try_days(MAX_CONFIGURED_DAYS);

    match (delta, max) {
        (Some(d), Some(max)) if d <= max => Ok(d),
        _ => Err(AppError::configuration(format!(
            "{field} is out of range: {value} exceeds {MAX_CONFIGURED_DAYS} days"
        ))),
    }
}

/// Like [`bounded`], but zero is also rejected.
pub fn positive(field: &str, value: u64, unit: DurationUnit) -> Result<TimeDelta, AppError> {
    if value == 0 {
        return Err(AppError::configuration(format!("{field} must be positive")));
    }
    bounded(field, value, unit)
}
