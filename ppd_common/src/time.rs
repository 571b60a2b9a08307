//! Time period values.
//!
//! Durations are written as a number followed by a unit: `"500ms"`, `"30s"`,
//! `"5min"`, `"1.5h"`, `"1d"`. Fields that are documented in minutes also
//! accept a bare integer.

use std::fmt;

use crate::config::{ConfigError, ConfigPath};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// A non-negative duration with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimePeriod {
    milliseconds: u64,
}

impl TimePeriod {
    /// Duration of `milliseconds`.
    pub const fn from_milliseconds(milliseconds: u64) -> Self {
        Self { milliseconds }
    }

    /// Duration of `minutes`.
    pub const fn from_minutes(minutes: u64) -> Self {
        Self {
            milliseconds: minutes * MS_PER_MINUTE,
        }
    }

    /// Total milliseconds.
    pub fn milliseconds(&self) -> u64 {
        self.milliseconds
    }

    /// Whole minutes, or `None` if the period is not a multiple of a minute.
    pub fn whole_minutes(&self) -> Option<u64> {
        (self.milliseconds % MS_PER_MINUTE == 0).then_some(self.milliseconds / MS_PER_MINUTE)
    }

    /// Parse a `"<number><unit>"` string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` at `path` for negative values, missing
    /// or unknown units, and values finer than one millisecond.
    pub fn parse_str(text: &str, path: &ConfigPath) -> Result<Self, ConfigError> {
        let text = text.trim();
        if text.starts_with('-') {
            return Err(ConfigError::invalid(
                path,
                format!("time period '{text}' must not be negative"),
            ));
        }

        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+'))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        if !number.is_empty() && unit.starts_with(['-', ':']) {
            return Err(ConfigError::invalid(
                path,
                format!("'{text}' is a date or time of day, not a time period"),
            ));
        }
        let value: f64 = number.parse().map_err(|_| {
            ConfigError::invalid(path, format!("'{text}' is not a valid time period"))
        })?;

        let factor = match unit.trim() {
            "ms" => 1,
            "s" | "sec" => MS_PER_SECOND,
            "min" => MS_PER_MINUTE,
            "h" => MS_PER_HOUR,
            "d" => MS_PER_DAY,
            "" if value == 0.0 => 1,
            "" => {
                return Err(ConfigError::invalid(
                    path,
                    format!("don't know what '{text}' means as it has no time unit; did you mean '{text}s'?"),
                ));
            }
            other => {
                return Err(ConfigError::invalid(
                    path,
                    format!("unknown time unit '{other}' in '{text}' (expected ms, s, min, h or d)"),
                ));
            }
        };

        let milliseconds = value * factor as f64;
        if !milliseconds.is_finite() || milliseconds >= u64::MAX as f64 {
            return Err(ConfigError::invalid(
                path,
                format!("time period '{text}' is out of range"),
            ));
        }
        if milliseconds.fract() != 0.0 {
            return Err(ConfigError::invalid(
                path,
                format!("time period '{text}' has sub-millisecond precision"),
            ));
        }
        Ok(Self::from_milliseconds(milliseconds as u64))
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.milliseconds;
        if ms == 0 {
            return write!(f, "0s");
        }
        for (factor, unit) in [
            (MS_PER_DAY, "d"),
            (MS_PER_HOUR, "h"),
            (MS_PER_MINUTE, "min"),
            (MS_PER_SECOND, "s"),
        ] {
            if ms % factor == 0 {
                return write!(f, "{}{unit}", ms / factor);
            }
        }
        write!(f, "{ms}ms")
    }
}

/// Validate a strictly positive period expressed in whole minutes.
///
/// Accepts a bare integer (minutes) or a string with a unit. Zero,
/// negative, floating point and non-whole-minute values are rejected.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` at `path`.
pub fn positive_time_period_minutes(
    value: &toml::Value,
    path: &ConfigPath,
) -> Result<u32, ConfigError> {
    let period = match value {
        toml::Value::Integer(minutes) => {
            if *minutes <= 0 {
                return Err(ConfigError::invalid(
                    path,
                    format!("time period must be positive, got {minutes}"),
                ));
            }
            if *minutes > i64::from(u32::MAX) {
                return Err(ConfigError::invalid(
                    path,
                    format!("time period of {minutes} minutes is too long"),
                ));
            }
            TimePeriod::from_minutes(*minutes as u64)
        }
        toml::Value::Datetime(datetime) => {
            return Err(ConfigError::invalid(
                path,
                format!("'{datetime}' is a date or time of day, not a time period"),
            ));
        }
        toml::Value::String(text) => TimePeriod::parse_str(text, path)?,
        toml::Value::Float(minutes) => {
            return Err(ConfigError::invalid(
                path,
                format!("time period must be a whole number of minutes, got {minutes}"),
            ));
        }
        other => {
            return Err(ConfigError::invalid(
                path,
                format!("expected a time period, got {}", other.type_str()),
            ));
        }
    };

    if period.milliseconds() == 0 {
        return Err(ConfigError::invalid(path, "time period must be positive"));
    }
    let minutes = period.whole_minutes().ok_or_else(|| {
        ConfigError::invalid(
            path,
            format!("maximum precision is minutes, '{period}' is not a whole number of minutes"),
        )
    })?;
    u32::try_from(minutes)
        .map_err(|_| ConfigError::invalid(path, format!("time period '{period}' is too long")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> ConfigPath {
        ConfigPath::root().key("update_interval")
    }

    fn minutes(value: toml::Value) -> Result<u32, ConfigError> {
        positive_time_period_minutes(&value, &path())
    }

    #[test]
    fn parse_units() {
        let cases = [
            ("500ms", 500),
            ("30s", 30_000),
            ("30 sec", 30_000),
            ("5min", 300_000),
            ("1.5h", 5_400_000),
            ("1d", 86_400_000),
            ("0", 0),
        ];
        for (text, ms) in cases {
            let period = TimePeriod::parse_str(text, &path()).unwrap();
            assert_eq!(period.milliseconds(), ms, "{text}");
        }
    }

    #[test]
    fn parse_rejects_malformed() {
        for text in ["-5min", "5", "five minutes", "5 fortnights", "0.5ms", ""] {
            assert!(TimePeriod::parse_str(text, &path()).is_err(), "{text}");
        }
    }

    #[test]
    fn display_picks_largest_unit() {
        assert_eq!(TimePeriod::from_minutes(5).to_string(), "5min");
        assert_eq!(TimePeriod::from_minutes(120).to_string(), "2h");
        assert_eq!(TimePeriod::from_milliseconds(90_000).to_string(), "90s");
        assert_eq!(TimePeriod::from_milliseconds(1_500).to_string(), "1500ms");
        assert_eq!(TimePeriod::default().to_string(), "0s");
    }

    #[test]
    fn minutes_accepts_integers_and_strings() {
        assert_eq!(minutes(toml::Value::Integer(5)).unwrap(), 5);
        assert_eq!(minutes(toml::Value::String("10min".into())).unwrap(), 10);
        assert_eq!(minutes(toml::Value::String("2h".into())).unwrap(), 120);
        assert_eq!(minutes(toml::Value::String("120s".into())).unwrap(), 2);
    }

    #[test]
    fn minutes_rejects_zero_negative_and_fractional() {
        let rejected = [
            toml::Value::Integer(0),
            toml::Value::Integer(-3),
            toml::Value::Float(1.5),
            toml::Value::String("0min".into()),
            toml::Value::String("-5min".into()),
            toml::Value::String("90s".into()),
            toml::Value::String("1.5min".into()),
            toml::Value::Boolean(true),
        ];
        for value in rejected {
            let err = minutes(value.clone()).unwrap_err();
            assert!(
                err.to_string().starts_with("update_interval:"),
                "{value:?}: {err}"
            );
        }
    }

    #[test]
    fn dates_and_times_are_not_periods() {
        let date: toml::value::Datetime = "1979-05-27".parse().unwrap();
        let err = minutes(toml::Value::Datetime(date)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "update_interval: '1979-05-27' is a date or time of day, not a time period"
        );

        for text in ["1979-05-27", "07:32:00", "1979-05-27T07:32:00Z"] {
            let err = TimePeriod::parse_str(text, &path()).unwrap_err();
            assert!(err.to_string().contains("date or time of day"), "{text}: {err}");
        }
    }

    #[test]
    fn oversized_period_is_out_of_range() {
        let err = TimePeriod::parse_str("18446744073709551616ms", &path()).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }
}
