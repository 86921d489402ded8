//! PCache Time Series Ticks
//!
//! Parsing of compact tick strings into fixed strides. Calendar units
//! (months, years) are recognized but rejected since their length varies.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use chrono::Duration;
use pcache_common::{PCacheError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const MILLIS_IN_SECOND: i64 = 1000;
const MILLIS_IN_MINUTE: i64 = MILLIS_IN_SECOND * 60;
const MILLIS_IN_HOUR: i64 = MILLIS_IN_MINUTE * 60;
const MILLIS_IN_DAY: i64 = MILLIS_IN_HOUR * 24;

fn tick_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]+)([smhdMy])$").expect("tick pattern compiles"))
}

// =============================================================================
// Tick
// =============================================================================

/// A fixed time stride between consecutive slots of a dense series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tick(i64);

impl Tick {
    /// Create a tick from a positive number of milliseconds.
    pub fn from_millis(millis: i64) -> Result<Self> {
        if millis <= 0 {
            return Err(PCacheError::Format(format!(
                "tick must be a positive duration, got {}ms",
                millis
            )));
        }
        Ok(Self(millis))
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::milliseconds(self.0)
    }
}

impl FromStr for Tick {
    type Err = PCacheError;

    /// Units: `s` second, `M` minute, `h` hour, `d` day. `m` (month) and
    /// `y` (year) are rejected with [`PCacheError::UnsupportedTick`].
    fn from_str(s: &str) -> Result<Self> {
        let caps = tick_pattern()
            .captures(s)
            .ok_or_else(|| PCacheError::Format(format!("invalid tick '{}'", s)))?;

        let unit = &caps[2];
        let unit_millis = match unit {
            "s" => MILLIS_IN_SECOND,
            "M" => MILLIS_IN_MINUTE,
            "h" => MILLIS_IN_HOUR,
            "d" => MILLIS_IN_DAY,
            _ => {
                return Err(PCacheError::UnsupportedTick(format!(
                    "'{}': ticks in months or years are not supported",
                    s
                )))
            }
        };

        let count: i64 = caps[1]
            .parse()
            .map_err(|_| PCacheError::Format(format!("tick count out of range in '{}'", s)))?;

        let millis = count
            .checked_mul(unit_millis)
            .ok_or_else(|| PCacheError::Format(format!("tick '{}' overflows", s)))?;

        Self::from_millis(millis)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = [
            (MILLIS_IN_DAY, "d"),
            (MILLIS_IN_HOUR, "h"),
            (MILLIS_IN_MINUTE, "M"),
            (MILLIS_IN_SECOND, "s"),
        ];
        for (size, unit) in units {
            if self.0 % size == 0 {
                return write!(f, "{}{}", self.0 / size, unit);
            }
        }
        write!(f, "{}ms", self.0)
    }
}

/// Parse a tick string and return the number of milliseconds in it.
/// `1d` is 86_400_000.
pub fn parse_tick(tick: &str) -> Result<i64> {
    tick.parse::<Tick>().map(Tick::as_millis)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_tick("45s").unwrap(), 45_000);
        assert_eq!(parse_tick("30M").unwrap(), 1_800_000);
        assert_eq!(parse_tick("2h").unwrap(), 7_200_000);
        assert_eq!(parse_tick("1d").unwrap(), 86_400_000);
    }

    #[test]
    fn test_calendar_units_unsupported() {
        assert!(matches!(
            parse_tick("1m").unwrap_err(),
            PCacheError::UnsupportedTick(_)
        ));
        assert!(matches!(
            parse_tick("1y").unwrap_err(),
            PCacheError::UnsupportedTick(_)
        ));
    }

    #[test]
    fn test_malformed_ticks() {
        for tick in ["", "s", "1", "1H", "1.5h", "-1s", " 1s", "1s ", "1ss"] {
            assert!(
                matches!(parse_tick(tick).unwrap_err(), PCacheError::Format(_)),
                "expected format error for {:?}",
                tick
            );
        }
    }

    #[test]
    fn test_zero_and_overflow() {
        assert!(matches!(parse_tick("0s").unwrap_err(), PCacheError::Format(_)));
        assert!(matches!(
            parse_tick("99999999999999999999d").unwrap_err(),
            PCacheError::Format(_)
        ));
        assert!(matches!(
            parse_tick("999999999999999d").unwrap_err(),
            PCacheError::Format(_)
        ));
    }

    #[test]
    fn test_display_and_duration() {
        let tick: Tick = "90M".parse().unwrap();
        assert_eq!(tick.to_string(), "90M");
        assert_eq!(tick.as_duration(), Duration::minutes(90));
        assert_eq!(Tick::from_millis(1500).unwrap().to_string(), "1500ms");
        assert_eq!("48h".parse::<Tick>().unwrap().to_string(), "2d");
    }
}
