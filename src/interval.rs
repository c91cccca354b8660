//! Release interval parsing.
//!
//! The interval is given on the command line as two four-digit years
//! separated by a hyphen, e.g. `2010-2016` or `2010-2010`. Bounds are not
//! cross-checked: `2016-2010` parses and simply never matches.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static INTERVAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{4})").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "release interval invalid: {0}. It should be a sequence of two four-digit numbers \
     separated by a hyphen, for example: 2010-2016 or 2010-2010"
)]
pub struct IntervalError(pub String);

/// Closed year range [lower, upper]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseInterval {
    pub lower: i32,
    pub upper: i32,
}

impl ReleaseInterval {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.lower <= year && year <= self.upper
    }
}

impl FromStr for ReleaseInterval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = INTERVAL_PATTERN
            .captures(s)
            .ok_or_else(|| IntervalError(s.to_string()))?;
        // Four ASCII digits always fit in an i32
        let lower = caps[1].parse().map_err(|_| IntervalError(s.to_string()))?;
        let upper = caps[2].parse().map_err(|_| IntervalError(s.to_string()))?;
        Ok(Self { lower, upper })
    }
}

impl fmt::Display for ReleaseInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:04}", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_interval() {
        assert_eq!("2010-2016".parse::<ReleaseInterval>(), Ok(ReleaseInterval::new(2010, 2016)));
        assert_eq!("2010-2010".parse::<ReleaseInterval>(), Ok(ReleaseInterval::new(2010, 2010)));
    }

    #[test]
    fn test_parse_invalid_interval() {
        let err = "abc".parse::<ReleaseInterval>().unwrap_err();
        assert_eq!(err, IntervalError("abc".to_string()));
        assert!(err.to_string().contains("release interval invalid: abc"));
        assert!("201-2016".parse::<ReleaseInterval>().is_err());
        assert!("2010/2016".parse::<ReleaseInterval>().is_err());
        assert!("".parse::<ReleaseInterval>().is_err());
    }

    #[test]
    fn test_reversed_bounds_are_accepted_but_empty() {
        let interval: ReleaseInterval = "2016-2010".parse().unwrap();
        assert_eq!(interval, ReleaseInterval::new(2016, 2010));
        assert!((2000..2030).all(|year| !interval.contains(year)));
    }

    #[test]
    fn test_contains_is_closed() {
        let interval = ReleaseInterval::new(2010, 2016);
        assert!(interval.contains(2010));
        assert!(interval.contains(2016));
        assert!(!interval.contains(2009));
        assert!(!interval.contains(2017));
    }

    #[test]
    fn test_display() {
        assert_eq!(ReleaseInterval::new(2010, 2016).to_string(), "2010-2016");
    }
}
