use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A calendar date. The game has no leap years, so every year is 365 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Date {
    pub year: i32,
    pub month: u8, // 1-12
    pub day: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid date '{0}', expected YEAR.MONTH.DAY")]
pub struct DateParseError(pub String);

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    fn days_in_month(month: u8) -> u32 {
        DAYS_IN_MONTH[(month.clamp(1, 12) - 1) as usize]
    }

    pub fn add_days(&self, days: u32) -> Self {
        let mut y = self.year + (days / 365) as i32;
        let mut m = self.month;
        let mut d = self.day as u32 + days % 365;

        while d > Self::days_in_month(m) {
            d -= Self::days_in_month(m);
            m += 1;
            if m > 12 {
                m = 1;
                y += 1;
            }
        }

        Self {
            year: y,
            month: m,
            day: d as u8,
        }
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::new(1936, 1, 1)
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DateParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let (Some(y), Some(m), Some(d), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u8 = m.parse().map_err(|_| err())?;
        let day: u8 = d.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) || day == 0 || day as u32 > Self::days_in_month(month) {
            return Err(err());
        }
        Ok(Self::new(year, month, day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_days() {
        let start = Date::new(1936, 1, 1);
        assert_eq!(start.add_days(0), start);
        assert_eq!(start.add_days(31), Date::new(1936, 2, 1));
        assert_eq!(start.add_days(59), Date::new(1936, 3, 1));
        assert_eq!(start.add_days(364), Date::new(1936, 12, 31));
        assert_eq!(start.add_days(365), Date::new(1937, 1, 1));
        assert_eq!(Date::new(1939, 12, 31).add_days(1), Date::new(1940, 1, 1));
        // no leap years
        assert_eq!(Date::new(1940, 2, 28).add_days(1), Date::new(1940, 3, 1));
    }

    #[test]
    fn test_parse_and_display() {
        let date: Date = "1936.1.1".parse().unwrap();
        assert_eq!(date, Date::default());
        assert_eq!(date.add_days(1000).to_string(), "1938.9.28");
        assert!("1936.2.30".parse::<Date>().is_err());
        assert!("1936.13.1".parse::<Date>().is_err());
        assert!("1936-01-01".parse::<Date>().is_err());
        assert!("1936.1.1.1".parse::<Date>().is_err());
    }
}
