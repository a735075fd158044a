use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{ReopenError, ReopenResult};

/// A calendar month in `YYYY-MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Parse a strict `YYYY-MM` string (four digits, dash, two digits, month 01-12).
    pub fn parse(s: &str) -> ReopenResult<Self> {
        let bad = || ReopenError::Config(format!("bad month format '{s}', use YYYY-MM"));

        let (y, m) = s.split_once('-').ok_or_else(bad)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(bad());
        }
        if !y.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let year: i32 = y.parse().map_err(|_| bad())?;
        let month: u32 = m.parse().map_err(|_| bad())?;
        if !(1..=12).contains(&month) {
            return Err(bad());
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // Month is validated at parse time, so this cannot be out of range.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| unreachable!("validated month"))
    }

    /// Last day of the month, leap-aware.
    pub fn last_day(&self) -> NaiveDate {
        let (ny, nm) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let next_first = NaiveDate::from_ymd_opt(ny, nm, 1)
            .unwrap_or_else(|| unreachable!("validated month"));
        next_first - Duration::days(1)
    }

    /// True when `date` falls inside this calendar month exactly.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
