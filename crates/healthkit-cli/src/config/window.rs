//! Inclusive analysis window shared by all three normalizers

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{HealthError, Result};

/// Inclusive date range every normalized table is restricted to.
///
/// Timestamps are compared against the bounds at midnight, so a reading
/// taken during the morning of `end` falls outside the window while a
/// calendar date equal to `end` falls inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting an inverted range
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(HealthError::invalid_param(format!(
                "window start {} is after window end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether a calendar date lies in the window
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether a timestamp lies between the start and end bounds at midnight
    pub fn contains_timestamp(&self, ts: NaiveDateTime) -> bool {
        let date = ts.date();
        if date < self.start || date > self.end {
            return false;
        }
        date < self.end || ts.time() == NaiveTime::default()
    }
}

/// Parse a YYYY-MM-DD command line argument
pub fn parse_date_arg(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| HealthError::InvalidDateFormat(value.to_string()))
}
