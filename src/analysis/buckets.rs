//! Calendar bucket keys used to group volume records.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::mem::replace;

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    pub fn succ(self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Months elapsed since year zero.
    pub fn ordinal(self) -> i64 {
        self.year as i64 * 12 + self.month as i64
    }

    /// Inclusive number of months from `start` to `end`, zero if reversed.
    pub fn span(start: MonthKey, end: MonthKey) -> usize {
        let diff = end.ordinal() - start.ordinal() + 1;
        diff.max(0) as usize
    }

    pub fn quarter(self) -> QuarterKey {
        QuarterKey {
            year: self.year,
            quarter: (self.month + 2) / 3,
        }
    }

    pub fn semester(self) -> SemesterKey {
        SemesterKey {
            year: self.year,
            semester: if self.month <= 6 { 1 } else { 2 },
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Every month from `.0` to `.1`, both ends included.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct MonthRange(pub MonthKey, pub MonthKey);

impl Iterator for MonthRange {
    type Item = MonthKey;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0.succ();
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = MonthKey::span(self.0, self.1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonthRange {}

/// A calendar quarter (`YYYY-Qn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterKey {
    pub year: i32,
    pub quarter: u32,
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-Q{}", self.year, self.quarter)
    }
}

/// A half year (`YYYY-Sn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemesterKey {
    pub year: i32,
    pub semester: u32,
}

impl fmt::Display for SemesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-S{}", self.year, self.semester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> MonthKey {
        MonthKey { year, month }
    }

    #[test]
    fn test_month_key_display_is_zero_padded() {
        assert_eq!(month(2024, 3).to_string(), "2024-03");
        assert_eq!(month(987, 11).to_string(), "0987-11");
    }

    #[test]
    fn test_succ_rolls_over_december() {
        assert_eq!(month(2023, 12).succ(), month(2024, 1));
        assert_eq!(month(2024, 1).succ(), month(2024, 2));
    }

    #[test]
    fn test_from_date_floors_to_month() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(MonthKey::from_date(date), month(2024, 2));
    }

    #[test]
    fn test_month_range_across_years() {
        let months: Vec<String> = MonthRange(month(2023, 11), month(2024, 2))
            .map(|m| m.to_string())
            .collect();

        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_month_range_length_matches_span() {
        let start = month(2022, 5);
        let end = month(2024, 8);
        let expected = ((2024 * 12 + 8) - (2022 * 12 + 5) + 1) as usize;

        assert_eq!(MonthRange(start, end).count(), expected);
        assert_eq!(MonthRange(start, end).len(), expected);
        assert_eq!(MonthKey::span(start, end), expected);
    }

    #[test]
    fn test_month_range_single_and_reversed() {
        assert_eq!(MonthRange(month(2024, 6), month(2024, 6)).count(), 1);
        assert_eq!(MonthRange(month(2024, 7), month(2024, 6)).count(), 0);
        assert_eq!(MonthKey::span(month(2024, 7), month(2024, 6)), 0);
    }

    #[test]
    fn test_quarter_and_semester_keys() {
        let quarters: Vec<u32> = (1..=12).map(|m| month(2024, m).quarter().quarter).collect();
        assert_eq!(quarters, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);

        assert_eq!(month(2024, 6).semester().to_string(), "2024-S1");
        assert_eq!(month(2024, 7).semester().to_string(), "2024-S2");
        assert_eq!(month(2024, 9).quarter().to_string(), "2024-Q3");
    }

    #[test]
    fn test_key_order_matches_string_order() {
        let mut keys = vec![
            month(2024, 1).quarter(),
            month(2023, 12).quarter(),
            month(2024, 5).quarter(),
        ];
        keys.sort();
        let as_strings: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        let mut sorted_strings = as_strings.clone();
        sorted_strings.sort();
        assert_eq!(as_strings, sorted_strings);
    }
}
