#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use tally_core::ledger::DateInterval;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).expect("valid time")
}

pub fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    at(y, m, d, 0, 0, 0)
}

/// Whole-day window from `first` to `last`, both inclusive.
pub fn window(first: NaiveDate, last: NaiveDate) -> DateInterval {
    DateInterval::from_dates(first, last).expect("valid window")
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
