use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{ProjectionError, ProjectionResult};

/// Reporting granularities supported by the calendar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Fortnight,
    Month,
    Quarter,
    Year,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Day,
        Period::Week,
        Period::Fortnight,
        Period::Month,
        Period::Quarter,
        Period::Year,
    ];

    /// Step between the start of one bucket and the start of the next.
    pub fn increment(&self) -> CalendarStep {
        match self {
            Period::Day => CalendarStep::Days(1),
            Period::Week => CalendarStep::Days(7),
            Period::Fortnight => CalendarStep::Days(14),
            Period::Month => CalendarStep::Months(1),
            Period::Quarter => CalendarStep::Months(3),
            Period::Year => CalendarStep::Months(12),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Day => "Daily",
            Period::Week => "Weekly",
            Period::Fortnight => "Fortnightly",
            Period::Month => "Monthly",
            Period::Quarter => "Quarterly",
            Period::Year => "Yearly",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Fortnight => "fortnight",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Period {
    type Err = ProjectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        Period::ALL
            .iter()
            .copied()
            .find(|period| period.name() == needle || period.label().eq_ignore_ascii_case(&needle))
            .ok_or_else(|| ProjectionError::PreconditionViolation(format!("unknown period `{value}`")))
    }
}

/// Calendar increment between consecutive bucket starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarStep {
    Days(i64),
    Months(u32),
}

impl CalendarStep {
    /// Next bucket start, saturating at the last representable date.
    pub fn advance(&self, from: NaiveDate) -> NaiveDate {
        self.checked_advance(from).unwrap_or(NaiveDate::MAX)
    }

    /// Next bucket start, or `None` past the end of the calendar.
    pub fn checked_advance(&self, from: NaiveDate) -> Option<NaiveDate> {
        match *self {
            CalendarStep::Days(days) => from.checked_add_signed(Duration::days(days)),
            CalendarStep::Months(months) => shift_month(from, months as i32),
        }
    }
}

/// Closed `[start, end]` range of instants.
///
/// Deserialized intervals go through [`DateInterval::new`], so an inverted
/// range never arrives from a snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawDateInterval")]
pub struct DateInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawDateInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawDateInterval> for DateInterval {
    type Error = ProjectionError;

    fn try_from(raw: RawDateInterval) -> Result<Self, Self::Error> {
        DateInterval::new(raw.start, raw.end)
    }
}

impl DateInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> ProjectionResult<Self> {
        if start > end {
            tracing::warn!(%start, %end, "rejected date interval with start after end");
            return Err(ProjectionError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Re-checks an interval assembled field by field.
    pub fn validate(&self) -> ProjectionResult<()> {
        Self::new(self.start, self.end).map(|_| ())
    }

    /// Interval covering whole calendar days, from `first` at midnight to the last second of `last`.
    pub fn from_dates(first: NaiveDate, last: NaiveDate) -> ProjectionResult<Self> {
        Self::new(first.and_time(NaiveTime::MIN), end_of_day(last))
    }

    pub fn intersect(&self, other: &DateInterval) -> Option<DateInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateInterval { start, end })
    }

    /// Number of calendar days touched by the interval, counting both ends.
    pub fn inclusive_days(&self) -> i64 {
        (self.end.date() - self.start.date()).num_days() + 1
    }
}

/// Bucket arithmetic parameterised by the first day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCalendar {
    pub week_start: Weekday,
}

impl Default for PeriodCalendar {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
        }
    }
}

impl PeriodCalendar {
    pub fn new(week_start: Weekday) -> Self {
        Self { week_start }
    }

    /// First day of the bucket that contains `date`.
    pub fn bucket_start(&self, date: NaiveDate, period: Period) -> NaiveDate {
        match period {
            Period::Day => date,
            Period::Week => date
                .checked_sub_signed(Duration::days(days_since(date.weekday(), self.week_start)))
                .unwrap_or(NaiveDate::MIN),
            Period::Fortnight => cycle_start_linear(self.fortnight_origin(), date, 14),
            Period::Month => first_of_month(date.year(), date.month()),
            Period::Quarter => first_of_month(date.year(), (date.month0() / 3) * 3 + 1),
            Period::Year => first_of_month(date.year(), 1),
        }
    }

    pub fn bucket_for(&self, instant: NaiveDateTime, period: Period) -> DateInterval {
        let start = self.bucket_start(instant.date(), period);
        bucket_between(start, period.increment().checked_advance(start))
    }

    /// Every bucket touching `[start, end]`, ascending and contiguous.
    pub fn buckets_spanning(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        period: Period,
    ) -> ProjectionResult<Vec<DateInterval>> {
        let range = DateInterval::new(start, end)?;
        let step = period.increment();
        let last_day = range.end.date();
        let mut cursor = self.bucket_start(range.start.date(), period);
        let mut buckets = Vec::new();
        while cursor <= last_day {
            let next = step.checked_advance(cursor);
            buckets.push(bucket_between(cursor, next));
            match next {
                Some(next) => cursor = next,
                None => break,
            }
        }
        Ok(buckets)
    }

    fn fortnight_origin(&self) -> NaiveDate {
        let base = first_of_month(2001, 1);
        let offset = days_since(self.week_start, base.weekday());
        base + Duration::days(offset)
    }
}

pub fn bucket_for(instant: NaiveDateTime, period: Period) -> DateInterval {
    PeriodCalendar::default().bucket_for(instant, period)
}

pub fn increment(period: Period) -> CalendarStep {
    period.increment()
}

pub fn buckets_spanning(
    start: NaiveDateTime,
    end: NaiveDateTime,
    period: Period,
) -> ProjectionResult<Vec<DateInterval>> {
    PeriodCalendar::default().buckets_spanning(start, end, period)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::seconds(86_399)
}

/// Bucket from `start` up to one second before `next`. A missing `next`
/// means the step ran off the calendar, so the bucket ends on its last day.
fn bucket_between(start: NaiveDate, next: Option<NaiveDate>) -> DateInterval {
    let end = match next.and_then(|next| next.pred_opt()) {
        Some(last_day) => end_of_day(last_day),
        None => end_of_day(NaiveDate::MAX),
    };
    DateInterval {
        start: start.and_time(NaiveTime::MIN),
        end,
    }
}

fn days_since(day: Weekday, origin: Weekday) -> i64 {
    ((day.num_days_from_monday() + 7 - origin.num_days_from_monday()) % 7) as i64
}

fn cycle_start_linear(anchor: NaiveDate, reference: NaiveDate, interval_days: i64) -> NaiveDate {
    let diff = reference - anchor;
    let steps = diff.num_days().div_euclid(interval_days);
    anchor
        .checked_add_signed(Duration::days(steps * interval_days))
        .unwrap_or(NaiveDate::MIN)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("first day of a month is always a valid date")
}

/// Same day `months` later, clamped to the month length. `None` once the
/// target month lies outside chrono's range.
fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.with_day(date.day().min(days_in_month(first)))
}

fn days_in_month(first: NaiveDate) -> u32 {
    if first.month() == 12 {
        return 31;
    }
    first_of_month(first.year(), first.month() + 1)
        .pred_opt()
        .map_or(28, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn day_bucket_spans_midnight_to_last_second() {
        let bucket = bucket_for(at(2024, 3, 1, 15, 30, 0), Period::Day);
        assert_eq!(bucket.start, at(2024, 3, 1, 0, 0, 0));
        assert_eq!(bucket.end, at(2024, 3, 1, 23, 59, 59));
    }

    #[test]
    fn week_bucket_starts_on_configured_weekday() {
        // 2024-03-06 is a Wednesday.
        let instant = at(2024, 3, 6, 9, 0, 0);
        let monday = bucket_for(instant, Period::Week);
        assert_eq!(monday.start, at(2024, 3, 4, 0, 0, 0));
        assert_eq!(monday.end, at(2024, 3, 10, 23, 59, 59));

        let sunday = PeriodCalendar::new(Weekday::Sun).bucket_for(instant, Period::Week);
        assert_eq!(sunday.start, at(2024, 3, 3, 0, 0, 0));
    }

    #[test]
    fn fortnight_buckets_are_stable_fourteen_day_blocks() {
        let first = bucket_for(at(2024, 1, 10, 0, 0, 0), Period::Fortnight);
        let again = bucket_for(at(2024, 1, 10, 0, 0, 0), Period::Fortnight);
        assert_eq!(first, again);
        assert_eq!(first.inclusive_days(), 14);
        assert_eq!(first.start.weekday(), Weekday::Mon);
        let next = bucket_for(first.end + Duration::seconds(1), Period::Fortnight);
        assert_eq!(next.start, first.end + Duration::seconds(1));
    }

    #[test]
    fn quarter_and_year_follow_calendar_boundaries() {
        let quarter = bucket_for(at(2024, 5, 17, 0, 0, 0), Period::Quarter);
        assert_eq!(quarter.start, at(2024, 4, 1, 0, 0, 0));
        assert_eq!(quarter.end, at(2024, 6, 30, 23, 59, 59));

        let year = bucket_for(at(2024, 5, 17, 0, 0, 0), Period::Year);
        assert_eq!(year.start, at(2024, 1, 1, 0, 0, 0));
        assert_eq!(year.end, at(2024, 12, 31, 23, 59, 59));
    }

    #[test]
    fn month_bucket_handles_leap_february() {
        let bucket = bucket_for(at(2024, 2, 29, 12, 0, 0), Period::Month);
        assert_eq!(bucket.start, at(2024, 2, 1, 0, 0, 0));
        assert_eq!(bucket.end, at(2024, 2, 29, 23, 59, 59));
        assert_eq!(bucket.inclusive_days(), 29);
    }

    #[test]
    fn spanning_zero_length_range_yields_single_bucket() {
        let instant = at(2024, 3, 1, 0, 0, 0);
        let buckets = buckets_spanning(instant, instant, Period::Day).unwrap();
        assert_eq!(
            buckets,
            vec![DateInterval {
                start: at(2024, 3, 1, 0, 0, 0),
                end: at(2024, 3, 1, 23, 59, 59),
            }]
        );
    }

    #[test]
    fn spanning_is_contiguous_and_ascending() {
        let buckets =
            buckets_spanning(at(2024, 1, 15, 0, 0, 0), at(2024, 4, 2, 0, 0, 0), Period::Month)
                .unwrap();
        assert_eq!(buckets.len(), 4);
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end + Duration::seconds(1), pair[1].start);
        }
    }

    #[test]
    fn spanning_rejects_inverted_range() {
        let err = buckets_spanning(at(2024, 2, 1, 0, 0, 0), at(2024, 1, 1, 0, 0, 0), Period::Day)
            .expect_err("inverted range");
        assert!(matches!(err, ProjectionError::InvalidRange { .. }));
    }

    #[test]
    fn increments_match_period_rules() {
        assert_eq!(increment(Period::Fortnight), CalendarStep::Days(14));
        assert_eq!(increment(Period::Quarter), CalendarStep::Months(3));
        let jan31 = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(
            CalendarStep::Months(1).advance(jan31),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn buckets_at_the_end_of_the_calendar_saturate() {
        let last = NaiveDate::MAX.and_time(NaiveTime::MIN);
        for period in Period::ALL {
            let bucket = bucket_for(last, period);
            assert!(bucket.start <= last, "{period}");
            assert_eq!(bucket.end, end_of_day(NaiveDate::MAX), "{period}");
        }

        let tail = buckets_spanning(last - Duration::days(40), last, Period::Month).unwrap();
        assert_eq!(tail.last().map(|bucket| bucket.end), Some(end_of_day(NaiveDate::MAX)));
        for pair in tail.windows(2) {
            assert_eq!(pair[0].end + Duration::seconds(1), pair[1].start);
        }
    }

    #[test]
    fn deserializing_inverted_interval_fails() {
        let json = r#"{"start":"2024-02-01T00:00:00","end":"2024-01-01T00:00:00"}"#;
        let err = serde_json::from_str::<DateInterval>(json).expect_err("inverted interval");
        assert!(err.to_string().contains("2024-02-01"));

        let ok = r#"{"start":"2024-01-01T00:00:00","end":"2024-02-01T00:00:00"}"#;
        let interval: DateInterval = serde_json::from_str(ok).unwrap();
        assert_eq!(interval.inclusive_days(), 32);
    }

    #[test]
    fn period_parses_names_and_labels() {
        assert_eq!("quarter".parse::<Period>().unwrap(), Period::Quarter);
        assert_eq!("Weekly".parse::<Period>().unwrap(), Period::Week);
        assert!("decade".parse::<Period>().is_err());
    }
}
