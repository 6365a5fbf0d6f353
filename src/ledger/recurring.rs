//! Amortization of recurring transactions into reporting-period buckets.
//!
//! A recurrence is native to its own cadence (weekly rent, quarterly
//! insurance) while reports are requested in an arbitrary [`Period`]. Each
//! recurring transaction is reduced to a per-day rate and re-aggregated over
//! the calendar days of every bucket it is active in, so totals agree no
//! matter which reporting period is chosen.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    period::{DateInterval, Period, PeriodCalendar},
    transaction::{Recurrence, Transaction, TransactionKind},
};
use crate::errors::{ProjectionError, ProjectionResult};

const DAYS_PER_YEAR: f64 = 365.25;
const WEEKS_PER_YEAR: f64 = 52.1786;
const FORTNIGHTS_PER_YEAR: f64 = 26.0893;

/// A derived occurrence: either a one-off transaction wrapped 1:1 or one
/// bucket of an amortized recurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectedEntry {
    pub id: Uuid,
    /// Originating transaction. Read-only back-reference.
    pub parent_id: Uuid,
    pub amount: f64,
    pub kind: TransactionKind,
    pub label: String,
    pub date: NaiveDateTime,
    pub category_id: Option<Uuid>,
    pub savings_rate: f64,
    pub recurrence: Recurrence,
}

impl ProjectedEntry {
    pub fn from_one_off(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id,
            parent_id: transaction.id,
            amount: transaction.amount,
            kind: transaction.kind,
            label: transaction.label.clone(),
            date: transaction.date,
            category_id: transaction.category_id,
            savings_rate: transaction.savings_rate,
            recurrence: Recurrence::None,
        }
    }

    /// Amount with income positive and expense negative.
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }
}

/// Occurrences per day of a cadence, relative to a 365.25-day year.
pub fn annualized_multiplier(recurrence: Recurrence) -> ProjectionResult<f64> {
    let per_year = match recurrence {
        Recurrence::None => {
            return Err(ProjectionError::PreconditionViolation(
                "a non-recurring transaction has no annualized multiplier".into(),
            ))
        }
        Recurrence::Daily => return Ok(1.0),
        Recurrence::Weekly => WEEKS_PER_YEAR,
        Recurrence::Fortnightly => FORTNIGHTS_PER_YEAR,
        Recurrence::Monthly => 12.0,
        // Preserved as published: three occurrences per year, not four.
        Recurrence::Quarterly => 3.0,
        Recurrence::Yearly => 1.0,
    };
    Ok(per_year / DAYS_PER_YEAR)
}

/// Per-day contribution of a recurring transaction.
pub fn daily_rate(transaction: &Transaction) -> ProjectionResult<f64> {
    Ok(transaction.amount * annualized_multiplier(transaction.recurrence)?)
}

/// Expands a recurring transaction into one entry per `period` bucket using
/// the default calendar. See [`expand_with_calendar`].
pub fn expand(
    transaction: &Transaction,
    period: Period,
    window: Option<DateInterval>,
    now: NaiveDateTime,
) -> ProjectionResult<Vec<ProjectedEntry>> {
    expand_with_calendar(&PeriodCalendar::default(), transaction, period, window, now)
}

/// Expands a recurring transaction into period-bucketed entries.
///
/// The active range runs from `max(date, window.start)` to
/// `min(end_date, window.end ?? now)`. Each bucket touching that range yields
/// one entry dated at the bucket start whose amount is the daily rate times
/// the calendar days of the bucket that fall inside the active range.
pub fn expand_with_calendar(
    calendar: &PeriodCalendar,
    transaction: &Transaction,
    period: Period,
    window: Option<DateInterval>,
    now: NaiveDateTime,
) -> ProjectionResult<Vec<ProjectedEntry>> {
    if !transaction.is_recurring() {
        tracing::warn!(transaction_id = %transaction.id, "expansion requested for a one-off transaction");
        return Err(ProjectionError::PreconditionViolation(format!(
            "transaction {} does not recur and must be wrapped directly",
            transaction.id
        )));
    }
    transaction.validate()?;
    if let Some(window) = window {
        window.validate()?;
    }

    let query_end = window.map(|w| w.end).unwrap_or(now);
    let effective_end = transaction
        .end_date
        .map_or(query_end, |end| end.min(query_end));
    let effective_start = window.map_or(transaction.date, |w| w.start.max(transaction.date));
    if effective_start > effective_end {
        return Ok(Vec::new());
    }

    let active = DateInterval {
        start: effective_start,
        end: effective_end,
    };
    let daily = daily_rate(transaction)?;
    let entries: Vec<ProjectedEntry> = calendar
        .buckets_spanning(effective_start, effective_end, period)?
        .into_iter()
        .filter_map(|bucket| {
            let overlap = bucket.intersect(&active)?;
            Some(ProjectedEntry {
                id: occurrence_id(transaction.id, bucket.start),
                parent_id: transaction.id,
                amount: daily * overlap.inclusive_days() as f64,
                kind: transaction.kind,
                label: transaction.label.clone(),
                date: bucket.start,
                category_id: transaction.category_id,
                savings_rate: transaction.savings_rate,
                recurrence: transaction.recurrence,
            })
        })
        .collect();

    tracing::debug!(
        transaction_id = %transaction.id,
        %period,
        entries = entries.len(),
        "expanded recurring transaction"
    );
    Ok(entries)
}

fn occurrence_id(parent: Uuid, bucket_start: NaiveDateTime) -> Uuid {
    let key = bucket_start.format("%Y-%m-%dT%H:%M:%S").to_string();
    Uuid::new_v5(&parent, key.as_bytes())
}
