//! Report-ready figures derived from a [`TransactionSet`].

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::ledger::{
    budget_status, percent_of_total, BudgetStatus, DateInterval, Period, TransactionKind,
    TransactionSet,
};

use super::ServiceResult;

/// Headline figures for a whole set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodSummary {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub savings_target: f64,
    pub budget: BudgetStatus,
}

/// One reporting bucket of a window.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodRow {
    pub interval: DateInterval,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub percent_of_total: Option<f64>,
    pub one_off_entries: usize,
    pub recurring_entries: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryRow {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub net: f64,
    pub entries: usize,
    pub percent_of_total: Option<f64>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn summarize(set: &TransactionSet) -> PeriodSummary {
        let income = set.total_by_kind(TransactionKind::Income);
        let expenses = set.total_by_kind(TransactionKind::Expense);
        PeriodSummary {
            income,
            expenses,
            net: income - expenses,
            savings_target: set.savings_target(),
            budget: budget_status(income, expenses),
        }
    }

    /// One row per `period` bucket spanning `window`, oldest first, empty
    /// buckets included. Entries dated outside the window's buckets are left
    /// out of both the rows and the percentage denominators.
    pub fn period_rows(
        set: &TransactionSet,
        window: DateInterval,
        period: Period,
    ) -> ServiceResult<Vec<PeriodRow>> {
        let calendar = set.calendar();
        let mut rows: BTreeMap<DateInterval, PeriodRow> = calendar
            .buckets_spanning(window.start, window.end, period)?
            .into_iter()
            .map(|interval| {
                (
                    interval,
                    PeriodRow {
                        interval,
                        income: 0.0,
                        expenses: 0.0,
                        net: 0.0,
                        percent_of_total: None,
                        one_off_entries: 0,
                        recurring_entries: 0,
                    },
                )
            })
            .collect();

        for entry in set.all() {
            let Some(row) = rows.get_mut(&calendar.bucket_for(entry.date, period)) else {
                continue;
            };
            match entry.kind {
                TransactionKind::Income => row.income += entry.amount,
                TransactionKind::Expense => row.expenses += entry.amount,
            }
            if entry.is_recurring() {
                row.recurring_entries += 1;
            } else {
                row.one_off_entries += 1;
            }
        }

        let total_income: f64 = rows.values().map(|row| row.income).sum();
        let total_expenses: f64 = rows.values().map(|row| row.expenses).sum();
        Ok(rows
            .into_values()
            .map(|mut row| {
                row.net = row.income - row.expenses;
                row.percent_of_total =
                    percent_of_total(row.net, Some(total_income), Some(total_expenses));
                row
            })
            .collect())
    }

    /// Category groups as rows, in the same order as
    /// [`TransactionSet::group_by_category`].
    pub fn category_rows(set: &TransactionSet) -> Vec<CategoryRow> {
        let total_income = set.total_by_kind(TransactionKind::Income);
        let total_expenses = set.total_by_kind(TransactionKind::Expense);
        set.group_by_category()
            .into_iter()
            .map(|group| CategoryRow {
                percent_of_total: percent_of_total(
                    group.net,
                    Some(total_income),
                    Some(total_expenses),
                ),
                category_id: group.category_id,
                entries: group.entries.len(),
                net: group.net,
                name: group.name,
            })
            .collect()
    }
}
