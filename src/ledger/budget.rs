use serde::{Deserialize, Serialize};

use super::{recurring::ProjectedEntry, transaction::TransactionKind};

/// How much of an income figure a matching expense figure consumes.
///
/// Percentages are fractions: `1.0` means 100%.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BudgetStatus {
    pub under_budget: bool,
    pub percent_of_income_used: f64,
    pub percent_remaining: f64,
    pub percent_over: f64,
}

/// Income minus expense over the given entries.
pub fn net_amount<'a>(entries: impl IntoIterator<Item = &'a ProjectedEntry>) -> f64 {
    entries.into_iter().map(ProjectedEntry::signed_amount).sum()
}

/// Sum of amounts of one kind. Always non-negative for valid entries.
pub fn total_of_kind<'a>(
    entries: impl IntoIterator<Item = &'a ProjectedEntry>,
    kind: TransactionKind,
) -> f64 {
    entries
        .into_iter()
        .filter(|entry| entry.kind == kind)
        .map(|entry| entry.amount)
        .sum()
}

/// Budget usage for an income and expense pair.
///
/// With no income nothing counts as used. With income but no expenses the
/// usage reads as a full 100% and the budget is not reported as under.
pub fn budget_status(income: f64, expenses: f64) -> BudgetStatus {
    let percent_of_income_used = if income <= 0.0 {
        0.0
    } else if expenses <= 0.0 {
        1.0
    } else {
        expenses / income
    };
    let under_budget = income > 0.0 && percent_of_income_used < 1.0;
    let percent_remaining = if under_budget {
        (1.0 - percent_of_income_used).max(0.0)
    } else {
        0.0
    };
    BudgetStatus {
        under_budget,
        percent_of_income_used,
        percent_remaining,
        percent_over: (percent_of_income_used - 1.0).max(0.0),
    }
}

/// Share of the matching total a section's net represents, if one applies.
///
/// Positive sections are measured against income, negative ones against
/// expenses. A zero net, or a missing or zero denominator, yields `None`.
pub fn percent_of_total(
    section_net: f64,
    total_income: Option<f64>,
    total_expenses: Option<f64>,
) -> Option<f64> {
    let denominator = if section_net > 0.0 {
        total_income?
    } else if section_net < 0.0 {
        total_expenses?
    } else {
        return None;
    };
    if denominator == 0.0 {
        return None;
    }
    Some((section_net / denominator).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_without_expenses_reads_as_fully_used() {
        let status = budget_status(100.0, 0.0);
        assert_eq!(status.percent_of_income_used, 1.0);
        assert!(!status.under_budget);
        assert_eq!(status.percent_remaining, 0.0);
        assert_eq!(status.percent_over, 0.0);
    }

    #[test]
    fn partial_spend_is_under_budget() {
        let status = budget_status(200.0, 50.0);
        assert!(status.under_budget);
        assert!((status.percent_of_income_used - 0.25).abs() < 1e-12);
        assert!((status.percent_remaining - 0.75).abs() < 1e-12);
        assert_eq!(status.percent_over, 0.0);
    }

    #[test]
    fn overspend_reports_percent_over() {
        let status = budget_status(100.0, 150.0);
        assert!(!status.under_budget);
        assert!((status.percent_over - 0.5).abs() < 1e-12);
        assert_eq!(status.percent_remaining, 0.0);
    }

    #[test]
    fn no_income_uses_nothing() {
        let status = budget_status(0.0, 80.0);
        assert_eq!(status.percent_of_income_used, 0.0);
        assert!(!status.under_budget);
        assert_eq!(status.percent_over, 0.0);
    }

    #[test]
    fn percent_of_total_picks_denominator_by_sign() {
        assert_eq!(percent_of_total(25.0, Some(100.0), Some(50.0)), Some(0.25));
        assert_eq!(percent_of_total(-25.0, Some(100.0), Some(50.0)), Some(0.5));
        assert_eq!(percent_of_total(25.0, None, Some(50.0)), None);
        assert_eq!(percent_of_total(-25.0, Some(100.0), None), None);
        assert_eq!(percent_of_total(0.0, Some(100.0), Some(50.0)), None);
    }

    #[test]
    fn empty_input_nets_to_zero() {
        assert_eq!(net_amount(std::iter::empty()), 0.0);
    }
}
