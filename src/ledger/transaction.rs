use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ProjectionError, ProjectionResult};

/// Direction of a cash flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    /// Sign applied when folding amounts into a net figure.
    pub fn sign(&self) -> f64 {
        match self {
            TransactionKind::Expense => -1.0,
            TransactionKind::Income => 1.0,
        }
    }
}

/// Native repeat cadence of a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Fortnightly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

/// Source record handed over by the external store. Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub kind: TransactionKind,
    #[serde(default)]
    pub label: String,
    pub date: NaiveDateTime,
    /// Last instant a recurrence may contribute to. Ignored for one-off records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    /// Fraction of income set aside; only meaningful for income.
    #[serde(default)]
    pub savings_rate: f64,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        label: impl Into<String>,
        amount: f64,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            kind,
            label: label.into(),
            date,
            end_date: None,
            recurrence: Recurrence::None,
            category_id: None,
            savings_rate: 0.0,
        }
    }

    pub fn expense(label: impl Into<String>, amount: f64, date: NaiveDateTime) -> Self {
        Self::new(TransactionKind::Expense, label, amount, date)
    }

    pub fn income(label: impl Into<String>, amount: f64, date: NaiveDateTime) -> Self {
        Self::new(TransactionKind::Income, label, amount, date)
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDateTime) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_savings_rate(mut self, savings_rate: f64) -> Self {
        self.savings_rate = savings_rate;
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    pub fn validate(&self) -> ProjectionResult<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ProjectionError::PreconditionViolation(format!(
                "transaction {} has invalid amount {}",
                self.id, self.amount
            )));
        }
        if !(0.0..=1.0).contains(&self.savings_rate) {
            return Err(ProjectionError::PreconditionViolation(format!(
                "transaction {} has savings rate {} outside [0, 1]",
                self.id, self.savings_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn negative_amount_is_rejected() {
        let txn = Transaction::expense("Refund?", -5.0, noon());
        assert!(matches!(
            txn.validate(),
            Err(ProjectionError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn savings_rate_must_be_a_fraction() {
        let txn = Transaction::income("Salary", 100.0, noon()).with_savings_rate(1.5);
        assert!(txn.validate().is_err());
        let ok = Transaction::income("Salary", 100.0, noon()).with_savings_rate(0.2);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn snapshot_json_uses_snake_case_and_defaults() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "amount": 12.5,
            "kind": "expense",
            "date": "2024-01-01T00:00:00",
            "recurrence": "fortnightly"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.recurrence, Recurrence::Fortnightly);
        assert_eq!(txn.kind, TransactionKind::Expense);
        assert!(txn.label.is_empty());
        assert_eq!(txn.end_date, None);
        assert_eq!(txn.savings_rate, 0.0);
    }
}
