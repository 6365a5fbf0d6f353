//! Ledger domain models, period calendar, amortization and grouping.

pub mod budget;
pub mod category;
pub mod period;
pub mod recurring;
pub mod transaction;
pub mod transaction_set;

pub use budget::{budget_status, net_amount, percent_of_total, total_of_kind, BudgetStatus};
pub use category::{Category, CategoryKind, CategoryLookup, UNCATEGORIZED_LABEL};
pub use period::{
    bucket_for, buckets_spanning, increment, CalendarStep, DateInterval, Period, PeriodCalendar,
};
pub use recurring::{annualized_multiplier, daily_rate, expand, expand_with_calendar, ProjectedEntry};
pub use transaction::{Recurrence, Transaction, TransactionKind};
pub use transaction_set::{
    build_transaction_set, CategoryGroup, DayGroup, IntervalGroup, PeriodGroup, TransactionSet,
    TransactionSetBuilder,
};
