use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::{
    budget::{net_amount, total_of_kind},
    category::CategoryLookup,
    period::{DateInterval, Period, PeriodCalendar},
    recurring::{expand_with_calendar, ProjectedEntry},
    transaction::{Transaction, TransactionKind},
};
use crate::{
    config::EngineConfig,
    errors::ProjectionResult,
    time::{Clock, SystemClock},
};

/// Entries sharing a calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub entries: Vec<ProjectedEntry>,
}

/// Entries sharing a period bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalGroup {
    pub interval: DateInterval,
    pub entries: Vec<ProjectedEntry>,
}

/// A period bucket whose entries keep the one-off / recurring split.
#[derive(Debug, Clone)]
pub struct PeriodGroup {
    pub interval: DateInterval,
    pub set: TransactionSet,
}

/// Entries sharing a category. `category_id` is `None` for the uncategorized bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub entries: Vec<ProjectedEntry>,
    pub net: f64,
}

impl CategoryGroup {
    pub fn is_uncategorized(&self) -> bool {
        self.category_id.is_none()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|entry| entry.amount).sum()
    }
}

/// Unified view over wrapped one-off and amortized recurring entries.
#[derive(Debug, Clone)]
pub struct TransactionSet {
    one_off: Vec<ProjectedEntry>,
    recurring: Vec<ProjectedEntry>,
    categories: Arc<CategoryLookup>,
    calendar: PeriodCalendar,
}

impl TransactionSet {
    pub fn new(
        one_off: Vec<ProjectedEntry>,
        recurring: Vec<ProjectedEntry>,
        categories: Arc<CategoryLookup>,
        calendar: PeriodCalendar,
    ) -> Self {
        Self {
            one_off,
            recurring,
            categories,
            calendar,
        }
    }

    /// One-off entries followed by recurring entries.
    pub fn all(&self) -> impl Iterator<Item = &ProjectedEntry> + '_ {
        self.one_off.iter().chain(self.recurring.iter())
    }

    pub fn one_off(&self) -> &[ProjectedEntry] {
        &self.one_off
    }

    pub fn recurring(&self) -> &[ProjectedEntry] {
        &self.recurring
    }

    pub fn len(&self) -> usize {
        self.one_off.len() + self.recurring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.one_off.is_empty() && self.recurring.is_empty()
    }

    pub fn categories(&self) -> &CategoryLookup {
        &self.categories
    }

    pub fn calendar(&self) -> PeriodCalendar {
        self.calendar
    }

    pub fn category_name(&self, id: Option<Uuid>) -> &str {
        self.categories.name_for(id)
    }

    /// Sum of amounts of `kind`, counted positively for both kinds.
    pub fn total_by_kind(&self, kind: TransactionKind) -> f64 {
        total_of_kind(self.all(), kind)
    }

    /// Income minus expense.
    pub fn net(&self) -> f64 {
        net_amount(self.all())
    }

    /// Portion of income earmarked for savings.
    pub fn savings_target(&self) -> f64 {
        self.all()
            .filter(|entry| entry.kind == TransactionKind::Income)
            .map(|entry| entry.amount * entry.savings_rate)
            .sum()
    }

    /// One-off entries grouped by calendar day, newest day first.
    pub fn group_by_day(&self) -> Vec<DayGroup> {
        let mut days: BTreeMap<NaiveDate, Vec<ProjectedEntry>> = BTreeMap::new();
        for entry in &self.one_off {
            days.entry(entry.date.date()).or_default().push(entry.clone());
        }
        days.into_iter()
            .rev()
            .map(|(day, mut entries)| {
                sort_entries(&mut entries);
                DayGroup { day, entries }
            })
            .collect()
    }

    /// All entries grouped by `period` bucket, newest bucket first.
    pub fn group_by_date_interval(&self, period: Period) -> Vec<IntervalGroup> {
        let mut buckets: BTreeMap<DateInterval, Vec<ProjectedEntry>> = BTreeMap::new();
        for entry in self.all() {
            buckets
                .entry(self.calendar.bucket_for(entry.date, period))
                .or_default()
                .push(entry.clone());
        }
        buckets
            .into_iter()
            .rev()
            .map(|(interval, mut entries)| {
                sort_entries(&mut entries);
                IntervalGroup { interval, entries }
            })
            .collect()
    }

    /// Like [`Self::group_by_date_interval`] but each bucket is a nested set
    /// so one-off and recurring entries stay apart.
    pub fn group_by_period_preserving_kind(&self, period: Period) -> Vec<PeriodGroup> {
        let mut buckets: BTreeMap<DateInterval, (Vec<ProjectedEntry>, Vec<ProjectedEntry>)> =
            BTreeMap::new();
        for entry in &self.one_off {
            buckets
                .entry(self.calendar.bucket_for(entry.date, period))
                .or_default()
                .0
                .push(entry.clone());
        }
        for entry in &self.recurring {
            buckets
                .entry(self.calendar.bucket_for(entry.date, period))
                .or_default()
                .1
                .push(entry.clone());
        }
        buckets
            .into_iter()
            .rev()
            .map(|(interval, (mut one_off, mut recurring))| {
                sort_entries(&mut one_off);
                sort_entries(&mut recurring);
                PeriodGroup {
                    interval,
                    set: TransactionSet::new(
                        one_off,
                        recurring,
                        Arc::clone(&self.categories),
                        self.calendar,
                    ),
                }
            })
            .collect()
    }

    /// All entries grouped by category, largest absolute net first and ties
    /// by name. Missing and dangling references share the uncategorized group.
    pub fn group_by_category(&self) -> Vec<CategoryGroup> {
        let mut groups: HashMap<Option<Uuid>, Vec<ProjectedEntry>> = HashMap::new();
        for entry in self.all() {
            let key = self
                .categories
                .resolve(entry.category_id)
                .map(|category| category.id);
            groups.entry(key).or_default().push(entry.clone());
        }
        let mut result: Vec<CategoryGroup> = groups
            .into_iter()
            .map(|(category_id, mut entries)| {
                sort_entries(&mut entries);
                CategoryGroup {
                    category_id,
                    name: self.categories.name_for(category_id).to_string(),
                    net: net_amount(&entries),
                    entries,
                }
            })
            .collect();
        result.sort_by(|a, b| {
            b.net
                .abs()
                .partial_cmp(&a.net.abs())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        result
    }
}

/// Newest first, then label, then id.
fn sort_entries(entries: &mut [ProjectedEntry]) {
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Assembles a [`TransactionSet`] from raw transaction records.
#[derive(Debug, Clone)]
pub struct TransactionSetBuilder {
    period: Period,
    window: Option<DateInterval>,
    now: Option<NaiveDateTime>,
    categories: Arc<CategoryLookup>,
    calendar: PeriodCalendar,
}

impl TransactionSetBuilder {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            window: None,
            now: None,
            categories: Arc::new(CategoryLookup::default()),
            calendar: PeriodCalendar::default(),
        }
    }

    /// Builder seeded with the configured period, week start and sentinel label.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.default_period)
            .calendar(config.calendar())
            .categories(CategoryLookup::default().with_uncategorized_label(&config.uncategorized_label))
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn window(mut self, window: Option<DateInterval>) -> Self {
        self.window = window;
        self
    }

    pub fn now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn clock(self, clock: &dyn Clock) -> Self {
        self.now(clock.now())
    }

    pub fn categories(mut self, categories: CategoryLookup) -> Self {
        self.categories = Arc::new(categories);
        self
    }

    pub fn calendar(mut self, calendar: PeriodCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Validates every record, wraps one-offs and expands recurring records.
    ///
    /// One-off records are kept regardless of the window; the window only
    /// bounds recurrence expansion.
    pub fn build(&self, transactions: &[Transaction]) -> ProjectionResult<TransactionSet> {
        if let Some(window) = self.window {
            window.validate()?;
        }
        for transaction in transactions {
            if let Err(err) = transaction.validate() {
                tracing::warn!(transaction_id = %transaction.id, %err, "rejected transaction snapshot");
                return Err(err);
            }
        }

        let now = self.now.unwrap_or_else(|| SystemClock.now());
        let (recurring_src, one_off_src): (Vec<&Transaction>, Vec<&Transaction>) =
            transactions.iter().partition(|txn| txn.is_recurring());

        let one_off = one_off_src
            .into_iter()
            .map(ProjectedEntry::from_one_off)
            .collect::<Vec<_>>();
        let mut recurring = Vec::new();
        for transaction in recurring_src {
            recurring.extend(expand_with_calendar(
                &self.calendar,
                transaction,
                self.period,
                self.window,
                now,
            )?);
        }

        tracing::debug!(
            period = %self.period,
            one_off = one_off.len(),
            recurring = recurring.len(),
            "built transaction set"
        );
        Ok(TransactionSet::new(
            one_off,
            recurring,
            Arc::clone(&self.categories),
            self.calendar,
        ))
    }
}

/// Builds a set with the default calendar, no categories and the system clock.
pub fn build_transaction_set(
    transactions: &[Transaction],
    window: Option<DateInterval>,
    period: Period,
) -> ProjectionResult<TransactionSet> {
    TransactionSetBuilder::new(period)
        .window(window)
        .build(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        category::{Category, CategoryKind, UNCATEGORIZED_LABEL},
        transaction::Recurrence,
    };
    use crate::time::FixedClock;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn builder() -> TransactionSetBuilder {
        TransactionSetBuilder::new(Period::Month).clock(&FixedClock(at(2024, 3, 31, 12)))
    }

    #[test]
    fn partitions_one_off_and_recurring() {
        let transactions = vec![
            Transaction::expense("Coffee", 4.0, at(2024, 3, 2, 8)),
            Transaction::expense("Rent", 900.0, at(2024, 1, 1, 0))
                .with_recurrence(Recurrence::Monthly),
        ];
        let set = builder().build(&transactions).unwrap();
        assert_eq!(set.one_off().len(), 1);
        assert_eq!(set.recurring().len(), 3);
        assert_eq!(set.len(), 4);
        assert!(set.recurring().iter().all(ProjectedEntry::is_recurring));
    }

    #[test]
    fn invalid_record_rejects_whole_build() {
        let transactions = vec![
            Transaction::expense("Ok", 1.0, at(2024, 3, 2, 8)),
            Transaction::expense("Bad", -1.0, at(2024, 3, 2, 8)),
        ];
        assert!(builder().build(&transactions).is_err());
    }

    #[test]
    fn day_groups_only_hold_one_off_entries_newest_first() {
        let transactions = vec![
            Transaction::expense("Breakfast", 6.0, at(2024, 3, 1, 8)),
            Transaction::expense("Dinner", 20.0, at(2024, 3, 2, 19)),
            Transaction::expense("Lunch", 9.0, at(2024, 3, 2, 12)),
            Transaction::income("Salary", 2000.0, at(2024, 1, 1, 0))
                .with_recurrence(Recurrence::Monthly),
        ];
        let set = builder().build(&transactions).unwrap();
        let days = set.group_by_day();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        let labels: Vec<&str> = days[0].entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Dinner", "Lunch"]);
    }

    #[test]
    fn preserving_kind_keeps_recurring_apart() {
        let transactions = vec![
            Transaction::expense("Books", 30.0, at(2024, 2, 10, 9)),
            Transaction::expense("Gym", 31.0, at(2024, 2, 1, 0))
                .with_recurrence(Recurrence::Daily)
                .with_end_date(at(2024, 2, 29, 23)),
        ];
        let set = builder().build(&transactions).unwrap();
        let groups = set.group_by_period_preserving_kind(Period::Month);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].set.one_off().len(), 1);
        assert_eq!(groups[0].set.recurring().len(), 1);
        assert!((groups[0].set.recurring()[0].amount - 31.0 * 29.0).abs() < 1e-9);
    }

    #[test]
    fn category_groups_fold_dangling_into_uncategorized() {
        let food = Category::new("Food", CategoryKind::Expense);
        let transactions = vec![
            Transaction::expense("Pizza", 15.0, at(2024, 3, 3, 20)).with_category(food.id),
            Transaction::expense("Mystery", 5.0, at(2024, 3, 4, 10)).with_category(Uuid::new_v4()),
            Transaction::expense("Cash", 7.0, at(2024, 3, 5, 10)),
        ];
        let set = builder()
            .categories(CategoryLookup::new([food.clone()]))
            .build(&transactions)
            .unwrap();
        let groups = set.group_by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, food.name);
        assert!((groups[0].net + 15.0).abs() < 1e-9);
        assert!(groups[1].is_uncategorized());
        assert_eq!(groups[1].name, UNCATEGORIZED_LABEL);
        assert_eq!(groups[1].entries.len(), 2);
        assert!((groups[1].total() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn savings_target_uses_income_rates_only() {
        let transactions = vec![
            Transaction::income("Bonus", 1000.0, at(2024, 3, 1, 9)).with_savings_rate(0.25),
            Transaction::expense("Rent", 800.0, at(2024, 3, 1, 9)).with_savings_rate(1.0),
        ];
        let set = builder().build(&transactions).unwrap();
        assert!((set.savings_target() - 250.0).abs() < 1e-9);
        assert!((set.net() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_builds_empty_set() {
        let set = builder().build(&[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.total_by_kind(TransactionKind::Income), 0.0);
        assert!(set.group_by_category().is_empty());
        assert!(set.group_by_date_interval(Period::Week).is_empty());
    }
}
