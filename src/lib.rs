#![doc(test(attr(deny(warnings))))]

//! Tally Core projects one-off and recurring transactions into reporting
//! periods and aggregates them for budget summaries.
//!
//! ```
//! use chrono::NaiveDate;
//! use tally_core::ledger::{build_transaction_set, DateInterval, Period, Recurrence, Transaction};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//! let window = DateInterval::from_dates(start, end).unwrap();
//! let rent = Transaction::expense("Rent", 14.0, start.and_hms_opt(0, 0, 0).unwrap())
//!     .with_recurrence(Recurrence::Weekly);
//! let set = build_transaction_set(&[rent], Some(window), Period::Month).unwrap();
//! assert_eq!(set.recurring().len(), 1);
//! ```

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod time;
pub mod utils;

pub use errors::{ProjectionError, ProjectionResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tally Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
