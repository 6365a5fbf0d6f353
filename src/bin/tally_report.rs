use std::{env, fs, path::PathBuf, process};

use chrono::{NaiveDate, NaiveDateTime};
use colored::Colorize;
use serde::Deserialize;

use tally_core::{
    config::ConfigManager,
    core::services::SummaryService,
    init,
    ledger::{Category, CategoryLookup, DateInterval, Period, Transaction, TransactionSetBuilder},
    time::{Clock, SystemClock},
    utils::build_info,
};

/// JSON snapshot handed over by the external store.
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    window: Option<WindowSpec>,
    #[serde(default)]
    now: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
struct WindowSpec {
    start: NaiveDate,
    end: NaiveDate,
}

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let first = args.next().unwrap_or_else(|| {
        print_usage();
        process::exit(1);
    });
    if first == "--version" {
        println!("{}", build_info::current().summary());
        return Ok(());
    }

    let config = ConfigManager::new().load()?;
    let period = match args.next() {
        Some(raw) => raw.parse::<Period>()?,
        None => config.default_period,
    };

    let path = PathBuf::from(first);
    let snapshot: Snapshot = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let now = snapshot.now.unwrap_or_else(|| SystemClock.now());
    let window = match &snapshot.window {
        Some(spec) => DateInterval::from_dates(spec.start, spec.end)?,
        None => {
            let earliest = snapshot
                .transactions
                .iter()
                .map(|txn| txn.date)
                .min()
                .unwrap_or(now);
            DateInterval::new(earliest.min(now), now)?
        }
    };

    let categories = CategoryLookup::new(snapshot.categories)
        .with_uncategorized_label(&config.uncategorized_label);
    let set = TransactionSetBuilder::from_config(&config)
        .period(period)
        .window(Some(window))
        .now(now)
        .categories(categories)
        .build(&snapshot.transactions)?;

    let summary = SummaryService::summarize(&set);
    println!(
        "{} {} .. {} ({})",
        "Report".bold(),
        window.start.date(),
        window.end.date(),
        period.label()
    );
    println!("  Income:   {}", format!("{:.2}", summary.income).green());
    println!("  Expenses: {}", format!("{:.2}", summary.expenses).red());
    println!("  Net:      {}", signed(summary.net));
    println!("  Savings:  {:.2}", summary.savings_target);
    println!(
        "  Budget:   {:.0}% used{}",
        summary.budget.percent_of_income_used * 100.0,
        if summary.budget.under_budget {
            ""
        } else {
            " (not under budget)"
        }
    );

    println!("\n{}", "Periods".bold());
    for row in SummaryService::period_rows(&set, window, period)? {
        println!(
            "  {}  {:>10}  {:>10}  {:>10}  {}",
            row.interval.start.date(),
            format!("{:.2}", row.income),
            format!("{:.2}", row.expenses),
            signed(row.net),
            percent(row.percent_of_total)
        );
    }

    println!("\n{}", "Categories".bold());
    for row in SummaryService::category_rows(&set) {
        println!(
            "  {:<20} {:>10}  {}",
            row.name,
            signed(row.net),
            percent(row.percent_of_total)
        );
    }

    Ok(())
}

fn signed(value: f64) -> String {
    let text = format!("{value:.2}");
    if value < 0.0 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|share| format!("{:.0}%", share * 100.0))
        .unwrap_or_default()
}

fn print_usage() {
    eprintln!(
        "Usage: tally_report <snapshot.json> [period]\n       \
         tally_report --version\n\
         Periods: day, week, fortnight, month, quarter, year"
    );
}
