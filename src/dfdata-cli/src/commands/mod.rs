//! Command handlers for the dfdata CLI
//!
//! Each batch job has its own module. Shared report printing lives here.

pub mod analyze;
pub mod extract;
pub mod images;
pub mod prices;
pub mod props;
pub mod relations;
pub mod slots;

use dfdata::stats::{Frequency, NumericSummary};
use std::fmt::Display;

const RULE_WIDTH: usize = 60;

pub(crate) fn header(title: &str) {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", title);
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub(crate) fn section(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "-".repeat(title.chars().count().max(8)));
}

pub(crate) fn print_summary(label: &str, summary: Option<&NumericSummary>) {
    match summary {
        Some(s) => println!(
            "  {:<22} n={:<6} min={:<10.2} max={:<10.2} mean={:<10.2} median={:.2}",
            label, s.count, s.min, s.max, s.mean, s.median
        ),
        None => println!("  {:<22} no data", label),
    }
}

pub(crate) fn print_distribution<K: Display>(rows: &[Frequency<K>]) {
    if rows.is_empty() {
        println!("  no data");
        return;
    }
    for row in rows {
        println!("  {:<30} {:>6} ({:>5.1}%)", row.value.to_string(), row.count, row.percent);
    }
}
