//! Descriptive statistics: numeric summaries, frequency distributions, and
//! stable rankings.
//!
//! Absent values are skipped, never counted as zero. An empty input yields
//! `None` so callers can print "no data" instead of a misleading 0.

use std::collections::HashMap;
use std::hash::Hash;

/// min/max/mean/median over the present values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Summarize the present values. `None` when nothing is present.
pub fn summarize<I>(values: I) -> Option<NumericSummary>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut present: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    if present.is_empty() {
        return None;
    }

    present.sort_by(f64::total_cmp);
    let count = present.len();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    };

    Some(NumericSummary {
        count,
        min: present[0],
        max: present[count - 1],
        mean: present.iter().sum::<f64>() / count as f64,
        median,
    })
}

/// One row of a frequency distribution
#[derive(Debug, Clone, PartialEq)]
pub struct Frequency<K> {
    pub value: K,
    pub count: usize,
    /// Share of the present values, 0-100
    pub percent: f64,
}

fn tally<K, I>(values: I) -> (Vec<(K, usize)>, usize)
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = Option<K>>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    let mut total = 0;

    for value in values.into_iter().flatten() {
        total += 1;
        match positions.get(&value) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    (counts, total)
}

fn with_percent<K>(counts: Vec<(K, usize)>, total: usize) -> Vec<Frequency<K>> {
    counts
        .into_iter()
        .map(|(value, count)| Frequency {
            value,
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect()
}

/// Frequency distribution, most common first. Ties keep first-seen order.
pub fn distribution<K, I>(values: I) -> Vec<Frequency<K>>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = Option<K>>,
{
    let (counts, total) = tally(values);
    let counts = rank_desc(counts, |(_, count)| *count);
    with_percent(counts, total)
}

/// Frequency distribution ordered by value, for ordinal attributes such as
/// grade or protection level
pub fn distribution_by_value<K, I>(values: I) -> Vec<Frequency<K>>
where
    K: Eq + Hash + Clone + Ord,
    I: IntoIterator<Item = Option<K>>,
{
    let (mut counts, total) = tally(values);
    counts.sort_by(|a, b| a.0.cmp(&b.0));
    with_percent(counts, total)
}

/// Sort descending by `metric`. The sort is stable, so equal metrics keep
/// their input order.
pub fn rank_desc<T, M, F>(mut items: Vec<T>, metric: F) -> Vec<T>
where
    M: Ord,
    F: Fn(&T) -> M,
{
    items.sort_by(|a, b| metric(b).cmp(&metric(a)));
    items
}

/// The first `n` of [`rank_desc`]
pub fn top_n<T, M, F>(items: Vec<T>, n: usize, metric: F) -> Vec<T>
where
    M: Ord,
    F: Fn(&T) -> M,
{
    let mut ranked = rank_desc(items, metric);
    ranked.truncate(n);
    ranked
}
