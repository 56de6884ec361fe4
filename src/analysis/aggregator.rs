//! Record aggregation.
//!
//! Pure folds over a dataset producing grouped counts, per-category
//! partitions, per-group averages and label unions. Every function returns
//! a freshly built map and never mutates its input.

use crate::models::{AverageByGroup, GroupCounts, Record};
use indexmap::{IndexMap, IndexSet};

/// A field value is present when it exists and is a non-empty string.
///
/// `"0"` and whitespace-only strings are present values.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Resolve the group label of a field, falling back to `default_label`.
pub fn label_or<'a>(value: Option<&'a str>, default_label: &'a str) -> &'a str {
    present(value).unwrap_or(default_label)
}

/// Longest numeric prefix of `text` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction and an
/// optional exponent, and ignores whatever follows: `"36.5°C"` reads as
/// `36.5` and `"37,2"` as `37`. Non-finite results are rejected.
pub fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let sign = |i: usize| matches!(bytes.get(i), Some(b'+') | Some(b'-'));

    let start = if sign(0) { 1 } else { 0 };
    let mut end = digits_from(start);
    let mut digits = end - start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        digits += fraction_end - (end + 1);
        end = fraction_end;
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exponent_start = if sign(end + 1) { end + 2 } else { end + 1 };
        let exponent_end = digits_from(exponent_start);
        if exponent_end > exponent_start {
            end = exponent_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a numeric field. Absent or unparseable input yields `0`.
pub fn parse_number(value: Option<&str>) -> f64 {
    value.and_then(leading_number).unwrap_or(0.0)
}

/// Count records per label of the selected field.
///
/// Takes a dataset slice or a partition produced by [`partition_by_category`].
pub fn count_by_field<'r, I, F>(records: I, field: F, default_label: &str) -> GroupCounts
where
    I: IntoIterator<Item = &'r Record>,
    F: Fn(&'r Record) -> Option<&'r str>,
{
    records.into_iter().fold(GroupCounts::new(), |mut counts, record| {
        let label = label_or(field(record), default_label);
        *counts.entry(label.to_string()).or_insert(0) += 1;
        counts
    })
}

/// Running sum and count of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: f64,
    pub count: usize,
}

impl Accumulator {
    fn push(mut self, value: f64) -> Self {
        self.sum += value;
        self.count += 1;
        self
    }

    /// Arithmetic mean; undefined (`None`) for an empty group.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Average a numeric field per group label.
///
/// Unparseable or absent numbers contribute `0` to the sum and `1` to the
/// count of their group.
pub fn average_numeric_by_group<'r, G, N>(
    records: &'r [Record],
    group: G,
    numeric: N,
    default_label: &str,
) -> AverageByGroup
where
    G: Fn(&'r Record) -> Option<&'r str>,
    N: Fn(&'r Record) -> Option<&'r str>,
{
    let sums = records
        .iter()
        .fold(IndexMap::<String, Accumulator>::new(), |mut acc, record| {
            let label = label_or(group(record), default_label);
            let value = parse_number(numeric(record));
            let slot = acc.entry(label.to_string()).or_default();
            *slot = slot.push(value);
            acc
        });

    sums.into_iter()
        .filter_map(|(label, acc)| acc.mean().map(|mean| (label, mean)))
        .collect()
}

/// Split records into one partition per known category.
///
/// The field is trimmed before an exact comparison. Records whose field is
/// absent or matches no category are dropped from every partition.
pub fn partition_by_category<'r, F>(
    records: &'r [Record],
    field: F,
    categories: &[String],
) -> IndexMap<String, Vec<&'r Record>>
where
    F: Fn(&'r Record) -> Option<&'r str>,
{
    let empty: IndexMap<String, Vec<&'r Record>> = categories
        .iter()
        .map(|c| (c.clone(), Vec::new()))
        .collect();

    records.iter().fold(empty, |mut parts, record| {
        if let Some(value) = present(field(record)).map(str::trim) {
            if let Some(part) = parts.get_mut(value) {
                part.push(record);
            }
        }
        parts
    })
}

/// Deduplicated union of labels across mappings, first-seen order.
pub fn union_labels(mappings: &[&GroupCounts]) -> Vec<String> {
    mappings
        .iter()
        .copied()
        .flat_map(|m| m.keys().map(String::as_str))
        .collect::<IndexSet<&str>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Values of `counts` aligned to `labels`; labels absent from `counts` read as `0`.
pub fn align_counts(counts: &GroupCounts, labels: &[String]) -> Vec<f64> {
    labels
        .iter()
        .map(|l| counts.get(l).copied().unwrap_or(0) as f64)
        .collect()
}

/// Number of records in which each field is present.
pub fn field_coverage(records: &[Record]) -> IndexMap<&'static str, usize> {
    let fields: [(&'static str, fn(&Record) -> Option<&str>); 5] = [
        ("id", |r| r.id.as_deref()),
        ("date", |r| r.date.as_deref()),
        ("gender", |r| r.gender.as_deref()),
        ("temperature", |r| r.temperature.as_deref()),
        ("risk_label", |r| r.risk_label.as_deref()),
    ];

    fields
        .iter()
        .map(|(name, select)| {
            let count = records
                .iter()
                .filter(|&r| present(select(r)).is_some())
                .count();
            (*name, count)
        })
        .collect()
}
