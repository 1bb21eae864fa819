use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::model::{date_cell, EmailRecord, Priority};
use super::query::View;

/// A column a view can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupField {
    Mailbox,
    Priority,
    Status,
    Department,
    ReceivedDate,
}

impl GroupField {
    /// Grouping key; unknown enum values group under their literal text.
    pub fn key(self, rec: &EmailRecord) -> String {
        match self {
            GroupField::Mailbox => rec.mailbox.clone(),
            GroupField::Priority => rec.priority.to_string(),
            GroupField::Status => rec.status.to_string(),
            GroupField::Department => rec.department.clone(),
            GroupField::ReceivedDate => date_cell::format(rec.received_date),
        }
    }
}

/// Number of rows per distinct value of `field`.
pub fn count_by(view: &View<'_>, field: GroupField) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for rec in view.iter() {
        *counts.entry(field.key(rec)).or_insert(0) += 1;
    }
    counts
}

/// Two-level counts, e.g. department × status.
pub fn count_by_pair(
    view: &View<'_>,
    outer: GroupField,
    inner: GroupField,
) -> BTreeMap<(String, String), usize> {
    let mut counts = BTreeMap::new();
    for rec in view.iter() {
        *counts.entry((outer.key(rec), inner.key(rec))).or_insert(0) += 1;
    }
    counts
}

/// Emails received per calendar day. Rows without a received date are skipped.
pub fn daily_volume(view: &View<'_>) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for date in view.iter().filter_map(|r| r.received_date) {
        *counts.entry(date).or_insert(0) += 1;
    }
    counts
}

/// Percentage (0–100) of rows whose response was sent; 0 for an empty view.
pub fn response_rate(view: &View<'_>) -> f64 {
    let total = view.len();
    if total == 0 {
        return 0.0;
    }
    let sent = view.iter().filter(|r| r.is_sent()).count();
    sent as f64 / total as f64 * 100.0
}

/// Headline numbers shown above the dashboard and on each mailbox header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total: usize,
    pub pending: usize,
    pub high_priority: usize,
    pub response_rate: f64,
}

impl Metrics {
    pub fn of(view: &View<'_>) -> Self {
        Metrics {
            total: view.len(),
            pending: view.iter().filter(|r| r.is_pending()).count(),
            high_priority: view
                .iter()
                .filter(|r| r.priority == Priority::High)
                .count(),
            response_rate: response_rate(view),
        }
    }
}
