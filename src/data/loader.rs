use std::collections::{BTreeSet, HashMap};

use chrono::{Local, NaiveDate};

use super::model::{date_cell, EmailRecord, Flag, Priority, ResolutionStatus, Table, FIELD_NAMES};
use super::sample::sample_records;
use super::source::{FetchRequest, RowTable, TabularSource};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// A freshly loaded table plus the rows that were set aside.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub table: Table,
    pub rejected: Vec<RowRejection>,
}

/// A source row that violated the schema and was kept out of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// 1-based sheet row number (the header is row 1).
    pub row: usize,
    pub email_id: String,
    pub reason: String,
}

/// The built-in demo table, dated relative to the local clock.
pub fn load_sample() -> Table {
    load_sample_at(Local::now().date_naive())
}

pub fn load_sample_at(today: NaiveDate) -> Table {
    Table::from_records(sample_records(today))
}

/// Fetch a sheet from `source` and map it into a [`Table`].
///
/// Schema problems in individual rows do not fail the load; those rows are
/// reported in [`Loaded::rejected`].
pub fn load_external(
    source: &dyn TabularSource,
    request: &FetchRequest<'_>,
) -> Result<Loaded, LoadError> {
    let name = source.describe(request);
    log::info!("Loading email table from {name}");
    let rows = source.fetch_all(request)?;
    let loaded = map_rows(&rows)?;
    log::info!(
        "Loaded {} emails from {name} ({} rows quarantined)",
        loaded.table.len(),
        loaded.rejected.len()
    );
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Map raw rows into typed records, validating flags, dates and id uniqueness.
pub fn map_rows(rows: &RowTable) -> Result<Loaded, LoadError> {
    let index: HashMap<&str, usize> = rows
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    let missing: Vec<&str> = FIELD_NAMES
        .iter()
        .copied()
        .filter(|name| !index.contains_key(name))
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::SchemaMismatch(format!(
            "missing columns: {}",
            missing.join(", ")
        )));
    }

    let extra = rows.headers.len().saturating_sub(FIELD_NAMES.len());
    if extra > 0 {
        log::debug!("Ignoring {extra} extra column(s)");
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    let mut seen_ids: BTreeSet<String> = BTreeSet::new();

    for (i, cells) in rows.rows.iter().enumerate() {
        let row = i + 2;
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let email_id = cell_at(&index, cells, "Email ID").to_string();
        let result = record_from_cells(&index, cells).and_then(|rec| {
            if rec.email_id.trim().is_empty() {
                Err("empty Email ID".to_string())
            } else if seen_ids.contains(&rec.email_id) {
                Err(format!("duplicate Email ID {}", rec.email_id))
            } else {
                Ok(rec)
            }
        });

        match result {
            Ok(rec) => {
                seen_ids.insert(rec.email_id.clone());
                records.push(rec);
            }
            Err(reason) => {
                log::warn!("Quarantined row {row} ({email_id}): {reason}");
                rejected.push(RowRejection {
                    row,
                    email_id,
                    reason,
                });
            }
        }
    }

    Ok(Loaded {
        table: Table::from_records(records),
        rejected,
    })
}

/// Sheets trims trailing empty cells, so short rows read as blanks.
fn cell_at<'c>(index: &HashMap<&str, usize>, cells: &'c [String], name: &str) -> &'c str {
    index
        .get(name)
        .and_then(|&col| cells.get(col))
        .map(String::as_str)
        .unwrap_or("")
}

fn record_from_cells(index: &HashMap<&str, usize>, cells: &[String]) -> Result<EmailRecord, String> {
    let cell = |name: &str| cell_at(index, cells, name);
    let text = |name: &str| cell(name).to_string();
    let flag = |name: &str| Flag::parse(cell(name)).map_err(|e| format!("{name}: {e}"));
    let date = |name: &str| date_cell::parse(cell(name)).map_err(|e| format!("{name}: {e}"));

    Ok(EmailRecord {
        mailbox: text("Company Main Email"),
        email_id: text("Email ID"),
        received_date: date("Received Date")?,
        received_time: text("Received Time"),
        sender_name: text("From (Sender Name)"),
        sender_email: text("From (Sender Email)"),
        subject: text("Subject"),
        department: text("Department"),
        priority: Priority::parse(cell("Priority")),
        category: text("Category/Tag"),
        summary: text("Email Summary"),
        drafted_response: text("Drafted Response"),
        response_approved: flag("Response Approved (Y/N)")?,
        approver: text("Approver Name"),
        sent: flag("Sent (Y/N)")?,
        sent_date: date("Sent Date")?,
        sent_time: text("Sent Time"),
        sent_summary: text("Sent Email Summary"),
        attachments_received: flag("Attachments Received (Y/N)")?,
        attachment_details: text("Attachment Details"),
        follow_up_required: flag("Follow-up Required (Y/N)")?,
        follow_up_due: date("Follow-up Due Date")?,
        assignee: text("Assigned To"),
        status: ResolutionStatus::parse(cell("Resolution Status")),
        notes: text("Notes/Comments"),
    })
}
