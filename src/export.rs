//! CSV / JSON encoders for views, plus the analytics and filter-summary
//! reports. Encoders are pure; [`write_export`] is the only part that
//! touches the filesystem.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::data::aggregate::{count_by, response_rate, GroupField};
use crate::data::model::{EmailRecord, FIELD_NAMES};
use crate::data::query::{MailboxFilter, QuerySpec, View};
use crate::error::ExportError;

// ---------------------------------------------------------------------------
// Record encoders
// ---------------------------------------------------------------------------

/// Header row plus one line per record, RFC 4180 quoting.
pub fn to_csv(view: &View<'_>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    // Written by hand so an empty view still gets its header.
    writer.write_record(FIELD_NAMES)?;
    for rec in view.iter() {
        writer.serialize(rec)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Array of objects, 2-space indented, fields in canonical order.
pub fn to_json(view: &View<'_>) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(view.rows())?)
}

pub fn from_json(bytes: &[u8]) -> Result<Vec<EmailRecord>, ExportError> {
    Ok(serde_json::from_slice(bytes)?)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Counts and response rate for a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total_emails: usize,
    pub by_priority: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub by_department: BTreeMap<String, usize>,
    /// Percentage, 0–100.
    pub response_rate: f64,
}

impl AnalyticsReport {
    pub fn of(view: &View<'_>) -> Self {
        AnalyticsReport {
            total_emails: view.len(),
            by_priority: count_by(view, GroupField::Priority),
            by_status: count_by(view, GroupField::Status),
            by_department: count_by(view, GroupField::Department),
            response_rate: response_rate(view),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ExportError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Either the "All ..." label or the selected values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    Label(String),
    Values(Vec<String>),
}

impl Selection {
    fn of<'s>(values: impl IntoIterator<Item = &'s str>, all: &str) -> Self {
        let values: Vec<String> = values.into_iter().map(str::to_string).collect();
        if values.is_empty() {
            Selection::Label(all.to_string())
        } else {
            Selection::Values(values)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterApplied {
    pub mailbox: String,
    pub priorities: Selection,
    pub statuses: Selection,
    pub departments: Selection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterResults {
    pub total_filtered: usize,
    pub total_original: usize,
}

/// Which filters produced a view, and how much they cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub filter_applied: FilterApplied,
    pub results: FilterResults,
}

impl FilterSummary {
    pub fn new(spec: &QuerySpec, total_filtered: usize, total_original: usize) -> Self {
        let mailbox = match &spec.mailbox {
            MailboxFilter::All => "All mailboxes".to_string(),
            MailboxFilter::Only(m) => m.clone(),
        };
        FilterSummary {
            filter_applied: FilterApplied {
                mailbox,
                priorities: Selection::of(spec.priorities.iter().map(|p| p.as_str()), "All priorities"),
                statuses: Selection::of(spec.statuses.iter().map(|s| s.as_str()), "All statuses"),
                departments: Selection::of(
                    spec.departments.iter().map(String::as_str),
                    "All departments",
                ),
            },
            results: FilterResults {
                total_filtered,
                total_original,
            },
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ExportError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

/// `emails_<mailbox with @ → _at_>_<YYYYMMDD>.<ext>`
pub fn mailbox_file_name(mailbox: &str, date: NaiveDate, ext: &str) -> String {
    format!(
        "emails_{}_{}.{ext}",
        mailbox.replace('@', "_at_"),
        date.format("%Y%m%d")
    )
}

/// `complete_email_data_<YYYYMMDD_HHMM>.<ext>`
pub fn complete_file_name(at: NaiveDateTime, ext: &str) -> String {
    format!("complete_email_data_{}.{ext}", at.format("%Y%m%d_%H%M"))
}

pub fn analytics_file_name(at: NaiveDateTime) -> String {
    format!("email_analytics_{}.json", at.format("%Y%m%d_%H%M"))
}

pub fn filter_summary_file_name(at: NaiveDateTime) -> String {
    format!("filter_summary_{}.json", at.format("%Y%m%d_%H%M"))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `bytes` to `dir/name` via a temporary file in the same directory, so
/// a failed export never leaves a partial file behind.
pub fn write_export(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let target = dir.join(name);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;
    log::info!("Exported {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_sample_at;
    use crate::data::model::{Priority, ResolutionStatus, Table};
    use crate::data::query::apply;

    fn table() -> Table {
        load_sample_at(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
    }

    #[test]
    fn csv_header_is_canonical() {
        let table = table();
        let bytes = to_csv(&View::all(&table)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, FIELD_NAMES.join(","));
        assert_eq!(text.lines().count(), 11);
    }

    #[test]
    fn csv_quotes_commas() {
        let table = table();
        let text = String::from_utf8(to_csv(&View::all(&table)).unwrap()).unwrap();
        assert!(text.contains("\"contract.pdf, invoice.xlsx\""));
        assert!(text.contains("\"Billing discrepancy of $1,500 requires investigation and correction\""));
    }

    #[test]
    fn empty_view_still_has_header() {
        let view = View::default();
        let text = String::from_utf8(to_csv(&view).unwrap()).unwrap();
        assert_eq!(text.trim_end(), FIELD_NAMES.join(","));
        assert_eq!(to_json(&view).unwrap(), b"[]");
    }

    #[test]
    fn json_is_indented_in_field_order() {
        let table = table();
        let text = String::from_utf8(to_json(&View::all(&table)).unwrap()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"Company Main Email\": \"support@vipbusinesscredit.com\",\n    \"Email ID\": \"E1001\""));
        let first = text.find("\"Company Main Email\"").unwrap();
        let last = text.find("\"Notes/Comments\"").unwrap();
        assert!(first < last);
        assert!(text.contains("\"Follow-up Due Date\": \"\""));
    }

    #[test]
    fn json_round_trips_view_order() {
        let table = table();
        let spec = QuerySpec {
            sort_key: crate::data::query::SortKey::Priority,
            ..QuerySpec::default()
        };
        let view = apply(&table, &spec);
        let back = from_json(&to_json(&view).unwrap()).unwrap();
        assert_eq!(back, view.to_records());
    }

    #[test]
    fn analytics_report_keys() {
        let table = table();
        let report = AnalyticsReport::of(&View::all(&table));
        let value: serde_json::Value = serde_json::from_slice(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["total_emails"], 10);
        assert_eq!(value["by_priority"]["High"], 5);
        assert_eq!(value["by_status"]["In Progress"], 5);
        assert_eq!(value["by_department"]["General"], 2);
        assert_eq!(value["response_rate"], 50.0);
    }

    #[test]
    fn analytics_of_empty_view() {
        let report = AnalyticsReport::of(&View::default());
        assert_eq!(report.total_emails, 0);
        assert_eq!(report.response_rate, 0.0);
    }

    #[test]
    fn filter_summary_defaults_to_all_labels() {
        let summary = FilterSummary::new(&QuerySpec::default(), 10, 10);
        let value: serde_json::Value = serde_json::from_slice(&summary.to_json().unwrap()).unwrap();
        assert_eq!(value["filter_applied"]["mailbox"], "All mailboxes");
        assert_eq!(value["filter_applied"]["priorities"], "All priorities");
        assert_eq!(value["filter_applied"]["statuses"], "All statuses");
        assert_eq!(value["filter_applied"]["departments"], "All departments");
        assert_eq!(value["results"]["total_filtered"], 10);
        assert_eq!(value["results"]["total_original"], 10);
    }

    #[test]
    fn filter_summary_lists_selections() {
        let spec = QuerySpec {
            mailbox: MailboxFilter::Only("hr@vipbusinesscredit.com".into()),
            priorities: [Priority::High, Priority::Low].into(),
            statuses: [ResolutionStatus::InProgress].into(),
            ..QuerySpec::default()
        };
        let summary = FilterSummary::new(&spec, 1, 10);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["filter_applied"]["mailbox"], "hr@vipbusinesscredit.com");
        assert_eq!(
            value["filter_applied"]["priorities"],
            serde_json::json!(["High", "Low"])
        );
        assert_eq!(value["filter_applied"]["statuses"], serde_json::json!(["In Progress"]));
        assert_eq!(value["filter_applied"]["departments"], "All departments");
    }

    #[test]
    fn file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let at = date.and_hms_opt(14, 7, 0).unwrap();
        assert_eq!(
            mailbox_file_name("hr@vipbusinesscredit.com", date, "csv"),
            "emails_hr_at_vipbusinesscredit.com_20240510.csv"
        );
        assert_eq!(complete_file_name(at, "json"), "complete_email_data_20240510_1407.json");
        assert_eq!(analytics_file_name(at), "email_analytics_20240510_1407.json");
        assert_eq!(filter_summary_file_name(at), "filter_summary_20240510_1407.json");
    }

    #[test]
    fn write_export_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), "out.csv", b"first").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
        write_export(dir.path(), "out.csv", b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_export_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            write_export(&missing, "out.csv", b"x"),
            Err(ExportError::Io(_))
        ));
        assert!(!missing.exists());
    }
}
