//! End-to-end checks through the public API: load, query, aggregate, export
//! and reload, with an in-memory source standing in for Google Sheets.

use std::cell::RefCell;

use chrono::NaiveDate;

use mail_triage::data::aggregate::{response_rate, Metrics};
use mail_triage::data::loader::{load_external, load_sample_at};
use mail_triage::data::model::{Priority, Table, FIELD_NAMES};
use mail_triage::data::query::{
    apply, group_by_mailbox, paginate, MailboxFilter, PageSize, QuerySpec, SortDirection, SortKey,
    View,
};
use mail_triage::data::source::{FetchRequest, FileSource, RowTable, TabularSource};
use mail_triage::error::LoadError;
use mail_triage::export::{from_json, to_csv, to_json, write_export};
use mail_triage::state::{AppState, ConnectionSettings, Origin};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

fn sample() -> Table {
    load_sample_at(today())
}

/// Serves queued responses in order and records the requests it saw.
struct FakeSheets {
    responses: RefCell<Vec<Result<RowTable, LoadError>>>,
    seen: RefCell<Vec<(String, String)>>,
}

impl FakeSheets {
    fn new(responses: Vec<Result<RowTable, LoadError>>) -> Self {
        Self {
            responses: RefCell::new(responses),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl TabularSource for FakeSheets {
    fn fetch_all(&self, request: &FetchRequest<'_>) -> Result<RowTable, LoadError> {
        self.seen
            .borrow_mut()
            .push((request.locator.to_string(), request.worksheet.to_string()));
        let mut queue = self.responses.borrow_mut();
        if queue.is_empty() {
            return Err(LoadError::Unreachable("no more responses".into()));
        }
        queue.remove(0)
    }

    fn describe(&self, request: &FetchRequest<'_>) -> String {
        format!("fake sheet {}", request.locator)
    }
}

fn grid(table: &Table) -> RowTable {
    RowTable::new(
        FIELD_NAMES.iter().map(|s| s.to_string()).collect(),
        table
            .iter()
            .map(|r| FIELD_NAMES.iter().filter_map(|f| r.cell(f)).collect())
            .collect(),
    )
}

#[test]
fn high_priority_filter_returns_first_email_of_each_mailbox() {
    let table = sample();
    let spec = QuerySpec {
        priorities: [Priority::High].into(),
        ..QuerySpec::default()
    };
    let view = apply(&table, &spec);
    assert_eq!(view.len(), 5);
    assert!(view.iter().all(|r| r.priority == Priority::High));
    assert_eq!(group_by_mailbox(&view).len(), 5);
}

#[test]
fn payment_search_matches_the_payment_template_only() {
    let table = sample();
    let spec = QuerySpec {
        search: Some("payment".into()),
        ..QuerySpec::default()
    };
    let view = apply(&table, &spec);
    let ids: Vec<&str> = view.iter().map(|r| r.email_id.as_str()).collect();
    assert_eq!(ids, ["E1001"]);
    assert!(view.rows()[0].subject.contains("Payment processing issue"));
    assert!(view.rows()[0].summary.contains("payment gateway errors"));
}

#[test]
fn unknown_mailbox_gives_empty_view_and_zero_rate() {
    let table = sample();
    let spec = QuerySpec {
        mailbox: MailboxFilter::Only("nobody@example.com".into()),
        ..QuerySpec::default()
    };
    let view = apply(&table, &spec);
    assert!(view.is_empty());
    assert_eq!(response_rate(&view), 0.0);
    let page = paginate(&view, PageSize::Rows(25), 3);
    assert_eq!((page.number, page.total_pages, page.first_row), (1, 1, 0));
}

#[test]
fn priority_sort_groups_by_rank_and_keeps_table_order() {
    let table = sample();
    let spec = QuerySpec {
        sort_key: SortKey::Priority,
        direction: SortDirection::Descending,
        ..QuerySpec::default()
    };
    let view = apply(&table, &spec);
    let ids: Vec<&str> = view.iter().map(|r| r.email_id.as_str()).collect();
    assert_eq!(
        ids,
        ["E1001", "E1003", "E1005", "E1007", "E1009", "E1002", "E1004", "E1006", "E1008", "E1010"]
    );
}

#[test]
fn json_export_round_trips_a_sorted_view() {
    let table = sample();
    let spec = QuerySpec {
        sort_key: SortKey::Department,
        direction: SortDirection::Ascending,
        ..QuerySpec::default()
    };
    let view = apply(&table, &spec);
    let back = from_json(&to_json(&view).unwrap()).unwrap();
    assert_eq!(back, view.to_records());
}

#[test]
fn csv_export_loads_back_through_the_file_source() {
    let table = sample();
    let dir = tempfile::tempdir().unwrap();
    let path = write_export(dir.path(), "emails.csv", &to_csv(&View::all(&table)).unwrap()).unwrap();

    let locator = path.to_string_lossy().into_owned();
    let request = FetchRequest {
        locator: &locator,
        credentials: None,
        worksheet: "Sheet1",
        timeout: None,
    };
    let loaded = load_external(&FileSource, &request).unwrap();
    assert!(loaded.rejected.is_empty());
    assert_eq!(loaded.table.records(), table.records());
}

#[test]
fn connect_then_failed_refresh_keeps_the_loaded_table() {
    let mut external = sample().records().to_vec();
    external.truncate(4);
    let external = Table::from_records(external);

    let source = FakeSheets::new(vec![
        Ok(grid(&external)),
        Err(LoadError::TimedOut(std::time::Duration::from_secs(30))),
    ]);

    let mut state = AppState::default();
    let settings = ConnectionSettings {
        locator: "https://docs.google.com/spreadsheets/d/abc123/edit".into(),
        worksheet: "Inbox".into(),
        timeout: Some(std::time::Duration::from_secs(30)),
    };
    assert_eq!(state.connect(&source, settings).unwrap(), 4);
    assert_eq!(
        state.origin,
        Origin::External("fake sheet https://docs.google.com/spreadsheets/d/abc123/edit".into())
    );

    let err = state.refresh(&source).unwrap_err();
    assert!(matches!(err, LoadError::TimedOut(_)));
    assert_eq!(state.table.len(), 4);
    assert_eq!(Metrics::of(&state.view()).total, 4);

    let seen = source.seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(_, ws)| ws == "Inbox"));
}

#[test]
fn quarantined_rows_are_reported_alongside_the_table() {
    let mut rows = grid(&sample());
    let sent = FIELD_NAMES.iter().position(|f| *f == "Sent (Y/N)").unwrap();
    rows.rows[2][sent] = "maybe".into();

    let mut state = AppState::default();
    let source = FakeSheets::new(vec![Ok(rows)]);
    let settings = ConnectionSettings {
        locator: "abc123".into(),
        worksheet: "Sheet1".into(),
        timeout: None,
    };
    assert_eq!(state.connect(&source, settings).unwrap(), 9);
    assert_eq!(state.quarantined.len(), 1);
    assert_eq!(state.quarantined[0].email_id, "E1003");
    assert_eq!(state.quarantined[0].row, 4);
}
