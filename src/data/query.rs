use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::model::{EmailRecord, Priority, ResolutionStatus, Table};

// ---------------------------------------------------------------------------
// QuerySpec – everything one query needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MailboxFilter {
    #[default]
    All,
    Only(String),
}

impl MailboxFilter {
    fn accepts(&self, mailbox: &str) -> bool {
        match self {
            MailboxFilter::All => true,
            MailboxFilter::Only(m) => m == mailbox,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    ReceivedDate,
    Priority,
    Status,
    Department,
    EmailId,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::ReceivedDate,
        SortKey::Priority,
        SortKey::Status,
        SortKey::Department,
        SortKey::EmailId,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::ReceivedDate => "Received Date",
            SortKey::Priority => "Priority",
            SortKey::Status => "Resolution Status",
            SortKey::Department => "Department",
            SortKey::EmailId => "Email ID",
        }
    }

    /// Ascending comparison of two records on this key.
    fn compare(self, a: &EmailRecord, b: &EmailRecord) -> Ordering {
        match self {
            SortKey::ReceivedDate => a.received_date.cmp(&b.received_date),
            SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
            SortKey::Department => a.department.cmp(&b.department),
            SortKey::EmailId => a.email_id.cmp(&b.email_id),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "Ascending",
            SortDirection::Descending => "Descending",
        }
    }
}

/// Filter and sort parameters for one query. Empty sets mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub mailbox: MailboxFilter,
    pub priorities: BTreeSet<Priority>,
    pub statuses: BTreeSet<ResolutionStatus>,
    pub departments: BTreeSet<String>,
    /// Case-insensitive substring matched against subject and summary.
    pub search: Option<String>,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

impl QuerySpec {
    /// Whether a record passes every filter and the search term.
    pub fn matches(&self, rec: &EmailRecord) -> bool {
        self.mailbox.accepts(&rec.mailbox)
            && (self.priorities.is_empty() || self.priorities.contains(&rec.priority))
            && (self.statuses.is_empty() || self.statuses.contains(&rec.status))
            && (self.departments.is_empty() || self.departments.contains(&rec.department))
            && self.matches_search(rec)
    }

    fn matches_search(&self, rec: &EmailRecord) -> bool {
        let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        rec.subject.to_lowercase().contains(&term) || rec.summary.to_lowercase().contains(&term)
    }

    fn compare(&self, a: &EmailRecord, b: &EmailRecord) -> Ordering {
        let ord = self.sort_key.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    pub fn has_filters(&self) -> bool {
        self.mailbox != MailboxFilter::All
            || !self.priorities.is_empty()
            || !self.statuses.is_empty()
            || !self.departments.is_empty()
            || self.search.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// View – the ordered result of a query
// ---------------------------------------------------------------------------

/// Borrowed rows of a [`Table`] after filtering and sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View<'a> {
    rows: Vec<&'a EmailRecord>,
}

impl<'a> View<'a> {
    /// Every row of the table in table order.
    pub fn all(table: &'a Table) -> Self {
        View {
            rows: table.iter().collect(),
        }
    }

    pub fn rows(&self) -> &[&'a EmailRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EmailRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Apply `spec` again on top of this view.
    pub fn refine(&self, spec: &QuerySpec) -> View<'a> {
        apply_records(self.rows.iter().copied(), spec)
    }

    pub fn find_by_id(&self, email_id: &str) -> Option<&'a EmailRecord> {
        self.iter().find(|r| r.email_id == email_id)
    }

    /// Owned copies of the rows, in view order.
    pub fn to_records(&self) -> Vec<EmailRecord> {
        self.iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Query engine
// ---------------------------------------------------------------------------

/// Filter, then stably sort. The table is never modified.
pub fn apply<'a>(table: &'a Table, spec: &QuerySpec) -> View<'a> {
    apply_records(table.iter(), spec)
}

pub fn apply_records<'a>(
    records: impl IntoIterator<Item = &'a EmailRecord>,
    spec: &QuerySpec,
) -> View<'a> {
    let mut rows: Vec<&'a EmailRecord> = records.into_iter().filter(|r| spec.matches(r)).collect();
    // `sort_by` is stable: equal keys keep their table order in both directions.
    rows.sort_by(|a, b| spec.compare(a, b));
    View { rows }
}

/// Split a view into per-mailbox views, mailboxes in sorted order.
pub fn group_by_mailbox<'a>(view: &View<'a>) -> BTreeMap<&'a str, View<'a>> {
    let mut groups: BTreeMap<&'a str, View<'a>> = BTreeMap::new();
    for rec in view.iter() {
        groups.entry(rec.mailbox.as_str()).or_default().rows.push(rec);
    }
    groups
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PageSize {
    Rows(usize),
    #[default]
    All,
}

impl PageSize {
    pub const CHOICES: [PageSize; 5] = [
        PageSize::Rows(10),
        PageSize::Rows(25),
        PageSize::Rows(50),
        PageSize::Rows(100),
        PageSize::All,
    ];
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Rows(n) => write!(f, "{n}"),
            PageSize::All => f.write_str("All"),
        }
    }
}

/// One page of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'v, 'a> {
    pub rows: &'v [&'a EmailRecord],
    /// 1-based page number actually shown.
    pub number: usize,
    pub total_pages: usize,
    /// 1-based index of the first row on the page (0 when empty).
    pub first_row: usize,
    /// 1-based index of the last row on the page (0 when empty).
    pub last_row: usize,
    pub total_rows: usize,
}

/// Slice out page `page` (1-based, clamped into range).
pub fn paginate<'v, 'a>(view: &'v View<'a>, size: PageSize, page: usize) -> Page<'v, 'a> {
    let total_rows = view.len();
    let per_page = match size {
        PageSize::Rows(n) if n > 0 => n,
        _ => total_rows.max(1),
    };
    let total_pages = total_rows.div_ceil(per_page).max(1);
    let number = page.clamp(1, total_pages);
    let start = ((number - 1) * per_page).min(total_rows);
    let end = (start + per_page).min(total_rows);

    Page {
        rows: &view.rows[start..end],
        number,
        total_pages,
        first_row: if start < end { start + 1 } else { 0 },
        last_row: end,
        total_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_sample_at;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn table() -> Table {
        load_sample_at(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
    }

    fn ids(view: &View<'_>) -> Vec<String> {
        view.iter().map(|r| r.email_id.clone()).collect()
    }

    fn record(id: &str, priority: &str, status: &str, department: &str) -> EmailRecord {
        let mut rec = table().records()[0].clone();
        rec.email_id = id.to_string();
        rec.priority = Priority::parse(priority);
        rec.status = ResolutionStatus::parse(status);
        rec.department = department.to_string();
        rec
    }

    #[test]
    fn default_spec_keeps_everything_newest_first() {
        let table = table();
        let view = apply(&table, &QuerySpec::default());
        assert_eq!(view.len(), 10);
        // Received yesterday (j = 0) before the day before (j = 1), table order kept.
        assert_eq!(
            ids(&view),
            ["E1001", "E1003", "E1005", "E1007", "E1009", "E1002", "E1004", "E1006", "E1008", "E1010"]
        );
    }

    #[test]
    fn mailbox_filter_is_exact() {
        let table = table();
        let spec = QuerySpec {
            mailbox: MailboxFilter::Only("sales@vipbusinesscredit.com".into()),
            ..QuerySpec::default()
        };
        let view = apply(&table, &spec);
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.department == "Sales"));
    }

    #[test]
    fn filter_sets_combine_with_and() {
        let table = table();
        let spec = QuerySpec {
            priorities: [Priority::Medium].into(),
            departments: ["HR".to_string(), "Billing".to_string()].into(),
            sort_key: SortKey::EmailId,
            direction: SortDirection::Ascending,
            ..QuerySpec::default()
        };
        assert_eq!(ids(&apply(&table, &spec)), ["E1006", "E1008"]);
    }

    #[test]
    fn status_filter() {
        let table = table();
        let spec = QuerySpec {
            statuses: [ResolutionStatus::Completed].into(),
            ..QuerySpec::default()
        };
        let view = apply(&table, &spec);
        assert_eq!(view.len(), 5);
        assert!(view.iter().all(|r| r.is_sent()));
    }

    #[test]
    fn search_is_case_insensitive_over_subject_and_summary() {
        let table = table();
        let mut spec = QuerySpec {
            search: Some("PAYMENT".into()),
            ..QuerySpec::default()
        };
        assert_eq!(ids(&apply(&table, &spec)), ["E1001"]);

        // "onboarding" only appears in a subject and a summary of the same email.
        spec.search = Some("onboarding".into());
        assert_eq!(ids(&apply(&table, &spec)), ["E1008"]);

        // Only in a summary.
        spec.search = Some("gateway".into());
        assert_eq!(ids(&apply(&table, &spec)), ["E1001"]);

        spec.search = Some(String::new());
        assert_eq!(apply(&table, &spec).len(), 10);
    }

    #[test]
    fn priority_sort_uses_rank_not_lexical_order() {
        let records = vec![
            record("a", "Low", "Pending", "X"),
            record("b", "High", "Pending", "X"),
            record("c", "Medium", "Pending", "X"),
            record("d", "Critical", "Pending", "X"),
        ];
        let table = Table::from_records(records);
        let mut spec = QuerySpec {
            sort_key: SortKey::Priority,
            direction: SortDirection::Descending,
            ..QuerySpec::default()
        };
        assert_eq!(ids(&apply(&table, &spec)), ["b", "c", "a", "d"]);
        spec.direction = SortDirection::Ascending;
        assert_eq!(ids(&apply(&table, &spec)), ["d", "a", "c", "b"]);
    }

    #[test]
    fn descending_keeps_ties_in_table_order() {
        let records = vec![
            record("1", "High", "Pending", "X"),
            record("2", "Low", "Pending", "X"),
            record("3", "High", "Pending", "X"),
            record("4", "Low", "Pending", "X"),
        ];
        let table = Table::from_records(records);
        let spec = QuerySpec {
            sort_key: SortKey::Priority,
            ..QuerySpec::default()
        };
        assert_eq!(ids(&apply(&table, &spec)), ["1", "3", "2", "4"]);
    }

    #[test]
    fn unknown_status_sorts_by_its_text() {
        let records = vec![
            record("1", "High", "Pending", "X"),
            record("2", "High", "Escalated", "X"),
            record("3", "High", "Completed", "X"),
        ];
        let table = Table::from_records(records);
        let spec = QuerySpec {
            sort_key: SortKey::Status,
            direction: SortDirection::Ascending,
            ..QuerySpec::default()
        };
        assert_eq!(ids(&apply(&table, &spec)), ["3", "2", "1"]);
    }

    #[test]
    fn unknown_mailbox_gives_an_empty_view() {
        let table = table();
        let spec = QuerySpec {
            mailbox: MailboxFilter::Only("nobody@example.com".into()),
            ..QuerySpec::default()
        };
        let view = apply(&table, &spec);
        assert!(view.is_empty());
        assert_eq!(paginate(&view, PageSize::Rows(10), 3).total_pages, 1);
    }

    #[test]
    fn groups_by_mailbox_in_sorted_order() {
        let table = table();
        let view = apply(&table, &QuerySpec::default());
        let groups = group_by_mailbox(&view);
        let names: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(names[0], "billing@vipbusinesscredit.com");
        assert_eq!(names[4], "support@vipbusinesscredit.com");
        assert_eq!(ids(&groups["support@vipbusinesscredit.com"]), ["E1001", "E1002"]);
    }

    #[test]
    fn pages_slice_and_clamp() {
        let table = table();
        let view = View::all(&table);

        let page = paginate(&view, PageSize::Rows(4), 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!((page.first_row, page.last_row), (9, 10));
        assert_eq!(page.rows.len(), 2);

        let page = paginate(&view, PageSize::Rows(4), 99);
        assert_eq!(page.number, 3);

        let page = paginate(&view, PageSize::Rows(4), 0);
        assert_eq!(page.number, 1);
        assert_eq!(page.rows[0].email_id, "E1001");

        let page = paginate(&view, PageSize::All, 2);
        assert_eq!((page.number, page.total_pages, page.rows.len()), (1, 1, 10));
    }

    #[test]
    fn find_by_id_and_refine() {
        let table = table();
        let view = View::all(&table);
        assert_eq!(view.find_by_id("E1004").map(|r| r.department.as_str()), Some("Sales"));
        assert!(view.find_by_id("E42").is_none());

        let spec = QuerySpec {
            priorities: [Priority::High].into(),
            ..QuerySpec::default()
        };
        assert_eq!(view.refine(&spec), apply(&table, &spec));
    }

    #[test]
    fn has_filters_ignores_sort() {
        let mut spec = QuerySpec {
            sort_key: SortKey::EmailId,
            ..QuerySpec::default()
        };
        assert!(!spec.has_filters());
        spec.search = Some("x".into());
        assert!(spec.has_filters());
    }

    // -- Properties --

    fn arb_record() -> impl Strategy<Value = EmailRecord> {
        (
            prop::sample::select(vec!["High", "Medium", "Low", "Urgent"]),
            prop::sample::select(vec!["Pending", "In Progress", "Completed", "Odd"]),
            prop::sample::select(vec!["Support", "Sales", "HR"]),
            prop::sample::select(vec!["a@x.com", "b@x.com"]),
            0u32..20,
        )
            .prop_map(|(priority, status, department, mailbox, day)| {
                let mut rec = record("", priority, status, department);
                rec.mailbox = mailbox.to_string();
                rec.received_date = NaiveDate::from_ymd_opt(2024, 1, 1 + day);
                rec
            })
    }

    fn arb_table() -> impl Strategy<Value = Table> {
        prop::collection::vec(arb_record(), 0..40).prop_map(|mut records| {
            for (i, rec) in records.iter_mut().enumerate() {
                rec.email_id = format!("E{i:03}");
            }
            Table::from_records(records)
        })
    }

    fn arb_sort() -> impl Strategy<Value = (SortKey, SortDirection)> {
        (
            prop::sample::select(SortKey::ALL.to_vec()),
            prop::bool::ANY.prop_map(|asc| {
                if asc {
                    SortDirection::Ascending
                } else {
                    SortDirection::Descending
                }
            }),
        )
    }

    fn arb_spec() -> impl Strategy<Value = QuerySpec> {
        (
            arb_sort(),
            prop::option::of(prop::sample::select(vec!["a@x.com", "b@x.com", "c@x.com"])),
            prop::collection::btree_set(
                prop::sample::select(vec!["High", "Medium", "Low", "Urgent"]),
                0..3,
            ),
            prop::collection::btree_set(prop::sample::select(vec!["Support", "Sales"]), 0..2),
        )
            .prop_map(|((sort_key, direction), mailbox, priorities, departments)| QuerySpec {
                mailbox: mailbox.map_or(MailboxFilter::All, |m| MailboxFilter::Only(m.into())),
                priorities: priorities.into_iter().map(Priority::parse).collect(),
                departments: departments.into_iter().map(String::from).collect(),
                sort_key,
                direction,
                ..QuerySpec::default()
            })
    }

    proptest! {
        #[test]
        fn empty_filters_return_a_permutation(table in arb_table(), (sort_key, direction) in arb_sort()) {
            let spec = QuerySpec { sort_key, direction, ..QuerySpec::default() };
            let view = apply(&table, &spec);
            let mut got: Vec<&str> = view.iter().map(|r| r.email_id.as_str()).collect();
            let mut want: Vec<&str> = table.iter().map(|r| r.email_id.as_str()).collect();
            got.sort_unstable();
            want.sort_unstable();
            prop_assert_eq!(got, want);
        }

        #[test]
        fn applying_twice_changes_nothing(table in arb_table(), spec in arb_spec()) {
            let once = apply(&table, &spec);
            let twice = once.refine(&spec);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn every_kept_row_matches(table in arb_table(), spec in arb_spec()) {
            let view = apply(&table, &spec);
            prop_assert!(view.iter().all(|r| spec.matches(r)));
            prop_assert_eq!(view.len(), table.iter().filter(|r| spec.matches(r)).count());
        }

        #[test]
        fn priority_descending_is_ranked_and_stable(table in arb_table()) {
            let spec = QuerySpec { sort_key: SortKey::Priority, ..QuerySpec::default() };
            let view = apply(&table, &spec);
            for pair in view.rows().windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(a.priority.rank() >= b.priority.rank());
                if a.priority.rank() == b.priority.rank() {
                    // Ids were assigned in table order.
                    prop_assert!(a.email_id < b.email_id);
                }
            }
        }
    }
}
