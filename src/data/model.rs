use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Canonical column order of the tracking sheet. Exports, imports and the
/// serde names on [`EmailRecord`] all follow this order.
pub const FIELD_NAMES: [&str; 25] = [
    "Company Main Email",
    "Email ID",
    "Received Date",
    "Received Time",
    "From (Sender Name)",
    "From (Sender Email)",
    "Subject",
    "Department",
    "Priority",
    "Category/Tag",
    "Email Summary",
    "Drafted Response",
    "Response Approved (Y/N)",
    "Approver Name",
    "Sent (Y/N)",
    "Sent Date",
    "Sent Time",
    "Sent Email Summary",
    "Attachments Received (Y/N)",
    "Attachment Details",
    "Follow-up Required (Y/N)",
    "Follow-up Due Date",
    "Assigned To",
    "Resolution Status",
    "Notes/Comments",
];

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Triage urgency. Values outside the known three are kept verbatim so a
/// hand-edited sheet still loads, sorts and renders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub const KNOWN: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn parse(s: &str) -> Self {
        match s {
            "High" => Priority::High,
            "Medium" => Priority::Medium,
            "Low" => Priority::Low,
            other => Priority::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Other(s) => s,
        }
    }

    /// Sort rank: High=3, Medium=2, Low=1, anything else 0.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
            Priority::Other(_) => 0,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Priority::parse(&s)
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResolutionStatus
// ---------------------------------------------------------------------------

/// Workflow state of an email. Unknown states group under their literal text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResolutionStatus {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl ResolutionStatus {
    pub const KNOWN: [ResolutionStatus; 3] = [
        ResolutionStatus::Pending,
        ResolutionStatus::InProgress,
        ResolutionStatus::Completed,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "Pending" => ResolutionStatus::Pending,
            "In Progress" => ResolutionStatus::InProgress,
            "Completed" => ResolutionStatus::Completed,
            other => ResolutionStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResolutionStatus::Pending => "Pending",
            ResolutionStatus::InProgress => "In Progress",
            ResolutionStatus::Completed => "Completed",
            ResolutionStatus::Other(s) => s,
        }
    }
}

impl From<String> for ResolutionStatus {
    fn from(s: String) -> Self {
        ResolutionStatus::parse(&s)
    }
}

impl From<ResolutionStatus> for String {
    fn from(s: ResolutionStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Flag – a Y/N cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Flag {
    Yes,
    #[default]
    No,
}

impl Flag {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "Y" => Ok(Flag::Yes),
            "N" => Ok(Flag::No),
            other => Err(format!("expected 'Y' or 'N', got '{other}'")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Yes => "Y",
            Flag::No => "N",
        }
    }

    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        if b {
            Flag::Yes
        } else {
            Flag::No
        }
    }
}

impl TryFrom<String> for Flag {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Flag::parse(&s)
    }
}

impl From<Flag> for String {
    fn from(f: Flag) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Date cells
// ---------------------------------------------------------------------------

/// `YYYY-MM-DD` or empty.
pub mod date_cell {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Result<Option<NaiveDate>, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, FORMAT)
            .map(Some)
            .map_err(|e| format!("'{raw}' is not a YYYY-MM-DD date ({e})"))
    }

    pub fn format(date: Option<NaiveDate>) -> String {
        date.map(|d| d.format(FORMAT).to_string())
            .unwrap_or_default()
    }

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.collect_str(&d.format(FORMAT)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// EmailRecord – one row of the tracking sheet
// ---------------------------------------------------------------------------

/// One tracked email. Field order matches [`FIELD_NAMES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(rename = "Company Main Email")]
    pub mailbox: String,
    #[serde(rename = "Email ID")]
    pub email_id: String,
    #[serde(rename = "Received Date", with = "date_cell")]
    pub received_date: Option<NaiveDate>,
    #[serde(rename = "Received Time")]
    pub received_time: String,
    #[serde(rename = "From (Sender Name)")]
    pub sender_name: String,
    #[serde(rename = "From (Sender Email)")]
    pub sender_email: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Priority")]
    pub priority: Priority,
    #[serde(rename = "Category/Tag")]
    pub category: String,
    #[serde(rename = "Email Summary")]
    pub summary: String,
    #[serde(rename = "Drafted Response")]
    pub drafted_response: String,
    #[serde(rename = "Response Approved (Y/N)")]
    pub response_approved: Flag,
    #[serde(rename = "Approver Name")]
    pub approver: String,
    #[serde(rename = "Sent (Y/N)")]
    pub sent: Flag,
    #[serde(rename = "Sent Date", with = "date_cell")]
    pub sent_date: Option<NaiveDate>,
    #[serde(rename = "Sent Time")]
    pub sent_time: String,
    #[serde(rename = "Sent Email Summary")]
    pub sent_summary: String,
    #[serde(rename = "Attachments Received (Y/N)")]
    pub attachments_received: Flag,
    #[serde(rename = "Attachment Details")]
    pub attachment_details: String,
    #[serde(rename = "Follow-up Required (Y/N)")]
    pub follow_up_required: Flag,
    #[serde(rename = "Follow-up Due Date", with = "date_cell")]
    pub follow_up_due: Option<NaiveDate>,
    #[serde(rename = "Assigned To")]
    pub assignee: String,
    #[serde(rename = "Resolution Status")]
    pub status: ResolutionStatus,
    #[serde(rename = "Notes/Comments")]
    pub notes: String,
}

impl EmailRecord {
    /// Cell text for a canonical column name, as it would appear in an export.
    pub fn cell(&self, column: &str) -> Option<String> {
        let value = match column {
            "Company Main Email" => self.mailbox.clone(),
            "Email ID" => self.email_id.clone(),
            "Received Date" => date_cell::format(self.received_date),
            "Received Time" => self.received_time.clone(),
            "From (Sender Name)" => self.sender_name.clone(),
            "From (Sender Email)" => self.sender_email.clone(),
            "Subject" => self.subject.clone(),
            "Department" => self.department.clone(),
            "Priority" => self.priority.to_string(),
            "Category/Tag" => self.category.clone(),
            "Email Summary" => self.summary.clone(),
            "Drafted Response" => self.drafted_response.clone(),
            "Response Approved (Y/N)" => self.response_approved.to_string(),
            "Approver Name" => self.approver.clone(),
            "Sent (Y/N)" => self.sent.to_string(),
            "Sent Date" => date_cell::format(self.sent_date),
            "Sent Time" => self.sent_time.clone(),
            "Sent Email Summary" => self.sent_summary.clone(),
            "Attachments Received (Y/N)" => self.attachments_received.to_string(),
            "Attachment Details" => self.attachment_details.clone(),
            "Follow-up Required (Y/N)" => self.follow_up_required.to_string(),
            "Follow-up Due Date" => date_cell::format(self.follow_up_due),
            "Assigned To" => self.assignee.clone(),
            "Resolution Status" => self.status.to_string(),
            "Notes/Comments" => self.notes.clone(),
            _ => return None,
        };
        Some(value)
    }

    pub fn is_sent(&self) -> bool {
        self.sent.is_yes()
    }

    pub fn is_pending(&self) -> bool {
        self.status == ResolutionStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Sorted distinct values offered by the filter widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub mailboxes: BTreeSet<String>,
    pub priorities: BTreeSet<Priority>,
    pub statuses: BTreeSet<ResolutionStatus>,
    pub departments: BTreeSet<String>,
}

/// The loaded dataset. Replaced wholesale on reload, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<EmailRecord>,
    options: FilterOptions,
}

impl Table {
    /// Build the filter option index from the loaded records.
    pub fn from_records(records: Vec<EmailRecord>) -> Self {
        let mut options = FilterOptions::default();
        for rec in &records {
            options.mailboxes.insert(rec.mailbox.clone());
            options.priorities.insert(rec.priority.clone());
            options.statuses.insert(rec.status.clone());
            options.departments.insert(rec.department.clone());
        }
        Table { records, options }
    }

    pub fn records(&self) -> &[EmailRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmailRecord> {
        self.records.iter()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
