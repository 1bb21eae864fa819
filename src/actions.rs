//! Simulated workflow actions. They acknowledge the request and log it; the
//! table is never changed.

use std::fmt;

use crate::data::model::EmailRecord;
use crate::data::query::View;

/// Per-email action offered in the details viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickAction {
    ApproveResponse,
    SendEmail,
    RequestFollowUp,
    AddNote(String),
}

impl QuickAction {
    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::ApproveResponse => "Approve Response",
            QuickAction::SendEmail => "Send Email",
            QuickAction::RequestFollowUp => "Request Follow-up",
            QuickAction::AddNote(_) => "Add Note",
        }
    }

    /// Run the action against `email` and return the acknowledgement.
    pub fn perform(&self, email: &EmailRecord) -> Acknowledgement {
        let message = match self {
            QuickAction::ApproveResponse => "Response approved!",
            QuickAction::SendEmail => "Email sent successfully!",
            QuickAction::RequestFollowUp => "Follow-up scheduled!",
            QuickAction::AddNote(note) => {
                log::info!("Note on {}: {note}", email.email_id);
                "Note added!"
            }
        };
        log::info!("{} on {}", self.label(), email.email_id);
        Acknowledgement {
            message: message.to_string(),
            affected: 1,
        }
    }
}

/// Action applied to every email of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    MarkAllRead,
    GenerateBulkResponses,
}

impl BulkAction {
    pub const ALL: [BulkAction; 2] = [BulkAction::MarkAllRead, BulkAction::GenerateBulkResponses];

    pub fn label(self) -> &'static str {
        match self {
            BulkAction::MarkAllRead => "Mark All as Read",
            BulkAction::GenerateBulkResponses => "Generate Bulk Responses",
        }
    }

    pub fn perform(self, view: &View<'_>) -> Acknowledgement {
        let message = match self {
            BulkAction::MarkAllRead => "All emails marked as read!",
            BulkAction::GenerateBulkResponses => "Bulk responses generated!",
        };
        log::info!("{} on {} emails", self.label(), view.len());
        Acknowledgement {
            message: message.to_string(),
            affected: view.len(),
        }
    }
}

/// What the UI shows after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: String,
    pub affected: usize,
}

impl fmt::Display for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_sample_at;
    use chrono::NaiveDate;

    fn table() -> crate::data::model::Table {
        load_sample_at(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
    }

    #[test]
    fn quick_actions_acknowledge() {
        let table = table();
        let email = &table.records()[0];
        let cases = [
            (QuickAction::ApproveResponse, "Response approved!"),
            (QuickAction::SendEmail, "Email sent successfully!"),
            (QuickAction::RequestFollowUp, "Follow-up scheduled!"),
            (QuickAction::AddNote("call back".into()), "Note added!"),
        ];
        for (action, expected) in cases {
            let ack = action.perform(email);
            assert_eq!(ack.to_string(), expected);
            assert_eq!(ack.affected, 1);
        }
    }

    #[test]
    fn bulk_actions_leave_the_table_alone() {
        let table = table();
        let before = table.records().to_vec();
        let view = View::all(&table);
        assert_eq!(
            BulkAction::MarkAllRead.perform(&view).message,
            "All emails marked as read!"
        );
        let ack = BulkAction::GenerateBulkResponses.perform(&view);
        assert_eq!(ack.message, "Bulk responses generated!");
        assert_eq!(ack.affected, 10);
        assert_eq!(table.records(), before.as_slice());
    }
}
