use chrono::{Days, NaiveDate};

use super::model::{EmailRecord, Flag, Priority, ResolutionStatus};

// ---------------------------------------------------------------------------
// Built-in demo dataset
// ---------------------------------------------------------------------------

pub const SAMPLE_MAILBOXES: [&str; 5] = [
    "support@vipbusinesscredit.com",
    "sales@vipbusinesscredit.com",
    "billing@vipbusinesscredit.com",
    "hr@vipbusinesscredit.com",
    "info@vipbusinesscredit.com",
];

/// Emails generated per mailbox.
pub const EMAILS_PER_MAILBOX: usize = 2;

const FIRST_EMAIL_NUMBER: usize = 1001;

const SUBJECTS: [&str; 10] = [
    "Urgent: Payment processing issue needs immediate attention",
    "Follow-up on credit application status inquiry",
    "Request for documentation update and verification",
    "Complaint about service delays and resolution needed",
    "New partnership opportunity discussion",
    "Account verification and security update required",
    "Invoice discrepancy needs clarification",
    "Employee onboarding documentation request",
    "Product demo scheduling and requirements",
    "Technical support for platform integration",
];

const SUMMARIES: [&str; 10] = [
    "Customer experiencing payment gateway errors affecting multiple transactions",
    "Applicant requesting status update on business credit application submitted last week",
    "Client needs to update business documentation for compliance review",
    "Frustrated customer complaining about 3-day service delay, requesting manager escalation",
    "Potential partner proposing strategic alliance for mutual growth opportunities",
    "Security team requesting account verification due to suspicious login attempts",
    "Billing discrepancy of $1,500 requires investigation and correction",
    "New hire needs access credentials and onboarding materials",
    "Prospect interested in product demo and pricing information",
    "Integration issues with API causing data sync problems",
];

fn department_for(mailbox: &str) -> &'static str {
    if mailbox.contains("support") {
        "Support"
    } else if mailbox.contains("sales") {
        "Sales"
    } else if mailbox.contains("billing") {
        "Billing"
    } else if mailbox.contains("hr") {
        "HR"
    } else {
        "General"
    }
}

/// Build the demo records with dates relative to `today`.
///
/// Record `j` of each mailbox was received `j + 1` days ago; the first one is
/// high priority, approved, sent and completed, the second is medium priority,
/// in progress and carries attachments.
pub fn sample_records(today: NaiveDate) -> Vec<EmailRecord> {
    let follow_up_due = today.checked_add_days(Days::new(3));
    let mut records = Vec::with_capacity(SAMPLE_MAILBOXES.len() * EMAILS_PER_MAILBOX);
    let mut number = FIRST_EMAIL_NUMBER;

    for (i, mailbox) in SAMPLE_MAILBOXES.iter().enumerate() {
        for j in 0..EMAILS_PER_MAILBOX {
            let idx = (i * EMAILS_PER_MAILBOX + j) % SUBJECTS.len();
            let subject = SUBJECTS[idx];
            let received_date = today.checked_sub_days(Days::new(j as u64 + 1));
            let first = j == 0;
            let subject_head: String = subject.chars().take(30).collect();

            records.push(EmailRecord {
                mailbox: (*mailbox).to_string(),
                email_id: format!("E{number}"),
                received_date,
                received_time: format!("{}:{:02}", 9 + j, 15 + j * 5),
                sender_name: format!("Contact Person {number}"),
                sender_email: format!("contact{number}@company{}.com", i + 1),
                subject: subject.to_string(),
                department: department_for(mailbox).to_string(),
                priority: Priority::KNOWN[j % 3].clone(),
                category: match j {
                    0 => "Urgent",
                    1 => "Follow-up",
                    _ => "Inquiry",
                }
                .to_string(),
                summary: SUMMARIES[idx].to_string(),
                drafted_response: format!(
                    "Thank you for contacting us regarding '{subject_head}...'. We have reviewed \
                     your inquiry and will provide a comprehensive response within 24 hours."
                ),
                response_approved: Flag::from(first),
                approver: if first { "Manager Smith".into() } else { String::new() },
                sent: Flag::from(first),
                sent_date: if first { received_date } else { None },
                sent_time: if first { format!("{}:30", 10 + j) } else { String::new() },
                sent_summary: if first {
                    "Professional response sent addressing all customer concerns".into()
                } else {
                    String::new()
                },
                attachments_received: Flag::from(j == 1),
                attachment_details: if j == 1 {
                    "contract.pdf, invoice.xlsx".into()
                } else {
                    String::new()
                },
                follow_up_required: Flag::from(j % 2 == 0),
                follow_up_due: if j % 2 == 0 { follow_up_due } else { None },
                assignee: format!("Agent_{}", i + 1),
                status: if first {
                    ResolutionStatus::Completed
                } else {
                    ResolutionStatus::InProgress
                },
                notes: if first {
                    "High priority case - escalate if no response within 24 hours".into()
                } else {
                    "Standard processing".into()
                },
            });
            number += 1;
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn ten_records_two_per_mailbox() {
        let records = sample_records(today());
        assert_eq!(records.len(), 10);
        for mailbox in SAMPLE_MAILBOXES {
            assert_eq!(records.iter().filter(|r| r.mailbox == mailbox).count(), 2);
        }
    }

    #[test]
    fn ids_are_unique_and_sequential() {
        let ids: Vec<String> = sample_records(today()).into_iter().map(|r| r.email_id).collect();
        assert_eq!(ids.first().map(String::as_str), Some("E1001"));
        assert_eq!(ids.last().map(String::as_str), Some("E1010"));
        let unique: std::collections::BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn dates_are_relative_to_today() {
        let records = sample_records(today());
        assert_eq!(records[0].received_date, NaiveDate::from_ymd_opt(2024, 5, 9));
        assert_eq!(records[1].received_date, NaiveDate::from_ymd_opt(2024, 5, 8));
        assert_eq!(records[0].follow_up_due, NaiveDate::from_ymd_opt(2024, 5, 13));
        assert_eq!(records[1].follow_up_due, None);
        assert_eq!(records[0].sent_date, records[0].received_date);
    }

    #[test]
    fn departments_follow_mailbox() {
        let depts: Vec<String> = sample_records(today())
            .into_iter()
            .step_by(2)
            .map(|r| r.department)
            .collect();
        assert_eq!(depts, ["Support", "Sales", "Billing", "HR", "General"]);
    }

    #[test]
    fn drafted_response_quotes_subject_head() {
        let rec = &sample_records(today())[0];
        assert!(rec
            .drafted_response
            .starts_with("Thank you for contacting us regarding 'Urgent: Payment processing iss...'"));
        assert_eq!(rec.received_time, "9:15");
        assert_eq!(sample_records(today())[1].received_time, "10:20");
    }
}
