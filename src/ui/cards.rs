use chrono::Local;
use eframe::egui::{self, Color32, RichText, Stroke, Ui};

use mail_triage::actions::{Acknowledgement, QuickAction};
use mail_triage::data::aggregate::Metrics;
use mail_triage::data::model::{EmailRecord, FIELD_NAMES};
use mail_triage::data::query::{group_by_mailbox, View};
use mail_triage::export::{mailbox_file_name, to_csv, to_json};
use mail_triage::state::AppState;

use crate::app::MailTriageApp;
use crate::color::{self, StatusColors};
use crate::ui::{save_export, table, truncate};

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String, accent: Color32) {
    egui::Frame::group(ui.style())
        .stroke(Stroke::new(1.5, accent))
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui: &mut Ui| {
            ui.set_min_width(140.0);
            ui.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(label).small());
                ui.label(RichText::new(value).size(24.0).strong().color(accent));
            });
        });
}

fn metric_cards(ui: &mut Ui, metrics: &Metrics) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        metric(ui, "Total Emails", metrics.total.to_string(), Color32::LIGHT_BLUE);
        metric(ui, "Pending", metrics.pending.to_string(), color::PENDING);
        metric(ui, "High Priority", metrics.high_priority.to_string(), color::HIGH);
        metric(
            ui,
            "Response Rate",
            format!("{:.1}%", metrics.response_rate),
            color::COMPLETED,
        );
    });
}

/// Headline numbers for the current view.
pub fn metric_row(ui: &mut Ui, state: &AppState) {
    metric_cards(ui, &Metrics::of(&state.view()));
}

// ---------------------------------------------------------------------------
// Per-mailbox sections
// ---------------------------------------------------------------------------

/// One collapsible section per mailbox in the current view.
pub fn mailbox_sections(ui: &mut Ui, app: &mut MailTriageApp) {
    ui.heading("Mailboxes");

    let mut pending = None;
    {
        let view = app.state.view();
        if view.is_empty() {
            ui.label("No emails match the current filters.");
            return;
        }
        let status_colors = StatusColors::new(&app.state.table.options().statuses);
        let columns = app.view.ordered_columns();
        let mode = app.view.mode;
        let today = Local::now().date_naive();

        for (mailbox, group) in group_by_mailbox(&view) {
            let header = format!("📧 {mailbox}  ({} emails)", group.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt(mailbox)
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    metric_cards(ui, &Metrics::of(&group));
                    ui.add_space(4.0);

                    if mode.shows_cards() {
                        email_cards(ui, &group, &status_colors, &mut app.view.selected_email);
                    }
                    if mode.shows_table() {
                        table::email_table(ui, mailbox, group.rows(), &columns, &status_colors);
                    }

                    ui.horizontal(|ui: &mut Ui| {
                        if ui.button("Download CSV").clicked() {
                            pending = Some((mailbox_file_name(mailbox, today, "csv"), to_csv(&group)));
                        }
                        if ui.button("Download JSON").clicked() {
                            pending =
                                Some((mailbox_file_name(mailbox, today, "json"), to_json(&group)));
                        }
                    });
                });
        }
    }

    if let Some((name, bytes)) = pending {
        let dir = app.config.resolve_export_dir();
        save_export(&mut app.state, &dir, &name, bytes);
    }
}

fn email_cards(
    ui: &mut Ui,
    view: &View<'_>,
    status_colors: &StatusColors,
    selected: &mut Option<String>,
) {
    for rec in view.iter() {
        email_card(ui, rec, status_colors, selected);
    }
}

fn email_card(
    ui: &mut Ui,
    rec: &EmailRecord,
    status_colors: &StatusColors,
    selected: &mut Option<String>,
) {
    let accent = color::priority_color(&rec.priority);
    egui::Frame::group(ui.style())
        .stroke(Stroke::new(2.0, accent))
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui: &mut Ui| {
                ui.label(RichText::new(&rec.subject).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
                    if ui.small_button("Details").clicked() {
                        *selected = Some(rec.email_id.clone());
                    }
                    ui.label(
                        RichText::new(rec.status.as_str()).color(status_colors.color_for(&rec.status)),
                    );
                    ui.label(RichText::new(rec.priority.as_str()).color(accent).strong());
                });
            });
            ui.label(
                RichText::new(format!(
                    "{} · From {} <{}> · {} {} · {}",
                    rec.email_id,
                    rec.sender_name,
                    rec.sender_email,
                    rec.cell("Received Date").unwrap_or_default(),
                    rec.received_time,
                    rec.department
                ))
                .small(),
            );
            ui.label(truncate(&rec.summary, 140));
            if rec.is_sent() {
                ui.label(RichText::new("✔ Response sent").small().color(color::COMPLETED));
            } else if rec.follow_up_required.is_yes() {
                ui.label(RichText::new("⏰ Follow-up required").small().color(color::IN_PROGRESS));
            }
        });
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Email details viewer
// ---------------------------------------------------------------------------

/// Every field of one email plus the quick actions.
pub fn details(ui: &mut Ui, app: &mut MailTriageApp) {
    ui.heading("Email Details");

    let mut ack: Option<Acknowledgement> = None;
    {
        let view = app.state.view();
        let Some(first) = view.rows().first() else {
            ui.label("No emails match the current filters.");
            return;
        };
        let selected = app
            .view
            .selected_email
            .clone()
            .filter(|id| view.find_by_id(id).is_some())
            .unwrap_or_else(|| first.email_id.clone());

        egui::ComboBox::from_id_salt("details_email")
            .selected_text(&selected)
            .width(420.0)
            .show_ui(ui, |ui: &mut Ui| {
                for rec in view.iter() {
                    let label = format!("{} – {}", rec.email_id, truncate(&rec.subject, 50));
                    if ui.selectable_label(rec.email_id == selected, label).clicked() {
                        app.view.selected_email = Some(rec.email_id.clone());
                    }
                }
            });

        let Some(rec) = view.find_by_id(&selected) else {
            return;
        };

        egui::Grid::new("details_grid")
            .num_columns(2)
            .striped(true)
            .spacing([12.0, 4.0])
            .show(ui, |ui: &mut Ui| {
                for name in FIELD_NAMES {
                    ui.strong(name);
                    ui.label(rec.cell(name).unwrap_or_default());
                    ui.end_row();
                }
            });

        ui.add_space(6.0);
        ui.horizontal(|ui: &mut Ui| {
            for action in [
                QuickAction::ApproveResponse,
                QuickAction::SendEmail,
                QuickAction::RequestFollowUp,
            ] {
                if ui.button(action.label()).clicked() {
                    ack = Some(action.perform(rec));
                }
            }
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.text_edit_singleline(&mut app.view.note_input);
            let note = app.view.note_input.trim().to_string();
            if ui
                .add_enabled(!note.is_empty(), egui::Button::new("Add Note"))
                .clicked()
            {
                ack = Some(QuickAction::AddNote(note).perform(rec));
                app.view.note_input.clear();
            }
        });
    }

    if let Some(ack) = ack {
        app.state.status_message = Some(ack.message);
    }
}
