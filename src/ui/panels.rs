use chrono::Local;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use mail_triage::actions::BulkAction;
use mail_triage::data::query::{MailboxFilter, SortDirection, SortKey};
use mail_triage::export::{
    analytics_file_name, complete_file_name, filter_summary_file_name, to_csv, to_json,
    AnalyticsReport,
};
use mail_triage::state::{AppState, Origin};

use crate::app::{MailTriageApp, SourceKind, ViewMode};
use crate::color;
use crate::ui::save_export;

// ---------------------------------------------------------------------------
// Left side panel – connection and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, app: &mut MailTriageApp) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            connection_section(ui, app);
            ui.separator();
            filter_section(ui, app);
            ui.separator();
            display_section(ui, app);
        });
}

fn connection_section(ui: &mut Ui, app: &mut MailTriageApp) {
    ui.heading("Google Sheets");

    if let Some(key) = &app.state.credentials {
        ui.label(RichText::new(format!("Key: {}", key.client_email)).small());
    } else {
        ui.label(RichText::new("No credentials loaded").small().weak());
    }
    if ui.button("Upload credentials…").clicked() {
        upload_credentials(&mut app.state);
    }

    ui.add_space(4.0);
    ui.label("Sheet URL");
    ui.text_edit_singleline(&mut app.inputs.sheet_url);
    ui.label("Worksheet");
    ui.text_edit_singleline(&mut app.inputs.worksheet);

    ui.horizontal(|ui: &mut Ui| {
        let can_connect =
            app.state.credentials.is_some() && !app.inputs.sheet_url.trim().is_empty();
        if ui
            .add_enabled(can_connect, egui::Button::new("Connect"))
            .clicked()
        {
            let locator = app.inputs.sheet_url.trim().to_string();
            // Errors are already in the status line.
            let _ = app.connect(SourceKind::Sheets, locator);
        }
        if ui.button("Refresh").clicked() {
            let _ = app.refresh();
        }
    });

    if app.state.is_connected() {
        ui.checkbox(&mut app.auto_refresh, "Auto-refresh").on_hover_text(format!(
            "Every {} s",
            app.config.auto_refresh_interval().as_secs()
        ));
    }
}

fn filter_section(ui: &mut Ui, app: &mut MailTriageApp) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        if ui.small_button("Clear").clicked() {
            app.state.clear_filters();
            app.view.search_input.clear();
            app.view.page = 1;
        }
    });

    // Clone what we need so we can mutate state inside the loop.
    let options = app.state.table.options().clone();
    let before = app.state.query.clone();

    ui.strong("Mailbox");
    let current = match &app.state.query.mailbox {
        MailboxFilter::All => "All mailboxes".to_string(),
        MailboxFilter::Only(m) => m.clone(),
    };
    egui::ComboBox::from_id_salt("mailbox_filter")
        .selected_text(current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui
                .selectable_label(app.state.query.mailbox == MailboxFilter::All, "All mailboxes")
                .clicked()
            {
                app.state.set_mailbox(MailboxFilter::All);
            }
            for m in &options.mailboxes {
                let only = MailboxFilter::Only(m.clone());
                if ui
                    .selectable_label(app.state.query.mailbox == only, m.as_str())
                    .clicked()
                {
                    app.state.set_mailbox(only);
                }
            }
        });

    let n = app.state.query.priorities.len();
    egui::CollapsingHeader::new(
        RichText::new(format!("Priority  ({n}/{})", options.priorities.len())).strong(),
    )
    .id_salt("priority_filter")
    .default_open(true)
    .show(ui, |ui: &mut Ui| {
        for p in &options.priorities {
            let mut checked = app.state.query.priorities.contains(p);
            let text = RichText::new(p.as_str()).color(color::priority_color(p));
            if ui.checkbox(&mut checked, text).changed() {
                app.state.toggle_priority(p);
            }
        }
    });

    let status_colors = color::StatusColors::new(&options.statuses);
    let n = app.state.query.statuses.len();
    egui::CollapsingHeader::new(
        RichText::new(format!("Status  ({n}/{})", options.statuses.len())).strong(),
    )
    .id_salt("status_filter")
    .default_open(true)
    .show(ui, |ui: &mut Ui| {
        for s in &options.statuses {
            let mut checked = app.state.query.statuses.contains(s);
            let text = RichText::new(s.as_str()).color(status_colors.color_for(s));
            if ui.checkbox(&mut checked, text).changed() {
                app.state.toggle_status(s);
            }
        }
    });

    let n = app.state.query.departments.len();
    egui::CollapsingHeader::new(
        RichText::new(format!("Department  ({n}/{})", options.departments.len())).strong(),
    )
    .id_salt("department_filter")
    .default_open(false)
    .show(ui, |ui: &mut Ui| {
        for d in &options.departments {
            let mut checked = app.state.query.departments.contains(d);
            if ui.checkbox(&mut checked, d.as_str()).changed() {
                app.state.toggle_department(d);
            }
        }
    });

    if app.state.query != before {
        app.view.page = 1;
    }
}

fn display_section(ui: &mut Ui, app: &mut MailTriageApp) {
    ui.heading("Display");

    ui.strong("Sort by");
    egui::ComboBox::from_id_salt("sort_key")
        .selected_text(app.state.query.sort_key.label())
        .show_ui(ui, |ui: &mut Ui| {
            for key in SortKey::ALL {
                ui.selectable_value(&mut app.state.query.sort_key, key, key.label());
            }
        });
    ui.horizontal(|ui: &mut Ui| {
        for dir in [SortDirection::Descending, SortDirection::Ascending] {
            ui.radio_value(&mut app.state.query.direction, dir, dir.label());
        }
    });

    ui.strong("View");
    ui.horizontal(|ui: &mut Ui| {
        for mode in ViewMode::ALL {
            ui.radio_value(&mut app.view.mode, mode, mode.label());
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut MailTriageApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload credentials…").clicked() {
                upload_credentials(&mut app.state);
                ui.close_menu();
            }
            if ui.button("Open exported sheet…").clicked() {
                open_file_dialog(app);
                ui.close_menu();
            }
            if ui.button("Use sample data").clicked() {
                app.reload_sample();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} emails loaded, {} visible",
            app.state.table.len(),
            app.state.view().len()
        ));

        if let Some(msg) = &app.state.status_message {
            ui.separator();
            let c = if msg.starts_with("Error") {
                Color32::RED
            } else {
                color::COMPLETED
            };
            ui.label(RichText::new(msg).color(c));
        }
    });
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

pub fn footer(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        match &state.origin {
            Origin::Sample => ui.label("Using sample data"),
            Origin::External(name) => ui.label(format!("Connected to {name}")),
        };
        ui.separator();
        ui.label(format!(
            "Last updated {}",
            state.loaded_at.format("%Y-%m-%d %H:%M:%S")
        ));
        if !state.quarantined.is_empty() {
            ui.separator();
            let detail: Vec<String> = state
                .quarantined
                .iter()
                .map(|r| format!("row {} ({}): {}", r.row, r.email_id, r.reason))
                .collect();
            ui.label(
                RichText::new(format!("{} rows skipped", state.quarantined.len()))
                    .color(color::IN_PROGRESS),
            )
            .on_hover_text(detail.join("\n"));
        }
    });
}

// ---------------------------------------------------------------------------
// Search, bulk actions and complete-dataset exports
// ---------------------------------------------------------------------------

pub fn search_and_actions(ui: &mut Ui, app: &mut MailTriageApp) {
    ui.heading("Search & Actions");

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search subject / summary:");
        if ui
            .text_edit_singleline(&mut app.view.search_input)
            .changed()
        {
            app.state.set_search(&app.view.search_input);
            app.view.page = 1;
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        for action in BulkAction::ALL {
            if ui.button(action.label()).clicked() {
                let ack = action.perform(&app.state.view());
                app.state.status_message = Some(ack.message);
            }
        }
    });

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        let now = Local::now().naive_local();
        let mut pending = None;
        {
            let view = app.state.view();
            if ui.button("Export CSV").clicked() {
                pending = Some((complete_file_name(now, "csv"), to_csv(&view)));
            }
            if ui.button("Export JSON").clicked() {
                pending = Some((complete_file_name(now, "json"), to_json(&view)));
            }
            if ui.button("Export analytics").clicked() {
                pending = Some((analytics_file_name(now), AnalyticsReport::of(&view).to_json()));
            }
        }
        if ui.button("Export filter summary").clicked() {
            pending = Some((filter_summary_file_name(now), app.state.filter_summary().to_json()));
        }
        if let Some((name, bytes)) = pending {
            let dir = app.config.resolve_export_dir();
            save_export(&mut app.state, &dir, &name, bytes);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn upload_credentials(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Service account key")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match std::fs::read(&path) {
            Ok(bytes) => {
                // Outcome is reported through the status line.
                let _ = state.load_credentials(&bytes);
            }
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn open_file_dialog(app: &mut MailTriageApp) {
    let file = rfd::FileDialog::new()
        .set_title("Open exported tracking sheet")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let locator = path.to_string_lossy().into_owned();
        if let Err(e) = app.connect(SourceKind::File, locator) {
            log::error!("Failed to load file: {e}");
        }
    }
}
