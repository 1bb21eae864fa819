use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use mail_triage::data::model::{EmailRecord, FIELD_NAMES};
use mail_triage::data::query::{paginate, PageSize};

use crate::app::MailTriageApp;
use crate::color::{self, StatusColors};
use crate::ui::truncate;

/// Columns shown until the user picks others.
pub const DEFAULT_COLUMNS: [&str; 8] = [
    "Company Main Email",
    "Email ID",
    "Received Date",
    "Subject",
    "Department",
    "Priority",
    "Assigned To",
    "Resolution Status",
];

const ROW_HEIGHT: f32 = 20.0;

/// Render `rows` with the given columns.
pub fn email_table(
    ui: &mut Ui,
    id_salt: &str,
    rows: &[&EmailRecord],
    columns: &[&str],
    status_colors: &StatusColors,
) {
    if columns.is_empty() {
        ui.label("No columns selected.");
        return;
    }
    ui.push_id(id_salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), columns.len())
            .header(ROW_HEIGHT, |mut header| {
                for name in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let rec = rows[row.index()];
                    for name in columns {
                        row.col(|ui: &mut Ui| {
                            let text = rec.cell(name).unwrap_or_default();
                            let rich = match *name {
                                "Priority" => RichText::new(text)
                                    .color(color::priority_color(&rec.priority)),
                                "Resolution Status" => RichText::new(text)
                                    .color(status_colors.color_for(&rec.status)),
                                _ => RichText::new(truncate(&text, 60)),
                            };
                            ui.label(rich);
                        });
                    }
                });
            });
    });
}

/// Paginated table over the whole current view, with column selection.
pub fn complete_table(ui: &mut Ui, app: &mut MailTriageApp) {
    ui.heading("Complete Email Data");

    egui::CollapsingHeader::new("Columns")
        .id_salt("column_picker")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    app.view.columns = FIELD_NAMES.iter().copied().collect();
                }
                if ui.small_button("Default").clicked() {
                    app.view.columns = DEFAULT_COLUMNS.iter().copied().collect();
                }
            });
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for name in FIELD_NAMES {
                    let mut shown = app.view.columns.contains(name);
                    if ui.checkbox(&mut shown, name).changed() {
                        if shown {
                            app.view.columns.insert(name);
                        } else {
                            app.view.columns.remove(name);
                        }
                    }
                }
            });
        });

    let view = app.state.view();
    let status_colors = StatusColors::new(&app.state.table.options().statuses);
    let columns = app.view.ordered_columns();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Rows per page");
        egui::ComboBox::from_id_salt("page_size")
            .selected_text(app.view.page_size.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for size in PageSize::CHOICES {
                    if ui
                        .selectable_value(&mut app.view.page_size, size, size.to_string())
                        .clicked()
                    {
                        app.view.page = 1;
                    }
                }
            });
    });

    let page = paginate(&view, app.view.page_size, app.view.page);
    app.view.page = page.number;

    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(page.number > 1, egui::Button::new("◀ Prev"))
            .clicked()
        {
            app.view.page = page.number - 1;
        }
        ui.label(format!("Page {} of {}", page.number, page.total_pages));
        if ui
            .add_enabled(page.number < page.total_pages, egui::Button::new("Next ▶"))
            .clicked()
        {
            app.view.page = page.number + 1;
        }
        ui.separator();
        ui.label(format!(
            "Showing {}–{} of {} emails",
            page.first_row, page.last_row, page.total_rows
        ));
    });

    email_table(ui, "complete_table", page.rows, &columns, &status_colors);
}
