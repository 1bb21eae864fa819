use std::collections::BTreeSet;
use std::time::Instant;

use eframe::egui;

use mail_triage::config::Config;
use mail_triage::data::model::FIELD_NAMES;
use mail_triage::data::query::PageSize;
use mail_triage::data::sheets::{GoogleSheetsSource, ServiceAccountKey};
use mail_triage::data::source::{FileSource, TabularSource};
use mail_triage::error::LoadError;
use mail_triage::state::{AppState, ConnectionSettings};

use crate::ui::{cards, charts, panels, table};

// ---------------------------------------------------------------------------
// View settings: everything that only affects rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Cards,
    Table,
    Both,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Cards, ViewMode::Table, ViewMode::Both];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Cards => "Cards",
            ViewMode::Table => "Table",
            ViewMode::Both => "Both",
        }
    }

    pub fn shows_cards(self) -> bool {
        matches!(self, ViewMode::Cards | ViewMode::Both)
    }

    pub fn shows_table(self) -> bool {
        matches!(self, ViewMode::Table | ViewMode::Both)
    }
}

/// Which source `Connect` / `Refresh` talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    #[default]
    Sheets,
    File,
}

impl SourceKind {
    fn source(self) -> Box<dyn TabularSource> {
        match self {
            SourceKind::Sheets => Box::new(GoogleSheetsSource::default()),
            SourceKind::File => Box::new(FileSource),
        }
    }
}

pub struct ViewSettings {
    pub mode: ViewMode,
    pub page: usize,
    pub page_size: PageSize,
    pub selected_email: Option<String>,
    /// Columns shown in the complete table.
    pub columns: BTreeSet<&'static str>,
    pub search_input: String,
    pub note_input: String,
}

impl ViewSettings {
    fn new(page_size: PageSize) -> Self {
        Self {
            mode: ViewMode::default(),
            page: 1,
            page_size,
            selected_email: None,
            columns: table::DEFAULT_COLUMNS.iter().copied().collect(),
            search_input: String::new(),
            note_input: String::new(),
        }
    }

    /// Columns in canonical order.
    pub fn ordered_columns(&self) -> Vec<&'static str> {
        FIELD_NAMES
            .iter()
            .copied()
            .filter(|c| self.columns.contains(c))
            .collect()
    }
}

/// Text typed into the connection form.
#[derive(Default)]
pub struct ConnectionInputs {
    pub sheet_url: String,
    pub worksheet: String,
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MailTriageApp {
    pub state: AppState,
    pub config: Config,
    pub view: ViewSettings,
    pub inputs: ConnectionInputs,
    pub source_kind: SourceKind,
    pub auto_refresh: bool,
    last_refresh: Instant,
}

impl MailTriageApp {
    pub fn new(config: Config, startup_error: Option<String>) -> Self {
        let mut state = AppState::default();
        if let Some(path) = &config.credentials_path {
            match ServiceAccountKey::from_file(path) {
                Ok(key) => state.credentials = Some(key),
                Err(e) => log::warn!("Ignoring configured credentials: {e}"),
            }
        }
        if startup_error.is_some() {
            state.status_message = startup_error;
        }

        Self {
            view: ViewSettings::new(config.page_size()),
            inputs: ConnectionInputs {
                sheet_url: config.sheet_url.clone().unwrap_or_default(),
                worksheet: config.worksheet.clone(),
            },
            source_kind: SourceKind::default(),
            auto_refresh: config.auto_refresh,
            last_refresh: Instant::now(),
            state,
            config,
        }
    }

    /// Connect with the values in the form. Refresh keeps using the last
    /// source that connected successfully.
    pub fn connect(&mut self, kind: SourceKind, locator: String) -> Result<usize, LoadError> {
        let settings = ConnectionSettings {
            locator,
            worksheet: self.inputs.worksheet.trim().to_string(),
            timeout: self.config.fetch_timeout(),
        };
        let result = self.state.connect(kind.source().as_ref(), settings);
        if result.is_ok() {
            self.source_kind = kind;
        }
        self.after_load();
        result
    }

    pub fn refresh(&mut self) -> Result<usize, LoadError> {
        let source = self.source_kind.source();
        let result = self.state.refresh(source.as_ref());
        self.after_load();
        result
    }

    pub fn reload_sample(&mut self) {
        self.state.reload_sample();
        self.after_load();
    }

    fn after_load(&mut self) {
        self.last_refresh = Instant::now();
        self.view.page = 1;
        if let Some(id) = &self.view.selected_email {
            if !self.state.table.iter().any(|r| &r.email_id == id) {
                self.view.selected_email = None;
            }
        }
    }

    fn maybe_auto_refresh(&mut self, ctx: &egui::Context) {
        if !self.auto_refresh || !self.state.is_connected() {
            return;
        }
        let interval = self.config.auto_refresh_interval();
        if self.last_refresh.elapsed() >= interval {
            log::debug!("Auto-refresh");
            // Errors are already recorded in the status message.
            let _ = self.refresh();
        }
        ctx.request_repaint_after(interval);
    }
}

impl eframe::App for MailTriageApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_auto_refresh(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Bottom panel: connection footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui, &self.state);
        });

        // ---- Left side panel: connection + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, self);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    dashboard(ui, self);
                });
        });
    }
}

fn dashboard(ui: &mut egui::Ui, app: &mut MailTriageApp) {
    ui.heading("Email Management Dashboard");
    ui.add_space(4.0);

    cards::metric_row(ui, &app.state);
    ui.separator();

    charts::overview(ui, &app.state);
    ui.separator();

    cards::mailbox_sections(ui, app);
    ui.separator();

    charts::daily_volume_chart(ui, &app.state);
    ui.separator();

    panels::search_and_actions(ui, app);
    ui.separator();

    table::complete_table(ui, app);
    ui.separator();

    cards::details(ui, app);
}
