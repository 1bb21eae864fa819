use std::time::Duration;

use chrono::{DateTime, Local};

use crate::data::loader::{load_external, load_sample, Loaded, RowRejection};
use crate::data::model::{Priority, ResolutionStatus, Table};
use crate::data::query::{apply, MailboxFilter, QuerySpec, View};
use crate::data::sheets::ServiceAccountKey;
use crate::data::source::{FetchRequest, TabularSource};
use crate::error::LoadError;
use crate::export::FilterSummary;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Where the current table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Sample,
    External(String),
}

/// What `connect` was last called with, so `refresh` can repeat it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub locator: String,
    pub worksheet: String,
    pub timeout: Option<Duration>,
}

/// Dashboard state, independent of rendering.
pub struct AppState {
    /// Current table. Only ever replaced as a whole.
    pub table: Table,
    pub origin: Origin,
    pub query: QuerySpec,
    pub credentials: Option<ServiceAccountKey>,
    pub connection: Option<ConnectionSettings>,
    /// Rows set aside by the last external load.
    pub quarantined: Vec<RowRejection>,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
    pub loaded_at: DateTime<Local>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: load_sample(),
            origin: Origin::Sample,
            query: QuerySpec::default(),
            credentials: None,
            connection: None,
            quarantined: Vec::new(),
            status_message: None,
            loaded_at: Local::now(),
        }
    }
}

impl AppState {
    /// Current filtered, sorted view of the table.
    pub fn view(&self) -> View<'_> {
        apply(&self.table, &self.query)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.origin, Origin::External(_))
    }

    /// Parse and keep a service-account key. The previous key survives a
    /// parse failure.
    pub fn load_credentials(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        match ServiceAccountKey::from_json(bytes) {
            Ok(key) => {
                log::info!("Loaded service account {}", key.client_email);
                self.status_message = Some("Credentials loaded successfully!".into());
                self.credentials = Some(key);
                Ok(())
            }
            Err(e) => {
                log::error!("Rejected credentials: {e}");
                self.status_message = Some(format!("Error loading credentials: {e}"));
                Err(e)
            }
        }
    }

    /// Load the sheet described by `settings`. On error the current table is
    /// kept and the error is returned.
    pub fn connect(
        &mut self,
        source: &dyn TabularSource,
        settings: ConnectionSettings,
    ) -> Result<usize, LoadError> {
        let request = FetchRequest {
            locator: &settings.locator,
            credentials: self.credentials.as_ref(),
            worksheet: &settings.worksheet,
            timeout: settings.timeout,
        };
        let name = source.describe(&request);
        match load_external(source, &request) {
            Ok(loaded) => {
                let n = self.install(loaded, Origin::External(name));
                self.connection = Some(settings);
                Ok(n)
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.status_message = Some(format!("Error loading {name}: {e}"));
                Err(e)
            }
        }
    }

    /// Re-read the current origin.
    pub fn refresh(&mut self, source: &dyn TabularSource) -> Result<usize, LoadError> {
        match (&self.origin, self.connection.clone()) {
            (Origin::External(_), Some(settings)) => self.connect(source, settings),
            _ => Ok(self.reload_sample()),
        }
    }

    pub fn reload_sample(&mut self) -> usize {
        self.connection = None;
        let loaded = Loaded {
            table: load_sample(),
            rejected: Vec::new(),
        };
        self.install(loaded, Origin::Sample)
    }

    fn install(&mut self, loaded: Loaded, origin: Origin) -> usize {
        let n = loaded.table.len();
        self.status_message = Some(match (&origin, loaded.rejected.len()) {
            (Origin::Sample, _) => "Using sample data".to_string(),
            (Origin::External(_), 0) => format!("Loaded {n} emails"),
            (Origin::External(_), q) => format!("Loaded {n} emails, {q} rows skipped"),
        });
        self.table = loaded.table;
        self.quarantined = loaded.rejected;
        self.origin = origin;
        self.loaded_at = Local::now();
        self.drop_stale_filters();
        n
    }

    /// Forget filter values the new table no longer offers.
    fn drop_stale_filters(&mut self) {
        let options = self.table.options();
        if let MailboxFilter::Only(m) = &self.query.mailbox {
            if !options.mailboxes.contains(m) {
                self.query.mailbox = MailboxFilter::All;
            }
        }
        self.query.priorities.retain(|p| options.priorities.contains(p));
        self.query.statuses.retain(|s| options.statuses.contains(s));
        self.query.departments.retain(|d| options.departments.contains(d));
    }

    // -- filter edits ---------------------------------------------------------

    pub fn set_mailbox(&mut self, mailbox: MailboxFilter) {
        self.query.mailbox = mailbox;
    }

    pub fn toggle_priority(&mut self, value: &Priority) {
        if !self.query.priorities.remove(value) {
            self.query.priorities.insert(value.clone());
        }
    }

    pub fn toggle_status(&mut self, value: &ResolutionStatus) {
        if !self.query.statuses.remove(value) {
            self.query.statuses.insert(value.clone());
        }
    }

    pub fn toggle_department(&mut self, value: &str) {
        if !self.query.departments.remove(value) {
            self.query.departments.insert(value.to_string());
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.query.search = (!term.is_empty()).then(|| term.to_string());
    }

    /// Reset every filter, keeping the sort order.
    pub fn clear_filters(&mut self) {
        self.query = QuerySpec {
            sort_key: self.query.sort_key,
            direction: self.query.direction,
            ..QuerySpec::default()
        };
    }

    pub fn filter_summary(&self) -> FilterSummary {
        FilterSummary::new(&self.query, self.view().len(), self.table.len())
    }
}
