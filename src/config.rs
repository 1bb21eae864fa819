use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::query::PageSize;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "MAIL_TRIAGE_CONFIG";

const TEMPLATE_HEADER: &str = "\
# mail-triage configuration
#
# sheet_url        = \"https://docs.google.com/spreadsheets/d/<id>/edit\"
# credentials_path = \"/path/to/service-account.json\"
# export_dir       = \"/path/to/exports\"
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheet_url: Option<String>,
    pub worksheet: String,
    pub credentials_path: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub export_dir: Option<PathBuf>,
    pub rows_per_page: usize,
    pub auto_refresh: bool,
    pub auto_refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sheet_url: None,
            worksheet: "Sheet1".to_string(),
            credentials_path: None,
            fetch_timeout_secs: 30,
            export_dir: None,
            rows_per_page: 25,
            auto_refresh: false,
            auto_refresh_secs: 30,
        }
    }
}

impl Config {
    /// `None` when the timeout is configured as 0.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }

    /// Initial table page size; 0 rows per page shows everything.
    pub fn page_size(&self) -> PageSize {
        match self.rows_per_page {
            0 => PageSize::All,
            n => PageSize::Rows(n),
        }
    }

    pub fn auto_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_secs.max(1))
    }

    /// Configured export directory, falling back to the download dir and then
    /// the working directory.
    pub fn resolve_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("mail-triage"))
}

pub fn config_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(p));
    }
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    load_from(&path)
}

/// Read the config at `path`. A missing file is replaced with a template and
/// the defaults are returned.
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        write_template(path)?;
        log::info!("Created template config at {}", path.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&s).with_context(|| format!("parsing config {}", path.display()))?;
    log::debug!("Loaded config from {}: {cfg:?}", path.display());
    Ok(cfg)
}

fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("{TEMPLATE_HEADER}\n{body}"))
        .with_context(|| format!("writing template config {}", path.display()))?;
    Ok(())
}
