//! Google Sheets access through the v4 REST API.
//!
//! Authentication uses a service-account key: a short-lived RS256 JWT is
//! exchanged for an access token, which then reads the worksheet's values.
//! All HTTP goes through a blocking `reqwest` client whose timeout is the
//! caller's fetch bound.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::source::{FetchRequest, RowTable, TabularSource};
use crate::error::LoadError;

/// Read-only scopes requested for the access token.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

// ============================================================================
// Locator
// ============================================================================

/// Extract the spreadsheet id from a full sheet URL (`.../d/<id>/edit`) or
/// accept a bare id as-is.
pub fn spreadsheet_id(locator: &str) -> Result<&str, LoadError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(LoadError::InvalidLocator("no spreadsheet URL given".into()));
    }

    let id = match locator.split_once("/d/") {
        Some((_, rest)) => rest.split(['/', '?', '#']).next().unwrap_or(""),
        None => locator,
    };

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(LoadError::InvalidLocator(format!(
            "cannot find a spreadsheet id in '{locator}'"
        )))
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// A Google Cloud service-account key (the uploaded JSON file).
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse and sanity-check uploaded key material.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LoadError> {
        let key: ServiceAccountKey = serde_json::from_slice(bytes)
            .map_err(|e| LoadError::BadCredentials(format!("not a service account key: {e}")))?;

        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(LoadError::BadCredentials(format!(
                    "expected a service_account key, got '{kind}'"
                )));
            }
        }
        if key.client_email.trim().is_empty() {
            return Err(LoadError::BadCredentials("client_email is empty".into()));
        }
        key.encoding_key()?;
        Ok(key)
    }

    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| {
            LoadError::BadCredentials(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_json(&bytes)
    }

    fn encoding_key(&self) -> Result<EncodingKey, LoadError> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| LoadError::BadCredentials(format!("unusable private_key: {e}")))
    }

    /// Signed JWT assertion for the token endpoint.
    fn assertion(&self, issued_at: i64) -> Result<String, LoadError> {
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: SCOPES.join(" "),
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key()?)
            .map_err(|e| LoadError::BadCredentials(format!("signing assertion: {e}")))
    }

    fn access_token(
        &self,
        client: &reqwest::blocking::Client,
        timeout: Option<Duration>,
    ) -> Result<String, LoadError> {
        let assertion = self.assertion(chrono::Utc::now().timestamp())?;
        let resp = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .map_err(|e| transport_error(e, timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(if status.is_client_error() {
                LoadError::BadCredentials(format!("token exchange rejected ({status}): {body}"))
            } else {
                LoadError::Unreachable(format!("token endpoint returned {status}"))
            });
        }

        let token: TokenResponse = resp.json().map_err(|e| {
            if e.is_timeout() {
                transport_error(e, timeout)
            } else {
                LoadError::BadCredentials(format!("malformed token response: {e}"))
            }
        })?;
        Ok(token.access_token)
    }
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

fn transport_error(e: reqwest::Error, timeout: Option<Duration>) -> LoadError {
    if e.is_timeout() {
        LoadError::TimedOut(timeout.unwrap_or_default())
    } else {
        LoadError::Unreachable(e.to_string())
    }
}

fn cell_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 range covering a whole worksheet.
fn worksheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

// ============================================================================
// Source
// ============================================================================

/// Reads every row of one worksheet, header row first.
#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    api_base: String,
}

impl Default for GoogleSheetsSource {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl GoogleSheetsSource {
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    fn values_url(&self, id: &str, worksheet: &str) -> Result<reqwest::Url, LoadError> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| LoadError::InvalidLocator(format!("bad API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| LoadError::InvalidLocator("bad API base".into()))?
            .pop_if_empty()
            .extend(["spreadsheets", id, "values", worksheet_range(worksheet).as_str()]);
        Ok(url)
    }
}

impl TabularSource for GoogleSheetsSource {
    fn fetch_all(&self, request: &FetchRequest<'_>) -> Result<RowTable, LoadError> {
        let id = spreadsheet_id(request.locator)?;
        let key = request
            .credentials
            .ok_or_else(|| LoadError::BadCredentials("no service account key loaded".into()))?;
        let url = self.values_url(id, request.worksheet)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| LoadError::Unreachable(format!("building HTTP client: {e}")))?;

        log::info!("Fetching worksheet '{}' of spreadsheet {id}", request.worksheet);
        let token = key.access_token(&client, request.timeout)?;

        let resp = client
            .get(url)
            .bearer_auth(token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .map_err(|e| transport_error(e, request.timeout))?;

        let status = resp.status();
        match status.as_u16() {
            200..=299 => {}
            400 => return Err(LoadError::MissingWorksheet(request.worksheet.to_string())),
            401 | 403 => {
                return Err(LoadError::BadCredentials(format!(
                    "{} has no access to spreadsheet {id} ({status})",
                    key.client_email
                )))
            }
            404 => {
                return Err(LoadError::Unreachable(format!(
                    "spreadsheet {id} not found"
                )))
            }
            _ => {
                return Err(LoadError::Unreachable(format!(
                    "Sheets API returned {status}"
                )))
            }
        }

        // The body is read after the headers, so the fetch bound can still expire here.
        let range: ValueRange = resp.json().map_err(|e| {
            if e.is_timeout() {
                transport_error(e, request.timeout)
            } else {
                LoadError::SchemaMismatch(format!("malformed values response: {e}"))
            }
        })?;
        let grid = range
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Ok(RowTable::from_grid(grid))
    }

    fn describe(&self, request: &FetchRequest<'_>) -> String {
        format!("Google Sheets ({})", request.worksheet)
    }
}
