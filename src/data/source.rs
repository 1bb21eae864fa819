use std::path::{Path, PathBuf};
use std::time::Duration;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::sheets::ServiceAccountKey;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// RowTable – what every source hands back
// ---------------------------------------------------------------------------

/// Raw tabular data keyed by its header row. All cells are text; typing
/// happens later in the loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RowTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RowTable { headers, rows }
    }

    /// Split a values grid whose first row is the header.
    pub fn from_grid(mut grid: Vec<Vec<String>>) -> Self {
        if grid.is_empty() {
            return RowTable::default();
        }
        let headers = grid.remove(0);
        RowTable { headers, rows: grid }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TabularSource – the seam between the loader and the outside world
// ---------------------------------------------------------------------------

/// Everything a source needs for one fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    /// Spreadsheet URL, bare spreadsheet id or file path.
    pub locator: &'a str,
    pub credentials: Option<&'a ServiceAccountKey>,
    /// Worksheet (tab) to read.
    pub worksheet: &'a str,
    /// Upper bound on the whole fetch. `None` means no bound.
    pub timeout: Option<Duration>,
}

/// Something that can produce a [`RowTable`]. Every call is a fresh fetch.
pub trait TabularSource {
    fn fetch_all(&self, request: &FetchRequest<'_>) -> Result<RowTable, LoadError>;

    /// Short human-readable name for status messages.
    fn describe(&self, request: &FetchRequest<'_>) -> String {
        request.locator.to_string()
    }
}

// ---------------------------------------------------------------------------
// FileSource – a locally exported tracking sheet
// ---------------------------------------------------------------------------

/// Reads an exported sheet from disk. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one line per email
/// * `.json`    – `[{ "Email ID": "E1001", ... }, ...]`
/// * `.parquet` – one column per field; non-string columns are rendered as text
///
/// The worksheet name and credentials are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl TabularSource for FileSource {
    fn fetch_all(&self, request: &FetchRequest<'_>) -> Result<RowTable, LoadError> {
        let path = PathBuf::from(request.locator.trim());
        if !path.exists() {
            return Err(LoadError::Unreachable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => read_csv(&path),
            "json" => read_json(&path),
            "parquet" | "pq" => read_parquet(&path),
            other => Err(LoadError::InvalidLocator(format!(
                "unsupported file extension: .{other}"
            ))),
        }
    }

    fn describe(&self, request: &FetchRequest<'_>) -> String {
        Path::new(request.locator)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(request.locator)
            .to_string()
    }
}

fn read_csv(path: &Path) -> Result<RowTable, LoadError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| LoadError::Unreachable(format!("opening {}: {e}", path.display())))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::SchemaMismatch(format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| LoadError::SchemaMismatch(format!("CSV row {row_no}: {e}")))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(RowTable { headers, rows })
}

/// Records-oriented JSON, the layout written by the JSON export.
fn read_json(path: &Path) -> Result<RowTable, LoadError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Unreachable(format!("reading {}: {e}", path.display())))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| LoadError::SchemaMismatch(format!("parsing JSON: {e}")))?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::SchemaMismatch("expected a top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::SchemaMismatch(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RowTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn read_parquet(path: &Path) -> Result<RowTable, LoadError> {
    let file = std::fs::File::open(path)
        .map_err(|e| LoadError::Unreachable(format!("opening {}: {e}", path.display())))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|b| b.build())
        .map_err(|e| LoadError::SchemaMismatch(format!("reading parquet metadata: {e}")))?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| LoadError::SchemaMismatch(format!("reading parquet batch: {e}")))?;
        if headers.is_empty() {
            headers = batch
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect();
        }

        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(batch.num_columns());
            for col in batch.columns() {
                if col.is_null(row) {
                    cells.push(String::new());
                    continue;
                }
                let cell = array_value_to_string(col.as_ref(), row).map_err(|e| {
                    LoadError::SchemaMismatch(format!("row {row}: unreadable cell: {e}"))
                })?;
                cells.push(cell);
            }
            rows.push(cells);
        }
    }

    Ok(RowTable { headers, rows })
}
