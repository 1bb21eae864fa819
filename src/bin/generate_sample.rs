//! Writes the built-in demo table as `sample_emails.{csv,json,parquet}` into
//! the directory given as the first argument (default: current directory).
//! The files load back through `File → Open exported sheet…`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Local;
use parquet::arrow::ArrowWriter;

use mail_triage::data::loader::load_sample_at;
use mail_triage::data::model::{Table, FIELD_NAMES};
use mail_triage::data::query::View;
use mail_triage::export::{to_csv, to_json, write_export};

/// One Utf8 column per canonical field, every cell as it appears in a sheet.
fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(
        FIELD_NAMES
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = FIELD_NAMES
        .iter()
        .map(|name| {
            let cells: Vec<String> = table
                .iter()
                .map(|rec| rec.cell(name).unwrap_or_default())
                .collect();
            Arc::new(StringArray::from(cells)) as ArrayRef
        })
        .collect();

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let table = load_sample_at(Local::now().date_naive());
    let view = View::all(&table);

    write_export(&out_dir, "sample_emails.csv", &to_csv(&view)?)?;
    write_export(&out_dir, "sample_emails.json", &to_json(&view)?)?;

    let batch = to_record_batch(&table)?;
    let parquet_path = out_dir.join("sample_emails.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    log::info!("Exported {} rows to {}", batch.num_rows(), parquet_path.display());

    println!(
        "Wrote {} sample emails ({} columns) to {}",
        table.len(),
        FIELD_NAMES.len(),
        out_dir.display()
    );
    Ok(())
}
