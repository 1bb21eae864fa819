pub mod cards;
pub mod charts;
pub mod panels;
pub mod table;

use std::path::Path;

use mail_triage::error::ExportError;
use mail_triage::export::write_export;
use mail_triage::state::AppState;

/// Ask where to save `bytes`, then write them. The outcome lands in the status
/// line.
pub fn save_export(
    state: &mut AppState,
    dir: &Path,
    name: &str,
    bytes: Result<Vec<u8>, ExportError>,
) {
    let bytes = match bytes {
        Ok(b) => b,
        Err(e) => {
            log::error!("Encoding {name} failed: {e}");
            state.status_message = Some(format!("Error: export failed: {e}"));
            return;
        }
    };

    let Some(path) = rfd::FileDialog::new()
        .set_title("Save export")
        .set_directory(dir)
        .set_file_name(name)
        .save_file()
    else {
        return;
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    state.status_message = Some(match write_export(dir, &file, &bytes) {
        Ok(written) => format!("Saved {}", written.display()),
        Err(e) => {
            log::error!("Writing {file} failed: {e}");
            format!("Error: export failed: {e}")
        }
    });
}

/// First `max` characters, with an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}
