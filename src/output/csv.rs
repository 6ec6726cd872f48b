//! CSV export
//!
//! Rows are written to a temporary file in the destination directory, which
//! is renamed onto the final path only after everything has been flushed.
//! An aborted or failed export therefore never leaves a partial file at the
//! destination.

use crate::records::{OutputRow, CSV_HEADER};
use crate::ExportError;
use chrono::{DateTime, Local};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory used when no output path is configured
pub const DEFAULT_OUTPUT_DIR: &str = "output";

const SEPARATOR: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes a single CSV row to any writer
fn write_row<W: Write>(w: &mut W, fields: &[&str]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", SEPARATOR)?;
        }
        if needs_quotes(field) {
            write!(w, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", field)?;
        }
    }
    writeln!(w)
}

/// Writes the header and every row
pub fn write_rows<W: Write>(w: &mut W, rows: &[OutputRow]) -> io::Result<()> {
    write_row(w, &CSV_HEADER)?;
    for row in rows {
        write_row(w, &row.fields())?;
    }
    Ok(())
}

/// Writes `rows` to `path` atomically
///
/// Missing parent directories are created. The destination is replaced only
/// once the temporary file is complete.
///
/// # Returns
///
/// * `Ok(usize)` - Number of data rows written (header excluded)
/// * `Err(ExportError)` - Nothing was written to `path`
pub fn export_csv(rows: &[OutputRow], path: &Path) -> Result<usize, ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_rows(&mut writer, rows)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    tracing::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}

/// Decides where the CSV goes
///
/// Without a configured path the file is `output/yc_startups_<timestamp>.csv`.
/// A configured path without a `.csv` extension gets one appended.
///
/// # Example
///
/// ```
/// use chrono::Local;
/// use std::path::PathBuf;
/// use yc_founders::output::resolve_output_path;
///
/// let path = resolve_output_path(Some("founders"), Local::now());
/// assert_eq!(path, PathBuf::from("founders.csv"));
/// ```
pub fn resolve_output_path(configured: Option<&str>, now: DateTime<Local>) -> PathBuf {
    let Some(configured) = configured else {
        let file_name = format!("yc_startups_{}.csv", now.format("%Y%m%d_%H%M%S"));
        return Path::new(DEFAULT_OUTPUT_DIR).join(file_name);
    };

    let path = PathBuf::from(configured);
    let has_csv_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if has_csv_extension {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".csv");
        PathBuf::from(name)
    }
}
