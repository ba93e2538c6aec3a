//! The `emails.csv` manifest: one row per successfully processed message.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, UnpackError};

/// Column headers of the manifest.
const CSV_HEADERS: &str = "Date,Subject,From,Directory,Attachments";

/// Delimiter between filenames in the `Attachments` field.
const ATTACHMENT_SEP: &str = "; ";

/// One manifest record. Created once per message, appended, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRow {
    /// Normalized timestamp, e.g. `"2023-06-05 10:00:00-0400"`.
    pub date: String,
    /// Single-line subject.
    pub subject: String,
    /// Single-line sender.
    pub from: String,
    /// Path of the message's output directory.
    pub directory: String,
    /// Filenames of the extracted parts, in visitation order.
    pub attachments: Vec<String>,
}

/// Single owner of the open manifest file.
///
/// Rows must be appended in message-processing order; if log files are ever
/// processed in parallel, writes to this handle need to be serialized.
pub struct ManifestWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ManifestWriter {
    /// Create the manifest at `path` and write the header row.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| UnpackError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADERS}").map_err(|e| UnpackError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Append one row.
    pub fn write_row(&mut self, row: &ManifestRow) -> Result<()> {
        let attachments = row.attachments.join(ATTACHMENT_SEP);
        writeln!(
            self.writer,
            "{},{},{},{},{}",
            csv_escape(&row.date),
            csv_escape(&row.subject),
            csv_escape(&row.from),
            csv_escape(&row.directory),
            csv_escape(&attachments),
        )
        .map_err(|e| UnpackError::io(&self.path, e))?;
        Ok(())
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| UnpackError::io(&self.path, e))?;
        Ok(())
    }
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
