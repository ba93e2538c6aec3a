//! Drivers: unpack a single log file, or a whole directory of them.
//!
//! Per-message failures are caught here at the message boundary and never
//! abort the enclosing file scan or the run; per-file failures are logged
//! and the scan moves on. Only top-level I/O (output root, manifest) is
//! allowed to propagate out as fatal.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, UnpackError};
use crate::extract::extract_parts;
use crate::manifest::{ManifestRow, ManifestWriter};
use crate::parser::header::{fold_header_value, normalize_date};
use crate::parser::segment::LogSegmenter;
use crate::parser::transcript::parse_transcript;

/// Size of the per-logfile read buffer.
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnpackStats {
    /// Log files scanned.
    pub files: u64,
    /// Messages unpacked and recorded in the manifest.
    pub messages_written: u64,
    /// Messages skipped (malformed transcript or unparsable date).
    pub messages_skipped: u64,
}

/// Unpack every transcript of one log file into numbered subdirectories of
/// `out_dir`, appending a manifest row per successful message.
///
/// Subdirectories are named by a 1-based counter that advances only when a
/// message is fully processed, so a skipped message's number is reused by
/// the next one.
pub fn unpack_logfile(
    log_path: &Path,
    out_dir: &Path,
    manifest: &mut ManifestWriter,
) -> Result<UnpackStats> {
    std::fs::create_dir_all(out_dir).map_err(|e| UnpackError::io(out_dir, e))?;

    let file = File::open(log_path).map_err(|e| UnpackError::io(log_path, e))?;
    let segmenter = LogSegmenter::new(BufReader::with_capacity(READ_BUFFER_SIZE, file));

    let mut stats = UnpackStats {
        files: 1,
        ..UnpackStats::default()
    };
    let mut counter: u64 = 1;

    for transcript in segmenter {
        let transcript = transcript?;
        let msg_dir = out_dir.join(counter.to_string());

        match process_transcript(&transcript, &msg_dir) {
            Ok(row) => {
                manifest.write_row(&row)?;
                counter += 1;
                stats.messages_written += 1;
            }
            Err(e) => {
                debug!(
                    log = %log_path.display(),
                    message = counter,
                    error = %e,
                    "Skipping unprocessable message"
                );
                stats.messages_skipped += 1;
            }
        }
    }

    Ok(stats)
}

/// Parse one transcript, extract its parts into `msg_dir`, and assemble the
/// manifest row.
///
/// Date normalization runs AFTER extraction, so an unparsable date leaves
/// already-written part files in place (best-effort, non-transactional).
fn process_transcript(raw: &str, msg_dir: &Path) -> Result<ManifestRow> {
    let message = parse_transcript(raw)?;
    let attachments = extract_parts(&message, msg_dir)?;
    let date = normalize_date(message.date.as_deref())?;

    Ok(ManifestRow {
        date,
        subject: fold_header_value(message.subject.as_deref()),
        from: fold_header_value(message.from.as_deref()),
        directory: msg_dir.display().to_string(),
        attachments,
    })
}

/// Unpack every log file of `log_dir` into `out_dir`, writing the shared
/// manifest as `out_dir/emails.csv`.
///
/// Each `name.log` gets its own `out_dir/name/` subtree. Files are visited
/// in sorted name order; non-file entries are skipped. A file that fails to
/// unpack is logged and does not stop the run.
pub fn unpack_directory(
    log_dir: &Path,
    out_dir: &Path,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<UnpackStats> {
    if !log_dir.is_dir() {
        return Err(UnpackError::LogDirNotFound(log_dir.to_path_buf()));
    }
    std::fs::create_dir_all(out_dir).map_err(|e| UnpackError::io(out_dir, e))?;

    let mut manifest = ManifestWriter::create(&out_dir.join("emails.csv"))?;
    let logfiles = collect_logfiles(log_dir)?;
    let total = logfiles.len() as u64;

    let mut stats = UnpackStats::default();
    for (i, log_path) in logfiles.iter().enumerate() {
        if let Some(cb) = progress {
            cb(i as u64, total);
        }

        let file_out_dir = out_dir.join(output_name(log_path));
        match unpack_logfile(log_path, &file_out_dir, &mut manifest) {
            Ok(s) => {
                info!(
                    log = %log_path.display(),
                    written = s.messages_written,
                    skipped = s.messages_skipped,
                    "Unpacked log file"
                );
                stats.files += s.files;
                stats.messages_written += s.messages_written;
                stats.messages_skipped += s.messages_skipped;
            }
            Err(e) => {
                warn!(log = %log_path.display(), error = %e, "Failed to unpack log file");
            }
        }
    }

    if let Some(cb) = progress {
        cb(total, total);
    }

    manifest.flush()?;
    Ok(stats)
}

/// Regular files of the log directory, in sorted name order.
fn collect_logfiles(log_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(log_dir)
        .map_err(|e| UnpackError::io(log_dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Output subdirectory name for a log file: its file name with a trailing
/// `.log` stripped.
fn output_name(log_path: &Path) -> String {
    let name = log_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(".log").unwrap_or(&name).to_string()
}
