//! Part extraction: walk a parsed message tree and write each leaf to disk.
//!
//! Decoding failures are per-part: one undecodable part is skipped with a
//! diagnostic and never aborts the rest of the message.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::warn;

use crate::error::{Result, UnpackError};
use crate::model::message::{LeafPart, Message, Part};
use crate::parser::header::fold_header_value;

/// Write every leaf of `message` into `output_dir`, creating the directory
/// if needed (a pre-existing directory is not an error).
///
/// Leaves are visited depth-first in document order. Filenames come from
/// the part's declared filename when present (used as-is), otherwise from a
/// 1-based zero-padded counter plus an extension guessed from the content
/// type. Containers contribute no file and do not advance the counter.
///
/// Returns the filenames of all successfully written parts in visitation
/// order; parts whose payload failed to decode are absent from the list.
pub fn extract_parts(message: &Message, output_dir: &Path) -> Result<Vec<String>> {
    std::fs::create_dir_all(output_dir).map_err(|e| UnpackError::io(output_dir, e))?;

    let subject = fold_header_value(message.subject.as_deref());
    let mut counter: u32 = 0;
    let mut written = Vec::new();
    walk(&message.root, output_dir, &subject, &mut counter, &mut written)?;
    Ok(written)
}

fn walk(
    part: &Part,
    output_dir: &Path,
    subject: &str,
    counter: &mut u32,
    written: &mut Vec<String>,
) -> Result<()> {
    match part {
        Part::Container(children) => {
            for child in children {
                walk(child, output_dir, subject, counter, written)?;
            }
        }
        Part::Leaf(leaf) => {
            *counter += 1;
            let filename = leaf.filename.clone().unwrap_or_else(|| {
                let ext = guess_extension(&leaf.content_type).unwrap_or(".bin");
                format!("part-{counter:03}{ext}")
            });

            match decode_payload(leaf) {
                Ok(bytes) => {
                    let path = output_dir.join(&filename);
                    std::fs::write(&path, bytes).map_err(|e| UnpackError::io(&path, e))?;
                    written.push(filename);
                }
                Err(e) => {
                    warn!(subject = subject, error = %e, "Skipping undecodable part");
                }
            }
        }
    }
    Ok(())
}

/// Decode a leaf's payload from its declared transfer encoding to raw bytes.
///
/// An absent encoding (and the identity encodings) passes the payload
/// through untouched; an unrecognized one is a decode failure.
fn decode_payload(leaf: &LeafPart) -> Result<Vec<u8>> {
    match leaf.encoding.as_str() {
        "base64" => {
            // MIME base64 is line-wrapped; the engine rejects whitespace.
            let compact: String = leaf
                .payload
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| UnpackError::PartDecode(format!("base64: {e}")))
        }
        "quoted-printable" => quoted_printable::decode(
            leaf.payload.as_bytes(),
            quoted_printable::ParseMode::Robust,
        )
        .map_err(|e| UnpackError::PartDecode(format!("quoted-printable: {e}"))),
        "" | "7bit" | "8bit" | "binary" => Ok(leaf.payload.clone().into_bytes()),
        other => Err(UnpackError::PartDecode(format!(
            "unsupported transfer encoding '{other}'"
        ))),
    }
}

/// Guess a file extension from a MIME content type.
fn guess_extension(content_type: &str) -> Option<&'static str> {
    let ext = match content_type {
        "text/plain" => ".txt",
        "text/html" => ".html",
        "text/csv" => ".csv",
        "text/xml" | "application/xml" => ".xml",
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/tiff" => ".tiff",
        "image/bmp" => ".bmp",
        "application/pdf" => ".pdf",
        "application/zip" => ".zip",
        "application/json" => ".json",
        "application/postscript" => ".ps",
        "application/msword" => ".doc",
        "application/rtf" => ".rtf",
        "message/rfc822" => ".eml",
        _ => return None,
    };
    Some(ext)
}
