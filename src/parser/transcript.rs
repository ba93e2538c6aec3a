//! Transcript parsing: raw message text → [`Message`] part tree.
//!
//! Parsing is side-effect-free. Leaf payloads stay in their declared
//! transfer encoding; decoding (and its failure policy) belongs to
//! extraction.

use crate::error::{Result, UnpackError};
use crate::model::message::{LeafPart, Message, Part};
use crate::parser::header::{get_header, unfold_headers};

/// Parse one raw transcript into a structured message tree.
///
/// The transcript is scrubbed to ASCII first — characters outside the
/// encodable set are dropped rather than failing the message. Any text can
/// form a degenerate single-leaf message, so this only errors on input that
/// yields no structure at all.
pub fn parse_transcript(raw: &str) -> Result<Message> {
    let scrubbed = ascii_scrub(raw);
    if scrubbed.trim().is_empty() {
        return Err(UnpackError::MalformedMessage(
            "transcript is empty after normalization".to_string(),
        ));
    }
    let (header_text, body) = split_header_block(&scrubbed);
    let headers = unfold_headers(header_text);

    let message = Message {
        date: get_header(&headers, "date"),
        subject: get_header(&headers, "subject"),
        from: get_header(&headers, "from"),
        root: parse_entity(&headers, body),
    };
    Ok(message)
}

/// Drop every non-ASCII character. Best-effort normalization: the archive
/// format is an ASCII superset and stray high bytes carry no structure.
fn ascii_scrub(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    text.chars().filter(|c| c.is_ascii()).collect()
}

/// Split an entity's text into its header block and body at the first blank
/// line. With no blank line, everything is headers and the body is empty.
fn split_header_block(text: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            let body_start = offset + line.len();
            return (&text[..offset], &text[body_start..]);
        }
        offset += line.len();
    }
    (text, "")
}

/// Build the part tree for one entity given its unfolded headers and body.
///
/// A `multipart/*` content type with a usable boundary becomes a Container
/// whose children are parsed recursively; everything else (including a
/// multipart with no boundary parameter) degrades to a single Leaf.
fn parse_entity(headers: &[(String, String)], body: &str) -> Part {
    let content_type_raw = get_header(headers, "content-type").unwrap_or_default();
    let (content_type, params) = parse_content_type(&content_type_raw);

    if content_type.starts_with("multipart/") {
        if let Some(boundary) = params.boundary {
            let children = split_multipart(body, &boundary)
                .into_iter()
                .map(|segment| {
                    let (hdr, part_body) = split_header_block(&segment);
                    let part_headers = unfold_headers(hdr);
                    parse_entity(&part_headers, part_body)
                })
                .collect();
            return Part::Container(children);
        }
    }

    // Disposition filename wins; the Content-Type name= parameter is the
    // older fallback way of declaring one.
    let filename = declared_filename(headers).or(params.name);
    let encoding = get_header(headers, "content-transfer-encoding")
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();

    Part::Leaf(LeafPart {
        content_type: if content_type.is_empty() {
            "text/plain".to_string()
        } else {
            content_type
        },
        filename,
        encoding,
        payload: body.to_string(),
    })
}

/// Filename from `Content-Disposition: ...; filename=...`, if declared.
fn declared_filename(headers: &[(String, String)]) -> Option<String> {
    let disposition = get_header(headers, "content-disposition")?;
    parse_param(&disposition, "filename")
}

/// Parsed pieces of a Content-Type value.
struct ContentTypeParams {
    boundary: Option<String>,
    /// `name=` parameter (a pre-disposition way of declaring a filename).
    name: Option<String>,
}

/// Split a Content-Type value into its lowercase `type/subtype` and the
/// parameters we care about.
fn parse_content_type(value: &str) -> (String, ContentTypeParams) {
    let mut pieces = value.splitn(2, ';');
    let ctype = pieces.next().unwrap_or("").trim().to_lowercase();
    (
        ctype,
        ContentTypeParams {
            boundary: parse_param(value, "boundary"),
            name: parse_param(value, "name"),
        },
    )
}

/// Extract a `key=value` parameter from a structured header value.
/// Handles both quoted (`key="v"`) and bare (`key=v`) forms.
fn parse_param(value: &str, key: &str) -> Option<String> {
    for piece in value.split(';').skip(1) {
        let piece = piece.trim();
        let Some((k, v)) = piece.split_once('=') else {
            continue;
        };
        if k.trim().eq_ignore_ascii_case(key) {
            let v = v.trim();
            let v = v.strip_prefix('"').unwrap_or(v);
            let v = v.strip_suffix('"').unwrap_or(v);
            if v.is_empty() {
                return None;
            }
            return Some(v.to_string());
        }
    }
    None
}

/// Split a multipart body into its boundary-delimited segments.
///
/// Content before the first boundary (the preamble) and after the closing
/// boundary (the epilogue) is ignored. The line terminator immediately
/// preceding a boundary belongs to the boundary, not the part, and is
/// stripped. An unterminated final segment is kept rather than dropped.
fn split_multipart(body: &str, boundary: &str) -> Vec<String> {
    let open = format!("--{boundary}");
    let close = format!("--{boundary}--");

    let mut segments: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in body.lines() {
        let trimmed = line.trim_end();
        if trimmed == close {
            if let Some(seg) = current.take() {
                segments.push(strip_trailing_newline(seg));
            }
            break;
        } else if trimmed == open {
            if let Some(seg) = current.take() {
                segments.push(strip_trailing_newline(seg));
            }
            current = Some(String::new());
        } else if let Some(seg) = current.as_mut() {
            seg.push_str(line);
            seg.push('\n');
        }
    }

    if let Some(seg) = current.take() {
        segments.push(strip_trailing_newline(seg));
    }

    segments
}

fn strip_trailing_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
    }
    s
}
