//! Decoder for single-file `multipart/form-data` upload bodies.
//!
//! The whole request body is buffered before decoding. The decoder locates the
//! opening delimiter, requires the closing delimiter to be present, then walks
//! the parts in between:
//!
//! ```text
//! --{boundary}\r\n
//! Content-Disposition: form-data; name="file"; filename="scan.png"\r\n
//! Content-Type: image/png\r\n
//! \r\n
//! <raw bytes>\r\n
//! --{boundary}--\r\n
//! ```
//!
//! Each part's headers end at the first blank line, so parts may carry any
//! number of header lines. Content is returned as a slice of the input buffer
//! and is never transcoded.

use bytes::Bytes;

use crate::error::MultipartError;

const CRLF: &[u8] = b"\r\n";
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// A file extracted from an upload body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original filename from the part's `filename="..."` attribute
    pub filename: Option<String>,

    /// Raw file bytes
    pub content: Bytes,
}

impl UploadedFile {
    /// Extension derived from the original filename, without the leading dot.
    ///
    /// Returns `None` when there is no filename, no dot, or the text after the
    /// last dot is empty or not ASCII alphanumeric.
    pub fn extension(&self) -> Option<&str> {
        let filename = self.filename.as_deref()?;
        let (_, ext) = filename.rsplit_once('.')?;

        if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(ext)
        } else {
            None
        }
    }
}

/// Extract the `boundary` parameter from a multipart `Content-Type` value.
///
/// ```rust
/// use record_gate::multipart::boundary_from_content_type;
///
/// let value = "multipart/form-data; boundary=----abc123";
/// assert_eq!(boundary_from_content_type(value).as_deref(), Some("----abc123"));
/// assert_eq!(boundary_from_content_type("application/json"), None);
/// ```
pub fn boundary_from_content_type(value: &str) -> Option<String> {
    let mut params = value.split(';');
    let media_type = params.next()?.trim();
    if !media_type.to_ascii_lowercase().starts_with("multipart/") {
        return None;
    }

    params.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Decode the first file part of a multipart body.
///
/// The part carrying a `filename` attribute wins; when no part has one, the
/// first part is returned with `filename: None`.
pub fn decode(body: &Bytes, boundary: &str) -> Result<UploadedFile, MultipartError> {
    let opening = format!("--{}\r\n", boundary);
    let delimiter = format!("\r\n--{}", boundary);
    let closing = format!("\r\n--{}--", boundary);

    let first_part = find(body, opening.as_bytes(), 0)
        .ok_or(MultipartError::MissingOpeningDelimiter)?
        + opening.len();
    let end = find_closing(body, closing.as_bytes(), first_part)
        .ok_or(MultipartError::MissingClosingDelimiter)?;

    let mut fallback = None;
    let mut cursor = first_part;

    while cursor < end {
        // A part with no headers starts directly with the blank line.
        let (headers_end, content_start) = if body[cursor..].starts_with(CRLF) {
            (cursor, cursor + CRLF.len())
        } else {
            let headers_end = find(&body[..end], HEADER_TERMINATOR, cursor)
                .ok_or(MultipartError::MissingHeaderTerminator)?;
            (headers_end, headers_end + HEADER_TERMINATOR.len())
        };

        // The closing delimiter starts with the part delimiter, so this always
        // finds a match at or before `end`.
        let content_end = find(body, delimiter.as_bytes(), content_start).unwrap_or(end);

        let headers = String::from_utf8_lossy(&body[cursor..headers_end]);
        let file = UploadedFile {
            filename: filename_attribute(&headers),
            content: body.slice(content_start..content_end),
        };

        if file.filename.is_some() {
            return Ok(file);
        }
        fallback.get_or_insert(file);

        if content_end >= end {
            break;
        }
        // The delimiter line may carry transport padding before its CRLF.
        let line_end = find(body, CRLF, content_end + delimiter.len())
            .ok_or(MultipartError::MissingClosingDelimiter)?;
        cursor = line_end + CRLF.len();
    }

    fallback.ok_or(MultipartError::MissingHeaderTerminator)
}

/// Find the closing delimiter, which must be followed by CRLF or end the body.
fn find_closing(body: &[u8], closing: &[u8], mut from: usize) -> Option<usize> {
    while let Some(pos) = find(body, closing, from) {
        let rest = &body[pos + closing.len()..];
        if rest.is_empty() || rest.starts_with(CRLF) {
            return Some(pos);
        }
        from = pos + 1;
    }
    None
}

/// Extract the value of the `filename="..."` attribute from part headers.
fn filename_attribute(headers: &str) -> Option<String> {
    const MARKER: &str = "filename=\"";

    let start = headers.find(MARKER)? + MARKER.len();
    let len = headers[start..].find('"')?;
    let name = &headers[start..start + len];
    (!name.is_empty()).then(|| name.to_string())
}

/// Position of the first occurrence of `needle` in `haystack` at or after `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

// =============================================================================
// Tests
// =============================================================================
