//! Master-resume upload: turns an uploaded file into plain text.
//!
//! `.pdf` goes through `pdf-extract`; `.txt` must be UTF-8. Anything else is
//! rejected before any bytes are parsed.

use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

/// Upload size cap, checked by the handler before extraction.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type '{0}': upload a .pdf or .txt file")]
    UnsupportedType(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Text file is not valid UTF-8")]
    NotUtf8,

    #[error("No text could be extracted from the file")]
    Empty,
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

/// Dispatches on the file extension, case-insensitively.
pub fn detect_kind(filename: &str) -> Result<FileKind, IngestError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(FileKind::Pdf),
        "txt" => Ok(FileKind::Text),
        _ => Err(IngestError::UnsupportedType(filename.to_string())),
    }
}

/// Extracts and tidies the text of an uploaded file. CPU-bound for PDFs; call
/// from `spawn_blocking`.
pub fn extract_text(filename: &str, data: &[u8]) -> Result<String, IngestError> {
    let raw = match detect_kind(filename)? {
        FileKind::Pdf => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| IngestError::Pdf(e.to_string()))?,
        FileKind::Text => String::from_utf8(data.to_vec()).map_err(|_| IngestError::NotUtf8)?,
    };

    let text = tidy(&raw);
    if text.is_empty() {
        return Err(IngestError::Empty);
    }
    debug!("Extracted {} chars from {}", text.len(), filename);
    Ok(text)
}

/// Page breaks become blank lines, trailing spaces go, and runs of blank
/// lines collapse to one.
fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0usize;

    for line in raw.replace('\x0C', "\n\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}
