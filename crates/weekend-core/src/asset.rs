use crate::error::{Result, WeekendError};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Default upload ceiling: 25 MiB.
pub const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

pub const ACCEPTED_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/markdown",
    "text/plain",
    "text/csv",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.ms-excel",
    "application/vnd.ms-powerpoint",
    "application/msword",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationAsset {
    pub id: String,
    pub iteration_id: String,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub caption: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// Reject a file before it reaches storage.
pub fn validate_upload(content_type: &str, size: u64, max_size: u64) -> Result<()> {
    if !ACCEPTED_TYPES.contains(&content_type) {
        return Err(WeekendError::UnsupportedFileType(content_type.to_string()));
    }
    if size > max_size {
        return Err(WeekendError::FileTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Pick the MIME type to validate against: the declared one, unless it is
/// missing or generic, in which case guess from the file name.
pub fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    let declared = declared
        .map(|d| d.split(';').next().unwrap_or(d).trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty() && d != "application/octet-stream");
    match declared {
        Some(d) => d,
        None => mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

fn unsafe_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9._-]").expect("valid regex"))
}

fn underscore_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("valid regex"))
}

/// Replace characters outside `[A-Za-z0-9._-]` and collapse `_` runs.
pub fn safe_file_name(name: &str) -> String {
    let replaced = unsafe_chars_re().replace_all(name, "_");
    underscore_run_re().replace_all(&replaced, "_").into_owned()
}

/// `{iteration_id}/{unix_millis}-{nonce}-{safe_name}`; the nonce keeps
/// same-name uploads in the same millisecond apart.
pub fn storage_key(iteration_id: &str, file_name: &str, at: DateTime<Utc>) -> String {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}-{}-{}",
        iteration_id,
        at.timestamp_millis(),
        &nonce[..8],
        safe_file_name(file_name)
    )
}

/// Recover the storage key from a public URL produced under `base_url`.
pub fn storage_key_from_url(file_url: &str, base_url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    file_url
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Short display label for a MIME type ("PDF", "DOCX", "PNG").
pub fn file_type_label(mime_type: &str) -> String {
    let known = match mime_type {
        "application/pdf" => Some("PDF"),
        "text/markdown" => Some("MD"),
        "text/plain" => Some("TXT"),
        "text/csv" => Some("CSV"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("DOCX"),
        "application/msword" => Some("DOC"),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some("XLSX"),
        "application/vnd.ms-excel" => Some("XLS"),
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => Some("PPTX"),
        "application/vnd.ms-powerpoint" => Some("PPT"),
        _ => None,
    };
    match known {
        Some(label) => label.to_string(),
        None => mime_type
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "FILE".to_string()),
    }
}

pub fn is_image(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}
