//! Turning `/process-upload` responses into something the local pipeline can
//! act on.
//!
//! The same endpoint answers with an archive or with JSON depending on the
//! destination the request carried, so decoding is driven by that
//! destination rather than by sniffing the response's content type.

use crate::error::AppError;
use crate::models::result_types::OperationResult;
use crate::models::upload_types::LocalDestination;
use crate::services::api::RawResponse;
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

pub const DEFAULT_ARCHIVE_CONTENT_TYPE: &str = "application/zip";
const FALLBACK_ARCHIVE_PREFIX: &str = "PixClad_Output_";

#[derive(Debug, Clone, PartialEq)]
pub enum UploadResponse {
    Archive {
        bytes: Vec<u8>,
        filename: String,
        content_type: String,
    },
    ResultSet(OperationResult),
}

#[derive(Deserialize)]
struct ResultBody {
    #[serde(default)]
    results: Option<OperationResult>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

fn disposition_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)filename\*?=(?:UTF-8'')?"?([^;"]+)"#).expect("static regex")
    })
}

/// Pull the save name out of a `Content-Disposition` header value.
/// Percent-escapes are decoded; an undecodable value is used as sent.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let raw = disposition_pattern()
        .captures(header)?
        .get(1)?
        .as_str()
        .trim();
    if raw.is_empty() {
        return None;
    }

    let name = match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    };
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

/// `PixClad_Output_2026-10-19T05-19-00-123Z.zip` for the given instant.
pub fn fallback_archive_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}{}.zip", FALLBACK_ARCHIVE_PREFIX, stamp)
}

/// Decode a successful upload response according to the destination that
/// was requested.
pub fn decode_upload_response(
    destination: LocalDestination,
    raw: RawResponse,
    now: DateTime<Utc>,
) -> Result<UploadResponse, AppError> {
    match destination {
        LocalDestination::Download => {
            let filename = raw
                .content_disposition
                .as_deref()
                .and_then(filename_from_content_disposition)
                .unwrap_or_else(|| fallback_archive_name(now));
            let content_type = raw
                .content_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ARCHIVE_CONTENT_TYPE.to_string());
            log::debug!(
                "Archive response: {} ({} bytes, {})",
                filename,
                raw.body.len(),
                content_type
            );
            Ok(UploadResponse::Archive {
                bytes: raw.body,
                filename,
                content_type,
            })
        }
        LocalDestination::RemoteDrive => {
            let body: ResultBody = serde_json::from_slice(&raw.body)?;
            Ok(UploadResponse::ResultSet(body.results.unwrap_or_default()))
        }
    }
}

/// Read the `error` field out of a failed response's body. The body may be
/// anything, including binary, so every step is allowed to fail; decoding
/// runs off the async threads.
pub async fn error_message_from_body(body: Option<Vec<u8>>) -> Option<String> {
    let body = body?;
    tokio::task::spawn_blocking(move || {
        let text = String::from_utf8(body).ok()?;
        let parsed: ErrorBody = serde_json::from_str(&text).ok()?;
        parsed.error.filter(|e| !e.is_empty())
    })
    .await
    .ok()
    .flatten()
}
