//! Saving finished recordings.
//!
//! Renderers hand over a URL for the recorded file plus a suggested name.
//! The user picks the destination in a native save dialog; the bytes are
//! then written from the URL:
//!
//! - `data:` URLs are decoded in place (base64 or percent-encoded)
//! - `file://` URLs and absolute paths are copied
//! - anything else is refused

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tauri::AppHandle;
use tauri_plugin_dialog::DialogExt;
use ts_rs::TS;

use crate::error::{RecorderError, RecorderResult};

/// Payload of the download commands.
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[ts(export)]
pub struct DownloadRequest {
    pub url: String,
    pub filename: String,
}

/// Where the bytes of a download come from.
#[derive(Debug, PartialEq)]
pub enum DownloadSource {
    Inline(Vec<u8>),
    File(PathBuf),
}

/// Work out how to read `url` without touching the filesystem.
pub fn parse_source(url: &str) -> RecorderResult<DownloadSource> {
    if let Some(rest) = url.strip_prefix("data:") {
        let (meta, data) = rest
            .split_once(',')
            .ok_or_else(|| RecorderError::Download("Malformed data URL".to_string()))?;
        let bytes = if meta.ends_with(";base64") {
            STANDARD
                .decode(data.trim())
                .map_err(|e| RecorderError::Download(format!("Invalid base64 payload: {}", e)))?
        } else {
            urlencoding::decode_binary(data.as_bytes()).into_owned()
        };
        return Ok(DownloadSource::Inline(bytes));
    }

    if let Some(rest) = url.strip_prefix("file://") {
        let decoded = urlencoding::decode(rest)
            .map_err(|e| RecorderError::Download(format!("Invalid file URL: {}", e)))?;
        return Ok(DownloadSource::File(file_url_path(&decoded)));
    }

    if !url.contains("://") && Path::new(url).is_absolute() {
        return Ok(DownloadSource::File(PathBuf::from(url)));
    }

    // blob: URLs only resolve inside the renderer that created them
    Err(RecorderError::Download(format!(
        "Unsupported download URL scheme '{}': send the recording as a data: URL or a file path",
        url.split(':').next().unwrap_or_default()
    )))
}

/// `file:///C:/x` carries a leading slash before the drive letter.
fn file_url_path(path: &str) -> PathBuf {
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':';
    if has_drive {
        PathBuf::from(&path[1..])
    } else {
        PathBuf::from(path)
    }
}

/// Write `source` to `destination`, returning the number of bytes written.
pub fn write_download(source: &DownloadSource, destination: &Path) -> RecorderResult<u64> {
    match source {
        DownloadSource::Inline(bytes) => {
            fs::write(destination, bytes)?;
            Ok(bytes.len() as u64)
        },
        DownloadSource::File(path) => {
            if !path.exists() {
                return Err(RecorderError::Download(format!(
                    "Source file not found: {}",
                    path.display()
                )));
            }
            Ok(fs::copy(path, destination)?)
        },
    }
}

/// Ask for a destination and save the download there. `None` when the user
/// cancelled the dialog.
pub fn save_with_dialog(app: &AppHandle, request: &DownloadRequest) -> RecorderResult<Option<PathBuf>> {
    let source = parse_source(&request.url).map_err(|e| {
        log::warn!("[DOWNLOAD] Cannot save {}: {}", request.filename, e);
        e
    })?;

    let Some(picked) = app
        .dialog()
        .file()
        .set_file_name(&request.filename)
        .blocking_save_file()
    else {
        log::info!("[DOWNLOAD] Save dialog cancelled for {}", request.filename);
        return Ok(None);
    };

    let destination = picked
        .into_path()
        .map_err(|e| RecorderError::Download(format!("Invalid destination: {}", e)))?;
    let written = write_download(&source, &destination)?;
    log::info!("[DOWNLOAD] Saved {} bytes to {:?}", written, destination);
    Ok(Some(destination))
}
