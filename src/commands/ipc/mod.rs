//! IPC commands invoked by the renderers.
//!
//! Thin wrappers over [`AppState`]: each command locks nothing itself and
//! returns as soon as the state has been updated. Commands whose failures
//! the renderer cannot act on only log them and return `Ok`.
//!
//! ## Command map
//!
//! ```text
//! close_win / min_win / max_win            lifecycle by window name
//! rfs_*                                    full-screen recording toolbar
//! rs_select_area_*                         region selector
//! rs_*                                     source clip and its controls
//! settings_*, keyboard_overlay_*           singleton windows
//! theme_*, theme_color_*                   appearance, broadcast on set
//! open_external                            window.open / _blank targets
//! ```

pub mod channels;

use std::sync::Arc;
use tauri::{command, AppHandle, State};

use crate::commands::capture::DesktopCapturerSource;
use crate::commands::download::{self, DownloadRequest};
use crate::commands::window::native;
use crate::config::{ThemeColor, ThemeMode, WindowKind};
use crate::error::RecorderResult;
use crate::geometry::Rect;
use crate::state::AppState;

type AppStateRef<'a> = State<'a, Arc<AppState>>;

/// Log a failure the renderer has no use for.
fn log_failure(command: &str, result: RecorderResult<()>) {
    if let Err(e) = result {
        log::warn!("[IPC] {} failed: {}", command, e);
    }
}

// ============================================================================
// Window lifecycle
// ============================================================================

#[command]
pub async fn close_win(state: AppStateRef<'_>, win_name: WindowKind) -> Result<(), String> {
    state.close_window(win_name);
    Ok(())
}

#[command]
pub async fn min_win(state: AppStateRef<'_>, win_name: WindowKind) -> Result<(), String> {
    state.minimize_window(win_name);
    Ok(())
}

#[command]
pub async fn max_win(state: AppStateRef<'_>, win_name: WindowKind, is_max: bool) -> Result<(), String> {
    state.maximize_window(win_name, is_max);
    Ok(())
}

// ============================================================================
// Full-screen recording
// ============================================================================

#[command]
pub async fn rfs_open(state: AppStateRef<'_>) -> Result<(), String> {
    log_failure("rfs_open", state.inner().open_toolbar());
    Ok(())
}

#[command]
pub async fn rfs_close(state: AppStateRef<'_>) -> Result<(), String> {
    state.close_window(WindowKind::RecorderFullScreen);
    Ok(())
}

#[command]
pub async fn rfs_mouse_enter(state: AppStateRef<'_>) -> Result<(), String> {
    state.inner().toolbar_mouse_enter();
    Ok(())
}

#[command]
pub async fn rfs_mouse_leave(state: AppStateRef<'_>) -> Result<(), String> {
    state.inner().toolbar_mouse_leave();
    Ok(())
}

#[command]
pub async fn rfs_set_recording_state(state: AppStateRef<'_>, is_recording: bool) -> Result<(), String> {
    log_failure("rfs_set_recording_state", state.set_full_screen_recording(is_recording));
    Ok(())
}

#[command]
pub async fn rfs_get_desktop_capturer_source(
    state: AppStateRef<'_>,
) -> RecorderResult<DesktopCapturerSource> {
    state.desktop_capturer_source()
}

#[command]
pub async fn rfs_download(app: AppHandle, download: DownloadRequest) -> RecorderResult<Option<String>> {
    save_download(&app, &download)
}

// ============================================================================
// Region selector
// ============================================================================

#[command]
pub async fn rs_select_area_open(state: AppStateRef<'_>) -> Result<(), String> {
    log_failure("rs_select_area_open", state.open_shot());
    Ok(())
}

#[command]
pub async fn rs_select_area_close(state: AppStateRef<'_>) -> Result<(), String> {
    state.close_window(WindowKind::RecorderShot);
    Ok(())
}

// ============================================================================
// Source clip
// ============================================================================

/// Open the clip window over `bounds` (logical pixels) with its controls.
#[command]
pub async fn rs_open(state: AppStateRef<'_>, bounds: Rect) -> Result<(), String> {
    log_failure("rs_open", state.open_source_clip(bounds));
    Ok(())
}

#[command]
pub async fn rs_close(state: AppStateRef<'_>) -> Result<(), String> {
    state.close_window(WindowKind::RecorderSourceClip);
    Ok(())
}

#[command]
pub async fn rs_get_bounds_clip(state: AppStateRef<'_>) -> Result<Option<Rect>, String> {
    Ok(state.source_clip_bounds())
}

#[command]
pub async fn rs_get_desktop_capturer_source(
    state: AppStateRef<'_>,
) -> RecorderResult<DesktopCapturerSource> {
    state.desktop_capturer_source()
}

#[command]
pub async fn rs_set_ignore_mouse_event(state: AppStateRef<'_>, ignore: bool) -> Result<(), String> {
    state.set_source_clip_ignore_mouse(ignore);
    Ok(())
}

/// Recording started or stopped in the clip. The clip is locked while
/// recording.
#[command]
pub async fn rs_set_movable(state: AppStateRef<'_>, is_recording: bool) -> Result<(), String> {
    log_failure("rs_set_movable", state.set_source_clip_recording(is_recording));
    Ok(())
}

#[command]
pub async fn rs_download(app: AppHandle, download: DownloadRequest) -> RecorderResult<Option<String>> {
    save_download(&app, &download)
}

fn save_download(app: &AppHandle, request: &DownloadRequest) -> RecorderResult<Option<String>> {
    let saved = download::save_with_dialog(app, request)?;
    Ok(saved.map(|path| path.to_string_lossy().to_string()))
}

// ============================================================================
// Settings and overlays
// ============================================================================

#[command]
pub async fn settings_open(state: AppStateRef<'_>) -> Result<(), String> {
    log_failure("settings_open", state.open_settings());
    Ok(())
}

#[command]
pub async fn settings_close(state: AppStateRef<'_>) -> Result<(), String> {
    state.close_window(WindowKind::Settings);
    Ok(())
}

#[command]
pub async fn keyboard_overlay_open(state: AppStateRef<'_>) -> Result<(), String> {
    log_failure("keyboard_overlay_open", state.open_keyboard_overlay());
    Ok(())
}

#[command]
pub async fn keyboard_overlay_close(state: AppStateRef<'_>) -> Result<(), String> {
    state.close_window(WindowKind::KeyboardOverlay);
    Ok(())
}

// ============================================================================
// Theme
// ============================================================================

#[command]
pub async fn theme_get(state: AppStateRef<'_>) -> Result<ThemeMode, String> {
    Ok(state.theme())
}

#[command]
pub async fn theme_set(state: AppStateRef<'_>, mode: ThemeMode) -> Result<(), String> {
    state.set_theme(mode);
    Ok(())
}

#[command]
pub async fn theme_color_get(state: AppStateRef<'_>) -> Result<ThemeColor, String> {
    Ok(state.theme_color())
}

#[command]
pub async fn theme_color_set(state: AppStateRef<'_>, color: ThemeColor) -> Result<(), String> {
    state.set_theme_color(color);
    Ok(())
}

// ============================================================================
// External links
// ============================================================================

/// `window.open` and `target="_blank"` requests from a renderer.
#[command]
pub async fn open_external(url: String) -> Result<(), String> {
    native::open_external(&url);
    Ok(())
}
