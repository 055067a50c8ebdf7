//! Capture sources and display snapshots.
//!
//! Screen sources are identified the way `getDisplayMedia` pickers expect
//! (`screen:<display id>:0`) and tied to the xcap monitor id, so the display
//! reported to the renderer and the source it records are always the same.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, RgbaImage};
use serde::Serialize;
use std::io::Cursor;
use ts_rs::TS;
use xcap::Monitor;

use super::display::{DisplayInfo, DisplayProvider, DEPTH_PER_COMPONENT};
use crate::error::{RecorderError, RecorderResult};

/// One capturable screen.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CaptureSource {
    pub id: String,
    pub name: String,
    pub display_id: String,
}

impl CaptureSource {
    pub fn for_display(display: &DisplayInfo) -> Self {
        Self {
            id: format!("screen:{}:0", display.id),
            name: display.name.clone(),
            display_id: display.id.to_string(),
        }
    }

    fn matches(&self, display_id: u32) -> bool {
        self.display_id.parse::<u32>().ok() == Some(display_id)
    }
}

/// Primary display description returned to the recorder windows.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DesktopCapturerSource {
    /// Source for the primary display, if one matched.
    pub source: Option<CaptureSource>,
    pub display_id: u32,
    /// Logical size of the primary display.
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
    pub depth_per_component: u32,
}

/// Enumerate every screen source.
pub fn list_sources(displays: &dyn DisplayProvider) -> RecorderResult<Vec<CaptureSource>> {
    Ok(displays
        .displays()?
        .iter()
        .map(CaptureSource::for_display)
        .collect())
}

/// Source whose display id equals `display_id`.
pub fn find_source(sources: &[CaptureSource], display_id: u32) -> Option<&CaptureSource> {
    sources.iter().find(|s| s.matches(display_id))
}

/// Like [`find_source`], falling back to the first source.
pub fn select_source(sources: &[CaptureSource], display_id: u32) -> Option<&CaptureSource> {
    find_source(sources, display_id).or_else(|| sources.first())
}

/// Describe the primary display and its capture source.
pub fn describe_primary(displays: &dyn DisplayProvider) -> RecorderResult<DesktopCapturerSource> {
    let primary = displays.primary()?;
    let sources = list_sources(displays)?;
    let source = find_source(&sources, primary.id).cloned();

    if source.is_none() {
        log::warn!("[CAPTURE] No capture source for primary display {}", primary.id);
    }

    Ok(DesktopCapturerSource {
        source,
        display_id: primary.id,
        width: primary.bounds.width,
        height: primary.bounds.height,
        scale_factor: primary.scale_factor,
        depth_per_component: DEPTH_PER_COMPONENT,
    })
}

/// Snapshot a display at full physical resolution as a PNG data URL.
///
/// Falls back to the first monitor when `display_id` is not connected.
pub fn capture_display_data_url(display_id: u32) -> RecorderResult<String> {
    let monitors =
        Monitor::all().map_err(|e| RecorderError::Capture(format!("Failed to get monitors: {}", e)))?;

    let monitor = monitors
        .iter()
        .find(|m| m.id().ok() == Some(display_id))
        .or_else(|| monitors.first())
        .ok_or_else(|| RecorderError::Capture("No monitors found".to_string()))?;

    let image = monitor
        .capture_image()
        .map_err(|e| RecorderError::Capture(format!("Failed to capture screen: {}", e)))?;

    png_data_url(image)
}

/// Encode an image as `data:image/png;base64,...`.
pub fn png_data_url(image: RgbaImage) -> RecorderResult<String> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(buffer.get_ref())))
}
