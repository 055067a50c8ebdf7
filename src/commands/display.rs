//! Display enumeration and on-screen containment.
//!
//! Displays are read through xcap and reported in logical pixels. xcap
//! returns physical coordinates on Windows and Linux and points on macOS, so
//! the conversion only divides by the scale factor off macOS.

use serde::Serialize;
use ts_rs::TS;
use xcap::Monitor;

pub use crate::geometry::{Point, Rect};

use crate::error::{RecorderError, RecorderResult};

/// Color depth reported for every display. The OS APIs behind xcap do not
/// expose it and every supported desktop composes at 8 bits per channel.
pub const DEPTH_PER_COMPONENT: u32 = 8;

/// A connected display in logical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DisplayInfo {
    pub id: u32,
    pub name: String,
    pub bounds: Rect,
    pub scale_factor: f64,
    pub is_primary: bool,
    pub depth_per_component: u32,
}

/// Source of display information. The xcap-backed provider is used at
/// runtime; tests substitute a fixed layout.
pub trait DisplayProvider: Send + Sync {
    fn displays(&self) -> RecorderResult<Vec<DisplayInfo>>;

    /// Full-resolution snapshot of one display as an embeddable data URL.
    fn capture_data_url(&self, display_id: u32) -> RecorderResult<String>;

    /// Primary display, or the first one when none is flagged primary.
    fn primary(&self) -> RecorderResult<DisplayInfo> {
        let displays = self.displays()?;
        primary_of(&displays)
            .cloned()
            .ok_or_else(|| RecorderError::Display("No displays found".to_string()))
    }
}

pub fn primary_of(displays: &[DisplayInfo]) -> Option<&DisplayInfo> {
    displays
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| displays.first())
}

// ============================================================================
// xcap provider
// ============================================================================

pub struct XcapDisplays;

impl DisplayProvider for XcapDisplays {
    fn displays(&self) -> RecorderResult<Vec<DisplayInfo>> {
        let monitors =
            Monitor::all().map_err(|e| RecorderError::Display(format!("Failed to get monitors: {}", e)))?;

        let displays: Vec<DisplayInfo> = monitors
            .iter()
            .enumerate()
            .map(|(idx, monitor)| {
                let scale_factor = f64::from(monitor.scale_factor().unwrap_or(1.0));
                let physical = Rect::new(
                    f64::from(monitor.x().unwrap_or(0)),
                    f64::from(monitor.y().unwrap_or(0)),
                    f64::from(monitor.width().unwrap_or(0)),
                    f64::from(monitor.height().unwrap_or(0)),
                );
                DisplayInfo {
                    id: monitor.id().unwrap_or(idx as u32),
                    name: monitor
                        .name()
                        .unwrap_or_else(|_| format!("Display {}", idx)),
                    bounds: logical_bounds(physical, scale_factor),
                    scale_factor,
                    is_primary: monitor.is_primary().unwrap_or(idx == 0),
                    depth_per_component: DEPTH_PER_COMPONENT,
                }
            })
            .filter(|d| d.bounds.width > 0.0 && d.bounds.height > 0.0)
            .collect();

        if displays.is_empty() {
            return Err(RecorderError::Display("No displays found".to_string()));
        }
        Ok(displays)
    }

    fn capture_data_url(&self, display_id: u32) -> RecorderResult<String> {
        super::capture::capture_display_data_url(display_id)
    }
}

fn logical_bounds(physical: Rect, scale_factor: f64) -> Rect {
    if cfg!(target_os = "macos") || scale_factor <= 0.0 {
        return physical;
    }
    Rect::new(
        (physical.x / scale_factor).round(),
        (physical.y / scale_factor).round(),
        (physical.width / scale_factor).round(),
        (physical.height / scale_factor).round(),
    )
}

// ============================================================================
// Containment
// ============================================================================

/// True when `bounds` lies entirely inside at least one display.
pub fn is_contained(bounds: &Rect, displays: &[DisplayInfo]) -> bool {
    displays.iter().any(|d| d.bounds.contains_rect(bounds))
}

/// Corrected origin for a window moved to `candidate`.
///
/// Returns `None` when the candidate is fully inside some display. Otherwise
/// returns the candidate clamped into the primary display.
pub fn constrain(candidate: &Rect, displays: &[DisplayInfo]) -> Option<Point> {
    if is_contained(candidate, displays) {
        return None;
    }
    let primary = primary_of(displays)?;
    Some(
        primary
            .bounds
            .clamp_origin(candidate.origin(), candidate.width, candidate.height),
    )
}
