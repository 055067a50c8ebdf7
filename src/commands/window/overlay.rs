//! Click and key visualization overlays.
//!
//! Both are borderless, top-most and fully click-through. The click overlay
//! covers the primary display; the key overlay sits in its bottom-left
//! corner.

use std::sync::Arc;

use super::handle::{NativeWindow, WindowFactory, WindowHandle};
use crate::commands::display::DisplayProvider;
use crate::config::{descriptor, WindowKind};
use crate::error::RecorderResult;
use crate::geometry::Rect;

const KEY_OVERLAY_MAX_WIDTH: f64 = 600.0;
const KEY_OVERLAY_WIDTH_RATIO: f64 = 0.4;
const KEY_OVERLAY_HEIGHT: f64 = 200.0;
const KEY_OVERLAY_MARGIN_LEFT: f64 = 20.0;
const KEY_OVERLAY_MARGIN_BOTTOM: f64 = 100.0;

pub struct Overlay {
    pub handle: WindowHandle,
}

impl Overlay {
    /// Click overlay over the whole primary display.
    pub fn mouse_click(factory: &dyn WindowFactory, displays: &dyn DisplayProvider) -> RecorderResult<Self> {
        let primary = displays.primary()?;
        Self::open(factory, WindowKind::MouseClickOverlay, primary.bounds)
    }

    /// Key overlay anchored bottom-left on the primary display.
    pub fn keyboard(factory: &dyn WindowFactory, displays: &dyn DisplayProvider) -> RecorderResult<Self> {
        let primary = displays.primary()?;
        Self::open(factory, WindowKind::KeyboardOverlay, keyboard_bounds(primary.bounds))
    }

    fn open(factory: &dyn WindowFactory, kind: WindowKind, bounds: Rect) -> RecorderResult<Self> {
        let mut handle = WindowHandle::configure(descriptor(kind).with_bounds(bounds));
        handle.realize(factory)?;
        handle.set_ignore_cursor_events(true);
        Ok(Self { handle })
    }

    /// Show above everything else.
    pub fn show(&self) {
        self.handle.show();
        if let Some(window) = self.handle.window() {
            if let Err(e) = window.set_always_on_top(true) {
                log::warn!("[OVERLAY] Failed to raise {}: {}", self.handle.kind(), e);
            }
        }
    }

    /// Native window for the input hook to deliver events to.
    pub fn target(&self) -> Option<Arc<dyn NativeWindow>> {
        self.handle.window().cloned()
    }
}

/// At most 600px or 40% of the display wide, 200px tall, 20px from the left
/// and 100px above the bottom edge.
pub fn keyboard_bounds(display: Rect) -> Rect {
    let width = KEY_OVERLAY_MAX_WIDTH.min(display.width * KEY_OVERLAY_WIDTH_RATIO);
    Rect::new(
        display.x + KEY_OVERLAY_MARGIN_LEFT,
        display.bottom() - KEY_OVERLAY_HEIGHT - KEY_OVERLAY_MARGIN_BOTTOM,
        width,
        KEY_OVERLAY_HEIGHT,
    )
}
