//! Recording controls shown under the selected source clip.

use super::handle::{ReadyAction, WindowFactory, WindowHandle};
use crate::config::{descriptor, WindowKind};
use crate::error::RecorderResult;
use crate::geometry::{Point, Rect};

/// Vertical gap between the clip and the controls.
pub const CLIP_GAP: f64 = 8.0;

pub struct RecorderScreen {
    pub handle: WindowHandle,
}

impl RecorderScreen {
    pub fn open(factory: &dyn WindowFactory, clip: Rect) -> RecorderResult<Self> {
        let descriptor = descriptor(WindowKind::RecorderScreen).with_position(controls_origin(clip));
        let mut handle = WindowHandle::configure(descriptor);
        handle.when_ready(ReadyAction::AlwaysOnTop);
        handle.realize(factory)?;
        Ok(Self { handle })
    }
}

/// Left-aligned with the clip, just below its bottom edge.
pub fn controls_origin(clip: Rect) -> Point {
    Point::new(clip.x, clip.bottom() + CLIP_GAP)
}
