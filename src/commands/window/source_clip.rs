//! Source clip: the borderless window framing the region being recorded.
//!
//! The window must stay fully inside some display. The OS reports moves
//! after they happen, so an invalid move is answered with a corrective
//! reposition. The guard remembers where the correction is heading so the
//! move event it causes is recognised and not checked again.
//!
//! ```text
//! Idle --invalid move--> Correcting { target } --move to target--> Idle
//! ```
//!
//! While recording the clip is not movable: any move is reverted to the
//! anchored origin through the same guarded path.

use super::handle::{ReadyAction, WindowFactory, WindowHandle};
use crate::commands::display::{constrain, DisplayInfo};
use crate::config::{descriptor, WindowKind};
use crate::error::RecorderResult;
use crate::geometry::{Point, Rect};

/// Positions closer than this are treated as equal. Covers rounding when
/// the OS reports physical coordinates.
const POSITION_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveGuard {
    Idle,
    Correcting { target: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// The new position is valid and becomes the anchor.
    Accepted,
    /// The window is being moved back to the given origin.
    Corrected(Point),
    /// The corrective reposition arrived.
    Settled,
}

pub struct SourceClip {
    pub handle: WindowHandle,
    width: f64,
    height: f64,
    /// Last accepted origin.
    anchor: Point,
    movable: bool,
    ignore_cursor: bool,
    guard: MoveGuard,
}

impl SourceClip {
    pub fn open(factory: &dyn WindowFactory, bounds: Rect) -> RecorderResult<Self> {
        let mut handle = WindowHandle::configure(descriptor(WindowKind::RecorderSourceClip).with_bounds(bounds));
        handle.when_ready(ReadyAction::AlwaysOnTop);
        handle.realize(factory)?;
        Ok(Self {
            handle,
            width: bounds.width,
            height: bounds.height,
            anchor: bounds.origin(),
            movable: true,
            ignore_cursor: false,
            guard: MoveGuard::Idle,
        })
    }

    pub fn guard(&self) -> MoveGuard {
        self.guard
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn ignores_cursor(&self) -> bool {
        self.ignore_cursor
    }

    /// Current on-screen bounds.
    pub fn area_bounds(&self) -> Option<Rect> {
        self.handle.bounds()
    }

    /// Let clicks fall through to the apps underneath.
    pub fn set_ignore_mouse_events(&mut self, ignore: bool) {
        self.ignore_cursor = ignore;
        self.handle.set_ignore_cursor_events(ignore);
    }

    /// Lock or unlock dragging. Locking pins the clip at its current origin.
    pub fn set_movable(&mut self, movable: bool) {
        if !movable {
            if let Some(bounds) = self.area_bounds() {
                self.anchor = bounds.origin();
            }
        }
        self.movable = movable;
    }

    /// The window was moved to `origin` (logical pixels).
    pub fn on_moved(&mut self, origin: Point, displays: &[DisplayInfo]) -> MoveOutcome {
        if let MoveGuard::Correcting { target } = self.guard {
            self.guard = MoveGuard::Idle;
            if near(origin, target) {
                self.anchor = target;
                return MoveOutcome::Settled;
            }
        }

        if !self.movable {
            if near(origin, self.anchor) {
                return MoveOutcome::Accepted;
            }
            return self.correct(self.anchor);
        }

        let candidate = Rect::new(origin.x, origin.y, self.width, self.height);
        match constrain(&candidate, displays) {
            Some(target) if !near(target, origin) => {
                log::debug!(
                    "[SOURCE_CLIP] Move to ({}, {}) leaves the displays, clamping to ({}, {})",
                    origin.x,
                    origin.y,
                    target.x,
                    target.y
                );
                self.correct(target)
            },
            _ => {
                self.anchor = origin;
                MoveOutcome::Accepted
            },
        }
    }

    fn correct(&mut self, target: Point) -> MoveOutcome {
        self.guard = MoveGuard::Correcting { target };
        self.handle.set_position(target);
        MoveOutcome::Corrected(target)
    }
}

fn near(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= POSITION_TOLERANCE && (a.y - b.y).abs() <= POSITION_TOLERANCE
}
