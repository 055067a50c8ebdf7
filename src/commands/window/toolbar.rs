//! Full-screen recording toolbar.
//!
//! The toolbar sits centered at the top of the primary display, parked
//! above the edge with a 5px strip left on screen. While parked it ignores
//! the cursor so it never blocks clicks; a global cursor poll reveals it
//! when the pointer reaches the strip.
//!
//! ```text
//! Hidden --show--> Shown --(300ms idle)--> Hidden
//!          ^                     |
//!          +---- hide timer -----+   (cancelled by renewed interaction)
//! ```
//!
//! Hide timers are identified by a token. Scheduling or cancelling replaces
//! the pending token, so a stale timer that fires later finds a mismatch
//! and does nothing.

use std::time::Duration;

use super::handle::{WindowFactory, WindowHandle};
use crate::commands::display::DisplayProvider;
use crate::config::{descriptor, WindowKind};
use crate::error::RecorderResult;
use crate::commands::input_hook::pointer::pointer_to_logical;
use crate::geometry::{Point, Rect};

/// Idle time before the toolbar tucks itself away.
pub const HIDE_DELAY: Duration = Duration::from_millis(300);

/// Length of the slide transition. Show/hide requests during it are ignored.
pub const SLIDE_DURATION: Duration = Duration::from_millis(150);

/// Interval of the global cursor poll driving the hot zone.
pub const HOT_ZONE_POLL: Duration = Duration::from_millis(50);

/// Height of the strip that stays on screen while hidden.
pub const HOT_ZONE_HEIGHT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Shown,
}

/// What the cursor poll should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAction {
    None,
    Reveal,
    ScheduleHide,
    CancelHide,
}

pub struct RecorderToolbar {
    pub handle: WindowHandle,
    /// Top edge and horizontal placement on the primary display.
    top: f64,
    x: f64,
    width: f64,
    height: f64,
    scale_factor: f64,
    visibility: Visibility,
    animating: bool,
    pending_hide: Option<u64>,
    next_token: u64,
}

impl RecorderToolbar {
    pub fn open(factory: &dyn WindowFactory, displays: &dyn DisplayProvider) -> RecorderResult<Self> {
        let primary = displays.primary()?;
        let base = descriptor(WindowKind::RecorderFullScreen);
        let (width, height) = (base.width(), base.height());
        let x = primary.bounds.x + ((primary.bounds.width - width) / 2.0).round();
        let top = primary.bounds.y;

        let descriptor = base.with_position(Point::new(x, top - height + HOT_ZONE_HEIGHT));
        let mut handle = WindowHandle::configure(descriptor);
        handle.realize(factory)?;
        handle.set_ignore_cursor_events(true);

        Ok(Self {
            handle,
            top,
            x,
            width,
            height,
            scale_factor: primary.scale_factor,
            visibility: Visibility::Hidden,
            animating: false,
            pending_hide: None,
            next_token: 0,
        })
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn pending_hide(&self) -> Option<u64> {
        self.pending_hide
    }

    /// Origin while parked above the top edge.
    pub fn hidden_origin(&self) -> Point {
        Point::new(self.x, self.top - self.height + HOT_ZONE_HEIGHT)
    }

    pub fn shown_origin(&self) -> Point {
        Point::new(self.x, self.top)
    }

    /// The on-screen strip of the parked toolbar.
    pub fn hot_zone(&self) -> Rect {
        Rect::new(self.x, self.top, self.width, HOT_ZONE_HEIGHT)
    }

    /// Area the cursor may roam without the shown toolbar hiding.
    pub fn active_zone(&self) -> Rect {
        Rect::new(self.x, self.top, self.width, self.height)
    }

    /// Slide into view and accept clicks. Returns true when a transition
    /// started; the caller ends it with [`Self::finish_transition`].
    pub fn show(&mut self) -> bool {
        self.cancel_hide();
        if self.animating || self.visibility == Visibility::Shown {
            return false;
        }
        self.animating = true;
        self.visibility = Visibility::Shown;
        self.handle.set_ignore_cursor_events(false);
        self.handle.set_position(self.shown_origin());
        true
    }

    /// Tuck away and let clicks through.
    pub fn hide(&mut self) -> bool {
        self.cancel_hide();
        if self.animating || self.visibility == Visibility::Hidden {
            return false;
        }
        self.animating = true;
        self.visibility = Visibility::Hidden;
        self.handle.set_ignore_cursor_events(true);
        self.handle.set_position(self.hidden_origin());
        true
    }

    pub fn finish_transition(&mut self) {
        self.animating = false;
    }

    /// Replace any pending hide with a new one and return its token.
    pub fn schedule_hide(&mut self) -> u64 {
        self.next_token += 1;
        self.pending_hide = Some(self.next_token);
        self.next_token
    }

    pub fn cancel_hide(&mut self) {
        self.pending_hide = None;
    }

    /// A hide timer fired. Only the latest scheduled timer hides, and only
    /// when the toolbar is shown and not mid-transition.
    pub fn on_hide_timer(&mut self, token: u64) -> bool {
        if self.pending_hide != Some(token) {
            return false;
        }
        self.pending_hide = None;
        if self.visibility == Visibility::Shown && !self.animating {
            return self.hide();
        }
        false
    }

    /// Decide what a global cursor sample means. A pointer back over the
    /// shown toolbar cancels the pending hide.
    pub fn on_cursor(&self, raw: (i32, i32)) -> CursorAction {
        let cursor = pointer_to_logical(raw, self.scale_factor);
        match self.visibility {
            Visibility::Hidden if self.hot_zone().contains_point(cursor) => CursorAction::Reveal,
            Visibility::Shown => match (self.active_zone().contains_point(cursor), self.pending_hide) {
                (false, None) => CursorAction::ScheduleHide,
                (true, Some(_)) => CursorAction::CancelHide,
                _ => CursorAction::None,
            },
            _ => CursorAction::None,
        }
    }
}
