//! Base window wrapper.
//!
//! [`WindowHandle`] owns at most one native window and gives every
//! controller the same lifecycle contract:
//!
//! - `configure` stores the descriptor, nothing else
//! - `realize` creates the native window through a [`WindowFactory`]
//! - operations on a closed or destroyed window are silent no-ops
//! - `close` is idempotent and always drops the native reference
//!
//! Work that has to wait for the content to paint (showing a `ready_to_show`
//! window, pushing the first payload) is queued on a [`ReadyGate`].

use serde_json::Value;
use std::sync::Arc;

use crate::config::{WindowDescriptor, WindowKind};
use crate::error::RecorderResult;
use crate::geometry::{Point, Rect};

/// Operations the host needs from a native window.
pub trait NativeWindow: Send + Sync {
    /// Unique label of this window instance.
    fn label(&self) -> &str;
    fn is_destroyed(&self) -> bool;

    fn show(&self) -> RecorderResult<()>;
    fn hide(&self) -> RecorderResult<()>;
    fn is_visible(&self) -> bool;
    fn is_minimized(&self) -> bool;
    fn minimize(&self) -> RecorderResult<()>;
    fn unminimize(&self) -> RecorderResult<()>;
    fn maximize(&self) -> RecorderResult<()>;
    fn unmaximize(&self) -> RecorderResult<()>;
    fn set_focus(&self) -> RecorderResult<()>;
    fn close(&self) -> RecorderResult<()>;
    fn center(&self) -> RecorderResult<()>;

    fn set_position(&self, origin: Point) -> RecorderResult<()>;
    /// Outer bounds in logical pixels.
    fn bounds(&self) -> RecorderResult<Rect>;
    fn set_ignore_cursor_events(&self, ignore: bool) -> RecorderResult<()>;
    fn set_always_on_top(&self, on_top: bool) -> RecorderResult<()>;

    /// Send an event to this window only.
    fn emit(&self, event: &str, payload: Value) -> RecorderResult<()>;
}

/// Creates native windows from descriptors.
pub trait WindowFactory: Send + Sync {
    fn create(&self, descriptor: &WindowDescriptor) -> RecorderResult<Arc<dyn NativeWindow>>;
}

// ============================================================================
// Ready gate
// ============================================================================

/// Deferred work run once the window content signals it is ready.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadyAction {
    Show,
    AlwaysOnTop,
    Center,
    Emit { event: &'static str, payload: Value },
}

/// `Pending` collects actions until the first ready signal; afterwards the
/// gate stays `Ready` and actions run immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadyGate {
    Pending(Vec<ReadyAction>),
    Ready,
}

impl Default for ReadyGate {
    fn default() -> Self {
        ReadyGate::Pending(Vec::new())
    }
}

impl ReadyGate {
    /// Queue an action. Returns it back when the gate is already open so the
    /// caller can run it now.
    pub fn push(&mut self, action: ReadyAction) -> Option<ReadyAction> {
        match self {
            ReadyGate::Pending(queue) => {
                queue.push(action);
                None
            },
            ReadyGate::Ready => Some(action),
        }
    }

    /// Open the gate and take the queued actions. Later calls return nothing,
    /// so repeated page loads do not replay them.
    pub fn open(&mut self) -> Vec<ReadyAction> {
        match std::mem::replace(self, ReadyGate::Ready) {
            ReadyGate::Pending(queue) => queue,
            ReadyGate::Ready => Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ReadyGate::Ready)
    }
}

// ============================================================================
// Window handle
// ============================================================================

pub struct WindowHandle {
    descriptor: WindowDescriptor,
    window: Option<Arc<dyn NativeWindow>>,
    ready: ReadyGate,
}

impl WindowHandle {
    /// Store the creation parameters. No native window exists yet.
    pub fn configure(descriptor: WindowDescriptor) -> Self {
        Self {
            descriptor,
            window: None,
            ready: ReadyGate::default(),
        }
    }

    /// Create the native window. A `ready_to_show` window is shown once its
    /// content is ready.
    pub fn realize(&mut self, factory: &dyn WindowFactory) -> RecorderResult<()> {
        if self.window.is_some() {
            return Ok(());
        }
        if self.descriptor.ready_to_show {
            self.ready.push(ReadyAction::Show);
        }
        let window = factory.create(&self.descriptor)?;
        log::debug!(
            "[WINDOW] Created {} ({})",
            self.descriptor.kind,
            window.label()
        );
        self.window = Some(window);
        Ok(())
    }

    pub fn kind(&self) -> WindowKind {
        self.descriptor.kind
    }

    pub fn descriptor(&self) -> &WindowDescriptor {
        &self.descriptor
    }

    /// The native window while it is alive.
    pub fn window(&self) -> Option<&Arc<dyn NativeWindow>> {
        self.window.as_ref().filter(|w| !w.is_destroyed())
    }

    pub fn is_open(&self) -> bool {
        self.window().is_some()
    }

    /// True when this handle owns the window labelled `label`.
    pub fn owns(&self, label: &str) -> bool {
        self.window.as_ref().is_some_and(|w| w.label() == label)
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.window().and_then(|w| w.bounds().ok())
    }

    // ========================================================================
    // Ready handling
    // ========================================================================

    /// Run `action` once the content is ready (immediately if it already is).
    pub fn when_ready(&mut self, action: ReadyAction) {
        if let Some(action) = self.ready.push(action) {
            self.run(action);
        }
    }

    /// Content finished loading: run everything that was waiting for it.
    pub fn on_ready(&mut self) {
        for action in self.ready.open() {
            self.run(action);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    fn run(&self, action: ReadyAction) {
        match action {
            ReadyAction::Show => self.apply("show", |w| w.show()),
            ReadyAction::AlwaysOnTop => self.apply("always_on_top", |w| w.set_always_on_top(true)),
            ReadyAction::Center => self.apply("center", |w| w.center()),
            ReadyAction::Emit { event, payload } => self.apply(event, |w| w.emit(event, payload)),
        }
    }

    // ========================================================================
    // Lifecycle operations
    // ========================================================================

    pub fn show(&self) {
        self.apply("show", |w| w.show());
    }

    pub fn hide(&self) {
        self.apply("hide", |w| w.hide());
    }

    pub fn minimize(&self) {
        self.apply("minimize", |w| w.minimize());
    }

    pub fn maximize(&self) {
        self.apply("maximize", |w| w.maximize());
    }

    pub fn unmaximize(&self) {
        self.apply("unmaximize", |w| w.unmaximize());
    }

    /// Restore if minimized, show if hidden, then focus.
    pub fn focus(&self) {
        self.apply("focus", |w| {
            if w.is_minimized() {
                w.unminimize()?;
            }
            if !w.is_visible() {
                w.show()?;
            }
            w.set_focus()
        });
    }

    pub fn set_position(&self, origin: Point) {
        self.apply("set_position", |w| w.set_position(origin));
    }

    pub fn set_ignore_cursor_events(&self, ignore: bool) {
        self.apply("set_ignore_cursor_events", |w| w.set_ignore_cursor_events(ignore));
    }

    pub fn emit(&self, event: &str, payload: Value) {
        self.apply(event, |w| w.emit(event, payload));
    }

    /// Close the window if it is still alive and drop the reference.
    pub fn close(&mut self) {
        if let Some(window) = self.window.take() {
            if !window.is_destroyed() {
                if let Err(e) = window.close() {
                    log::warn!("[WINDOW] Failed to close {}: {}", self.descriptor.kind, e);
                }
            }
        }
    }

    /// The window was destroyed by the OS or the user: drop the reference
    /// without touching it.
    pub fn release(&mut self) {
        self.window = None;
    }

    fn apply<F>(&self, op: &str, f: F)
    where
        F: FnOnce(&dyn NativeWindow) -> RecorderResult<()>,
    {
        if let Some(window) = self.window() {
            if let Err(e) = f(window.as_ref()) {
                log::warn!("[WINDOW] {} failed on {}: {}", op, self.descriptor.kind, e);
            }
        }
    }
}
