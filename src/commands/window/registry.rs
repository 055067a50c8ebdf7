//! Window registry.
//!
//! Owns every controller. Each window kind has at most one live entry;
//! entries are cleared when their window goes away, whether closed by a
//! command or destroyed by the OS. Clearing an entry can cascade:
//!
//! - source clip gone: its recorder controls close and a region recording
//!   flow ends
//! - toolbar gone: a full-screen recording flow ends
//! - click overlay gone: the mouse channel must detach
//! - key overlay gone: the keyboard channel must detach
//!
//! The registry does not own the input hook. Cascades that concern it are
//! returned as [`Teardown`] steps for the caller to apply.

use std::sync::Arc;

use super::handle::{NativeWindow, WindowFactory, WindowHandle};
use super::main_window::MainWindow;
use super::overlay::Overlay;
use super::recorder_screen::RecorderScreen;
use super::settings::SettingsWindow;
use super::shot::{RecorderShot, Snapshot};
use super::source_clip::{MoveOutcome, SourceClip};
use super::toolbar::RecorderToolbar;
use crate::commands::display::{DisplayInfo, DisplayProvider};
use crate::config::WindowKind;
use crate::error::{RecorderError, RecorderResult};
use crate::geometry::{Point, Rect};

/// Which recording surface drives the click overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingFlow {
    FullScreen,
    SourceClip,
}

/// Input hook work left over after windows went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    DetachMouse,
    DetachKeyboard,
}

/// Where the mouse channel should deliver clicks.
pub struct MouseTarget {
    pub window: Arc<dyn NativeWindow>,
    pub bounds: Option<Rect>,
}

pub struct WindowRegistry {
    factory: Arc<dyn WindowFactory>,
    main: Option<MainWindow>,
    toolbar: Option<RecorderToolbar>,
    screen: Option<RecorderScreen>,
    shot: Option<RecorderShot>,
    source_clip: Option<SourceClip>,
    mouse_overlay: Option<Overlay>,
    keyboard_overlay: Option<Overlay>,
    settings: Option<SettingsWindow>,
    recording_flow: Option<RecordingFlow>,
}

impl WindowRegistry {
    pub fn new(factory: Arc<dyn WindowFactory>) -> Self {
        Self {
            factory,
            main: None,
            toolbar: None,
            screen: None,
            shot: None,
            source_clip: None,
            mouse_overlay: None,
            keyboard_overlay: None,
            settings: None,
            recording_flow: None,
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn handle(&self, kind: WindowKind) -> Option<&WindowHandle> {
        match kind {
            WindowKind::Main => self.main.as_ref().map(|w| &w.handle),
            WindowKind::RecorderFullScreen => self.toolbar.as_ref().map(|w| &w.handle),
            WindowKind::RecorderScreen => self.screen.as_ref().map(|w| &w.handle),
            WindowKind::RecorderShot => self.shot.as_ref().map(|w| &w.handle),
            WindowKind::RecorderSourceClip => self.source_clip.as_ref().map(|w| &w.handle),
            WindowKind::MouseClickOverlay => self.mouse_overlay.as_ref().map(|w| &w.handle),
            WindowKind::KeyboardOverlay => self.keyboard_overlay.as_ref().map(|w| &w.handle),
            WindowKind::Settings => self.settings.as_ref().map(|w| &w.handle),
        }
    }

    pub fn handle_mut(&mut self, kind: WindowKind) -> Option<&mut WindowHandle> {
        match kind {
            WindowKind::Main => self.main.as_mut().map(|w| &mut w.handle),
            WindowKind::RecorderFullScreen => self.toolbar.as_mut().map(|w| &mut w.handle),
            WindowKind::RecorderScreen => self.screen.as_mut().map(|w| &mut w.handle),
            WindowKind::RecorderShot => self.shot.as_mut().map(|w| &mut w.handle),
            WindowKind::RecorderSourceClip => self.source_clip.as_mut().map(|w| &mut w.handle),
            WindowKind::MouseClickOverlay => self.mouse_overlay.as_mut().map(|w| &mut w.handle),
            WindowKind::KeyboardOverlay => self.keyboard_overlay.as_mut().map(|w| &mut w.handle),
            WindowKind::Settings => self.settings.as_mut().map(|w| &mut w.handle),
        }
    }

    pub fn is_open(&self, kind: WindowKind) -> bool {
        self.handle(kind).is_some_and(WindowHandle::is_open)
    }

    /// Kind of the entry owning the window labelled `label`.
    pub fn kind_of(&self, label: &str) -> Option<WindowKind> {
        WindowKind::ALL
            .into_iter()
            .find(|kind| self.handle(*kind).is_some_and(|h| h.owns(label)))
    }

    /// Every live native window, for broadcasts.
    pub fn open_windows(&self) -> Vec<Arc<dyn NativeWindow>> {
        WindowKind::ALL
            .into_iter()
            .filter_map(|kind| self.handle(kind).and_then(|h| h.window().cloned()))
            .collect()
    }

    /// Bring the first live window forward. False when nothing is open.
    pub fn focus_first_open(&self) -> bool {
        let first = WindowKind::ALL
            .into_iter()
            .filter_map(|kind| self.handle(kind))
            .find(|h| h.is_open());
        match first {
            Some(handle) => {
                handle.focus();
                true
            },
            None => false,
        }
    }

    pub fn recording_flow(&self) -> Option<RecordingFlow> {
        self.recording_flow
    }

    // ========================================================================
    // Main window
    // ========================================================================

    /// The main window, created on first access.
    pub fn main_instance(&mut self) -> RecorderResult<&mut MainWindow> {
        if self.main.is_none() {
            let created = MainWindow::create(self.factory.as_ref())?;
            self.main = Some(created);
        }
        self.main.as_mut().ok_or(RecorderError::WindowNotOpen {
            kind: WindowKind::Main,
        })
    }

    /// Forget the main window so the next access creates a new one.
    pub fn reset_main(&mut self) {
        if let Some(mut main) = self.main.take() {
            main.handle.close();
        }
    }

    // ========================================================================
    // Lifecycle by kind
    // ========================================================================

    /// Close a window by kind. `main` is created first if needed, every other
    /// kind is a no-op when not open.
    pub fn close_window(&mut self, kind: WindowKind) -> Vec<Teardown> {
        if kind == WindowKind::Main {
            if let Err(e) = self.main_instance() {
                log::warn!("[WINDOW] Main window unavailable: {}", e);
            }
        }
        let Some(handle) = self.handle_mut(kind) else {
            return Vec::new();
        };
        handle.close();
        self.forget(kind)
    }

    pub fn minimize_window(&mut self, kind: WindowKind) {
        if let Some(handle) = self.lifecycle_target(kind) {
            handle.minimize();
        }
    }

    pub fn maximize_window(&mut self, kind: WindowKind, maximize: bool) {
        if let Some(handle) = self.lifecycle_target(kind) {
            if maximize {
                handle.maximize();
            } else {
                handle.unmaximize();
            }
        }
    }

    fn lifecycle_target(&mut self, kind: WindowKind) -> Option<&mut WindowHandle> {
        if kind == WindowKind::Main {
            return match self.main_instance() {
                Ok(main) => Some(&mut main.handle),
                Err(e) => {
                    log::warn!("[WINDOW] Main window unavailable: {}", e);
                    None
                },
            };
        }
        self.handle_mut(kind)
    }

    /// A native window was destroyed. Entries created later under a new
    /// label are left alone.
    pub fn on_destroyed(&mut self, label: &str) -> Vec<Teardown> {
        let Some(kind) = self.kind_of(label) else {
            return Vec::new();
        };
        log::debug!("[WINDOW] {} destroyed ({})", kind, label);
        if let Some(handle) = self.handle_mut(kind) {
            handle.release();
        }
        self.forget(kind)
    }

    /// Content of the window labelled `label` finished loading.
    pub fn on_ready(&mut self, label: &str) {
        if let Some(handle) = self.kind_of(label).and_then(|kind| self.handle_mut(kind)) {
            handle.on_ready();
        }
    }

    /// Drop the entry for `kind` and run its cascade.
    fn forget(&mut self, kind: WindowKind) -> Vec<Teardown> {
        let mut teardown = Vec::new();
        match kind {
            // The singleton survives; only its native window is gone
            WindowKind::Main => {
                if let Some(main) = self.main.as_mut() {
                    main.handle.release();
                }
            },
            WindowKind::RecorderFullScreen => {
                self.toolbar = None;
                teardown.extend(self.end_flow(RecordingFlow::FullScreen));
            },
            WindowKind::RecorderScreen => self.screen = None,
            WindowKind::RecorderShot => self.shot = None,
            WindowKind::RecorderSourceClip => {
                self.source_clip = None;
                if let Some(mut screen) = self.screen.take() {
                    screen.handle.close();
                }
                teardown.extend(self.end_flow(RecordingFlow::SourceClip));
            },
            WindowKind::MouseClickOverlay => {
                self.mouse_overlay = None;
                teardown.push(Teardown::DetachMouse);
            },
            WindowKind::KeyboardOverlay => {
                self.keyboard_overlay = None;
                teardown.push(Teardown::DetachKeyboard);
            },
            WindowKind::Settings => self.settings = None,
        }
        teardown
    }

    // ========================================================================
    // Feature windows
    // ========================================================================

    pub fn toolbar_mut(&mut self) -> Option<&mut RecorderToolbar> {
        self.toolbar.as_mut().filter(|t| t.handle.is_open())
    }

    /// Open the full-screen toolbar. Close any previous one first with
    /// [`Self::close_window`] so its cascade runs.
    pub fn open_toolbar(&mut self, displays: &dyn DisplayProvider) -> RecorderResult<()> {
        let toolbar = RecorderToolbar::open(self.factory.as_ref(), displays)?;
        self.toolbar = Some(toolbar);
        Ok(())
    }

    pub fn open_shot(&mut self, snapshot: Snapshot) -> RecorderResult<()> {
        if let Some(mut old) = self.shot.take() {
            old.handle.close();
        }
        self.shot = Some(RecorderShot::open(self.factory.as_ref(), snapshot)?);
        Ok(())
    }

    /// Open the source clip over `bounds` with its recorder controls below.
    pub fn open_source_clip(&mut self, bounds: Rect) -> RecorderResult<()> {
        self.source_clip = Some(SourceClip::open(self.factory.as_ref(), bounds)?);
        self.screen = Some(RecorderScreen::open(self.factory.as_ref(), bounds)?);
        Ok(())
    }

    pub fn source_clip(&self) -> Option<&SourceClip> {
        self.source_clip.as_ref().filter(|c| c.handle.is_open())
    }

    pub fn source_clip_mut(&mut self) -> Option<&mut SourceClip> {
        self.source_clip.as_mut().filter(|c| c.handle.is_open())
    }

    /// Route a move of the window labelled `label` to the source clip.
    pub fn on_moved(&mut self, label: &str, origin: Point, displays: &[DisplayInfo]) -> Option<MoveOutcome> {
        let clip = self.source_clip.as_mut().filter(|c| c.handle.owns(label))?;
        Some(clip.on_moved(origin, displays))
    }

    /// Focus the open settings window or create a new one. Returns true when
    /// a window was created.
    pub fn open_settings(&mut self) -> RecorderResult<bool> {
        if let Some(settings) = self.settings.as_ref().filter(|s| s.handle.is_open()) {
            settings.bring_to_front();
            return Ok(false);
        }
        self.settings = Some(SettingsWindow::create(self.factory.as_ref())?);
        Ok(true)
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    /// Start a recording flow: open and raise the click overlay, and return
    /// where clicks should go. Returns `None` while another flow is active.
    pub fn begin_flow(
        &mut self,
        flow: RecordingFlow,
        displays: &dyn DisplayProvider,
    ) -> RecorderResult<Option<MouseTarget>> {
        if let Some(active) = self.recording_flow {
            log::debug!("[WINDOW] Recording flow {:?} already active", active);
            return Ok(None);
        }

        let bounds = match flow {
            RecordingFlow::FullScreen => None,
            RecordingFlow::SourceClip => Some(
                self.source_clip()
                    .and_then(SourceClip::area_bounds)
                    .ok_or(RecorderError::WindowNotOpen {
                        kind: WindowKind::RecorderSourceClip,
                    })?,
            ),
        };

        if let Some(mut stale) = self.mouse_overlay.take() {
            stale.handle.close();
        }
        let overlay = Overlay::mouse_click(self.factory.as_ref(), displays)?;
        overlay.show();
        let target = overlay.target();

        self.mouse_overlay = Some(overlay);
        self.recording_flow = Some(flow);
        Ok(target.map(|window| MouseTarget { window, bounds }))
    }

    /// End `flow` if it is the active one: close the click overlay.
    pub fn end_flow(&mut self, flow: RecordingFlow) -> Vec<Teardown> {
        if self.recording_flow != Some(flow) {
            return Vec::new();
        }
        self.recording_flow = None;
        if let Some(mut overlay) = self.mouse_overlay.take() {
            overlay.handle.close();
        }
        vec![Teardown::DetachMouse]
    }

    /// Open (or reuse) the key overlay and return it as the keyboard target.
    pub fn open_keyboard_overlay(
        &mut self,
        displays: &dyn DisplayProvider,
    ) -> RecorderResult<Option<Arc<dyn NativeWindow>>> {
        if self.keyboard_overlay.as_ref().is_some_and(|o| o.handle.is_open()) {
            return Ok(self.keyboard_overlay.as_ref().and_then(Overlay::target));
        }
        let overlay = Overlay::keyboard(self.factory.as_ref(), displays)?;
        overlay.show();
        let target = overlay.target();
        self.keyboard_overlay = Some(overlay);
        Ok(target)
    }
}
