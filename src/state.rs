//! Process-wide host state.
//!
//! [`AppState`] is the one coordination object behind every IPC command
//! and window event. It owns the window registry, the input hook
//! coordinator and the theme, and wires them together: recording flows
//! attach the mouse channel, closed overlays detach it, the toolbar's
//! timers and hot zone run against the registry.
//!
//! Lock order is always `windows` then `hook`. Timer tasks hold only a weak
//! reference so a pending timer never keeps the state alive.

use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::commands::capture::{describe_primary, DesktopCapturerSource};
use crate::commands::display::DisplayProvider;
use crate::commands::input_hook::{CursorProbe, HookLoader, InputHookCoordinator};
use crate::commands::ipc::channels;
use crate::commands::window::registry::{RecordingFlow, Teardown, WindowRegistry};
use crate::commands::window::shot::take_snapshot;
use crate::commands::window::toolbar::{
    CursorAction, RecorderToolbar, HIDE_DELAY, HOT_ZONE_POLL, SLIDE_DURATION,
};
use crate::commands::window::WindowFactory;
use crate::config::{HookConfig, ThemeColor, ThemeMode, ThemeState, WindowKind};
use crate::error::RecorderResult;
use crate::geometry::{Point, Rect};

// ============================================================================
// Timers
// ============================================================================

pub type TimerTask = Box<dyn FnOnce() + Send>;

/// Runs a task once after a delay.
pub trait TimerDriver: Send + Sync {
    fn schedule(&self, delay: Duration, task: TimerTask);
}

/// Timers on the Tauri async runtime.
pub struct TokioTimers;

impl TimerDriver for TokioTimers {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

// ============================================================================
// App state
// ============================================================================

/// Native services the state runs against.
pub struct HostServices {
    pub factory: Arc<dyn WindowFactory>,
    pub displays: Arc<dyn DisplayProvider>,
    pub hook_loader: Arc<dyn HookLoader>,
    pub timers: Arc<dyn TimerDriver>,
    pub cursor: Arc<dyn CursorProbe>,
    pub hook_config: HookConfig,
}

pub struct AppState {
    windows: Mutex<WindowRegistry>,
    hook: Mutex<InputHookCoordinator>,
    theme: RwLock<ThemeState>,
    displays: Arc<dyn DisplayProvider>,
    timers: Arc<dyn TimerDriver>,
    cursor: Arc<dyn CursorProbe>,
    hot_zone_polling: AtomicBool,
}

impl AppState {
    pub fn new(services: HostServices) -> Arc<Self> {
        let hook = InputHookCoordinator::new(
            services.hook_loader,
            services.displays.clone(),
            services.hook_config,
        );
        Arc::new(Self {
            windows: Mutex::new(WindowRegistry::new(services.factory)),
            hook: Mutex::new(hook),
            theme: RwLock::new(ThemeState::default()),
            displays: services.displays,
            timers: services.timers,
            cursor: services.cursor,
            hot_zone_polling: AtomicBool::new(false),
        })
    }

    /// Create the main window.
    pub fn start(&self) -> RecorderResult<()> {
        self.windows.lock().main_instance().map(|_| ())
    }

    /// Stop the input hook before the process exits.
    pub fn shutdown(&self) {
        self.hook.lock().shutdown();
    }

    // ========================================================================
    // Window lifecycle by name
    // ========================================================================

    pub fn close_window(&self, kind: WindowKind) {
        let mut windows = self.windows.lock();
        let teardown = windows.close_window(kind);
        self.apply_teardown(teardown);
    }

    pub fn minimize_window(&self, kind: WindowKind) {
        self.windows.lock().minimize_window(kind);
    }

    pub fn maximize_window(&self, kind: WindowKind, maximize: bool) {
        self.windows.lock().maximize_window(kind, maximize);
    }

    /// OS asked to reopen the app (dock click): focus the first window, or
    /// build a new main window when none is open.
    pub fn reopen(&self) -> RecorderResult<()> {
        let mut windows = self.windows.lock();
        if windows.focus_first_open() {
            return Ok(());
        }
        log::info!("[APP] No open windows, recreating main window");
        windows.reset_main();
        windows.main_instance().map(|_| ())
    }

    pub fn has_open_windows(&self) -> bool {
        !self.windows.lock().open_windows().is_empty()
    }

    // ========================================================================
    // Full-screen recording
    // ========================================================================

    /// Open a fresh toolbar and start watching its hot zone.
    pub fn open_toolbar(self: &Arc<Self>) -> RecorderResult<()> {
        {
            let mut windows = self.windows.lock();
            let teardown = windows.close_window(WindowKind::RecorderFullScreen);
            self.apply_teardown(teardown);
            windows.open_toolbar(self.displays.as_ref())?;
        }
        self.start_hot_zone();
        Ok(())
    }

    pub fn toolbar_mouse_enter(self: &Arc<Self>) {
        let mut windows = self.windows.lock();
        if let Some(toolbar) = windows.toolbar_mut() {
            if toolbar.show() {
                self.schedule_transition_end(toolbar);
            }
        }
    }

    pub fn toolbar_mouse_leave(self: &Arc<Self>) {
        let mut windows = self.windows.lock();
        if let Some(toolbar) = windows.toolbar_mut() {
            self.schedule_toolbar_hide(toolbar);
        }
    }

    pub fn set_full_screen_recording(&self, recording: bool) -> RecorderResult<()> {
        self.set_recording(RecordingFlow::FullScreen, recording)
    }

    pub fn desktop_capturer_source(&self) -> RecorderResult<DesktopCapturerSource> {
        describe_primary(self.displays.as_ref())
    }

    // ========================================================================
    // Region recording
    // ========================================================================

    /// Snapshot the primary display, then open the region selector on it.
    pub fn open_shot(&self) -> RecorderResult<()> {
        let snapshot = take_snapshot(self.displays.as_ref())?;
        self.windows.lock().open_shot(snapshot)
    }

    pub fn open_source_clip(&self, bounds: Rect) -> RecorderResult<()> {
        let mut windows = self.windows.lock();
        let teardown = windows.close_window(WindowKind::RecorderSourceClip);
        self.apply_teardown(teardown);
        windows.open_source_clip(bounds)
    }

    pub fn source_clip_bounds(&self) -> Option<Rect> {
        self.windows
            .lock()
            .source_clip()
            .and_then(|clip| clip.area_bounds())
    }

    pub fn set_source_clip_ignore_mouse(&self, ignore: bool) {
        if let Some(clip) = self.windows.lock().source_clip_mut() {
            clip.set_ignore_mouse_events(ignore);
        }
    }

    /// Recording started or stopped in the clip: lock it in place, tell its
    /// renderer and drive the click overlay.
    pub fn set_source_clip_recording(&self, recording: bool) -> RecorderResult<()> {
        {
            let mut windows = self.windows.lock();
            let Some(clip) = windows.source_clip_mut() else {
                log::debug!("[SOURCE_CLIP] Recording state change without an open clip");
                return Ok(());
            };
            clip.set_movable(!recording);
            clip.handle
                .emit(channels::RS_RECORDING_STATE_CHANGE, json!(recording));
        }
        self.set_recording(RecordingFlow::SourceClip, recording)
    }

    // ========================================================================
    // Settings and overlays
    // ========================================================================

    pub fn open_settings(&self) -> RecorderResult<()> {
        self.windows.lock().open_settings().map(|_| ())
    }

    /// Open the key overlay and route key presses to it.
    pub fn open_keyboard_overlay(&self) -> RecorderResult<()> {
        let mut windows = self.windows.lock();
        if let Some(target) = windows.open_keyboard_overlay(self.displays.as_ref())? {
            self.hook.lock().attach_keyboard(target);
        }
        Ok(())
    }

    fn set_recording(&self, flow: RecordingFlow, recording: bool) -> RecorderResult<()> {
        let mut windows = self.windows.lock();
        if recording {
            if let Some(target) = windows.begin_flow(flow, self.displays.as_ref())? {
                self.hook.lock().attach_mouse(target.window, target.bounds);
            }
        } else {
            let teardown = windows.end_flow(flow);
            self.apply_teardown(teardown);
        }
        Ok(())
    }

    fn apply_teardown(&self, steps: Vec<Teardown>) {
        if steps.is_empty() {
            return;
        }
        let mut hook = self.hook.lock();
        for step in steps {
            match step {
                Teardown::DetachMouse => hook.detach_mouse(),
                Teardown::DetachKeyboard => hook.detach_keyboard(),
            }
        }
    }

    // ========================================================================
    // Theme
    // ========================================================================

    pub fn theme(&self) -> ThemeMode {
        self.theme.read().mode
    }

    pub fn set_theme(&self, mode: ThemeMode) {
        self.theme.write().mode = mode;
        self.broadcast(channels::THEME_CHANGE, json!(mode));
    }

    pub fn theme_color(&self) -> ThemeColor {
        self.theme.read().color
    }

    pub fn set_theme_color(&self, color: ThemeColor) {
        self.theme.write().color = color;
        self.broadcast(channels::THEME_COLOR_CHANGE, json!(color));
    }

    /// Push an event to every open window.
    fn broadcast(&self, event: &str, payload: Value) {
        let targets = self.windows.lock().open_windows();
        for window in targets {
            if let Err(e) = window.emit(event, payload.clone()) {
                log::warn!("[IPC] Failed to send {} to {}: {}", event, window.label(), e);
            }
        }
    }

    // ========================================================================
    // Window events
    // ========================================================================

    pub fn on_window_destroyed(&self, label: &str) {
        let mut windows = self.windows.lock();
        let teardown = windows.on_destroyed(label);
        self.apply_teardown(teardown);
    }

    pub fn on_page_loaded(&self, label: &str) {
        self.windows.lock().on_ready(label);
    }

    /// A window moved to `origin` (logical pixels). Only the source clip
    /// cares.
    pub fn on_window_moved(&self, label: &str, origin: Point) {
        let mut windows = self.windows.lock();
        if windows.kind_of(label) != Some(WindowKind::RecorderSourceClip) {
            return;
        }
        match self.displays.displays() {
            Ok(displays) => {
                windows.on_moved(label, origin, &displays);
            },
            Err(e) => log::warn!("[SOURCE_CLIP] Cannot check move: {}", e),
        }
    }

    pub fn on_window_blurred(self: &Arc<Self>, label: &str) {
        let mut windows = self.windows.lock();
        if windows.kind_of(label) != Some(WindowKind::RecorderFullScreen) {
            return;
        }
        if let Some(toolbar) = windows.toolbar_mut() {
            self.schedule_toolbar_hide(toolbar);
        }
    }

    // ========================================================================
    // Toolbar timers
    // ========================================================================

    fn schedule_toolbar_hide(self: &Arc<Self>, toolbar: &mut RecorderToolbar) {
        let Some(label) = toolbar_label(toolbar) else {
            return;
        };
        let token = toolbar.schedule_hide();
        let weak = Arc::downgrade(self);
        self.timers.schedule(
            HIDE_DELAY,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.on_toolbar_hide_timer(&label, token);
                }
            }),
        );
    }

    fn on_toolbar_hide_timer(self: &Arc<Self>, label: &str, token: u64) {
        let mut windows = self.windows.lock();
        let Some(toolbar) = windows.toolbar_mut().filter(|t| t.handle.owns(label)) else {
            return;
        };
        if toolbar.on_hide_timer(token) {
            self.schedule_transition_end(toolbar);
        }
    }

    fn schedule_transition_end(self: &Arc<Self>, toolbar: &RecorderToolbar) {
        let Some(label) = toolbar_label(toolbar) else {
            return;
        };
        let weak: Weak<Self> = Arc::downgrade(self);
        self.timers.schedule(
            SLIDE_DURATION,
            Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut windows = state.windows.lock();
                if let Some(toolbar) = windows.toolbar_mut().filter(|t| t.handle.owns(&label)) {
                    toolbar.finish_transition();
                }
            }),
        );
    }

    // ========================================================================
    // Hot zone
    // ========================================================================

    /// Poll the cursor while a toolbar is open. One poller at a time.
    fn start_hot_zone(self: &Arc<Self>) {
        if self.hot_zone_polling.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("[TOOLBAR] Hot zone polling started");
        self.schedule_hot_zone_tick();
    }

    fn schedule_hot_zone_tick(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.timers.schedule(
            HOT_ZONE_POLL,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.hot_zone_tick();
                }
            }),
        );
    }

    fn hot_zone_tick(self: &Arc<Self>) {
        let position = self.cursor.position();
        {
            let mut windows = self.windows.lock();
            let Some(toolbar) = windows.toolbar_mut() else {
                self.hot_zone_polling.store(false, Ordering::SeqCst);
                log::debug!("[TOOLBAR] Hot zone polling stopped");
                return;
            };
            if let Some(position) = position {
                match toolbar.on_cursor(position) {
                    CursorAction::Reveal => {
                        if toolbar.show() {
                            self.schedule_transition_end(toolbar);
                        }
                    },
                    CursorAction::ScheduleHide => self.schedule_toolbar_hide(toolbar),
                    CursorAction::CancelHide => toolbar.cancel_hide(),
                    CursorAction::None => {},
                }
            }
        }
        self.schedule_hot_zone_tick();
    }
}

fn toolbar_label(toolbar: &RecorderToolbar) -> Option<String> {
    toolbar.handle.window().map(|w| w.label().to_string())
}

#[cfg(test)]
mod tests;
