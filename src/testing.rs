//! Test doubles for the native seams: windows, displays, the input hook,
//! timers and the cursor.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::commands::display::{DisplayInfo, DisplayProvider, DEPTH_PER_COMPONENT};
use crate::commands::input_hook::backend::{
    HookBackend, HookCapability, HookLoader, KeyEvent, KeyEventKind, KeyListener, MouseListener,
};
use crate::commands::input_hook::pointer::CursorProbe;
use crate::commands::window::{NativeWindow, WindowFactory};
use crate::config::{WindowDescriptor, WindowKind};
use crate::error::{RecorderError, RecorderResult};
use crate::geometry::{Point, Rect};
use crate::state::{TimerDriver, TimerTask};

// ============================================================================
// Windows
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Show,
    Hide,
    Minimize,
    Unminimize,
    Maximize,
    Unmaximize,
    Focus,
    Close,
    Center,
    SetPosition(Point),
    IgnoreCursor(bool),
    AlwaysOnTop(bool),
    Emit(String, Value),
}

pub struct FakeWindow {
    label: String,
    kind: WindowKind,
    bounds: Mutex<Rect>,
    visible: AtomicBool,
    minimized: AtomicBool,
    destroyed: AtomicBool,
    fail_next: Mutex<Option<&'static str>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeWindow {
    fn new(label: String, descriptor: &WindowDescriptor) -> Self {
        let bounds = Rect::new(
            descriptor.geometry.x.unwrap_or_default(),
            descriptor.geometry.y.unwrap_or_default(),
            descriptor.width(),
            descriptor.height(),
        );
        Self {
            label,
            kind: descriptor.kind,
            bounds: Mutex::new(bounds),
            visible: AtomicBool::new(descriptor.chrome.visible && !descriptor.ready_to_show),
            minimized: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            fail_next: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Payloads emitted on `event`, oldest first.
    pub fn emitted(&self, event: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Emit(name, payload) if name == event => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn set_state(&self, visible: bool, minimized: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        self.minimized.store(minimized, Ordering::SeqCst);
    }

    /// Simulate the user or the OS moving the window, without recording a call.
    pub fn drag_to(&self, origin: Point) {
        let mut bounds = self.bounds.lock();
        *bounds = bounds.moved_to(origin);
    }

    /// Simulate the window being destroyed outside the host's control.
    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    /// Make the next call of operation `op` fail.
    pub fn fail_next(&self, op: &'static str) {
        *self.fail_next.lock() = Some(op);
    }

    fn record(&self, op: &'static str, call: Call) -> RecorderResult<()> {
        let mut fail = self.fail_next.lock();
        if *fail == Some(op) {
            *fail = None;
            return Err(RecorderError::Window(format!("{} failed", op)));
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl NativeWindow for FakeWindow {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn show(&self) -> RecorderResult<()> {
        self.record("show", Call::Show)?;
        self.visible.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn hide(&self) -> RecorderResult<()> {
        self.record("hide", Call::Hide)?;
        self.visible.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn is_minimized(&self) -> bool {
        self.minimized.load(Ordering::SeqCst)
    }

    fn minimize(&self) -> RecorderResult<()> {
        self.record("minimize", Call::Minimize)?;
        self.minimized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unminimize(&self) -> RecorderResult<()> {
        self.record("unminimize", Call::Unminimize)?;
        self.minimized.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn maximize(&self) -> RecorderResult<()> {
        self.record("maximize", Call::Maximize)
    }

    fn unmaximize(&self) -> RecorderResult<()> {
        self.record("unmaximize", Call::Unmaximize)
    }

    fn set_focus(&self) -> RecorderResult<()> {
        self.record("focus", Call::Focus)
    }

    fn close(&self) -> RecorderResult<()> {
        self.record("close", Call::Close)?;
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn center(&self) -> RecorderResult<()> {
        self.record("center", Call::Center)
    }

    fn set_position(&self, origin: Point) -> RecorderResult<()> {
        self.record("set_position", Call::SetPosition(origin))?;
        self.drag_to(origin);
        Ok(())
    }

    fn bounds(&self) -> RecorderResult<Rect> {
        Ok(*self.bounds.lock())
    }

    fn set_ignore_cursor_events(&self, ignore: bool) -> RecorderResult<()> {
        self.record("set_ignore_cursor_events", Call::IgnoreCursor(ignore))
    }

    fn set_always_on_top(&self, on_top: bool) -> RecorderResult<()> {
        self.record("set_always_on_top", Call::AlwaysOnTop(on_top))
    }

    fn emit(&self, event: &str, payload: Value) -> RecorderResult<()> {
        self.record("emit", Call::Emit(event.to_string(), payload))
    }
}

#[derive(Default)]
pub struct FakeWindowFactory {
    counter: AtomicU32,
    fail: AtomicBool,
    created: Mutex<Vec<Arc<FakeWindow>>>,
}

impl FakeWindowFactory {
    pub fn fail_creation(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn created(&self) -> Vec<Arc<FakeWindow>> {
        self.created.lock().clone()
    }

    pub fn last(&self) -> Option<Arc<FakeWindow>> {
        self.created.lock().last().cloned()
    }

    /// Every window created for `kind`, oldest first.
    pub fn of_kind(&self, kind: WindowKind) -> Vec<Arc<FakeWindow>> {
        self.created
            .lock()
            .iter()
            .filter(|w| w.kind() == kind)
            .cloned()
            .collect()
    }

    /// Most recent window created for `kind`.
    pub fn latest(&self, kind: WindowKind) -> Option<Arc<FakeWindow>> {
        self.of_kind(kind).pop()
    }
}

impl WindowFactory for FakeWindowFactory {
    fn create(&self, descriptor: &WindowDescriptor) -> RecorderResult<Arc<dyn NativeWindow>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RecorderError::Window("creation refused".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let window = Arc::new(FakeWindow::new(format!("{}-{}", descriptor.kind, n), descriptor));
        self.created.lock().push(window.clone());
        Ok(window)
    }
}

/// Standalone window for tests that do not go through a factory.
pub fn fake_window(kind: WindowKind, label: &str) -> Arc<FakeWindow> {
    Arc::new(FakeWindow::new(label.to_string(), &crate::config::descriptor(kind)))
}

// ============================================================================
// Displays
// ============================================================================

pub struct FakeDisplays {
    displays: Mutex<Vec<DisplayInfo>>,
}

impl FakeDisplays {
    fn display(id: u32, bounds: Rect, scale_factor: f64, is_primary: bool) -> DisplayInfo {
        DisplayInfo {
            id,
            name: format!("Display {}", id),
            bounds,
            scale_factor,
            is_primary,
            depth_per_component: DEPTH_PER_COMPONENT,
        }
    }

    /// One primary display with id 1.
    pub fn single(bounds: Rect, scale_factor: f64) -> Self {
        Self {
            displays: Mutex::new(vec![Self::display(1, bounds, scale_factor, true)]),
        }
    }

    /// Primary 1920x1080 at the origin (id 1) with a second display to its
    /// right (id 2).
    pub fn dual() -> Self {
        Self {
            displays: Mutex::new(vec![
                Self::display(1, Rect::new(0.0, 0.0, 1920.0, 1080.0), 1.0, true),
                Self::display(2, Rect::new(1920.0, 0.0, 1920.0, 1080.0), 1.0, false),
            ]),
        }
    }

    pub fn none() -> Self {
        Self {
            displays: Mutex::new(Vec::new()),
        }
    }

    pub fn set_primary_scale(&self, scale_factor: f64) {
        for display in self.displays.lock().iter_mut().filter(|d| d.is_primary) {
            display.scale_factor = scale_factor;
        }
    }
}

impl DisplayProvider for FakeDisplays {
    fn displays(&self) -> RecorderResult<Vec<DisplayInfo>> {
        let displays = self.displays.lock().clone();
        if displays.is_empty() {
            return Err(RecorderError::Display("No displays found".to_string()));
        }
        Ok(displays)
    }

    fn capture_data_url(&self, display_id: u32) -> RecorderResult<String> {
        Ok(format!("data:image/png;base64,DISPLAY{}", display_id))
    }
}

// ============================================================================
// Input hook
// ============================================================================

#[derive(Default)]
pub struct HookProbe {
    pub loads: u32,
    pub starts: u32,
    pub stops: u32,
    pub running: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
    mouse: Option<MouseListener>,
    key: Option<KeyListener>,
}

impl HookProbe {
    pub fn has_mouse_listener(&self) -> bool {
        self.mouse.is_some()
    }

    pub fn has_key_listener(&self) -> bool {
        self.key.is_some()
    }
}

/// Loader whose backends share one [`HookProbe`].
#[derive(Clone)]
pub struct FakeHookLoader {
    available: bool,
    probe: Arc<Mutex<HookProbe>>,
}

impl FakeHookLoader {
    pub fn available() -> Self {
        Self {
            available: true,
            probe: Arc::default(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            probe: Arc::default(),
        }
    }

    pub fn probe(&self) -> parking_lot::MutexGuard<'_, HookProbe> {
        self.probe.lock()
    }

    /// Deliver a physical mouse-down to the registered listener.
    pub fn click(&self, x: i32, y: i32) {
        if let Some(listener) = self.probe.lock().mouse.as_ref() {
            listener(x, y);
        }
    }

    pub fn key(&self, kind: KeyEventKind, code: u16, at: Instant) {
        if let Some(listener) = self.probe.lock().key.as_ref() {
            listener(KeyEvent { kind, code, at });
        }
    }
}

impl HookLoader for FakeHookLoader {
    fn load(&self) -> HookCapability {
        self.probe.lock().loads += 1;
        if self.available {
            HookCapability::Available(Box::new(FakeBackend {
                probe: self.probe.clone(),
            }))
        } else {
            HookCapability::Unavailable("no native hook in tests".to_string())
        }
    }
}

struct FakeBackend {
    probe: Arc<Mutex<HookProbe>>,
}

impl HookBackend for FakeBackend {
    fn start(&mut self) -> RecorderResult<()> {
        let mut probe = self.probe.lock();
        if probe.fail_start {
            return Err(RecorderError::Hook("start refused".to_string()));
        }
        probe.starts += 1;
        probe.running = true;
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<()> {
        let mut probe = self.probe.lock();
        probe.stops += 1;
        probe.running = false;
        if probe.fail_stop {
            return Err(RecorderError::Hook("stop refused".to_string()));
        }
        Ok(())
    }

    fn set_mouse_listener(&mut self, listener: Option<MouseListener>) {
        self.probe.lock().mouse = listener;
    }

    fn set_key_listener(&mut self, listener: Option<KeyListener>) {
        self.probe.lock().key = listener;
    }
}

// ============================================================================
// Timers and cursor
// ============================================================================

/// Timer driver that only fires when told to.
#[derive(Default)]
pub struct ManualTimers {
    pending: Mutex<Vec<(Duration, TimerTask)>>,
}

impl ManualTimers {
    pub fn pending(&self) -> Vec<Duration> {
        self.pending.lock().iter().map(|(delay, _)| *delay).collect()
    }

    /// Run every task scheduled so far. Tasks scheduled while firing wait
    /// for the next call.
    pub fn fire_all(&self) {
        let tasks = std::mem::take(&mut *self.pending.lock());
        for (_, task) in tasks {
            task();
        }
    }

    /// Run only the tasks scheduled with `delay`.
    pub fn fire(&self, delay: Duration) {
        let tasks: Vec<_> = {
            let mut pending = self.pending.lock();
            let (due, rest) = std::mem::take(&mut *pending)
                .into_iter()
                .partition(|(d, _)| *d == delay);
            *pending = rest;
            due
        };
        for (_, task) in tasks {
            task();
        }
    }
}

impl TimerDriver for ManualTimers {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        self.pending.lock().push((delay, task));
    }
}

#[derive(Default)]
pub struct FakeCursor {
    position: Mutex<Option<(i32, i32)>>,
}

impl FakeCursor {
    pub fn move_to(&self, x: i32, y: i32) {
        *self.position.lock() = Some((x, y));
    }
}

impl CursorProbe for FakeCursor {
    fn position(&self) -> Option<(i32, i32)> {
        *self.position.lock()
    }
}
