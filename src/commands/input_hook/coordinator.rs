//! Shared input hook coordinator.
//!
//! Two independent consumers use the one native hook: the click overlay
//! (mouse channel) and the key overlay (keyboard channel). Each channel is
//! either detached or attached; the hook itself is either stopped or started.
//!
//! ```text
//! attach_mouse / attach_keyboard   -> load backend if needed, register
//!                                     listener, start hook if stopped
//! detach_mouse / detach_keyboard   -> clear listener, stop hook according
//!                                     to the StopPolicy
//! ```
//!
//! Listeners never lock the coordinator. They capture their own shared
//! target slot, so the backend thread can deliver events while the
//! coordinator is being mutated.

use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::backend::{HookBackend, HookCapability, HookLoader, KeyEventKind};
use super::keymap::KeyPressTracker;
use super::pointer::process_click;
use crate::commands::display::DisplayProvider;
use crate::commands::ipc::channels;
use crate::commands::window::NativeWindow;
use crate::config::{HookConfig, StopPolicy};
use crate::error::RecorderError;
use crate::geometry::Rect;

type TargetSlot = Arc<Mutex<Option<Arc<dyn NativeWindow>>>>;

struct MouseSession {
    target: TargetSlot,
    bounds: Option<Rect>,
}

struct KeyboardSession {
    target: TargetSlot,
}

pub struct InputHookCoordinator {
    loader: Arc<dyn HookLoader>,
    displays: Arc<dyn DisplayProvider>,
    config: HookConfig,
    backend: Option<Box<dyn HookBackend>>,
    running: bool,
    mouse: Option<MouseSession>,
    keyboard: Option<KeyboardSession>,
}

impl InputHookCoordinator {
    pub fn new(loader: Arc<dyn HookLoader>, displays: Arc<dyn DisplayProvider>, config: HookConfig) -> Self {
        Self {
            loader,
            displays,
            config,
            backend: None,
            running: false,
            mouse: None,
            keyboard: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_mouse_attached(&self) -> bool {
        self.mouse.is_some()
    }

    pub fn is_keyboard_attached(&self) -> bool {
        self.keyboard.is_some()
    }

    pub fn mouse_bounds(&self) -> Option<Rect> {
        self.mouse.as_ref().and_then(|m| m.bounds)
    }

    // ========================================================================
    // Mouse channel
    // ========================================================================

    /// Forward clicks to `target`, filtered by `bounds` when set.
    pub fn attach_mouse(&mut self, target: Arc<dyn NativeWindow>, bounds: Option<Rect>) {
        if self.mouse.is_some() {
            return;
        }
        if !self.ensure_backend() {
            return;
        }

        log::info!("[HOOK] Attaching mouse channel (bounds: {:?})", bounds);

        let slot: TargetSlot = Arc::new(Mutex::new(Some(target)));
        let listener_slot = slot.clone();
        let displays = self.displays.clone();
        let fallback_scale = self.primary_scale();

        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        backend.set_mouse_listener(None);
        backend.set_mouse_listener(Some(Box::new(move |x, y| {
            let scale = displays
                .primary()
                .map(|d| d.scale_factor)
                .unwrap_or(fallback_scale);
            let Some(point) = process_click((x, y), scale, bounds.as_ref()) else {
                log::debug!("[HOOK] Click outside recording area: {}, {}", x, y);
                return;
            };
            let target = listener_slot.lock().clone();
            if let Some(window) = target.filter(|w| !w.is_destroyed()) {
                if let Err(e) = window.emit(channels::MOUSE_CLICK, json!(point)) {
                    log::warn!("[HOOK] Failed to forward click: {}", e);
                }
            }
        })));

        self.mouse = Some(MouseSession { target: slot, bounds });

        if !self.start_if_stopped() {
            if let Some(backend) = self.backend.as_mut() {
                backend.set_mouse_listener(None);
            }
            self.mouse = None;
        }
    }

    pub fn detach_mouse(&mut self) {
        let Some(session) = self.mouse.take() else {
            return;
        };
        log::info!("[HOOK] Detaching mouse channel");

        *session.target.lock() = None;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_mouse_listener(None);
        }

        // Both policies stop here once nothing else needs the hook
        if self.keyboard.is_none() {
            self.stop();
        }
    }

    // ========================================================================
    // Keyboard channel
    // ========================================================================

    /// Forward composed key labels to `target`.
    ///
    /// When the channel is already attached to a live window only the target
    /// is swapped, keeping modifier state and the running hook.
    pub fn attach_keyboard(&mut self, target: Arc<dyn NativeWindow>) {
        if let Some(session) = self.keyboard.as_ref() {
            let mut current = session.target.lock();
            if current.as_ref().is_some_and(|w| !w.is_destroyed()) {
                *current = Some(target);
                return;
            }
        }
        if !self.ensure_backend() {
            return;
        }

        log::info!("[HOOK] Attaching keyboard channel");

        let slot: TargetSlot = Arc::new(Mutex::new(Some(target)));
        let listener_slot = slot.clone();
        let tracker = Mutex::new(KeyPressTracker::new(Duration::from_millis(
            self.config.repeat_window_ms,
        )));

        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        backend.set_key_listener(None);
        backend.set_key_listener(Some(Box::new(move |event| {
            let label = {
                let mut tracker = tracker.lock();
                match event.kind {
                    KeyEventKind::Down => tracker.key_down(event.code, event.at),
                    KeyEventKind::Up => {
                        tracker.key_up(event.code);
                        None
                    },
                }
            };
            let Some(label) = label else {
                return;
            };
            let target = listener_slot.lock().clone();
            if let Some(window) = target.filter(|w| !w.is_destroyed()) {
                if let Err(e) = window.emit(channels::KEY_PRESS, json!(label)) {
                    log::warn!("[HOOK] Failed to forward key press: {}", e);
                }
            }
        })));

        self.keyboard = Some(KeyboardSession { target: slot });

        if !self.start_if_stopped() {
            if let Some(backend) = self.backend.as_mut() {
                backend.set_key_listener(None);
            }
            self.keyboard = None;
        }
    }

    pub fn detach_keyboard(&mut self) {
        let Some(session) = self.keyboard.take() else {
            return;
        };
        log::info!("[HOOK] Detaching keyboard channel");

        *session.target.lock() = None;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_key_listener(None);
        }

        match self.config.stop_policy {
            StopPolicy::LastDetach if self.mouse.is_none() => self.stop(),
            // Keyboard detach leaves the shared hook running
            _ => {},
        }
    }

    /// Detach both channels and stop the hook. Used on shutdown.
    pub fn shutdown(&mut self) {
        self.detach_keyboard();
        self.detach_mouse();
        self.stop();
    }

    // ========================================================================
    // Hook lifecycle
    // ========================================================================

    fn ensure_backend(&mut self) -> bool {
        if self.backend.is_some() {
            return true;
        }
        match self.loader.load() {
            HookCapability::Available(backend) => {
                log::info!("[HOOK] Native input hook loaded");
                self.backend = Some(backend);
                true
            },
            HookCapability::Unavailable(reason) => {
                log::error!("[HOOK] {}", RecorderError::HookUnavailable(reason));
                false
            },
        }
    }

    /// Start the hook unless a channel already did. Returns false when the
    /// hook could not be started.
    fn start_if_stopped(&mut self) -> bool {
        if self.running {
            return true;
        }
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        match backend.start() {
            Ok(()) => {
                log::info!("[HOOK] Input hook started");
                self.running = true;
                true
            },
            Err(e) => {
                log::error!("[HOOK] Failed to start input hook: {}", e);
                false
            },
        }
    }

    /// Best-effort stop. The running flag is cleared even if the backend
    /// reports an error.
    fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.stop() {
                log::error!("[HOOK] Error stopping input hook: {}", e);
            }
        }
        self.running = false;
        log::info!("[HOOK] Input hook stopped");
    }

    fn primary_scale(&self) -> f64 {
        self.displays
            .primary()
            .map(|d| d.scale_factor)
            .unwrap_or(1.0)
    }
}
