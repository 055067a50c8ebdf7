//! Native input hook backend.
//!
//! The hook is modelled as a capability: a [`HookLoader`] either yields a
//! running-capable [`HookBackend`] or explains why none is available. The
//! production backend polls `device_query` on a dedicated thread and turns
//! state changes into mouse-down and key down/up events.

use device_query::{DeviceQuery, DeviceState, Keycode};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::keymap::*;
use crate::error::{RecorderError, RecorderResult};

/// Receives mouse-down positions in physical pixels.
pub type MouseListener = Box<dyn Fn(i32, i32) + Send + Sync>;

/// Receives key events.
pub type KeyListener = Box<dyn Fn(KeyEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub code: u16,
    pub at: Instant,
}

/// One OS-level hook shared by every consumer.
///
/// Setting a listener replaces the previous one; `None` clears it.
pub trait HookBackend: Send {
    fn start(&mut self) -> RecorderResult<()>;
    fn stop(&mut self) -> RecorderResult<()>;
    fn set_mouse_listener(&mut self, listener: Option<MouseListener>);
    fn set_key_listener(&mut self, listener: Option<KeyListener>);
}

/// Result of trying to load the native hook.
pub enum HookCapability {
    Available(Box<dyn HookBackend>),
    Unavailable(String),
}

pub trait HookLoader: Send + Sync {
    fn load(&self) -> HookCapability;
}

// ============================================================================
// device_query backend
// ============================================================================

pub struct DeviceQueryLoader {
    poll_interval: Duration,
}

impl DeviceQueryLoader {
    pub fn new(poll_interval_ms: u64) -> Self {
        Self {
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
        }
    }
}

impl HookLoader for DeviceQueryLoader {
    fn load(&self) -> HookCapability {
        match DeviceState::checked_new() {
            Some(_) => HookCapability::Available(Box::new(DeviceQueryBackend::new(self.poll_interval))),
            None => HookCapability::Unavailable(
                "device state could not be opened (no display server or input permission)".to_string(),
            ),
        }
    }
}

type SharedListener<T> = Arc<RwLock<Option<T>>>;

pub struct DeviceQueryBackend {
    poll_interval: Duration,
    mouse: SharedListener<MouseListener>,
    keys: SharedListener<KeyListener>,
    /// Run flag of the current polling thread. Each start gets a fresh flag so
    /// a thread still sleeping after `stop` never resumes.
    running: Option<Arc<AtomicBool>>,
}

impl DeviceQueryBackend {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            mouse: Arc::new(RwLock::new(None)),
            keys: Arc::new(RwLock::new(None)),
            running: None,
        }
    }
}

impl HookBackend for DeviceQueryBackend {
    fn start(&mut self) -> RecorderResult<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let mouse = self.mouse.clone();
        let keys = self.keys.clone();
        let interval = self.poll_interval;

        thread::Builder::new()
            .name("input-hook".to_string())
            .spawn(move || poll_devices(flag, interval, mouse, keys))
            .map_err(|e| RecorderError::Hook(format!("Failed to spawn hook thread: {}", e)))?;

        self.running = Some(running);
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<()> {
        if let Some(running) = self.running.take() {
            running.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    fn set_mouse_listener(&mut self, listener: Option<MouseListener>) {
        *self.mouse.write() = listener;
    }

    fn set_key_listener(&mut self, listener: Option<KeyListener>) {
        *self.keys.write() = listener;
    }
}

impl Drop for DeviceQueryBackend {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn poll_devices(
    running: Arc<AtomicBool>,
    interval: Duration,
    mouse: SharedListener<MouseListener>,
    keys: SharedListener<KeyListener>,
) {
    let Some(device_state) = DeviceState::checked_new() else {
        log::error!("[HOOK] Device state unavailable, hook thread exiting");
        running.store(false, Ordering::SeqCst);
        return;
    };

    log::debug!("[HOOK] Polling thread started ({}ms)", interval.as_millis());

    let mut last_buttons = device_state.get_mouse().button_pressed;
    let mut last_keys: Vec<Keycode> = device_state.get_keys();

    while running.load(Ordering::SeqCst) {
        thread::sleep(interval);
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let mouse_state = device_state.get_mouse();
        for (num, &pressed) in mouse_state.button_pressed.iter().enumerate() {
            let was_pressed = last_buttons.get(num).copied().unwrap_or(false);
            if pressed && !was_pressed {
                if let Some(listener) = mouse.read().as_ref() {
                    listener(mouse_state.coords.0, mouse_state.coords.1);
                }
            }
        }
        last_buttons = mouse_state.button_pressed;

        let current_keys = device_state.get_keys();
        let now = Instant::now();
        {
            let listener = keys.read();
            if let Some(listener) = listener.as_ref() {
                for key in current_keys.iter().filter(|k| !last_keys.contains(k)) {
                    listener(KeyEvent {
                        kind: KeyEventKind::Down,
                        code: key_code(key),
                        at: now,
                    });
                }
                for key in last_keys.iter().filter(|k| !current_keys.contains(k)) {
                    listener(KeyEvent {
                        kind: KeyEventKind::Up,
                        code: key_code(key),
                        at: now,
                    });
                }
            }
        }
        last_keys = current_keys;
    }

    log::debug!("[HOOK] Polling thread stopped");
}

/// Map a `device_query` key to its virtual key code.
///
/// Keys without a virtual code get a synthetic code above 0xF000, which the
/// overlay shows as a `Key <code>` placeholder.
pub fn key_code(key: &Keycode) -> u16 {
    match key {
        Keycode::Key0 => VC_0,
        Keycode::Key1 => VC_1,
        Keycode::Key2 => VC_2,
        Keycode::Key3 => VC_3,
        Keycode::Key4 => VC_4,
        Keycode::Key5 => VC_5,
        Keycode::Key6 => VC_6,
        Keycode::Key7 => VC_7,
        Keycode::Key8 => VC_8,
        Keycode::Key9 => VC_9,
        Keycode::A => VC_A,
        Keycode::B => VC_B,
        Keycode::C => VC_C,
        Keycode::D => VC_D,
        Keycode::E => VC_E,
        Keycode::F => VC_F,
        Keycode::G => VC_G,
        Keycode::H => VC_H,
        Keycode::I => VC_I,
        Keycode::J => VC_J,
        Keycode::K => VC_K,
        Keycode::L => VC_L,
        Keycode::M => VC_M,
        Keycode::N => VC_N,
        Keycode::O => VC_O,
        Keycode::P => VC_P,
        Keycode::Q => VC_Q,
        Keycode::R => VC_R,
        Keycode::S => VC_S,
        Keycode::T => VC_T,
        Keycode::U => VC_U,
        Keycode::V => VC_V,
        Keycode::W => VC_W,
        Keycode::X => VC_X,
        Keycode::Y => VC_Y,
        Keycode::Z => VC_Z,
        Keycode::F1 => VC_F1,
        Keycode::F2 => VC_F2,
        Keycode::F3 => VC_F3,
        Keycode::F4 => VC_F4,
        Keycode::F5 => VC_F5,
        Keycode::F6 => VC_F6,
        Keycode::F7 => VC_F7,
        Keycode::F8 => VC_F8,
        Keycode::F9 => VC_F9,
        Keycode::F10 => VC_F10,
        Keycode::F11 => VC_F11,
        Keycode::F12 => VC_F12,
        Keycode::Escape => VC_ESCAPE,
        Keycode::Space => VC_SPACE,
        Keycode::LControl => VC_CONTROL_L,
        Keycode::RControl => VC_CONTROL_R,
        Keycode::LShift => VC_SHIFT_L,
        Keycode::RShift => VC_SHIFT_R,
        Keycode::LAlt => VC_ALT_L,
        Keycode::RAlt => VC_ALT_R,
        Keycode::LMeta => VC_META_L,
        Keycode::RMeta => VC_META_R,
        Keycode::Enter => VC_ENTER,
        Keycode::Up => VC_UP,
        Keycode::Down => VC_DOWN,
        Keycode::Left => VC_LEFT,
        Keycode::Right => VC_RIGHT,
        Keycode::Backspace => VC_BACKSPACE,
        Keycode::CapsLock => VC_CAPS_LOCK,
        Keycode::Tab => VC_TAB,
        Keycode::Home => VC_HOME,
        Keycode::End => VC_END,
        Keycode::PageUp => VC_PAGE_UP,
        Keycode::PageDown => VC_PAGE_DOWN,
        Keycode::Insert => VC_INSERT,
        Keycode::Delete => VC_DELETE,
        Keycode::Numpad0 => VC_KP_0,
        Keycode::Numpad1 => VC_KP_1,
        Keycode::Numpad2 => VC_KP_2,
        Keycode::Numpad3 => VC_KP_3,
        Keycode::Numpad4 => VC_KP_4,
        Keycode::Numpad5 => VC_KP_5,
        Keycode::Numpad6 => VC_KP_6,
        Keycode::Numpad7 => VC_KP_7,
        Keycode::Numpad8 => VC_KP_8,
        Keycode::Numpad9 => VC_KP_9,
        Keycode::NumpadSubtract => VC_KP_SUBTRACT,
        Keycode::NumpadAdd => VC_KP_ADD,
        Keycode::NumpadDivide => VC_KP_DIVIDE,
        Keycode::NumpadMultiply => VC_KP_MULTIPLY,
        Keycode::Grave => VC_BACKQUOTE,
        Keycode::Minus => VC_MINUS,
        Keycode::Equal => VC_EQUALS,
        Keycode::LeftBracket => VC_OPEN_BRACKET,
        Keycode::RightBracket => VC_CLOSE_BRACKET,
        Keycode::BackSlash => VC_BACK_SLASH,
        Keycode::Semicolon => VC_SEMICOLON,
        Keycode::Apostrophe => VC_QUOTE,
        Keycode::Comma => VC_COMMA,
        Keycode::Dot => VC_PERIOD,
        Keycode::Slash => VC_SLASH,
        #[allow(unreachable_patterns)]
        other => 0xF000 | (other.clone() as u16 & 0x0FFF),
    }
}
