//! Key codes, display names and key-press composition.
//!
//! Codes follow the libuiohook virtual-key numbering (scan-code based, with
//! the 0x0E00 prefix for extended keys) so the overlay receives the same
//! names on every platform.

use std::time::{Duration, Instant};

// ============================================================================
// Key codes
// ============================================================================

pub const VC_ESCAPE: u16 = 0x0001;
pub const VC_BACKSPACE: u16 = 0x000E;
pub const VC_TAB: u16 = 0x000F;
pub const VC_ENTER: u16 = 0x001C;
pub const VC_SPACE: u16 = 0x0039;
pub const VC_CAPS_LOCK: u16 = 0x003A;
pub const VC_NUM_LOCK: u16 = 0x0045;
pub const VC_SCROLL_LOCK: u16 = 0x0046;
pub const VC_PRINTSCREEN: u16 = 0x0E37;

pub const VC_CONTROL_L: u16 = 0x001D;
pub const VC_CONTROL_R: u16 = 0x0E1D;
pub const VC_ALT_L: u16 = 0x0038;
pub const VC_ALT_R: u16 = 0x0E38;
pub const VC_SHIFT_L: u16 = 0x002A;
pub const VC_SHIFT_R: u16 = 0x0036;
pub const VC_META_L: u16 = 0x0E5B;
pub const VC_META_R: u16 = 0x0E5C;

pub const VC_1: u16 = 0x0002;
pub const VC_2: u16 = 0x0003;
pub const VC_3: u16 = 0x0004;
pub const VC_4: u16 = 0x0005;
pub const VC_5: u16 = 0x0006;
pub const VC_6: u16 = 0x0007;
pub const VC_7: u16 = 0x0008;
pub const VC_8: u16 = 0x0009;
pub const VC_9: u16 = 0x000A;
pub const VC_0: u16 = 0x000B;

pub const VC_A: u16 = 0x001E;
pub const VC_B: u16 = 0x0030;
pub const VC_C: u16 = 0x002E;
pub const VC_D: u16 = 0x0020;
pub const VC_E: u16 = 0x0012;
pub const VC_F: u16 = 0x0021;
pub const VC_G: u16 = 0x0022;
pub const VC_H: u16 = 0x0023;
pub const VC_I: u16 = 0x0017;
pub const VC_J: u16 = 0x0024;
pub const VC_K: u16 = 0x0025;
pub const VC_L: u16 = 0x0026;
pub const VC_M: u16 = 0x0032;
pub const VC_N: u16 = 0x0031;
pub const VC_O: u16 = 0x0018;
pub const VC_P: u16 = 0x0019;
pub const VC_Q: u16 = 0x0010;
pub const VC_R: u16 = 0x0013;
pub const VC_S: u16 = 0x001F;
pub const VC_T: u16 = 0x0014;
pub const VC_U: u16 = 0x0016;
pub const VC_V: u16 = 0x002F;
pub const VC_W: u16 = 0x0011;
pub const VC_X: u16 = 0x002D;
pub const VC_Y: u16 = 0x0015;
pub const VC_Z: u16 = 0x002C;

pub const VC_F1: u16 = 0x003B;
pub const VC_F2: u16 = 0x003C;
pub const VC_F3: u16 = 0x003D;
pub const VC_F4: u16 = 0x003E;
pub const VC_F5: u16 = 0x003F;
pub const VC_F6: u16 = 0x0040;
pub const VC_F7: u16 = 0x0041;
pub const VC_F8: u16 = 0x0042;
pub const VC_F9: u16 = 0x0043;
pub const VC_F10: u16 = 0x0044;
pub const VC_F11: u16 = 0x0057;
pub const VC_F12: u16 = 0x0058;

pub const VC_PAGE_UP: u16 = 0x0E49;
pub const VC_PAGE_DOWN: u16 = 0x0E51;
pub const VC_HOME: u16 = 0x0E47;
pub const VC_END: u16 = 0x0E4F;
pub const VC_INSERT: u16 = 0x0E52;
pub const VC_DELETE: u16 = 0x0E53;

pub const VC_LEFT: u16 = 0xE04B;
pub const VC_UP: u16 = 0xE048;
pub const VC_RIGHT: u16 = 0xE04D;
pub const VC_DOWN: u16 = 0xE050;

pub const VC_KP_0: u16 = 0x0052;
pub const VC_KP_1: u16 = 0x004F;
pub const VC_KP_2: u16 = 0x0050;
pub const VC_KP_3: u16 = 0x0051;
pub const VC_KP_4: u16 = 0x004B;
pub const VC_KP_5: u16 = 0x004C;
pub const VC_KP_6: u16 = 0x004D;
pub const VC_KP_7: u16 = 0x0047;
pub const VC_KP_8: u16 = 0x0048;
pub const VC_KP_9: u16 = 0x0049;
pub const VC_KP_MULTIPLY: u16 = 0x0037;
pub const VC_KP_ADD: u16 = 0x004E;
pub const VC_KP_SUBTRACT: u16 = 0x004A;
pub const VC_KP_DECIMAL: u16 = 0x0053;
pub const VC_KP_DIVIDE: u16 = 0x0E35;
pub const VC_KP_ENTER: u16 = 0x0E1C;

pub const VC_SEMICOLON: u16 = 0x0027;
pub const VC_EQUALS: u16 = 0x000D;
pub const VC_COMMA: u16 = 0x0033;
pub const VC_MINUS: u16 = 0x000C;
pub const VC_PERIOD: u16 = 0x0034;
pub const VC_SLASH: u16 = 0x0035;
pub const VC_BACKQUOTE: u16 = 0x0029;
pub const VC_OPEN_BRACKET: u16 = 0x001A;
pub const VC_BACK_SLASH: u16 = 0x002B;
pub const VC_CLOSE_BRACKET: u16 = 0x001B;
pub const VC_QUOTE: u16 = 0x0028;

/// Display name for a key code, `None` when the code is not mapped.
pub fn key_name(code: u16) -> Option<&'static str> {
    let name = match code {
        VC_ESCAPE => "Esc",
        VC_BACKSPACE => "Backspace",
        VC_TAB => "Tab",
        VC_ENTER => "Enter",
        VC_SPACE => "Space",
        VC_CAPS_LOCK => "CapsLock",
        VC_NUM_LOCK => "NumLock",
        VC_SCROLL_LOCK => "ScrollLock",
        VC_PRINTSCREEN => "PrintScreen",

        VC_CONTROL_L | VC_CONTROL_R => "Ctrl",
        VC_ALT_L | VC_ALT_R => "Alt",
        VC_SHIFT_L | VC_SHIFT_R => "Shift",
        VC_META_L | VC_META_R => "Win",

        VC_1 => "1",
        VC_2 => "2",
        VC_3 => "3",
        VC_4 => "4",
        VC_5 => "5",
        VC_6 => "6",
        VC_7 => "7",
        VC_8 => "8",
        VC_9 => "9",
        VC_0 => "0",

        VC_A => "A",
        VC_B => "B",
        VC_C => "C",
        VC_D => "D",
        VC_E => "E",
        VC_F => "F",
        VC_G => "G",
        VC_H => "H",
        VC_I => "I",
        VC_J => "J",
        VC_K => "K",
        VC_L => "L",
        VC_M => "M",
        VC_N => "N",
        VC_O => "O",
        VC_P => "P",
        VC_Q => "Q",
        VC_R => "R",
        VC_S => "S",
        VC_T => "T",
        VC_U => "U",
        VC_V => "V",
        VC_W => "W",
        VC_X => "X",
        VC_Y => "Y",
        VC_Z => "Z",

        VC_F1 => "F1",
        VC_F2 => "F2",
        VC_F3 => "F3",
        VC_F4 => "F4",
        VC_F5 => "F5",
        VC_F6 => "F6",
        VC_F7 => "F7",
        VC_F8 => "F8",
        VC_F9 => "F9",
        VC_F10 => "F10",
        VC_F11 => "F11",
        VC_F12 => "F12",

        VC_PAGE_UP => "PageUp",
        VC_PAGE_DOWN => "PageDown",
        VC_HOME => "Home",
        VC_END => "End",
        VC_INSERT => "Insert",
        VC_DELETE => "Delete",

        VC_LEFT => "←",
        VC_UP => "↑",
        VC_RIGHT => "→",
        VC_DOWN => "↓",

        VC_KP_0 => "Num0",
        VC_KP_1 => "Num1",
        VC_KP_2 => "Num2",
        VC_KP_3 => "Num3",
        VC_KP_4 => "Num4",
        VC_KP_5 => "Num5",
        VC_KP_6 => "Num6",
        VC_KP_7 => "Num7",
        VC_KP_8 => "Num8",
        VC_KP_9 => "Num9",
        VC_KP_MULTIPLY => "Num*",
        VC_KP_ADD => "Num+",
        VC_KP_SUBTRACT => "Num-",
        VC_KP_DECIMAL => "Num.",
        VC_KP_DIVIDE => "Num/",
        VC_KP_ENTER => "NumEnter",

        VC_SEMICOLON => ";",
        VC_EQUALS => "=",
        VC_COMMA => ",",
        VC_MINUS => "-",
        VC_PERIOD => ".",
        VC_SLASH => "/",
        VC_BACKQUOTE => "`",
        VC_OPEN_BRACKET => "[",
        VC_BACK_SLASH => "\\",
        VC_CLOSE_BRACKET => "]",
        VC_QUOTE => "'",

        _ => return None,
    };
    Some(name)
}

/// Display name for a key code, with a placeholder for unmapped codes.
pub fn display_name(code: u16) -> String {
    match key_name(code) {
        Some(name) => name.to_string(),
        None => {
            log::warn!("[HOOK] Unmapped key code {} (0x{:04X})", code, code);
            format!("Key {}", code)
        },
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// Modifier keys in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl Modifier {
    const ORDER: [Modifier; 4] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Win];

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            VC_CONTROL_L | VC_CONTROL_R => Some(Modifier::Ctrl),
            VC_ALT_L | VC_ALT_R => Some(Modifier::Alt),
            VC_SHIFT_L | VC_SHIFT_R => Some(Modifier::Shift),
            VC_META_L | VC_META_R => Some(Modifier::Win),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Win => "Win",
        }
    }
}

// ============================================================================
// Key press tracking
// ============================================================================

/// Turns raw key down/up events into overlay labels.
///
/// Filters hardware repeat (same code again within the repeat window) and
/// keeps modifier state per physical key, so releasing the left Ctrl while
/// the right one is still down keeps Ctrl held.
#[derive(Debug)]
pub struct KeyPressTracker {
    repeat_window: Duration,
    last: Option<(u16, Instant)>,
    held_modifiers: Vec<u16>,
}

impl KeyPressTracker {
    pub fn new(repeat_window: Duration) -> Self {
        Self {
            repeat_window,
            last: None,
            held_modifiers: Vec::new(),
        }
    }

    /// Handle a key-down. Returns the label to display, or `None` for a
    /// suppressed repeat.
    pub fn key_down(&mut self, code: u16, at: Instant) -> Option<String> {
        let is_repeat = matches!(
            self.last,
            Some((last_code, last_at))
                if last_code == code && at.saturating_duration_since(last_at) < self.repeat_window
        );
        // A held key keeps refreshing the timestamp, so it is reported once
        self.last = Some((code, at));

        if Modifier::from_code(code).is_some() && !self.held_modifiers.contains(&code) {
            self.held_modifiers.push(code);
        }

        if is_repeat {
            return None;
        }
        Some(self.compose(code))
    }

    pub fn key_up(&mut self, code: u16) {
        self.held_modifiers.retain(|held| *held != code);
    }

    pub fn is_held(&self, modifier: Modifier) -> bool {
        self.held_modifiers
            .iter()
            .any(|code| Modifier::from_code(*code) == Some(modifier))
    }

    fn compose(&self, code: u16) -> String {
        let mut parts: Vec<String> = Modifier::ORDER
            .iter()
            .filter(|m| self.is_held(**m))
            .map(|m| m.label().to_string())
            .collect();

        if Modifier::from_code(code).is_none() {
            parts.push(display_name(code));
        }
        parts.join("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> KeyPressTracker {
        KeyPressTracker::new(Duration::from_millis(50))
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(VC_A), Some("A"));
        assert_eq!(key_name(VC_0), Some("0"));
        assert_eq!(key_name(VC_F11), Some("F11"));
        assert_eq!(key_name(VC_CONTROL_R), Some("Ctrl"));
        assert_eq!(key_name(VC_KP_ENTER), Some("NumEnter"));
        assert_eq!(key_name(0x7777), None);
    }

    #[test]
    fn test_unmapped_code_gets_placeholder() {
        assert_eq!(display_name(0x7777), "Key 30583");
        let mut t = tracker();
        assert_eq!(t.key_down(0x7777, Instant::now()).as_deref(), Some("Key 30583"));
    }

    #[test]
    fn test_repeat_within_window_is_suppressed() {
        let mut t = tracker();
        let start = Instant::now();
        assert_eq!(t.key_down(VC_A, start).as_deref(), Some("A"));
        assert_eq!(t.key_down(VC_A, start + Duration::from_millis(30)), None);
    }

    #[test]
    fn test_repeat_outside_window_is_emitted() {
        let mut t = tracker();
        let start = Instant::now();
        assert_eq!(t.key_down(VC_A, start).as_deref(), Some("A"));
        assert_eq!(
            t.key_down(VC_A, start + Duration::from_millis(80)).as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_held_key_reports_once() {
        let mut t = tracker();
        let start = Instant::now();
        assert!(t.key_down(VC_B, start).is_some());
        // Auto-repeat every 30ms: each event refreshes the window
        for i in 1..10 {
            assert_eq!(t.key_down(VC_B, start + Duration::from_millis(30 * i)), None);
        }
    }

    #[test]
    fn test_different_key_is_never_a_repeat() {
        let mut t = tracker();
        let start = Instant::now();
        assert_eq!(t.key_down(VC_A, start).as_deref(), Some("A"));
        assert_eq!(
            t.key_down(VC_S, start + Duration::from_millis(10)).as_deref(),
            Some("S")
        );
    }

    #[test]
    fn test_modifier_composition() {
        let mut t = tracker();
        let start = Instant::now();
        assert_eq!(t.key_down(VC_CONTROL_L, start).as_deref(), Some("Ctrl"));
        assert_eq!(
            t.key_down(VC_A, start + Duration::from_millis(100)).as_deref(),
            Some("Ctrl+A")
        );

        t.key_up(VC_A);
        t.key_up(VC_CONTROL_L);
        assert_eq!(
            t.key_down(VC_A, start + Duration::from_millis(300)).as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_modifier_order_is_fixed() {
        let mut t = tracker();
        let start = Instant::now();
        t.key_down(VC_META_L, start);
        t.key_down(VC_SHIFT_R, start + Duration::from_millis(100));
        t.key_down(VC_ALT_L, start + Duration::from_millis(200));
        t.key_down(VC_CONTROL_R, start + Duration::from_millis(300));
        assert_eq!(
            t.key_down(VC_S, start + Duration::from_millis(400)).as_deref(),
            Some("Ctrl+Alt+Shift+Win+S")
        );
    }

    #[test]
    fn test_left_and_right_modifiers_tracked_separately() {
        let mut t = tracker();
        let start = Instant::now();
        t.key_down(VC_SHIFT_L, start);
        t.key_down(VC_SHIFT_R, start + Duration::from_millis(100));
        t.key_up(VC_SHIFT_L);
        assert!(t.is_held(Modifier::Shift));
        assert_eq!(
            t.key_down(VC_X, start + Duration::from_millis(200)).as_deref(),
            Some("Shift+X")
        );
        t.key_up(VC_SHIFT_R);
        assert!(!t.is_held(Modifier::Shift));
    }

    #[test]
    fn test_suppressed_modifier_repeat_keeps_state() {
        let mut t = tracker();
        let start = Instant::now();
        assert_eq!(t.key_down(VC_CONTROL_L, start).as_deref(), Some("Ctrl"));
        assert_eq!(t.key_down(VC_CONTROL_L, start + Duration::from_millis(20)), None);
        assert!(t.is_held(Modifier::Ctrl));
    }
}
