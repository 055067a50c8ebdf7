//! Event names pushed from the host to renderers.
//!
//! Renderers subscribe with `listen(name, ...)`; the names match the
//! channel strings the frontend already uses.

/// Logical click position for the click overlay. Payload: `{ x, y }`.
pub const MOUSE_CLICK: &str = "mouse-click-overlay:on-mouse-click";

/// Composed key label for the key overlay. Payload: `"Ctrl+A"`.
pub const KEY_PRESS: &str = "keyboard-overlay:on-key-press";

/// Primary display snapshot for the region selector. Payload: data URL.
pub const SHOT_SHOW: &str = "rs-select-area:on-show-win";

/// Recording started or stopped in the source clip. Payload: bool.
pub const RS_RECORDING_STATE_CHANGE: &str = "rs:on-recording-state-change";

/// Theme mode changed. Payload: `"light" | "dark" | "system"`.
pub const THEME_CHANGE: &str = "theme:on-change";

/// Accent color changed. Payload: color name.
pub const THEME_COLOR_CHANGE: &str = "theme-color:on-change";
