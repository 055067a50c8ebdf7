//! Window descriptor registry.
//!
//! Static creation parameters for every window the host can open. Descriptors
//! carry no behavior; controllers copy one, adjust the geometry for the
//! current display, and hand it to the base window wrapper.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geometry::{Point, Rect};

/// Identity of every window the host manages.
///
/// The serialized name doubles as the Tauri window label and as the
/// `winName` argument renderers pass to lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum WindowKind {
    Main,
    RecorderFullScreen,
    RecorderScreen,
    RecorderShot,
    RecorderSourceClip,
    MouseClickOverlay,
    KeyboardOverlay,
    Settings,
}

impl WindowKind {
    pub const ALL: [WindowKind; 8] = [
        WindowKind::Main,
        WindowKind::RecorderFullScreen,
        WindowKind::RecorderScreen,
        WindowKind::RecorderShot,
        WindowKind::RecorderSourceClip,
        WindowKind::MouseClickOverlay,
        WindowKind::KeyboardOverlay,
        WindowKind::Settings,
    ];

    /// Tauri window label.
    pub fn label(self) -> &'static str {
        match self {
            WindowKind::Main => "main",
            WindowKind::RecorderFullScreen => "recorderFullScreen",
            WindowKind::RecorderScreen => "recorderScreen",
            WindowKind::RecorderShot => "recorderShot",
            WindowKind::RecorderSourceClip => "recorderSourceClip",
            WindowKind::MouseClickOverlay => "mouseClickOverlay",
            WindowKind::KeyboardOverlay => "keyboardOverlay",
            WindowKind::Settings => "settings",
        }
    }
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Window decoration and stacking flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    /// OS title bar and borders.
    pub frame: bool,
    pub transparent: bool,
    pub always_on_top: bool,
    pub resizable: bool,
    pub maximizable: bool,
    pub minimizable: bool,
    pub skip_taskbar: bool,
    pub shadow: bool,
    pub fullscreen: bool,
    /// Whether the window grabs keyboard focus when it is created.
    pub take_focus: bool,
    /// Initial visibility for windows that are not `ready_to_show`.
    pub visible: bool,
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            frame: true,
            transparent: false,
            always_on_top: false,
            resizable: true,
            maximizable: true,
            minimizable: true,
            skip_taskbar: false,
            shadow: true,
            fullscreen: false,
            take_focus: true,
            visible: true,
        }
    }
}

/// Initial geometry in logical pixels. Missing values fall back to the
/// platform default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Creation parameters for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub kind: WindowKind,
    pub title: &'static str,
    /// Named view to load, e.g. `main.html`.
    pub view: &'static str,
    pub geometry: Geometry,
    pub chrome: Chrome,
    /// Keep the window hidden until its content signals it can paint.
    pub ready_to_show: bool,
}

impl WindowDescriptor {
    pub fn with_position(mut self, origin: Point) -> Self {
        self.geometry.x = Some(origin.x);
        self.geometry.y = Some(origin.y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.geometry.width = Some(width);
        self.geometry.height = Some(height);
        self
    }

    pub fn with_bounds(self, bounds: Rect) -> Self {
        self.with_position(bounds.origin())
            .with_size(bounds.width, bounds.height)
    }

    pub fn width(&self) -> f64 {
        self.geometry.width.unwrap_or_default()
    }

    pub fn height(&self) -> f64 {
        self.geometry.height.unwrap_or_default()
    }
}

/// Borderless, click-through, top-most overlay chrome.
const OVERLAY_CHROME: Chrome = Chrome {
    frame: false,
    transparent: true,
    always_on_top: true,
    resizable: false,
    maximizable: false,
    minimizable: false,
    skip_taskbar: true,
    shadow: false,
    fullscreen: false,
    take_focus: false,
    visible: true,
};

/// Look up the static descriptor for a window identity.
pub fn descriptor(kind: WindowKind) -> WindowDescriptor {
    let base = WindowDescriptor {
        kind,
        title: "",
        view: "",
        geometry: Geometry::default(),
        chrome: Chrome::default(),
        ready_to_show: false,
    };

    match kind {
        WindowKind::Main => WindowDescriptor {
            title: "Screen Recorder",
            view: "main.html",
            chrome: Chrome {
                frame: false,
                resizable: false,
                ..Chrome::default()
            },
            ready_to_show: true,
            ..base
        }
        .with_size(400.0, 220.0),
        WindowKind::RecorderFullScreen => WindowDescriptor {
            title: "Recording",
            view: "recorderFullScreen.html",
            chrome: Chrome {
                transparent: true,
                always_on_top: true,
                resizable: false,
                maximizable: false,
                shadow: false,
                ..Chrome::default()
            },
            ..base
        }
        .with_size(340.0, 60.0),
        WindowKind::RecorderScreen => WindowDescriptor {
            title: "Recorder",
            view: "recorderScreen.html",
            chrome: Chrome {
                frame: false,
                resizable: false,
                maximizable: false,
                ..Chrome::default()
            },
            ready_to_show: true,
            ..base
        }
        .with_size(513.0, 116.0),
        WindowKind::RecorderShot => WindowDescriptor {
            title: "Select Area",
            view: "recorderShot.html",
            chrome: Chrome {
                frame: false,
                transparent: true,
                always_on_top: true,
                resizable: false,
                shadow: false,
                fullscreen: true,
                visible: false,
                ..Chrome::default()
            },
            ..base
        },
        WindowKind::RecorderSourceClip => WindowDescriptor {
            title: "Recording Area",
            view: "recorderSourceClip.html",
            chrome: Chrome {
                frame: false,
                transparent: true,
                always_on_top: true,
                resizable: false,
                ..Chrome::default()
            },
            ready_to_show: true,
            ..base
        },
        WindowKind::MouseClickOverlay => WindowDescriptor {
            title: "",
            view: "mouseClickOverlay.html",
            chrome: OVERLAY_CHROME,
            ..base
        },
        WindowKind::KeyboardOverlay => WindowDescriptor {
            title: "",
            view: "keyboardOverlay.html",
            chrome: OVERLAY_CHROME,
            ..base
        },
        WindowKind::Settings => WindowDescriptor {
            title: "Settings",
            view: "settings.html",
            chrome: Chrome {
                frame: false,
                resizable: false,
                maximizable: false,
                ..Chrome::default()
            },
            ready_to_show: true,
            ..base
        }
        .with_size(600.0, 480.0),
    }
}
