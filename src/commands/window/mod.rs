//! Window supervisor.
//!
//! ## Architecture
//!
//! ```text
//! window/
//!   handle.rs          - NativeWindow/WindowFactory seams, WindowHandle, ReadyGate
//!   native.rs          - Tauri-backed factory and window
//!   registry.rs        - owner of every controller, close cascades
//!   main_window.rs     - main singleton
//!   toolbar.rs         - full-screen recording toolbar (auto-hide)
//!   shot.rs            - region selector with display snapshot
//!   source_clip.rs     - recorded region, containment and movability lock
//!   recorder_screen.rs - recording controls below the source clip
//!   overlay.rs         - click and key overlays
//!   settings.rs        - settings singleton
//! ```
//!
//! Controllers compose a [`WindowHandle`] with their own behavior; none of
//! them talks to Tauri directly.

pub mod handle;
pub mod main_window;
pub mod native;
pub mod overlay;
pub mod recorder_screen;
pub mod registry;
pub mod settings;
pub mod shot;
pub mod source_clip;
pub mod toolbar;

pub use handle::{NativeWindow, ReadyAction, ReadyGate, WindowFactory, WindowHandle};
pub use native::TauriWindowFactory;
pub use registry::{RecordingFlow, Teardown, WindowRegistry};
