//! Static application configuration.
//!
//! ## Architecture
//!
//! - `windows`: descriptor for every window identity (size, chrome, view)
//! - `content`: dev-server vs packaged view loading, icon resolution
//! - `theme`: theme mode and accent color values
//! - `hook`: input hook stop policy and timing
//!
//! Nothing here holds mutable state. Runtime state lives in
//! [`crate::state::AppState`].

pub mod content;
pub mod hook;
pub mod theme;
pub mod windows;

pub use content::ContentSource;
pub use hook::{HookConfig, StopPolicy};
pub use theme::{ThemeColor, ThemeMode, ThemeState};
pub use windows::{descriptor, WindowDescriptor, WindowKind};
