//! Global input hook shared by the click and key overlays.
//!
//! ## Architecture
//!
//! ```text
//! input_hook/
//!   backend.rs     - HookLoader/HookBackend capability, device_query poller
//!   coordinator.rs - Mouse/keyboard channels over one native hook
//!   keymap.rs      - Key code table, repeat filter, modifier composition
//!   pointer.rs     - Physical to logical click conversion, cursor probe
//! ```

pub mod backend;
pub mod coordinator;
pub mod keymap;
pub mod pointer;

pub use backend::{DeviceQueryLoader, HookLoader};
pub use coordinator::InputHookCoordinator;
pub use pointer::{CursorProbe, DeviceCursor};
