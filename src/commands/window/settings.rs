//! Settings panel. Reused while open, recreated after the user closes it.

use super::handle::{ReadyAction, WindowFactory, WindowHandle};
use crate::config::{descriptor, WindowKind};
use crate::error::RecorderResult;

pub struct SettingsWindow {
    pub handle: WindowHandle,
}

impl SettingsWindow {
    pub fn create(factory: &dyn WindowFactory) -> RecorderResult<Self> {
        let mut handle = WindowHandle::configure(descriptor(WindowKind::Settings));
        handle.when_ready(ReadyAction::Center);
        handle.realize(factory)?;
        Ok(Self { handle })
    }

    /// Bring the existing window to the front.
    pub fn bring_to_front(&self) {
        self.handle.focus();
    }
}
