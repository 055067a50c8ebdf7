//! Main control panel.
//!
//! One instance per process. The registry creates it on first access and
//! drops the instance on reset so the next access builds a fresh window.

use super::handle::{WindowFactory, WindowHandle};
use crate::config::{descriptor, WindowKind};
use crate::error::RecorderResult;

pub struct MainWindow {
    pub handle: WindowHandle,
}

impl MainWindow {
    pub fn create(factory: &dyn WindowFactory) -> RecorderResult<Self> {
        let mut handle = WindowHandle::configure(descriptor(WindowKind::Main));
        handle.realize(factory)?;
        Ok(Self { handle })
    }
}
