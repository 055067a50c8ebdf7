//! Region selector.
//!
//! A full-screen window showing a frozen snapshot of the primary display on
//! which the user drags out the region to record. The snapshot is taken
//! before the window exists so the selector never captures itself, and is
//! pushed to the renderer only once the page can paint it.

use serde_json::json;

use super::handle::{ReadyAction, WindowFactory, WindowHandle};
use crate::commands::capture::{list_sources, select_source};
use crate::commands::display::DisplayProvider;
use crate::commands::ipc::channels;
use crate::config::{descriptor, WindowKind};
use crate::error::{RecorderError, RecorderResult};

/// A captured display image ready for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub display_id: u32,
    pub data_url: String,
}

/// Capture the screen source matching the primary display, or the first
/// source when none matches.
pub fn take_snapshot(displays: &dyn DisplayProvider) -> RecorderResult<Snapshot> {
    let primary = displays.primary()?;
    let sources = list_sources(displays)?;
    let source = select_source(&sources, primary.id)
        .ok_or_else(|| RecorderError::Capture("No screen sources available".to_string()))?;
    let display_id = source.display_id.parse::<u32>().unwrap_or(primary.id);

    log::debug!("[SHOT] Capturing source {} for display {}", source.id, display_id);

    Ok(Snapshot {
        display_id,
        data_url: displays.capture_data_url(display_id)?,
    })
}

pub struct RecorderShot {
    pub handle: WindowHandle,
}

impl RecorderShot {
    pub fn open(factory: &dyn WindowFactory, snapshot: Snapshot) -> RecorderResult<Self> {
        let mut handle = WindowHandle::configure(descriptor(WindowKind::RecorderShot));
        handle.realize(factory)?;
        handle.when_ready(ReadyAction::Emit {
            event: channels::SHOT_SHOW,
            payload: json!(snapshot.data_url),
        });
        handle.when_ready(ReadyAction::Show);
        Ok(Self { handle })
    }
}
