//! Window, page and run-loop event handlers.
//!
//! Handlers run on the event loop thread. They only read what the event
//! carries and push it onto the [`EventQueue`]; a single task applies queued
//! events to the state in arrival order, so no state lock is ever taken on
//! the event loop and two samples of one drag are never reordered.

use std::sync::Arc;
use tauri::webview::{PageLoadEvent, PageLoadPayload};
use tauri::{AppHandle, Manager, RunEvent, Webview, Window, WindowEvent};
use tokio::sync::mpsc;

use crate::geometry::Point;
use crate::state::AppState;

/// Native events the state reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Destroyed(String),
    Moved(String, Point),
    Blurred(String),
    PageLoaded(String),
    Reopen,
}

/// Sending half of the event queue, managed by the app.
pub struct EventQueue {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl EventQueue {
    /// Start the consumer task applying events to `state`.
    pub fn start(state: Arc<AppState>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tauri::async_runtime::spawn(drain(rx, state));
        Self { tx }
    }

    pub fn push(&self, event: HostEvent) {
        if self.tx.send(event).is_err() {
            log::warn!("[APP] Event queue closed, dropping event");
        }
    }
}

/// Apply events one at a time until every sender is gone.
async fn drain(mut rx: mpsc::UnboundedReceiver<HostEvent>, state: Arc<AppState>) {
    while let Some(event) = rx.recv().await {
        apply(&state, event);
    }
    log::debug!("[APP] Event queue drained");
}

fn apply(state: &Arc<AppState>, event: HostEvent) {
    match event {
        HostEvent::Destroyed(label) => state.on_window_destroyed(&label),
        HostEvent::Moved(label, origin) => state.on_window_moved(&label, origin),
        HostEvent::Blurred(label) => state.on_window_blurred(&label),
        HostEvent::PageLoaded(label) => state.on_page_loaded(&label),
        HostEvent::Reopen => {
            if let Err(e) = state.reopen() {
                log::error!("[APP] Failed to reopen: {}", e);
            }
        },
    }
}

fn push<M: Manager<tauri::Wry>>(manager: &M, event: HostEvent) {
    match manager.try_state::<EventQueue>() {
        Some(queue) => queue.push(event),
        None => log::debug!("[APP] Event before setup: {:?}", event),
    }
}

/// Handle window events for the application.
///
/// This is called from the Tauri builder's `on_window_event` hook.
pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    let label = || window.label().to_string();
    match event {
        WindowEvent::Destroyed => push(window, HostEvent::Destroyed(label())),

        WindowEvent::Moved(position) => {
            let scale = window.scale_factor().unwrap_or(1.0);
            let logical = position.to_logical::<f64>(scale);
            push(window, HostEvent::Moved(label(), Point::new(logical.x, logical.y)));
        },

        WindowEvent::Focused(false) => push(window, HostEvent::Blurred(label())),

        _ => {},
    }
}

/// Content finished loading: release work deferred until the window can
/// paint.
pub fn handle_page_load(webview: &Webview, payload: &PageLoadPayload<'_>) {
    if payload.event() == PageLoadEvent::Finished {
        push(webview, HostEvent::PageLoaded(webview.label().to_string()));
    }
}

/// Application run-loop events: dock reopen, exit.
pub fn handle_run_event(app: &AppHandle, event: RunEvent) {
    match event {
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => push(app, HostEvent::Reopen),

        // Closing the last window quits, except on macOS where the app
        // stays in the dock
        RunEvent::ExitRequested { api, code, .. } => {
            if code.is_none() && cfg!(target_os = "macos") {
                log::info!("[APP] All windows closed, staying in the dock");
                api.prevent_exit();
            }
        },

        RunEvent::Exit => {
            log::info!("[APP] Exiting");
            if let Some(state) = app.try_state::<Arc<AppState>>() {
                state.shutdown();
            }
        },

        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::window::NativeWindow;
    use crate::config::{HookConfig, WindowKind};
    use crate::geometry::Rect;
    use crate::state::HostServices;
    use crate::testing::{
        Call, FakeCursor, FakeDisplays, FakeHookLoader, FakeWindowFactory, ManualTimers,
    };

    fn state(factory: Arc<FakeWindowFactory>) -> Arc<AppState> {
        AppState::new(HostServices {
            factory,
            displays: Arc::new(FakeDisplays::dual()),
            hook_loader: Arc::new(FakeHookLoader::available()),
            timers: Arc::new(ManualTimers::default()),
            cursor: Arc::new(FakeCursor::default()),
            hook_config: HookConfig::default(),
        })
    }

    fn run_queue(state: &Arc<AppState>, events: Vec<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in events {
            tx.send(event).unwrap();
        }
        drop(tx);
        tauri::async_runtime::block_on(drain(rx, state.clone()));
    }

    #[test]
    fn test_drag_samples_apply_in_arrival_order() {
        let factory = Arc::new(FakeWindowFactory::default());
        let state = state(factory.clone());
        state
            .open_source_clip(Rect::new(100.0, 100.0, 640.0, 360.0))
            .unwrap();
        let clip = factory.latest(WindowKind::RecorderSourceClip).unwrap();
        let label = clip.label().to_string();
        clip.clear_calls();

        run_queue(
            &state,
            vec![
                // Straddles both displays: pulled back onto the primary
                HostEvent::Moved(label.clone(), Point::new(1700.0, 100.0)),
                // Echo of the correction
                HostEvent::Moved(label.clone(), Point::new(1280.0, 100.0)),
                HostEvent::Moved(label.clone(), Point::new(300.0, 300.0)),
                HostEvent::Moved(label.clone(), Point::new(1800.0, 500.0)),
            ],
        );

        assert_eq!(
            clip.calls(),
            vec![
                Call::SetPosition(Point::new(1280.0, 100.0)),
                Call::SetPosition(Point::new(1280.0, 500.0)),
            ]
        );
    }

    #[test]
    fn test_page_load_then_destroy_in_order() {
        let factory = Arc::new(FakeWindowFactory::default());
        let state = state(factory.clone());
        state.open_settings().unwrap();
        let settings = factory.latest(WindowKind::Settings).unwrap();
        let label = settings.label().to_string();

        run_queue(
            &state,
            vec![HostEvent::PageLoaded(label.clone()), HostEvent::Destroyed(label)],
        );

        assert_eq!(settings.calls(), vec![Call::Center, Call::Show]);
        assert!(!state.has_open_windows());
    }
}
