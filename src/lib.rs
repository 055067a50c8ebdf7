use std::sync::Arc;
use tauri::Manager;

mod app;
mod commands;
mod config;
mod error;
mod geometry;
mod state;

#[cfg(test)]
mod testing;

use commands::display::XcapDisplays;
use commands::input_hook::{DeviceCursor, DeviceQueryLoader};
use commands::ipc;
use commands::window::TauriWindowFactory;
use config::{ContentSource, HookConfig};
use state::{AppState, HostServices, TokioTimers};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    commands::logging::init();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .on_window_event(app::events::handle_window_event)
        .on_page_load(app::events::handle_page_load)
        .invoke_handler(tauri::generate_handler![
            // Window lifecycle
            ipc::close_win,
            ipc::min_win,
            ipc::max_win,
            // Full-screen recording
            ipc::rfs_open,
            ipc::rfs_close,
            ipc::rfs_mouse_enter,
            ipc::rfs_mouse_leave,
            ipc::rfs_set_recording_state,
            ipc::rfs_get_desktop_capturer_source,
            ipc::rfs_download,
            // Region recording
            ipc::rs_select_area_open,
            ipc::rs_select_area_close,
            ipc::rs_open,
            ipc::rs_close,
            ipc::rs_get_bounds_clip,
            ipc::rs_get_desktop_capturer_source,
            ipc::rs_set_ignore_mouse_event,
            ipc::rs_set_movable,
            ipc::rs_download,
            // Settings and overlays
            ipc::settings_open,
            ipc::settings_close,
            ipc::keyboard_overlay_open,
            ipc::keyboard_overlay_close,
            // Theme
            ipc::theme_get,
            ipc::theme_set,
            ipc::theme_color_get,
            ipc::theme_color_set,
            ipc::open_external,
            // Logging
            commands::logging::write_log,
            commands::logging::get_log_dir,
        ])
        .setup(|app| {
            if let Err(e) = commands::logging::attach_log_dir(app.handle()) {
                log::warn!("[LOG] File logging disabled: {}", e);
            }

            let content = ContentSource::detect();
            log::info!("[APP] Loading content from {:?}", content);

            let hook_config = HookConfig::from_env();
            let state = AppState::new(HostServices {
                factory: Arc::new(TauriWindowFactory::new(app.handle().clone(), content)),
                displays: Arc::new(XcapDisplays),
                hook_loader: Arc::new(DeviceQueryLoader::new(hook_config.poll_interval_ms)),
                timers: Arc::new(TokioTimers),
                cursor: Arc::new(DeviceCursor::new()),
                hook_config,
            });
            app.manage(state.clone());
            app.manage(app::events::EventQueue::start(state.clone()));

            state.start()?;
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(app::events::handle_run_event);
}
