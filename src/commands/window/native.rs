//! Tauri backing for the window wrapper.
//!
//! [`TauriWindowFactory`] turns a [`WindowDescriptor`] into a
//! `WebviewWindow` with the uniform creation contract:
//!
//! - unique label per instance (`{kind}-{n}`), so late events from a closed
//!   window never reach its successor
//! - window icon resolved for dev or packaged builds
//! - content from the dev server or the packaged views
//! - an init script exposing the window kind, disabling the context menu
//!   and sending `window.open` / `target="_blank"` to the default browser
//! - a navigation filter handing every non-app URL to the default browser

use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tauri::image::Image;
use tauri::{
    AppHandle, Emitter, EventTarget, LogicalPosition, Manager, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder,
};

use super::handle::{NativeWindow, WindowFactory};
use crate::config::{ContentSource, WindowDescriptor};
use crate::error::{RecorderError, RecorderResult};
use crate::geometry::{Point, Rect};

pub struct TauriWindowFactory {
    app: AppHandle,
    content: ContentSource,
    counter: AtomicU32,
}

impl TauriWindowFactory {
    pub fn new(app: AppHandle, content: ContentSource) -> Self {
        Self {
            app,
            content,
            counter: AtomicU32::new(0),
        }
    }

    fn next_label(&self, descriptor: &WindowDescriptor) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", descriptor.kind, n)
    }

    fn content_url(&self, descriptor: &WindowDescriptor) -> RecorderResult<WebviewUrl> {
        match self.content.dev_url_for(descriptor.view) {
            Some(url) => {
                let parsed = tauri::Url::parse(&url)
                    .map_err(|e| RecorderError::Window(format!("Invalid dev URL {}: {}", url, e)))?;
                Ok(WebviewUrl::External(parsed))
            },
            None => Ok(WebviewUrl::App(PathBuf::from(descriptor.view))),
        }
    }

    fn icon(&self) -> Option<Image<'static>> {
        let resource_dir = self.app.path().resource_dir().ok();
        let path = self.content.icon_path(resource_dir.as_deref())?;
        match Image::from_path(&path) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("[WINDOW] Failed to load icon {:?}: {}", path, e);
                None
            },
        }
    }
}

impl WindowFactory for TauriWindowFactory {
    fn create(&self, descriptor: &WindowDescriptor) -> RecorderResult<Arc<dyn NativeWindow>> {
        let label = self.next_label(descriptor);
        let url = self.content_url(descriptor)?;
        let chrome = descriptor.chrome;
        let geometry = descriptor.geometry;

        let content = self.content.clone();
        let mut builder = WebviewWindowBuilder::new(&self.app, &label, url)
            .title(descriptor.title)
            .decorations(chrome.frame)
            .transparent(chrome.transparent)
            .always_on_top(chrome.always_on_top)
            .resizable(chrome.resizable)
            .maximizable(chrome.maximizable)
            .minimizable(chrome.minimizable)
            .skip_taskbar(chrome.skip_taskbar)
            .shadow(chrome.shadow)
            .fullscreen(chrome.fullscreen)
            .focused(chrome.take_focus)
            // ready_to_show windows stay hidden until their content loads
            .visible(chrome.visible && !descriptor.ready_to_show)
            .initialization_script(&init_script(descriptor))
            .on_navigation(move |url| {
                if content.is_app_url(url.as_str()) {
                    return true;
                }
                open_external(url.as_str());
                false
            });

        if let (Some(width), Some(height)) = (geometry.width, geometry.height) {
            builder = builder.inner_size(width, height);
        }
        if let (Some(x), Some(y)) = (geometry.x, geometry.y) {
            builder = builder.position(x, y);
        }
        if let Some(icon) = self.icon() {
            builder = builder.icon(icon)?;
        }

        let window = builder
            .build()
            .map_err(|e| RecorderError::Window(format!("Failed to create {} window: {}", descriptor.kind, e)))?;

        Ok(Arc::new(TauriWindow::new(window)))
    }
}

/// Script run before any page script in every window.
///
/// `window.open` and `target="_blank"` links never navigate the window:
/// their targets go to `open_external` and on to the default browser.
fn init_script(descriptor: &WindowDescriptor) -> String {
    format!(
        r#"
window.__WINDOW_KIND__ = "{kind}";
document.addEventListener("contextmenu", (e) => e.preventDefault());
const openExternal = (url) => {{
  let href;
  try {{
    href = new URL(String(url), window.location.href).href;
  }} catch (_) {{
    return;
  }}
  window.__TAURI_INTERNALS__.invoke("open_external", {{ url: href }});
}};
window.open = (url) => {{
  if (url) openExternal(url);
  return null;
}};
document.addEventListener("click", (e) => {{
  const link = e.target instanceof Element ? e.target.closest("a[target=_blank]") : null;
  if (link) {{
    e.preventDefault();
    if (link.href) openExternal(link.href);
  }}
}}, true);
"#,
        kind = descriptor.kind
    )
}

/// Target of an external-open request, when it is something the default
/// browser or mail client can handle.
pub fn external_target(url: &str) -> Option<tauri::Url> {
    let parsed = tauri::Url::parse(url).ok()?;
    matches!(parsed.scheme(), "http" | "https" | "mailto" | "tel").then_some(parsed)
}

/// Hand `url` to the OS. Refused targets are only logged.
pub fn open_external(url: &str) {
    let Some(target) = external_target(url) else {
        log::warn!("[WINDOW] Refusing to open external target: {}", url);
        return;
    };
    log::info!("[WINDOW] Opening external link: {}", target);
    if let Err(e) = tauri_plugin_opener::open_url(target.as_str(), None::<&str>) {
        log::warn!("[WINDOW] Failed to open {}: {}", target, e);
    }
}

// ============================================================================
// Native window
// ============================================================================

pub struct TauriWindow {
    window: WebviewWindow,
    closed: AtomicBool,
}

impl TauriWindow {
    pub fn new(window: WebviewWindow) -> Self {
        Self {
            window,
            closed: AtomicBool::new(false),
        }
    }
}

impl NativeWindow for TauriWindow {
    fn label(&self) -> &str {
        self.window.label()
    }

    fn is_destroyed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.window.get_webview_window(self.window.label()).is_none()
    }

    fn show(&self) -> RecorderResult<()> {
        Ok(self.window.show()?)
    }

    fn hide(&self) -> RecorderResult<()> {
        Ok(self.window.hide()?)
    }

    fn is_visible(&self) -> bool {
        self.window.is_visible().unwrap_or(false)
    }

    fn is_minimized(&self) -> bool {
        self.window.is_minimized().unwrap_or(false)
    }

    fn minimize(&self) -> RecorderResult<()> {
        Ok(self.window.minimize()?)
    }

    fn unminimize(&self) -> RecorderResult<()> {
        Ok(self.window.unminimize()?)
    }

    fn maximize(&self) -> RecorderResult<()> {
        Ok(self.window.maximize()?)
    }

    fn unmaximize(&self) -> RecorderResult<()> {
        Ok(self.window.unmaximize()?)
    }

    fn set_focus(&self) -> RecorderResult<()> {
        Ok(self.window.set_focus()?)
    }

    fn close(&self) -> RecorderResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(self.window.close()?)
    }

    fn center(&self) -> RecorderResult<()> {
        Ok(self.window.center()?)
    }

    fn set_position(&self, origin: Point) -> RecorderResult<()> {
        Ok(self.window.set_position(LogicalPosition::new(origin.x, origin.y))?)
    }

    fn bounds(&self) -> RecorderResult<Rect> {
        let scale = self.window.scale_factor()?;
        let position = self.window.outer_position()?.to_logical::<f64>(scale);
        let size = self.window.outer_size()?.to_logical::<f64>(scale);
        Ok(Rect::new(position.x, position.y, size.width, size.height))
    }

    fn set_ignore_cursor_events(&self, ignore: bool) -> RecorderResult<()> {
        Ok(self.window.set_ignore_cursor_events(ignore)?)
    }

    fn set_always_on_top(&self, on_top: bool) -> RecorderResult<()> {
        Ok(self.window.set_always_on_top(on_top)?)
    }

    fn emit(&self, event: &str, payload: Value) -> RecorderResult<()> {
        let target = EventTarget::webview_window(self.window.label());
        Ok(self.window.emit_to(target, event, payload)?)
    }
}
