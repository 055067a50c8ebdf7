//! Window content and icon resolution.
//!
//! Debug builds started with `RECORDER_DEV_URL` load views from the frontend
//! dev server; everything else loads the packaged views bundled with the app.

use std::path::{Path, PathBuf};

/// Environment variable naming the frontend dev server.
pub const DEV_URL_ENV: &str = "RECORDER_DEV_URL";

/// Dev server used when `RECORDER_DEV_URL` is set but empty.
pub const DEFAULT_DEV_URL: &str = "http://localhost:5173";

/// Icon location relative to the source tree or the resource dir.
const ICON_RELATIVE_PATH: &str = "icons/icon.png";

/// Where window views are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Base URL of a running dev server, without a trailing slash.
    DevServer(String),
    /// Views bundled into the application.
    Packaged,
}

impl ContentSource {
    /// Resolve from the build mode and the process environment.
    pub fn detect() -> Self {
        Self::resolve(cfg!(debug_assertions), std::env::var(DEV_URL_ENV).ok())
    }

    pub fn resolve(debug_build: bool, dev_url: Option<String>) -> Self {
        match dev_url {
            Some(url) if debug_build => {
                let url = url.trim().trim_end_matches('/');
                if url.is_empty() {
                    ContentSource::DevServer(DEFAULT_DEV_URL.to_string())
                } else {
                    ContentSource::DevServer(url.to_string())
                }
            },
            _ => ContentSource::Packaged,
        }
    }

    /// Dev server URL for a view, or `None` for packaged content.
    pub fn dev_url_for(&self, view: &str) -> Option<String> {
        match self {
            ContentSource::DevServer(base) => Some(format!("{}/{}", base, view)),
            ContentSource::Packaged => None,
        }
    }

    /// Whether a navigation target belongs to the app itself. Anything else
    /// is handed to the default browser.
    pub fn is_app_url(&self, url: &str) -> bool {
        if url.starts_with("tauri://") || url.contains("://tauri.localhost") {
            return true;
        }
        match self {
            ContentSource::DevServer(base) => url == base || url.starts_with(&format!("{}/", base)),
            ContentSource::Packaged => false,
        }
    }

    /// Window icon: the source tree in dev, the resource dir when packaged.
    pub fn icon_path(&self, resource_dir: Option<&Path>) -> Option<PathBuf> {
        match self {
            ContentSource::DevServer(_) => {
                Some(Path::new(env!("CARGO_MANIFEST_DIR")).join(ICON_RELATIVE_PATH))
            },
            ContentSource::Packaged => resource_dir.map(|dir| dir.join(ICON_RELATIVE_PATH)),
        }
    }
}
