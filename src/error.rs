//! Central error types for the recorder host.
//!
//! All errors implement `Serialize` so they can be returned from Tauri
//! commands; the frontend receives the display message.

use serde::Serialize;
use thiserror::Error;

use crate::config::windows::WindowKind;

/// Main error type for host operations.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Native window creation or manipulation failed
    #[error("Window error: {0}")]
    Window(String),

    /// A command targeted a window that is not open
    #[error("Window not open: {kind}")]
    WindowNotOpen { kind: WindowKind },

    /// Display enumeration failed or returned nothing usable
    #[error("Display error: {0}")]
    Display(String),

    /// Capture source enumeration or snapshot failed
    #[error("Capture failed: {0}")]
    Capture(String),

    /// The native input hook could not be loaded on this platform
    #[error("Input hook unavailable: {0}")]
    HookUnavailable(String),

    /// The native input hook failed to start or stop
    #[error("Input hook error: {0}")]
    Hook(String),

    /// Saving a recording failed
    #[error("Download failed: {0}")]
    Download(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding failed
    #[error("Image error: {0}")]
    Image(String),
}

/// Tauri requires command errors to be serializable.
impl Serialize for RecorderError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<image::ImageError> for RecorderError {
    fn from(err: image::ImageError) -> Self {
        RecorderError::Image(err.to_string())
    }
}

impl From<tauri::Error> for RecorderError {
    fn from(err: tauri::Error) -> Self {
        RecorderError::Window(err.to_string())
    }
}

/// Type alias for Results using RecorderError.
pub type RecorderResult<T> = Result<T, RecorderError>;
