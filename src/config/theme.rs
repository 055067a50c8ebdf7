//! Theme configuration.
//!
//! Process-wide appearance state shared by every window: a light/dark/system
//! mode and an accent color from a fixed palette. The state lives inside
//! [`crate::state::AppState`]; this module only defines the values.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Light/dark preference. `System` follows the OS setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// Accent color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ThemeColor {
    #[default]
    Violet,
    Pink,
    Rose,
    SkyBlue,
    DeepBlue,
    Green,
    DeepGreen,
    Orange,
    Yellow,
    Zinc,
    Neutral,
    Slate,
    Gray,
}

/// Current appearance, broadcast to all windows on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub color: ThemeColor,
}
