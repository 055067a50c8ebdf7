//! Input hook configuration.

use std::str::FromStr;

/// Environment variable selecting the [`StopPolicy`].
pub const STOP_POLICY_ENV: &str = "RECORDER_HOOK_STOP_POLICY";

/// Window within which an identical key code counts as hardware repeat.
pub const DEFAULT_REPEAT_WINDOW_MS: u64 = 50;

/// Polling interval of the device backend (~120Hz).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 8;

/// When the shared native hook is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPolicy {
    /// Stop when the last attached channel detaches, whichever it is.
    #[default]
    LastDetach,
    /// Only a mouse detach stops the hook, and only if the keyboard channel
    /// is no longer attached. Keyboard detach leaves the hook running.
    MouseDetachOnly,
}

impl FromStr for StopPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-detach" => Ok(StopPolicy::LastDetach),
            "mouse-detach" => Ok(StopPolicy::MouseDetachOnly),
            other => Err(format!("Unknown hook stop policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookConfig {
    pub stop_policy: StopPolicy,
    pub repeat_window_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            stop_policy: StopPolicy::default(),
            repeat_window_ms: DEFAULT_REPEAT_WINDOW_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl HookConfig {
    /// Defaults, with the stop policy overridable from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(STOP_POLICY_ENV) {
            match value.parse() {
                Ok(policy) => config.stop_policy = policy,
                Err(e) => log::warn!("[HOOK] {}, using {:?}", e, config.stop_policy),
            }
        }
        config
    }
}
