//! Application lifecycle glue.
//!
//! - `events`: window events, page loads and run-loop events, forwarded to
//!   [`crate::state::AppState`]

pub mod events;
