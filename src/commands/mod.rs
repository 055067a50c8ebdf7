pub mod capture;
pub mod display;
pub mod download;
pub mod input_hook;
pub mod ipc;
pub mod logging;
pub mod window;
