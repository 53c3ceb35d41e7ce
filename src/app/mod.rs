//! Application orchestration: state management, background image loading
//! and input handling.

pub mod debounce;
pub mod event;
pub mod handler;
pub mod image_runtime;
pub mod state;
