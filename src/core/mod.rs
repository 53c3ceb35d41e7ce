//! Core algorithms – grid layout, preview state machine, scroll
//! positioning, and the item sources feeding them.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Time is always passed in, never read, so everything here is testable
//! without a terminal.

pub mod flow;
pub mod item;
pub mod layout;
pub mod manifest;
pub mod position;
pub mod preview;
pub mod scan;
pub mod settings;
pub mod source;
pub mod transition;
pub mod viewport;
