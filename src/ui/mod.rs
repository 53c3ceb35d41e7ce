//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No filesystem I/O happens here.

pub mod grid_widget;
pub mod halfblocks;
pub mod layout;
pub mod preview_widget;
pub mod projection;
pub mod smooth_scroll;
pub mod spinner;
pub mod theme;
