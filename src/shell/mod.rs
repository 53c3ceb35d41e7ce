//! Shell integration helpers.
//!
//! The binary communicates with the calling shell through **stdout**.
//! All TUI rendering goes to the alternate screen (stderr-backed), so stdout
//! is reserved for the "result": the link the user chose to visit, which the
//! shell wrapper hands to the desktop's URL opener.

pub mod integration;
