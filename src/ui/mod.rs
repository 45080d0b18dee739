//! Terminal UI surface.
//!
//! This module provides the host-facing surface of the provider:
//!
//! - **terminal**: `TerminalUi` session controller and action dispatch
//! - **keymapper**: symbolic key to input-byte encoding
//!
//! The controller is what the host invokes; everything else hangs off it.

pub mod keymapper;
pub mod terminal;

pub use keymapper::{KeyMapper, Modifiers};
pub use terminal::{Action, RedrawOutcome, TerminalUi};
