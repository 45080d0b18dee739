//! edterm - embedded terminal window provider for terminal text editors.
//!
//! edterm manages one shell terminal per UI instance inside a host editor:
//! it creates (or re-attaches to) the terminal buffer, tracks the child
//! process, keeps the editor's idea of the current directory in sync with
//! the shell, and exposes interactive actions over the rendered terminal
//! text (send input, execute the typed command, jump between prompts,
//! change directory).
//!
//! The provider never interprets escape sequences or models a screen
//! buffer; it reads back the host's rendered line text and treats it as a
//! best-effort, constantly mutating snapshot.
//!
//! # Module Hierarchy
//!
//! ```text
//! src/
//! ├── config.rs    - UiParams (host-supplied parameters)
//! ├── registry.rs  - SessionRegistry (cross-component discovery)
//! ├── history.rs   - CommandHistory (submitted-command log)
//! ├── core/        - prompt tracking, cwd reconciliation, session handles
//! ├── host/        - Editor facade + the two terminal back ends
//! └── ui/          - TerminalUi controller, key encoding
//! ```
//!
//! # Concurrency
//!
//! Everything is single-threaded and cooperative. Each [`Editor`] call is
//! one host round-trip; actions run to completion between round-trips and
//! re-read live state instead of caching it.

pub mod config;
pub mod core;
pub mod history;
pub mod host;
pub mod registry;
pub mod ui;

pub use crate::config::UiParams;
pub use crate::core::cwd::{CwdProbe, SysProbe};
pub use crate::core::prompt::PromptPattern;
pub use crate::host::backend::{ChannelBackend, KeysBackend, TerminalBackend};
pub use crate::host::{Editor, HostError};
pub use crate::registry::SessionRegistry;
pub use crate::ui::terminal::{Action, RedrawOutcome, TerminalUi};
