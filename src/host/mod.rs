//! Host editor boundary.
//!
//! Everything this crate knows about the editor it runs inside goes through
//! the [`Editor`] trait: buffer and window handles, rendered line text,
//! cursor state, option application, and the terminal primitives the two
//! back ends are built on. The trait methods are thin wrappers over host
//! API round-trips; each call is a suspension point and callers re-read
//! state instead of caching it across calls.
//!
//! # Architecture
//!
//! ```text
//! TerminalUi
//! ├── Editor (host facade: buffers, windows, text, options)
//! └── TerminalBackend
//!     ├── ChannelBackend (job-channel byte injection)
//!     └── KeysBackend    (synthetic keys + manual redraw)
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

pub mod backend;
#[cfg(test)]
pub(crate) mod fake;

/// Editor buffer handle
pub type BufferId = i64;
/// Editor window handle
pub type WindowId = i64;
/// Editor tab page handle
pub type TabId = u64;
/// Input-stream handle of a running terminal job
pub type JobId = i64;

/// Sentinel for "no buffer created yet"
pub const UNSET_BUFFER: BufferId = -1;
/// Sentinel for "buffer not displayed in any window"
pub const UNSET_WINDOW: WindowId = -1;

/// Editor input mode, as reported by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Visual,
    Command,
    Terminal,
}

/// Outcome of a yes/no/cancel confirmation dialog
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    Cancel,
}

/// Cursor position (1-based line and character column)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorPos {
    pub line: u32,
    pub col: u32,
}

/// A single window- or buffer-local option value
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// A batch of option writes applied together.
///
/// The whole set must be observed by the host before any later filetype
/// assignment, since tag-bound auto-commands may read these options.
#[derive(Clone, Debug, Default)]
pub struct OptionSet {
    /// Window-local options (name, value)
    pub window: Vec<(String, OptionValue)>,
    /// Buffer-local options (name, value)
    pub buffer: Vec<(String, OptionValue)>,
}

/// Window placement parameters, passed through to the host's split command
/// without interpretation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowLayout {
    pub floating_border: String,
    pub split: String,
    /// Toggle an already-visible window instead of focusing it
    pub toggle: bool,
    pub col: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

/// Process start parameters for a terminal job
#[derive(Clone, Debug, Default)]
pub struct SpawnOptions {
    /// Working directory for the child process
    pub cwd: PathBuf,
    /// Opaque extra options merged into the host's start call
    pub extra: BTreeMap<String, toml::Value>,
}

/// Handles captured when a terminal is opened through a back end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermHandles {
    /// Buffer displaying the terminal
    pub buffer: BufferId,
    /// Input-stream handle, when the back end exposes one
    pub job: Option<JobId>,
    /// Process id of the spawned shell, when known
    pub pid: Option<u32>,
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to start terminal job: {0}")]
    Spawn(String),

    #[error("buffer {0} does not exist")]
    NoSuchBuffer(BufferId),

    #[error("no terminal job attached to buffer {0}")]
    NoJob(BufferId),

    #[error("failed to send input to terminal: {0}")]
    Send(String),
}

/// Facade over the host editor.
///
/// Implementations translate each method into one host API call. Methods
/// that mutate editor state take `&mut self`; read-only queries take
/// `&self` but still reflect live state, not a cached snapshot.
pub trait Editor {
    // --- buffers and windows ---

    /// Buffer displayed in the current window
    fn current_buffer(&self) -> BufferId;
    /// Whether a buffer handle still refers to a live buffer
    fn buffer_exists(&self, buffer: BufferId) -> bool;
    /// Display an existing buffer in the current window
    fn edit_buffer(&mut self, buffer: BufferId);
    /// Replace the current window's buffer with a fresh empty one
    fn replace_with_empty_buffer(&mut self);
    /// Run the delegated window split/float command
    fn open_split(&mut self, layout: &WindowLayout);
    /// Windows currently displaying a buffer, in host order
    fn windows_for_buffer(&self, buffer: BufferId) -> Vec<WindowId>;
    /// Currently focused window
    fn current_window(&self) -> WindowId;
    /// Focus a window
    fn goto_window(&mut self, window: WindowId);
    /// Current tab page
    fn current_tab(&self) -> TabId;

    // --- rendered text and cursor ---

    /// Number of rendered lines in a buffer
    fn line_count(&self, buffer: BufferId) -> u32;
    /// Rendered text of one line (1-based), empty for out-of-range
    fn line(&self, buffer: BufferId, nr: u32) -> String;
    /// Cursor position in the current window
    fn cursor(&self) -> CursorPos;
    /// Move the cursor in the current window
    fn set_cursor(&mut self, line: u32, col: u32);
    /// Current input mode
    fn mode(&self) -> Mode;

    // --- environment ---

    /// The editor's current working directory
    fn current_dir(&self) -> PathBuf;
    /// Ask the user a yes/no/cancel question
    fn confirm(&mut self, message: &str) -> Choice;
    /// Report an error message to the user
    fn report_error(&mut self, message: &str);
    /// Capability probe (e.g. `"smoothscroll"`, `"statuscolumn"`,
    /// `"job-start-term"`)
    fn has_feature(&self, feature: &str) -> bool;

    // --- options ---

    /// Apply a batch of options; the batch lands atomically with respect to
    /// later calls on this trait
    fn apply_options(&mut self, window: WindowId, buffer: BufferId, options: &OptionSet);
    /// Assign the buffer's filetype tag
    fn set_filetype(&mut self, buffer: BufferId, filetype: &str);

    // --- terminal primitives ---

    /// Start a terminal job in the current window, replacing its buffer
    /// content. Only valid when `has_feature("job-start-term")`.
    fn start_terminal_job(
        &mut self,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<JobId, HostError>;
    /// Process id behind a job handle
    fn terminal_job_pid(&self, job: JobId) -> Option<u32>;
    /// Legacy path: bind a terminal job to the current buffer. Job and pid
    /// are read back from buffer-local state afterwards.
    fn open_terminal_in_buffer(
        &mut self,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<(), HostError>;
    /// Job handle recorded on a buffer by [`open_terminal_in_buffer`]
    ///
    /// [`open_terminal_in_buffer`]: Editor::open_terminal_in_buffer
    fn buffer_job(&self, buffer: BufferId) -> Option<JobId>;
    /// Process id recorded on a buffer by [`open_terminal_in_buffer`]
    ///
    /// [`open_terminal_in_buffer`]: Editor::open_terminal_in_buffer
    fn buffer_job_pid(&self, buffer: BufferId) -> Option<u32>;
    /// Open a terminal widget in the current window and return the shell's
    /// process id. The spawned process is killed when the buffer closes.
    fn open_terminal_window(
        &mut self,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<u32, HostError>;
    /// Write bytes to a job's input channel
    fn send_to_job(&mut self, job: JobId, bytes: &[u8]) -> Result<(), HostError>;
    /// Inject synthetic key bytes into a terminal buffer
    fn send_keys(&mut self, buffer: BufferId, bytes: &[u8]) -> Result<(), HostError>;
    /// Block until a terminal buffer's pending output has settled
    fn wait_terminal(&mut self, buffer: BufferId);
    /// Force a display refresh
    fn redraw(&mut self);
    /// Enter insert mode
    fn start_insert(&mut self);
    /// Leave insert mode directly
    fn stop_insert(&mut self);
    /// Feed normal-mode keys through the input queue
    fn feed_keys(&mut self, bytes: &[u8]);
    /// Cooperative sleep, yielding to the host event loop
    fn sleep_ms(&mut self, millis: u64);
}
