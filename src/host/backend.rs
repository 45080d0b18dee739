//! Terminal back ends
//!
//! The host exposes two ways of running a terminal, with different state
//! surfaces and refresh behavior. Both are normalized behind
//! [`TerminalBackend`] so the session controller never branches on the
//! host flavor:
//!
//! - [`ChannelBackend`]: the terminal job exposes an input channel; bytes
//!   are written to it directly and the display refreshes on its own.
//! - [`KeysBackend`]: input is injected as synthetic key presses into the
//!   terminal widget, which does not repaint by itself; every write is
//!   followed by an explicit redraw-and-settle sequence.

use tracing::debug;

use crate::core::session::Session;
use crate::host::{Editor, HostError, SpawnOptions, TermHandles};
use crate::ui::keymapper;

/// One host terminal flavor, normalized
pub trait TerminalBackend {
    /// Back-end name for logging
    fn name(&self) -> &'static str;

    /// Open a terminal running `command` in the current window and capture
    /// whatever handles this back end exposes
    fn start(
        &self,
        editor: &mut dyn Editor,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<TermHandles, HostError>;

    /// Deliver bytes to the terminal's input stream
    fn send_input(
        &self,
        editor: &mut dyn Editor,
        session: &Session,
        bytes: &[u8],
    ) -> Result<(), HostError>;

    /// Make pending terminal output visible
    fn refresh_display(&self, editor: &mut dyn Editor, session: &Session);

    /// Put the freshly created terminal in its initial mode
    fn set_initial_mode(&self, editor: &mut dyn Editor, start_insert: bool);

    /// Leave insert mode
    fn leave_insert(&self, editor: &mut dyn Editor);
}

/// Back end with a direct job input channel
pub struct ChannelBackend;

impl TerminalBackend for ChannelBackend {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn start(
        &self,
        editor: &mut dyn Editor,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<TermHandles, HostError> {
        // The terminal replaces the current buffer's content; detach to a
        // fresh buffer so the user's buffer survives
        editor.replace_with_empty_buffer();

        let (job, pid) = if editor.has_feature("job-start-term") {
            let job = editor.start_terminal_job(command, options)?;
            (Some(job), editor.terminal_job_pid(job))
        } else {
            // Legacy hosts record the handles as buffer-local state
            editor.open_terminal_in_buffer(command, options)?;
            let buffer = editor.current_buffer();
            (editor.buffer_job(buffer), editor.buffer_job_pid(buffer))
        };

        let handles = TermHandles {
            buffer: editor.current_buffer(),
            job,
            pid,
        };
        debug!(backend = self.name(), ?handles, "terminal started");
        Ok(handles)
    }

    fn send_input(
        &self,
        editor: &mut dyn Editor,
        session: &Session,
        bytes: &[u8],
    ) -> Result<(), HostError> {
        let job = session.job().ok_or(HostError::NoJob(session.buffer()))?;
        editor.send_to_job(job, bytes)
    }

    fn refresh_display(&self, editor: &mut dyn Editor, _session: &Session) {
        editor.redraw();
    }

    fn set_initial_mode(&self, editor: &mut dyn Editor, start_insert: bool) {
        if start_insert {
            editor.start_insert();
        } else {
            self.leave_insert(editor);
        }
    }

    fn leave_insert(&self, editor: &mut dyn Editor) {
        editor.stop_insert();
    }
}

/// Back end that drives the terminal widget through its key queue
pub struct KeysBackend;

impl TerminalBackend for KeysBackend {
    fn name(&self) -> &'static str {
        "keys"
    }

    fn start(
        &self,
        editor: &mut dyn Editor,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<TermHandles, HostError> {
        let pid = editor.open_terminal_window(command, options)?;
        let handles = TermHandles {
            buffer: editor.current_buffer(),
            // No input channel; writes go through the key queue
            job: None,
            pid: Some(pid),
        };
        debug!(backend = self.name(), ?handles, "terminal started");
        Ok(handles)
    }

    fn send_input(
        &self,
        editor: &mut dyn Editor,
        session: &Session,
        bytes: &[u8],
    ) -> Result<(), HostError> {
        editor.send_keys(session.buffer(), bytes)?;
        // This widget does not repaint on its own
        self.refresh_display(editor, session);
        editor.wait_terminal(session.buffer());
        Ok(())
    }

    fn refresh_display(&self, editor: &mut dyn Editor, session: &Session) {
        let Some(&window) = editor.windows_for_buffer(session.buffer()).first() else {
            return;
        };

        let previous = editor.current_window();
        editor.goto_window(window);
        editor.redraw();
        // Entering insert mode at line end flushes pending output to the
        // display; drop back to normal mode afterwards
        editor.feed_keys(b"A");
        self.leave_insert(editor);
        editor.goto_window(previous);
    }

    fn set_initial_mode(&self, editor: &mut dyn Editor, _start_insert: bool) {
        // Must be in insert mode or the widget never repaints; the
        // start-insert setting cannot be honored here
        editor.start_insert();
    }

    fn leave_insert(&self, editor: &mut dyn Editor) {
        // Let the terminal settle before switching modes
        editor.sleep_ms(50);
        editor.feed_keys(&keymapper::terminal_escape());
    }
}
