//! Terminal session controller
//!
//! `TerminalUi` owns one terminal buffer and its process handles, and is
//! the entry point for everything the host dispatches at this provider:
//! the `redraw` lifecycle (create or re-attach the buffer) and the
//! user-facing actions (send text, execute the current line, prompt
//! navigation, directory changes).
//!
//! The controller never caches rendered text or cursor state across host
//! round-trips; each step re-reads what it needs, because the terminal
//! content mutates asynchronously underneath it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::UiParams;
use crate::core::cwd::{self, CwdProbe, SysProbe};
use crate::core::prompt::{locate_prompt, typed_input, Direction, PromptPattern};
use crate::core::session::Session;
use crate::history::CommandHistory;
use crate::host::backend::TerminalBackend;
use crate::host::{
    Choice, Editor, HostError, OptionSet, OptionValue, WindowId, UNSET_WINDOW,
};
use crate::registry::SessionRegistry;
use crate::ui::keymapper;

/// Filetype tag assigned to terminal buffers
const FILETYPE: &str = "edterm";

/// User-facing actions dispatched by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Change the shell's current directory
    Cd { directory: String },
    /// Execute the command line under the cursor
    ExecuteLine,
    /// Insert a string into the terminal without submitting it
    Insert { text: String },
    /// Move to the next prompt from the cursor
    NextPrompt,
    /// Paste the prompt line under the cursor into the command line
    PastePrompt,
    /// Move to the previous prompt from the cursor
    PreviousPrompt,
    /// Redraw the terminal display
    Redraw,
    /// Send a string to the terminal and submit it
    Send { text: String },
}

/// Which transition a `redraw` call took
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedrawOutcome {
    /// Existing buffer brought back into view
    Attached,
    /// Buffer and process freshly created
    Created,
    /// Nothing happened (declined directory creation, missing command)
    Aborted,
}

/// One terminal UI instance
pub struct TerminalUi {
    name: String,
    params: UiParams,
    prompt: PromptPattern,
    session: Session,
    backend: Box<dyn TerminalBackend>,
    probe: Box<dyn CwdProbe>,
    history: CommandHistory,
}

impl TerminalUi {
    pub fn new(name: &str, params: UiParams, backend: Box<dyn TerminalBackend>) -> Self {
        let prompt = PromptPattern::new(&params.prompt_pattern);
        Self {
            name: name.to_string(),
            params,
            prompt,
            session: Session::new(),
            backend,
            probe: Box::new(SysProbe::new()),
            history: CommandHistory::new(),
        }
    }

    /// Replace the working-directory probe
    pub fn with_probe(mut self, probe: Box<dyn CwdProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the command history store
    pub fn with_history(mut self, history: CommandHistory) -> Self {
        self.history = history;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Create the terminal buffer, or bring an existing one back into view.
    ///
    /// Invoked by the host whenever this UI should be (re)drawn.
    pub fn redraw(
        &mut self,
        editor: &mut dyn Editor,
        registry: &mut SessionRegistry,
    ) -> Result<RedrawOutcome, HostError> {
        let cwd = self.resolve_cwd(&*editor);
        if !cwd.is_dir() {
            let message = format!("{} is not a directory. Create?", cwd.display());
            match editor.confirm(&message) {
                Choice::Yes => {
                    if let Err(error) = fs::create_dir_all(&cwd) {
                        editor.report_error(&format!(
                            "failed to create {}: {error}",
                            cwd.display()
                        ));
                        return Ok(RedrawOutcome::Aborted);
                    }
                }
                Choice::No | Choice::Cancel => return Ok(RedrawOutcome::Aborted),
            }
        }

        let outcome = if self.session.is_attached(&*editor) {
            self.switch_buffer(editor, registry, &cwd)?;
            RedrawOutcome::Attached
        } else if self.new_buffer(editor, &cwd)? {
            RedrawOutcome::Created
        } else {
            return Ok(RedrawOutcome::Aborted);
        };

        self.init_variables(editor, registry, &cwd);
        Ok(outcome)
    }

    /// The command the user has typed after the prompt, pending execution.
    ///
    /// Empty when prompt tracking is off or the terminal is not focused.
    pub fn get_input(&self, editor: &dyn Editor) -> String {
        if !self.prompt_focused(editor) {
            return String::new();
        }

        let command_line = self.command_line_at_cursor(editor);
        typed_input(&command_line, editor.cursor().col, editor.mode())
    }

    /// First window displaying the terminal buffer, `UNSET_WINDOW` when
    /// hidden
    pub fn window_id(&self, editor: &dyn Editor) -> WindowId {
        editor
            .windows_for_buffer(self.session.buffer())
            .first()
            .copied()
            .unwrap_or(UNSET_WINDOW)
    }

    /// Handle one host-dispatched action
    pub fn dispatch(
        &mut self,
        editor: &mut dyn Editor,
        registry: &mut SessionRegistry,
        action: &Action,
    ) -> Result<(), HostError> {
        match action {
            Action::Cd { directory } => {
                if !self.prompt_focused(&*editor) {
                    return Ok(());
                }
                self.cd(editor, registry, Path::new(directory))
            }
            Action::ExecuteLine => {
                if !self.prompt_focused(&*editor) {
                    return Ok(());
                }
                let command = self.command_line_at_cursor(&*editor);
                self.send_text(editor, &command, true)?;
                self.history.add(&command);
                Ok(())
            }
            Action::Insert { text } => self.send_text(editor, text, false),
            Action::NextPrompt => {
                if self.prompt_focused(&*editor) {
                    locate_prompt(editor, &self.prompt, Direction::Forward);
                }
                Ok(())
            }
            Action::PastePrompt => {
                if !self.prompt_focused(&*editor) {
                    return Ok(());
                }
                let command = self.command_line_at_cursor(&*editor);
                self.send_text(editor, &command, false)
            }
            Action::PreviousPrompt => {
                if self.prompt_focused(&*editor) {
                    locate_prompt(editor, &self.prompt, Direction::Backward);
                }
                Ok(())
            }
            Action::Redraw => {
                if editor.current_buffer() == self.session.buffer() {
                    self.backend.refresh_display(editor, &self.session);
                }
                Ok(())
            }
            Action::Send { text } => {
                self.send_text(editor, text, true)?;
                self.backend.refresh_display(editor, &self.session);
                self.history.add(text);
                Ok(())
            }
        }
    }

    // --- lifecycle ---

    fn resolve_cwd(&self, editor: &dyn Editor) -> PathBuf {
        if self.params.cwd.is_empty() {
            editor.current_dir()
        } else {
            PathBuf::from(&self.params.cwd)
        }
    }

    fn switch_buffer(
        &mut self,
        editor: &mut dyn Editor,
        registry: &mut SessionRegistry,
        new_cwd: &Path,
    ) -> Result<(), HostError> {
        editor.open_split(&self.params.layout());
        editor.edit_buffer(self.session.buffer());

        // Re-align the shell only when it is known to sit elsewhere
        if self.prompt.is_enabled() {
            if let Some(current) = self.shell_cwd(&*editor) {
                if current != new_cwd {
                    self.cd(editor, registry, new_cwd)?;
                }
            }
        }
        Ok(())
    }

    fn new_buffer(&mut self, editor: &mut dyn Editor, cwd: &Path) -> Result<bool, HostError> {
        if self.params.command.is_empty() {
            editor.report_error("command param must be set.");
            return Ok(false);
        }

        editor.open_split(&self.params.layout());

        let handles = self.backend.start(
            editor,
            &self.params.command,
            &self.params.spawn_options(cwd),
        )?;
        self.session.attach(handles);
        debug!(name = self.name.as_str(), ?handles, "terminal created");

        self.backend.set_initial_mode(editor, self.params.start_insert);
        self.init_options(editor);
        Ok(true)
    }

    fn init_options(&self, editor: &mut dyn Editor) {
        let window = self.window_id(&*editor);

        let mut options = OptionSet::default();
        let off = [
            "list",
            "foldenable",
            "number",
            "relativenumber",
            "spell",
            "wrap",
        ];
        for name in off {
            options
                .window
                .push((name.to_string(), OptionValue::Bool(false)));
        }
        options
            .window
            .push(("colorcolumn".to_string(), OptionValue::Str(String::new())));
        options
            .window
            .push(("foldcolumn".to_string(), OptionValue::Int(0)));
        options
            .window
            .push(("signcolumn".to_string(), OptionValue::Str("no".to_string())));
        if editor.has_feature("statuscolumn") {
            options
                .window
                .push(("statuscolumn".to_string(), OptionValue::Str(String::new())));
        }
        if editor.has_feature("smoothscroll") {
            // Left enabled, smooth scrolling freezes terminal buffers
            options
                .window
                .push(("smoothscroll".to_string(), OptionValue::Bool(false)));
        }

        options
            .buffer
            .push(("bufhidden".to_string(), OptionValue::Str("hide".to_string())));
        options
            .buffer
            .push(("swapfile".to_string(), OptionValue::Bool(false)));

        editor.apply_options(window, self.session.buffer(), &options);

        // The filetype must be assigned last, and twice: tag-bound
        // auto-commands have to run after any default tag-specific setup
        editor.set_filetype(self.session.buffer(), FILETYPE);
        editor.set_filetype(self.session.buffer(), FILETYPE);
    }

    fn init_variables(
        &self,
        editor: &mut dyn Editor,
        registry: &mut SessionRegistry,
        cwd: &Path,
    ) {
        registry.record_session(
            &self.name,
            editor.current_tab(),
            self.session.buffer(),
            cwd,
            editor.current_window(),
        );
    }

    // --- directory reconciliation ---

    fn cd(
        &mut self,
        editor: &mut dyn Editor,
        registry: &mut SessionRegistry,
        directory: &Path,
    ) -> Result<(), HostError> {
        // Directory requests are advisory
        if !directory.is_dir() {
            return Ok(());
        }
        // Skip when the shell is already there
        if self.shell_cwd(&*editor).as_deref() == Some(directory) {
            return Ok(());
        }

        self.backend
            .send_input(editor, &self.session, &cwd::cd_command(directory))?;
        self.backend.refresh_display(editor, &self.session);

        // Optimistic update; not re-verified against the shell
        registry.set_last_directory(editor.current_tab(), directory);
        Ok(())
    }

    /// The shell's actual working directory, best effort
    fn shell_cwd(&mut self, editor: &dyn Editor) -> Option<PathBuf> {
        let buffer = self.session.buffer();
        let last_line = editor.line(buffer, editor.line_count(buffer));
        let hint = self.prompt.strip(&last_line);
        self.probe.current_dir(self.session.pid(), &hint)
    }

    // --- input helpers ---

    fn prompt_focused(&self, editor: &dyn Editor) -> bool {
        self.prompt.is_enabled() && editor.current_buffer() == self.session.buffer()
    }

    fn command_line_at_cursor(&self, editor: &dyn Editor) -> String {
        let line = editor.line(self.session.buffer(), editor.cursor().line);
        self.prompt.strip(&line)
    }

    fn send_text(
        &mut self,
        editor: &mut dyn Editor,
        text: &str,
        submit: bool,
    ) -> Result<(), HostError> {
        let mut bytes = text.as_bytes().to_vec();
        if submit {
            bytes.extend(keymapper::submit());
        }
        self.backend.send_input(editor, &self.session, &bytes)
    }
}
