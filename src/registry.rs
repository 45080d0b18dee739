//! Cross-component session discovery
//!
//! Other parts of the plugin ecosystem want to find "the most recently used
//! terminal and its directory" without holding a reference to any session.
//! The registry mirrors that state at three scopes: per buffer (UI name),
//! per tab (last buffer, last directory, last terminal name) and global
//! (last window). Writes are last-writer-wins with no coordination; by
//! convention only one terminal is active at a time, so readers must treat
//! every value as advisory and most-recent-only, never authoritative.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::host::{BufferId, TabId, WindowId};

/// Per-tab discovery record
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabRecord {
    /// Buffer of the most recently drawn terminal in this tab
    pub last_buffer: BufferId,
    /// Directory that terminal was last pointed at
    pub last_directory: PathBuf,
    /// Name of the most recently drawn terminal UI in this tab
    pub last_terminal: String,
}

/// Shared discovery state, last-writer-wins
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// UI name per terminal buffer
    buffer_names: HashMap<BufferId, String>,
    /// Most-recent terminal info per tab
    tabs: HashMap<TabId, TabRecord>,
    /// Window of the most recently drawn terminal, any tab
    last_window: Option<WindowId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly drawn session at all three scopes
    pub fn record_session(
        &mut self,
        name: &str,
        tab: TabId,
        buffer: BufferId,
        directory: &Path,
        window: WindowId,
    ) {
        self.buffer_names.insert(buffer, name.to_string());
        self.tabs.insert(
            tab,
            TabRecord {
                last_buffer: buffer,
                last_directory: directory.to_path_buf(),
                last_terminal: name.to_string(),
            },
        );
        self.last_window = Some(window);
    }

    /// Optimistically update a tab's last directory after a `cd`
    pub fn set_last_directory(&mut self, tab: TabId, directory: &Path) {
        self.tabs.entry(tab).or_default().last_directory = directory.to_path_buf();
    }

    /// UI name of a terminal buffer
    pub fn buffer_name(&self, buffer: BufferId) -> Option<&str> {
        self.buffer_names.get(&buffer).map(String::as_str)
    }

    /// Most-recent terminal info for a tab
    pub fn tab(&self, tab: TabId) -> Option<&TabRecord> {
        self.tabs.get(&tab)
    }

    /// Window of the most recently drawn terminal
    pub fn last_window(&self) -> Option<WindowId> {
        self.last_window
    }
}
