//! Command history for edterm
//!
//! Records commands submitted to the terminal so other tooling can offer
//! them back. Storage is a flat `timestamp;command` file under the user's
//! home directory.

use std::fs;
use std::path::PathBuf;

/// Maximum number of history entries
const HISTORY_LIMIT: usize = 1000;

/// A single history entry
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// The command text
    pub command: String,
    /// Unix timestamp
    pub timestamp: u64,
}

/// Command history storage
pub struct CommandHistory {
    /// All history entries (newest last)
    entries: Vec<HistoryEntry>,
    /// File path for persistence; `None` keeps history in memory only
    file_path: Option<PathBuf>,
    /// Maximum entries
    max_entries: usize,
}

impl CommandHistory {
    /// History backed by `~/.edterm/history`
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// In-memory history without persistence
    pub fn in_memory() -> Self {
        Self::with_path(None)
    }

    fn with_path(file_path: Option<PathBuf>) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            file_path,
            max_entries: HISTORY_LIMIT,
        };
        history.load();
        history
    }

    fn default_path() -> Option<PathBuf> {
        let home = home_dir()?;
        let edterm_dir = home.join(".edterm");
        if !edterm_dir.exists() {
            let _ = fs::create_dir_all(&edterm_dir);
        }
        Some(edterm_dir.join("history"))
    }

    /// Load history from file
    fn load(&mut self) {
        let Some(ref path) = self.file_path else {
            return;
        };
        if let Ok(content) = fs::read_to_string(path) {
            for line in content.lines() {
                if let Some((ts_str, cmd)) = line.split_once(';') {
                    if let Ok(timestamp) = ts_str.parse::<u64>() {
                        self.entries.push(HistoryEntry {
                            command: cmd.to_string(),
                            timestamp,
                        });
                    }
                }
            }
        }
    }

    /// Save history to file
    fn save(&self) {
        if let Some(ref path) = self.file_path {
            let content: String = self
                .entries
                .iter()
                .map(|e| format!("{};{}", e.timestamp, e.command))
                .collect::<Vec<_>>()
                .join("\n");
            let _ = fs::write(path, content);
        }
    }

    /// Add a command to history
    pub fn add(&mut self, command: &str) {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return;
        }

        // Dedup consecutive repeats
        if let Some(last) = self.entries.last() {
            if last.command == trimmed {
                return;
            }
        }

        if Self::is_sensitive(trimmed) {
            return;
        }

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.entries.push(HistoryEntry {
            command: trimmed.to_string(),
            timestamp,
        });

        while self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }

        self.save();
    }

    /// Check if command is sensitive (shouldn't be saved)
    fn is_sensitive(command: &str) -> bool {
        let lower = command.to_lowercase();
        let sensitive_patterns = [
            "password", "passwd", "secret", "token", "api_key", "apikey",
            "credential", "auth", "login", "ssh-add", "gpg",
        ];
        sensitive_patterns.iter().any(|p| lower.contains(p))
    }

    /// Get recent history (newest first)
    pub fn recent(&self, count: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(count).collect()
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
