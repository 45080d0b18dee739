//! UI parameter handling for edterm.
//!
//! Parameters arrive from the host plugin framework and can also be loaded
//! from a TOML file:
//!
//! ```toml
//! # Shell to run (string or argv array)
//! command = "zsh -l"
//!
//! # Prompt shape, anchored at line start when searching
//! prompt_pattern = "\\w+@\\w+ .* [$%] "
//!
//! # Window placement (delegated to the host's split command)
//! split = "horizontal"
//! win_height = 15
//!
//! start_insert = true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::host::{SpawnOptions, WindowLayout};

/// Parameters of one terminal UI instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiParams {
    /// Child process argv; empty means unconfigured, which is an error at
    /// terminal creation time
    #[serde(deserialize_with = "deserialize_command")]
    pub command: Vec<String>,
    /// Working directory; empty means the editor's current directory
    pub cwd: String,
    /// Opaque options merged into the host's process-start call
    pub extra_term_options: BTreeMap<String, toml::Value>,
    /// Border of the floating window, delegated
    pub floating_border: String,
    /// Prompt shape; empty disables all prompt-aware behavior
    pub prompt_pattern: String,
    /// Split direction, delegated
    pub split: String,
    /// Start the terminal in insert mode
    pub start_insert: bool,
    /// Toggle an existing window instead of focusing it, delegated
    pub toggle: bool,
    pub win_col: u32,
    pub win_height: u32,
    pub win_row: u32,
    pub win_width: u32,
}

impl Default for UiParams {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            cwd: String::new(),
            extra_term_options: BTreeMap::new(),
            floating_border: String::new(),
            prompt_pattern: String::new(),
            split: String::new(),
            start_insert: false,
            toggle: false,
            win_col: 50,
            win_height: 15,
            win_row: 20,
            win_width: 80,
        }
    }
}

impl UiParams {
    /// Load parameters from a TOML file, falling back to defaults on any
    /// failure
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(params) = toml::from_str(&content) {
                    return params;
                }
            }
        }
        Self::default()
    }

    /// Parse parameters from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Window placement passed through to the host's split command
    pub fn layout(&self) -> WindowLayout {
        WindowLayout {
            floating_border: self.floating_border.clone(),
            split: self.split.clone(),
            toggle: self.toggle,
            col: self.win_col,
            row: self.win_row,
            width: self.win_width,
            height: self.win_height,
        }
    }

    /// Process-start options for a resolved working directory
    pub fn spawn_options(&self, cwd: &Path) -> SpawnOptions {
        SpawnOptions {
            cwd: cwd.to_path_buf(),
            extra: self.extra_term_options.clone(),
        }
    }
}

/// `command` accepts either an argv array or a single shell-style string
#[derive(Deserialize)]
#[serde(untagged)]
enum CommandField {
    Argv(Vec<String>),
    Line(String),
}

fn deserialize_command<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match CommandField::deserialize(deserializer)? {
        CommandField::Argv(argv) => Ok(argv),
        CommandField::Line(line) => shell_words::split(&line).map_err(serde::de::Error::custom),
    }
}
