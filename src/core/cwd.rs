//! Shell working-directory introspection and reconciliation
//!
//! The editor only ever sees a point-in-time snapshot of rendered text, so
//! the shell's actual working directory is recovered from the OS process
//! table, with the last rendered prompt line as a fallback hint. Directory
//! changes are pushed back to the shell as a quoted `cd` command using the
//! native quoting convention of the target platform.

use std::path::{Path, PathBuf};

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::debug;

use crate::ui::keymapper;

/// Best-effort working-directory probe for a terminal's shell process.
///
/// `pid` is the process the terminal was started with; the shell the user
/// interacts with may be a descendant of it. `hint` is the last rendered
/// prompt line with the prompt stripped, consulted only when the process
/// table yields nothing.
pub trait CwdProbe {
    fn current_dir(&mut self, pid: Option<u32>, hint: &str) -> Option<PathBuf>;
}

/// Process-table probe.
///
/// Walks the descendants of the terminal process and reports the working
/// directory of the deepest live one, on the assumption that the innermost
/// child is the shell the user is typing into.
pub struct SysProbe {
    system: System,
}

impl SysProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Working directory of the deepest descendant of `root`, or of `root`
    /// itself when it has no children
    fn descendant_cwd(&mut self, root: u32) -> Option<PathBuf> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        let root = Pid::from_u32(root);
        self.system.process(root)?;

        let mut best: Option<(usize, u64, PathBuf)> = None;
        for (pid, process) in self.system.processes() {
            let Some(depth) = self.depth_below(root, *pid) else {
                continue;
            };
            let Some(cwd) = process.cwd() else {
                continue;
            };
            let candidate = (depth, process.start_time(), cwd.to_path_buf());
            if best.as_ref().map(|b| (b.0, b.1) < (candidate.0, candidate.1)).unwrap_or(true) {
                best = Some(candidate);
            }
        }
        best.map(|(_, _, cwd)| cwd)
    }

    /// Chain length from `pid` up to `root`; 0 for `root` itself, `None`
    /// when `pid` is not a descendant
    fn depth_below(&self, root: Pid, pid: Pid) -> Option<usize> {
        let mut current = pid;
        for depth in 0..64 {
            if current == root {
                return Some(depth);
            }
            current = self.system.process(current)?.parent()?;
        }
        None
    }
}

impl Default for SysProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CwdProbe for SysProbe {
    fn current_dir(&mut self, pid: Option<u32>, hint: &str) -> Option<PathBuf> {
        if let Some(pid) = pid {
            if let Some(cwd) = self.descendant_cwd(pid) {
                return Some(cwd);
            }
            debug!(pid, "process table walk found no working directory");
        }
        hint_dir(hint)
    }
}

/// Interpret a stripped prompt line as a directory path
pub fn hint_dir(hint: &str) -> Option<PathBuf> {
    let hint = hint.trim();
    if hint.is_empty() {
        return None;
    }

    let path = match hint.strip_prefix('~') {
        Some(rest) => {
            let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
            PathBuf::from(home).join(rest.trim_start_matches(&['/', '\\'][..]))
        }
        None => PathBuf::from(hint),
    };

    path.is_dir().then_some(path)
}

/// Build the full `cd` input sequence for the native shell, submit key
/// included
pub fn cd_command(directory: &Path) -> Vec<u8> {
    build_cd_command(directory, cfg!(windows))
}

fn build_cd_command(directory: &Path, windows: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    // Erase any partially typed command first; Windows consoles choke on
    // the control byte, so it is omitted there
    if !windows {
        bytes.extend(keymapper::line_clear());
    }
    let quote = if windows { '"' } else { '\'' };
    bytes.extend(format!("cd {quote}{}{quote}", directory.display()).into_bytes());
    bytes.extend(keymapper::submit());
    bytes
}
