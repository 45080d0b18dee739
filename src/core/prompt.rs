//! Prompt detection over rendered terminal lines
//!
//! The shell's prompt is identified by a user-supplied regular expression.
//! Everything here is best-effort text matching against a snapshot of the
//! rendered buffer: a miss is "no data", never an error.

use tracing::warn;

use crate::host::{CursorPos, Editor, Mode};

/// Search direction for prompt navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Compiled prompt pattern.
///
/// An empty pattern string disables all prompt-aware behavior. A pattern
/// that fails to compile is logged once and behaves like an empty one.
#[derive(Debug)]
pub struct PromptPattern {
    raw: String,
    matcher: Option<regex::Regex>,
    anchored: Option<regex::Regex>,
}

impl PromptPattern {
    /// Compile a pattern string
    pub fn new(raw: &str) -> Self {
        if raw.is_empty() {
            return Self {
                raw: String::new(),
                matcher: None,
                anchored: None,
            };
        }

        // The trailing `.?` consumes one extra rendered character that
        // commonly follows a prompt, e.g. a separator space.
        let matcher = regex::Regex::new(raw);
        let anchored = regex::Regex::new(&format!("^(?:{}).?", raw));
        if matcher.is_err() || anchored.is_err() {
            warn!(pattern = raw, "prompt pattern does not compile; prompt features disabled");
        }

        Self {
            raw: raw.to_string(),
            matcher: matcher.ok(),
            anchored: anchored.ok(),
        }
    }

    /// Whether prompt-aware behavior is active
    pub fn is_enabled(&self) -> bool {
        self.matcher.is_some()
    }

    /// The pattern string this was compiled from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Remove the first match of the pattern from a line.
    ///
    /// Returns the line unchanged when the pattern misses or is disabled.
    pub fn strip(&self, line: &str) -> String {
        match &self.matcher {
            Some(re) => re.replace(line, "").into_owned(),
            None => line.to_string(),
        }
    }

    fn anchored(&self) -> Option<&regex::Regex> {
        self.anchored.as_ref()
    }
}

/// Truncate an extracted command line to the part the user has typed.
///
/// The rendered line keeps a prompt-redraw artifact after the cursor; the
/// typed portion is the first `col - 2` characters in normal mode and
/// `col - 3` in any other mode. Normal mode leaves the cursor one column
/// short of where insert mode puts it, hence the one-character difference.
/// These offsets are empirical and must not be adjusted.
pub fn typed_input(command_line: &str, cursor_col: u32, mode: Mode) -> String {
    let offset: i64 = if mode == Mode::Normal { 2 } else { 3 };
    let keep = i64::from(cursor_col) - offset;
    if keep <= 0 {
        return String::new();
    }
    command_line.chars().take(keep as usize).collect()
}

/// Search for a line matching the prompt pattern and move the cursor onto
/// the end of the matched span.
///
/// The pattern is anchored to line start. The search runs line-by-line from
/// the cursor in `direction`, wrapping around the buffer; the cursor's own
/// line is considered last. The cursor is only moved once a match is
/// confirmed; on a miss it stays where it was and `None` is returned.
pub fn locate_prompt(
    editor: &mut dyn Editor,
    pattern: &PromptPattern,
    direction: Direction,
) -> Option<CursorPos> {
    let anchored = pattern.anchored()?;
    let buffer = editor.current_buffer();
    let total = editor.line_count(buffer);
    if total == 0 {
        return None;
    }

    let current = editor.cursor().line.clamp(1, total);
    let candidates: Vec<u32> = match direction {
        Direction::Forward => (current + 1..=total).chain(1..=current).collect(),
        Direction::Backward => (1..current)
            .rev()
            .chain((current..=total).rev())
            .collect(),
    };

    for nr in candidates {
        let text = editor.line(buffer, nr);
        if let Some(found) = anchored.find(&text) {
            // Land on the last matched character, just past the prompt
            let col = (found.as_str().chars().count() as u32).max(1);
            editor.set_cursor(nr, col);
            return Some(CursorPos { line: nr, col });
        }
    }

    None
}
