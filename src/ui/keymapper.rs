//! Key encoding for terminal input
//!
//! Converts symbolic keys to the byte sequences the shell expects on its
//! input stream. The provider only ever synthesizes a handful of keys
//! (submit, line clear, terminal escape) but encodes arbitrary characters
//! so `insert`/`send` payloads pass through unchanged.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyModifiers};

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Key encoder for terminal input bytes
pub struct KeyMapper;

impl KeyMapper {
    /// Encode a key with modifiers to input-stream bytes
    pub fn encode(code: KeyCode, mods: Modifiers) -> Vec<u8> {
        match code {
            KeyCode::Char(ch) => Self::encode_char(ch, mods),
            KeyCode::Enter => vec![0x0D],
            KeyCode::Backspace => {
                if mods.contains(Modifiers::ALT) {
                    vec![0x1B, 0x7F]
                } else {
                    vec![0x7F]
                }
            }
            KeyCode::Tab => {
                if mods.contains(Modifiers::SHIFT) {
                    b"\x1b[Z".to_vec()
                } else {
                    vec![0x09]
                }
            }
            KeyCode::Esc => vec![0x1B],
            _ => Vec::new(),
        }
    }

    /// Encode a character with modifiers
    fn encode_char(ch: char, mods: Modifiers) -> Vec<u8> {
        // Ctrl + letter = control character
        if mods.contains(Modifiers::CTRL) && !mods.contains(Modifiers::ALT) {
            if ch.is_ascii_lowercase() {
                return vec![(ch as u8) - b'a' + 1];
            } else if ch.is_ascii_uppercase() {
                return vec![(ch as u8) - b'A' + 1];
            } else {
                match ch {
                    '@' | '`' | ' ' => return vec![0x00],
                    '[' => return vec![0x1B],
                    '\\' => return vec![0x1C],
                    ']' => return vec![0x1D],
                    '^' | '~' => return vec![0x1E],
                    '_' | '?' => return vec![0x1F],
                    _ => {}
                }
            }
        }

        // Alt + key = ESC + key
        if mods.contains(Modifiers::ALT) && !mods.contains(Modifiers::CTRL) {
            let mut bytes = vec![0x1B];
            bytes.extend(ch.to_string().as_bytes());
            return bytes;
        }

        ch.to_string().into_bytes()
    }
}

/// Carriage return appended to submitted command text
pub fn submit() -> Vec<u8> {
    KeyMapper::encode(KeyCode::Enter, Modifiers::empty())
}

/// CTRL-U, erases any partially typed command on the shell's line
pub fn line_clear() -> Vec<u8> {
    KeyMapper::encode(KeyCode::Char('u'), Modifiers::CTRL)
}

/// CTRL-\ CTRL-N, drops a terminal widget back to normal mode
pub fn terminal_escape() -> Vec<u8> {
    let mut bytes = KeyMapper::encode(KeyCode::Char('\\'), Modifiers::CTRL);
    bytes.extend(KeyMapper::encode(KeyCode::Char('n'), Modifiers::CTRL));
    bytes
}
