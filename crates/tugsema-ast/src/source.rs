//! Source locations, ranges, and the buffer manager that answers text queries.
//!
//! A [`SourceLoc`] is a global byte offset: every buffer registered with the
//! [`SourceManager`] owns a disjoint slice of the offset space, so a location
//! alone identifies both the buffer and the position inside it.
//!
//! Two range flavors exist:
//!
//! - [`SourceRange`] follows the token-range convention: `end` is the start of
//!   the last token, not the byte after it.
//! - [`CharSourceRange`] is an exact byte range (`start` plus `byte_length`).
//!   [`SourceManager::char_range`] converts between them by lexing the last
//!   token.

use serde::{Deserialize, Serialize};

/// A byte position in some registered source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLoc(pub u32);

impl SourceLoc {
    /// Global byte offset.
    pub fn offset(self) -> u32 {
        self.0
    }

    /// The location `bytes` further into the buffer.
    pub fn advanced(self, bytes: u32) -> SourceLoc {
        SourceLoc(self.0 + bytes)
    }
}

/// Token range: `start` of the first token to `start` of the last token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: SourceLoc,
    pub end: SourceLoc,
}

impl SourceRange {
    pub fn new(start: SourceLoc, end: SourceLoc) -> Self {
        SourceRange { start, end }
    }

    /// A range covering the single token at `loc`.
    pub fn point(loc: SourceLoc) -> Self {
        SourceRange {
            start: loc,
            end: loc,
        }
    }
}

/// Exact byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharSourceRange {
    pub start: SourceLoc,
    pub byte_length: u32,
}

impl CharSourceRange {
    pub fn new(start: SourceLoc, byte_length: u32) -> Self {
        CharSourceRange { start, byte_length }
    }

    /// Location one past the last byte.
    pub fn end(&self) -> SourceLoc {
        self.start.advanced(self.byte_length)
    }

    pub fn is_empty(&self) -> bool {
        self.byte_length == 0
    }
}

/// A named source text occupying `[base, base + text.len()]` of the offset space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBuffer {
    pub name: String,
    pub text: String,
    pub base: u32,
}

impl SourceBuffer {
    fn contains(&self, loc: SourceLoc) -> bool {
        let offset = loc.offset();
        offset >= self.base && offset - self.base <= self.text.len() as u32
    }
}

/// Owns every source buffer of a tree and answers text-extraction queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceManager {
    buffers: Vec<SourceBuffer>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer and return the location of its first byte.
    ///
    /// Buffers are separated by a one-byte gap so that the end-of-buffer
    /// location of one buffer never coincides with the start of the next.
    pub fn add_buffer(&mut self, name: impl Into<String>, text: impl Into<String>) -> SourceLoc {
        let base = self
            .buffers
            .last()
            .map(|b| b.base + b.text.len() as u32 + 1)
            .unwrap_or(0);
        self.buffers.push(SourceBuffer {
            name: name.into(),
            text: text.into(),
            base,
        });
        SourceLoc(base)
    }

    pub fn buffers(&self) -> &[SourceBuffer] {
        &self.buffers
    }

    /// Split a global location into its buffer and the buffer-relative offset.
    pub fn decompose(&self, loc: SourceLoc) -> Option<(&SourceBuffer, usize)> {
        self.buffers
            .iter()
            .find(|b| b.contains(loc))
            .map(|b| (b, (loc.offset() - b.base) as usize))
    }

    /// Text of `len` bytes starting at `loc`, if it lies inside one buffer and
    /// on char boundaries.
    pub fn extract_text(&self, loc: SourceLoc, len: u32) -> Option<&str> {
        let (buffer, offset) = self.decompose(loc)?;
        buffer.text.get(offset..offset + len as usize)
    }

    /// Text covered by an exact range.
    pub fn extract_range(&self, range: CharSourceRange) -> Option<&str> {
        self.extract_text(range.start, range.byte_length)
    }

    /// Number of bytes from `start` to `end`; zero if `end` precedes `start`.
    pub fn byte_distance(&self, start: SourceLoc, end: SourceLoc) -> u32 {
        end.offset().saturating_sub(start.offset())
    }

    /// Location just past the token that starts at `loc`.
    pub fn token_end(&self, loc: SourceLoc) -> SourceLoc {
        match self.decompose(loc) {
            Some((buffer, offset)) => {
                let len = lex_token_len(&buffer.text.as_bytes()[offset..]);
                loc.advanced(len as u32)
            }
            None => loc,
        }
    }

    /// Exact byte range of a token range: from its start through the end of
    /// its last token.
    pub fn char_range(&self, range: SourceRange) -> CharSourceRange {
        let end = self.token_end(range.end);
        CharSourceRange::new(range.start, self.byte_distance(range.start, end))
    }
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn is_ident_continue(byte: u8) -> bool {
    is_ident_start(byte) || byte.is_ascii_digit()
}

fn is_operator_char(byte: u8) -> bool {
    matches!(
        byte,
        b'/' | b'=' | b'-' | b'+' | b'!' | b'*' | b'%' | b'<' | b'>' | b'&' | b'|' | b'^' | b'~'
            | b'?' | b'.'
    )
}

/// Length in bytes of the token at the front of `rest`.
fn lex_token_len(rest: &[u8]) -> usize {
    let Some(&first) = rest.first() else {
        return 0;
    };
    match first {
        b'`' => {
            // An escaped identifier spans both back-ticks; a lone back-tick is
            // its own one-byte token.
            let ident = rest[1..]
                .iter()
                .take_while(|b| is_ident_continue(**b))
                .count();
            if ident > 0 && rest.get(ident + 1) == Some(&b'`') {
                ident + 2
            } else {
                1
            }
        }
        b'"' => {
            let mut i = 1;
            while i < rest.len() {
                match rest[i] {
                    b'\\' => i += 2,
                    b'"' => return i + 1,
                    b'\n' => return i,
                    _ => i += 1,
                }
            }
            rest.len()
        }
        b'0'..=b'9' => {
            let mut i = 1;
            while i < rest.len() {
                let b = rest[i];
                let fraction = b == b'.' && rest.get(i + 1).is_some_and(u8::is_ascii_digit);
                if b.is_ascii_alphanumeric() || b == b'_' || fraction {
                    i += 1;
                } else {
                    break;
                }
            }
            i
        }
        b if is_ident_start(b) => rest.iter().take_while(|b| is_ident_continue(**b)).count(),
        b if is_operator_char(b) => rest.iter().take_while(|b| is_operator_char(**b)).count(),
        _ => 1,
    }
}
