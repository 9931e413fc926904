//! Common types shared between the error and output modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Location Type
// ============================================================================

/// Location of a rendered event in a source buffer.
///
/// - `file`: Buffer name as recorded in the tree
/// - `line`: 1-indexed line number
/// - `col`: 1-indexed column, counted in chars
/// - `byte_start` / `byte_end`: Buffer-relative byte offsets, end exclusive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// Buffer name.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
    /// Byte offset from buffer start (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<u64>,
    /// Byte offset end, exclusive (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<u64>,
}

impl Location {
    /// Create a new location without byte offsets.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// Create a location with a full byte span.
    pub fn with_span(
        file: impl Into<String>,
        line: u32,
        col: u32,
        byte_start: u64,
        byte_end: u64,
    ) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: Some(byte_start),
            byte_end: Some(byte_end),
        }
    }

    /// Comparison key for deterministic sorting: (file, line, col).
    fn sort_key(&self) -> (&str, u32, u32) {
        (&self.file, self.line, self.col)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_new_serializes_without_byte_offsets() {
        let loc = Location::new("main.swift", 42, 8);
        let json = serde_json::to_string(&loc).unwrap();
        assert!(!json.contains("byte_start"));
        assert!(!json.contains("byte_end"));
    }

    #[test]
    fn location_with_span_serializes_offsets() {
        let loc = Location::with_span("main.swift", 1, 5, 4, 7);
        let json = serde_json::to_string(&loc).unwrap();
        assert!(json.contains("\"byte_start\":4"));
        assert!(json.contains("\"byte_end\":7"));
    }

    #[test]
    fn location_display_is_file_line_col() {
        assert_eq!(Location::new("a.swift", 3, 9).to_string(), "a.swift:3:9");
    }

    #[test]
    fn locations_sort_by_file_then_position() {
        let mut locs = vec![
            Location::new("b.swift", 1, 1),
            Location::new("a.swift", 2, 1),
            Location::new("a.swift", 1, 7),
        ];
        locs.sort();
        assert_eq!(locs[0], Location::new("a.swift", 1, 7));
        assert_eq!(locs[2], Location::new("b.swift", 1, 1));
    }
}
