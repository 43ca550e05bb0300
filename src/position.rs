//! Source coordinates shared by every phase of the pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A 1-based line/column span inside a single source file.
///
/// Lines and columns are both 1-based so they can be printed directly in
/// diagnostics without an off-by-one adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Position {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Position {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A zero-width position at a single line/column, used for tokens.
    pub fn at(line: u32, col: u32) -> Self {
        Self {
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
        }
    }

    /// `merge(p, q).start = p.start`, `merge(p, q).end = q.end` (§8 round-trip law).
    pub fn merge(self, other: Position) -> Position {
        Position {
            start_line: self.start_line,
            start_col: self.start_col,
            end_line: other.end_line,
            end_col: other.end_col,
        }
    }
}

/// A source file path plus a span within it, owned so it can outlive the
/// arena/string-table the span was produced from.
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: PathBuf,
    pub position: Position,
}

impl SourceSpan {
    pub fn new(file: impl Into<PathBuf>, position: Position) -> Self {
        Self {
            file: file.into(),
            position,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}
