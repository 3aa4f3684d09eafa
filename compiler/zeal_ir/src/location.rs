//! Source locations.
//!
//! Every runtime call that can fail at runtime carries the file and the
//! 1-based line it was generated from.

use std::fmt;
use std::sync::Arc;

/// Position of an IR node in the user's source.
///
/// The file path is shared between all nodes of a unit, so cloning a
/// location never copies the path.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SourceLocation {
    pub file: Arc<str>,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub char: u32,
}

impl SourceLocation {
    /// Create a new location.
    pub fn new(file: impl Into<Arc<str>>, line: u32, char: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
            char,
        }
    }

    /// Location for nodes synthesised by the compiler itself.
    pub fn internal() -> Self {
        SourceLocation::new("<internal>", 1, 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.char)
    }
}

#[cfg(test)]
mod tests;
