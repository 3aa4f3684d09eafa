//! Error codes for code generation diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E5001`) with the first
//! digit indicating the compiler phase. Only the phases this workspace
//! implements are listed.

use std::fmt;

/// Error codes for all diagnostics this workspace reports.
///
/// Format: E#### where first digit indicates phase:
/// - E5xxx: Codegen errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Codegen Errors (E5xxx)
    /// Expression or value type with no target mapping
    E5001,
    /// Unknown global constant
    E5002,
    /// Literal violates a representation constraint
    E5003,
    /// Variable not declared in the active scope
    E5004,
    /// Statement not valid in its position
    E5005,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// All error codes, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E5003,
        ErrorCode::E5004,
        ErrorCode::E5005,
        ErrorCode::E9001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::E5004 => "E5004",
            ErrorCode::E5005 => "E5005",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Short description shown by `--explain` listings.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E5001 => "unknown type mapping",
            ErrorCode::E5002 => "unknown constant",
            ErrorCode::E5003 => "invalid literal",
            ErrorCode::E5004 => "unknown variable",
            ErrorCode::E5005 => "misplaced statement",
            ErrorCode::E9001 => "internal compiler error",
        }
    }

    /// Check if this is a codegen error (E5xxx range).
    pub fn is_codegen_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E5001
                | ErrorCode::E5002
                | ErrorCode::E5003
                | ErrorCode::E5004
                | ErrorCode::E5005
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
