//! Code generation errors.
//!
//! Every error is fatal to the compilation unit that raised it. The driver
//! turns it into a [`Diagnostic`] with [`CodegenError::to_diagnostic`].

use thiserror::Error;
use zeal_diagnostic::{Diagnostic, ErrorCode};
use zeal_ir::SourceLocation;

/// Result type for fallible code generation.
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Longest character literal shown in full in an error message.
const MAX_SHOWN_LITERAL: usize = 10;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum CodegenError {
    /// A type or operand combination the backend has no C rendering for.
    #[error("Unknown type mapping: {what}")]
    UnknownMapping {
        what: String,
        location: Option<SourceLocation>,
    },

    /// A global constant other than the three canonical value cells.
    #[error("{family}: unknown constant {name}")]
    UnknownConstant {
        family: &'static str,
        name: String,
        location: Option<SourceLocation>,
    },

    #[error("Invalid {kind} literal: '{shown}'")]
    InvalidLiteral {
        kind: &'static str,
        shown: String,
        location: Option<SourceLocation>,
    },

    #[error("Cannot use variable '{name}' because it wasn't defined")]
    UnknownVariable {
        name: String,
        location: Option<SourceLocation>,
    },

    #[error("{message}")]
    InvalidStatement {
        message: String,
        location: Option<SourceLocation>,
    },
}

impl CodegenError {
    pub fn unknown_mapping(what: impl Into<String>, location: Option<&SourceLocation>) -> Self {
        CodegenError::UnknownMapping {
            what: what.into(),
            location: location.cloned(),
        }
    }

    pub fn invalid_statement(message: impl Into<String>, location: Option<&SourceLocation>) -> Self {
        CodegenError::InvalidStatement {
            message: message.into(),
            location: location.cloned(),
        }
    }

    /// Oversized character literal. Values longer than ten bytes are cut at
    /// the last character boundary within them and followed by `...`.
    pub fn invalid_char_literal(value: &str, location: Option<&SourceLocation>) -> Self {
        let shown = if value.len() > MAX_SHOWN_LITERAL {
            let mut end = MAX_SHOWN_LITERAL;
            while !value.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &value[..end])
        } else {
            value.to_owned()
        };
        CodegenError::InvalidLiteral {
            kind: "char",
            shown,
            location: location.cloned(),
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CodegenError::UnknownMapping { location, .. }
            | CodegenError::UnknownConstant { location, .. }
            | CodegenError::InvalidLiteral { location, .. }
            | CodegenError::UnknownVariable { location, .. }
            | CodegenError::InvalidStatement { location, .. } => location.as_ref(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CodegenError::UnknownMapping { .. } => ErrorCode::E5001,
            CodegenError::UnknownConstant { .. } => ErrorCode::E5002,
            CodegenError::InvalidLiteral { .. } => ErrorCode::E5003,
            CodegenError::UnknownVariable { .. } => ErrorCode::E5004,
            CodegenError::InvalidStatement { .. } => ErrorCode::E5005,
        }
    }

    /// Render as a diagnostic, labelled at the failing location when known.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code()).with_message(self.to_string());
        match self.location() {
            Some(location) => diagnostic.with_label(location.clone(), self.code().description()),
            None => diagnostic.with_note("no source location available"),
        }
    }
}

#[cfg(test)]
mod tests;
