//! Diagnostic system for code generation errors.
//!
//! Every failure the backend raises is fatal to its compilation unit. The
//! driver catches it, converts it into a [`Diagnostic`] and renders it:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary location (where it went wrong)
//! - Notes (what the backend was doing)

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
