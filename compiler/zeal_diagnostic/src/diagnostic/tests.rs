use pretty_assertions::assert_eq;

use super::*;

#[test]
fn renders_code_message_and_labels() {
    let loc = SourceLocation::new("test/flow.zep", 7, 3);
    let diag = Diagnostic::error(ErrorCode::E5003)
        .with_message("Invalid char literal: 'abcde'")
        .with_label(loc, "declared here")
        .with_note("while initialising `c`");

    assert_eq!(
        diag.to_string(),
        "error [E5003]: Invalid char literal: 'abcde'\n  \
         --> test/flow.zep:7:3: declared here\n  \
         = note: while initialising `c`"
    );
}

#[test]
fn primary_location_skips_secondary_labels() {
    let first = SourceLocation::new("a.zep", 1, 1);
    let second = SourceLocation::new("b.zep", 2, 1);
    let diag = Diagnostic::error(ErrorCode::E5001)
        .with_secondary_label(first, "context")
        .with_label(second.clone(), "here");

    assert_eq!(diag.primary_location(), Some(&second));
    assert!(diag.is_error());
}

#[test]
fn warnings_are_not_errors() {
    let diag = Diagnostic::warning(ErrorCode::E5005).with_message("unreachable");
    assert!(!diag.is_error());
    assert_eq!(diag.primary_location(), None);
}
