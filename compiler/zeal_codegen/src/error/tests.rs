use pretty_assertions::assert_eq;

use super::*;

fn loc() -> SourceLocation {
    SourceLocation::new("test/flow.zep", 12, 5)
}

// -- Character literals --

#[test]
fn short_invalid_char_literal_shows_full_value() {
    let err = CodegenError::invalid_char_literal("'abcde'", Some(&loc()));
    assert_eq!(err.to_string(), "Invalid char literal: ''abcde''");
}

#[test]
fn long_invalid_char_literal_is_truncated() {
    let err = CodegenError::invalid_char_literal("abcdefghijklmnop", None);
    assert_eq!(err.to_string(), "Invalid char literal: 'abcdefghij...'");
}

#[test]
fn truncation_keeps_whole_characters() {
    // Byte ten falls inside the third euro sign.
    let err = CodegenError::invalid_char_literal("'a€€€€'", None);
    assert_eq!(err.to_string(), "Invalid char literal: ''a€€...'");
}

#[test]
fn ten_character_literal_is_not_truncated() {
    let err = CodegenError::invalid_char_literal("abcdefghij", None);
    assert_eq!(err.to_string(), "Invalid char literal: 'abcdefghij'");
}

// -- Messages --

#[test]
fn unknown_constant_names_identifier() {
    let err = CodegenError::UnknownConstant {
        family: "ZendEngine3",
        name: "ZEPHIR_GLOBAL(global_maybe)".to_owned(),
        location: None,
    };
    assert_eq!(
        err.to_string(),
        "ZendEngine3: unknown constant ZEPHIR_GLOBAL(global_maybe)"
    );
}

#[test]
fn unknown_mapping_message() {
    let err = CodegenError::unknown_mapping("resource", None);
    assert_eq!(err.to_string(), "Unknown type mapping: resource");
}

// -- Diagnostics --

#[test]
fn diagnostic_carries_code_and_location() {
    let err = CodegenError::invalid_char_literal("'abcde'", Some(&loc()));
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code, ErrorCode::E5003);
    assert_eq!(diagnostic.primary_location(), Some(&loc()));
    assert!(diagnostic.is_error());
}

#[test]
fn diagnostic_without_location_gets_note() {
    let err = CodegenError::invalid_statement("break outside of a loop", None);
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code, ErrorCode::E5005);
    assert_eq!(diagnostic.primary_location(), None);
    assert_eq!(diagnostic.notes.len(), 1);
}

#[test]
fn every_kind_maps_to_a_codegen_code() {
    let errors = [
        CodegenError::unknown_mapping("x", None),
        CodegenError::UnknownConstant {
            family: "ZendEngine2",
            name: "X".to_owned(),
            location: None,
        },
        CodegenError::invalid_char_literal("'abcde'", None),
        CodegenError::UnknownVariable {
            name: "x".to_owned(),
            location: None,
        },
        CodegenError::invalid_statement("x", None),
    ];
    for err in &errors {
        assert!(err.code().is_codegen_error(), "{err}");
    }
}
