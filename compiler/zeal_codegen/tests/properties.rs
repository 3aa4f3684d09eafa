//! Property-based tests for the backend contract.
//!
//! These hold for every runtime family:
//! 1. Character defaults longer than four bytes are rejected
//! 2. Canonical values always resolve to a variable, never to a literal
//! 3. Global constants other than the three canonical cells are errors

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use zeal_codegen::{backend_for, CodegenError, CodegenOptions, CompilationContext, RuntimeFamily};
use zeal_ir::{GlobalConstant, SemanticType, Value, Variable};

fn any_family() -> impl Strategy<Value = RuntimeFamily> {
    proptest::sample::select(RuntimeFamily::ALL.to_vec())
}

fn canonical_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::True),
        Just(Value::False),
    ]
}

proptest! {
    #[test]
    fn char_defaults_are_bounded(family in any_family(), literal in "'[a-z\\\\é€]{0,6}'") {
        let backend = backend_for(family);
        let definition = backend.type_definition(SemanticType::Char);
        let variable = Variable::new("c", SemanticType::Char).with_default(literal.as_str());
        let result = backend.init_code(SemanticType::Char, definition.indirection, &variable);
        if literal.len() <= 4 {
            let init = result.unwrap();
            prop_assert_eq!(init.declarator, format!("c = {literal}"));
        } else {
            let is_invalid_literal = matches!(result, Err(CodegenError::InvalidLiteral { .. }));
            prop_assert!(is_invalid_literal);
        }
    }

    #[test]
    fn multibyte_char_defaults_are_rejected(family in any_family(), symbol in "[€→✓]") {
        let backend = backend_for(family);
        let definition = backend.type_definition(SemanticType::Char);
        let literal = format!("'{symbol}'");
        let variable = Variable::new("c", SemanticType::Char).with_default(literal.as_str());
        let result = backend.init_code(SemanticType::Char, definition.indirection, &variable);
        let is_invalid_literal = matches!(result, Err(CodegenError::InvalidLiteral { .. }));
        prop_assert!(is_invalid_literal);
    }

    #[test]
    fn canonical_values_resolve_to_variables(family in any_family(), value in canonical_value()) {
        let options = CodegenOptions::default().with_family(family);
        let mut ctx = CompilationContext::new(backend_for(family), &options);
        let resolved = ctx.backend().resolve_value(&value, &mut ctx).unwrap();
        let name = resolved.trim_start_matches('&');
        prop_assert!(ctx.symbol_table.get_variable(name).is_some(), "{resolved}");
        prop_assert!(!matches!(resolved.as_str(), "NULL" | "null" | "1" | "0" | "true" | "false"));
    }

    #[test]
    fn unknown_constants_are_rejected(family in any_family(), name in "[A-Za-z_][A-Za-z0-9_]{0,12}") {
        let options = CodegenOptions::default().with_family(family);
        let mut ctx = CompilationContext::new(backend_for(family), &options);
        let value = Value::Global(GlobalConstant::new(name.as_str()));
        let error = ctx.backend().resolve_value(&value, &mut ctx).unwrap_err();
        prop_assert_eq!(
            error.to_string(),
            format!("{}: unknown constant {name}", family.name())
        );
    }
}
