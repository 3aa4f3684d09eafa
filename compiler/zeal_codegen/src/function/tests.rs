#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use zeal_ir::{
    ClassMethod, Expr, FunctionDefinition, LetTarget, Parameter, PropertyKey, SemanticType,
    SourceLocation,
};

use super::*;
use crate::RuntimeFamily;

fn options(family: RuntimeFamily) -> CodegenOptions {
    CodegenOptions::default()
        .with_family(family)
        .with_project_root("/ext")
}

fn stmt(kind: StmtKind, line: u32) -> Stmt {
    Stmt::new(kind, SourceLocation::new("/ext/test/flow.zep", line, 2))
}

fn flow() -> ClassDefinition {
    ClassDefinition::new("Test", "Flow")
}

#[test]
fn method_with_early_return() {
    let class = flow();
    let method = ClassMethod::new(&class, "testIf1");
    let locals = [Variable::new("a", SemanticType::Int)];
    let body = [
        stmt(
            StmtKind::Let {
                target: LetTarget::Variable("a".to_owned()),
                value: Expr::int(0),
            },
            3,
        ),
        stmt(
            StmtKind::If {
                condition: Expr::var("a"),
                then_branch: vec![stmt(StmtKind::Return(Some(Expr::int(1))), 5)],
                else_branch: None,
            },
            4,
        ),
        stmt(StmtKind::Return(Some(Expr::int(0))), 7),
    ];

    let unit = compile_routine(
        &options(RuntimeFamily::ZendEngine3),
        Some(&class),
        RoutineRef::Method(&method),
        &locals,
        &body,
    )
    .unwrap();

    assert_eq!(
        unit.code,
        "PHP_METHOD(Test_Flow, testIf1)\n\
         {\n\
         \tzval *this_ptr = getThis();\n\
         \tzend_long a;\n\
         \n\
         \tZEPHIR_MM_GROW();\n\
         \ta = 0;\n\
         \tif (a) {\n\
         \t\tRETURN_MM_LONG(1);\n\
         \t}\n\
         \tRETURN_MM_LONG(0);\n\
         }\n"
    );
    assert!(unit.headers.is_empty());
}

#[test]
fn function_fetches_and_coerces_parameters() {
    let function = FunctionDefinition::new("Test", "greet")
        .with_parameter(Parameter::new("count", SemanticType::Int))
        .with_parameter(Parameter::new("name", SemanticType::Variable));
    let locals = [Variable::new("x", SemanticType::Variable)];
    let body = [stmt(
        StmtKind::Let {
            target: LetTarget::Variable("x".to_owned()),
            value: Expr::var("name"),
        },
        2,
    )];

    let unit = compile_routine(
        &options(RuntimeFamily::ZendEngine2),
        None,
        RoutineRef::Function(&function),
        &locals,
        &body,
    )
    .unwrap();

    let lines: Vec<&str> = unit.code.lines().collect();
    assert_eq!(
        lines,
        [
            "PHP_FUNCTION(zephir_test_greet)",
            "{",
            "\tzval *x = NULL, *count_param = NULL, *name = NULL;",
            "\tzend_long count;",
            "",
            "\tzephir_fetch_params(0, 2, 0, &count_param, &name);",
            "\tcount = zephir_get_intval(count_param);",
            "\tZEPHIR_CPY_WRT(x, name);",
            "}",
        ]
    );
    assert_eq!(unit.headers, ["kernel/operators"]);
}

#[test]
fn property_initializer_builds_its_object() {
    let class = flow();
    let method =
        ClassMethod::new(&class, "zephir_init_properties_Test_Flow").with_initializer(true);
    let body = [stmt(
        StmtKind::Let {
            target: LetTarget::Property {
                object: "this".to_owned(),
                property: PropertyKey::Name("items".to_owned()),
            },
            value: Expr::Array(Vec::new()),
        },
        9,
    )];

    let unit = compile_routine(
        &options(RuntimeFamily::ZendEngine3),
        Some(&class),
        RoutineRef::Method(&method),
        &[],
        &body,
    )
    .unwrap();

    let lines: Vec<&str> = unit.code.lines().collect();
    assert_eq!(
        lines,
        [
            "static zend_object *zephir_init_properties_Test_Flow(zend_class_entry *class_type TSRMLS_DC)",
            "{",
            "\tzval _0;",
            "",
            "\tZVAL_UNDEF(&_0);",
            "\tZEPHIR_MM_GROW();",
            "\t{",
            "\t\tzval local_this_ptr, *this_ptr = &local_this_ptr;",
            "\t\tZEPHIR_CREATE_OBJECT(this_ptr, class_type);",
            "\t\tZEPHIR_INIT_VAR(&_0);",
            "\t\tzephir_create_array(&_0, 0, 0);",
            "\t\tzephir_update_property_zval(this_ptr, SL(\"items\"), &_0);",
            "\t\tZEPHIR_MM_RESTORE();",
            "\t\treturn Z_OBJ_P(this_ptr);",
            "\t}",
            "}",
        ]
    );
    assert_eq!(
        unit.headers,
        ["kernel/array", "kernel/memory", "kernel/object"]
    );
}

#[test]
fn empty_routine_has_no_declarations() {
    let function = FunctionDefinition::new("", "noop");
    let unit = compile_routine(
        &options(RuntimeFamily::ZendEngine3),
        None,
        RoutineRef::Function(&function),
        &[],
        &[],
    )
    .unwrap();
    assert_eq!(unit.code, "PHP_FUNCTION(zephir_noop)\n{\n}\n");
    assert!(unit.headers.is_empty());
}

#[test]
fn method_needs_its_class() {
    let class = flow();
    let method = ClassMethod::new(&class, "orphan");
    let err = compile_routine(
        &options(RuntimeFamily::ZendEngine3),
        None,
        RoutineRef::Method(&method),
        &[],
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, CodegenError::InvalidStatement { .. }), "{err:?}");
    assert_eq!(
        err.to_string(),
        "method 'orphan' compiled without its class"
    );
}

#[test]
fn body_errors_propagate() {
    let class = flow();
    let method = ClassMethod::new(&class, "stray");
    let body = [stmt(StmtKind::Break, 3)];
    let err = compile_routine(
        &options(RuntimeFamily::ZendEngine2),
        Some(&class),
        RoutineRef::Method(&method),
        &[],
        &body,
    )
    .unwrap_err();
    assert!(matches!(err, CodegenError::InvalidStatement { .. }), "{err:?}");
}

#[test]
fn undeclared_variables_fail_the_unit() {
    let function = FunctionDefinition::new("Test", "broken");
    let body = [stmt(
        StmtKind::Let {
            target: LetTarget::Variable("missing".to_owned()),
            value: Expr::int(1),
        },
        2,
    )];
    let err = compile_routine(
        &options(RuntimeFamily::ZendEngine3),
        None,
        RoutineRef::Function(&function),
        &[],
        &body,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot use variable 'missing' because it wasn't defined"
    );
}
