#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
//! Whole-routine tests.
//!
//! Each test compiles a small routine through [`compile_routine`] for one or
//! both runtime families and checks the C that comes out, including the
//! declarations and memory frame the driver wraps around the body.

use pretty_assertions::assert_eq;
use zeal_codegen::{compile_routine, CodegenOptions, CompiledUnit, RuntimeFamily};
use zeal_ir::{
    BinaryOp, ClassDefinition, ClassMethod, Expr, ForEachStmt, ForRangeStmt, FunctionDefinition,
    LetTarget, Literal, RoutineRef, SemanticType, SourceLocation, Stmt, StmtKind, Variable,
};

fn options(family: RuntimeFamily) -> CodegenOptions {
    CodegenOptions::default()
        .with_family(family)
        .with_project_root("/ext")
}

fn at(line: u32) -> SourceLocation {
    SourceLocation::new("/ext/test/flow.zep", line, 2)
}

fn assign(name: &str, value: Expr, line: u32) -> Stmt {
    Stmt::new(
        StmtKind::Let {
            target: LetTarget::Variable(name.to_owned()),
            value,
        },
        at(line),
    )
}

fn ret(value: Expr, line: u32) -> Stmt {
    Stmt::new(StmtKind::Return(Some(value)), at(line))
}

fn method(
    family: RuntimeFamily,
    name: &str,
    locals: &[Variable],
    body: &[Stmt],
) -> CompiledUnit {
    let class = ClassDefinition::new("Test", "Flow");
    let method = ClassMethod::new(&class, name);
    compile_routine(
        &options(family),
        Some(&class),
        RoutineRef::Method(&method),
        locals,
        body,
    )
    .expect("routine compiles")
}

fn function(family: RuntimeFamily, name: &str, locals: &[Variable], body: &[Stmt]) -> CompiledUnit {
    let function = FunctionDefinition::new("Test", name);
    compile_routine(
        &options(family),
        None,
        RoutineRef::Function(&function),
        locals,
        body,
    )
    .expect("routine compiles")
}

fn lines(unit: &CompiledUnit) -> Vec<&str> {
    unit.code.lines().collect()
}

// === Conditionals ===

#[test]
fn if_on_a_dynamic_value() {
    let locals = [Variable::new("a", SemanticType::Variable)];
    let body = [
        assign("a", Expr::int(1), 3),
        Stmt::new(
            StmtKind::If {
                condition: Expr::var("a"),
                then_branch: vec![ret(Expr::Literal(Literal::Bool(true)), 5)],
                else_branch: None,
            },
            at(4),
        ),
        ret(Expr::Literal(Literal::Bool(false)), 7),
    ];

    let ze3 = method(RuntimeFamily::ZendEngine3, "testIf2", &locals, &body);
    assert_eq!(
        lines(&ze3),
        [
            "PHP_METHOD(Test_Flow, testIf2)",
            "{",
            "\tzval *this_ptr = getThis();",
            "\tzval a;",
            "",
            "\tZVAL_UNDEF(&a);",
            "\tZEPHIR_MM_GROW();",
            "\tZEPHIR_INIT_VAR(&a);",
            "\tZVAL_LONG(&a, 1);",
            "\tif (zephir_is_true(&a)) {",
            "\t\tRETURN_MM_BOOL(1);",
            "\t}",
            "\tRETURN_MM_BOOL(0);",
            "}",
        ]
    );
    assert_eq!(ze3.headers, ["kernel/memory", "kernel/operators"]);

    let ze2 = method(RuntimeFamily::ZendEngine2, "testIf2", &locals, &body);
    assert_eq!(
        lines(&ze2),
        [
            "PHP_METHOD(Test_Flow, testIf2)",
            "{",
            "\tzval *a = NULL;",
            "",
            "\tZEPHIR_MM_GROW();",
            "\tZEPHIR_INIT_VAR(a);",
            "\tZVAL_LONG(a, 1);",
            "\tif (zephir_is_true(a)) {",
            "\t\tRETURN_MM_BOOL(1);",
            "\t}",
            "\tRETURN_MM_BOOL(0);",
            "}",
        ]
    );
}

#[test]
fn routine_without_return_restores_the_frame() {
    let locals = [Variable::new("a", SemanticType::Variable)];
    let body = [assign("a", Expr::string("x"), 3)];

    let unit = function(RuntimeFamily::ZendEngine3, "touch", &locals, &body);
    let lines = lines(&unit);
    assert_eq!(lines[lines.len() - 2], "\tZEPHIR_MM_RESTORE();");
    assert!(lines.contains(&"\tZVAL_STRING(&a, \"x\");"));
}

// === Loops ===

#[test]
fn while_and_do_while_place_the_test_differently() {
    let locals = [Variable::new("n", SemanticType::Int)];
    let condition = Expr::binary(BinaryOp::Lt, Expr::var("n"), Expr::int(3));
    let step = assign(
        "n",
        Expr::binary(BinaryOp::Add, Expr::var("n"), Expr::int(1)),
        5,
    );

    let pre = function(
        RuntimeFamily::ZendEngine3,
        "pre",
        &locals,
        &[Stmt::new(
            StmtKind::While {
                condition: condition.clone(),
                body: vec![step.clone()],
            },
            at(4),
        )],
    );
    assert_eq!(
        lines(&pre),
        [
            "PHP_FUNCTION(zephir_test_pre)",
            "{",
            "\tzend_long n;",
            "",
            "\twhile (1) {",
            "\t\tif (!((n < 3))) {",
            "\t\t\tbreak;",
            "\t\t}",
            "\t\tn = (n + 1);",
            "\t}",
            "}",
        ]
    );

    let post = function(
        RuntimeFamily::ZendEngine3,
        "post",
        &locals,
        &[Stmt::new(
            StmtKind::DoWhile {
                body: vec![step],
                condition,
            },
            at(4),
        )],
    );
    assert_eq!(
        lines(&post)[4..],
        ["\tdo {", "\t\tn = (n + 1);", "\t} while ((n < 3));", "}"]
    );
}

#[test]
fn range_sum() {
    let locals = [
        Variable::new("n", SemanticType::Int),
        Variable::new("i", SemanticType::Int),
    ];
    let body = [
        assign("n", Expr::int(0), 3),
        Stmt::new(
            StmtKind::ForRange(ForRangeStmt {
                key: None,
                value: "i".to_owned(),
                start: Expr::int(1),
                end: Expr::int(10),
                reverse: false,
                body: vec![assign(
                    "n",
                    Expr::binary(BinaryOp::Add, Expr::var("n"), Expr::var("i")),
                    5,
                )],
            }),
            at(4),
        ),
        ret(Expr::var("n"), 7),
    ];

    let unit = function(RuntimeFamily::ZendEngine3, "sum", &locals, &body);
    assert_eq!(
        lines(&unit),
        [
            "PHP_FUNCTION(zephir_test_sum)",
            "{",
            "\tzend_long n, i, _0, _1;",
            "\tzend_bool _2;",
            "",
            "\tZEPHIR_MM_GROW();",
            "\tn = 0;",
            "\t_0 = 10;",
            "\t_1 = 1;",
            "\t_2 = 0;",
            "\tif (_1 <= _0) {",
            "\t\twhile (1) {",
            "\t\t\tif (_2) {",
            "\t\t\t\t_1++;",
            "\t\t\t\tif (!(_1 <= _0)) {",
            "\t\t\t\t\tbreak;",
            "\t\t\t\t}",
            "\t\t\t} else {",
            "\t\t\t\t_2 = 1;",
            "\t\t\t}",
            "\t\t\ti = _1;",
            "\t\t\tn = (n + i);",
            "\t\t}",
            "\t}",
            "\tRETURN_MM_LONG(n);",
            "}",
        ]
    );
}

// === Iteration ===

fn each_value(reverse: bool) -> [Stmt; 1] {
    [Stmt::new(
        StmtKind::ForEach(ForEachStmt {
            key: None,
            value: Some("v".to_owned()),
            collection: "arr".to_owned(),
            reverse,
            duplicate_key: false,
            duplicate_collection: false,
            body: Vec::new(),
        }),
        at(6),
    )]
}

fn iteration_locals() -> [Variable; 2] {
    [
        Variable::new("arr", SemanticType::Array),
        Variable::new("v", SemanticType::Variable),
    ]
}

#[test]
fn foreach_uses_a_hash_cursor_on_the_older_runtime() {
    let unit = function(
        RuntimeFamily::ZendEngine2,
        "walk",
        &iteration_locals(),
        &each_value(false),
    );
    let lines = lines(&unit);
    assert!(lines.contains(&"\tzephir_is_iterable(arr, &_0, &_1, 0, 0, \"test/flow.zep\", 6);"));
    assert!(lines.contains(&"\t\tZEPHIR_GET_HVALUE(v, _2);"));
    assert!(lines.contains(&"\tZEPHIR_MM_GROW();"));
    assert!(unit.headers.iter().any(|header| header == "kernel/hash"));

    let reverse = function(
        RuntimeFamily::ZendEngine2,
        "walk",
        &iteration_locals(),
        &each_value(true),
    );
    assert!(reverse
        .code
        .contains("zephir_is_iterable(arr, &_0, &_1, 0, 1, \"test/flow.zep\", 6);"));
    assert!(reverse.code.contains("zend_hash_move_backwards_ex(_0, &_1)"));
}

#[test]
fn foreach_uses_iteration_macros_on_the_newer_runtime() {
    let unit = function(
        RuntimeFamily::ZendEngine3,
        "walk",
        &iteration_locals(),
        &each_value(false),
    );
    let lines = lines(&unit);
    assert!(lines.contains(&"\tzephir_is_iterable(&arr, 0, \"test/flow.zep\", 6);"));
    assert!(lines.contains(&"\tZEND_HASH_FOREACH_VAL(Z_ARRVAL_P(&arr), _0)"));
    assert!(lines.contains(&"\t\tZVAL_COPY(&v, _0);"));
    assert!(lines.contains(&"\t} ZEND_HASH_FOREACH_END();"));

    let reverse = function(
        RuntimeFamily::ZendEngine3,
        "walk",
        &iteration_locals(),
        &each_value(true),
    );
    assert!(reverse
        .code
        .contains("ZEND_HASH_REVERSE_FOREACH_VAL(Z_ARRVAL_P(&arr), _0)"));
}

#[test]
fn units_are_independent() {
    let locals = iteration_locals();
    let body = each_value(false);
    let first = function(RuntimeFamily::ZendEngine3, "walk", &locals, &body);
    let second = function(RuntimeFamily::ZendEngine3, "walk", &locals, &body);
    assert_eq!(first, second);
}
