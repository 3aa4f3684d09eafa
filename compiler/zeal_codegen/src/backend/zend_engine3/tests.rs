#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use zeal_ir::{ClassMethod, FunctionDefinition, GlobalConstant, Parameter};

use super::*;
use crate::{backend_for, CodegenError, CodegenOptions};

fn options() -> CodegenOptions {
    CodegenOptions::default()
        .with_family(RuntimeFamily::ZendEngine3)
        .with_project_root("/ext")
}

fn new_ctx(options: &CodegenOptions) -> CompilationContext<'_> {
    CompilationContext::new(backend_for(RuntimeFamily::ZendEngine3), options)
}

fn lines(ctx: &mut CompilationContext<'_>) -> Vec<String> {
    ctx.printer.take_output().lines().map(str::to_owned).collect()
}

fn location() -> SourceLocation {
    SourceLocation::new("/ext/test/flow.zep", 12, 5)
}

fn dynamic(name: &str) -> Variable {
    Variable::new(name, SemanticType::Variable)
}

fn array(name: &str) -> Variable {
    Variable::new(name, SemanticType::Array)
}

// === Representation ===

#[test]
fn dynamic_slots_start_undefined() {
    let backend = backend_for(RuntimeFamily::ZendEngine3);
    let init = backend
        .init_code(SemanticType::Variable, Indirection::Value, &dynamic("a"))
        .unwrap();
    assert_eq!(init.declarator, "a");
    assert_eq!(init.init.as_deref(), Some("ZVAL_UNDEF(&a);"));

    let text = backend
        .init_code(SemanticType::String, Indirection::Value, &Variable::new("s", SemanticType::String))
        .unwrap();
    assert_eq!(text.init.as_deref(), Some("ZVAL_UNDEF(&s);"));
}

#[test]
fn scalars_and_pointers_use_the_baseline() {
    let backend = backend_for(RuntimeFamily::ZendEngine3);
    let boxed = Variable::new("x_param", SemanticType::DynamicPtr).with_init_null(true);
    let count = Variable::new("n", SemanticType::Int).with_default("0");

    let boxed = backend
        .init_code(SemanticType::DynamicPtr, Indirection::Pointer, &boxed)
        .unwrap();
    let count = backend
        .init_code(SemanticType::Int, Indirection::Value, &count)
        .unwrap();
    assert_eq!(boxed, InitCode::declare("*x_param = NULL"));
    assert_eq!(count, InitCode::declare("n = 0"));
}

#[test]
fn checks_use_type_tags() {
    let backend = backend_for(RuntimeFamily::ZendEngine3);
    let a = dynamic("a");
    assert_eq!(backend.bool_code(&a), "(Z_TYPE_P(&a) == IS_TRUE)");
    assert_eq!(
        backend.if_variable_value_undefined(&a),
        "if (Z_TYPE_P(&a) == IS_UNDEF) {"
    );
    assert_eq!(
        backend.if_variable_is_not_bool(&a),
        "if (unlikely(Z_TYPE_P(&a) != IS_TRUE && Z_TYPE_P(&a) != IS_FALSE)) {"
    );
    assert_eq!(
        backend.fetch_class_entry("stdclass"),
        "zephir_get_internal_ce(SL(\"stdclass\"))"
    );
}

// === Resolution ===

#[test]
fn canonical_globals_are_materialized() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let global = Value::Global(GlobalConstant::new(GlobalConstant::FALSE));

    assert_eq!(backend.resolve_value(&global, &mut ctx).as_deref(), Ok("&_0"));
    assert_eq!(
        lines(&mut ctx),
        ["ZEPHIR_INIT_VAR(&_0);", "ZVAL_BOOL(&_0, 0);"]
    );
}

#[test]
fn unknown_constant_names_the_family() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let global = Value::Global(GlobalConstant::new("PHP_EOL"));

    let error = backend.resolve_value(&global, &mut ctx).unwrap_err();
    assert_eq!(
        error,
        CodegenError::UnknownConstant {
            family: "ZendEngine3",
            name: "PHP_EOL".to_owned(),
            location: None,
        }
    );
}

// === Assignment ===

#[test]
fn assignments() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let a = dynamic("a");
    let e = dynamic("e");

    backend.assign_string(&a, "tab\there", &mut ctx);
    backend
        .assign_zval(&a, &Value::Variable(dynamic("b")), &mut ctx)
        .unwrap();
    backend
        .copy_on_write(&e, CopySource::CurrentException, &mut ctx)
        .unwrap();
    backend
        .copy_on_write(&a, CopySource::Value(&Value::Variable(dynamic("b"))), &mut ctx)
        .unwrap();
    backend.return_string("ok", &mut ctx);

    assert_eq!(
        lines(&mut ctx),
        [
            "ZVAL_STRING(&a, \"tab\\there\");",
            "ZVAL_COPY_VALUE(&a, &b);",
            "ZVAL_OBJ(&e, EG(exception));",
            "Z_ADDREF_P(&e);",
            "ZEPHIR_CPY_WRT(&a, &b);",
            "RETURN_MM_STRING(\"ok\");",
        ]
    );
}

#[test]
fn closures_use_sized_names() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let class = ClassDefinition::new("Test", "Closure1");
    ctx.backend().create_closure(&dynamic("f"), &class, &mut ctx);
    assert_eq!(
        lines(&mut ctx),
        ["zephir_create_closure_ex(&f, NULL, test_closure1_ce, SL(\"__invoke\"));"]
    );
}

// === Collections ===

#[test]
fn array_entries_pass_the_inline_value() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let arr = array("arr");
    let at = location();
    let int = |code: &str| CompiledExpression::new(SemanticType::Int, code, None);
    let string = |code: &str| CompiledExpression::new(SemanticType::String, code, None);

    backend
        .add_array_entry(&arr, Some(&string("name")), &Value::Compiled(int("5")), &at, &mut ctx)
        .unwrap();
    backend
        .add_array_entry(&arr, Some(&int("0")), &Value::Compiled(string("x")), &at, &mut ctx)
        .unwrap();
    backend
        .add_array_entry(&arr, None, &Value::Compiled(string("y")), &at, &mut ctx)
        .unwrap();
    backend
        .array_unset(&arr, &int("2"), AccessFlags::SEPARATE, &mut ctx)
        .unwrap();
    let isset = backend
        .array_isset(&arr, &Value::Compiled(string("name")), &mut ctx)
        .unwrap();

    assert_eq!(
        lines(&mut ctx),
        [
            "add_assoc_long_ex(&arr, SL(\"name\"), 5);",
            "add_index_stringl(&arr, 0, SL(\"x\"));",
            "ZEPHIR_INIT_VAR(&_0);",
            "ZVAL_STRING(&_0, \"y\");",
            "zephir_array_append(&arr, &_0, PH_SEPARATE, \"test/flow.zep\", 12);",
            "zephir_array_unset_long(&arr, 2, PH_SEPARATE);",
        ]
    );
    assert_eq!(isset.code(), "zephir_array_isset_string(&arr, SL(\"name\"))");
}

fn iterate(
    key: Option<&Variable>,
    value: Option<&Variable>,
    duplicate_key: bool,
    reverse: bool,
) -> (Vec<String>, bool) {
    let options = options();
    let mut ctx = new_ctx(&options);
    let arr = array("arr");
    let at = location();
    let plan = ForEachPlan {
        collection: &arr,
        key,
        value,
        duplicate_key,
        duplicate_collection: false,
        reverse,
        location: &at,
    };
    ctx.enter_cycle();
    ctx.backend()
        .for_statement(&plan, &mut StatementBlock::new(&[]), &mut ctx)
        .unwrap();
    ctx.leave_cycle();
    let grow = ctx.symbol_table.must_grow_stack();
    (lines(&mut ctx), grow)
}

#[test]
fn foreach_key_and_value() {
    let (k, v) = (dynamic("k"), dynamic("v"));
    let (output, grow) = iterate(Some(&k), Some(&v), false, false);
    assert_eq!(
        output,
        [
            "zephir_is_iterable(&arr, 0, \"test/flow.zep\", 12);",
            "ZEPHIR_OBS_NVAR(&v);",
            "ZEND_HASH_FOREACH_KEY_VAL(Z_ARRVAL_P(&arr), _1, _2, _0)",
            "{",
            "\tif (_2 != NULL) {",
            "\t\tZVAL_STR(&k, _2);",
            "\t} else {",
            "\t\tZVAL_LONG(&k, _1);",
            "\t}",
            "\tZEPHIR_INIT_NVAR(&v);",
            "\tZVAL_COPY(&v, _0);",
            "} ZEND_HASH_FOREACH_END();",
        ]
    );
    assert!(grow);
}

#[test]
fn foreach_keys_only_in_reverse() {
    let k = dynamic("k");
    let (output, grow) = iterate(Some(&k), None, true, true);
    assert_eq!(
        output,
        [
            "zephir_is_iterable(&arr, 0, \"test/flow.zep\", 12);",
            "ZEND_HASH_REVERSE_FOREACH_KEY(Z_ARRVAL_P(&arr), _1, _2)",
            "{",
            "\tif (_2 != NULL) {",
            "\t\tZVAL_NEW_STR(&k, _2);",
            "\t} else {",
            "\t\tZVAL_LONG(&k, _1);",
            "\t}",
            "} ZEND_HASH_FOREACH_END();",
        ]
    );
    assert!(grow);
}

#[test]
fn foreach_values_only() {
    let v = dynamic("v");
    let (output, _) = iterate(None, Some(&v), false, false);
    assert_eq!(output[2], "ZEND_HASH_FOREACH_VAL(Z_ARRVAL_P(&arr), _0)");
    assert_eq!(output.len(), 7);

    let (reversed, _) = iterate(None, Some(&v), false, true);
    assert_eq!(reversed[2], "ZEND_HASH_REVERSE_FOREACH_VAL(Z_ARRVAL_P(&arr), _0)");
}

#[test]
fn foreach_entry_is_a_plain_pointer() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let arr = array("arr");
    let at = location();
    let plan = ForEachPlan {
        collection: &arr,
        key: None,
        value: None,
        duplicate_key: false,
        duplicate_collection: true,
        reverse: false,
        location: &at,
    };
    ctx.backend()
        .for_statement(&plan, &mut StatementBlock::new(&[]), &mut ctx)
        .unwrap();
    let entry = ctx.symbol_table.get_variable("_0").cloned().unwrap();
    assert_eq!(entry.ty(), SemanticType::DynamicPtr);
    assert_eq!(ctx.backend().variable_code(&entry), "_0");
    assert_eq!(
        lines(&mut ctx)[0],
        "zephir_is_iterable(&arr, 1, \"test/flow.zep\", 12);"
    );
}

// === Members ===

#[test]
fn property_operations() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let sym = dynamic("_0");
    let this = dynamic(Variable::THIS);
    let key = dynamic("k");
    let v = Value::Variable(dynamic("v"));
    let class = ClassDefinition::new("Test", "Flow");

    backend.fetch_property(&sym, &this, MemberKey::Name("a"), PropertyAccess::default(), &mut ctx);
    backend.fetch_property(&sym, &this, MemberKey::Dynamic(&key), PropertyAccess::default(), &mut ctx);
    backend.fetch_static_property(&sym, &class, "count", PropertyAccess::default(), &mut ctx);
    backend
        .update_property(&this, MemberKey::Name("a"), &v, &mut ctx)
        .unwrap();
    backend
        .update_property(&this, MemberKey::Dynamic(&key), &v, &mut ctx)
        .unwrap();
    backend
        .update_static_property(&class.class_entry(), "count", &v, &mut ctx)
        .unwrap();
    let isset = backend.property_isset(&this, MemberKey::Name("a"), &mut ctx);

    assert_eq!(
        lines(&mut ctx),
        [
            "zephir_read_property(&_0, this_ptr, SL(\"a\"), PH_NOISY_CC);",
            "zephir_read_property_zval(&_0, this_ptr, &k, PH_NOISY_CC);",
            "zephir_read_static_property_ce(&_0, test_flow_ce, SL(\"count\"), PH_NOISY_CC);",
            "zephir_update_property_zval(this_ptr, SL(\"a\"), &v);",
            "zephir_update_property_zval_zval(this_ptr, &k, &v);",
            "zephir_update_static_property_ce(test_flow_ce, SL(\"count\"), &v);",
        ]
    );
    assert_eq!(isset.code(), "zephir_isset_property(this_ptr, SL(\"a\"))");
}

#[test]
fn calls_address_inline_values() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let r = dynamic("r");

    backend.call_method(
        CallDestination::Variable(&r),
        &dynamic("obj"),
        MemberKey::Name("run"),
        "NULL, 0",
        &["&a".to_owned()],
        &mut ctx,
    );
    backend.call_function(CallDestination::Variable(&r), "count", "NULL, 0", &[], &mut ctx);
    assert_eq!(
        lines(&mut ctx),
        [
            "ZEPHIR_CALL_METHOD(&r, &obj, \"run\", NULL, 0, &a);",
            "ZEPHIR_CALL_FUNCTION(&r, \"count\", NULL, 0);",
        ]
    );
}

#[test]
fn class_lookup_and_symbols() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let ce = Variable::new("_1", SemanticType::ClassEntry);
    let server = dynamic("_SERVER");

    backend.fetch_class(&ce, "Test\\Flow", true, &mut ctx);
    let global = backend.fetch_global(&server, &mut ctx);
    backend.set_symbol_if_separated(&Variable::new("_2", SemanticType::Bool), &server, &mut ctx);

    assert_eq!(global, "zephir_get_global(&_SERVER, SL(\"_SERVER\"));");
    assert_eq!(
        lines(&mut ctx),
        [
            "if (!_1) {",
            "\t_1 = zephir_fetch_class_str_ex(SL(\"Test\\\\Flow\"), ZEND_FETCH_CLASS_AUTO);",
            "}",
            "zephir_get_global(&_SERVER, SL(\"_SERVER\"));",
            "if (_2) {",
            "\tZEPHIR_SET_SYMBOL(&EG(symbol_table), \"_SERVER\", &_SERVER);",
            "}",
        ]
    );
}

// === Declarations ===

#[test]
fn class_constants() {
    let options = options();
    let class = ClassDefinition::new("Test", "Flow");
    let mut ctx = new_ctx(&options).with_class(&class);
    let backend = ctx.backend();

    backend
        .declare_constant(SemanticType::Double, "RATE", "1.5", &mut ctx)
        .unwrap();
    backend
        .declare_constant(SemanticType::Null, "NONE", "", &mut ctx)
        .unwrap();
    assert_eq!(
        lines(&mut ctx),
        [
            "zephir_declare_class_constant_double(test_flow_ce, SL(\"RATE\"), 1.5);",
            "zephir_declare_class_constant_null(test_flow_ce, SL(\"NONE\"));",
        ]
    );
}

#[test]
fn initializer_signatures_return_the_object() {
    let backend = backend_for(RuntimeFamily::ZendEngine3);
    let class = ClassDefinition::new("Test", "Flow");
    let init = ClassMethod::new(&class, "zephir_init_properties_Test_Flow").with_initializer(true);
    assert_eq!(
        backend.internal_signature(RoutineRef::Method(&init)),
        "static zend_object *zephir_init_properties_Test_Flow(zend_class_entry *class_type TSRMLS_DC)"
    );
}

#[test]
fn parameters_skip_the_memory_frame() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let function = FunctionDefinition::new("Test", "greet")
        .with_parameter(Parameter::new("count", SemanticType::Int))
        .with_parameter(Parameter::new("name", SemanticType::Variable));

    backend
        .bind_parameters(RoutineRef::Function(&function), &mut ctx)
        .unwrap();
    assert_eq!(
        lines(&mut ctx),
        [
            "zephir_fetch_params_without_memory_grow(2, 0, &count_param, &name);",
            "count = zephir_get_intval(count_param);",
        ]
    );
    assert!(!ctx.symbol_table.must_grow_stack());
}

// === Lifecycle hooks ===

#[test]
fn methods_fetch_their_receiver() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let class = ClassDefinition::new("Test", "Flow");
    let method = ClassMethod::new(&class, "run");
    let internal = ClassMethod::new(&class, "run").with_internal(true);
    let function = FunctionDefinition::new("Test", "run");

    assert_eq!(
        backend.on_pre_init_var(RoutineRef::Method(&method), &mut ctx).as_deref(),
        Some("zval *this_ptr = getThis();")
    );
    assert_eq!(backend.on_pre_init_var(RoutineRef::Method(&internal), &mut ctx), None);
    assert_eq!(backend.on_pre_init_var(RoutineRef::Function(&function), &mut ctx), None);
}

#[test]
fn property_initializers_build_the_object() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let class = ClassDefinition::new("Test", "Flow");
    let init = ClassMethod::new(&class, "zephir_init_properties_Test_Flow").with_initializer(true);
    let routine = RoutineRef::Method(&init);

    ctx.printer.set_level(1);
    backend.on_pre_compile(routine, &mut ctx);
    ctx.output("ZEPHIR_MM_RESTORE();");
    backend.on_post_compile(routine, &mut ctx);

    assert_eq!(ctx.printer.level(), 1);
    assert_eq!(
        lines(&mut ctx),
        [
            "\t{",
            "\t\tzval local_this_ptr, *this_ptr = &local_this_ptr;",
            "\t\tZEPHIR_CREATE_OBJECT(this_ptr, class_type);",
            "\t\tZEPHIR_MM_RESTORE();",
            "\t\treturn Z_OBJ_P(this_ptr);",
            "\t}",
        ]
    );
}

#[test]
fn other_routines_have_no_bracket() {
    let options = options();
    let mut ctx = new_ctx(&options);
    let backend = ctx.backend();
    let class = ClassDefinition::new("Test", "Flow");
    let method = ClassMethod::new(&class, "run");

    backend.on_pre_compile(RoutineRef::Method(&method), &mut ctx);
    backend.on_post_compile(RoutineRef::Method(&method), &mut ctx);
    assert!(ctx.printer.is_empty());
}
