//! Expression Compilation
//!
//! Turns IR expressions into [`CompiledExpression`]s. Anything the target
//! cannot express inline (dynamic arithmetic, property reads, calls, array
//! literals) is evaluated into a fresh dynamic temporary first, and the
//! temporary's name becomes the expression's code.
//!
//! Code conventions of the result, by type tag:
//! - scalars carry a C expression (`(a + 1)`, `42`, `'c'`)
//! - `Variable`/`Array` carry the bare name of a dynamic slot
//! - `String` carries the raw, unescaped literal text
//! - `Null` carries `null`

use smallvec::SmallVec;
use zeal_ir::{
    BinaryOp, CompiledExpression, Expr, GlobalValue, Literal, PropertyKey, SemanticType,
    SourceLocation, StorageClass, UnaryOp, Value, Variable,
};

use crate::utils::escape_c_string;
use crate::variable::{init_variant, observe_variant};
use crate::{
    CallDestination, CodegenError, CodegenResult, CompilationContext, MemberKey, PropertyAccess,
};

/// Call-site cache argument for calls without a resolved cache slot.
pub(crate) const NO_CACHE: &str = "NULL, 0";

/// Compile `expr`; `location` is the location of the enclosing statement.
pub fn compile_expr(
    expr: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    let at = Some(location.clone());
    match expr {
        Expr::Literal(literal) => Ok(compile_literal(literal, at)),
        Expr::Variable(name) => {
            let variable = ctx
                .symbol_table
                .get_variable_for_read(name, Some(location))?;
            Ok(variable_expression(&variable, at))
        }
        Expr::Constant(constant) => match constant.canonical() {
            Some(GlobalValue::Null) => Ok(CompiledExpression::new(SemanticType::Null, "null", at)),
            Some(GlobalValue::True) => Ok(CompiledExpression::bool("1", at)),
            Some(GlobalValue::False) => Ok(CompiledExpression::bool("0", at)),
            None => Err(CodegenError::UnknownConstant {
                family: ctx.backend().name(),
                name: constant.name().to_owned(),
                location: at,
            }),
        },
        Expr::Binary { op, left, right } => compile_binary(*op, left, right, location, ctx),
        Expr::Unary { op, operand } => compile_unary(*op, operand, location, ctx),
        Expr::Property {
            object,
            property,
            read_only,
            quiet,
        } => {
            let object = ctx
                .symbol_table
                .get_variable_for_read(object, Some(location))?;
            let key = member_variable(property, location, ctx)?;
            let symbol = ctx
                .symbol_table
                .get_temp_variable_for_write(SemanticType::Variable);
            if !read_only {
                observe_variant(&symbol, ctx);
            }
            let access = PropertyAccess {
                read_only: *read_only,
                quiet: *quiet,
            };
            ctx.backend()
                .fetch_property(&symbol, &object, member_key(property, key.as_ref()), access, ctx);
            Ok(variable_expression(&symbol, at))
        }
        Expr::StaticProperty { property } => {
            let class = ctx.class_definition().ok_or_else(|| {
                CodegenError::invalid_statement(
                    "static property read outside of a class",
                    Some(location),
                )
            })?;
            let symbol = ctx
                .symbol_table
                .get_temp_variable_for_write(SemanticType::Variable);
            observe_variant(&symbol, ctx);
            ctx.backend()
                .fetch_static_property(&symbol, class, property, PropertyAccess::default(), ctx);
            Ok(variable_expression(&symbol, at))
        }
        Expr::MethodCall {
            object,
            method,
            args,
        } => {
            let symbol = ctx
                .symbol_table
                .get_temp_variable_for_write(SemanticType::Variable);
            compile_method_call(
                CallDestination::Variable(&symbol),
                object,
                method,
                args,
                location,
                ctx,
            )?;
            Ok(variable_expression(&symbol, at))
        }
        Expr::FunctionCall { name, args } => {
            let symbol = ctx
                .symbol_table
                .get_temp_variable_for_write(SemanticType::Variable);
            compile_function_call(CallDestination::Variable(&symbol), name, args, location, ctx)?;
            Ok(variable_expression(&symbol, at))
        }
        Expr::ArrayIsset { array, key } => {
            let array = ctx
                .symbol_table
                .get_variable_for_read(array, Some(location))?;
            let key = compile_expr(key, location, ctx)?;
            ctx.headers.add("kernel/array");
            let check = ctx
                .backend()
                .array_isset(&array, &Value::Compiled(key), ctx)?;
            Ok(CompiledExpression::bool(check.code(), at))
        }
        Expr::PropertyIsset { object, property } => {
            let object = ctx
                .symbol_table
                .get_variable_for_read(object, Some(location))?;
            let key = member_variable(property, location, ctx)?;
            let check =
                ctx.backend()
                    .property_isset(&object, member_key(property, key.as_ref()), ctx);
            Ok(CompiledExpression::bool(check.code(), at))
        }
        Expr::Array(entries) => compile_array(entries, location, ctx),
    }
}

fn compile_literal(literal: &Literal, at: Option<SourceLocation>) -> CompiledExpression {
    match literal {
        Literal::Int(n) => CompiledExpression::new(SemanticType::Int, n.to_string(), at),
        Literal::Double(f) => CompiledExpression::new(SemanticType::Double, format!("{f:?}"), at),
        Literal::Bool(b) => CompiledExpression::bool(if *b { "1" } else { "0" }, at),
        Literal::String(s) => CompiledExpression::new(SemanticType::String, s.as_str(), at),
        Literal::Char(c) => CompiledExpression::new(SemanticType::Char, c.as_str(), at),
        Literal::Null => CompiledExpression::new(SemanticType::Null, "null", at),
    }
}

/// Dynamic slots and boxed parameters compile to their bare name; typed
/// slots keep their type.
fn variable_expression(variable: &Variable, at: Option<SourceLocation>) -> CompiledExpression {
    let ty = match variable.ty() {
        SemanticType::Array => SemanticType::Array,
        ty if ty.is_dynamic_container() || ty == SemanticType::DynamicPtr => SemanticType::Variable,
        ty => ty,
    };
    CompiledExpression::new(ty, variable.name(), at)
}

fn is_dynamic(expr: &CompiledExpression) -> bool {
    matches!(expr.ty(), SemanticType::Variable | SemanticType::Array)
}

/// Access code of a dynamic operand.
fn dynamic_code(
    expr: &CompiledExpression,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<String> {
    ctx.backend()
        .resolve_value(&Value::Compiled(expr.clone()), ctx)
}

/// The value a compiled expression stands for when stored in a dynamic
/// slot. A null literal becomes the null value instead of its code.
pub(crate) fn zval_value(expr: CompiledExpression) -> Value {
    match expr.ty() {
        SemanticType::Null => Value::Null,
        _ => Value::Compiled(expr),
    }
}

/// Compile `expr` into a dynamic variable, materializing scalars into a
/// fresh temporary.
pub(crate) fn expr_variable(
    expr: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<Variable> {
    let compiled = compile_expr(expr, location, ctx)?;
    compiled_variable(&compiled, location, ctx)
}

pub(crate) fn compiled_variable(
    compiled: &CompiledExpression,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<Variable> {
    if is_dynamic(compiled) {
        return ctx
            .symbol_table
            .get_variable_for_write(compiled.code(), Some(location));
    }
    let backend = ctx.backend();
    let temp = ctx
        .symbol_table
        .get_temp_variable_for_write(SemanticType::Variable);
    init_variant(&temp, ctx);
    match compiled.ty() {
        ty if ty.is_integer() => backend.assign_long(&temp, compiled.code(), ctx),
        SemanticType::Char | SemanticType::UChar => {
            backend.assign_long(&temp, compiled.code(), ctx);
        }
        SemanticType::Double => backend.assign_double(&temp, compiled.code(), ctx),
        SemanticType::Bool => backend.assign_bool(&temp, compiled.code(), ctx),
        SemanticType::String => backend.assign_string(&temp, compiled.code(), ctx),
        SemanticType::Null => backend.assign_null(&temp, ctx),
        ty => {
            return Err(CodegenError::unknown_mapping(
                format!("{} value stored in a variable", ty.name()),
                Some(location),
            ))
        }
    }
    Ok(temp)
}

/// C expression usable as an `if`/`while` condition.
pub fn condition_code(
    expr: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<String> {
    let compiled = compile_expr(expr, location, ctx)?;
    compiled_condition(&compiled, location, ctx)
}

fn compiled_condition(
    compiled: &CompiledExpression,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<String> {
    match compiled.ty() {
        SemanticType::Variable | SemanticType::Array => {
            let code = dynamic_code(compiled, ctx)?;
            ctx.headers.add("kernel/operators");
            Ok(format!("zephir_is_true({code})"))
        }
        SemanticType::Null => Ok("0".to_owned()),
        ty if ty.is_scalar() => Ok(compiled.code().to_owned()),
        ty => Err(CodegenError::unknown_mapping(
            format!("{} used as a condition", ty.name()),
            Some(location),
        )),
    }
}

/// `&&` and `||`. When the right operand needs statements of its own they
/// run only if the left operand leaves the result open.
fn short_circuit(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    let at = Some(location.clone());
    let left = condition_code(left, location, ctx)?;

    let mark = ctx.printer.output_ref().len();
    ctx.printer.increase_level();
    let right = condition_code(right, location, ctx);
    ctx.printer.decrease_level();
    let right = right?;
    let setup = ctx.printer.split_off(mark);
    if setup.is_empty() {
        return Ok(CompiledExpression::bool(
            format!("({left} {} {right})", op.as_c()),
            at,
        ));
    }

    let result = ctx
        .symbol_table
        .add_temp(SemanticType::Bool, StorageClass::LocalOnly);
    let name = result.name();
    let guard = match op {
        BinaryOp::Or => format!("!{name}"),
        _ => name.to_owned(),
    };
    ctx.output(&format!("{name} = {left};"));
    ctx.output(&format!("if ({guard}) {{"));
    ctx.printer.append(&setup);
    ctx.printer.increase_level();
    ctx.output(&format!("{name} = {right};"));
    ctx.printer.decrease_level();
    ctx.output("}");
    Ok(CompiledExpression::bool(name, at))
}

fn compile_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    let at = Some(location.clone());
    if op.is_logical() {
        return short_circuit(op, left, right, location, ctx);
    }

    let left = compile_expr(left, location, ctx)?;
    let right = compile_expr(right, location, ctx)?;
    let mismatch = || {
        CodegenError::unknown_mapping(
            format!(
                "operator {} between {} and {}",
                op.as_c(),
                left.ty().name(),
                right.ty().name()
            ),
            Some(location),
        )
    };

    match (is_dynamic(&left), is_dynamic(&right)) {
        (false, false) if left.ty().is_scalar() && right.ty().is_scalar() => {
            let code = format!("({} {} {})", left.code(), op.as_c(), right.code());
            let ty = if op.is_comparison() {
                SemanticType::Bool
            } else if left.ty() == SemanticType::Double || right.ty() == SemanticType::Double {
                SemanticType::Double
            } else if left.ty().is_integer() {
                left.ty()
            } else {
                SemanticType::Int
            };
            Ok(CompiledExpression::new(ty, code, at))
        }
        (false, false) => Err(mismatch()),
        _ if !op.is_comparison() => {
            let result = dynamic_arithmetic(op, &left, &right, location, ctx)?;
            Ok(variable_expression(&result, at))
        }
        (true, true) => {
            let a = dynamic_code(&left, ctx)?;
            let b = dynamic_code(&right, ctx)?;
            ctx.headers.add("kernel/operators");
            let code = match op {
                BinaryOp::Eq => format!("ZEPHIR_IS_EQUAL({a}, {b})"),
                BinaryOp::NotEq => format!("!(ZEPHIR_IS_EQUAL({a}, {b}))"),
                BinaryOp::Lt => format!("ZEPHIR_LT({a}, {b})"),
                BinaryOp::LtEq => format!("ZEPHIR_LE({a}, {b})"),
                BinaryOp::Gt => format!("ZEPHIR_GT({a}, {b})"),
                BinaryOp::GtEq => format!("ZEPHIR_GE({a}, {b})"),
                _ => return Err(mismatch()),
            };
            Ok(CompiledExpression::bool(code, at))
        }
        (left_dynamic, _) => {
            // Normalize to `dynamic op scalar`.
            let (dynamic, scalar, op) = if left_dynamic {
                (&left, &right, op)
            } else {
                (&right, &left, mirrored(op))
            };
            let code = dynamic_code(dynamic, ctx)?;
            let check = compare_with_scalar(op, &code, scalar).ok_or_else(mismatch)?;
            ctx.headers.add("kernel/operators");
            Ok(CompiledExpression::bool(check, at))
        }
    }
}

/// The operator with its operands swapped.
fn mirrored(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::LtEq => BinaryOp::GtEq,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::GtEq => BinaryOp::LtEq,
        other => other,
    }
}

fn compare_with_scalar(op: BinaryOp, dynamic: &str, scalar: &CompiledExpression) -> Option<String> {
    let negate = |check: String| match op {
        BinaryOp::NotEq => Some(format!("!({check})")),
        _ => Some(check),
    };
    match scalar.ty() {
        SemanticType::Null => match op {
            BinaryOp::Eq => Some(format!("Z_TYPE_P({dynamic}) == IS_NULL")),
            BinaryOp::NotEq => Some(format!("Z_TYPE_P({dynamic}) != IS_NULL")),
            _ => None,
        },
        SemanticType::String => match op {
            BinaryOp::Eq | BinaryOp::NotEq => negate(format!(
                "ZEPHIR_IS_STRING({dynamic}, \"{}\")",
                escape_c_string(scalar.code())
            )),
            _ => None,
        },
        SemanticType::Double => match op {
            BinaryOp::Eq | BinaryOp::NotEq => {
                negate(format!("ZEPHIR_IS_DOUBLE({dynamic}, {})", scalar.code()))
            }
            _ => None,
        },
        ty if ty.is_integer() || matches!(ty, SemanticType::Char | SemanticType::UChar) => {
            let value = scalar.code();
            match op {
                BinaryOp::Eq | BinaryOp::NotEq => {
                    negate(format!("ZEPHIR_IS_LONG({dynamic}, {value})"))
                }
                BinaryOp::Lt => Some(format!("ZEPHIR_LT_LONG({dynamic}, {value})")),
                BinaryOp::LtEq => Some(format!("ZEPHIR_LE_LONG({dynamic}, {value})")),
                BinaryOp::Gt => Some(format!("ZEPHIR_GT_LONG({dynamic}, {value})")),
                BinaryOp::GtEq => Some(format!("ZEPHIR_GE_LONG({dynamic}, {value})")),
                _ => None,
            }
        }
        _ => None,
    }
}

/// `left op right` evaluated by the runtime into a fresh temporary.
fn dynamic_arithmetic(
    op: BinaryOp,
    left: &CompiledExpression,
    right: &CompiledExpression,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<Variable> {
    let helper = match op {
        BinaryOp::Add => "zephir_add_function",
        BinaryOp::Sub => "zephir_sub_function",
        BinaryOp::Mul => "zephir_mul_function",
        _ => {
            return Err(CodegenError::unknown_mapping(
                format!("operator {} on variables", op.as_c()),
                Some(location),
            ))
        }
    };
    let backend = ctx.backend();
    let left = compiled_variable(left, location, ctx)?;
    let right = compiled_variable(right, location, ctx)?;
    let result = ctx
        .symbol_table
        .get_temp_variable_for_write(SemanticType::Variable);
    init_variant(&result, ctx);
    ctx.headers.add("kernel/operators");
    let line = format!(
        "{helper}({}, {}, {});",
        backend.variable_code(&result),
        backend.variable_code(&left),
        backend.variable_code(&right)
    );
    ctx.output(&line);
    Ok(result)
}

fn compile_unary(
    op: UnaryOp,
    operand: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    let at = Some(location.clone());
    match op {
        UnaryOp::Not => {
            let condition = condition_code(operand, location, ctx)?;
            Ok(CompiledExpression::bool(format!("!({condition})"), at))
        }
        UnaryOp::Neg => {
            let compiled = compile_expr(operand, location, ctx)?;
            match compiled.ty() {
                ty if ty.is_scalar() && ty != SemanticType::Bool => {
                    Ok(CompiledExpression::new(ty, format!("-({})", compiled.code()), at))
                }
                ty => Err(CodegenError::unknown_mapping(
                    format!("negation of {}", ty.name()),
                    Some(location),
                )),
            }
        }
    }
}

/// The variable holding a dynamic member name, if the key is dynamic.
fn member_variable(
    property: &PropertyKey,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<Option<Variable>> {
    match property {
        PropertyKey::Name(_) => Ok(None),
        PropertyKey::Dynamic(name) => ctx
            .symbol_table
            .get_variable_for_read(name, Some(location))
            .map(Some),
    }
}

fn member_key<'k>(property: &'k PropertyKey, variable: Option<&'k Variable>) -> MemberKey<'k> {
    match (property, variable) {
        (_, Some(variable)) => MemberKey::Dynamic(variable),
        (PropertyKey::Name(name) | PropertyKey::Dynamic(name), None) => MemberKey::Name(name),
    }
}

/// Dynamic variables passed as call arguments, by access code.
fn call_arguments(
    args: &[Expr],
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<SmallVec<[String; 4]>> {
    let mut params = SmallVec::new();
    for arg in args {
        let variable = expr_variable(arg, location, ctx)?;
        params.push(ctx.backend().variable_code(&variable));
    }
    Ok(params)
}

/// Emit a method call leaving its result in `destination`.
pub(crate) fn compile_method_call(
    destination: CallDestination<'_>,
    object: &str,
    method: &str,
    args: &[Expr],
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let object = ctx
        .symbol_table
        .get_variable_for_read(object, Some(location))?;
    let params = call_arguments(args, location, ctx)?;
    if let CallDestination::Variable(symbol) = destination {
        observe_variant(symbol, ctx);
    }
    tracing::trace!(method, args = params.len(), "method call");
    ctx.backend().call_method(
        destination,
        &object,
        MemberKey::Name(method),
        NO_CACHE,
        &params,
        ctx,
    );
    ctx.output("zephir_check_call_status();");
    Ok(())
}

/// Emit a function call leaving its result in `destination`.
pub(crate) fn compile_function_call(
    destination: CallDestination<'_>,
    name: &str,
    args: &[Expr],
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let params = call_arguments(args, location, ctx)?;
    if let CallDestination::Variable(symbol) = destination {
        observe_variant(symbol, ctx);
    }
    tracing::trace!(function = name, args = params.len(), "function call");
    ctx.backend()
        .call_function(destination, name, NO_CACHE, &params, ctx);
    ctx.output("zephir_check_call_status();");
    Ok(())
}

fn compile_array(
    entries: &[(Option<Expr>, Expr)],
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<CompiledExpression> {
    let array = ctx
        .symbol_table
        .get_temp_variable_for_write(SemanticType::Array);
    init_variant(&array, ctx);
    ctx.headers.add("kernel/array");
    let line = format!(
        "zephir_create_array({}, {}, 0);",
        ctx.backend().variable_code(&array),
        entries.len()
    );
    ctx.output(&line);

    for (key, value) in entries {
        let key = key
            .as_ref()
            .map(|key| compile_expr(key, location, ctx))
            .transpose()?;
        let value = zval_value(compile_expr(value, location, ctx)?);
        ctx.backend()
            .add_array_entry(&array, key.as_ref(), &value, location, ctx)?;
    }
    Ok(variable_expression(&array, Some(location.clone())))
}
