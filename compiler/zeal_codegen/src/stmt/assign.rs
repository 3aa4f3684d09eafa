//! `let` statements.

use zeal_ir::{CompiledExpression, Expr, LetTarget, PropertyKey, SemanticType, SourceLocation, Value, Variable};

use crate::expr::{
    compile_expr, compile_function_call, compile_method_call, compiled_variable, expr_variable,
    zval_value,
};
use crate::variable::init_variant;
use crate::{CallDestination, CodegenError, CodegenResult, CompilationContext, CopySource, MemberKey};

/// The local variable a `let` writes, if it writes one.
pub(super) fn mutated_variable(target: &LetTarget) -> Option<&str> {
    match target {
        LetTarget::Variable(name) | LetTarget::ArrayAppend(name) => Some(name),
        LetTarget::Property { .. } | LetTarget::StaticProperty { .. } => None,
    }
}

pub(super) fn compile_let(
    target: &LetTarget,
    value: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    match target {
        LetTarget::Variable(name) => {
            let variable = ctx
                .symbol_table
                .get_variable_for_write(name, Some(location))?;
            if variable.is_dynamic_container() {
                assign_dynamic(&variable, value, location, ctx)
            } else {
                assign_typed(&variable, value, location, ctx)
            }
        }
        LetTarget::Property { object, property } => {
            let object = ctx
                .symbol_table
                .get_variable_for_read(object, Some(location))?;
            let key = match property {
                PropertyKey::Name(_) => None,
                PropertyKey::Dynamic(name) => Some(
                    ctx.symbol_table
                        .get_variable_for_read(name, Some(location))?,
                ),
            };
            let value = Value::Variable(expr_variable(value, location, ctx)?);
            let member = match (property, key.as_ref()) {
                (_, Some(key)) => MemberKey::Dynamic(key),
                (PropertyKey::Name(name) | PropertyKey::Dynamic(name), None) => {
                    MemberKey::Name(name)
                }
            };
            ctx.backend().update_property(&object, member, &value, ctx)
        }
        LetTarget::StaticProperty { property } => {
            let class = ctx.class_definition().ok_or_else(|| {
                CodegenError::invalid_statement(
                    "static property assigned outside of a class",
                    Some(location),
                )
            })?;
            let value = Value::Variable(expr_variable(value, location, ctx)?);
            ctx.backend()
                .update_static_property(&class.class_entry(), property, &value, ctx)
        }
        LetTarget::ArrayAppend(array) => {
            let array = ctx
                .symbol_table
                .get_variable_for_write(array, Some(location))?;
            let value = zval_value(compile_expr(value, location, ctx)?);
            ctx.backend()
                .add_array_entry(&array, None, &value, location, ctx)
                .map(drop)
        }
    }
}

/// Store into a dynamic slot. Calls write their result straight into it.
fn assign_dynamic(
    variable: &Variable,
    value: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    match value {
        Expr::MethodCall {
            object,
            method,
            args,
        } => {
            return compile_method_call(
                CallDestination::Variable(variable),
                object,
                method,
                args,
                location,
                ctx,
            )
        }
        Expr::FunctionCall { name, args } => {
            return compile_function_call(
                CallDestination::Variable(variable),
                name,
                args,
                location,
                ctx,
            )
        }
        _ => {}
    }

    let compiled = compile_expr(value, location, ctx)?;
    let backend = ctx.backend();
    match compiled.ty() {
        SemanticType::Variable | SemanticType::Array => {
            if compiled.code() == variable.name() {
                return Ok(());
            }
            let source = Value::Compiled(compiled);
            backend.copy_on_write(variable, CopySource::Value(&source), ctx)
        }
        SemanticType::Null => {
            init_variant(variable, ctx);
            backend.assign_null(variable, ctx);
            Ok(())
        }
        SemanticType::String => {
            init_variant(variable, ctx);
            backend.assign_string(variable, compiled.code(), ctx);
            Ok(())
        }
        SemanticType::Double => {
            init_variant(variable, ctx);
            backend.assign_double(variable, compiled.code(), ctx);
            Ok(())
        }
        SemanticType::Bool => {
            init_variant(variable, ctx);
            backend.assign_bool(variable, compiled.code(), ctx);
            Ok(())
        }
        ty if ty.is_integer() || matches!(ty, SemanticType::Char | SemanticType::UChar) => {
            init_variant(variable, ctx);
            backend.assign_long(variable, compiled.code(), ctx);
            Ok(())
        }
        ty => Err(CodegenError::unknown_mapping(
            format!("{} assigned to variable '{}'", ty.name(), variable.name()),
            Some(location),
        )),
    }
}

/// Store into a typed C local, unboxing dynamic values.
fn assign_typed(
    variable: &Variable,
    value: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let compiled = compile_expr(value, location, ctx)?;
    let target = ctx.backend().variable_code(variable);
    let value = typed_value(variable.ty(), &compiled, location, ctx)?;
    ctx.output(&format!("{target} = {value};"));
    Ok(())
}

fn typed_value(
    ty: SemanticType,
    compiled: &CompiledExpression,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<String> {
    let mismatch = || {
        CodegenError::unknown_mapping(
            format!("{} assigned to a {} variable", compiled.ty().name(), ty.name()),
            Some(location),
        )
    };
    if matches!(compiled.ty(), SemanticType::Variable | SemanticType::Array) {
        let source = compiled_variable(compiled, location, ctx)?;
        let code = ctx.backend().variable_code(&source);
        ctx.headers.add("kernel/operators");
        return match ty {
            SemanticType::Double => Ok(format!("zephir_get_doubleval({code})")),
            SemanticType::Bool => Ok(format!("zephir_is_true({code})")),
            ty if ty.is_scalar() => Ok(format!("zephir_get_intval({code})")),
            _ => Err(mismatch()),
        };
    }
    if ty.is_scalar() && compiled.ty().is_scalar() {
        Ok(compiled.code().to_owned())
    } else {
        Err(mismatch())
    }
}
