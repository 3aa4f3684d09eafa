//! `return` statements.

use zeal_ir::{Expr, SemanticType, SourceLocation};

use crate::expr::{compile_expr, compile_function_call, compile_method_call};
use crate::{CallDestination, CodegenError, CodegenResult, CompilationContext};

/// Every return leaves through the memory frame, so the routine grows it.
pub(super) fn compile_return(
    value: Option<&Expr>,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    ctx.symbol_table.set_must_grow_stack(true);
    let Some(value) = value else {
        ctx.output("RETURN_MM_NULL();");
        return Ok(());
    };

    match value {
        Expr::MethodCall {
            object,
            method,
            args,
        } => {
            compile_method_call(
                CallDestination::ReturnValue,
                object,
                method,
                args,
                location,
                ctx,
            )?;
            ctx.output("RETURN_MM();");
            return Ok(());
        }
        Expr::FunctionCall { name, args } => {
            compile_function_call(CallDestination::ReturnValue, name, args, location, ctx)?;
            ctx.output("RETURN_MM();");
            return Ok(());
        }
        _ => {}
    }

    let compiled = compile_expr(value, location, ctx)?;
    let code = compiled.code();
    let line = match compiled.ty() {
        SemanticType::Bool => format!("RETURN_MM_BOOL({code});"),
        SemanticType::Double => format!("RETURN_MM_DOUBLE({code});"),
        SemanticType::Null => "RETURN_MM_NULL();".to_owned(),
        SemanticType::String => {
            ctx.backend().return_string(code, ctx);
            return Ok(());
        }
        SemanticType::Variable | SemanticType::Array => {
            let variable = ctx
                .symbol_table
                .get_variable_for_read(code, Some(location))?;
            format!("RETURN_CCTOR({});", ctx.backend().variable_code(&variable))
        }
        ty if ty.is_integer() || matches!(ty, SemanticType::Char | SemanticType::UChar) => {
            format!("RETURN_MM_LONG({code});")
        }
        ty => {
            return Err(CodegenError::unknown_mapping(
                format!("return of {}", ty.name()),
                Some(location),
            ))
        }
    };
    ctx.output(&line);
    Ok(())
}
