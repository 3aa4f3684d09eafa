//! Range and collection iteration.

use zeal_ir::{
    Expr, ForEachStmt, ForRangeStmt, SemanticType, SourceLocation, StorageClass, Variable,
};

use super::StatementBlock;
use crate::expr::{compile_expr, compiled_variable};
use crate::variable::init_variant;
use crate::{CodegenError, CodegenResult, CompilationContext, ForEachPlan};

/// `for [key,] value in [reverse] range(start, end)`, both bounds included.
///
/// The cursor advances at the top of every iteration but the first, so
/// `continue` needs no special handling. The range is checked once up
/// front, an empty range never enters the loop.
pub(super) fn compile_for_range(
    range: &ForRangeStmt,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let value = ctx
        .symbol_table
        .get_variable_for_write(&range.value, Some(location))?;
    let key = range
        .key
        .as_ref()
        .map(|key| ctx.symbol_table.get_variable_for_write(key, Some(location)))
        .transpose()?;

    let start = integer_bound(&range.start, location, ctx)?;
    let end = integer_bound(&range.end, location, ctx)?;
    let bound = ctx.symbol_table.add_temp(SemanticType::Int, StorageClass::LocalOnly);
    let cursor = ctx.symbol_table.add_temp(SemanticType::Int, StorageClass::LocalOnly);
    let started = ctx.symbol_table.add_temp(SemanticType::Bool, StorageClass::LocalOnly);
    let counter = key
        .as_ref()
        .map(|_| ctx.symbol_table.add_temp(SemanticType::Int, StorageClass::LocalOnly));
    let (bound, cursor, started) = (bound.name(), cursor.name(), started.name());
    tracing::trace!(value = %range.value, reverse = range.reverse, "range iteration");

    let (first, last, comparison, step) = if range.reverse {
        (end, start, ">=", "--")
    } else {
        (start, end, "<=", "++")
    };
    ctx.output(&format!("{bound} = {last};"));
    ctx.output(&format!("{cursor} = {first};"));
    ctx.output(&format!("{started} = 0;"));
    if let Some(counter) = &counter {
        ctx.output(&format!("{} = 0;", counter.name()));
    }
    ctx.output(&format!("if ({cursor} {comparison} {bound}) {{"));
    ctx.printer.increase_level();
    ctx.output("while (1) {");
    ctx.enter_cycle();
    ctx.printer.increase_level();

    ctx.output(&format!("if ({started}) {{"));
    ctx.printer.increase_level();
    ctx.output(&format!("{cursor}{step};"));
    if let Some(counter) = &counter {
        ctx.output(&format!("{}++;", counter.name()));
    }
    ctx.output(&format!("if (!({cursor} {comparison} {bound})) {{"));
    ctx.printer.increase_level();
    ctx.output("break;");
    ctx.printer.decrease_level();
    ctx.output("}");
    ctx.printer.decrease_level();
    ctx.output("} else {");
    ctx.printer.increase_level();
    ctx.output(&format!("{started} = 1;"));
    ctx.printer.decrease_level();
    ctx.output("}");

    let assigned = match (&key, &counter) {
        (Some(key), Some(counter)) => assign_counter(key, counter.name(), location, ctx),
        _ => Ok(()),
    }
    .and_then(|()| assign_counter(&value, cursor, location, ctx));
    ctx.printer.decrease_level();

    let result = assigned.and_then(|()| {
        let mut block = StatementBlock::new(&range.body);
        block.set_loop(true);
        if let Some(key) = &key {
            block.mutations_mut().increase_mutations(key.name());
        }
        block.mutations_mut().increase_mutations(value.name());
        block.compile(ctx)
    });
    ctx.leave_cycle();
    result?;

    ctx.output("}");
    ctx.printer.decrease_level();
    ctx.output("}");
    Ok(())
}

/// C integer expression for a range bound.
fn integer_bound(
    bound: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<String> {
    let compiled = compile_expr(bound, location, ctx)?;
    match compiled.ty() {
        ty if ty.is_integer() || matches!(ty, SemanticType::Char | SemanticType::UChar) => {
            Ok(compiled.code().to_owned())
        }
        SemanticType::Variable => {
            let variable = compiled_variable(&compiled, location, ctx)?;
            ctx.headers.add("kernel/operators");
            Ok(format!(
                "zephir_get_intval({})",
                ctx.backend().variable_code(&variable)
            ))
        }
        ty => Err(CodegenError::unknown_mapping(
            format!("range bound of type {}", ty.name()),
            Some(location),
        )),
    }
}

/// Store the integer held in the C local `source` into `target`.
fn assign_counter(
    target: &Variable,
    source: &str,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    if target.is_dynamic_container() {
        init_variant(target, ctx);
        ctx.backend().assign_long(target, source, ctx);
        return Ok(());
    }
    if !target.ty().is_scalar() {
        return Err(CodegenError::unknown_mapping(
            format!("range variable of type {}", target.ty().name()),
            Some(location),
        ));
    }
    let code = ctx.backend().variable_code(target);
    ctx.output(&format!("{code} = {source};"));
    Ok(())
}

/// `for [key,] [value] in [reverse] collection`
pub(super) fn compile_for_each(
    each: &ForEachStmt,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let collection = ctx
        .symbol_table
        .get_variable_for_read(&each.collection, Some(location))?;
    if !collection.is_dynamic_container() && collection.ty() != SemanticType::DynamicPtr {
        return Err(CodegenError::unknown_mapping(
            format!("iteration over {}", collection.ty().name()),
            Some(location),
        ));
    }
    let key = capture_variable(each.key.as_deref(), location, ctx)?;
    let value = capture_variable(each.value.as_deref(), location, ctx)?;

    let plan = ForEachPlan {
        collection: &collection,
        key: key.as_ref(),
        value: value.as_ref(),
        duplicate_key: each.duplicate_key,
        duplicate_collection: each.duplicate_collection,
        reverse: each.reverse,
        location,
    };
    let mut block = StatementBlock::new(&each.body);
    ctx.enter_cycle();
    let result = ctx.backend().for_statement(&plan, &mut block, ctx);
    ctx.leave_cycle();
    result
}

/// Key and value captures must be dynamic slots.
fn capture_variable(
    name: Option<&str>,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<Option<Variable>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let variable = ctx
        .symbol_table
        .get_variable_for_write(name, Some(location))?;
    if !variable.is_dynamic_container() {
        return Err(CodegenError::unknown_mapping(
            format!(
                "iteration variable '{}' of type {}",
                variable.name(),
                variable.ty().name()
            ),
            Some(location),
        ));
    }
    Ok(Some(variable))
}
