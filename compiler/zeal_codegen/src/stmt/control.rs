//! Conditionals, pre/post-test loops and jumps.

use zeal_ir::{Expr, SemanticType, SourceLocation, StorageClass, Stmt};

use super::StatementBlock;
use crate::expr::condition_code;
use crate::{CodegenError, CodegenResult, CompilationContext};

pub(super) fn compile_if(
    condition: &Expr,
    then_branch: &[Stmt],
    else_branch: Option<&[Stmt]>,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let condition = condition_code(condition, location, ctx)?;
    ctx.output(&format!("if ({condition}) {{"));
    StatementBlock::new(then_branch).compile(ctx)?;
    if let Some(else_branch) = else_branch {
        ctx.output("} else {");
        StatementBlock::new(else_branch).compile(ctx)?;
    }
    ctx.output("}");
    Ok(())
}

/// Pre-test loop. The condition may need setup code, so it is evaluated
/// at the top of an endless loop instead of in the `while` header.
pub(super) fn compile_while(
    condition: &Expr,
    body: &[Stmt],
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    ctx.output("while (1) {");
    ctx.enter_cycle();
    ctx.printer.increase_level();
    let condition = condition_code(condition, location, ctx);
    let result = condition.and_then(|condition| {
        ctx.output(&format!("if (!({condition})) {{"));
        ctx.printer.increase_level();
        ctx.output("break;");
        ctx.printer.decrease_level();
        ctx.output("}");
        ctx.printer.decrease_level();
        loop_body(body, ctx)
    });
    ctx.leave_cycle();
    result?;
    ctx.output("}");
    Ok(())
}

/// Post-test loop: the body runs once before the condition is checked.
///
/// A condition that needs setup code cannot sit in a `while` trailer, and
/// `continue` must still reach that setup, so such loops test a started
/// flag at the top of an endless loop instead.
pub(super) fn compile_do_while(
    body: &[Stmt],
    condition: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    ctx.enter_cycle();
    let result = post_test_loop(body, condition, location, ctx);
    ctx.leave_cycle();
    result
}

fn post_test_loop(
    body: &[Stmt],
    condition: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let level = ctx.printer.level();
    let mark = ctx.printer.output_ref().len();
    ctx.printer.set_level(level + 2);
    let condition = condition_code(condition, location, ctx);
    ctx.printer.set_level(level);
    let condition = condition?;
    let setup = ctx.printer.split_off(mark);

    if setup.is_empty() {
        ctx.output("do {");
        loop_body(body, ctx)?;
        ctx.output(&format!("}} while ({condition});"));
        return Ok(());
    }

    let started = ctx
        .symbol_table
        .add_temp(SemanticType::Bool, StorageClass::LocalOnly);
    let started = started.name();
    ctx.output(&format!("{started} = 0;"));
    ctx.output("while (1) {");
    ctx.printer.increase_level();
    ctx.output(&format!("if ({started}) {{"));
    ctx.printer.append(&setup);
    ctx.printer.increase_level();
    ctx.output(&format!("if (!({condition})) {{"));
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
    ctx.printer.decrease_level();
    loop_body(body, ctx)?;
    ctx.output("}");
    Ok(())
}

pub(super) fn compile_loop(body: &[Stmt], ctx: &mut CompilationContext<'_>) -> CodegenResult<()> {
    ctx.output("while (1) {");
    loop_body(body, ctx)?;
    ctx.output("}");
    Ok(())
}

fn loop_body(body: &[Stmt], ctx: &mut CompilationContext<'_>) -> CodegenResult<()> {
    let mut block = StatementBlock::new(body);
    block.set_loop(true);
    block.compile(ctx)
}

/// `break` or `continue`.
pub(super) fn compile_jump(
    keyword: &str,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    if !ctx.inside_cycle() {
        return Err(CodegenError::invalid_statement(
            format!("'{keyword}' must be inside a loop"),
            Some(location),
        ));
    }
    ctx.output(&format!("{keyword};"));
    Ok(())
}
